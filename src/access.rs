// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access control for file resources.
//!
//! Pure predicates over an already-resolved caller and already-fetched
//! metadata. Nothing here touches a store or suspends, so the decisions can
//! be tested without any backend.
//!
//! | Operation | Owner | Other user | Anonymous |
//! |-----------|-------|------------|-----------|
//! | read private file | yes | no | no |
//! | read public file | yes | yes | yes |
//! | publish / unpublish | yes | no | no |
//! | create inside a folder | yes | no | no |

use crate::models::{FileMetadata, UserId};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_id(&self) -> &UserId;
}

/// Trait for resources that may be shared publicly.
pub trait SharedResource: OwnedResource {
    fn is_public(&self) -> bool;
}

impl OwnedResource for FileMetadata {
    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}

impl SharedResource for FileMetadata {
    fn is_public(&self) -> bool {
        self.is_public
    }
}

/// Whether `caller` (or an anonymous caller, for `None`) may read `resource`.
pub fn can_read<R: SharedResource>(caller: Option<&UserId>, resource: &R) -> bool {
    resource.is_public() || caller.is_some_and(|id| id == resource.owner_id())
}

/// Whether `caller` may publish or unpublish `resource`. Owner only,
/// whatever the current visibility.
pub fn can_modify_visibility<R: OwnedResource>(caller: &UserId, resource: &R) -> bool {
    caller == resource.owner_id()
}

/// Whether `caller` may create entries under `folder`. Owner only; a
/// public folder is readable by others but stays writable by its owner alone.
pub fn can_add_child<R: OwnedResource>(caller: &UserId, folder: &R) -> bool {
    caller == folder.owner_id()
}

/// Visibility transitions of a file: `Private ⇄ Public`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    Publish,
    Unpublish,
}

impl VisibilityChange {
    /// Value of `is_public` after the transition.
    pub fn target(self) -> bool {
        matches!(self, VisibilityChange::Publish)
    }
}

/// Refusal of a file operation.
///
/// Carries no detail: a denied file and a missing file must be
/// indistinguishable to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Not found")]
pub struct AccessDenied;

/// Extension trait applying the predicates to a registry lookup result.
///
/// A missing record and a refused one both become [`AccessDenied`].
pub trait AccessCheck<T> {
    /// Return the resource if `caller` may read it.
    fn readable_by(self, caller: Option<&UserId>) -> Result<T, AccessDenied>;

    /// Return the resource if `caller` may change its visibility.
    fn visibility_mutable_by(self, caller: &UserId) -> Result<T, AccessDenied>;

    /// Return the resource if `caller` may create entries under it.
    fn children_addable_by(self, caller: &UserId) -> Result<T, AccessDenied>;
}

impl<T: SharedResource> AccessCheck<T> for Option<T> {
    fn readable_by(self, caller: Option<&UserId>) -> Result<T, AccessDenied> {
        match self {
            Some(resource) if can_read(caller, &resource) => Ok(resource),
            _ => Err(AccessDenied),
        }
    }

    fn visibility_mutable_by(self, caller: &UserId) -> Result<T, AccessDenied> {
        match self {
            Some(resource) if can_modify_visibility(caller, &resource) => Ok(resource),
            _ => Err(AccessDenied),
        }
    }

    fn children_addable_by(self, caller: &UserId) -> Result<T, AccessDenied> {
        match self {
            Some(resource) if can_add_child(caller, &resource) => Ok(resource),
            _ => Err(AccessDenied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileType;
    use chrono::Utc;

    fn file(owner: &str, is_public: bool) -> FileMetadata {
        FileMetadata {
            id: "F1".to_string(),
            owner_id: UserId::from(owner),
            name: "report.txt".to_string(),
            file_type: FileType::File,
            is_public,
            parent_id: None,
            local_path: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn public_file_readable_by_anyone() {
        let f = file("alice", true);
        assert!(can_read(None, &f));
        assert!(can_read(Some(&UserId::from("bob")), &f));
        assert!(can_read(Some(&UserId::from("alice")), &f));
    }

    #[test]
    fn private_file_readable_by_owner_only() {
        let f = file("alice", false);
        assert!(can_read(Some(&UserId::from("alice")), &f));
        assert!(!can_read(Some(&UserId::from("bob")), &f));
        assert!(!can_read(None, &f));
    }

    #[test]
    fn only_owner_modifies_visibility() {
        for is_public in [false, true] {
            let f = file("alice", is_public);
            assert!(can_modify_visibility(&UserId::from("alice"), &f));
            assert!(!can_modify_visibility(&UserId::from("bob"), &f));
        }
    }

    #[test]
    fn publish_scenario() {
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");
        let mut f1 = file("alice", false);

        assert!(!can_read(Some(&bob), &f1));
        assert!(!can_modify_visibility(&bob, &f1));

        assert!(can_modify_visibility(&alice, &f1));
        f1.is_public = VisibilityChange::Publish.target();

        assert!(can_read(Some(&bob), &f1));
        assert!(!can_modify_visibility(&bob, &f1));

        f1.is_public = VisibilityChange::Unpublish.target();
        assert!(!can_read(Some(&bob), &f1));
    }

    #[test]
    fn access_check_treats_missing_and_denied_alike() {
        let bob = UserId::from("bob");

        let missing: Option<FileMetadata> = None;
        assert_eq!(missing.readable_by(Some(&bob)), Err(AccessDenied));

        let private = Some(file("alice", false));
        assert_eq!(private.readable_by(Some(&bob)), Err(AccessDenied));

        let public = Some(file("alice", true));
        assert!(public.clone().readable_by(None).is_ok());
        assert_eq!(public.visibility_mutable_by(&bob), Err(AccessDenied));
    }

    #[test]
    fn only_owner_adds_children_even_to_public_folders() {
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");
        for is_public in [false, true] {
            let folder = Some(file("alice", is_public));
            assert_eq!(folder.clone().children_addable_by(&bob), Err(AccessDenied));
            assert!(folder.children_addable_by(&alice).is_ok());
        }
        let missing: Option<FileMetadata> = None;
        assert_eq!(missing.children_addable_by(&alice), Err(AccessDenied));
    }

    #[test]
    fn access_check_passes_owner() {
        let alice = UserId::from("alice");
        let f = Some(file("alice", false));
        assert!(f.clone().readable_by(Some(&alice)).is_ok());
        assert!(f.visibility_mutable_by(&alice).is_ok());
    }
}
