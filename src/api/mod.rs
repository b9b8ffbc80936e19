// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{HeaderName, Method, Uri},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{CreateFileRequest, CreateUserRequest, FileResponse, FileType, TokenResponse, UserResponse},
    state::AppState,
};

pub mod app;
pub mod auth;
pub mod files;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/status", get(app::get_status))
        .route("/stats", get(app::get_stats))
        .route("/connect", get(auth::get_connect))
        .route("/disconnect", get(auth::get_disconnect))
        .route("/users", post(users::post_new))
        .route("/users/me", get(users::get_me))
        .route("/files", get(files::get_index).post(files::post_upload))
        .route("/files/{id}", get(files::get_show))
        .route("/files/{id}/publish", put(files::put_publish))
        .route("/files/{id}/unpublish", put(files::put_unpublish))
        .route("/files/{id}/data", get(files::get_file))
        .with_state(state);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Cannot {method} {uri}"))
}

/// Registers the `X-Token` and basic-auth schemes named by the handlers.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "x_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Token"))),
            );
            components.add_security_scheme(
                "basic",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        app::get_status,
        app::get_stats,
        auth::get_connect,
        auth::get_disconnect,
        users::post_new,
        users::get_me,
        files::post_upload,
        files::get_show,
        files::get_index,
        files::put_publish,
        files::put_unpublish,
        files::get_file
    ),
    components(
        schemas(
            app::StatusResponse,
            app::StatsResponse,
            TokenResponse,
            CreateUserRequest,
            UserResponse,
            CreateFileRequest,
            FileResponse,
            FileType
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "App", description = "Service status"),
        (name = "Auth", description = "Session management"),
        (name = "Users", description = "Account registration"),
        (name = "Files", description = "Folders, files and images")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use base64ct::{Base64, Encoding};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header("X-Token", token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("X-Token", token);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::default());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let app = router(AppState::default());
        let response = app.oneshot(get("/status", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_token() {
        let app = router(AppState::default());
        for uri in ["/users/me", "/disconnect", "/files", "/files/abc"] {
            let (status, _) = send(&app, get(uri, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let app = router(AppState::default());

        let (status, body) = send(&app, get("/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({"error": "Cannot GET /nope"})
        );
    }

    #[tokio::test]
    async fn bad_json_bodies_use_the_error_shape() {
        let app = router(AppState::default());

        let no_content_type = Request::builder()
            .method("POST")
            .uri("/users")
            .body(Body::from(r#"{"email":"a@b.c","password":"pw"}"#))
            .unwrap();
        let (status, body) = send(&app, no_content_type).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["error"].is_string());

        let malformed = Request::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unauthorized_body_is_the_same_everywhere() {
        let app = router(AppState::default());
        send(
            &app,
            json_request(
                "POST",
                "/users",
                None,
                json!({"email": "bob@dylan.com", "password": "toto1234!"}),
            ),
        )
        .await;

        let wrong = Base64::encode_string(b"bob@dylan.com:wrong");
        let wrong_password = Request::builder()
            .uri("/connect")
            .header(header::AUTHORIZATION, format!("Basic {wrong}"))
            .body(Body::empty())
            .unwrap();

        for request in [get("/connect", None), wrong_password, get("/users/me", Some("nope"))] {
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(
                serde_json::from_slice::<Value>(&body).unwrap(),
                json!({"error": "Unauthorized"})
            );
        }
    }

    #[tokio::test]
    async fn account_and_file_flow() {
        let app = router(AppState::default());

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/users",
                None,
                json!({"email": "bob@dylan.com", "password": "toto1234!"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let user: Value = serde_json::from_slice(&body).unwrap();

        let credentials = Base64::encode_string(b"bob@dylan.com:toto1234!");
        let connect = Request::builder()
            .uri("/connect")
            .header(header::AUTHORIZATION, format!("Basic {credentials}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, connect).await;
        assert_eq!(status, StatusCode::OK);
        let token = serde_json::from_slice::<Value>(&body).unwrap()["token"]
            .as_str()
            .unwrap()
            .to_string();

        let (status, body) = send(&app, get("/users/me", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), user);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/files",
                Some(&token),
                json!({
                    "name": "hello.txt",
                    "type": "file",
                    "parentId": 0,
                    "data": Base64::encode_string(b"Hello Webstack!"),
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let file: Value = serde_json::from_slice(&body).unwrap();
        let file_id = file["id"].as_str().unwrap().to_string();
        assert_eq!(file["userId"], user["id"]);
        assert_eq!(file["isPublic"], false);

        let data_uri = format!("/files/{file_id}/data");
        let (status, body) = send(&app, get(&data_uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({"error": "Not found"})
        );

        let (status, _) = send(&app, get(&data_uri, Some("not-a-session"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let publish = Request::builder()
            .method("PUT")
            .uri(format!("/files/{file_id}/publish"))
            .header("X-Token", &token)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, publish).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, get(&data_uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Hello Webstack!");

        let (status, _) = send(&app, get("/disconnect", Some(&token))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, get("/users/me", Some(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn openapi_registers_security_schemes() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("x_token"));
        assert!(components.security_schemes.contains_key("basic"));
    }
}
