// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod signin;

/// One method-dispatched endpoint: GET metadata, POST issue, PUT verify.
/// Every other method lands in the 405 fallback with its name echoed back.
pub fn router(state: AppState) -> Router {
    let signin_route = Router::new()
        .route(
            "/api/signin",
            get(signin::metadata)
                .post(signin::issue)
                .put(signin::verify)
                .fallback(signin::method_not_allowed),
        )
        .with_state(state);

    signin_route
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(signin::metadata, signin::issue, signin::verify),
    components(
        schemas(
            signin::MetadataResponse,
            signin::IssueRequest,
            signin::IssueResponse,
            signin::VerifyRequest,
            signin::ErrorResponse
        )
    ),
    tags(
        (name = "SignIn", description = "Wallet sign-in challenge issuance, verification and pairing")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::for_tests());
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn get_serves_metadata() {
        let app = router(AppState::for_tests());
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/signin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert!(body.get("label").is_some());
        assert!(body.get("icon").is_some());
    }

    #[tokio::test]
    async fn unexpected_method_is_dispatched_to_405() {
        let app = router(AppState::for_tests());
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/signin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["message"], "Unexpected method DELETE");
    }
}
