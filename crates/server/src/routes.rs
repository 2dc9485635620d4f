use std::path::Path;

use axum::{routing::get, Json, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeFile,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::errors::panic_response;
use crate::openapi::openapi_json;
use crate::records;
use crate::state::AppState;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "OK", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: landing page, health, record API and docs.
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>, cors: CorsLayer) -> Router {
    let landing = ServeFile::new(static_dir.as_ref().join("index.html"));

    Router::new()
        .route_service("/", landing)
        .route("/health", get(health))
        .route("/api/:id", get(records::get_record).post(records::put_record))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                // headers stay out of spans; Unlock-Key is a secret
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
