//! HTTP surface of the demo: generation jobs, the voice catalog and usage.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use voicelab_core::DemoService;

pub mod generate;
pub mod usage;
pub mod voices;

pub struct AppState {
    pub service: DemoService,
}

impl AppState {
    pub fn new(service: DemoService) -> Self {
        Self { service }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/demo/generate",
            get(generate::status)
                .post(generate::submit)
                .delete(generate::cancel),
        )
        .route("/api/demo/voices", get(voices::list))
        .route("/api/demo/voices/:voice_id/preview", get(voices::preview))
        .route("/api/demo/usage", get(usage::report))
        .with_state(state)
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}
