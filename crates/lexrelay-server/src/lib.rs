//! HTTP relay between LexRelay clients and the model provider.
//!
//! The server keeps no conversation state: each `POST /api/ai/chat` carries
//! the full history and is answered with the provider's frame stream.

pub mod config;
pub mod middleware;
pub mod relay;
mod upstream;

use axum::{
    Extension, Json, Router,
    http::{Method, header},
    routing::{get, post},
};
use config::ServerConfig;
use lexrelay_core::CHAT_PATH;
use middleware::{ApiKeyManager, CallerGate, RateLimiter, auth_middleware, rate_limit_middleware};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use upstream::UpstreamClient;

#[derive(Clone)]
pub struct AppState {
    upstream: Arc<UpstreamClient>,
    default_model: String,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            upstream: Arc::new(UpstreamClient::new(
                &config.upstream_url,
                config.upstream_api_key.clone(),
            )),
            default_model: config.default_model.clone(),
        }
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub fn build_router(config: &ServerConfig) -> Router {
    let gate = Arc::new(CallerGate::new(
        ApiKeyManager::new(&config.api_keys),
        config.jwt_secret.clone(),
    ));
    if gate.is_open() {
        tracing::info!("No API keys or JWT secret configured, caller gate is open");
    }
    let limiter = RateLimiter::new(config.rate_limit_per_minute);

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route(CHAT_PATH, post(relay::chat_handler))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::middleware::from_fn(auth_middleware))
        .layer(Extension(gate))
        .layer(Extension(limiter))
        .layer(cors)
        .with_state(AppState::from_config(config))
}
