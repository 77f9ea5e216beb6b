//! # HTTP Routes
//!
//! Router assembly and shared application state. Each route group lives in
//! its own file: `auth`, `ocr`, `foods`, `modify`.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::ocr_client::OcrClient;

pub mod auth;
pub mod foods;
pub mod modify;
pub mod ocr;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ocr: OcrClient,
    pub config: AppConfig,
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/auth", auth::router())
        .nest("/ocr", ocr::router())
        .nest("/foods", foods::router())
        .nest("/modify", modify::router())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Nutrition Wallet Backend is running" }))
}
