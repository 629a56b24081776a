// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::leech_service::LeechService;
use crate::presentation::handlers::{leech_handler, worker_handler};
use crate::workers::manager::WorkerManager;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 健康检查
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// 构建操作者控制路由
pub fn build_router(service: Arc<LeechService>, manager: Arc<WorkerManager>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/leech", post(leech_handler::submit))
        .route("/v1/leech/retry", post(leech_handler::retry))
        .route("/v1/leech/retry/{id}", post(leech_handler::retry_single))
        .route("/v1/leech/terminate", post(leech_handler::terminate))
        .route("/v1/leech/stats", get(leech_handler::stats))
        .route("/v1/workers", post(worker_handler::scale))
        .route("/v1/workers/rate-limit", post(worker_handler::rate_limit))
        .layer(Extension(service))
        .layer(Extension(manager))
        .layer(TraceLayer::new_for_http())
}
