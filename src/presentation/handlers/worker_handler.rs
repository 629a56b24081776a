// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::leech_request::{
    RateLimitRequest, WorkerScaleRequest, WorkerScaleResponse,
};
use crate::domain::models::worker::RateLimit;
use crate::presentation::errors::AppError;
use crate::workers::manager::{ScaleOutcome, WorkerManager};
use axum::extract::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// 启动、停机或调整工作器并发
pub async fn scale(
    Extension(manager): Extension<Arc<WorkerManager>>,
    Json(request): Json<WorkerScaleRequest>,
) -> Result<Json<WorkerScaleResponse>, AppError> {
    let outcome = manager
        .scale_worker(request.phase, &request.tool, request.concurrency)
        .await?;

    let outcome = match outcome {
        ScaleOutcome::Started => "started",
        ScaleOutcome::Stopped => "stopped",
        ScaleOutcome::Resized => "resized",
    };

    Ok(Json(WorkerScaleResponse {
        outcome: outcome.to_string(),
    }))
}

/// 设置或清除工作器速率限制
pub async fn rate_limit(
    Extension(manager): Extension<Arc<WorkerManager>>,
    Json(request): Json<RateLimitRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let rate = match (request.amount, request.period) {
        (Some(amount), Some(period)) => Some(RateLimit { amount, period }),
        _ => None,
    };

    manager.set_rate_limit(&request.hostname, rate).await?;

    Ok(Json(json!({ "ok": true })))
}
