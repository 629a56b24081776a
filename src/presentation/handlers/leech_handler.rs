// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::leech_request::{
    RetryRequest, RetryResponse, SubmitLeechRequest, SubmitLeechResponse, TerminateRequest,
};
use crate::domain::services::leech_service::{LeechService, LeechStats, TerminateSummary};
use crate::presentation::errors::AppError;
use axum::extract::{Extension, Path};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

/// 提交一批链接
pub async fn submit(
    Extension(service): Extension<Arc<LeechService>>,
    Json(request): Json<SubmitLeechRequest>,
) -> Result<Json<SubmitLeechResponse>, AppError> {
    let created = service
        .submit_links(&request.links, request.sync_tool, &request.sync_path)
        .await;

    Ok(Json(SubmitLeechResponse { created }))
}

/// 重试保留窗口内处于指定失败终态的全部文件
pub async fn retry(
    Extension(service): Extension<Arc<LeechService>>,
    Json(request): Json<RetryRequest>,
) -> Result<Json<RetryResponse>, AppError> {
    let retried = service.retry_failed(request.status).await?;
    Ok(Json(RetryResponse { retried }))
}

/// 按ID重试单个文件
pub async fn retry_single(
    Extension(service): Extension<Arc<LeechService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RetryResponse>, AppError> {
    let retried = service.retry_single(id).await?;
    Ok(Json(RetryResponse {
        retried: if retried { 1 } else { 0 },
    }))
}

/// 撤销指定阶段所有待处理作业
pub async fn terminate(
    Extension(service): Extension<Arc<LeechService>>,
    Json(request): Json<TerminateRequest>,
) -> Result<Json<TerminateSummary>, AppError> {
    let summary = service.terminate_pending(request.phase).await?;
    Ok(Json(summary))
}

/// 聚合统计
pub async fn stats(
    Extension(service): Extension<Arc<LeechService>>,
) -> Result<Json<LeechStats>, AppError> {
    let stats = service.stats().await?;
    Ok(Json(stats))
}
