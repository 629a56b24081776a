// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("仓库错误: {0}")]
    RepositoryError(String),

    #[error("队列错误: {0}")]
    QueueError(String),

    #[error("控制通道错误: {0}")]
    ControlError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error("未找到: {0}")]
    NotFound(String),
}

/// 控制通道错误类型
#[derive(Error, Debug)]
pub enum ControlError {
    /// Redis错误
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 等待确认超时
    #[error("Timed out waiting for acknowledgement")]
    AckTimeout,
}
