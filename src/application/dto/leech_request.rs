// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_file::LeechFileStatus;
use crate::domain::models::leech_task::TaskPhase;
use crate::domain::models::tool::SyncTool;
use crate::domain::models::worker::RatePeriod;
use serde::{Deserialize, Serialize};

/// 链接提交请求
#[derive(Debug, Deserialize)]
pub struct SubmitLeechRequest {
    /// 待解析的链接列表
    pub links: Vec<String>,
    /// 上传工具
    pub sync_tool: SyncTool,
    /// 上传目的地路径
    pub sync_path: String,
}

/// 链接提交响应
#[derive(Debug, Serialize)]
pub struct SubmitLeechResponse {
    /// 创建的任务数
    pub created: u64,
}

/// 批量重试请求
#[derive(Debug, Deserialize)]
pub struct RetryRequest {
    /// 要重试的失败终态，DownloadFail 或 UploadFail
    pub status: LeechFileStatus,
}

/// 批量重试响应
#[derive(Debug, Serialize)]
pub struct RetryResponse {
    /// 重新提交的任务数
    pub retried: u64,
}

/// 撤销请求
#[derive(Debug, Deserialize)]
pub struct TerminateRequest {
    /// 要撤销的任务阶段
    pub phase: TaskPhase,
}

/// 工作器伸缩请求
#[derive(Debug, Deserialize)]
pub struct WorkerScaleRequest {
    /// 任务阶段
    pub phase: TaskPhase,
    /// 工具值，决定绑定的队列
    pub tool: String,
    /// 目标并发数，0 表示停机
    pub concurrency: i32,
}

/// 工作器伸缩响应
#[derive(Debug, Serialize)]
pub struct WorkerScaleResponse {
    /// 伸缩结果描述
    pub outcome: String,
}

/// 速率限制请求
#[derive(Debug, Deserialize)]
pub struct RateLimitRequest {
    /// 目标工作器主机名
    pub hostname: String,
    /// 周期内允许的作业数，省略表示清除限制
    pub amount: Option<u32>,
    /// 计数周期
    pub period: Option<RatePeriod>,
}
