// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_task::TaskPhase;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 作业签名
///
/// 描述任务链中的一步：阶段、目标队列与关联文件。
/// 链式提交时，首个签名立即入队，其余签名随作业一同保存，
/// 前一步执行完毕后无条件入队下一步。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSignature {
    /// 任务阶段
    pub phase: TaskPhase,
    /// 路由队列名
    pub queue: String,
    /// 关联的文件ID
    pub file_id: Uuid,
}

/// 队列作业状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueJobStatus {
    /// 已入队，等待工作器认领
    #[default]
    Queued,
    /// 已被某个工作器认领
    Active,
    /// 处理函数已返回
    Done,
    /// 在认领前被撤销
    Revoked,
}

impl fmt::Display for QueueJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            QueueJobStatus::Queued => "QUEUED",
            QueueJobStatus::Active => "ACTIVE",
            QueueJobStatus::Done => "DONE",
            QueueJobStatus::Revoked => "REVOKED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for QueueJobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(QueueJobStatus::Queued),
            "ACTIVE" => Ok(QueueJobStatus::Active),
            "DONE" => Ok(QueueJobStatus::Done),
            "REVOKED" => Ok(QueueJobStatus::Revoked),
            _ => Err(()),
        }
    }
}

/// 队列作业实体
///
/// 任务链的持久化载体。`chain` 保存尚未入队的后续签名，
/// 工作器完成当前作业后取出链头继续入队，与作业本身的成败无关。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueJob {
    /// 作业唯一标识符，同时作为队列执行ID
    pub id: Uuid,
    /// 路由队列名，形如 `{queue-base}@{tool}`
    pub queue: String,
    /// 关联的文件ID
    pub file_id: Uuid,
    /// 任务阶段
    pub phase: TaskPhase,
    /// 剩余的链式签名
    pub chain: Vec<JobSignature>,
    /// 作业状态
    pub status: QueueJobStatus,
    /// 认领该作业的工作器
    pub lock_token: Option<String>,
    /// 认领租约的过期时间，过期后可被重新认领
    pub lock_expires_at: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl QueueJob {
    /// 从签名创建一个待认领的作业
    pub fn from_signature(signature: JobSignature, chain: Vec<JobSignature>) -> Self {
        Self {
            id: Uuid::new_v4(),
            queue: signature.queue,
            file_id: signature.file_id,
            phase: signature.phase,
            chain,
            status: QueueJobStatus::Queued,
            lock_token: None,
            lock_expires_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }
}
