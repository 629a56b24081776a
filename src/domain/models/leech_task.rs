// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 任务阶段枚举
///
/// 一个文件的任务链固定由下载阶段和上传阶段组成
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPhase {
    /// 下载阶段
    #[default]
    Download,
    /// 上传阶段
    Upload,
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskPhase::Download => write!(f, "DOWNLOAD"),
            TaskPhase::Upload => write!(f, "UPLOAD"),
        }
    }
}

impl FromStr for TaskPhase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DOWNLOAD" => Ok(TaskPhase::Download),
            "UPLOAD" => Ok(TaskPhase::Upload),
            _ => Err(()),
        }
    }
}

/// 执行记录状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeechTaskStatus {
    /// 已接收，尚未执行完毕
    #[default]
    Initial,
    /// 执行中
    Executing,
    /// 执行完毕
    Done,
    /// 已被撤销
    Terminated,
}

impl fmt::Display for LeechTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            LeechTaskStatus::Initial => "INITIAL",
            LeechTaskStatus::Executing => "EXECUTING",
            LeechTaskStatus::Done => "DONE",
            LeechTaskStatus::Terminated => "TERMINATED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LeechTaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(LeechTaskStatus::Initial),
            "EXECUTING" => Ok(LeechTaskStatus::Executing),
            "DONE" => Ok(LeechTaskStatus::Done),
            "TERMINATED" => Ok(LeechTaskStatus::Terminated),
            _ => Err(()),
        }
    }
}

/// 执行记录实体
///
/// 将一次队列作业执行关联到具体文件和阶段。
/// 作业被工作器接收时创建，处理函数返回后标记为 Done；
/// 每个文件每个阶段每次尝试恰好产生一条记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeechTask {
    /// 记录唯一标识符
    pub id: Uuid,
    /// 队列作业执行ID
    pub job_id: Uuid,
    /// 关联的文件ID
    pub file_id: Uuid,
    /// 任务阶段
    pub phase: TaskPhase,
    /// 记录状态
    pub status: LeechTaskStatus,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl LeechTask {
    /// 在作业被接收时创建执行记录
    pub fn received(job_id: Uuid, file_id: Uuid, phase: TaskPhase) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            file_id,
            phase,
            status: LeechTaskStatus::Initial,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }
}
