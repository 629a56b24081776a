// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_file::LeechFileStatus;
use crate::domain::models::leech_task::TaskPhase;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 通知状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    /// 待投递
    #[default]
    Initial,
    /// 已投递
    AlreadySent,
    /// 已丢弃，不需要通知操作者
    Discard,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            MessageStatus::Initial => "INITIAL",
            MessageStatus::AlreadySent => "ALREADY_SENT",
            MessageStatus::Discard => "DISCARD",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MessageStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(MessageStatus::Initial),
            "ALREADY_SENT" => Ok(MessageStatus::AlreadySent),
            "DISCARD" => Ok(MessageStatus::Discard),
            _ => Err(()),
        }
    }
}

/// 通知实体
///
/// 阶段执行结束后立即创建，由通知轮询循环恰好消费一次。
/// 投递失败的记录保持 Initial，下一个轮询周期重试。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeechMessage {
    /// 通知唯一标识符
    pub id: Uuid,
    /// 产生通知的任务阶段
    pub phase: TaskPhase,
    /// 关联的文件ID
    pub file_id: Uuid,
    /// 预渲染的通知正文
    pub content: String,
    /// 通知状态
    pub status: MessageStatus,
    /// 产生通知时的文件状态
    pub file_status: LeechFileStatus,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl LeechMessage {
    /// 创建一条待投递的通知
    pub fn pending(
        phase: TaskPhase,
        file_id: Uuid,
        content: String,
        file_status: LeechFileStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase,
            file_id,
            content,
            status: MessageStatus::Initial,
            file_status,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    /// 判断该通知是否需要投递给操作者
    ///
    /// 只有终态失败、上传成功与去重跳过需要提示，其余状态直接丢弃
    pub fn should_deliver(&self) -> bool {
        matches!(
            self.file_status,
            LeechFileStatus::UploadSuccess
                | LeechFileStatus::UploadFail
                | LeechFileStatus::DownloadFail
                | LeechFileStatus::SkipDownload
        )
    }

    /// 判断该通知是否应当附带重试入口
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.file_status,
            LeechFileStatus::DownloadFail | LeechFileStatus::UploadFail
        )
    }
}
