// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 下载工具枚举
///
/// 标识负责解析和下载某个文件的站点适配器。
/// 每个工具值对应一个独立的下载队列 `FILE_DOWNLOAD_QUEUE@{tool}`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeechTool {
    /// Pixeldrain 文件托管
    Pixeldrain,
    /// Gofile 文件托管
    Gofile,
    /// 直链下载
    #[default]
    Direct,
}

impl LeechTool {
    /// 返回所有已注册的下载工具
    pub fn all() -> &'static [LeechTool] {
        &[LeechTool::Pixeldrain, LeechTool::Gofile, LeechTool::Direct]
    }
}

impl fmt::Display for LeechTool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LeechTool::Pixeldrain => write!(f, "PIXELDRAIN"),
            LeechTool::Gofile => write!(f, "GOFILE"),
            LeechTool::Direct => write!(f, "DIRECT"),
        }
    }
}

impl FromStr for LeechTool {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PIXELDRAIN" => Ok(LeechTool::Pixeldrain),
            "GOFILE" => Ok(LeechTool::Gofile),
            "DIRECT" => Ok(LeechTool::Direct),
            _ => Err(()),
        }
    }
}

/// 上传工具枚举
///
/// 标识文件的同步目的地，对应上传队列 `FILE_SYNC_QUEUE@{sync_tool}`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncTool {
    /// Alist 存储
    Alist,
    /// Rclone 远端
    Rclone,
}

impl SyncTool {
    /// 返回所有已注册的上传工具
    pub fn all() -> &'static [SyncTool] {
        &[SyncTool::Alist, SyncTool::Rclone]
    }
}

impl fmt::Display for SyncTool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyncTool::Alist => write!(f, "ALIST"),
            SyncTool::Rclone => write!(f, "RCLONE"),
        }
    }
}

impl FromStr for SyncTool {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALIST" => Ok(SyncTool::Alist),
            "RCLONE" => Ok(SyncTool::Rclone),
            _ => Err(()),
        }
    }
}
