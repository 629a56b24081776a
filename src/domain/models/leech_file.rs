// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::tool::{LeechTool, SyncTool};
use crate::utils::hash::content_hash;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 文件实体
///
/// 表示一个可被拉取的远端文件。文件由解析器创建，
/// 先后经过下载流水线和上传流水线，两条状态机相互独立：
/// `status` 跟踪下载阶段，`upload_status` 跟踪上传阶段。
/// 记录不会被核心逻辑删除，重试时两条状态机同时重置为 Initial。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeechFile {
    /// 文件唯一标识符
    pub id: uuid::Uuid,
    /// 文件来源链接
    pub link: String,
    /// 适配器解析出的实际下载地址（可选）
    pub actual_link: Option<String>,
    /// 适配器解析出的访问令牌（可选）
    pub token: Option<String>,
    /// 负责下载该文件的工具
    pub tool: LeechTool,
    /// 下载状态
    pub status: LeechFileStatus,
    /// 上传状态
    pub upload_status: LeechFileStatus,
    /// 负责上传该文件的工具
    pub sync_tool: Option<SyncTool>,
    /// 上传目的地路径
    pub sync_path: Option<String>,
    /// 文件名
    pub name: Option<String>,
    /// 下载失败原因
    pub reason: Option<String>,
    /// 上传失败原因
    pub upload_reason: Option<String>,
    /// 远端目录名，用于归档分组
    pub remote_folder: Option<String>,
    /// 本地暂存目录
    pub location: Option<String>,
    /// 文件大小（字节）
    pub size: Option<i64>,
    /// 去重键，由 (tool, remote_folder, name) 派生，创建后不再变化
    pub content_hash: Option<String>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// 文件状态枚举
///
/// 同一枚举同时服务于下载与上传两条状态机：
/// 下载：Initial → Downloading → {DownloadSuccess | DownloadFail}，
/// 或 Initial → SkipDownload（去重命中）。
/// 上传：Initial → Uploading → {UploadSuccess | UploadFail}，
/// 或 Initial → SkipUpload（下载未成功）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeechFileStatus {
    /// 初始状态
    #[default]
    Initial,
    /// 下载中
    Downloading,
    /// 下载成功
    DownloadSuccess,
    /// 下载失败
    DownloadFail,
    /// 跳过下载
    SkipDownload,
    /// 上传中
    Uploading,
    /// 上传成功
    UploadSuccess,
    /// 上传失败
    UploadFail,
    /// 跳过上传
    SkipUpload,
}

impl LeechFileStatus {
    /// 判断是否为下载阶段的终结状态
    pub fn is_download_terminal(&self) -> bool {
        matches!(
            self,
            LeechFileStatus::DownloadSuccess
                | LeechFileStatus::DownloadFail
                | LeechFileStatus::SkipDownload
        )
    }

    /// 判断是否为上传阶段的终结状态
    pub fn is_upload_terminal(&self) -> bool {
        matches!(
            self,
            LeechFileStatus::UploadSuccess
                | LeechFileStatus::UploadFail
                | LeechFileStatus::SkipUpload
        )
    }
}

impl fmt::Display for LeechFileStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            LeechFileStatus::Initial => "INITIAL",
            LeechFileStatus::Downloading => "DOWNLOADING",
            LeechFileStatus::DownloadSuccess => "DOWNLOAD_SUCCESS",
            LeechFileStatus::DownloadFail => "DOWNLOAD_FAIL",
            LeechFileStatus::SkipDownload => "SKIP_DOWNLOAD",
            LeechFileStatus::Uploading => "UPLOADING",
            LeechFileStatus::UploadSuccess => "UPLOAD_SUCCESS",
            LeechFileStatus::UploadFail => "UPLOAD_FAIL",
            LeechFileStatus::SkipUpload => "SKIP_UPLOAD",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LeechFileStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(LeechFileStatus::Initial),
            "DOWNLOADING" => Ok(LeechFileStatus::Downloading),
            "DOWNLOAD_SUCCESS" => Ok(LeechFileStatus::DownloadSuccess),
            "DOWNLOAD_FAIL" => Ok(LeechFileStatus::DownloadFail),
            "SKIP_DOWNLOAD" => Ok(LeechFileStatus::SkipDownload),
            "UPLOADING" => Ok(LeechFileStatus::Uploading),
            "UPLOAD_SUCCESS" => Ok(LeechFileStatus::UploadSuccess),
            "UPLOAD_FAIL" => Ok(LeechFileStatus::UploadFail),
            "SKIP_UPLOAD" => Ok(LeechFileStatus::SkipUpload),
            _ => Err(()),
        }
    }
}

impl LeechFile {
    /// 创建一个新的文件记录
    ///
    /// # 参数
    ///
    /// * `link` - 文件来源链接
    /// * `tool` - 负责下载的工具
    ///
    /// # 返回值
    ///
    /// 返回两条状态机均处于 Initial 的新文件记录
    pub fn new(link: String, tool: LeechTool) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            link,
            actual_link: None,
            token: None,
            tool,
            status: LeechFileStatus::Initial,
            upload_status: LeechFileStatus::Initial,
            sync_tool: None,
            sync_path: None,
            name: None,
            reason: None,
            upload_reason: None,
            remote_folder: None,
            location: None,
            size: None,
            content_hash: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    /// 计算并固化去重键与暂存目录
    ///
    /// 去重键由 (tool, remote_folder, name) 确定性派生，
    /// 暂存目录为 `{download_root}/{content_hash}`。
    pub fn seal(&mut self, download_root: &str) {
        let hash = content_hash(
            self.tool,
            self.remote_folder.as_deref().unwrap_or(""),
            self.name.as_deref().unwrap_or(""),
        );
        self.location = Some(format!("{}/{}", download_root.trim_end_matches('/'), hash));
        self.content_hash = Some(hash);
    }

    /// 暂存文件的最终路径
    pub fn full_name(&self) -> String {
        format!("{}/tmp", self.location.as_deref().unwrap_or(""))
    }

    /// 暂存文件的临时路径，下载过程写入此处
    pub fn temp_full_name(&self) -> String {
        format!("{}.part", self.full_name())
    }

    /// 实际下载地址，未经适配器解析时退回原始链接
    pub fn fetch_link(&self) -> &str {
        self.actual_link.as_deref().unwrap_or(&self.link)
    }

    /// 重置两条状态机，准备重新提交任务链
    pub fn reset_for_retry(&mut self) {
        self.status = LeechFileStatus::Initial;
        self.upload_status = LeechFileStatus::Initial;
        self.reason = None;
        self.upload_reason = None;
        self.updated_at = Some(Utc::now().into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal_sets() {
        assert!(LeechFileStatus::DownloadSuccess.is_download_terminal());
        assert!(LeechFileStatus::DownloadFail.is_download_terminal());
        assert!(LeechFileStatus::SkipDownload.is_download_terminal());
        assert!(!LeechFileStatus::Downloading.is_download_terminal());
        assert!(!LeechFileStatus::Initial.is_download_terminal());

        assert!(LeechFileStatus::UploadSuccess.is_upload_terminal());
        assert!(LeechFileStatus::UploadFail.is_upload_terminal());
        assert!(LeechFileStatus::SkipUpload.is_upload_terminal());
        assert!(!LeechFileStatus::Uploading.is_upload_terminal());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            LeechFileStatus::Initial,
            LeechFileStatus::Downloading,
            LeechFileStatus::DownloadSuccess,
            LeechFileStatus::DownloadFail,
            LeechFileStatus::SkipDownload,
            LeechFileStatus::Uploading,
            LeechFileStatus::UploadSuccess,
            LeechFileStatus::UploadFail,
            LeechFileStatus::SkipUpload,
        ] {
            assert_eq!(status.to_string().parse::<LeechFileStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_seal_is_deterministic() {
        let mut a = LeechFile::new("https://example.com/f/abc".into(), LeechTool::Direct);
        a.name = Some("video.mp4".into());
        a.remote_folder = Some("folder".into());
        a.seal("/data/leech");

        let mut b = LeechFile::new("https://example.com/other".into(), LeechTool::Direct);
        b.name = Some("video.mp4".into());
        b.remote_folder = Some("folder".into());
        b.seal("/data/leech");

        // 去重键只取决于 (tool, remote_folder, name)，与链接无关
        assert_eq!(a.content_hash, b.content_hash);
        assert_eq!(a.location, b.location);
        assert!(a.full_name().ends_with("/tmp"));
        assert_eq!(a.temp_full_name(), format!("{}.part", a.full_name()));
    }

    #[test]
    fn test_reset_for_retry() {
        let mut file = LeechFile::new("https://example.com/f/abc".into(), LeechTool::Direct);
        file.status = LeechFileStatus::DownloadFail;
        file.upload_status = LeechFileStatus::SkipUpload;
        file.reason = Some("404".into());

        file.reset_for_retry();

        assert_eq!(file.status, LeechFileStatus::Initial);
        assert_eq!(file.upload_status, LeechFileStatus::Initial);
        assert!(file.reason.is_none());
        assert!(file.upload_reason.is_none());
    }
}
