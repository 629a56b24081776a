// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adaptors::traits::Uploader;
use crate::adaptors::uploaders::remote_file_path;
use crate::domain::models::leech_file::{LeechFile, LeechFileStatus};
use crate::domain::models::tool::SyncTool;
use async_trait::async_trait;
use tokio::process::Command;

/// Rclone 上传适配器
///
/// 调用 rclone 子进程把暂存文件复制到远端，
/// `sync_path` 为 rclone 远端标识（形如 `remote:path`）。
pub struct RcloneUploader {
    binary: String,
}

impl RcloneUploader {
    pub fn new(binary: String) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl Uploader for RcloneUploader {
    fn name(&self) -> &'static str {
        "rclone"
    }

    fn matches(&self, sync_tool: SyncTool) -> bool {
        sync_tool == SyncTool::Rclone
    }

    async fn transfer(&self, mut file: LeechFile) -> anyhow::Result<LeechFile> {
        let remote_path = remote_file_path(&file);

        let output = Command::new(&self.binary)
            .arg("copyto")
            .arg(file.full_name())
            .arg(&remote_path)
            .output()
            .await?;

        if output.status.success() {
            file.upload_status = LeechFileStatus::UploadSuccess;
        } else {
            file.upload_status = LeechFileStatus::UploadFail;
            file.upload_reason = Some(format!(
                "rclone copyto \"{}\" failed: {}",
                remote_path,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(file)
    }
}
