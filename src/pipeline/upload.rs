// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adaptors::AdaptorRegistry;
use crate::domain::models::leech_file::{LeechFile, LeechFileStatus};
use crate::pipeline::UploadStage;
use crate::utils::fs::clean_local_file;
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use tracing::{error, warn};

/// 上传流水线
///
/// 固定阶段链：前置条件检查 → 站点传输 → 清理。
/// 与下载流水线相同的边界吸收策略，但失败时不清理暂存产物，
/// 留给操作者检查或重试。
pub struct UploadPipeline {
    registry: Arc<AdaptorRegistry>,
}

impl UploadPipeline {
    pub fn new(registry: Arc<AdaptorRegistry>) -> Self {
        Self { registry }
    }

    /// 执行上传流水线
    pub async fn execute(&self, mut file: LeechFile) -> LeechFile {
        let stages: Vec<Box<dyn UploadStage>> = vec![
            Box::new(CheckBeforeUpload),
            Box::new(TransferStage {
                registry: self.registry.clone(),
            }),
            Box::new(CleanTempFile),
        ];

        for stage in &stages {
            if let Err(e) = stage.run(&mut file).await {
                error!(
                    "Failed to upload file \"{}\" to \"{}\": {}",
                    file.name.as_deref().unwrap_or("unknown"),
                    file.sync_path.as_deref().unwrap_or("unknown"),
                    e
                );
                file.upload_status = LeechFileStatus::UploadFail;
                file.upload_reason = Some(e.to_string());
                break;
            }
        }

        counter!("leech_upload_total", "status" => file.upload_status.to_string()).increment(1);
        file
    }
}

/// 前置条件检查阶段
///
/// 下载被去重跳过的文件没有可传输的内容，静默跳过上传；
/// 下载未成功或上传阶段未正常进入时，以中断原因跳过上传。
struct CheckBeforeUpload;

#[async_trait]
impl UploadStage for CheckBeforeUpload {
    fn name(&self) -> &'static str {
        "check_before_upload"
    }

    async fn run(&self, file: &mut LeechFile) -> anyhow::Result<()> {
        if file.status == LeechFileStatus::SkipDownload
            && file.upload_status == LeechFileStatus::Uploading
        {
            file.upload_status = LeechFileStatus::SkipUpload;
            return Ok(());
        }

        if file.status != LeechFileStatus::DownloadSuccess
            || file.upload_status != LeechFileStatus::Uploading
        {
            file.upload_reason = Some(
                "File may not download properly or upload process has been interrupted."
                    .to_string(),
            );
            file.upload_status = LeechFileStatus::SkipUpload;
        }

        Ok(())
    }
}

/// 站点传输阶段，由上传适配器提供实现
struct TransferStage {
    registry: Arc<AdaptorRegistry>,
}

#[async_trait]
impl UploadStage for TransferStage {
    fn name(&self) -> &'static str {
        "transfer"
    }

    async fn run(&self, file: &mut LeechFile) -> anyhow::Result<()> {
        if file.upload_status != LeechFileStatus::Uploading {
            return Ok(());
        }

        let uploader = file
            .sync_tool
            .and_then(|sync_tool| self.registry.uploader_for(sync_tool));

        let Some(uploader) = uploader else {
            let reason = "Sync service not found.";
            warn!("{}", reason);
            file.upload_status = LeechFileStatus::UploadFail;
            file.upload_reason = Some(reason.to_string());
            return Ok(());
        };

        *file = uploader.transfer(file.clone()).await?;
        Ok(())
    }
}

/// 清理阶段
///
/// 仅在上传成功后删除暂存文件，并移除因此变空的暂存目录
struct CleanTempFile;

#[async_trait]
impl UploadStage for CleanTempFile {
    fn name(&self) -> &'static str {
        "clean_temp_file"
    }

    async fn run(&self, file: &mut LeechFile) -> anyhow::Result<()> {
        if file.upload_status == LeechFileStatus::UploadSuccess {
            clean_local_file(file);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptors::traits::{Downloader, Parser, Uploader};
    use crate::domain::models::tool::{LeechTool, SyncTool};
    use std::path::Path;

    /// 总是成功的上传适配器
    struct OkUploader;

    #[async_trait]
    impl Uploader for OkUploader {
        fn name(&self) -> &'static str {
            "ok"
        }

        fn matches(&self, _sync_tool: SyncTool) -> bool {
            true
        }

        async fn transfer(&self, mut file: LeechFile) -> anyhow::Result<LeechFile> {
            file.upload_status = LeechFileStatus::UploadSuccess;
            Ok(file)
        }
    }

    /// 总是抛错的上传适配器
    struct BrokenUploader;

    #[async_trait]
    impl Uploader for BrokenUploader {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn matches(&self, _sync_tool: SyncTool) -> bool {
            true
        }

        async fn transfer(&self, _file: LeechFile) -> anyhow::Result<LeechFile> {
            anyhow::bail!("remote storage is on fire")
        }
    }

    fn registry_with_uploader(uploader: Arc<dyn Uploader>) -> Arc<AdaptorRegistry> {
        let parsers: Vec<Arc<dyn Parser>> = Vec::new();
        let downloaders: Vec<Arc<dyn Downloader>> = Vec::new();
        Arc::new(AdaptorRegistry::with_adaptors(
            parsers,
            downloaders,
            vec![uploader],
        ))
    }

    fn uploading_file(root: &tempfile::TempDir) -> LeechFile {
        let mut file = LeechFile::new("https://example.com/f/abc".into(), LeechTool::Direct);
        file.name = Some("video.mp4".into());
        file.remote_folder = Some("video.mp4".into());
        file.sync_tool = Some(SyncTool::Rclone);
        file.sync_path = Some("remote:backup".into());
        file.seal(root.path().to_str().unwrap());
        file.status = LeechFileStatus::DownloadSuccess;
        file.upload_status = LeechFileStatus::Uploading;
        file
    }

    #[tokio::test]
    async fn test_skip_download_skips_upload_silently() {
        let root = tempfile::tempdir().unwrap();
        let mut file = uploading_file(&root);
        file.status = LeechFileStatus::SkipDownload;

        let pipeline = UploadPipeline::new(registry_with_uploader(Arc::new(OkUploader)));
        let result = pipeline.execute(file).await;

        assert_eq!(result.upload_status, LeechFileStatus::SkipUpload);
        assert!(result.upload_reason.is_none());
    }

    #[tokio::test]
    async fn test_failed_download_skips_upload_with_interrupted_reason() {
        let root = tempfile::tempdir().unwrap();
        let mut file = uploading_file(&root);
        file.status = LeechFileStatus::DownloadFail;

        let pipeline = UploadPipeline::new(registry_with_uploader(Arc::new(OkUploader)));
        let result = pipeline.execute(file).await;

        assert_eq!(result.upload_status, LeechFileStatus::SkipUpload);
        assert!(result.upload_reason.unwrap().contains("interrupted"));
    }

    #[tokio::test]
    async fn test_success_cleans_staged_artifacts() {
        let root = tempfile::tempdir().unwrap();
        let file = uploading_file(&root);
        let location = file.location.clone().unwrap();
        std::fs::create_dir_all(&location).unwrap();
        std::fs::write(file.full_name(), b"payload").unwrap();

        let pipeline = UploadPipeline::new(registry_with_uploader(Arc::new(OkUploader)));
        let result = pipeline.execute(file).await;

        assert_eq!(result.upload_status, LeechFileStatus::UploadSuccess);
        assert!(!Path::new(&result.full_name()).exists());
        assert!(!Path::new(&location).exists());
    }

    #[tokio::test]
    async fn test_transfer_error_keeps_staged_artifacts() {
        let root = tempfile::tempdir().unwrap();
        let file = uploading_file(&root);
        std::fs::create_dir_all(file.location.as_deref().unwrap()).unwrap();
        std::fs::write(file.full_name(), b"payload").unwrap();

        let pipeline = UploadPipeline::new(registry_with_uploader(Arc::new(BrokenUploader)));
        let result = pipeline.execute(file).await;

        assert_eq!(result.upload_status, LeechFileStatus::UploadFail);
        assert!(result.upload_reason.as_ref().unwrap().contains("on fire"));
        // 失败时暂存文件保留，供人工检查或重试
        assert!(Path::new(&result.full_name()).exists());
    }

    #[tokio::test]
    async fn test_missing_uploader_marks_upload_fail() {
        let root = tempfile::tempdir().unwrap();
        let file = uploading_file(&root);

        let parsers: Vec<Arc<dyn Parser>> = Vec::new();
        let downloaders: Vec<Arc<dyn Downloader>> = Vec::new();
        let uploaders: Vec<Arc<dyn Uploader>> = Vec::new();
        let pipeline = UploadPipeline::new(Arc::new(AdaptorRegistry::with_adaptors(
            parsers,
            downloaders,
            uploaders,
        )));

        let result = pipeline.execute(file).await;

        assert_eq!(result.upload_status, LeechFileStatus::UploadFail);
        assert_eq!(result.upload_reason.as_deref(), Some("Sync service not found."));
    }
}
