// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adaptors::traits::Downloader;
use crate::adaptors::AdaptorRegistry;
use crate::domain::models::leech_file::{LeechFile, LeechFileStatus};
use crate::domain::repositories::leech_file_repository::LeechFileRepository;
use crate::pipeline::DownloadStage;
use crate::utils::fs::clean_local_file;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use metrics::counter;
use std::sync::Arc;
use tracing::{error, warn};

/// 下载流水线
///
/// 固定阶段链：去重/存在性检查 → 站点拉取 → 大小校验 → 原子落位。
/// 适配器分发失败与阶段错误都被吸收进文件状态，执行永远正常返回。
pub struct DownloadPipeline {
    file_repo: Arc<dyn LeechFileRepository>,
    registry: Arc<AdaptorRegistry>,
    skip_duplicate_within_days: i64,
}

impl DownloadPipeline {
    pub fn new(
        file_repo: Arc<dyn LeechFileRepository>,
        registry: Arc<AdaptorRegistry>,
        skip_duplicate_within_days: i64,
    ) -> Self {
        Self {
            file_repo,
            registry,
            skip_duplicate_within_days,
        }
    }

    /// 执行下载流水线
    pub async fn execute(&self, mut file: LeechFile) -> LeechFile {
        let Some(downloader) = self.registry.downloader_for(&file) else {
            let reason = "Download service not found.";
            warn!("{}", reason);
            file.status = LeechFileStatus::DownloadFail;
            file.reason = Some(reason.to_string());
            return file;
        };

        let stages: Vec<Box<dyn DownloadStage>> = vec![
            Box::new(CheckBeforeDownload {
                file_repo: self.file_repo.clone(),
                skip_duplicate_within_days: self.skip_duplicate_within_days,
            }),
            Box::new(FetchStage { downloader }),
            Box::new(CheckAfterDownload),
            Box::new(MoveFile),
        ];

        for stage in &stages {
            if let Err(e) = stage.run(&mut file).await {
                error!("Download stage {} failed: {}", stage.name(), e);
                file.status = LeechFileStatus::DownloadFail;
                file.reason = Some(e.to_string());
                clean_local_file(&file);
                break;
            }
        }

        counter!("leech_download_total", "status" => file.status.to_string()).increment(1);
        file
    }
}

/// 去重与存在性检查阶段
///
/// 去重窗口内存在同哈希且两阶段均成功的记录时短路为 SkipDownload；
/// 本地已有非空暂存文件时短路为 DownloadSuccess（幂等重跑）；
/// 否则确保暂存目录存在后放行。
struct CheckBeforeDownload {
    file_repo: Arc<dyn LeechFileRepository>,
    skip_duplicate_within_days: i64,
}

#[async_trait]
impl DownloadStage for CheckBeforeDownload {
    fn name(&self) -> &'static str {
        "check_before_download"
    }

    async fn run(&self, file: &mut LeechFile) -> anyhow::Result<()> {
        if file.status != LeechFileStatus::Downloading {
            return Ok(());
        }

        if let Some(hash) = file.content_hash.as_deref() {
            let since = Utc::now() - Duration::days(self.skip_duplicate_within_days);

            if self
                .file_repo
                .find_duplicate(hash, since.into())
                .await?
                .is_some()
            {
                file.status = LeechFileStatus::SkipDownload;
                file.reason = Some(format!(
                    "File has been downloaded within {} days",
                    self.skip_duplicate_within_days
                ));
                return Ok(());
            }
        }

        let full_name = file.full_name();
        if let Ok(meta) = std::fs::metadata(&full_name) {
            if meta.len() > 0 {
                file.status = LeechFileStatus::DownloadSuccess;
                file.size = Some(meta.len() as i64);
                file.reason = Some("File already exist.".to_string());
                return Ok(());
            }
        }

        if let Some(location) = file.location.as_deref() {
            std::fs::create_dir_all(location)?;
        }

        Ok(())
    }
}

/// 站点拉取阶段，由下载适配器提供实现
struct FetchStage {
    downloader: Arc<dyn Downloader>,
}

#[async_trait]
impl DownloadStage for FetchStage {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn run(&self, file: &mut LeechFile) -> anyhow::Result<()> {
        if file.status != LeechFileStatus::Downloading {
            return Ok(());
        }

        *file = self.downloader.fetch(file.clone()).await?;
        Ok(())
    }
}

/// 大小校验阶段
///
/// 声明大小与临时文件实际大小不一致时判定为疑似损坏，
/// 与传输失败区分开，便于操作者定位。
struct CheckAfterDownload;

#[async_trait]
impl DownloadStage for CheckAfterDownload {
    fn name(&self) -> &'static str {
        "check_after_download"
    }

    async fn run(&self, file: &mut LeechFile) -> anyhow::Result<()> {
        if file.status != LeechFileStatus::Downloading {
            return Ok(());
        }

        let temp_full_name = file.temp_full_name();
        if let Ok(meta) = std::fs::metadata(&temp_full_name) {
            if file.size != Some(meta.len() as i64) {
                file.status = LeechFileStatus::DownloadFail;
                file.reason = Some(format!(
                    "{} size check failed, file could be broken.",
                    temp_full_name
                ));
            }
        }

        Ok(())
    }
}

/// 原子落位阶段
///
/// 仅当临时文件大小与声明一致时重命名到最终路径并标记成功
struct MoveFile;

#[async_trait]
impl DownloadStage for MoveFile {
    fn name(&self) -> &'static str {
        "move_file"
    }

    async fn run(&self, file: &mut LeechFile) -> anyhow::Result<()> {
        if file.status != LeechFileStatus::Downloading {
            return Ok(());
        }

        let temp_full_name = file.temp_full_name();
        if let Ok(meta) = std::fs::metadata(&temp_full_name) {
            if file.size == Some(meta.len() as i64) {
                std::fs::rename(&temp_full_name, file.full_name())?;
                file.status = LeechFileStatus::DownloadSuccess;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptors::traits::Parser;
    use crate::adaptors::traits::Uploader;
    use crate::domain::models::tool::LeechTool;
    use crate::domain::repositories::RepositoryError;
    use chrono::{DateTime, FixedOffset};
    use parking_lot::Mutex;
    use std::path::Path;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// 去重查询可注入结果的文件仓库
    struct MockFileRepository {
        duplicate: Mutex<Option<LeechFile>>,
    }

    impl MockFileRepository {
        fn empty() -> Self {
            Self {
                duplicate: Mutex::new(None),
            }
        }

        fn with_duplicate(file: LeechFile) -> Self {
            Self {
                duplicate: Mutex::new(Some(file)),
            }
        }
    }

    #[async_trait]
    impl LeechFileRepository for MockFileRepository {
        async fn create(&self, file: &LeechFile) -> Result<LeechFile, RepositoryError> {
            Ok(file.clone())
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Option<LeechFile>, RepositoryError> {
            Ok(None)
        }

        async fn update(&self, file: &LeechFile) -> Result<LeechFile, RepositoryError> {
            Ok(file.clone())
        }

        async fn find_duplicate(
            &self,
            _content_hash: &str,
            _since: DateTime<FixedOffset>,
        ) -> Result<Option<LeechFile>, RepositoryError> {
            Ok(self.duplicate.lock().clone())
        }

        async fn find_by_status(
            &self,
            _status: LeechFileStatus,
            _since: DateTime<FixedOffset>,
        ) -> Result<Vec<LeechFile>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn find_by_upload_status(
            &self,
            _status: LeechFileStatus,
            _since: DateTime<FixedOffset>,
        ) -> Result<Vec<LeechFile>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn count_by_status(&self, _status: LeechFileStatus) -> Result<u64, RepositoryError> {
            Ok(0)
        }

        async fn count_by_upload_status(
            &self,
            _status: LeechFileStatus,
        ) -> Result<u64, RepositoryError> {
            Ok(0)
        }
    }

    /// 一旦被调用立即失败的下载适配器，用于验证网络短路
    struct PanicDownloader;

    #[async_trait]
    impl Downloader for PanicDownloader {
        fn name(&self) -> &'static str {
            "panic"
        }

        fn matches(&self, _file: &LeechFile) -> bool {
            true
        }

        async fn fetch(&self, _file: LeechFile) -> anyhow::Result<LeechFile> {
            panic!("fetch must not be reached");
        }
    }

    /// 写入临时文件但谎报大小的下载适配器
    struct LyingDownloader;

    #[async_trait]
    impl Downloader for LyingDownloader {
        fn name(&self) -> &'static str {
            "lying"
        }

        fn matches(&self, _file: &LeechFile) -> bool {
            true
        }

        async fn fetch(&self, mut file: LeechFile) -> anyhow::Result<LeechFile> {
            tokio::fs::write(file.temp_full_name(), b"short").await?;
            file.size = Some(9999);
            Ok(file)
        }
    }

    fn registry_with_downloader(downloader: Arc<dyn Downloader>) -> Arc<AdaptorRegistry> {
        let parsers: Vec<Arc<dyn Parser>> = Vec::new();
        let uploaders: Vec<Arc<dyn Uploader>> = Vec::new();
        Arc::new(AdaptorRegistry::with_adaptors(
            parsers,
            vec![downloader],
            uploaders,
        ))
    }

    fn downloading_file(root: &tempfile::TempDir, link: &str) -> LeechFile {
        let mut file = LeechFile::new(link.to_string(), LeechTool::Direct);
        file.name = Some("video.mp4".into());
        file.remote_folder = Some("video.mp4".into());
        file.seal(root.path().to_str().unwrap());
        file.status = LeechFileStatus::Downloading;
        file
    }

    #[tokio::test]
    async fn test_duplicate_within_window_skips_without_network() {
        let root = tempfile::tempdir().unwrap();
        let mut duplicate =
            LeechFile::new("https://example.com/f/abc".into(), LeechTool::Direct);
        duplicate.status = LeechFileStatus::DownloadSuccess;
        duplicate.upload_status = LeechFileStatus::UploadSuccess;

        let pipeline = DownloadPipeline::new(
            Arc::new(MockFileRepository::with_duplicate(duplicate)),
            registry_with_downloader(Arc::new(PanicDownloader)),
            30,
        );

        let file = downloading_file(&root, "https://example.com/f/abc");
        let result = pipeline.execute(file).await;

        assert_eq!(result.status, LeechFileStatus::SkipDownload);
        assert!(result.reason.unwrap().contains("within 30 days"));
    }

    #[tokio::test]
    async fn test_existing_local_file_short_circuits_to_success() {
        let root = tempfile::tempdir().unwrap();
        let file = downloading_file(&root, "https://example.com/f/abc");

        std::fs::create_dir_all(file.location.as_deref().unwrap()).unwrap();
        std::fs::write(file.full_name(), b"already here").unwrap();

        let pipeline = DownloadPipeline::new(
            Arc::new(MockFileRepository::empty()),
            registry_with_downloader(Arc::new(PanicDownloader)),
            30,
        );

        let result = pipeline.execute(file).await;

        assert_eq!(result.status, LeechFileStatus::DownloadSuccess);
        assert_eq!(result.reason.as_deref(), Some("File already exist."));
        assert_eq!(result.size, Some(12));
    }

    #[tokio::test]
    async fn test_transport_error_embeds_status_code() {
        let root = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/f/abc"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let pipeline = DownloadPipeline::new(
            Arc::new(MockFileRepository::empty()),
            registry_with_downloader(Arc::new(
                crate::adaptors::downloaders::http::HttpDownloader::new(
                    reqwest::Client::new(),
                    30,
                ),
            )),
            30,
        );

        let file = downloading_file(&root, &format!("{}/f/abc", server.uri()));
        let result = pipeline.execute(file).await;

        assert_eq!(result.status, LeechFileStatus::DownloadFail);
        assert!(result.reason.unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_size_mismatch_fails_and_keeps_final_path_empty() {
        let root = tempfile::tempdir().unwrap();
        let file = downloading_file(&root, "https://example.com/f/abc");
        std::fs::create_dir_all(file.location.as_deref().unwrap()).unwrap();

        let pipeline = DownloadPipeline::new(
            Arc::new(MockFileRepository::empty()),
            registry_with_downloader(Arc::new(LyingDownloader)),
            30,
        );

        let result = pipeline.execute(file).await;

        assert_eq!(result.status, LeechFileStatus::DownloadFail);
        assert!(result.reason.as_ref().unwrap().contains("could be broken"));
        // 大小不一致的临时文件绝不能晋升到最终路径
        assert!(!Path::new(&result.full_name()).exists());
    }

    #[tokio::test]
    async fn test_successful_fetch_is_moved_into_place() {
        let root = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/f/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload".to_vec()))
            .mount(&server)
            .await;

        let pipeline = DownloadPipeline::new(
            Arc::new(MockFileRepository::empty()),
            registry_with_downloader(Arc::new(
                crate::adaptors::downloaders::http::HttpDownloader::new(
                    reqwest::Client::new(),
                    30,
                ),
            )),
            30,
        );

        let file = downloading_file(&root, &format!("{}/f/abc", server.uri()));
        let result = pipeline.execute(file).await;

        assert_eq!(result.status, LeechFileStatus::DownloadSuccess);
        assert_eq!(result.size, Some(7));
        assert!(Path::new(&result.full_name()).exists());
        assert!(!Path::new(&result.temp_full_name()).exists());
    }

    #[tokio::test]
    async fn test_no_adaptor_marks_routing_failure() {
        let root = tempfile::tempdir().unwrap();
        let parsers: Vec<Arc<dyn Parser>> = Vec::new();
        let downloaders: Vec<Arc<dyn Downloader>> = Vec::new();
        let uploaders: Vec<Arc<dyn Uploader>> = Vec::new();

        let pipeline = DownloadPipeline::new(
            Arc::new(MockFileRepository::empty()),
            Arc::new(AdaptorRegistry::with_adaptors(
                parsers,
                downloaders,
                uploaders,
            )),
            30,
        );

        let file = downloading_file(&root, "https://example.com/f/abc");
        let result = pipeline.execute(file).await;

        assert_eq!(result.status, LeechFileStatus::DownloadFail);
        assert_eq!(result.reason.as_deref(), Some("Download service not found."));
    }
}
