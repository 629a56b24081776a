// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 适配器模块
///
/// 实现站点适配器的注册与分发。每个适配器提供
/// (谓词, 处理函数) 对，注册表按注册顺序匹配，首个命中者生效。
pub mod downloaders;
pub mod parsers;
pub mod traits;
pub mod uploaders;

use crate::config::settings::Settings;
use crate::domain::models::leech_file::LeechFile;
use crate::domain::models::tool::SyncTool;
use std::sync::Arc;
use tracing::{error, warn};

use self::traits::{Downloader, Parser, Uploader};

/// 适配器注册表
///
/// 编译期固定的注册表，在程序初始化时构建。
/// 三类能力各自持有一个有序列表，分发时按注册顺序
/// 尝试谓词，返回首个命中的适配器；注册表不校验谓词互斥，
/// 重叠时注册顺序即优先级，调用方必须将其视为约定。
pub struct AdaptorRegistry {
    /// 解析适配器，按优先级排序
    parsers: Vec<Arc<dyn Parser>>,
    /// 下载适配器，按优先级排序
    downloaders: Vec<Arc<dyn Downloader>>,
    /// 上传适配器，按优先级排序
    uploaders: Vec<Arc<dyn Uploader>>,
}

impl AdaptorRegistry {
    /// 构建内置适配器注册表
    ///
    /// 新增站点只需在对应列表中追加一个适配器；
    /// 兜底适配器（如直链解析）必须保持在列表末尾。
    pub fn builtin(http: reqwest::Client, settings: &Settings) -> Self {
        Self {
            parsers: vec![
                Arc::new(parsers::pixeldrain::PixeldrainParser::new(http.clone())),
                Arc::new(parsers::direct::DirectParser),
            ],
            downloaders: vec![
                Arc::new(downloaders::gofile::GofileDownloader::new(
                    http.clone(),
                    settings.leech.stream_timeout,
                )),
                Arc::new(downloaders::http::HttpDownloader::new(
                    http.clone(),
                    settings.leech.stream_timeout,
                )),
            ],
            uploaders: vec![
                Arc::new(uploaders::alist::AlistUploader::new(
                    http,
                    settings.sync.alist_host.clone(),
                    settings.sync.alist_token.clone(),
                )),
                Arc::new(uploaders::rclone::RcloneUploader::new(
                    settings.sync.rclone_binary.clone(),
                )),
            ],
        }
    }

    /// 以显式适配器列表构建注册表
    pub fn with_adaptors(
        parsers: Vec<Arc<dyn Parser>>,
        downloaders: Vec<Arc<dyn Downloader>>,
        uploaders: Vec<Arc<dyn Uploader>>,
    ) -> Self {
        Self {
            parsers,
            downloaders,
            uploaders,
        }
    }

    /// 查找负责该链接的解析适配器
    pub fn parser_for(&self, link: &str) -> Option<Arc<dyn Parser>> {
        self.parsers.iter().find(|p| p.matches(link)).cloned()
    }

    /// 查找负责该文件的下载适配器
    pub fn downloader_for(&self, file: &LeechFile) -> Option<Arc<dyn Downloader>> {
        self.downloaders.iter().find(|d| d.matches(file)).cloned()
    }

    /// 查找负责该同步工具的上传适配器
    pub fn uploader_for(&self, sync_tool: SyncTool) -> Option<Arc<dyn Uploader>> {
        self.uploaders.iter().find(|u| u.matches(sync_tool)).cloned()
    }

    /// 解析链接
    ///
    /// 未找到适配器或解析失败时返回空列表，不向调用方抛错
    pub async fn execute_parse(&self, link: &str) -> Vec<LeechFile> {
        let Some(parser) = self.parser_for(link) else {
            warn!("Parse service not found for link {}", link);
            return Vec::new();
        };

        match parser.parse(link).await {
            Ok(files) => files,
            Err(e) => {
                error!("Error parse link {}: {}", link, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::tool::LeechTool;
    use async_trait::async_trait;

    struct MatchAllParser(&'static str);

    #[async_trait]
    impl Parser for MatchAllParser {
        fn name(&self) -> &'static str {
            self.0
        }

        fn matches(&self, _link: &str) -> bool {
            true
        }

        async fn parse(&self, link: &str) -> anyhow::Result<Vec<LeechFile>> {
            Ok(vec![LeechFile::new(link.to_string(), LeechTool::Direct)])
        }
    }

    struct MatchNoneParser;

    #[async_trait]
    impl Parser for MatchNoneParser {
        fn name(&self) -> &'static str {
            "none"
        }

        fn matches(&self, _link: &str) -> bool {
            false
        }

        async fn parse(&self, _link: &str) -> anyhow::Result<Vec<LeechFile>> {
            unreachable!("predicate never matches")
        }
    }

    fn registry_with_parsers(parsers: Vec<Arc<dyn Parser>>) -> AdaptorRegistry {
        AdaptorRegistry::with_adaptors(parsers, Vec::new(), Vec::new())
    }

    #[test]
    fn test_first_match_wins_in_registration_order() {
        let registry = registry_with_parsers(vec![
            Arc::new(MatchAllParser("first")),
            Arc::new(MatchAllParser("second")),
        ]);

        let parser = registry.parser_for("https://example.com/f/abc").unwrap();
        assert_eq!(parser.name(), "first");
    }

    #[test]
    fn test_non_matching_predicates_are_skipped() {
        let registry = registry_with_parsers(vec![
            Arc::new(MatchNoneParser),
            Arc::new(MatchAllParser("fallback")),
        ]);

        let parser = registry.parser_for("https://example.com/f/abc").unwrap();
        assert_eq!(parser.name(), "fallback");
    }

    #[tokio::test]
    async fn test_execute_parse_without_adaptor_yields_nothing() {
        let registry = registry_with_parsers(vec![Arc::new(MatchNoneParser)]);
        let files = registry.execute_parse("https://example.com/f/abc").await;
        assert!(files.is_empty());
    }
}
