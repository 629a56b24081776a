// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adaptors::traits::Parser;
use crate::domain::models::leech_file::LeechFile;
use crate::domain::models::tool::LeechTool;
use async_trait::async_trait;
use url::Url;

/// 直链解析适配器
///
/// 兜底适配器：任何 http(s) 链接都视为单个可直接下载的文件。
/// 必须注册在解析列表末尾，否则会吞掉站点专属适配器的链接。
pub struct DirectParser;

#[async_trait]
impl Parser for DirectParser {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn matches(&self, link: &str) -> bool {
        link.starts_with("http://") || link.starts_with("https://")
    }

    async fn parse(&self, link: &str) -> anyhow::Result<Vec<LeechFile>> {
        let url = Url::parse(link)?;

        let name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .unwrap_or("unnamed");

        let mut file = LeechFile::new(link.to_string(), LeechTool::Direct);
        file.name = Some(name.to_string());
        file.remote_folder = Some(name.to_string());

        Ok(vec![file])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_only_http_links() {
        let parser = DirectParser;
        assert!(parser.matches("https://example.com/files/video.mp4"));
        assert!(parser.matches("http://example.com/files/video.mp4"));
        assert!(!parser.matches("magnet:?xt=urn:btih:abc"));
    }

    #[tokio::test]
    async fn test_parse_takes_name_from_last_segment() {
        let parser = DirectParser;
        let files = parser
            .parse("https://example.com/files/video.mp4")
            .await
            .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name.as_deref(), Some("video.mp4"));
        assert_eq!(files[0].tool, LeechTool::Direct);
    }
}
