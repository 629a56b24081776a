// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adaptors::downloaders::write_stream;
use crate::adaptors::traits::Downloader;
use crate::domain::models::leech_file::LeechFile;
use crate::domain::models::tool::LeechTool;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};

/// Gofile 下载适配器
///
/// Gofile 的直链拉取要求携带解析阶段取得的账户令牌，
/// 以 Cookie 方式附加。注册在通用 HTTP 适配器之前。
pub struct GofileDownloader {
    http: reqwest::Client,
    stream_timeout: u64,
}

impl GofileDownloader {
    pub fn new(http: reqwest::Client, stream_timeout: u64) -> Self {
        Self {
            http,
            stream_timeout,
        }
    }
}

#[async_trait]
impl Downloader for GofileDownloader {
    fn name(&self) -> &'static str {
        "gofile"
    }

    fn matches(&self, file: &LeechFile) -> bool {
        file.tool == LeechTool::Gofile
    }

    async fn fetch(&self, file: LeechFile) -> anyhow::Result<LeechFile> {
        let mut headers = HeaderMap::new();

        if let Some(token) = file.token.as_deref() {
            let cookie = format!("accountToken={}", token);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                headers.insert(COOKIE, value);
            }
        }

        write_stream(&self.http, file, headers, self.stream_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_only_gofile_tool() {
        let downloader = GofileDownloader::new(reqwest::Client::new(), 60);

        let gofile = LeechFile::new("https://gofile.io/d/abc".into(), LeechTool::Gofile);
        let direct = LeechFile::new("https://example.com/f".into(), LeechTool::Direct);

        assert!(downloader.matches(&gofile));
        assert!(!downloader.matches(&direct));
    }
}
