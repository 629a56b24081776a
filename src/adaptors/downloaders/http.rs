// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adaptors::downloaders::write_stream;
use crate::adaptors::traits::Downloader;
use crate::domain::models::leech_file::LeechFile;
use async_trait::async_trait;
use reqwest::header::HeaderMap;

/// 通用 HTTP 下载适配器
///
/// 兜底适配器：对任何文件执行普通的流式 GET 拉取。
/// 注册在下载列表末尾，站点专属适配器优先命中。
pub struct HttpDownloader {
    http: reqwest::Client,
    stream_timeout: u64,
}

impl HttpDownloader {
    pub fn new(http: reqwest::Client, stream_timeout: u64) -> Self {
        Self {
            http,
            stream_timeout,
        }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    fn name(&self) -> &'static str {
        "http"
    }

    fn matches(&self, _file: &LeechFile) -> bool {
        true
    }

    async fn fetch(&self, file: LeechFile) -> anyhow::Result<LeechFile> {
        write_stream(&self.http, file, HeaderMap::new(), self.stream_timeout).await
    }
}
