// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adaptors::traits::Parser;
use crate::domain::models::leech_file::LeechFile;
use crate::domain::models::tool::LeechTool;
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

/// Pixeldrain 解析适配器
///
/// 支持单文件链接（`/u/{id}`）与列表链接（`/l/{id}`），
/// 通过站点 API 解析出文件名并构造实际下载地址。
pub struct PixeldrainParser {
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    success: bool,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ListInfo {
    success: bool,
    #[serde(default)]
    title: String,
    #[serde(default)]
    files: Vec<ListEntry>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    id: String,
    name: String,
}

impl PixeldrainParser {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Parser for PixeldrainParser {
    fn name(&self) -> &'static str {
        "pixeldrain"
    }

    fn matches(&self, link: &str) -> bool {
        link.contains("pixeldrain")
    }

    async fn parse(&self, link: &str) -> anyhow::Result<Vec<LeechFile>> {
        let url = Url::parse(link)?;
        let origin = format!(
            "{}://{}",
            url.scheme(),
            url.host_str().unwrap_or("pixeldrain.com")
        );

        let Some(file_id) = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
        else {
            return Ok(Vec::new());
        };

        let mut leech_files = Vec::new();

        if url.path().contains("/u/") {
            let actual_link = format!("{}/api/file/{}", origin, file_id);
            let info: FileInfo = self
                .http
                .get(format!("{}/info", actual_link))
                .send()
                .await?
                .json()
                .await?;

            if !info.success {
                return Ok(Vec::new());
            }

            let mut file = LeechFile::new(link.to_string(), LeechTool::Pixeldrain);
            file.actual_link = Some(actual_link);
            file.remote_folder = Some(info.name.clone());
            file.name = Some(info.name);
            leech_files.push(file);
        } else if url.path().contains("/l/") {
            let list: ListInfo = self
                .http
                .get(format!("{}/api/list/{}", origin, file_id))
                .send()
                .await?
                .json()
                .await?;

            if !list.success {
                return Ok(Vec::new());
            }

            for entry in list.files {
                let mut file = LeechFile::new(link.to_string(), LeechTool::Pixeldrain);
                file.actual_link = Some(format!("{}/api/file/{}", origin, entry.id));
                file.remote_folder = Some(list.title.clone());
                file.name = Some(entry.name);
                leech_files.push(file);
            }
        }

        Ok(leech_files)
    }
}
