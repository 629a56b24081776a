// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adaptors::traits::Uploader;
use crate::adaptors::uploaders::remote_file_path;
use crate::domain::models::leech_file::{LeechFile, LeechFileStatus};
use crate::domain::models::tool::SyncTool;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

/// Alist 上传适配器
///
/// 通过 Alist 的 `/api/fs/put` 接口流式推送暂存文件，
/// 目标路径经百分号编码后放入 File-Path 请求头。
pub struct AlistUploader {
    http: reqwest::Client,
    host: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlistResponse {
    code: i32,
    #[serde(default)]
    message: String,
}

impl AlistUploader {
    pub fn new(http: reqwest::Client, host: Option<String>, token: Option<String>) -> Self {
        Self { http, host, token }
    }
}

#[async_trait]
impl Uploader for AlistUploader {
    fn name(&self) -> &'static str {
        "alist"
    }

    fn matches(&self, sync_tool: SyncTool) -> bool {
        sync_tool == SyncTool::Alist
    }

    async fn transfer(&self, mut file: LeechFile) -> anyhow::Result<LeechFile> {
        let host = self
            .host
            .as_deref()
            .context("Alist host is not configured")?
            .trim_end_matches('/');
        let token = self
            .token
            .as_deref()
            .context("Alist token is not configured")?;

        let remote_path = remote_file_path(&file);
        let staged = tokio::fs::File::open(file.full_name()).await?;

        let response = self
            .http
            .put(format!("{}/api/fs/put", host))
            .header("Authorization", token)
            .header("File-Path", urlencoding::encode(&remote_path).into_owned())
            .body(reqwest::Body::from(staged))
            .send()
            .await?;

        let status_code = response.status();
        let body: AlistResponse = response.json().await?;

        if status_code.is_success() && body.code == 200 {
            file.upload_status = LeechFileStatus::UploadSuccess;
        } else {
            file.upload_status = LeechFileStatus::UploadFail;
            file.upload_reason = Some(format!(
                "Alist rejected \"{}\": {} {}",
                remote_path, body.code, body.message
            ));
        }

        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::tool::LeechTool;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn staged_file(root: &tempfile::TempDir) -> LeechFile {
        let mut file = LeechFile::new("https://example.com/f".into(), LeechTool::Direct);
        file.name = Some("one.jpg".into());
        file.remote_folder = Some("album".into());
        file.sync_path = Some("/media".into());
        file.seal(root.path().to_str().unwrap());
        std::fs::create_dir_all(file.location.as_deref().unwrap()).unwrap();
        std::fs::write(file.full_name(), b"payload").unwrap();
        file.status = LeechFileStatus::DownloadSuccess;
        file.upload_status = LeechFileStatus::Uploading;
        file
    }

    #[tokio::test]
    async fn test_transfer_success_marks_upload_success() {
        let root = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/fs/put"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": 200})),
            )
            .mount(&server)
            .await;

        let uploader = AlistUploader::new(
            reqwest::Client::new(),
            Some(server.uri()),
            Some("token".into()),
        );

        let file = uploader.transfer(staged_file(&root)).await.unwrap();
        assert_eq!(file.upload_status, LeechFileStatus::UploadSuccess);
    }

    #[tokio::test]
    async fn test_transfer_rejection_marks_upload_fail() {
        let root = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/fs/put"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"code": 403, "message": "permission denied"}),
            ))
            .mount(&server)
            .await;

        let uploader = AlistUploader::new(
            reqwest::Client::new(),
            Some(server.uri()),
            Some("token".into()),
        );

        let file = uploader.transfer(staged_file(&root)).await.unwrap();
        assert_eq!(file.upload_status, LeechFileStatus::UploadFail);
        assert!(file.upload_reason.unwrap().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_transfer_without_configuration_errors() {
        let root = tempfile::tempdir().unwrap();
        let uploader = AlistUploader::new(reqwest::Client::new(), None, None);

        let result = uploader.transfer(staged_file(&root)).await;
        assert!(result.is_err());
    }
}
