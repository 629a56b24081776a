// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 下载适配器实现
pub mod gofile;
pub mod http;

use crate::domain::models::leech_file::{LeechFile, LeechFileStatus};
use crate::utils::http::request_headers;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// 将远端资源流式写入临时路径
///
/// 所有下载适配器共用的拉取步骤：发起请求、记录声明大小、
/// 按块写入 `temp_full_name`。非 200 响应不视为传输错误抛出，
/// 而是把文件置为 DownloadFail 并在原因中嵌入状态码。
pub(crate) async fn write_stream(
    http: &reqwest::Client,
    mut file: LeechFile,
    extra_headers: HeaderMap,
    timeout_secs: u64,
) -> anyhow::Result<LeechFile> {
    let mut headers = request_headers(&file.link);
    headers.extend(extra_headers);

    let mut response = http
        .get(file.fetch_link())
        .headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .send()
        .await?;

    if response.status() != reqwest::StatusCode::OK {
        file.status = LeechFileStatus::DownloadFail;
        file.reason = Some(format!(
            "Error downloading \"{}\": {}.",
            file.name.as_deref().unwrap_or("unknown"),
            response.status().as_u16()
        ));
        return Ok(file);
    }

    file.size = Some(
        response
            .content_length()
            .map(|length| length as i64)
            .unwrap_or(-1),
    );

    let mut out = tokio::fs::File::create(file.temp_full_name()).await?;
    while let Some(chunk) = response.chunk().await? {
        out.write_all(&chunk).await?;
    }
    out.flush().await?;

    Ok(file)
}
