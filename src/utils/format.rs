// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::leech_file::LeechFileStatus;
use crate::domain::models::leech_task::TaskPhase;

/// 将字节数格式化为可读字符串
pub fn convert_bytes(byte_amount: i64) -> String {
    const UNITS: &[(i64, &str)] = &[
        (1024i64.pow(5), "PiB"),
        (1024i64.pow(4), "TiB"),
        (1024i64.pow(3), "GiB"),
        (1024i64.pow(2), "MiB"),
        (1024, "KiB"),
    ];

    for (threshold, unit) in UNITS {
        if byte_amount > *threshold {
            return format!("{:.2} {}", byte_amount as f64 / *threshold as f64, unit);
        }
    }

    format!("{:.2} B", byte_amount as f64)
}

/// 渲染阶段结果通知正文
///
/// 成功时展示文件名与大小，失败时展示阶段、状态与原因。
/// 原因文本截断到 3072 字符，避免超长远端错误撑爆通知渠道。
pub fn format_result_message(
    name: Option<&str>,
    size: Option<i64>,
    is_success: bool,
    phase: TaskPhase,
    status: LeechFileStatus,
    reason: Option<&str>,
) -> String {
    let mut lines = vec![format!("File name: {}", name.unwrap_or("unknown"))];

    if is_success {
        lines.push(format!("File size: {}", convert_bytes(size.unwrap_or(0))));
        lines.push("Task status: Done".to_string());
    } else {
        lines.push(format!("Task phase: {}", phase));
        lines.push(format!("Task status: {}", status));

        let reason = reason.unwrap_or("unknown");
        let truncated: String = reason.chars().take(3072).collect();
        lines.push(format!("Reason: {}", truncated));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_bytes_units() {
        assert_eq!(convert_bytes(512), "512.00 B");
        assert_eq!(convert_bytes(2048), "2.00 KiB");
        assert_eq!(convert_bytes(3 * 1024 * 1024), "3.00 MiB");
        assert_eq!(convert_bytes(5 * 1024 * 1024 * 1024), "5.00 GiB");
    }

    #[test]
    fn test_format_success_message() {
        let content = format_result_message(
            Some("video.mp4"),
            Some(2048),
            true,
            TaskPhase::Download,
            LeechFileStatus::DownloadSuccess,
            None,
        );

        assert!(content.contains("File name: video.mp4"));
        assert!(content.contains("File size: 2.00 KiB"));
        assert!(content.contains("Task status: Done"));
    }

    #[test]
    fn test_format_failure_message_contains_reason() {
        let content = format_result_message(
            Some("video.mp4"),
            None,
            false,
            TaskPhase::Download,
            LeechFileStatus::DownloadFail,
            Some("Error downloading \"video.mp4\": 404."),
        );

        assert!(content.contains("Task phase: DOWNLOAD"));
        assert!(content.contains("Task status: DOWNLOAD_FAIL"));
        assert!(content.contains("404"));
    }
}
