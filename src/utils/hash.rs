// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::tool::LeechTool;
use sha2::{Digest, Sha256};

/// 计算文件的去重键
///
/// 去重键由 (tool, remote_folder, name) 确定性派生，
/// 与来源链接无关：同一远端文件经不同链接提交时产生同一个键。
pub fn content_hash(tool: LeechTool, remote_folder: &str, name: &str) -> String {
    let raw = format!("{}_{}_{}", tool, remote_folder, name);
    let encoded = urlencoding::encode(&raw);

    let mut hasher = Sha256::new();
    hasher.update(encoded.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_stable() {
        let a = content_hash(LeechTool::Pixeldrain, "folder", "video.mp4");
        let b = content_hash(LeechTool::Pixeldrain, "folder", "video.mp4");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_content_hash_varies_by_component() {
        let base = content_hash(LeechTool::Pixeldrain, "folder", "video.mp4");
        assert_ne!(base, content_hash(LeechTool::Gofile, "folder", "video.mp4"));
        assert_ne!(base, content_hash(LeechTool::Pixeldrain, "other", "video.mp4"));
        assert_ne!(base, content_hash(LeechTool::Pixeldrain, "folder", "other.mp4"));
    }
}
