// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use url::Url;

/// 常用浏览器 User-Agent 池，每次请求随机取一个
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
];

/// 随机取一个 User-Agent
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0])
}

/// 为给定链接构造下载请求头
///
/// Referer 取链接自身的 scheme+host，部分托管站点以此校验来源
pub fn request_headers(link: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(random_user_agent()) {
        headers.insert(USER_AGENT, value);
    }

    if let Ok(url) = Url::parse(link) {
        if let Some(host) = url.host_str() {
            let referer = format!("{}://{}", url.scheme(), host);
            if let Ok(value) = HeaderValue::from_str(&referer) {
                headers.insert(REFERER, value);
            }
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_headers_include_referer() {
        let headers = request_headers("https://pixeldrain.com/u/abc123");
        assert_eq!(
            headers.get(REFERER).unwrap().to_str().unwrap(),
            "https://pixeldrain.com"
        );
        assert!(headers.get(USER_AGENT).is_some());
    }

    #[test]
    fn test_request_headers_tolerate_invalid_link() {
        let headers = request_headers("not a url");
        assert!(headers.get(REFERER).is_none());
        assert!(headers.get(USER_AGENT).is_some());
    }
}
