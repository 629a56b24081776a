// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 启动 Prometheus 导出器
///
/// 监听端口可经 LEECHRS_METRICS_PORT 覆盖。
/// 工作进程与服务进程共享本机时端口会冲突，
/// 冲突只降级为告警，流水线计数仍在本进程内累积。
pub fn init_metrics() {
    let port = std::env::var("LEECHRS_METRICS_PORT")
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(9000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder on {}: {}", addr, e);
        return;
    }

    info!("Metrics exporter listening on {}", addr);
}
