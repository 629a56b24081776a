// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 工作器状态枚举
///
/// 状态转换流程：SetupBeforeRun → Ready → Shutdown，
/// 同一 hostname 的记录原地覆盖，只保留最近一次转换。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    /// 进程已启动，正在注册队列与并发数
    #[default]
    SetupBeforeRun,
    /// 可以接收作业
    Ready,
    /// 已终止
    Shutdown,
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            WorkerStatus::SetupBeforeRun => "SETUP_BEFORE_RUN",
            WorkerStatus::Ready => "READY",
            WorkerStatus::Shutdown => "SHUTDOWN",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for WorkerStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SETUP_BEFORE_RUN" => Ok(WorkerStatus::SetupBeforeRun),
            "READY" => Ok(WorkerStatus::Ready),
            "SHUTDOWN" => Ok(WorkerStatus::Shutdown),
            _ => Err(()),
        }
    }
}

/// 速率限制周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatePeriod {
    /// 每秒
    #[serde(rename = "s")]
    Second,
    /// 每分钟
    #[serde(rename = "m")]
    Minute,
    /// 每小时
    #[serde(rename = "h")]
    Hour,
}

impl fmt::Display for RatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RatePeriod::Second => write!(f, "s"),
            RatePeriod::Minute => write!(f, "m"),
            RatePeriod::Hour => write!(f, "h"),
        }
    }
}

impl FromStr for RatePeriod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(RatePeriod::Second),
            "m" => Ok(RatePeriod::Minute),
            "h" => Ok(RatePeriod::Hour),
            _ => Err(()),
        }
    }
}

/// 速率限制设置，amount 个作业每 period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// 周期内允许的作业数
    pub amount: u32,
    /// 计数周期
    pub period: RatePeriod,
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.amount, self.period)
    }
}

/// 工作器实体
///
/// 每个运行中的工作进程对应一条记录，hostname 为自然主键，
/// 同名进程重启时记录被覆盖而非追加。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    /// 工作器主机名，形如 `{phase-host}@{queue}@{tool}`
    pub hostname: String,
    /// 绑定的队列名，逗号连接
    pub queue: String,
    /// 工作器状态
    pub status: WorkerStatus,
    /// 并发槽位数
    pub concurrency: i32,
    /// 当前生效的速率限制
    pub rate_limit: Option<RateLimit>,
    /// 更新时间
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Worker {
    /// 工作进程启动注册时的初始记录
    pub fn setup(hostname: String, queue: String, concurrency: i32) -> Self {
        Self {
            hostname,
            queue,
            status: WorkerStatus::SetupBeforeRun,
            concurrency,
            rate_limit: None,
            updated_at: Some(Utc::now().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_display() {
        let limit = RateLimit {
            amount: 5,
            period: RatePeriod::Minute,
        };
        assert_eq!(limit.to_string(), "5/m");
    }

    #[test]
    fn test_rate_limit_serde_period_tags() {
        let limit = RateLimit {
            amount: 5,
            period: RatePeriod::Minute,
        };
        let value = serde_json::to_value(limit).unwrap();
        assert_eq!(value, serde_json::json!({"amount": 5, "period": "m"}));
    }

    #[test]
    fn test_worker_status_round_trip() {
        for status in [
            WorkerStatus::SetupBeforeRun,
            WorkerStatus::Ready,
            WorkerStatus::Shutdown,
        ] {
            assert_eq!(status.to_string().parse::<WorkerStatus>(), Ok(status));
        }
    }
}
