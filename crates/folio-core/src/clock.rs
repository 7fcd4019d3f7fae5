use chrono::{DateTime, Utc};
use std::sync::RwLock;

/// 时钟 trait
///
/// 聚合和监控任务都通过注入的时钟取当前时间，测试中可替换为固定时钟
pub trait Clock: Send + Sync {
    /// 当前时间
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动时钟（用于测试）
///
/// 固定返回设定的时间，可通过 `set` / `advance` 调整
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// 设置当前时间
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap() = now;
    }

    /// 前进指定时长
    pub fn advance(&self, duration: chrono::Duration) {
        let mut now = self.now.write().unwrap();
        *now = *now + duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap()
    }
}
