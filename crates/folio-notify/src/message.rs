use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 告警级别
///
/// 与收件箱里 `alert_type` 的三档一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    /// 信息
    Info,
    /// 警告
    Warning,
    /// 严重
    Critical,
}

impl NotifyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyLevel::Info => "info",
            NotifyLevel::Warning => "warning",
            NotifyLevel::Critical => "critical",
        }
    }
}

/// 通知消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyMessage {
    /// 主题
    pub subject: String,

    /// 正文
    pub body: String,

    /// 级别
    pub level: NotifyLevel,

    /// 时间
    pub timestamp: DateTime<Utc>,
}

impl NotifyMessage {
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        level: NotifyLevel,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            level,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(NotifyLevel::Info < NotifyLevel::Warning);
        assert!(NotifyLevel::Warning < NotifyLevel::Critical);
    }

    #[test]
    fn test_level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&NotifyLevel::Critical).unwrap(),
            "\"critical\""
        );
    }
}
