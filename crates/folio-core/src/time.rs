use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

/// 把存储中的时间字段归一化为本地(naive)时间
///
/// 存储里的时间戳存在三种形态：带 `Z` 或偏移量的 ISO-8601 字符串、
/// 不带偏移量的字符串、以及数值型 epoch 秒。所有形态在比较前都去掉
/// 时区偏移，保留墙钟时间；解析失败返回 `None`。
///
/// 注意：去偏移比较是刻意保留的历史行为，已有数据都按这一语义写入，
/// 不要改成 UTC 归一化。
pub fn parse_naive(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_naive_str(s),
        Value::Number(n) => {
            let secs = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

fn parse_naive_str(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        // 去掉偏移量，保留该偏移下的墙钟时间
        return Some(dt.naive_local());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    None
}
