use anyhow::Result;
use folio_notify::WebhookConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 服务配置
///
/// 周期都是部署参数而不是核心契约，默认值取自线上使用的节奏：
/// 聚合 5 分钟一次，健康与到期检查 30 分钟一次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 聚合任务间隔（秒）
    #[serde(default = "default_aggregation_interval_secs")]
    pub aggregation_interval_secs: u64,

    /// 部署健康探测间隔（秒）
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,

    /// 域名到期检查间隔（秒）
    #[serde(default = "default_expiry_interval_secs")]
    pub expiry_interval_secs: u64,

    /// 单次探测超时（秒）
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// 告警去重窗口（小时）
    #[serde(default = "default_dedup_window_hours")]
    pub dedup_window_hours: i64,

    /// 汇总缓存新鲜度阈值（秒）
    #[serde(default = "default_freshness_ttl_secs")]
    pub freshness_ttl_secs: i64,

    /// Webhook 推送配置
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
}

fn default_aggregation_interval_secs() -> u64 {
    300
}

fn default_health_interval_secs() -> u64 {
    1800
}

fn default_expiry_interval_secs() -> u64 {
    1800
}

fn default_probe_timeout_secs() -> u64 {
    10
}

fn default_dedup_window_hours() -> i64 {
    24
}

fn default_freshness_ttl_secs() -> i64 {
    300
}

impl ServerConfig {
    /// 从文件加载配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            aggregation_interval_secs: default_aggregation_interval_secs(),
            health_interval_secs: default_health_interval_secs(),
            expiry_interval_secs: default_expiry_interval_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            dedup_window_hours: default_dedup_window_hours(),
            freshness_ttl_secs: default_freshness_ttl_secs(),
            webhook: None,
        }
    }
}
