mod config;
mod jobs;

use anyhow::Result;
use config::ServerConfig;
use folio_analytics::AnalyticsAggregator;
use folio_core::SystemClock;
use folio_monitor::{HealthMonitor, HttpProber};
use folio_notify::{
    EmailConfig, EmailNotifier, NotifyLevel, NotifyManager, WebhookNotifier,
};
use folio_store::MemoryStore;
use jobs::spawn_job;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    info!("Starting folio-server");

    // 加载配置
    let config_path =
        std::env::var("FOLIO_CONFIG").unwrap_or_else(|_| "config/folio.toml".to_string());
    let config = ServerConfig::load(&config_path).unwrap_or_else(|_| {
        info!("Using default configuration");
        ServerConfig::default()
    });

    // 创建通知管理器
    let notify = Arc::new(NotifyManager::new(NotifyLevel::Info));
    register_notifiers(&notify, &config).await;

    // 组合核心组件：存储、时钟、聚合器、健康监控
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(SystemClock);
    let aggregator = Arc::new(
        AnalyticsAggregator::new(store.clone(), clock.clone())
            .with_freshness_ttl_secs(config.freshness_ttl_secs),
    );
    let monitor = Arc::new(
        HealthMonitor::new(
            store.clone(),
            notify.clone(),
            Arc::new(HttpProber::new(config.probe_timeout_secs)),
            clock.clone(),
        )
        .with_dedup_window_hours(config.dedup_window_hours),
    );

    info!("Core components initialized");

    // 启动后台任务
    let aggregation_handle = {
        let aggregator = aggregator.clone();
        spawn_job(
            "analytics-aggregation",
            Duration::from_secs(config.aggregation_interval_secs),
            move || {
                let aggregator = aggregator.clone();
                async move {
                    // 聚合失败在内部降级为 None，这里不算任务失败
                    aggregator.aggregate().await;
                    Ok(())
                }
            },
        )
    };

    let health_handle = {
        let monitor = monitor.clone();
        spawn_job(
            "deployment-health",
            Duration::from_secs(config.health_interval_secs),
            move || {
                let monitor = monitor.clone();
                async move { Ok(monitor.run_health_cycle().await?) }
            },
        )
    };

    let expiry_handle = {
        let monitor = monitor.clone();
        spawn_job(
            "domain-expiry",
            Duration::from_secs(config.expiry_interval_secs),
            move || {
                let monitor = monitor.clone();
                async move { Ok(monitor.run_expiry_cycle().await?) }
            },
        )
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    aggregation_handle.shutdown().await;
    health_handle.shutdown().await;
    expiry_handle.shutdown().await;

    Ok(())
}

/// 注册通知器
///
/// Webhook 推送来自配置文件，邮件通知来自环境变量
async fn register_notifiers(notify: &Arc<NotifyManager>, config: &ServerConfig) {
    if let Some(webhook) = &config.webhook {
        notify
            .register(Box::new(WebhookNotifier::new(webhook.clone())))
            .await;
    }

    if let (Ok(smtp_host), Ok(username), Ok(password), Ok(from), Ok(to)) = (
        std::env::var("SMTP_HOST"),
        std::env::var("SMTP_USER"),
        std::env::var("SMTP_PASS"),
        std::env::var("SMTP_FROM"),
        std::env::var("SMTP_TO"),
    ) {
        let email_config = EmailConfig {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            username,
            password,
            from,
            to: to.split(',').map(|s| s.trim().to_string()).collect(),
        };
        notify
            .register(Box::new(EmailNotifier::new(email_config)))
            .await;
    }

    if notify.notifier_count().await == 0 {
        info!("No notifiers configured; alerts will only reach the inbox");
    }
}
