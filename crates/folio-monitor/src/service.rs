use crate::model::{AlertMessage, DomainRecord, EndpointStatus, MonitoredEndpoint};
use crate::probe::Prober;
use crate::{Result, DOMAINS_COLLECTION, MESSAGES_COLLECTION, VAULT_COLLECTION};
use chrono::Duration;
use folio_core::{parse_naive, Clock};
use folio_notify::{NotifyLevel, NotifyManager, NotifyMessage};
use folio_store::{DocumentStore, Fields, Filter};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// 告警消息的统一来源名
const ALERT_SOURCE: &str = "System Monitor";

/// 域名到期的警告/严重阈值（天）
const EXPIRY_WARNING_DAYS: i64 = 30;
const EXPIRY_CRITICAL_DAYS: i64 = 7;

/// 健康监控服务
///
/// 两个独立的探测周期：部署可达性探测和域名到期检查。
/// 两者都通过去重告警原语写收件箱并推送，同一主题在去重窗口内
/// 只产生一条告警
pub struct HealthMonitor {
    /// 文档存储
    store: Arc<dyn DocumentStore>,

    /// 通知管理器
    notify: Arc<NotifyManager>,

    /// 可达性探测器
    prober: Arc<dyn Prober>,

    /// 注入的时钟
    clock: Arc<dyn Clock>,

    /// 告警去重窗口
    dedup_window: Duration,

    /// 去重检查与写入的串行化门闩
    alert_gate: Mutex<()>,
}

impl HealthMonitor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        notify: Arc<NotifyManager>,
        prober: Arc<dyn Prober>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notify,
            prober,
            clock,
            dedup_window: Duration::hours(24),
            alert_gate: Mutex::new(()),
        }
    }

    /// 自定义去重窗口（小时）
    pub fn with_dedup_window_hours(mut self, hours: i64) -> Self {
        self.dedup_window = Duration::hours(hours);
        self
    }

    /// 部署可达性探测周期
    ///
    /// 逐个探测 `category == "deployment"` 的端点，无论状态是否变化
    /// 都写回 `{last_status, last_check}`；离线端点走去重告警。
    /// 单个端点的失败不会中断整轮
    pub async fn run_health_cycle(&self) -> Result<()> {
        let docs = self
            .store
            .scan(
                VAULT_COLLECTION,
                Some(&Filter::eq("category", "deployment")),
            )
            .await?;

        info!(endpoints = docs.len(), "Running deployment health cycle");

        for doc in &docs {
            let endpoint = MonitoredEndpoint::from_document(doc);
            let url = endpoint.probe_url();
            let status = if self.prober.probe(&url).await {
                EndpointStatus::Online
            } else {
                EndpointStatus::Offline
            };

            let now = self.clock.now();
            let mut patch = Fields::new();
            patch.insert(
                "last_status".to_string(),
                Value::String(status.as_str().to_string()),
            );
            patch.insert(
                "last_check".to_string(),
                Value::String(now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            );
            if let Err(e) = self.store.update(VAULT_COLLECTION, &doc.id, patch).await {
                warn!(endpoint = %endpoint.name, "Failed to persist probe result: {}", e);
            }

            debug!(endpoint = %endpoint.name, status = status.as_str(), "Endpoint probed");

            if status == EndpointStatus::Offline {
                let subject = format!("Outage: {}", endpoint.name);
                let body = format!("Unreachable: {}", url);
                if let Err(e) = self
                    .raise_alert(&subject, &body, NotifyLevel::Critical)
                    .await
                {
                    warn!(endpoint = %endpoint.name, "Failed to raise outage alert: {}", e);
                }
            }
        }

        Ok(())
    }

    /// 域名到期检查周期
    ///
    /// 剩余天数 = (到期日 − 现在).days + 1，不足一天向上取整，
    /// "今天到期" 读作 1。>30 天不动作，(7, 30] 警告，≤7 严重。
    /// 无法解析的到期日期记日志后跳过
    pub async fn run_expiry_cycle(&self) -> Result<()> {
        let docs = self.store.scan(DOMAINS_COLLECTION, None).await?;

        info!(domains = docs.len(), "Running domain expiry cycle");

        let now = self.clock.now().naive_utc();
        for doc in &docs {
            let domain = DomainRecord::from_document(doc);
            let Some(expiry) = domain.parsed_expiry() else {
                warn!(
                    domain = %domain.domain_name,
                    raw = domain.expiry_date.as_deref().unwrap_or(""),
                    "Skipping domain with unparseable expiry date"
                );
                continue;
            };

            let midnight = match expiry.and_hms_opt(0, 0, 0) {
                Some(m) => m,
                None => continue,
            };
            let days_remaining = (midnight - now).num_days() + 1;
            debug!(domain = %domain.domain_name, days_remaining, "Domain expiry checked");

            if days_remaining > EXPIRY_WARNING_DAYS {
                continue;
            }

            let (level, subject) = if days_remaining <= EXPIRY_CRITICAL_DAYS {
                (
                    NotifyLevel::Critical,
                    format!("Urgent domain expiry: {}", domain.domain_name),
                )
            } else {
                (
                    NotifyLevel::Warning,
                    format!("Domain expiry notice: {}", domain.domain_name),
                )
            };
            let body = format!(
                "Expires in {} days ({}).",
                days_remaining,
                domain.expiry_date.as_deref().unwrap_or("")
            );

            if let Err(e) = self.raise_alert(&subject, &body, level).await {
                warn!(domain = %domain.domain_name, "Failed to raise expiry alert: {}", e);
            }
        }

        Ok(())
    }

    /// 去重告警原语
    ///
    /// 同一主题在去重窗口内已有告警则什么都不做；否则推送并写入
    /// 收件箱。按主题字符串精确匹配去重，调用方必须保证主题对每个
    /// 逻辑条件稳定且唯一。检查和写入持同一把门闩，并发探测不会
    /// 各自判定 "无重复" 而重复写入。
    ///
    /// 返回是否真正产生了新告警
    pub async fn raise_alert(
        &self,
        subject: &str,
        body: &str,
        level: NotifyLevel,
    ) -> Result<bool> {
        self.raise_alert_with_window(subject, body, level, self.dedup_window)
            .await
    }

    /// 指定去重窗口的告警（收件箱的其他生产方会用更窄的窗口）
    pub async fn raise_alert_with_window(
        &self,
        subject: &str,
        body: &str,
        level: NotifyLevel,
        window: Duration,
    ) -> Result<bool> {
        let _gate = self.alert_gate.lock().await;

        let existing = self
            .store
            .scan(MESSAGES_COLLECTION, Some(&Filter::eq("subject", subject)))
            .await?;
        let threshold = self.clock.now().naive_utc() - window;
        let already_sent = existing.iter().any(|doc| {
            doc.get("timestamp")
                .and_then(parse_naive)
                .is_some_and(|ts| ts > threshold)
        });

        if already_sent {
            debug!(subject = %subject, "Duplicate alert suppressed");
            return Ok(false);
        }

        let now = self.clock.now();
        // 推送是尽力而为的，失败在通知管理器里吞掉
        self.notify
            .broadcast(&NotifyMessage::new(subject, body, level, now))
            .await;

        let alert = AlertMessage {
            name: ALERT_SOURCE.to_string(),
            subject: subject.to_string(),
            message: body.to_string(),
            timestamp: now,
            is_read: false,
            is_system: true,
            alert_type: level,
        };
        let Value::Object(fields) = serde_json::to_value(&alert)? else {
            return Ok(false);
        };
        self.store.insert(MESSAGES_COLLECTION, fields).await?;

        info!(subject = %subject, level = level.as_str(), "Alert raised");
        Ok(true)
    }
}
