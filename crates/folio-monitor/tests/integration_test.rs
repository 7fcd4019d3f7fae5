use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use folio_core::ManualClock;
use folio_monitor::{
    AlertInbox, HealthMonitor, Prober, DOMAINS_COLLECTION, MESSAGES_COLLECTION, VAULT_COLLECTION,
};
use folio_notify::{Notifier, NotifyManager, NotifyMessage, NotifyResult};
use folio_store::{DocumentStore, Fields, MemoryStore};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 固定返回离线的探测器
struct AlwaysDown;

#[async_trait]
impl Prober for AlwaysDown {
    async fn probe(&self, _url: &str) -> bool {
        false
    }
}

/// 只数次数的推送通道
struct CountingNotifier {
    sent: Arc<AtomicUsize>,
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn send(&self, _message: &NotifyMessage) -> anyhow::Result<NotifyResult> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(NotifyResult::success())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().unwrap().clone()
}

#[tokio::test]
async fn test_outage_alert_reaches_push_and_inbox_once() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
    ));
    let pushes = Arc::new(AtomicUsize::new(0));

    let notify = Arc::new(NotifyManager::default());
    notify
        .register(Box::new(CountingNotifier {
            sent: pushes.clone(),
        }))
        .await;

    let monitor = HealthMonitor::new(
        store.clone(),
        notify,
        Arc::new(AlwaysDown),
        clock.clone(),
    );

    store
        .set(
            VAULT_COLLECTION,
            "ep1",
            fields(json!({"name": "blog", "url": "blog.example.com", "category": "deployment"})),
        )
        .await
        .unwrap();

    // 三轮探测落在同一个去重窗口内
    for _ in 0..3 {
        monitor.run_health_cycle().await.unwrap();
        clock.advance(Duration::minutes(30));
    }

    // 推送和收件箱都只出现一次
    assert_eq!(pushes.load(Ordering::SeqCst), 1);
    let inbox = AlertInbox::new(store.clone(), clock.clone());
    let unread = inbox.unread_alerts().await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].message.subject, "Outage: blog");

    // 已读回执后收件箱清空，底层消息仍在
    inbox.mark_read(&unread[0].id).await.unwrap();
    assert_eq!(inbox.unread_count().await.unwrap(), 0);
    assert_eq!(
        store.scan(MESSAGES_COLLECTION, None).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_warning_then_critical_are_separate_conditions() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
    ));
    let monitor = HealthMonitor::new(
        store.clone(),
        Arc::new(NotifyManager::default()),
        Arc::new(AlwaysDown),
        clock.clone(),
    );

    store
        .insert(
            DOMAINS_COLLECTION,
            fields(json!({"domain_name": "example.com", "expiry_date": "2026-03-20"})),
        )
        .await
        .unwrap();

    // 剩 10 天：警告
    monitor.run_expiry_cycle().await.unwrap();

    // 三天后剩 7 天：降级为严重，主题不同，不被旧警告抑制
    clock.advance(Duration::days(3));
    monitor.run_expiry_cycle().await.unwrap();

    let msgs = store.scan(MESSAGES_COLLECTION, None).await.unwrap();
    let subjects: Vec<_> = msgs
        .iter()
        .map(|d| d.get_str("subject").unwrap().to_string())
        .collect();
    assert_eq!(
        subjects,
        [
            "Domain expiry notice: example.com",
            "Urgent domain expiry: example.com"
        ]
    );
}
