use crate::model::AlertMessage;
use crate::{Result, MESSAGES_COLLECTION};
use chrono::Duration;
use folio_core::Clock;
use folio_store::{DocumentStore, Fields, Filter};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// 带文档 id 的收件箱条目
#[derive(Debug, Clone)]
pub struct InboxEntry {
    pub id: String,
    pub message: AlertMessage,
}

/// 告警收件箱
///
/// 读取收件箱和翻转已读标记；消息创建后只有 `is_read` 会变
pub struct AlertInbox {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl AlertInbox {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// 所有未读消息，按写入顺序
    pub async fn unread_alerts(&self) -> Result<Vec<InboxEntry>> {
        let docs = self
            .store
            .scan(MESSAGES_COLLECTION, Some(&Filter::eq("is_read", false)))
            .await?;
        Ok(docs
            .iter()
            .filter_map(|doc| match doc.deserialize::<AlertMessage>() {
                Ok(message) => Some(InboxEntry {
                    id: doc.id.clone(),
                    message,
                }),
                Err(e) => {
                    warn!(id = %doc.id, "Skipping malformed inbox message: {}", e);
                    None
                }
            })
            .collect())
    }

    /// 未读消息数
    pub async fn unread_count(&self) -> Result<usize> {
        Ok(self.unread_alerts().await?.len())
    }

    /// 窗口内的未读消息（通知轮询用）
    pub async fn recent_unread(&self, window: Duration) -> Result<Vec<InboxEntry>> {
        let threshold = self.clock.now().naive_utc() - window;
        let all = self.unread_alerts().await?;
        Ok(all
            .into_iter()
            .filter(|entry| entry.message.timestamp.naive_utc() > threshold)
            .collect())
    }

    /// 标记单条消息已读（只翻转 `is_read`）
    pub async fn mark_read(&self, id: &str) -> Result<()> {
        let mut patch = Fields::new();
        patch.insert("is_read".to_string(), Value::Bool(true));
        self.store.update(MESSAGES_COLLECTION, id, patch).await?;
        Ok(())
    }
}
