use crate::model::ItemType;
use crate::EVENTS_COLLECTION;
use anyhow::{Context, Result};
use folio_core::Clock;
use folio_store::{DocumentStore, Fields};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// 浏览事件记录器
///
/// 追加只写的 ViewEvent，事件一旦写入不再修改或删除。
/// 时间戳以带 `Z` 的 ISO-8601 字符串落库
pub struct ViewRecorder {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl ViewRecorder {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// 记录一次内容浏览
    ///
    /// `extra` 里可以附带请求来源之类的额外字段，不参与聚合
    pub async fn record_view(
        &self,
        item_type: ItemType,
        item_id: &str,
        title: &str,
        extra: Option<Fields>,
    ) -> Result<String> {
        let mut fields = Fields::new();
        fields.insert(
            "timestamp".to_string(),
            Value::String(self.clock.now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        );
        fields.insert(
            "item_type".to_string(),
            Value::String(item_type.as_str().to_string()),
        );
        fields.insert("item_id".to_string(), Value::String(item_id.to_string()));
        fields.insert("title".to_string(), Value::String(title.to_string()));
        if let Some(extra) = extra {
            for (key, value) in extra {
                fields.insert(key, value);
            }
        }

        let id = self
            .store
            .insert(EVENTS_COLLECTION, fields)
            .await
            .context("recording view event")?;
        debug!(item_type = item_type.as_str(), item_id = %item_id, "View recorded");
        Ok(id)
    }
}
