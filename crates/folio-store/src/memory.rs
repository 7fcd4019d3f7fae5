use crate::document::{Document, Fields, Filter};
use crate::error::{Result, StoreError};
use crate::store::DocumentStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// 内存文档存储
///
/// 每个集合是一个按插入顺序保存的文档列表。按 id 查找是线性扫描，
/// 集合规模小时足够；scan 的插入顺序保证了排名统计里
/// "首次出现优先" 的并列次序。
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 集合内文档数量
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, |docs| docs.len())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        debug!(collection = %collection, id = %id, "Document inserted");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) => doc.fields = fields,
            None => docs.push(Document::new(id, fields)),
        }
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<()> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        for (key, value) in patch {
            doc.fields.insert(key, value);
        }
        Ok(())
    }

    async fn scan(&self, collection: &str, filter: Option<&Filter>) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let docs = match collections.get(collection) {
            Some(docs) => docs,
            None => return Ok(Vec::new()),
        };
        Ok(docs
            .iter()
            .filter(|d| filter.map_or(true, |f| f.matches(&d.fields)))
            .cloned()
            .collect())
    }
}
