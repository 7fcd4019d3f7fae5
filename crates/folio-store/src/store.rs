use crate::document::{Document, Fields, Filter};
use crate::error::Result;
use async_trait::async_trait;

/// 文档存储 trait
///
/// 面向集合的键值存储：集合内按 id 存文档，支持单字段过滤扫描。
/// 聚合器和健康监控都只依赖这个接口，不关心具体后端。
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 插入文档，返回生成的 id
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String>;

    /// 按 id 读取文档
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// 以指定 id 整体写入文档（存在则整条替换，不做字段级合并）
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// 浅合并更新指定字段，文档不存在时返回 NotFound
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<()>;

    /// 扫描集合，可选单字段过滤，按插入顺序返回
    async fn scan(&self, collection: &str, filter: Option<&Filter>) -> Result<Vec<Document>>;
}
