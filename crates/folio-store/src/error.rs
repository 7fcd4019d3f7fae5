use thiserror::Error;

/// 文档存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    /// 文档未找到
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 后端错误
    #[error("Store backend error: {0}")]
    Backend(String),

    /// 其他错误
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 文档存储结果类型
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }
}
