use thiserror::Error;

/// 健康监控错误类型
///
/// 只有整轮无法继续的错误（如集合扫描失败）才会走到这里，
/// 单个端点/域名的失败在循环内降级处理
#[derive(Error, Debug)]
pub enum MonitorError {
    /// 存储错误
    #[error("Store error: {0}")]
    Store(#[from] folio_store::StoreError),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 其他错误
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 健康监控结果类型
pub type Result<T> = std::result::Result<T, MonitorError>;
