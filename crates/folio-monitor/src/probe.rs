use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// 可达性探测 trait
///
/// 返回端点是否可达；网络错误和超时都视为不可达，不向上传播
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> bool;
}

/// HTTP HEAD 探测器
///
/// 带固定超时，响应状态码 < 400 视为在线
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => response.status().as_u16() < 400,
            Err(e) => {
                debug!(url = %url, "Probe failed: {}", e);
                false
            }
        }
    }
}
