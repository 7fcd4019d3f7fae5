use std::future::Future;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{error, info};

/// 后台任务句柄
pub struct JobHandle {
    shutdown_tx: watch::Sender<bool>,
    join_handle: JoinHandle<()>,
}

impl JobHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.join_handle.await;
    }

    pub fn abort(self) {
        self.join_handle.abort();
    }
}

/// 启动一个固定间隔的后台任务
///
/// 单轮失败只记日志，调度继续走下一拍；收到关闭信号后退出
pub fn spawn_job<F, Fut>(name: &'static str, period: Duration, task: F) -> JobHandle
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let join_handle = tokio::spawn(async move {
        let mut ticker = interval(period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = task().await {
                        error!(job = name, "Cycle failed: {:#}", e);
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!(job = name, "Job stopped");
    });

    JobHandle {
        shutdown_tx,
        join_handle,
    }
}
