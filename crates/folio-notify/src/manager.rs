use crate::message::{NotifyLevel, NotifyMessage};
use crate::notifier::Notifier;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// 通知管理器
///
/// 持有已注册的通知器并向全部通知器广播。投递是尽力而为的：
/// 任何一个通知器失败只记日志，不影响其余通知器，也不向调用方传播
pub struct NotifyManager {
    /// 通知器列表
    notifiers: Arc<RwLock<Vec<Box<dyn Notifier>>>>,

    /// 最小通知级别
    min_level: NotifyLevel,
}

impl NotifyManager {
    pub fn new(min_level: NotifyLevel) -> Self {
        Self {
            notifiers: Arc::new(RwLock::new(Vec::new())),
            min_level,
        }
    }

    /// 注册通知器
    pub async fn register(&self, notifier: Box<dyn Notifier>) {
        info!("Registered notifier: {}", notifier.name());
        let mut notifiers = self.notifiers.write().await;
        notifiers.push(notifier);
    }

    /// 已注册通知器数量
    pub async fn notifier_count(&self) -> usize {
        self.notifiers.read().await.len()
    }

    /// 向所有通知器广播
    pub async fn broadcast(&self, message: &NotifyMessage) {
        if !self.should_notify(message.level) {
            return;
        }

        let notifiers = self.notifiers.read().await;
        for notifier in notifiers.iter() {
            if !notifier.is_enabled() {
                continue;
            }
            match notifier.send(message).await {
                Ok(result) if result.success => {
                    info!("Notification sent via {}: {}", notifier.name(), message.subject);
                }
                Ok(result) => {
                    error!("Notification failed via {}: {}", notifier.name(), result.detail);
                }
                Err(e) => {
                    error!("Notification error via {}: {}", notifier.name(), e);
                }
            }
        }
    }

    /// 检查是否达到通知级别
    fn should_notify(&self, level: NotifyLevel) -> bool {
        level >= self.min_level
    }
}

impl Default for NotifyManager {
    fn default() -> Self {
        Self::new(NotifyLevel::Info)
    }
}
