pub mod error;
pub mod inbox;
pub mod model;
pub mod probe;
pub mod service;

pub use error::{MonitorError, Result};
pub use inbox::{AlertInbox, InboxEntry};
pub use model::{AlertMessage, DomainRecord, EndpointStatus, MonitoredEndpoint};
pub use probe::{HttpProber, Prober};
pub use service::HealthMonitor;

/// 受监控部署所在的集合（按 `category == "deployment"` 过滤）
pub const VAULT_COLLECTION: &str = "vault";

/// 域名到期记录集合
pub const DOMAINS_COLLECTION: &str = "domains";

/// 告警收件箱集合
pub const MESSAGES_COLLECTION: &str = "messages";
