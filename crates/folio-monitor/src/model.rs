use chrono::{DateTime, NaiveDate, Utc};
use folio_core::parse_naive;
use folio_notify::NotifyLevel;
use folio_store::Document;
use serde::{Deserialize, Serialize};

/// 端点探测状态
///
/// 状态机：unknown → online ⇄ offline，只由探测结果驱动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    /// 尚未探测
    Unknown,
    /// 在线
    Online,
    /// 离线
    Offline,
}

impl EndpointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointStatus::Unknown => "unknown",
            EndpointStatus::Online => "online",
            EndpointStatus::Offline => "offline",
        }
    }

    fn from_str(s: &str) -> Self {
        match s {
            "online" => EndpointStatus::Online,
            "offline" => EndpointStatus::Offline,
            _ => EndpointStatus::Unknown,
        }
    }
}

/// 受监控的部署端点
///
/// `last_status` / `last_check` 只由探测周期写回
#[derive(Debug, Clone)]
pub struct MonitoredEndpoint {
    pub id: String,
    pub name: String,
    pub url: String,
    pub last_status: EndpointStatus,
    pub last_check: Option<chrono::NaiveDateTime>,
}

impl MonitoredEndpoint {
    /// 从文档宽容解析，缺失字段用默认值
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.get_str("name").unwrap_or("Unknown").to_string(),
            url: doc.get_str("url").unwrap_or_default().to_string(),
            last_status: doc
                .get_str("last_status")
                .map(EndpointStatus::from_str)
                .unwrap_or(EndpointStatus::Unknown),
            last_check: doc.get("last_check").and_then(parse_naive),
        }
    }

    /// 补全协议前缀后的探测地址
    pub fn probe_url(&self) -> String {
        if self.url.starts_with("http") {
            self.url.clone()
        } else {
            format!("https://{}", self.url)
        }
    }
}

/// 域名到期记录（本核心只读）
#[derive(Debug, Clone)]
pub struct DomainRecord {
    pub id: String,
    pub domain_name: String,
    pub expiry_date: Option<String>,
}

impl DomainRecord {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            domain_name: doc.get_str("domain_name").unwrap_or("Unknown").to_string(),
            expiry_date: doc.get_str("expiry_date").map(str::to_string),
        }
    }

    /// 解析 `YYYY-MM-DD` 到期日期，无法解析返回 `None`
    pub fn parsed_expiry(&self) -> Option<NaiveDate> {
        let raw = self.expiry_date.as_deref()?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

/// 收件箱告警消息
///
/// 创建后只有 `is_read` 会被修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMessage {
    pub name: String,
    pub subject: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub is_system: bool,
    pub alert_type: NotifyLevel,
}
