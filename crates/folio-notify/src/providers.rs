use crate::message::NotifyMessage;
use crate::notifier::{Notifier, NotifyResult};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

// ============================================================================
// Webhook 推送
// ============================================================================

/// Webhook 推送配置
///
/// 推送网关接收 `{title, message, icon}` 负载并分发给订阅者
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    /// 附带的图标地址（通常是站点 favicon）
    #[serde(default)]
    pub icon_url: Option<String>,
}

pub struct WebhookNotifier {
    config: WebhookConfig,
    client: reqwest::Client,
    enabled: bool,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            enabled: true,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &NotifyMessage) -> Result<NotifyResult> {
        let payload = json!({
            "title": message.subject,
            "message": message.body,
            "icon": self.config.icon_url,
            "level": message.level.as_str(),
        });

        let response = self
            .client
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "Webhook returned status {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "webhook"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// ============================================================================
// 邮件通知
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: Vec<String>,
}

pub struct EmailNotifier {
    config: EmailConfig,
    enabled: bool,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            enabled: true,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, message: &NotifyMessage) -> Result<NotifyResult> {
        use lettre::message::header::ContentType;
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{Message, SmtpTransport, Transport};

        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        let mailer = SmtpTransport::relay(&self.config.smtp_host)?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build();

        let body = format!(
            "{}\n\nSeverity: {}\nTime: {}",
            message.body,
            message.level.as_str(),
            message.timestamp
        );

        let mut failures = Vec::new();
        for recipient in &self.config.to {
            let email = Message::builder()
                .from(self.config.from.parse()?)
                .to(recipient.parse()?)
                .subject(&message.subject)
                .header(ContentType::TEXT_PLAIN)
                .body(body.clone())?;

            if let Err(e) = mailer.send(&email) {
                failures.push(format!("{}: {}", recipient, e));
            }
        }

        if failures.is_empty() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "Email send failed: {}",
                failures.join("; ")
            )))
        }
    }

    fn name(&self) -> &str {
        "email"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
