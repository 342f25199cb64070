/// Notifications emitted after core mutations
use async_trait::async_trait;
use lettre::Message;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use serde_json::Number;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::constants::SEND_ACCESS_UPDATED_SUBJECT;
use crate::error::{AdminError, Result};
use crate::store::{Database, Statement};
use crate::utils::redact_address;

/// An address's send permission was changed by an administrator
#[derive(Debug, Clone, PartialEq)]
pub struct SenderPermissionChanged {
    pub address: String,
    pub enabled: bool,
    pub balance: Number,
}

impl SenderPermissionChanged {
    pub fn subject(&self) -> &'static str {
        SEND_ACCESS_UPDATED_SUBJECT
    }

    pub fn body(&self) -> String {
        format!(
            "Your send access has been {}, balance: {}",
            if self.enabled { "enabled" } else { "disabled" },
            self.balance
        )
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn sender_permission_changed(&self, event: &SenderPermissionChanged) -> Result<()>;
}

/// Delivers notifications as mail placed directly in the recipient's inbox
pub struct InternalMailNotifier {
    db: Arc<dyn Database>,
    sender: Mailbox,
}

impl InternalMailNotifier {
    pub fn new(db: Arc<dyn Database>, sender: &str) -> Result<Self> {
        let sender = format!("Admin <{}>", sender)
            .parse::<Mailbox>()
            .map_err(|e| AdminError::Config(format!("Invalid admin mail sender: {}", e)))?;
        Ok(Self { db, sender })
    }

    /// Build the raw MIME text of a plain-text mail. Returns `(message_id, raw)`.
    pub fn compose(&self, to: &str, subject: &str, body: &str) -> Result<(String, String)> {
        let recipient = to
            .parse::<Mailbox>()
            .map_err(|e| AdminError::Notification(format!("Invalid recipient: {}", e)))?;

        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.sender.email.domain());

        let message = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(subject)
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AdminError::Notification(format!("Failed to build mail: {}", e)))?;

        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        Ok((message_id, raw))
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let (message_id, raw) = self.compose(to, subject, body)?;

        self.db
            .run(
                &Statement::new(
                    "INSERT INTO raw_mails (source, address, raw, message_id) VALUES (?, ?, ?, ?)",
                )
                .bind(self.sender.email.to_string())
                .bind(to)
                .bind(raw)
                .bind(message_id),
            )
            .await
            .map_err(|e| AdminError::Notification(format!("Failed to store mail: {}", e)))?;

        info!(to = %redact_address(to), subject, "Internal notification delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for InternalMailNotifier {
    async fn sender_permission_changed(&self, event: &SenderPermissionChanged) -> Result<()> {
        self.deliver(&event.address, event.subject(), &event.body())
            .await
    }
}
