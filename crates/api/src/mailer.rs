//! Outgoing mail seam.
//!
//! Handlers build an [`EmailMessage`] and hand it to a [`Mailer`] from a
//! background task. Rendering and delivery belong to the transport.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

/// Template sent after registration; carries the first activation token.
pub const WELCOME_TEMPLATE: &str = "user_welcome";

/// Template sent when a user asks for a new activation token.
pub const ACTIVATION_TEMPLATE: &str = "token_activation";

/// A templated message. `data` may hold token plaintexts and is never
/// printed by `Debug`.
#[derive(Clone)]
pub struct EmailMessage {
    pub recipient: String,
    pub template: &'static str,
    pub data: Value,
}

impl fmt::Debug for EmailMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailMessage")
            .field("recipient", &self.recipient)
            .field("template", &self.template)
            .field("data", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

/// Mailer that only records the delivery in the log.
#[derive(Debug, Clone)]
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        tracing::info!(
            sender = %self.sender,
            recipient = %message.recipient,
            template = message.template,
            "Email dispatched"
        );
        Ok(())
    }
}
