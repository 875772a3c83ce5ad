//! Outbound notifications: transactional email and web push.
//!
//! Senders are traits so the API can run with real providers (SMTP relay,
//! push gateway) or with logging stand-ins when a provider is not configured.

pub mod email;
pub mod notifier;
pub mod push;
pub mod templates;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::database::models::PushSubscription;

pub use email::{LogEmailSender, SmtpEmailSender};
pub use notifier::Notifier;
pub use push::{HttpPushSender, LogPushSender};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The push endpoint no longer exists; the subscription should be removed.
    #[error("Push subscription expired")]
    Gone,

    #[error("Provider rejected the message with status {0}")]
    Rejected(u16),
}

/// A rendered email ready to hand to a sender.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, subscription: &PushSubscription, message: &PushMessage) -> Result<(), NotifyError>;
}
