//! Outbound mail for sqlmail.
//!
//! The job hands an [`OutgoingMail`] to a [`Notifier`]; [`SmtpNotifier`] is
//! the production implementation.

pub mod attachment;
mod smtp;

pub use attachment::{decode_words, encode_words, name_for, AttachmentDescriptor};
pub use smtp::SmtpNotifier;

use crate::config::DataConfig;
use crate::error::Result;
use async_trait::async_trait;

/// A composed message, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment: Option<AttachmentDescriptor>,
}

impl OutgoingMail {
    /// Builds the message described by the `[data]` section.
    pub fn from_config(data: &DataConfig, attachment: Option<AttachmentDescriptor>) -> Self {
        Self {
            to: data.recipients(),
            cc: data.cc_recipients(),
            subject: data.subject.clone(),
            body: data.plain_body.clone(),
            attachment,
        }
    }
}

/// Delivers composed mail.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `mail` once. Failures are returned as transport errors, unretried.
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}
