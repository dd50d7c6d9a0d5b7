//! SMTP delivery using lettre.

use super::{Notifier, OutgoingMail};
use crate::config::EmailConfig;
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use lettre::message::header::{ContentDisposition, ContentTransferEncoding, ContentType};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

/// Port on which the relay expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends mail through an authenticated SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    /// Creates a notifier for the relay described by `config`.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Composes the MIME message without sending it.
    pub async fn build_message(&self, mail: &OutgoingMail) -> Result<Message> {
        let sender: Address = self.config.user.parse().map_err(|e| {
            ExportError::transport(format!("Invalid sender '{}': {e}", self.config.user))
        })?;

        let mut builder = Message::builder()
            .from(Mailbox::new(Some(self.config.from_name.clone()), sender))
            .subject(mail.subject.clone());
        for to in &mail.to {
            builder = builder.to(parse_mailbox(to)?);
        }
        for cc in &mail.cc {
            builder = builder.cc(parse_mailbox(cc)?);
        }

        let body = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .header(ContentTransferEncoding::Base64)
            .body(mail.body.clone());
        let mut parts = MultiPart::mixed().singlepart(body);

        if let Some(attachment) = &mail.attachment {
            let content = tokio::fs::read(&attachment.path).await.map_err(|e| {
                ExportError::transport(format!(
                    "Failed to read attachment {}: {e}",
                    attachment.path.display()
                ))
            })?;
            let content_type = ContentType::parse(&attachment.content_type_header())
                .map_err(|e| ExportError::transport(format!("Invalid attachment type: {e}")))?;

            parts = parts.singlepart(
                SinglePart::builder()
                    .header(content_type)
                    // lettre applies RFC 2231 to the raw name
                    .header(ContentDisposition::attachment(&attachment.display_name))
                    .header(ContentTransferEncoding::Base64)
                    .body(content),
            );
        }

        builder
            .multipart(parts)
            .map_err(|e| ExportError::transport(format!("Failed to build message: {e}")))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let tls_parameters = TlsParameters::builder(self.config.smtp.clone())
            .dangerous_accept_invalid_certs(self.config.accept_invalid_certs)
            .build()
            .map_err(|e| {
                ExportError::transport(format!("Invalid TLS settings for {}: {e}", self.config.smtp))
            })?;

        let tls = if self.config.port == IMPLICIT_TLS_PORT {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp)
            .port(self.config.port)
            .tls(tls);
        if !self.config.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.user.clone(),
                self.config.passwd.clone(),
            ));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let message = self.build_message(mail).await?;
        let transport = self.transport()?;

        debug!(
            "Sending mail via {}:{} to {} recipient(s)",
            self.config.smtp,
            self.config.port,
            mail.to.len() + mail.cc.len()
        );
        let response = transport.send(message).await.map_err(|e| {
            ExportError::transport(format!(
                "Failed to send via {}:{}: {e}",
                self.config.smtp, self.config.port
            ))
        })?;

        info!("Mail accepted by {} ({})", self.config.smtp, response.code());
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| ExportError::transport(format!("Invalid address '{address}': {e}")))
}
