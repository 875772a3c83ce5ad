use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{EmailMessage, EmailSender, NotifyError};
use crate::config::EmailConfig;

/// Sends mail through an SMTP relay with STARTTLS.
#[derive(Clone)]
pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|_| NotifyError::InvalidAddress(config.from_address.clone()))?;
        let credentials = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { mailer, from })
    }

    fn build(&self, message: &EmailMessage) -> Result<Message, NotifyError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|_| NotifyError::InvalidAddress(message.to.clone()))?;
        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone());

        let text = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(message.text.clone());
        let built = match &message.html {
            Some(html) => builder.multipart(
                MultiPart::alternative().singlepart(text).singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.clone()),
                ),
            ),
            None => builder.singlepart(text),
        };
        built.map_err(|e| NotifyError::Transport(e.to_string()))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let email = self.build(message)?;
        self.mailer
            .send(email)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

/// Stand-in used when SMTP is not configured: the message is logged instead.
#[derive(Debug, Default, Clone)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        tracing::info!(to = %message.to, subject = %message.subject, "Email not sent (SMTP disabled)");
        tracing::debug!(body = %message.text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.gn".to_string(),
            smtp_port: 587,
            smtp_username: "shop".to_string(),
            smtp_password: "secret".to_string(),
            from_address: "Grandson Project <boutique@grandsonproject.com>".to_string(),
            admin_address: None,
        }
    }

    #[tokio::test]
    async fn builds_multipart_messages() {
        let sender = SmtpEmailSender::new(&config()).unwrap();
        let message = EmailMessage {
            to: "client@example.gn".to_string(),
            subject: "Commande GP-20260101-AB12".to_string(),
            text: "Merci".to_string(),
            html: Some("<p>Merci</p>".to_string()),
        };
        assert!(sender.build(&message).is_ok());
    }

    #[tokio::test]
    async fn rejects_bad_recipients() {
        let sender = SmtpEmailSender::new(&config()).unwrap();
        let message = EmailMessage {
            to: "not an address".to_string(),
            subject: "x".to_string(),
            text: "x".to_string(),
            html: None,
        };
        assert!(matches!(sender.build(&message), Err(NotifyError::InvalidAddress(_))));
    }
}
