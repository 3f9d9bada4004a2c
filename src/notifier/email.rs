use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::config::EmailConfig;
use crate::error::{AppError, Result};
use crate::notifier::Notifier;

/// Mail delivery over an authenticated STARTTLS relay (port 587).
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    fn new(from: &str, password: &str, to: &str, smtp_host: &str) -> Result<Self> {
        let from_box: Mailbox = from
            .parse()
            .map_err(|e| AppError::Config(format!("EMAIL_FROM '{from}' is not an address: {e}")))?;
        let to_box: Mailbox = to
            .parse()
            .map_err(|e| AppError::Config(format!("EMAIL_TO '{to}' is not an address: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
            .map_err(|e| AppError::Config(format!("SMTP relay {smtp_host}: {e}")))?
            .credentials(Credentials::new(from.to_string(), password.to_string()))
            .build();

        Ok(Self { transport, from: from_box, to: to_box })
    }
}

/// Email notifier chosen from configuration.
///
/// Without usable credentials or addresses every send reports a configuration
/// error, so the operator sees it on each alert while the run carries on.
pub enum EmailNotifier {
    Smtp(SmtpNotifier),
    MissingCredentials,
    /// Credentials are set but the addresses or relay are unusable.
    Misconfigured(String),
}

impl EmailNotifier {
    pub fn from_config(cfg: &EmailConfig) -> Self {
        match (&cfg.from, &cfg.app_password, cfg.recipient()) {
            (Some(from), Some(password), Some(to)) => {
                match SmtpNotifier::new(from, password, to, &cfg.smtp_host) {
                    Ok(smtp) => EmailNotifier::Smtp(smtp),
                    Err(AppError::Config(reason)) => EmailNotifier::Misconfigured(reason),
                    Err(e) => EmailNotifier::Misconfigured(e.to_string()),
                }
            }
            _ => EmailNotifier::MissingCredentials,
        }
    }
}

impl Notifier for EmailNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let smtp = match self {
            EmailNotifier::Smtp(smtp) => smtp,
            EmailNotifier::MissingCredentials => {
                return Err(AppError::Config(
                    "email credentials not found (set EMAIL_FROM and EMAIL_APP_PASSWORD)"
                        .to_string(),
                ))
            }
            EmailNotifier::Misconfigured(reason) => {
                return Err(AppError::Config(format!("email notifier unusable: {reason}")))
            }
        };

        let message = Message::builder()
            .from(smtp.from.clone())
            .to(smtp.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Delivery(format!("building message: {e}")))?;

        smtp.transport
            .send(message)
            .await
            .map_err(|e| AppError::Delivery(format!("SMTP send: {e}")))?;

        debug!(to = %smtp.to, "Email sent");
        Ok(())
    }
}
