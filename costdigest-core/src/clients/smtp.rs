//! SMTP delivery through lettre, for accounts that cannot use SES.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::{CostDigestError, CostDigestResult};
use crate::models::{EmailBody, EmailMessage};

use super::traits::{DeliveryReceipt, MailTransport};

pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn new(config: &SmtpConfig) -> CostDigestResult<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| CostDigestError::InvalidConfigValue {
                key: "smtp.host".to_string(),
                message: e.to_string(),
            })?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
        })
    }
}

fn parse_mailbox(address: &str) -> CostDigestResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| CostDigestError::EmailBuildFailed(format!("'{}': {}", address, e)))
}

fn build_message(message: &EmailMessage) -> CostDigestResult<Message> {
    let content_type = match message.body {
        EmailBody::Text(_) => ContentType::TEXT_PLAIN,
        EmailBody::Html(_) => ContentType::TEXT_HTML,
    };

    Message::builder()
        .from(parse_mailbox(&message.from)?)
        .to(parse_mailbox(&message.to)?)
        .subject(message.subject.clone())
        .header(content_type)
        .body(message.body.content().to_string())
        .map_err(|e| CostDigestError::EmailBuildFailed(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn transport_name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, message: &EmailMessage) -> CostDigestResult<DeliveryReceipt> {
        let email = build_message(message)?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| CostDigestError::email_send_failed(self.transport_name(), e.to_string()))?;

        Ok(DeliveryReceipt::default())
    }
}
