use async_trait::async_trait;
use aws_sdk_ses::error::DisplayErrorContext;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use aws_sdk_ses::Client;

use crate::error::{CostDigestError, CostDigestResult};
use crate::models::{EmailBody, EmailMessage};

use super::traits::{DeliveryReceipt, MailTransport};

const CHARSET: &str = "UTF-8";

/// Mail transport backed by Amazon SES `SendEmail`.
pub struct SesTransport {
    client: Client,
}

impl SesTransport {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn content(data: &str) -> CostDigestResult<Content> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| CostDigestError::EmailBuildFailed(e.to_string()))
}

fn build_message(message: &EmailMessage) -> CostDigestResult<Message> {
    let body = match &message.body {
        EmailBody::Text(text) => Body::builder().text(content(text)?).build(),
        EmailBody::Html(html) => Body::builder().html(content(html)?).build(),
    };

    Ok(Message::builder()
        .subject(content(&message.subject)?)
        .body(body)
        .build())
}

#[async_trait]
impl MailTransport for SesTransport {
    fn transport_name(&self) -> &str {
        "ses"
    }

    async fn send(&self, message: &EmailMessage) -> CostDigestResult<DeliveryReceipt> {
        let ses_message = build_message(message)?;

        let output = self
            .client
            .send_email()
            .source(message.from.clone())
            .destination(Destination::builder().to_addresses(message.to.clone()).build())
            .message(ses_message)
            .send()
            .await
            .map_err(|e| {
                CostDigestError::email_send_failed(
                    self.transport_name(),
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        Ok(DeliveryReceipt {
            message_id: Some(output.message_id().to_string()),
        })
    }
}
