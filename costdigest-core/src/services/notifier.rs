use std::sync::Arc;

use tracing::info;

use crate::clients::{DeliveryReceipt, MailTransport};
use crate::error::CostDigestResult;
use crate::models::{EmailBody, EmailMessage};

/// Sends composed reports through a mail transport.
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    pub fn transport_name(&self) -> &str {
        self.transport.transport_name()
    }

    pub async fn notify(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: EmailBody,
    ) -> CostDigestResult<DeliveryReceipt> {
        self.deliver(&EmailMessage::new(from, to, subject, body)).await
    }

    pub async fn deliver(&self, message: &EmailMessage) -> CostDigestResult<DeliveryReceipt> {
        let receipt = self.transport.send(message).await?;

        info!(
            transport = self.transport.transport_name(),
            to = %message.to,
            html = message.body.is_html(),
            message_id = receipt.message_id.as_deref().unwrap_or("-"),
            "Sent cost report email"
        );

        Ok(receipt)
    }
}
