use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

use crate::error::{CostDigestError, CostDigestResult};
use crate::models::{EmailBody, EmailMessage};

use super::traits::{DeliveryReceipt, MailTransport};

/// Writes messages to a writer (stdout by default) instead of delivering
/// them. Backs dry runs.
pub struct ConsoleTransport {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleTransport {
    pub fn stdout() -> Self {
        Self::with_writer(std::io::stdout())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
        }
    }
}

pub fn render_message(message: &EmailMessage) -> String {
    let content_type = match message.body {
        EmailBody::Text(_) => "text/plain; charset=UTF-8",
        EmailBody::Html(_) => "text/html; charset=UTF-8",
    };

    format!(
        "From: {}\nTo: {}\nSubject: {}\nContent-Type: {}\n\n{}\n",
        message.from,
        message.to,
        message.subject,
        content_type,
        message.body.content()
    )
}

#[async_trait]
impl MailTransport for ConsoleTransport {
    fn transport_name(&self) -> &str {
        "console"
    }

    async fn send(&self, message: &EmailMessage) -> CostDigestResult<DeliveryReceipt> {
        let rendered = render_message(message);
        let mut out = self
            .out
            .lock()
            .map_err(|_| CostDigestError::Internal("console writer lock poisoned".to_string()))?;
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(DeliveryReceipt::default())
    }
}
