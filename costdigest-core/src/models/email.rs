use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum EmailBody {
    Text(String),
    Html(String),
}

impl EmailBody {
    pub fn content(&self) -> &str {
        match self {
            EmailBody::Text(s) | EmailBody::Html(s) => s,
        }
    }

    pub fn is_html(&self) -> bool {
        matches!(self, EmailBody::Html(_))
    }
}

/// A single-recipient message, ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: EmailBody,
}

impl EmailMessage {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: EmailBody,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body,
        }
    }
}
