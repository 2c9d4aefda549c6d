use serde::{Deserialize, Serialize};
use std::fmt;

pub const SENT_MESSAGE: &str = "Cost report email sent.";

/// Where a job run currently is. Transitions only move forward; any failure
/// ends in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Start,
    DataFetched,
    Summarized,
    Formatted,
    Sent,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Start => write!(f, "start"),
            PipelineStage::DataFetched => write!(f, "data_fetched"),
            PipelineStage::Summarized => write!(f, "summarized"),
            PipelineStage::Formatted => write!(f, "formatted"),
            PipelineStage::Sent => write!(f, "sent"),
            PipelineStage::Done => write!(f, "done"),
            PipelineStage::Failed => write!(f, "failed"),
        }
    }
}

/// Structured success payload: a status code and a JSON-encoded message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResult {
    pub fn sent() -> Self {
        Self {
            status_code: 200,
            body: serde_json::json!({ "message": SENT_MESSAGE }).to_string(),
        }
    }
}
