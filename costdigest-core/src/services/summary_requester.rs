use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clients::{AgentInvocation, AgentRuntime, CompletionStream};
use crate::config::{AgentConfig, BodyFormat};
use crate::error::{CostDigestError, CostDigestResult};
use crate::models::CostReport;

const PROMPT_PREAMBLE: &str = "Here is AWS month-to-date unblended cost data in JSON. \
Please generate the cost summary email according to your configured instructions.";

const HTML_INSTRUCTION: &str = "Respond with an HTML fragment (no <html>, <head> or <body> tags).";

const TEXT_INSTRUCTION: &str = "Respond in plain text without markup.";

/// Asks a hosted agent for a narrative summary of a cost report.
pub struct SummaryRequester {
    runtime: Option<Arc<dyn AgentRuntime>>,
    config: AgentConfig,
    format: BodyFormat,
}

impl SummaryRequester {
    pub fn new(runtime: Arc<dyn AgentRuntime>, config: AgentConfig, format: BodyFormat) -> Self {
        Self {
            runtime: Some(runtime),
            config,
            format,
        }
    }

    /// A requester that never calls an agent and always returns an empty
    /// narrative.
    pub fn disabled(format: BodyFormat) -> Self {
        Self {
            runtime: None,
            config: AgentConfig {
                enabled: false,
                ..AgentConfig::default()
            },
            format,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && self.runtime.is_some()
    }

    pub fn build_prompt(&self, report: &CostReport) -> CostDigestResult<String> {
        let payload = serde_json::to_string_pretty(report)?;
        let instruction = match self.format {
            BodyFormat::Html => HTML_INSTRUCTION,
            BodyFormat::Text => TEXT_INSTRUCTION,
        };

        Ok(format!("{} {}\n\n{}", PROMPT_PREAMBLE, instruction, payload))
    }

    pub async fn summarize(&self, report: &CostReport) -> CostDigestResult<String> {
        let runtime = match &self.runtime {
            Some(runtime) if self.config.enabled => runtime,
            _ => {
                debug!("Summarization disabled, skipping agent call");
                return Ok(String::new());
            }
        };

        let request = AgentInvocation {
            agent_id: self.config.agent_id.clone(),
            alias_id: self.config.alias_id.clone(),
            session_id: new_session_id(),
            input_text: self.build_prompt(report)?,
        };

        info!(
            runtime = runtime.runtime_name(),
            session_id = %request.session_id,
            "Requesting cost summary"
        );

        let stream = runtime.invoke(request).await?;
        let summary = collect_completion(stream).await?;

        if summary.is_empty() {
            warn!("Agent returned an empty completion");
        } else {
            debug!(chars = summary.chars().count(), "Received cost summary");
        }

        Ok(summary)
    }
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Drains a completion stream, joining chunk bytes in arrival order and
/// decoding the whole as UTF-8. Surrounding whitespace is trimmed.
pub async fn collect_completion(mut stream: Box<dyn CompletionStream>) -> CostDigestResult<String> {
    let mut bytes = Vec::new();
    while let Some(chunk) = stream.next_chunk().await? {
        bytes.extend_from_slice(&chunk);
    }

    let text = String::from_utf8(bytes).map_err(|e| {
        CostDigestError::AgentResponseInvalid(format!("completion is not valid UTF-8: {}", e))
    })?;

    Ok(text.trim().to_string())
}
