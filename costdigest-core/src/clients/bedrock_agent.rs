use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::error::DisplayErrorContext;
use aws_sdk_bedrockagentruntime::operation::invoke_agent::InvokeAgentOutput;
use aws_sdk_bedrockagentruntime::types::ResponseStream;
use aws_sdk_bedrockagentruntime::Client;
use tracing::{debug, trace};

use crate::error::{CostDigestError, CostDigestResult};

use super::traits::{AgentInvocation, AgentRuntime, CompletionStream};

/// Agent runtime backed by Amazon Bedrock Agents `InvokeAgent`.
pub struct BedrockAgentRuntime {
    client: Client,
}

impl BedrockAgentRuntime {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AgentRuntime for BedrockAgentRuntime {
    fn runtime_name(&self) -> &str {
        "bedrock-agent"
    }

    async fn invoke(
        &self,
        request: AgentInvocation,
    ) -> CostDigestResult<Box<dyn CompletionStream>> {
        debug!(
            agent_id = %request.agent_id,
            alias_id = %request.alias_id,
            session_id = %request.session_id,
            "Invoking Bedrock agent"
        );

        let output = self
            .client
            .invoke_agent()
            .agent_id(request.agent_id)
            .agent_alias_id(request.alias_id)
            .session_id(request.session_id)
            .input_text(request.input_text)
            .send()
            .await
            .map_err(|e| {
                CostDigestError::AgentInvocationFailed(DisplayErrorContext(&e).to_string())
            })?;

        Ok(Box::new(BedrockCompletion { output }))
    }
}

/// Event stream of an `InvokeAgent` response. Only chunk events carry
/// completion text; traces and other events are skipped.
struct BedrockCompletion {
    output: InvokeAgentOutput,
}

#[async_trait]
impl CompletionStream for BedrockCompletion {
    async fn next_chunk(&mut self) -> CostDigestResult<Option<Vec<u8>>> {
        loop {
            let event = self.output.completion.recv().await.map_err(|e| {
                CostDigestError::AgentInvocationFailed(DisplayErrorContext(&e).to_string())
            })?;

            match event {
                None => return Ok(None),
                Some(ResponseStream::Chunk(part)) => {
                    if let Some(bytes) = part.bytes() {
                        return Ok(Some(bytes.as_ref().to_vec()));
                    }
                }
                Some(other) => {
                    trace!(event = ?other, "Skipping non-chunk agent event");
                }
            }
        }
    }
}
