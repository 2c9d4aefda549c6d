use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;

use crate::error::CostDigestResult;
use crate::models::EmailMessage;

/// One billing request: a date range with an exclusive end, the metric to
/// read and the dimension to group by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingQuery {
    pub start: NaiveDate,
    pub end_exclusive: NaiveDate,
    pub metric: String,
    pub group_by: String,
}

/// A raw group as the billing API returns it, before amounts are parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostGroup {
    pub keys: Vec<String>,
    pub amount: Option<String>,
    pub unit: Option<String>,
}

impl CostGroup {
    pub fn new(key: impl Into<String>, amount: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            keys: vec![key.into()],
            amount: Some(amount.into()),
            unit: Some(unit.into()),
        }
    }
}

#[async_trait]
pub trait BillingSource: Send + Sync {
    fn source_name(&self) -> &str;

    async fn fetch_cost_groups(&self, query: &BillingQuery) -> CostDigestResult<Vec<CostGroup>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInvocation {
    pub agent_id: String,
    pub alias_id: String,
    pub session_id: String,
    pub input_text: String,
}

/// Chunks of an agent completion, yielded in arrival order. Exhausted once
/// `next_chunk` returns `None`; a new invocation is needed to read again.
#[async_trait]
pub trait CompletionStream: Send {
    async fn next_chunk(&mut self) -> CostDigestResult<Option<Vec<u8>>>;
}

#[async_trait]
pub trait AgentRuntime: Send + Sync {
    fn runtime_name(&self) -> &str;

    async fn invoke(
        &self,
        request: AgentInvocation,
    ) -> CostDigestResult<Box<dyn CompletionStream>>;
}

/// Completion whose chunks are already in memory.
#[derive(Debug, Default)]
pub struct BufferedCompletion {
    chunks: VecDeque<Vec<u8>>,
}

impl BufferedCompletion {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionStream for BufferedCompletion {
    async fn next_chunk(&mut self) -> CostDigestResult<Option<Vec<u8>>> {
        Ok(self.chunks.pop_front())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: Option<String>,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    fn transport_name(&self) -> &str;

    async fn send(&self, message: &EmailMessage) -> CostDigestResult<DeliveryReceipt>;
}
