use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::clients::{AgentRuntime, BillingSource, MailTransport};
use crate::config::{BodyFormat, CostDigestConfig};
use crate::error::{CostDigestError, CostDigestResult};
use crate::models::{CostReport, EmailBody, EmailMessage, InvocationResult, PipelineStage};

use super::cost_aggregator::CostAggregator;
use super::notifier::Notifier;
use super::report_formatter::{
    compose_subject, compose_text_body, format_raw_block, render_html_document,
};
use super::summary_requester::SummaryRequester;

/// One run of the cost report job: aggregate, summarize, format, send.
///
/// Stages only move forward. A failure at any stage leaves the job in
/// `PipelineStage::Failed` and nothing after that stage runs, so no email is
/// sent for a failed run.
pub struct ReportJob {
    config: CostDigestConfig,
    aggregator: CostAggregator,
    summarizer: SummaryRequester,
    notifier: Notifier,
    stage: PipelineStage,
    agent_missing: bool,
}

impl ReportJob {
    /// `agent` may be `None` when summarization is disabled; the job then
    /// sends the raw data section only. Passing `None` while
    /// `agent.enabled` is set makes every run fail with E2002.
    pub fn new(
        config: CostDigestConfig,
        billing: Arc<dyn BillingSource>,
        agent: Option<Arc<dyn AgentRuntime>>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        let aggregator = CostAggregator::new(billing, config.billing.clone());
        let agent_missing = agent.is_none() && config.agent.enabled;
        let summarizer = match agent {
            Some(runtime) if config.agent.enabled => {
                SummaryRequester::new(runtime, config.agent.clone(), config.email.format)
            }
            _ => SummaryRequester::disabled(config.email.format),
        };

        Self {
            config,
            aggregator,
            summarizer,
            notifier: Notifier::new(transport),
            stage: PipelineStage::Start,
            agent_missing,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn config(&self) -> &CostDigestConfig {
        &self.config
    }

    pub async fn run(&mut self) -> CostDigestResult<InvocationResult> {
        self.run_for(Utc::now().date_naive()).await
    }

    pub async fn run_for(&mut self, today: NaiveDate) -> CostDigestResult<InvocationResult> {
        self.stage = PipelineStage::Start;
        info!(%today, "Starting cost report job");

        match self.execute(today).await {
            Ok(result) => {
                self.advance(PipelineStage::Done);
                Ok(result)
            }
            Err(e) => {
                e.log();
                self.advance(PipelineStage::Failed);
                Err(e)
            }
        }
    }

    async fn execute(&mut self, today: NaiveDate) -> CostDigestResult<InvocationResult> {
        self.config.validate()?;
        if self.agent_missing {
            return Err(CostDigestError::InvalidConfigValue {
                key: "agent.enabled".to_string(),
                message: "summarization is enabled but no agent runtime was provided"
                    .to_string(),
            });
        }

        let report = self.aggregator.month_to_date(today).await?;
        self.advance(PipelineStage::DataFetched);

        let summary = self.summarizer.summarize(&report).await?;
        self.advance(PipelineStage::Summarized);

        let message = self.compose_message(&report, &summary);
        self.advance(PipelineStage::Formatted);

        self.notifier.deliver(&message).await?;
        self.advance(PipelineStage::Sent);

        Ok(InvocationResult::sent())
    }

    /// Builds the outgoing email for `report` in the configured body format.
    pub fn compose_message(&self, report: &CostReport, summary: &str) -> EmailMessage {
        let raw_block = format_raw_block(report);
        let body = match self.config.email.format {
            BodyFormat::Text => EmailBody::Text(compose_text_body(summary, &raw_block)),
            BodyFormat::Html => EmailBody::Html(render_html_document(summary, &raw_block)),
        };

        EmailMessage::new(
            self.config.email.from.clone(),
            self.config.email.to.clone(),
            compose_subject(&self.config.email.subject_prefix, report),
            body,
        )
    }

    fn advance(&mut self, next: PipelineStage) {
        debug!(from = %self.stage, to = %next, "Stage transition");
        info!(stage = %next, "Cost report job stage");
        self.stage = next;
    }
}
