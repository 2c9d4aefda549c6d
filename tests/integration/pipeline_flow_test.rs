#![allow(clippy::field_reassign_with_default)]

use async_trait::async_trait;
use chrono::NaiveDate;
use costdigest_core::{
    AgentInvocation, AgentRuntime, BillingQuery, BillingSource, BodyFormat, BufferedCompletion,
    CompletionStream, ConsoleTransport, CostDigestConfig, CostDigestError, CostDigestResult,
    CostGroup, DeliveryReceipt, EmailMessage, InvocationResult, MailTransport, PipelineStage,
    ReportJob,
};
use std::io::Write;
use std::sync::{Arc, Mutex, RwLock};

struct MockBillingSource {
    groups: Arc<RwLock<Vec<CostGroup>>>,
    should_fail: Arc<RwLock<bool>>,
    queries: Arc<RwLock<Vec<BillingQuery>>>,
}

impl MockBillingSource {
    fn new() -> Self {
        Self {
            groups: Arc::new(RwLock::new(Vec::new())),
            should_fail: Arc::new(RwLock::new(false)),
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn with_groups(groups: Vec<CostGroup>) -> Self {
        let source = Self::new();
        *source.groups.write().unwrap() = groups;
        source
    }

    fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().unwrap() = fail;
    }

    fn query_count(&self) -> usize {
        self.queries.read().unwrap().len()
    }
}

#[async_trait]
impl BillingSource for MockBillingSource {
    fn source_name(&self) -> &str {
        "mock-billing"
    }

    async fn fetch_cost_groups(&self, query: &BillingQuery) -> CostDigestResult<Vec<CostGroup>> {
        self.queries.write().unwrap().push(query.clone());

        if *self.should_fail.read().unwrap() {
            return Err(CostDigestError::BillingQueryFailed(
                "Mock billing failure".to_string(),
            ));
        }

        Ok(self.groups.read().unwrap().clone())
    }
}

struct MockAgentRuntime {
    chunks: Vec<Vec<u8>>,
    invocations: Arc<RwLock<Vec<AgentInvocation>>>,
}

impl MockAgentRuntime {
    fn replying(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
            invocations: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn invocation_count(&self) -> usize {
        self.invocations.read().unwrap().len()
    }
}

#[async_trait]
impl AgentRuntime for MockAgentRuntime {
    fn runtime_name(&self) -> &str {
        "mock-agent"
    }

    async fn invoke(&self, request: AgentInvocation) -> CostDigestResult<Box<dyn CompletionStream>> {
        self.invocations.write().unwrap().push(request);
        Ok(Box::new(BufferedCompletion::new(self.chunks.clone())))
    }
}

struct MockMailTransport {
    sent: Arc<RwLock<Vec<EmailMessage>>>,
}

impl MockMailTransport {
    fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn sent(&self) -> Vec<EmailMessage> {
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for MockMailTransport {
    fn transport_name(&self) -> &str {
        "mock-mail"
    }

    async fn send(&self, message: &EmailMessage) -> CostDigestResult<DeliveryReceipt> {
        self.sent.write().unwrap().push(message.clone());
        Ok(DeliveryReceipt {
            message_id: Some(format!("mock-{}", self.sent.read().unwrap().len())),
        })
    }
}

fn test_config() -> CostDigestConfig {
    let mut config = CostDigestConfig::default();
    config.email.to = "finance@example.com".to_string();
    config.email.from = "reports@example.com".to_string();
    config.agent.agent_id = "AGENT123".to_string();
    config.agent.alias_id = "ALIAS456".to_string();
    config
}

fn sample_groups() -> Vec<CostGroup> {
    vec![
        CostGroup::new("Amazon Simple Storage Service", "3.20", "USD"),
        CostGroup::new("Amazon Elastic Compute Cloud - Compute", "12.50", "USD"),
        CostGroup::new("AWS Lambda", "0.0000001", "USD"),
    ]
}

fn oct_15() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
}

mod full_run {
    use super::*;

    #[tokio::test]
    async fn test_text_report_end_to_end() {
        let billing = Arc::new(MockBillingSource::with_groups(sample_groups()));
        let agent = Arc::new(MockAgentRuntime::replying(&[
            "EC2 dominates spend ",
            "this month.",
        ]));
        let mail = Arc::new(MockMailTransport::new());

        let mut job = ReportJob::new(test_config(), billing.clone(), Some(agent.clone()), mail.clone());
        let result = job.run_for(oct_15()).await.unwrap();

        assert_eq!(result.status_code, 200);
        assert_eq!(result, InvocationResult::sent());
        assert_eq!(job.stage(), PipelineStage::Done);
        assert_eq!(billing.query_count(), 1);
        assert_eq!(agent.invocation_count(), 1);

        let sent = mail.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].body.content(),
            "AWS Monthly Cost Report\n\n\
             AI Summary:\n\
             EC2 dominates spend this month.\n\n\
             -----------------------------\n\
             Raw Cost Data\n\
             -----------------------------\n\
             Time range: 2026-10-01 to 2026-10-15\n\
             Total: 15.7000001 USD\n\
             \n\
             Per-service breakdown (unblended):\n\
             - Amazon Elastic Compute Cloud - Compute: 12.50 USD\n\
             - Amazon Simple Storage Service: 3.20 USD\n\
             - AWS Lambda: 0.0000001 USD\n"
        );
    }

    #[tokio::test]
    async fn test_prompt_carries_report_json() {
        let billing = Arc::new(MockBillingSource::with_groups(sample_groups()));
        let agent = Arc::new(MockAgentRuntime::replying(&["ok"]));
        let mail = Arc::new(MockMailTransport::new());

        let mut job = ReportJob::new(test_config(), billing, Some(agent.clone()), mail);
        job.run_for(oct_15()).await.unwrap();

        let invocations = agent.invocations.read().unwrap();
        let prompt = &invocations[0].input_text;
        let json_start = prompt.find('{').unwrap();
        let payload: serde_json::Value = serde_json::from_str(&prompt[json_start..]).unwrap();

        assert_eq!(payload["start"], "2026-10-01");
        assert_eq!(payload["end"], "2026-10-15");
        assert_eq!(payload["currency"], "USD");
        assert_eq!(payload["total_amount"], "15.7000001");
        assert_eq!(payload["services"].as_array().unwrap().len(), 3);
        assert_eq!(payload["services"][0]["amount"], "3.20");
    }

    #[tokio::test]
    async fn test_html_report_end_to_end() {
        let billing = Arc::new(MockBillingSource::with_groups(vec![CostGroup::new(
            "R&D <sandbox>",
            "1.00",
            "USD",
        )]));
        let agent = Arc::new(MockAgentRuntime::replying(&["<p>All quiet.</p>"]));
        let mail = Arc::new(MockMailTransport::new());

        let mut config = test_config();
        config.email.format = BodyFormat::Html;

        let mut job = ReportJob::new(config, billing, Some(agent.clone()), mail.clone());
        job.run_for(oct_15()).await.unwrap();

        let sent = mail.sent();
        let html = sent[0].body.content();
        assert!(sent[0].body.is_html());
        assert!(html.contains("<p>All quiet.</p>"));
        assert!(html.contains("R&amp;D &lt;sandbox&gt;"));
        assert!(!html.contains("R&D <sandbox>"));

        let invocations = agent.invocations.read().unwrap();
        assert!(invocations[0].input_text.contains("HTML fragment"));
    }

    #[tokio::test]
    async fn test_repeated_runs_use_fresh_sessions() {
        let billing = Arc::new(MockBillingSource::with_groups(sample_groups()));
        let agent = Arc::new(MockAgentRuntime::replying(&["ok"]));
        let mail = Arc::new(MockMailTransport::new());

        let mut job = ReportJob::new(test_config(), billing, Some(agent.clone()), mail.clone());
        job.run_for(oct_15()).await.unwrap();
        job.run_for(oct_15()).await.unwrap();

        let invocations = agent.invocations.read().unwrap();
        assert_eq!(invocations.len(), 2);
        assert_ne!(invocations[0].session_id, invocations[1].session_id);
        assert_eq!(mail.sent().len(), 2);
    }
}

mod failure_handling {
    use super::*;

    #[tokio::test]
    async fn test_missing_recipient_fails_before_any_call() {
        let billing = Arc::new(MockBillingSource::with_groups(sample_groups()));
        let agent = Arc::new(MockAgentRuntime::replying(&["unused"]));
        let mail = Arc::new(MockMailTransport::new());

        let mut config = test_config();
        config.email.to = String::new();

        let mut job = ReportJob::new(config, billing.clone(), Some(agent.clone()), mail.clone());
        let err = job.run_for(oct_15()).await.unwrap_err();

        assert_eq!(err.error_code(), "E2001");
        assert!(err.to_string().contains("COST_EMAIL_TO"));
        assert_eq!(job.stage(), PipelineStage::Failed);
        assert_eq!(billing.query_count(), 0);
        assert_eq!(agent.invocation_count(), 0);
        assert!(mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_sender_fails_before_any_call() {
        let billing = Arc::new(MockBillingSource::new());
        let mail = Arc::new(MockMailTransport::new());

        let mut config = test_config();
        config.email.from = "  ".to_string();

        let mut job = ReportJob::new(config, billing.clone(), None, mail.clone());
        let err = job.run_for(oct_15()).await.unwrap_err();

        assert!(err.is_config_error());
        assert!(err.to_string().contains("COST_EMAIL_FROM"));
        assert_eq!(billing.query_count(), 0);
    }

    #[tokio::test]
    async fn test_billing_failure_stops_pipeline() {
        let billing = Arc::new(MockBillingSource::with_groups(sample_groups()));
        billing.set_should_fail(true);
        let agent = Arc::new(MockAgentRuntime::replying(&["unused"]));
        let mail = Arc::new(MockMailTransport::new());

        let mut job = ReportJob::new(test_config(), billing, Some(agent.clone()), mail.clone());
        let err = job.run_for(oct_15()).await.unwrap_err();

        assert!(err.is_upstream_error());
        assert_eq!(job.stage(), PipelineStage::Failed);
        assert_eq!(agent.invocation_count(), 0);
        assert!(mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_job_can_run_again() {
        let billing = Arc::new(MockBillingSource::with_groups(sample_groups()));
        billing.set_should_fail(true);
        let mail = Arc::new(MockMailTransport::new());

        let mut config = test_config();
        config.agent.enabled = false;

        let mut job = ReportJob::new(config, billing.clone(), None, mail.clone());
        assert!(job.run_for(oct_15()).await.is_err());
        assert_eq!(job.stage(), PipelineStage::Failed);

        billing.set_should_fail(false);
        job.run_for(oct_15()).await.unwrap();
        assert_eq!(job.stage(), PipelineStage::Done);
        assert_eq!(mail.sent().len(), 1);
    }
}

mod edge_cases {
    use super::*;

    #[tokio::test]
    async fn test_no_cost_groups_still_sends() {
        let billing = Arc::new(MockBillingSource::new());
        let agent = Arc::new(MockAgentRuntime::replying(&[]));
        let mail = Arc::new(MockMailTransport::new());

        let mut job = ReportJob::new(test_config(), billing, Some(agent), mail.clone());
        job.run_for(oct_15()).await.unwrap();

        let sent = mail.sent();
        let body = sent[0].body.content();
        assert!(body.contains("Total: 0 USD"));
        assert!(!body.contains("AI Summary"));
        assert!(body.ends_with("Per-service breakdown (unblended):\n"));
    }

    #[tokio::test]
    async fn test_first_of_month_queries_one_day() {
        let billing = Arc::new(MockBillingSource::with_groups(sample_groups()));
        let mail = Arc::new(MockMailTransport::new());

        let mut config = test_config();
        config.agent.enabled = false;

        let mut job = ReportJob::new(config, billing.clone(), None, mail.clone());
        job.run_for(NaiveDate::from_ymd_opt(2026, 12, 1).unwrap())
            .await
            .unwrap();

        let queries = billing.queries.read().unwrap();
        assert_eq!(queries[0].start, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(
            queries[0].end_exclusive,
            NaiveDate::from_ymd_opt(2026, 12, 2).unwrap()
        );
        assert_eq!(
            mail.sent()[0].subject,
            "AWS Cost Report 2026-12-01 to 2026-12-01"
        );
    }

    #[tokio::test]
    async fn test_custom_subject_prefix() {
        let billing = Arc::new(MockBillingSource::with_groups(sample_groups()));
        let mail = Arc::new(MockMailTransport::new());

        let mut config = test_config();
        config.agent.enabled = false;
        config.email.subject_prefix = "[prod] Spend".to_string();

        let mut job = ReportJob::new(config, billing, None, mail.clone());
        job.run_for(oct_15()).await.unwrap();

        assert_eq!(mail.sent()[0].subject, "[prod] Spend 2026-10-01 to 2026-10-15");
    }
}

mod dry_run {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_console_transport_prints_composed_email() {
        let billing = Arc::new(MockBillingSource::with_groups(sample_groups()));
        let buffer = SharedBuffer::default();
        let transport = Arc::new(ConsoleTransport::with_writer(buffer.clone()));

        let mut config = test_config();
        config.agent.enabled = false;

        let mut job = ReportJob::new(config, billing, None, transport);
        job.run_for(oct_15()).await.unwrap();

        let printed = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(printed.starts_with("From: reports@example.com\n"));
        assert!(printed.contains("To: finance@example.com\n"));
        assert!(printed.contains("Subject: AWS Cost Report 2026-10-01 to 2026-10-15\n"));
        assert!(printed.contains("Raw Cost Data"));
    }
}
