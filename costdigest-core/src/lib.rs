#![allow(
    clippy::needless_borrows_for_generic_args,
    clippy::derivable_impls,
    clippy::len_zero
)]

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use clients::{
    build_transport, load_sdk_config, AgentInvocation, AgentRuntime, BedrockAgentRuntime,
    BillingQuery, BillingSource, BufferedCompletion, CompletionStream, ConsoleTransport,
    CostExplorerSource, CostGroup, DeliveryReceipt, MailTransport, SesTransport,
};
#[cfg(feature = "smtp")]
pub use clients::SmtpTransport;
pub use config::{
    get_config_dir, get_config_paths, AgentConfig, AwsConfig, BillingConfig, BodyFormat,
    ConfigLoadError, CostDigestConfig, EmailConfig, LoggingConfig, SmtpConfig, TransportKind,
};
pub use error::{CliErrorDisplay, CostDigestError, CostDigestResult};
pub use models::{
    CostReport, EmailBody, EmailMessage, InvocationResult, PipelineStage, ReportPeriod,
    ServiceCost,
};
pub use services::{
    collect_completion, compose_subject, compose_text_body, escape_html, format_raw_block,
    new_session_id, parse_amount, render_html_document, CostAggregator, Notifier, ReportJob,
    SummaryRequester,
};
