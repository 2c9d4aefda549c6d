mod cost_aggregator;
mod notifier;
mod pipeline;
mod report_formatter;
mod summary_requester;

pub use cost_aggregator::{parse_amount, CostAggregator, UNKNOWN_SERVICE};
pub use notifier::Notifier;
pub use pipeline::ReportJob;
pub use report_formatter::{
    compose_subject, compose_text_body, escape_html, format_raw_block, render_html_document,
    RAW_DATA_HEADING, REPORT_TITLE, SUMMARY_HEADING,
};
pub use summary_requester::{collect_completion, new_session_id, SummaryRequester};
