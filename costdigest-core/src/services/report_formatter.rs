//! Rendering of cost reports into email subjects and bodies.
//!
//! All functions here are pure; they take a report or pre-rendered blocks and
//! return strings.

use crate::models::CostReport;

pub const REPORT_TITLE: &str = "AWS Monthly Cost Report";
pub const SUMMARY_HEADING: &str = "AI Summary:";
pub const RAW_DATA_HEADING: &str = "Raw Cost Data";
const RULE: &str = "-----------------------------";

/// Plain-text block with the range, total and per-service lines, services
/// ordered by amount descending.
pub fn format_raw_block(report: &CostReport) -> String {
    let mut lines = vec![
        format!("Time range: {} to {}", report.start, report.end),
        format!("Total: {} {}", report.total_amount, report.currency),
        String::new(),
        "Per-service breakdown (unblended):".to_string(),
    ];

    for service in report.sorted_by_amount() {
        lines.push(format!(
            "- {}: {} {}",
            service.service, service.amount, service.unit
        ));
    }

    lines.join("\n")
}

pub fn compose_subject(prefix: &str, report: &CostReport) -> String {
    format!("{} {} to {}", prefix.trim(), report.start, report.end)
}

/// Full plain-text email body. The summary section is left out when
/// `summary` is blank.
pub fn compose_text_body(summary: &str, raw_block: &str) -> String {
    let mut body = format!("{}\n\n", REPORT_TITLE);

    let summary = summary.trim();
    if !summary.is_empty() {
        body.push_str(SUMMARY_HEADING);
        body.push('\n');
        body.push_str(summary);
        body.push_str("\n\n");
    }

    body.push_str(RULE);
    body.push('\n');
    body.push_str(RAW_DATA_HEADING);
    body.push('\n');
    body.push_str(RULE);
    body.push('\n');
    body.push_str(raw_block);
    body.push('\n');
    body
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const HTML_STYLE: &str = "body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; color: #1f2933; margin: 0; padding: 24px; background: #f5f7fa; }
.container { max-width: 720px; margin: 0 auto; background: #ffffff; border-radius: 8px; padding: 24px 32px; }
h1 { font-size: 22px; margin-top: 0; }
h2 { font-size: 16px; border-bottom: 1px solid #e4e7eb; padding-bottom: 4px; }
.summary { line-height: 1.5; }
pre.raw { background: #f0f4f8; padding: 12px 16px; border-radius: 4px; font-size: 13px; white-space: pre-wrap; }";

/// Wraps an agent-supplied HTML fragment and the escaped raw block into a
/// complete document. The fragment is embedded as-is; the raw block is
/// always escaped.
pub fn render_html_document(fragment: &str, raw_block: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", REPORT_TITLE));
    html.push_str(&format!("<style>\n{}\n</style>\n", HTML_STYLE));
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", REPORT_TITLE));

    let fragment = fragment.trim();
    if !fragment.is_empty() {
        html.push_str("<div class=\"summary\">\n");
        html.push_str(fragment);
        html.push_str("\n</div>\n");
    }

    html.push_str(&format!("<h2>{}</h2>\n", RAW_DATA_HEADING));
    html.push_str("<pre class=\"raw\">");
    html.push_str(&escape_html(raw_block));
    html.push_str("</pre>\n</div>\n</body>\n</html>\n");
    html
}
