use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use costdigest_core::{
    compose_text_body, format_raw_block, load_sdk_config, BedrockAgentRuntime, CostAggregator,
    CostDigestConfig, CostDigestError, CostExplorerSource, CostReport, SummaryRequester,
};

pub async fn cmd_preview(
    config: CostDigestConfig,
    format: &str,
    no_summary: bool,
) -> anyhow::Result<()> {
    if !matches!(format, "text" | "table" | "json") {
        anyhow::bail!("Unknown format '{}'. Expected text, table or json", format);
    }

    let want_summary = !no_summary && config.agent.enabled;
    if want_summary {
        config.validate_agent().map_err(CostDigestError::from)?;
    }

    let sdk_config = load_sdk_config(config.region()).await;

    let aggregator = CostAggregator::new(
        Arc::new(CostExplorerSource::new(&sdk_config)),
        config.billing.clone(),
    );
    let report = aggregator.month_to_date(Utc::now().date_naive()).await?;

    let summary = if want_summary {
        let requester = SummaryRequester::new(
            Arc::new(BedrockAgentRuntime::new(&sdk_config)),
            config.agent.clone(),
            config.email.format,
        );
        requester.summarize(&report).await?
    } else {
        String::new()
    };

    match format {
        "json" => {
            let output = serde_json::json!({
                "report": report,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "table" => print_table(&report, &summary),
        _ => print!("{}", compose_text_body(&summary, &format_raw_block(&report))),
    }

    Ok(())
}

fn print_table(report: &CostReport, summary: &str) {
    println!("{}", "Month-to-date Costs".cyan().bold());
    println!(
        "{}",
        format!("Time range: {} to {}", report.start, report.end).dimmed()
    );
    println!();

    if report.is_empty() {
        println!("{}", "No cost data for this period.".yellow());
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Service").fg(Color::White),
                Cell::new("Amount").fg(Color::White),
                Cell::new("Unit").fg(Color::White),
            ]);

        for service in report.sorted_by_amount() {
            table.add_row(vec![
                Cell::new(&service.service),
                Cell::new(service.amount.to_string()).fg(Color::Yellow),
                Cell::new(&service.unit),
            ]);
        }

        println!("{table}");
        println!();
    }

    println!(
        "  {} {}",
        "Total:".bold(),
        format!("{} {}", report.total_amount, report.currency).yellow()
    );

    if !summary.is_empty() {
        println!();
        println!("  {}", "AI Summary".yellow().bold());
        for line in summary.lines() {
            println!("    {}", line);
        }
    }
}
