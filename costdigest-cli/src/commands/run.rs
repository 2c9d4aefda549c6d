use std::sync::Arc;

use colored::Colorize;
use costdigest_core::{
    build_transport, load_sdk_config, AgentRuntime, BedrockAgentRuntime, ConsoleTransport,
    CostDigestConfig, CostDigestError, CostExplorerSource, InvocationResult, MailTransport,
    ReportJob,
};
use tracing::debug;

pub async fn cmd_run(config: CostDigestConfig, dry_run: bool) -> anyhow::Result<()> {
    config.validate().map_err(CostDigestError::from)?;

    let sdk_config = load_sdk_config(config.region()).await;
    debug!(
        region = ?sdk_config.region(),
        dry_run,
        summary = config.agent.enabled,
        "Loaded AWS configuration"
    );

    let billing = Arc::new(CostExplorerSource::new(&sdk_config));
    let agent: Option<Arc<dyn AgentRuntime>> = if config.agent.enabled {
        Some(Arc::new(BedrockAgentRuntime::new(&sdk_config)))
    } else {
        None
    };
    let transport: Arc<dyn MailTransport> = if dry_run {
        Arc::new(ConsoleTransport::stdout())
    } else {
        build_transport(&config, &sdk_config)?
    };

    let mut job = ReportJob::new(config, billing, agent, transport);
    let result = job.run().await?;

    if let Some(json) = result_json(&result, dry_run)? {
        println!("{}", json);
    }

    if dry_run {
        eprintln!(
            "{} {}",
            "✓".green().bold(),
            "Dry run complete, no email was sent.".green()
        );
    } else {
        eprintln!("{} {}", "✓".green().bold(), "Cost report email sent.".green());
    }

    Ok(())
}

/// A dry run has already printed the email to stdout and sent nothing, so it
/// gets no delivery result.
fn result_json(result: &InvocationResult, dry_run: bool) -> anyhow::Result<Option<String>> {
    if dry_run {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string_pretty(result)?))
}
