use clap::Subcommand;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use costdigest_core::{get_config_paths, CostDigestConfig, CostDigestError};

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Validate configuration and print the resolved settings")]
    Check,

    #[command(about = "List the configuration files that are searched")]
    Paths,
}

pub async fn handle_config_command(
    config: CostDigestConfig,
    cmd: Option<ConfigCommand>,
) -> anyhow::Result<()> {
    match cmd.unwrap_or(ConfigCommand::Check) {
        ConfigCommand::Check => cmd_config_check(&config),
        ConfigCommand::Paths => cmd_config_paths(),
    }
}

fn cmd_config_check(config: &CostDigestConfig) -> anyhow::Result<()> {
    println!("{}", "costdigest Configuration".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::White),
            Cell::new("Value").fg(Color::White),
        ]);

    for (key, value) in resolved_settings(config) {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }

    println!("{table}");
    println!();

    config.validate().map_err(CostDigestError::from)?;

    println!(
        "{} {}",
        "✓".green().bold(),
        "Configuration is valid.".green()
    );
    Ok(())
}

fn cmd_config_paths() -> anyhow::Result<()> {
    println!("{}", "Configuration files (later entries win)".cyan().bold());
    for path in get_config_paths() {
        let marker = if path.exists() {
            "✓".green()
        } else {
            "-".dimmed()
        };
        println!("  {} {}", marker, path.display());
    }
    println!();
    println!(
        "{}",
        "COSTDIGEST_* and COST_EMAIL_* environment variables override files.".dimmed()
    );
    Ok(())
}

fn resolved_settings(config: &CostDigestConfig) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("email.to", or_unset(&config.email.to)),
        ("email.from", or_unset(&config.email.from)),
        ("email.format", config.email.format.to_string()),
        ("email.subject_prefix", config.email.subject_prefix.clone()),
        ("email.transport", config.email.transport.to_string()),
        ("agent.enabled", config.agent.enabled.to_string()),
        ("agent.agent_id", or_unset(&config.agent.agent_id)),
        ("agent.alias_id", or_unset(&config.agent.alias_id)),
        ("billing.metric", config.billing.metric.clone()),
        ("billing.group_by", config.billing.group_by.clone()),
        (
            "billing.fallback_currency",
            config.billing.fallback_currency.clone(),
        ),
        (
            "aws.region",
            config
                .region()
                .map(str::to_string)
                .unwrap_or_else(|| "(default chain)".to_string()),
        ),
        ("logging.level", config.logging.level.clone()),
        ("logging.json_format", config.logging.json_format.to_string()),
    ];

    if !config.smtp.host.is_empty() {
        rows.push(("smtp.host", format!("{}:{}", config.smtp.host, config.smtp.port)));
        rows.push((
            "smtp.password",
            config
                .smtp
                .password
                .as_deref()
                .map(mask_secret)
                .unwrap_or_else(|| "(unset)".to_string()),
        ));
    }

    rows
}

fn or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "(unset)".to_string()
    } else {
        value.to_string()
    }
}

fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    "****".to_string()
}
