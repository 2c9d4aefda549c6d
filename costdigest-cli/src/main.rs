use clap::{Parser, Subcommand};
use colored::Colorize;
use costdigest_core::{
    CliErrorDisplay, ConfigLoadError, CostDigestConfig, CostDigestError, LoggingConfig,
};
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod commands;

use commands::{cmd_preview, cmd_run, handle_config_command, ConfigCommand};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "costdigest")]
#[command(author = "Rohit Ghumare <ghumare64@gmail.com>")]
#[command(version = VERSION)]
#[command(about = "costdigest - Month-to-date AWS cost report with an AI summary, sent by email")]
#[command(long_about = r#"
costdigest queries AWS Cost Explorer for month-to-date unblended cost grouped
by service, asks a Bedrock agent for a narrative summary, and emails the
summary together with the raw numbers through Amazon SES.

Set COST_EMAIL_TO, COST_EMAIL_FROM, BEDROCK_AGENT_ID and BEDROCK_AGENT_ALIAS_ID,
then use 'costdigest config check' to verify and 'costdigest run' to send.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the cost report job once")]
    Run {
        #[arg(long, help = "Print the email to stdout instead of sending it")]
        dry_run: bool,
    },

    #[command(about = "Fetch and print the month-to-date report without sending email")]
    Preview {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, table, json)"
        )]
        format: String,

        #[arg(long, help = "Skip the AI summary")]
        no_summary: bool,
    },

    #[command(about = "Inspect and validate configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommand>,
    },

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = CostDigestConfig::load();
    init_logging(cli.verbose, config.as_ref().ok().map(|c| &c.logging));

    match run(cli, config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CostDigestError>() {
                Some(err) => eprint!("{}: {}", "Error".red().bold(), CliErrorDisplay::new(err)),
                None => eprintln!("{}: {}", "Error".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` means debug, and without it the
/// configured level applies (warn if config could not be loaded).
fn init_logging(verbose: bool, logging: Option<&LoggingConfig>) {
    let fallback = if verbose {
        "debug"
    } else {
        logging.map(|l| l.level.as_str()).unwrap_or("warn")
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let json = logging.map(|l| l.json_format).unwrap_or(false);
    let layer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
}

async fn run(cli: Cli, config: Result<CostDigestConfig, ConfigLoadError>) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run { dry_run } => cmd_run(loaded(config)?, dry_run).await,
        Commands::Preview { format, no_summary } => {
            cmd_preview(loaded(config)?, &format, no_summary).await
        }
        Commands::Config { action } => handle_config_command(loaded(config)?, action).await,
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

fn loaded(config: Result<CostDigestConfig, ConfigLoadError>) -> anyhow::Result<CostDigestConfig> {
    config.map_err(|e| CostDigestError::from(e).into())
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "costdigest Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!(
            "  {:<15} https://github.com/rohitg00/costdigest",
            "Repository:".bold()
        );
        println!();
        println!("  {}", "AWS Services:".bold());
        println!("    Cost Explorer       (GetCostAndUsage)");
        println!("    Bedrock Agents      (InvokeAgent)");
        println!("    Simple Email Service (SendEmail)");
        println!();
        println!("  {}", "Features:".bold());
        if cfg!(feature = "smtp") {
            println!("    smtp:         enabled");
        } else {
            println!("    smtp:         disabled");
        }
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("costdigest {}", VERSION);
    }

    Ok(())
}
