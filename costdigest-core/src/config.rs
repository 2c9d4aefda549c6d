use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CostDigestConfig {
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Body variant of the outgoing email. Also selects the prompt wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    #[default]
    Text,
    Html,
}

impl fmt::Display for BodyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyFormat::Text => write!(f, "text"),
            BodyFormat::Html => write!(f, "html"),
        }
    }
}

impl FromStr for BodyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Ok(BodyFormat::Text),
            "html" => Ok(BodyFormat::Html),
            other => Err(format!("unknown body format '{}' (expected text or html)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Ses,
    Smtp,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Ses => write!(f, "ses"),
            TransportKind::Smtp => write!(f, "smtp"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub to: String,

    #[serde(default)]
    pub from: String,

    #[serde(default)]
    pub format: BodyFormat,

    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    #[serde(default)]
    pub transport: TransportKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub agent_id: String,

    #[serde(default)]
    pub alias_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default = "default_metric")]
    pub metric: String,

    #[serde(default = "default_group_by")]
    pub group_by: String,

    #[serde(default = "default_currency")]
    pub fallback_currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AwsConfig {
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

fn default_true() -> bool {
    true
}

fn default_subject_prefix() -> String {
    "AWS Cost Report".to_string()
}

fn default_metric() -> String {
    "UnblendedCost".to_string()
}

fn default_group_by() -> String {
    "SERVICE".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            to: String::new(),
            from: String::new(),
            format: BodyFormat::default(),
            subject_prefix: default_subject_prefix(),
            transport: TransportKind::default(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            agent_id: String::new(),
            alias_id: String::new(),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            metric: default_metric(),
            group_by: default_group_by(),
            fallback_currency: default_currency(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            username: None,
            password: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl CostDigestConfig {
    /// Load from `.env` files, config files, `COSTDIGEST_*` variables and the
    /// job's well-known variables, in that order. Does not validate.
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("COSTDIGEST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: CostDigestConfig = builder.build()?.try_deserialize()?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Overlay the flat variable names the job has always been configured
    /// with. Empty values count as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(to) = get("COST_EMAIL_TO") {
            self.email.to = to;
        }
        if let Some(from) = get("COST_EMAIL_FROM") {
            self.email.from = from;
        }
        if let Some(format) = get("COST_EMAIL_FORMAT") {
            self.email.format =
                format
                    .parse()
                    .map_err(|message| ConfigLoadError::InvalidValue {
                        key: "COST_EMAIL_FORMAT".to_string(),
                        message,
                    })?;
        }
        if let Some(prefix) = get("COST_EMAIL_SUBJECT_PREFIX") {
            self.email.subject_prefix = prefix;
        }

        if let Some(agent_id) = get("BEDROCK_AGENT_ID") {
            self.agent.agent_id = agent_id;
        }
        if let Some(alias_id) = get("BEDROCK_AGENT_ALIAS_ID") {
            self.agent.alias_id = alias_id;
        }
        if let Some(enabled) = get("COSTDIGEST_SUMMARY_ENABLED") {
            self.agent.enabled = parse_bool(&enabled).ok_or_else(|| {
                ConfigLoadError::InvalidValue {
                    key: "COSTDIGEST_SUMMARY_ENABLED".to_string(),
                    message: format!("'{}' is not a boolean", enabled),
                }
            })?;
        }

        if let Some(region) = get("COSTDIGEST_REGION").or_else(|| get("AWS_REGION")) {
            self.aws.region = Some(region);
        }

        if let Some(level) = get("COSTDIGEST_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Check every required field and value constraint. Runs before any
    /// client is touched.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.email.to.trim().is_empty() {
            return Err(ConfigLoadError::MissingRequired(
                "email.to (COST_EMAIL_TO)".to_string(),
            ));
        }
        if self.email.from.trim().is_empty() {
            return Err(ConfigLoadError::MissingRequired(
                "email.from (COST_EMAIL_FROM)".to_string(),
            ));
        }

        for (key, address) in [("email.to", &self.email.to), ("email.from", &self.email.from)] {
            if !address.contains('@') {
                return Err(ConfigLoadError::InvalidValue {
                    key: key.to_string(),
                    message: format!("'{}' is not an email address", address),
                });
            }
        }

        self.validate_agent()?;

        if self.billing.metric.trim().is_empty() {
            return Err(ConfigLoadError::InvalidValue {
                key: "billing.metric".to_string(),
                message: "Must not be empty".to_string(),
            });
        }
        if self.billing.group_by.trim().is_empty() {
            return Err(ConfigLoadError::InvalidValue {
                key: "billing.group_by".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        let currency = &self.billing.fallback_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigLoadError::InvalidValue {
                key: "billing.fallback_currency".to_string(),
                message: format!("'{}' is not a three-letter currency code", currency),
            });
        }

        if self.email.transport == TransportKind::Smtp {
            if !cfg!(feature = "smtp") {
                return Err(ConfigLoadError::InvalidValue {
                    key: "email.transport".to_string(),
                    message: "smtp transport requires building with the 'smtp' feature"
                        .to_string(),
                });
            }
            if self.smtp.host.trim().is_empty() {
                return Err(ConfigLoadError::MissingRequired("smtp.host".to_string()));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    /// Agent ids are only required while summarization is enabled.
    pub fn validate_agent(&self) -> Result<(), ConfigLoadError> {
        if !self.agent.enabled {
            return Ok(());
        }
        if self.agent.agent_id.trim().is_empty() {
            return Err(ConfigLoadError::MissingRequired(
                "agent.agent_id (BEDROCK_AGENT_ID)".to_string(),
            ));
        }
        if self.agent.alias_id.trim().is_empty() {
            return Err(ConfigLoadError::MissingRequired(
                "agent.alias_id (BEDROCK_AGENT_ALIAS_ID)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    pub fn region(&self) -> Option<&str> {
        self.aws.region.as_deref()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("costdigest.toml"));
        paths.push(cwd.join("config").join("local.toml"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    for path in get_dotenv_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".costdigest").join(".env"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("costdigest"))
}
