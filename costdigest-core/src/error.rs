//! Error types for the costdigest core library.
//!
//! Every failure the job can hit maps onto one [`CostDigestError`] variant with
//! a stable code, so scheduler logs can be grepped and alerted on.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E2001-E2099 | Config | Environment, config file, and validation errors |
//! | E5001-E5099 | Upstream | Billing, agent, and email service errors |
//! | E7001-E7099 | Cost | Amount parsing and report construction errors |
//! | E9001-E9099 | General | Internal, IO, and serialization errors |

use std::fmt;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigLoadError;

/// The main error type for the costdigest core library.
///
/// Upstream errors carry the rendered error of the service client they came
/// from; nothing is retried or swallowed at this layer.
#[derive(Debug, Error)]
pub enum CostDigestError {
    // ========================================================================
    // Configuration Errors (E2001-E2099)
    // ========================================================================
    /// Required setting is absent or empty
    #[error("[E2001] Missing required configuration: {0}")]
    MissingConfig(String),

    /// Setting is present but unusable
    #[error("[E2002] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// Configuration file or environment could not be parsed
    #[error("[E2003] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    // ========================================================================
    // Upstream Service Errors (E5001-E5099)
    // ========================================================================
    /// Billing query was rejected or failed in transport
    #[error("[E5001] Billing query failed: {0}")]
    BillingQueryFailed(String),

    /// Billing response did not have the expected shape
    #[error("[E5002] Unexpected billing response: {0}")]
    BillingResponseInvalid(String),

    /// Agent invocation failed, either on request or mid-stream
    #[error("[E5003] Agent invocation failed: {0}")]
    AgentInvocationFailed(String),

    /// Agent completion could not be decoded
    #[error("[E5004] Unexpected agent response: {0}")]
    AgentResponseInvalid(String),

    /// Email could not be assembled for the transport
    #[error("[E5005] Failed to build email: {0}")]
    EmailBuildFailed(String),

    /// Email transport rejected or failed to deliver the message
    #[error("[E5006] Email delivery via {transport} failed: {message}")]
    EmailSendFailed { transport: String, message: String },

    // ========================================================================
    // Cost Data Errors (E7001-E7099)
    // ========================================================================
    /// Amount string is not a decimal number
    #[error("[E7001] Invalid amount '{value}' for service '{service}'")]
    InvalidAmount { service: String, value: String },

    /// Report period is not a valid date range
    #[error("[E7002] Invalid report period: {0}")]
    InvalidPeriod(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (should not happen in normal operation)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("[E9005] IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("[E9006] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for costdigest operations.
pub type CostDigestResult<T> = Result<T, CostDigestError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<ConfigLoadError> for CostDigestError {
    fn from(err: ConfigLoadError) -> Self {
        match err {
            ConfigLoadError::MissingRequired(key) => CostDigestError::MissingConfig(key),
            ConfigLoadError::InvalidValue { key, message } => {
                CostDigestError::InvalidConfigValue { key, message }
            }
            ConfigLoadError::Config(e) => CostDigestError::from(e),
            ConfigLoadError::Io(e) => CostDigestError::IoError(e.to_string()),
        }
    }
}

impl From<config::ConfigError> for CostDigestError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => CostDigestError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => CostDigestError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => CostDigestError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => CostDigestError::ConfigParseError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CostDigestError {
    fn from(err: serde_json::Error) -> Self {
        CostDigestError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for CostDigestError {
    fn from(err: std::io::Error) -> Self {
        CostDigestError::IoError(err.to_string())
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl CostDigestError {
    pub fn email_send_failed(transport: impl Into<String>, message: impl Into<String>) -> Self {
        CostDigestError::EmailSendFailed {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error is related to configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CostDigestError::MissingConfig(_)
                | CostDigestError::InvalidConfigValue { .. }
                | CostDigestError::ConfigParseError(_)
        )
    }

    /// Returns true if an external service (billing, agent, email) failed.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            CostDigestError::BillingQueryFailed(_)
                | CostDigestError::BillingResponseInvalid(_)
                | CostDigestError::AgentInvocationFailed(_)
                | CostDigestError::AgentResponseInvalid(_)
                | CostDigestError::EmailBuildFailed(_)
                | CostDigestError::EmailSendFailed { .. }
        )
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            CostDigestError::MissingConfig(_) => "E2001",
            CostDigestError::InvalidConfigValue { .. } => "E2002",
            CostDigestError::ConfigParseError(_) => "E2003",
            CostDigestError::BillingQueryFailed(_) => "E5001",
            CostDigestError::BillingResponseInvalid(_) => "E5002",
            CostDigestError::AgentInvocationFailed(_) => "E5003",
            CostDigestError::AgentResponseInvalid(_) => "E5004",
            CostDigestError::EmailBuildFailed(_) => "E5005",
            CostDigestError::EmailSendFailed { .. } => "E5006",
            CostDigestError::InvalidAmount { .. } => "E7001",
            CostDigestError::InvalidPeriod(_) => "E7002",
            CostDigestError::Internal(_) => "E9001",
            CostDigestError::IoError(_) => "E9005",
            CostDigestError::SerializationError(_) => "E9006",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            CostDigestError::MissingConfig(_) => {
                Some("Set COST_EMAIL_TO and COST_EMAIL_FROM (and the Bedrock agent ids) in the environment or a .env file")
            }
            CostDigestError::BillingQueryFailed(_) => {
                Some("Check that the credentials allow ce:GetCostAndUsage and that Cost Explorer is enabled")
            }
            CostDigestError::AgentInvocationFailed(_) => {
                Some("Check BEDROCK_AGENT_ID, BEDROCK_AGENT_ALIAS_ID and the region the agent lives in")
            }
            CostDigestError::EmailSendFailed { .. } => {
                Some("Verify the sender identity in SES and, in the sandbox, the recipient as well")
            }
            _ => None,
        }
    }

    /// Log this error at error level with its code and suggestion.
    pub fn log(&self) {
        error!(
            error_code = %self.error_code(),
            suggestion = self.user_suggestion(),
            "Error occurred: {}",
            self
        );
    }
}

// ============================================================================
// CLI error display
// ============================================================================

/// Format an error for CLI display with an optional suggestion line.
pub struct CliErrorDisplay<'a> {
    error: &'a CostDigestError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a CostDigestError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                writeln!(f)?;
                writeln!(f, "  Suggestion: {}", suggestion)?;
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
