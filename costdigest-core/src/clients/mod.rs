pub mod bedrock_agent;
pub mod console;
pub mod cost_explorer;
pub mod ses;
#[cfg(feature = "smtp")]
pub mod smtp;
pub mod traits;

pub use bedrock_agent::BedrockAgentRuntime;
pub use console::ConsoleTransport;
pub use cost_explorer::CostExplorerSource;
pub use ses::SesTransport;
#[cfg(feature = "smtp")]
pub use smtp::SmtpTransport;
pub use traits::{
    AgentInvocation, AgentRuntime, BillingQuery, BillingSource, BufferedCompletion,
    CompletionStream, CostGroup, DeliveryReceipt, MailTransport,
};

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};

use crate::config::{CostDigestConfig, TransportKind};
use crate::error::CostDigestResult;

/// Shared AWS configuration for all clients. Credentials come from the
/// default provider chain; `region` overrides the chain's region when set.
pub async fn load_sdk_config(region: Option<&str>) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}

/// Mail transport selected by `email.transport`.
pub fn build_transport(
    config: &CostDigestConfig,
    sdk_config: &aws_config::SdkConfig,
) -> CostDigestResult<Arc<dyn MailTransport>> {
    match config.email.transport {
        TransportKind::Ses => Ok(Arc::new(SesTransport::new(sdk_config))),
        #[cfg(feature = "smtp")]
        TransportKind::Smtp => Ok(Arc::new(SmtpTransport::new(&config.smtp)?)),
        #[cfg(not(feature = "smtp"))]
        TransportKind::Smtp => Err(crate::error::CostDigestError::InvalidConfigValue {
            key: "email.transport".to_string(),
            message: "smtp support is not compiled in (enable the `smtp` feature)".to_string(),
        }),
    }
}
