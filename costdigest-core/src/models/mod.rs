mod cost;
mod email;
mod invocation;

pub use cost::{CostReport, ReportPeriod, ServiceCost};
pub use email::{EmailBody, EmailMessage};
pub use invocation::{InvocationResult, PipelineStage};
