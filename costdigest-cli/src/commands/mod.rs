pub mod config;
pub mod preview;
pub mod run;

pub use config::{handle_config_command, ConfigCommand};
pub use preview::cmd_preview;
pub use run::cmd_run;
