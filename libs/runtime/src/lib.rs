//! Process-level plumbing shared by tablekit binaries: layered configuration
//! (defaults, YAML, `TABLEKIT__*` environment) and logging initialisation.

pub mod config;
pub mod logging;

pub use config::{default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section};
pub use logging::init_logging_from_config;
