mod error;
mod load;
mod settings;

pub use error::ConfigError;
pub use load::{default_config_path, load_config};
pub use settings::{OrchestratorConfig, ProviderSettings, DEFAULT_PACING_DELAY_MS};
