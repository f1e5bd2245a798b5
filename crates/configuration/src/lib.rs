//! # Meridian Configuration
//!
//! Strongly-typed application settings loaded from `config.toml`.

pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{Analysis, Config, WindowDefaults};

/// Loads the application configuration from the `config.toml` file.
///
/// Callers that can run without a config file should fall back to
/// `Config::default()` on error; the defaults match the shipped file.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config.toml"))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;

    Ok(config)
}
