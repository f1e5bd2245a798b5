use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load or parse configuration: {0}")]
    Load(#[from] config::ConfigError),
}
