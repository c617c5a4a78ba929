#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Generic(String),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("Input error: {0}")]
    InputError(#[from] bifrost_common::error::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] bifrost_config::error::Error),
}
