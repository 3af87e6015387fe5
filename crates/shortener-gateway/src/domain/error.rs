//! Gateway error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Shortener configuration error: {0}")]
    Shortener(#[from] shortener_core::ConfigError),

    #[error("Storage backend {0} is not compiled in")]
    UnsupportedBackend(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
