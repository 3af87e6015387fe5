pub mod config;
pub mod error;

pub use config::{GatewayConfig, HttpConfig, StorageBackend, DEFAULT_MAX_BODY_BYTES};
pub use error::GatewayError;
