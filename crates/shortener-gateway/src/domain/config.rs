//! Gateway configuration with validation.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::GatewayError;

/// API Gateway payload ceiling for proxy integrations (6 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

/// Main gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Where offloaded payloads go
    pub storage_backend: StorageBackend,
    /// Also write CloudWatch EMF lines to stdout
    pub emf_metrics: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            storage_backend: StorageBackend::default(),
            emf_metrics: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend {other:?} (expected s3 or memory)")),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SHORTENER_HTTP_HOST`: Bind address (default: 0.0.0.0)
    /// - `SHORTENER_HTTP_PORT`: Bind port (default: 8080)
    /// - `SHORTENER_MAX_BODY_BYTES`: Request body limit (default: 6 MiB)
    /// - `SHORTENER_STORAGE_BACKEND`: `s3` or `memory` (default: s3)
    /// - `SHORTENER_EMF_METRICS`: Write EMF metric lines (default: false)
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            http: HttpConfig {
                host: parse_or(lookup("SHORTENER_HTTP_HOST"), "SHORTENER_HTTP_HOST", defaults.http.host)?,
                port: parse_or(lookup("SHORTENER_HTTP_PORT"), "SHORTENER_HTTP_PORT", defaults.http.port)?,
                max_body_bytes: parse_or(
                    lookup("SHORTENER_MAX_BODY_BYTES"),
                    "SHORTENER_MAX_BODY_BYTES",
                    defaults.http.max_body_bytes,
                )?,
            },
            storage_backend: parse_or(
                lookup("SHORTENER_STORAGE_BACKEND"),
                "SHORTENER_STORAGE_BACKEND",
                defaults.storage_backend,
            )?,
            emf_metrics: lookup("SHORTENER_EMF_METRICS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.emf_metrics),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.http.max_body_bytes == 0 {
            return Err(GatewayError::Config(
                "max_body_bytes cannot be 0".into(),
            ));
        }
        Ok(())
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> Result<T, GatewayError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| GatewayError::Config(format!("invalid {name} {value:?}: {e}"))),
    }
}
