//! Shortener configuration and validation
//!
//! # Environment Variables
//!
//! - `AWS_REGION`: Storage region (optional, SDK default chain otherwise)
//! - `ENVIRONMENT`: Deployment stage attached to metrics (default: dev)
//! - `SHORTENER_BUCKET_NAME` or `BUCKET_NAME`: Offload bucket (required)
//! - `URL_EXP_TIME`: Retrieval URL lifetime in seconds (default: 3600)
//! - `SHORTENER_CONTENT_TYPE`: Content type of stored objects (default: application/json)
//! - `SHORTENER_MAX_PAYLOAD_BYTES`: Bus entry ceiling (default: 256000)
//! - `SHORTENER_SAFETY_MARGIN_BYTES`: Headroom under the ceiling (default: 50)
//! - `SHORTENER_METRICS_NAMESPACE`: Metrics namespace (default: EventBridgeShortener)
//! - `SHORTENER_SERVICE_NAME`: Service dimension on metrics (default: eventbridge-shortener)

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::policy::OverflowPolicy;
use crate::error::ConfigError;

/// Longest lifetime a presigned URL may have (7 days)
pub const MAX_URL_EXPIRATION_SECS: u64 = 604_800;

pub const DEFAULT_URL_EXPIRATION_SECS: u64 = 3_600;
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_METRICS_NAMESPACE: &str = "EventBridgeShortener";
pub const DEFAULT_SERVICE_NAME: &str = "eventbridge-shortener";
pub const DEFAULT_ENVIRONMENT: &str = "dev";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortenerConfig {
    /// Storage region; `None` defers to the SDK provider chain
    pub region: Option<String>,
    /// Deployment stage
    pub environment: String,
    /// Bucket receiving offloaded payloads
    pub bucket_name: String,
    /// Retrieval URL lifetime in seconds
    pub url_expiration_secs: u64,
    /// Content type recorded on stored objects
    pub content_type: String,
    pub policy: OverflowPolicy,
    pub metrics_namespace: String,
    pub service_name: String,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            region: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            bucket_name: String::new(),
            url_expiration_secs: DEFAULT_URL_EXPIRATION_SECS,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            policy: OverflowPolicy::default(),
            metrics_namespace: DEFAULT_METRICS_NAMESPACE.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl ShortenerConfig {
    /// Default configuration writing to `bucket_name`
    pub fn for_bucket(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            ..Self::default()
        }
    }

    /// Reads the process environment and validates the result.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bucket_name = non_empty("SHORTENER_BUCKET_NAME")
            .or_else(|| non_empty("BUCKET_NAME"))
            .ok_or(ConfigError::Missing("SHORTENER_BUCKET_NAME"))?;

        let config = Self {
            region: non_empty("AWS_REGION"),
            environment: non_empty("ENVIRONMENT").unwrap_or(defaults.environment),
            bucket_name,
            url_expiration_secs: parse_or(
                non_empty("URL_EXP_TIME"),
                "URL_EXP_TIME",
                defaults.url_expiration_secs,
            )?,
            content_type: non_empty("SHORTENER_CONTENT_TYPE").unwrap_or(defaults.content_type),
            policy: OverflowPolicy::new(
                parse_or(
                    non_empty("SHORTENER_MAX_PAYLOAD_BYTES"),
                    "SHORTENER_MAX_PAYLOAD_BYTES",
                    defaults.policy.max_payload_bytes,
                )?,
                parse_or(
                    non_empty("SHORTENER_SAFETY_MARGIN_BYTES"),
                    "SHORTENER_SAFETY_MARGIN_BYTES",
                    defaults.policy.safety_margin,
                )?,
            ),
            metrics_namespace: non_empty("SHORTENER_METRICS_NAMESPACE")
                .unwrap_or(defaults.metrics_namespace),
            service_name: non_empty("SHORTENER_SERVICE_NAME").unwrap_or(defaults.service_name),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_name.trim().is_empty() {
            return Err(ConfigError::Missing("SHORTENER_BUCKET_NAME"));
        }

        if self.url_expiration_secs == 0 || self.url_expiration_secs > MAX_URL_EXPIRATION_SECS {
            return Err(ConfigError::Invalid {
                name: "URL_EXP_TIME",
                reason: format!(
                    "{} is outside 1..={}",
                    self.url_expiration_secs, MAX_URL_EXPIRATION_SECS
                ),
            });
        }

        if self.policy.threshold() == 0 {
            return Err(ConfigError::Invalid {
                name: "SHORTENER_SAFETY_MARGIN_BYTES",
                reason: format!(
                    "margin {} leaves no room under {}",
                    self.policy.safety_margin, self.policy.max_payload_bytes
                ),
            });
        }

        if self.content_type.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: "SHORTENER_CONTENT_TYPE",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn url_expiration(&self) -> Duration {
        Duration::from_secs(self.url_expiration_secs)
    }

    /// Builder-style method to set the retrieval URL lifetime
    pub fn with_url_expiration_secs(mut self, secs: u64) -> Self {
        self.url_expiration_secs = secs;
        self
    }

    /// Builder-style method to set the overflow policy
    pub fn with_policy(mut self, policy: OverflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder-style method to set the deployment stage
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::Invalid {
                name,
                reason: format!("{value:?}: {e}"),
            }),
    }
}
