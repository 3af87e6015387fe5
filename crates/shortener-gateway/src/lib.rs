//! # Shortener Gateway
//!
//! HTTP front door for the event shortener. Accepts `POST /putevent` with a
//! JSON event body and answers with the shortener's result document.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): `GatewayConfig`, `GatewayError`
//! - **Adapters** (`adapters/`): `PrometheusMetricsSink`
//! - **Service** (`service.rs`): axum router, `GatewayService` lifecycle
//!
//! ## Usage
//!
//! ```rust,ignore
//! let service = GatewayService::build(GatewayConfig::from_env()?, ShortenerConfig::from_env()?).await?;
//! service.run(shutdown_signal()).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod service;

pub use adapters::PrometheusMetricsSink;
pub use domain::{GatewayConfig, GatewayError, HttpConfig, StorageBackend};
pub use service::{build_router, AppState, GatewayService, REQUEST_ID_HEADER};
