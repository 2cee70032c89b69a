//! Warden Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer: the reqwest-backed transport and auth gateway,
//! file-backed key-value storage, the system clock, and environment
//! configuration.

pub mod adapters;
pub mod config;
pub mod http;
pub mod persistence;

pub use adapters::{SystemClock, TracingNavigator};
pub use config::{ApiConfig, ConfigError};
pub use http::{HttpAuthGateway, ReqwestTransport};
pub use persistence::{FileStorage, StorageError};
