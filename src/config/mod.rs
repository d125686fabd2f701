//! Configuration management

pub mod settings;

pub use settings::{ProxyConfig, ServerConfig, ServiceRoute, Settings};
