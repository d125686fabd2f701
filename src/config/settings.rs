//! Application settings and configuration management

use crate::error::{GatewayError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default = "default_services")]
    pub services: Vec<ServiceRoute>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Proxy timeouts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Deadline for a forwarded request, in seconds
    #[serde(default = "default_forward_timeout")]
    pub forward_timeout_secs: u64,
    /// Deadline for a single health probe, in seconds
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

fn default_forward_timeout() -> u64 {
    30
}

fn default_health_timeout() -> u64 {
    5
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            forward_timeout_secs: default_forward_timeout(),
            health_timeout_secs: default_health_timeout(),
        }
    }
}

/// A single prefix-to-backend routing entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceRoute {
    /// Path prefix owned by the backend, e.g. `/orders`
    pub prefix: String,
    /// Base URL of the backend, e.g. `http://order-service:8080`
    pub url: String,
}

fn default_services() -> Vec<ServiceRoute> {
    [
        ("/users", "http://user-service:8080"),
        ("/auth", "http://auth-service:8080"),
        ("/products", "http://product-service:8080"),
        ("/inventory", "http://inventory-service:8080"),
        ("/orders", "http://order-service:8080"),
        ("/payments", "http://payment-service:8080"),
        ("/notifications", "http://notification-service:8080"),
        ("/reviews", "http://review-service:8080"),
        ("/analytics", "http://analytics-service:8080"),
        ("/logs", "http://log-service:8080"),
    ]
    .into_iter()
    .map(|(prefix, url)| ServiceRoute {
        prefix: prefix.to_string(),
        url: url.to_string(),
    })
    .collect()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            // Load from configuration file
            .add_source(
                File::with_name(path.as_ref().to_str().unwrap_or("config/default"))
                    .required(false),
            )
            // Override with environment variables (prefixed with GATEWAY_)
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(GatewayError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        if self.proxy.forward_timeout_secs == 0 || self.proxy.health_timeout_secs == 0 {
            return Err(GatewayError::Config(config::ConfigError::Message(
                "Proxy timeouts must be non-zero".to_string(),
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for route in &self.services {
            if !route.prefix.starts_with('/') {
                return Err(GatewayError::Config(config::ConfigError::Message(
                    format!("Route prefix '{}' must start with '/'", route.prefix),
                )));
            }
            if route.url.is_empty() {
                return Err(GatewayError::Config(config::ConfigError::Message(
                    format!("Route '{}' must have a backend URL", route.prefix),
                )));
            }
            if !seen.insert(route.prefix.as_str()) {
                return Err(GatewayError::Config(config::ConfigError::Message(
                    format!("Duplicate route prefix '{}'", route.prefix),
                )));
            }
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            proxy: ProxyConfig::default(),
            services: default_services(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.proxy.forward_timeout_secs, 30);
        assert_eq!(settings.proxy.health_timeout_secs, 5);
        assert_eq!(settings.services.len(), 10);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"
[server]
port = 9000

[proxy]
forward_timeout_secs = 10

[[services]]
prefix = "/orders"
url = "http://order-svc"
"#
        )
        .unwrap();

        let settings = Settings::load_from_path(file.path()).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.proxy.forward_timeout_secs, 10);
        assert_eq!(settings.proxy.health_timeout_secs, 5);
        assert_eq!(settings.services.len(), 1);
        assert_eq!(settings.services[0].prefix, "/orders");
    }

    #[test]
    fn test_validate_rejects_duplicate_prefix() {
        let mut settings = Settings::default();
        settings.services.push(ServiceRoute {
            prefix: "/orders".to_string(),
            url: "http://other:8080".to_string(),
        });
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_prefix() {
        let settings = Settings {
            services: vec![ServiceRoute {
                prefix: "orders".to_string(),
                url: "http://order-svc".to_string(),
            }],
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
