//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use runmedic_types::config_defaults;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Enable request logging.
    pub request_logging: bool,

    /// Maximum request body size in bytes. Larger bodies are rejected
    /// with 413 before any handler runs.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::new(
                IpAddr::V4(Ipv4Addr::LOCALHOST),
                config_defaults::DEFAULT_PORT,
            ),
            request_logging: true,
            max_body_size: config_defaults::MAX_BODY_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set the maximum request body size.
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.port(), config_defaults::DEFAULT_PORT);
        assert!(config.bind_address.ip().is_loopback());
        assert!(config.request_logging);
        assert_eq!(config.max_body_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::new()
            .with_bind_address("0.0.0.0:9000".parse().unwrap())
            .with_request_logging(false)
            .with_max_body_size(1024);

        assert_eq!(config.bind_address.port(), 9000);
        assert!(!config.request_logging);
        assert_eq!(config.max_body_size, 1024);
    }
}
