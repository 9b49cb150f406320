//! Server configuration from environment variables.

use std::net::SocketAddr;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn from_env_default_bind_addr() {
        let _lock = ENV_LOCK.lock().unwrap();
        std::env::remove_var("BIND_ADDR");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse().unwrap());
    }

    #[test]
    fn from_env_invalid_bind_addr() {
        let _lock = ENV_LOCK.lock().unwrap();
        std::env::set_var("BIND_ADDR", "localhost");

        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));

        std::env::remove_var("BIND_ADDR");
    }
}
