//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const HOST_VAR: &str = "KVTTL_HOST";
pub const PORT_VAR: &str = "KVTTL_PORT";
pub const SWEEP_INTERVAL_VAR: &str = "KVTTL_SWEEP_INTERVAL";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub sweep_interval: Duration,
}

impl ServerConfig {
    /// Reads `KVTTL_HOST`, `KVTTL_PORT` and `KVTTL_SWEEP_INTERVAL` (seconds).
    /// Unset variables fall back to `127.0.0.1:3000` and a 60 second sweep.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_VAR) {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: PORT_VAR,
                value,
                reason: "expected a port number",
            })?,
            None => DEFAULT_PORT,
        };

        let bind_address = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                var: HOST_VAR,
                value: host,
                reason: "expected an IP address",
            })?;

        let sweep_secs = match lookup(SWEEP_INTERVAL_VAR) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: SWEEP_INTERVAL_VAR,
                        value,
                        reason: "expected a positive number of seconds",
                    })
                }
            },
            None => DEFAULT_SWEEP_INTERVAL_SECS,
        };

        Ok(Self {
            bind_address,
            sweep_interval: Duration::from_secs(sweep_secs),
        })
    }
}
