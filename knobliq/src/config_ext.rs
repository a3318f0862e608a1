//! Configuration extension for the Liquidsoap client

use anyhow::Result;
use knobconfig::Config;
use serde_yaml::{Number, Value};

use crate::client::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_MS};

/// Extension trait adding Liquidsoap settings to `knobconfig::Config`
///
/// Getters persist their defaults on first access, like the other config
/// extensions.
pub trait LiquidsoapConfigExt {
    /// Telnet host
    fn get_liquidsoap_host(&self) -> Result<String>;
    fn set_liquidsoap_host(&self, host: &str) -> Result<()>;

    /// Telnet port
    fn get_liquidsoap_port(&self) -> Result<u16>;
    fn set_liquidsoap_port(&self, port: u16) -> Result<()>;

    /// Exchange deadline in milliseconds
    fn get_liquidsoap_timeout_ms(&self) -> Result<u64>;
    fn set_liquidsoap_timeout_ms(&self, ms: u64) -> Result<()>;
}

impl LiquidsoapConfigExt for Config {
    fn get_liquidsoap_host(&self) -> Result<String> {
        match self.get_value(&["liquidsoap", "host"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => {
                self.set_liquidsoap_host(DEFAULT_HOST)?;
                Ok(DEFAULT_HOST.to_string())
            }
        }
    }

    fn set_liquidsoap_host(&self, host: &str) -> Result<()> {
        self.set_value(&["liquidsoap", "host"], Value::String(host.to_string()))
    }

    fn get_liquidsoap_port(&self) -> Result<u16> {
        match self.get_value(&["liquidsoap", "port"]) {
            Ok(Value::Number(n)) => {
                if let Some(port) = n.as_u64().filter(|p| *p <= u16::MAX as u64) {
                    Ok(port as u16)
                } else {
                    self.set_liquidsoap_port(DEFAULT_PORT)?;
                    Ok(DEFAULT_PORT)
                }
            }
            _ => {
                self.set_liquidsoap_port(DEFAULT_PORT)?;
                Ok(DEFAULT_PORT)
            }
        }
    }

    fn set_liquidsoap_port(&self, port: u16) -> Result<()> {
        self.set_value(&["liquidsoap", "port"], Value::Number(Number::from(port)))
    }

    fn get_liquidsoap_timeout_ms(&self) -> Result<u64> {
        match self.get_value(&["liquidsoap", "timeout_ms"]) {
            Ok(Value::Number(n)) => {
                if let Some(ms) = n.as_u64() {
                    Ok(ms)
                } else {
                    self.set_liquidsoap_timeout_ms(DEFAULT_TIMEOUT_MS)?;
                    Ok(DEFAULT_TIMEOUT_MS)
                }
            }
            _ => {
                self.set_liquidsoap_timeout_ms(DEFAULT_TIMEOUT_MS)?;
                Ok(DEFAULT_TIMEOUT_MS)
            }
        }
    }

    fn set_liquidsoap_timeout_ms(&self, ms: u64) -> Result<()> {
        self.set_value(&["liquidsoap", "timeout_ms"], Value::Number(Number::from(ms)))
    }
}
