//! Configuration extension for the Icecast client
//!
//! Adds Icecast-specific getters to `knobconfig::Config`. Getters persist
//! their defaults into the configuration on first access so the config
//! file documents every knob after one run.

use anyhow::Result;
use knobconfig::Config;
use serde_yaml::{Number, Value};

use crate::client::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STATUS_URL};

/// Default mount served to listeners
pub const DEFAULT_MOUNT: &str = "/stream.ogg";

/// Default public stream URL shown on the dashboard listen card
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8000/stream.ogg";

/// Extension trait adding Icecast settings to `knobconfig::Config`
pub trait IcecastConfigExt {
    /// URL of the `status-json.xsl` endpoint
    fn get_icecast_status_url(&self) -> Result<String>;
    fn set_icecast_status_url(&self, url: &str) -> Result<()>;

    /// Mount path the aggregator reports on
    fn get_icecast_mount(&self) -> Result<String>;
    fn set_icecast_mount(&self, mount: &str) -> Result<()>;

    /// Public stream URL for the dashboard audio element
    fn get_icecast_public_url(&self) -> Result<String>;
    fn set_icecast_public_url(&self, url: &str) -> Result<()>;

    /// Status request timeout in seconds
    fn get_icecast_timeout_secs(&self) -> Result<u64>;
    fn set_icecast_timeout_secs(&self, secs: u64) -> Result<()>;
}

impl IcecastConfigExt for Config {
    fn get_icecast_status_url(&self) -> Result<String> {
        match self.get_value(&["icecast", "status_url"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => {
                self.set_icecast_status_url(DEFAULT_STATUS_URL)?;
                Ok(DEFAULT_STATUS_URL.to_string())
            }
        }
    }

    fn set_icecast_status_url(&self, url: &str) -> Result<()> {
        self.set_value(&["icecast", "status_url"], Value::String(url.to_string()))
    }

    fn get_icecast_mount(&self) -> Result<String> {
        match self.get_value(&["icecast", "mount"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => {
                self.set_icecast_mount(DEFAULT_MOUNT)?;
                Ok(DEFAULT_MOUNT.to_string())
            }
        }
    }

    fn set_icecast_mount(&self, mount: &str) -> Result<()> {
        self.set_value(&["icecast", "mount"], Value::String(mount.to_string()))
    }

    fn get_icecast_public_url(&self) -> Result<String> {
        match self.get_value(&["icecast", "public_url"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => {
                self.set_icecast_public_url(DEFAULT_PUBLIC_URL)?;
                Ok(DEFAULT_PUBLIC_URL.to_string())
            }
        }
    }

    fn set_icecast_public_url(&self, url: &str) -> Result<()> {
        self.set_value(&["icecast", "public_url"], Value::String(url.to_string()))
    }

    fn get_icecast_timeout_secs(&self) -> Result<u64> {
        match self.get_value(&["icecast", "timeout_secs"]) {
            Ok(Value::Number(n)) => {
                if let Some(secs) = n.as_u64() {
                    Ok(secs)
                } else {
                    self.set_icecast_timeout_secs(DEFAULT_REQUEST_TIMEOUT_SECS)?;
                    Ok(DEFAULT_REQUEST_TIMEOUT_SECS)
                }
            }
            _ => {
                self.set_icecast_timeout_secs(DEFAULT_REQUEST_TIMEOUT_SECS)?;
                Ok(DEFAULT_REQUEST_TIMEOUT_SECS)
            }
        }
    }

    fn set_icecast_timeout_secs(&self, secs: u64) -> Result<()> {
        self.set_value(
            &["icecast", "timeout_secs"],
            Value::Number(Number::from(secs)),
        )
    }
}
