//! Configuration extension for the schedule and the status cache

use crate::schedule::{Schedule, ScheduleSlot};
use anyhow::Result;
use knobconfig::Config;
use serde_yaml::{Number, Value};

/// Default TTL of the merged now-playing snapshot (milliseconds)
///
/// Sits under the dashboard's 2.5 s polling interval so browsers share
/// one upstream round trip per interval.
pub const DEFAULT_CACHE_TTL_MS: u64 = 1500;

/// Extension trait adding schedule and cache settings to `knobconfig::Config`
pub trait ScheduleConfigExt {
    /// The configured broadcast schedule
    ///
    /// Falls back to (and persists) the stock schedule when the key is
    /// missing or malformed.
    fn get_schedule(&self) -> Result<Schedule>;
    fn set_schedule(&self, schedule: &Schedule) -> Result<()>;

    /// TTL of the merged snapshot cache, in milliseconds
    fn get_status_cache_ttl_ms(&self) -> Result<u64>;
    fn set_status_cache_ttl_ms(&self, ms: u64) -> Result<()>;
}

impl ScheduleConfigExt for Config {
    fn get_schedule(&self) -> Result<Schedule> {
        match self.get_value(&["schedule"]) {
            Ok(value @ Value::Sequence(_)) => {
                match serde_yaml::from_value::<Vec<ScheduleSlot>>(value) {
                    Ok(slots) if !slots.is_empty() => Ok(Schedule::new(slots)),
                    Ok(_) => {
                        tracing::warn!("Configured schedule is empty, using stock schedule");
                        Ok(Schedule::stock())
                    }
                    Err(err) => {
                        tracing::warn!("Malformed schedule in config ({}), using stock", err);
                        Ok(Schedule::stock())
                    }
                }
            }
            _ => {
                let stock = Schedule::stock();
                self.set_schedule(&stock)?;
                Ok(stock)
            }
        }
    }

    fn set_schedule(&self, schedule: &Schedule) -> Result<()> {
        let value = serde_yaml::to_value(schedule.slots())?;
        self.set_value(&["schedule"], value)
    }

    fn get_status_cache_ttl_ms(&self) -> Result<u64> {
        match self.get_value(&["status", "cache_ttl_ms"]) {
            Ok(Value::Number(n)) => {
                if let Some(ms) = n.as_u64() {
                    Ok(ms)
                } else {
                    self.set_status_cache_ttl_ms(DEFAULT_CACHE_TTL_MS)?;
                    Ok(DEFAULT_CACHE_TTL_MS)
                }
            }
            _ => {
                self.set_status_cache_ttl_ms(DEFAULT_CACHE_TTL_MS)?;
                Ok(DEFAULT_CACHE_TTL_MS)
            }
        }
    }

    fn set_status_cache_ttl_ms(&self, ms: u64) -> Result<()> {
        self.set_value(&["status", "cache_ttl_ms"], Value::Number(Number::from(ms)))
    }
}
