//! # knobstatus - now-playing aggregation
//!
//! The heart of the KNOB Radio status service. This crate merges three
//! inputs into one `NowPlaying` snapshot:
//!
//! - Icecast's `status-json.xsl` (artist, title, listeners, stream stats)
//! - Liquidsoap's telnet interface (which station is on air)
//! - the locally configured broadcast schedule (what should be on air, and
//!   what comes next)
//!
//! The aggregator degrades instead of failing: when an upstream is down the
//! corresponding fields are absent and a `*_connected` flag goes false, but
//! a snapshot is always produced in bounded time. A short TTL cache keeps
//! dashboard polling from hammering the upstreams.

pub mod aggregator;
pub mod config_ext;
pub mod models;
pub mod schedule;

pub use aggregator::StatusAggregator;
pub use config_ext::ScheduleConfigExt;
pub use models::NowPlaying;
pub use schedule::{format_hour, Schedule, ScheduleSlot, SlotKind};
