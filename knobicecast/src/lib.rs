//! # knobicecast - Icecast status client
//!
//! Client for the Icecast `status-json.xsl` endpoint used by the KNOB Radio
//! status aggregator. It exposes the per-mount listener and metadata fields
//! the dashboard needs (artist, title, listeners, peak, bitrate, sample
//! rate, stream start).
//!
//! Icecast's JSON is irregular: the `source` field is an object when a
//! single mount is live, an array when several are, and absent when none
//! are connected. The models in this crate normalize all three shapes to a
//! `Vec<SourceStats>`.
//!
//! # Example
//!
//! ```no_run
//! use knobicecast::IcecastClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = IcecastClient::builder()
//!         .status_url("http://localhost:8000/status-json.xsl")
//!         .build()?;
//!
//!     let stats = client.fetch_status().await?;
//!     for source in &stats.source {
//!         println!("{:?} - {:?} ({} listeners)",
//!             source.artist, source.title,
//!             source.listeners.unwrap_or(0));
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;

#[cfg(feature = "knobconfig")]
pub mod config_ext;

pub use client::{IcecastClient, IcecastClientBuilder};
pub use error::{Error, Result};
pub use models::{IceStats, SourceStats, StatusRoot};

#[cfg(feature = "knobconfig")]
pub use config_ext::IcecastConfigExt;
