//! # knobliq - Liquidsoap telnet client
//!
//! Client for the Liquidsoap server command interface (the "telnet" port).
//! The appliance's Liquidsoap script registers a small `station.*` command
//! set for switching between broadcast sources; this crate speaks exactly
//! that vocabulary and nothing else:
//!
//! - `station.get` - name of the currently selected station
//! - `station.set <name>` - switch to another station
//! - `help` - list available commands
//! - `list` - list server state
//! - `quit` - close the session
//!
//! Each call opens a fresh TCP connection, writes the command followed by
//! `quit`, reads until the peer closes, and strips the `END` / `Bye!`
//! protocol trailers. Connections are short-lived on purpose: Liquidsoap's
//! server socket is single-threaded and a stuck session would block other
//! operators.
//!
//! # Example
//!
//! ```no_run
//! use knobliq::LiquidsoapClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LiquidsoapClient::builder()
//!         .host("localhost")
//!         .port(1234)
//!         .build();
//!
//!     let station = client.station_get().await?;
//!     println!("On air: {}", station);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod protocol;

#[cfg(feature = "knobconfig")]
pub mod config_ext;

pub use client::{LiquidsoapClient, LiquidsoapClientBuilder};
pub use error::{Error, Result};
pub use protocol::Command;

#[cfg(feature = "knobconfig")]
pub use config_ext::LiquidsoapConfigExt;
