//! # knobweb - dashboard and REST API
//!
//! Ties the status aggregator to HTTP: a JSON API under
//! `/api/nowplaying/*` (documented with Swagger UI) and an embedded
//! single-page dashboard under `/dashboard`.
//!
//! The dashboard polls `now-playing` every couple of seconds; the
//! aggregator's cache keeps that polling off the upstreams. When Icecast
//! or Liquidsoap is down the page shows placeholders instead of erroring.

pub mod api;
pub mod knobserver_ext;
mod knobserver_impl;

pub use api::{ApiDoc, DjInfo, ScheduleEntry, SetStationRequest, SetStationResponse, StreamInfo};
pub use knobserver_ext::{NowPlayingExt, NowPlayingState};

use rust_embed::RustEmbed;

/// Bundled dashboard assets, served from the binary
#[derive(RustEmbed, Clone)]
#[folder = "webapp"]
pub struct Webapp;
