//! Server extension for the now-playing dashboard
//!
//! `knobweb` adds its routes to `knobserver::Server` through this trait,
//! so the server crate never depends on the dashboard.

use anyhow::Result;
use knobstatus::StatusAggregator;
use std::sync::Arc;

/// Shared state for the now-playing handlers
#[derive(Clone)]
pub struct NowPlayingState {
    pub aggregator: Arc<StatusAggregator>,
    /// Public stream URL for the listen card
    pub public_stream_url: String,
}

impl NowPlayingState {
    pub fn new(aggregator: Arc<StatusAggregator>, public_stream_url: String) -> Self {
        Self {
            aggregator,
            public_stream_url,
        }
    }
}

/// Extension trait wiring the dashboard into a server
///
/// # Example
///
/// ```rust,no_run
/// use knobserver::ServerBuilder;
/// use knobweb::NowPlayingExt;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut server = ServerBuilder::new_configured().build();
///     server.init_now_playing().await?;
///
///     server.start().await;
///     server.wait().await;
///     Ok(())
/// }
/// ```
pub trait NowPlayingExt {
    /// Builds the aggregator from the global configuration and registers
    /// the API, its Swagger UI and the embedded dashboard
    ///
    /// # Routes registered
    ///
    /// - `GET /api/nowplaying/now-playing` - merged status snapshot
    /// - `GET /api/nowplaying/stations` - switchable stations
    /// - `GET /api/nowplaying/schedule` - configured schedule
    /// - `POST /api/nowplaying/station` - switch the live station
    /// - `GET /api/nowplaying/stream` - public stream URL
    /// - `GET /api/nowplaying/dj` - DJ connection details
    /// - `GET /api/now-playing` - top-level alias for the snapshot
    /// - `/dashboard` - embedded web dashboard
    async fn init_now_playing(&mut self) -> Result<Arc<NowPlayingState>>;

    /// Like `init_now_playing()` but with a caller-provided aggregator,
    /// so tests and the HUD can share one instance
    async fn init_now_playing_with_aggregator(
        &mut self,
        aggregator: Arc<StatusAggregator>,
    ) -> Result<Arc<NowPlayingState>>;
}
