//! Implementation of [`NowPlayingExt`](crate::NowPlayingExt) for
//! `knobserver::Server`

use crate::api::{ApiDoc, create_router};
use crate::knobserver_ext::{NowPlayingExt, NowPlayingState};
use crate::Webapp;
use anyhow::Result;
use knobicecast::IcecastConfigExt;
use knobserver::Server;
use knobstatus::StatusAggregator;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

impl NowPlayingExt for Server {
    async fn init_now_playing(&mut self) -> Result<Arc<NowPlayingState>> {
        info!("Initializing now-playing service...");

        let config = knobconfig::get_config();
        let aggregator = StatusAggregator::from_config(&config)?;

        self.init_now_playing_with_aggregator(Arc::new(aggregator))
            .await
    }

    async fn init_now_playing_with_aggregator(
        &mut self,
        aggregator: Arc<StatusAggregator>,
    ) -> Result<Arc<NowPlayingState>> {
        let config = knobconfig::get_config();
        let public_stream_url = config.get_icecast_public_url()?;

        let state = NowPlayingState::new(aggregator, public_stream_url);

        self.add_openapi(create_router(state.clone()), ApiDoc::openapi(), "nowplaying")
            .await;
        // Historical top-level path, kept because the original dashboard
        // clients poll it directly
        self.add_handler_with_state("/api/now-playing", crate::api::get_now_playing, state.clone())
            .await;
        self.add_spa::<Webapp>("/dashboard").await;

        info!("Now-playing API available at /api/nowplaying/*");
        info!("Dashboard available at /dashboard");

        Ok(Arc::new(state))
    }
}
