//! Merged now-playing snapshots with TTL caching

use crate::config_ext::ScheduleConfigExt;
use crate::models::NowPlaying;
use crate::schedule::Schedule;
use anyhow::Result;
use chrono::{Local, Timelike};
use knobconfig::Config;
use knobicecast::{IcecastClient, IcecastConfigExt, SourceStats};
use knobliq::{LiquidsoapClient, LiquidsoapConfigExt};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::warn;

/// Cached merged snapshot
#[derive(Debug, Clone)]
struct CachedStatus {
    snapshot: NowPlaying,
    fetched_at: Instant,
}

impl CachedStatus {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Aggregates Icecast, Liquidsoap and the schedule into `NowPlaying`
/// snapshots
///
/// Thread-safe and cheap to clone behind an `Arc`. Snapshots are cached
/// for a short TTL so any number of polling dashboards produce at most
/// one upstream round trip per interval.
pub struct StatusAggregator {
    icecast: IcecastClient,
    liquidsoap: LiquidsoapClient,
    schedule: Schedule,
    mount: String,
    cache_ttl: Duration,
    cache: RwLock<Option<CachedStatus>>,
}

impl StatusAggregator {
    /// Builds an aggregator from the global configuration
    pub fn from_config(config: &Arc<Config>) -> Result<Self> {
        let icecast = IcecastClient::builder()
            .status_url(config.get_icecast_status_url()?)
            .timeout(Duration::from_secs(config.get_icecast_timeout_secs()?))
            .build()?;

        let liquidsoap = LiquidsoapClient::builder()
            .host(config.get_liquidsoap_host()?)
            .port(config.get_liquidsoap_port()?)
            .timeout(Duration::from_millis(config.get_liquidsoap_timeout_ms()?))
            .build();

        Ok(Self {
            icecast,
            liquidsoap,
            schedule: config.get_schedule()?,
            mount: config.get_icecast_mount()?,
            cache_ttl: Duration::from_millis(config.get_status_cache_ttl_ms()?),
            cache: RwLock::new(None),
        })
    }

    /// Builds an aggregator from explicit parts (used by tests and the HUD)
    pub fn new(
        icecast: IcecastClient,
        liquidsoap: LiquidsoapClient,
        schedule: Schedule,
        mount: impl Into<String>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            icecast,
            liquidsoap,
            schedule,
            mount: mount.into(),
            cache_ttl,
            cache: RwLock::new(None),
        }
    }

    /// The configured schedule
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Distinct station names known to the schedule
    ///
    /// Derived locally so the list keeps working while Liquidsoap is down.
    pub fn stations(&self) -> Vec<String> {
        self.schedule.stations()
    }

    /// Returns the current snapshot, refreshing the cache if stale
    ///
    /// Never fails: upstream errors degrade the snapshot instead. Total
    /// latency is bounded by the two client timeouts.
    pub async fn get_now_playing(&self) -> NowPlaying {
        {
            let cache = self.cache.read().unwrap();
            if let Some(cached) = cache.as_ref() {
                if cached.is_fresh(self.cache_ttl) {
                    return cached.snapshot.clone();
                }
            }
        }

        let snapshot = self.fetch_fresh().await;

        let mut cache = self.cache.write().unwrap();
        *cache = Some(CachedStatus {
            snapshot: snapshot.clone(),
            fetched_at: Instant::now(),
        });

        snapshot
    }

    /// Switches the live station and invalidates the cache
    ///
    /// # Errors
    ///
    /// Rejects names that are not in the schedule before anything reaches
    /// the telnet socket, and propagates Liquidsoap failures.
    pub async fn set_station(&self, name: &str) -> Result<String> {
        let known = self.stations();
        if !known.iter().any(|s| s == name) {
            anyhow::bail!("Unknown station: {}", name);
        }

        let ack = self.liquidsoap.station_set(name).await?;

        // Next poll must see the switch, not a stale snapshot
        let mut cache = self.cache.write().unwrap();
        *cache = None;

        Ok(ack)
    }

    async fn fetch_fresh(&self) -> NowPlaying {
        let (icecast_connected, source) = match self.icecast.fetch_status().await {
            Ok(stats) => {
                let source: Option<SourceStats> = stats
                    .source
                    .into_iter()
                    .find(|s| s.mount().as_deref() == Some(self.mount.as_str()));
                (true, source)
            }
            Err(err) => {
                warn!(error = %err, "Icecast status fetch failed, serving degraded snapshot");
                (false, None)
            }
        };

        let live_station = match self.liquidsoap.station_get().await {
            Ok(station) => Some(station),
            Err(err) => {
                warn!(error = %err, "Liquidsoap station.get failed, serving degraded snapshot");
                None
            }
        };

        let now = Local::now();
        NowPlaying::assemble(
            source.as_ref(),
            icecast_connected,
            live_station,
            &self.schedule,
            now.hour() as u8,
            now.format("%I:%M:%S %p").to_string(),
        )
    }
}

impl std::fmt::Debug for StatusAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusAggregator")
            .field("mount", &self.mount)
            .field("cache_ttl", &self.cache_ttl)
            .field("stations", &self.stations())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Mock Liquidsoap peer answering every session with the same station
    /// name
    async fn mock_liquidsoap(station: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = vec![0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let reply = format!("{station}\nEND\nBye!\n");
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        port
    }

    fn aggregator_with(liq_port: u16, icecast_port: u16, ttl_ms: u64) -> StatusAggregator {
        let icecast = IcecastClient::builder()
            .status_url(format!("http://127.0.0.1:{icecast_port}/status-json.xsl"))
            .timeout(Duration::from_millis(300))
            .build()
            .unwrap();
        let liquidsoap = LiquidsoapClient::builder()
            .host("127.0.0.1")
            .port(liq_port)
            .timeout(Duration::from_millis(300))
            .build();

        StatusAggregator::new(
            icecast,
            liquidsoap,
            Schedule::stock(),
            "/stream.ogg",
            Duration::from_millis(ttl_ms),
        )
    }

    #[tokio::test]
    async fn test_snapshot_with_both_upstreams_down() {
        // Nothing listens on port 1
        let aggregator = aggregator_with(1, 1, 0);

        let np = aggregator.get_now_playing().await;
        assert!(!np.icecast_connected);
        assert!(!np.liquidsoap_connected);
        assert!(np.scheduled_station.is_some());
        assert!(serde_json::to_string(&np).is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_with_liquidsoap_only() {
        let liq_port = mock_liquidsoap("AUTODJ").await;
        let aggregator = aggregator_with(liq_port, 1, 0);

        let np = aggregator.get_now_playing().await;
        assert!(!np.icecast_connected);
        assert!(np.liquidsoap_connected);
        assert_eq!(np.station.as_deref(), Some("AUTODJ"));
    }

    #[tokio::test]
    async fn test_cache_serves_within_ttl() {
        let liq_port = mock_liquidsoap("AUTODJ").await;
        let aggregator = aggregator_with(liq_port, 1, 60_000);

        let first = aggregator.get_now_playing().await;
        let second = aggregator.get_now_playing().await;

        // Same cached snapshot, down to the formatted clock
        assert_eq!(first.time, second.time);
    }

    #[tokio::test]
    async fn test_set_station_rejects_unknown_names() {
        let aggregator = aggregator_with(1, 1, 0);

        let result = aggregator.set_station("Not A Station").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_set_station_invalidates_cache() {
        let liq_port = mock_liquidsoap("AUTODJ").await;
        let aggregator = aggregator_with(liq_port, 1, 60_000);

        let _ = aggregator.get_now_playing().await;
        aggregator.set_station("Noisefloor").await.unwrap();

        let cache = aggregator.cache.read().unwrap();
        assert!(cache.is_none());
    }

    #[test]
    fn test_stations_come_from_the_schedule() {
        let icecast = IcecastClient::new().unwrap();
        let liquidsoap = LiquidsoapClient::new();
        let aggregator = StatusAggregator::new(
            icecast,
            liquidsoap,
            Schedule::stock(),
            "/stream.ogg",
            Duration::from_millis(0),
        );

        assert_eq!(
            aggregator.stations(),
            vec!["Noisefloor", "Pandora's Box", "AUTODJ"]
        );
    }
}
