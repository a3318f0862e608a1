//! Wire model for the now-playing API

use crate::schedule::{format_hour, Schedule};
use knobicecast::SourceStats;
use serde::{Deserialize, Serialize};

/// One merged snapshot of what the station is doing right now
///
/// Every field except the schedule-derived ones is optional: an upstream
/// being down empties its fields instead of failing the request.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NowPlaying {
    /// Track artist, from Icecast stream metadata
    pub artist: Option<String>,
    /// Track title, from Icecast stream metadata
    pub title: Option<String>,
    /// Station currently on air, from Liquidsoap
    pub station: Option<String>,
    /// Station the schedule expects on air right now
    pub scheduled_station: Option<String>,
    /// Next scheduled station, if the schedule ever changes
    pub next_station: Option<String>,
    /// Hour of the next change, listener-facing (e.g. "10pm")
    pub next_change_fmt: Option<String>,
    pub listeners: Option<u64>,
    pub listener_peak: Option<u64>,
    pub bitrate: Option<u64>,
    pub samplerate: Option<u64>,
    /// Server local time, `%I:%M:%S %p`
    pub time: String,
    pub icecast_connected: bool,
    pub liquidsoap_connected: bool,
}

impl NowPlaying {
    /// Merges the three inputs into one snapshot
    ///
    /// `source` is `None` when Icecast is reachable but the mount has no
    /// live source; `icecast_connected` tracks reachability, not the
    /// mount.
    pub fn assemble(
        source: Option<&SourceStats>,
        icecast_connected: bool,
        live_station: Option<String>,
        schedule: &Schedule,
        hour: u8,
        time: String,
    ) -> Self {
        let liquidsoap_connected = live_station.is_some();
        let next = schedule.next_change(hour);

        Self {
            artist: source.and_then(|s| s.artist.clone()),
            title: source.and_then(|s| s.title.clone()),
            station: live_station,
            scheduled_station: schedule.station_at(hour).map(str::to_string),
            next_station: next.map(|(_, slot)| slot.station.clone()),
            next_change_fmt: next.map(|(h, _)| format_hour(h)),
            listeners: source.and_then(|s| s.listeners),
            listener_peak: source.and_then(|s| s.listener_peak),
            bitrate: source.and_then(|s| s.audio_bitrate),
            samplerate: source.and_then(|s| s.audio_samplerate),
            time,
            icecast_connected,
            liquidsoap_connected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_source() -> SourceStats {
        SourceStats {
            artist: Some("Sun Ra".to_string()),
            title: Some("Space Is the Place".to_string()),
            listeners: Some(4),
            listener_peak: Some(17),
            audio_bitrate: Some(128),
            audio_samplerate: Some(44100),
            ..Default::default()
        }
    }

    #[test]
    fn test_assemble_all_upstreams_healthy() {
        let schedule = Schedule::stock();
        let source = sample_source();

        let np = NowPlaying::assemble(
            Some(&source),
            true,
            Some("AUTODJ".to_string()),
            &schedule,
            9,
            "09:15:00 AM".to_string(),
        );

        assert_eq!(np.artist.as_deref(), Some("Sun Ra"));
        assert_eq!(np.station.as_deref(), Some("AUTODJ"));
        assert_eq!(np.scheduled_station.as_deref(), Some("AUTODJ"));
        assert_eq!(np.next_station.as_deref(), Some("Pandora's Box"));
        assert_eq!(np.next_change_fmt.as_deref(), Some("10am"));
        assert_eq!(np.listeners, Some(4));
        assert!(np.icecast_connected);
        assert!(np.liquidsoap_connected);
    }

    #[test]
    fn test_assemble_everything_down_still_produces_a_snapshot() {
        let schedule = Schedule::stock();

        let np = NowPlaying::assemble(None, false, None, &schedule, 23, "11:00:00 PM".to_string());

        assert!(np.artist.is_none());
        assert!(np.station.is_none());
        assert!(!np.icecast_connected);
        assert!(!np.liquidsoap_connected);
        // The schedule is local and always answers
        assert_eq!(np.scheduled_station.as_deref(), Some("Noisefloor"));
        assert_eq!(np.next_change_fmt.as_deref(), Some("2am"));
    }

    #[test]
    fn test_assemble_icecast_up_but_mount_silent() {
        let schedule = Schedule::stock();

        let np = NowPlaying::assemble(
            None,
            true,
            Some("AUTODJ".to_string()),
            &schedule,
            3,
            "03:00:00 AM".to_string(),
        );

        assert!(np.icecast_connected);
        assert!(np.title.is_none());
        assert!(np.listeners.is_none());
    }

    #[test]
    fn test_serializes_with_expected_field_names() {
        let schedule = Schedule::stock();
        let np = NowPlaying::assemble(None, false, None, &schedule, 3, "x".to_string());
        let json = serde_json::to_value(&np).unwrap();

        for key in [
            "artist",
            "title",
            "station",
            "scheduled_station",
            "next_station",
            "next_change_fmt",
            "listeners",
            "listener_peak",
            "bitrate",
            "samplerate",
            "time",
            "icecast_connected",
            "liquidsoap_connected",
        ] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }
    }
}
