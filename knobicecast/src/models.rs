//! Data models for the Icecast `status-json.xsl` response
//!
//! Only the fields the status aggregator consumes are modeled; unknown
//! fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level envelope of `status-json.xsl`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRoot {
    pub icestats: IceStats,
}

/// Server-wide statistics
#[derive(Debug, Clone, Deserialize)]
pub struct IceStats {
    /// Icecast server id string
    pub server_id: Option<String>,
    pub host: Option<String>,
    pub server_start_iso8601: Option<String>,
    /// Live mounts. Icecast emits an object for one mount, an array for
    /// several and omits the field when nothing is connected.
    #[serde(default, deserialize_with = "source_one_or_many")]
    pub source: Vec<SourceStats>,
}

/// Per-mount statistics and stream metadata
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceStats {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub listeners: Option<u64>,
    pub listener_peak: Option<u64>,
    pub audio_bitrate: Option<u64>,
    pub audio_samplerate: Option<u64>,
    pub server_name: Option<String>,
    pub server_description: Option<String>,
    pub stream_start: Option<String>,
    pub listenurl: Option<String>,
}

impl SourceStats {
    /// Returns the mount path of this source, derived from `listenurl`
    ///
    /// `http://host:8000/stream.ogg` yields `/stream.ogg`. Returns `None`
    /// when `listenurl` is absent or unparseable.
    pub fn mount(&self) -> Option<String> {
        let listenurl = self.listenurl.as_deref()?;
        let url = url::Url::parse(listenurl).ok()?;
        Some(url.path().to_string())
    }
}

fn source_one_or_many<'de, D>(deserializer: D) -> Result<Vec<SourceStats>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Box<SourceStats>),
        Many(Vec<SourceStats>),
    }

    match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(OneOrMany::One(source)) => Ok(vec![*source]),
        Some(OneOrMany::Many(sources)) => Ok(sources),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_source_object() {
        let json = r#"{
            "icestats": {
                "server_id": "Icecast 2.4.4",
                "host": "localhost",
                "source": {
                    "artist": "Sun Ra",
                    "title": "Space Is the Place",
                    "listeners": 3,
                    "listener_peak": 11,
                    "audio_bitrate": 128,
                    "audio_samplerate": 44100,
                    "listenurl": "http://localhost:8000/stream.ogg",
                    "stream_start": "Fri, 29 Aug 2026 06:00:00 +0000"
                }
            }
        }"#;

        let root: StatusRoot = serde_json::from_str(json).unwrap();
        assert_eq!(root.icestats.source.len(), 1);

        let source = &root.icestats.source[0];
        assert_eq!(source.artist.as_deref(), Some("Sun Ra"));
        assert_eq!(source.listeners, Some(3));
        assert_eq!(source.mount().as_deref(), Some("/stream.ogg"));
    }

    #[test]
    fn test_source_list() {
        let json = r#"{
            "icestats": {
                "source": [
                    { "listenurl": "http://localhost:8000/stream.ogg", "listeners": 2 },
                    { "listenurl": "http://localhost:8000/backup.ogg", "listeners": 0 }
                ]
            }
        }"#;

        let root: StatusRoot = serde_json::from_str(json).unwrap();
        assert_eq!(root.icestats.source.len(), 2);
        assert_eq!(root.icestats.source[1].mount().as_deref(), Some("/backup.ogg"));
    }

    #[test]
    fn test_no_source_connected() {
        let json = r#"{ "icestats": { "server_id": "Icecast 2.4.4" } }"#;

        let root: StatusRoot = serde_json::from_str(json).unwrap();
        assert!(root.icestats.source.is_empty());
    }

    #[test]
    fn test_missing_metadata_fields() {
        // A mount that just came up has no artist/title yet
        let json = r#"{
            "icestats": {
                "source": { "listenurl": "http://localhost:8000/stream.ogg" }
            }
        }"#;

        let root: StatusRoot = serde_json::from_str(json).unwrap();
        let source = &root.icestats.source[0];
        assert!(source.artist.is_none());
        assert!(source.title.is_none());
        assert!(source.listeners.is_none());
    }
}
