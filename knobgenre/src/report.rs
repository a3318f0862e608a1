//! Reports and exports over the genre index
//!
//! Reports are rendered to strings so the CLI just prints them. Exports
//! write JSON, CSV, or M3U playlists, optionally filtered by genre.

use crate::db::{GenreDb, Track};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;

const RULE: &str = "============================================================";

/// Tracks listed per directory in the unclassified report
const UNCLASSIFIED_CAP: usize = 10;

/// High-level index summary
pub fn summary(db: &GenreDb) -> Result<String> {
    let total = db.count_all()?;
    let songs = db.count_songs()?;
    let classified = db.count_classified()?;
    let unclassified = db.count_unclassified()?;
    let tagged = db.count_tagged()?;

    let mut out = String::new();
    writeln!(out, "\n{}", RULE).ok();
    writeln!(out, "  KNOB Radio Genre Index Summary").ok();
    writeln!(out, "{}", RULE).ok();
    writeln!(out, "  Total tracks:    {}", total).ok();
    writeln!(out, "  Songs:           {}", songs).ok();
    if songs > 0 {
        writeln!(
            out,
            "  Classified:      {} ({:.1}%)",
            classified,
            classified as f64 / songs as f64 * 100.0
        )
        .ok();
    }
    writeln!(out, "  Unclassified:    {}", unclassified).ok();
    writeln!(out, "  Tagged:          {}", tagged).ok();

    let content_types = db.content_type_counts()?;
    if !content_types.is_empty() {
        writeln!(out, "\n  Content types:").ok();
        for row in &content_types {
            let label = row.label.as_deref().unwrap_or("none");
            writeln!(out, "    {:15} {:5}", label, row.count).ok();
        }
    }

    let sources = db.source_counts()?;
    if !sources.is_empty() {
        writeln!(out, "\n  Classification sources:").ok();
        for row in &sources {
            let label = row.label.as_deref().unwrap_or("none");
            writeln!(out, "    {:15} {:5}", label, row.count).ok();
        }
    }

    Ok(out)
}

/// Distribution by parent genre, with a bar chart
pub fn by_parent(db: &GenreDb) -> Result<String> {
    let stats = db.parent_counts()?;
    let unclassified = db.count_unclassified()?;

    let mut out = String::new();
    writeln!(out, "\n{}", RULE).ok();
    writeln!(out, "  Genre Distribution (Parent)").ok();
    writeln!(out, "{}", RULE).ok();

    let total: u64 = stats.iter().map(|r| r.count).sum();
    for row in &stats {
        let Some(parent) = row.label.as_deref() else {
            continue;
        };
        let pct = if total > 0 {
            row.count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let bar = "#".repeat((pct / 2.0) as usize);
        writeln!(out, "  {:15} {:5}  {:5.1}%  {}", parent, row.count, pct, bar).ok();
    }

    if unclassified > 0 {
        writeln!(out, "  {:15} {:5}", "(unclassified)", unclassified).ok();
    }

    Ok(out)
}

/// Distribution by subgenre, grouped under each parent
pub fn by_sub(db: &GenreDb) -> Result<String> {
    let stats = db.sub_counts()?;

    let mut out = String::new();
    writeln!(out, "\n{}", RULE).ok();
    writeln!(out, "  Genre Distribution (Subgenre)").ok();
    writeln!(out, "{}", RULE).ok();

    let mut current_parent: Option<&str> = None;
    for (parent, sub, count) in &stats {
        if current_parent != Some(parent.as_str()) {
            writeln!(out, "\n  {}:", parent).ok();
            current_parent = Some(parent.as_str());
        }
        let sub = sub.as_deref().unwrap_or("(none)");
        writeln!(out, "    {:25} {:5}", sub, count).ok();
    }

    Ok(out)
}

/// Unclassified tracks grouped by directory, capped per directory
pub fn unclassified(db: &GenreDb) -> Result<String> {
    let tracks = db.unclassified()?;

    let mut out = String::new();
    writeln!(out, "\n{}", RULE).ok();
    writeln!(out, "  Unclassified Tracks ({})", tracks.len()).ok();
    writeln!(out, "{}", RULE).ok();

    let mut by_dir: BTreeMap<&str, Vec<&Track>> = BTreeMap::new();
    for t in &tracks {
        by_dir.entry(t.directory.as_str()).or_default().push(t);
    }

    for (dir, tracks) in &by_dir {
        writeln!(out, "\n  {}/ ({} tracks)", dir, tracks.len()).ok();
        for t in tracks.iter().take(UNCLASSIFIED_CAP) {
            let title = t.title.as_deref().unwrap_or(&t.filename);
            match t.artist.as_deref() {
                Some(artist) => writeln!(out, "    {} - {}", artist, title).ok(),
                None => writeln!(out, "    {}", title).ok(),
            };
        }
        if tracks.len() > UNCLASSIFIED_CAP {
            writeln!(out, "    ... and {} more", tracks.len() - UNCLASSIFIED_CAP).ok();
        }
    }

    Ok(out)
}

#[derive(Serialize)]
struct ExportedTrack<'a> {
    path: &'a str,
    artist: Option<&'a str>,
    title: Option<&'a str>,
    album: Option<&'a str>,
    genre_parent: Option<&'a str>,
    genre_sub: Option<&'a str>,
    genre_source: Option<&'a str>,
    genre_confidence: Option<f64>,
    duration: Option<f64>,
    content_type: &'a str,
}

impl<'a> From<&'a Track> for ExportedTrack<'a> {
    fn from(t: &'a Track) -> Self {
        Self {
            path: &t.path,
            artist: t.artist.as_deref(),
            title: t.title.as_deref(),
            album: t.album.as_deref(),
            genre_parent: t.genre_parent.as_deref(),
            genre_sub: t.genre_sub.as_deref(),
            genre_source: t.genre_source.as_deref(),
            genre_confidence: t.genre_confidence,
            duration: t.duration,
            content_type: &t.content_type,
        }
    }
}

/// Exports matching tracks as JSON; returns the number exported
pub fn export_json(
    db: &GenreDb,
    output: &Path,
    parent: Option<&str>,
    sub: Option<&str>,
) -> Result<usize> {
    let tracks = db.tracks_by_genre(parent, sub)?;
    let exported: Vec<ExportedTrack<'_>> = tracks.iter().map(ExportedTrack::from).collect();

    let file = File::create(output)?;
    serde_json::to_writer_pretty(file, &exported)?;
    Ok(tracks.len())
}

fn csv_field(value: Option<&str>) -> String {
    let Some(v) = value else {
        return String::new();
    };
    if v.contains(',') || v.contains('"') || v.contains('\n') {
        format!("\"{}\"", v.replace('"', "\"\""))
    } else {
        v.to_string()
    }
}

/// Exports matching tracks as CSV; returns the number exported
pub fn export_csv(
    db: &GenreDb,
    output: &Path,
    parent: Option<&str>,
    sub: Option<&str>,
) -> Result<usize> {
    let tracks = db.tracks_by_genre(parent, sub)?;

    let mut file = File::create(output)?;
    writeln!(
        file,
        "path,artist,title,album,genre_parent,genre_sub,genre_source,genre_confidence,duration,content_type"
    )?;
    for t in &tracks {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{}",
            csv_field(Some(&t.path)),
            csv_field(t.artist.as_deref()),
            csv_field(t.title.as_deref()),
            csv_field(t.album.as_deref()),
            csv_field(t.genre_parent.as_deref()),
            csv_field(t.genre_sub.as_deref()),
            csv_field(t.genre_source.as_deref()),
            t.genre_confidence.map(|c| c.to_string()).unwrap_or_default(),
            t.duration.map(|d| d.to_string()).unwrap_or_default(),
            csv_field(Some(&t.content_type)),
        )?;
    }
    Ok(tracks.len())
}

/// Exports matching tracks as an M3U playlist; returns the number exported
pub fn export_m3u(
    db: &GenreDb,
    output: &Path,
    parent: Option<&str>,
    sub: Option<&str>,
    media_root: &Path,
) -> Result<usize> {
    let tracks = db.tracks_by_genre(parent, sub)?;
    let label = sub.or(parent).unwrap_or("All Songs");

    let mut file = File::create(output)?;
    writeln!(file, "#EXTM3U")?;
    writeln!(file, "# KNOB Radio - {}", label)?;
    writeln!(file, "# {} tracks", tracks.len())?;
    writeln!(file)?;
    for t in &tracks {
        let duration = t.duration.map(|d| d as i64).unwrap_or(-1);
        let artist = t.artist.as_deref().unwrap_or("Unknown");
        let title = t.title.as_deref().unwrap_or(&t.filename);
        writeln!(file, "#EXTINF:{},{} - {}", duration, artist, title)?;
        writeln!(file, "{}", media_root.join(&t.path).display())?;
    }
    Ok(tracks.len())
}

/// Default export file name, `knob_<label>.<format>`
pub fn default_export_name(parent: Option<&str>, sub: Option<&str>, format: &str) -> String {
    let label = sub.or(parent).unwrap_or("all");
    let label = label.replace('/', "-").replace(' ', "_").to_lowercase();
    format!("knob_{}.{}", label, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScannedFile;
    use std::fs;

    fn seeded_db() -> GenreDb {
        let db = GenreDb::open_in_memory().unwrap();
        for (path, parent, sub, artist, title) in [
            ("bass/a.mp3", "Bass", "Dubstep", "Artist A", "Track A"),
            ("bass/b.mp3", "Bass", "Grime", "Artist B", "Track, B"),
            ("jazz/c.mp3", "Jazz", "Swing", "Artist C", "Track C"),
        ] {
            let id = db
                .upsert_track(&ScannedFile {
                    path: path.to_string(),
                    filename: path.rsplit('/').next().unwrap().to_string(),
                    directory: path.rsplit_once('/').unwrap().0.to_string(),
                    filesize: 10,
                    mtime: 100,
                    content_type: "song".to_string(),
                })
                .unwrap();
            db.update_classification(id, parent, sub, "metadata", 0.9, sub)
                .unwrap();
            db.update_tag_fields(id, Some(artist), Some(title), None, Some(120.0))
                .unwrap();
        }
        db
    }

    #[test]
    fn summary_counts() {
        let db = seeded_db();
        let text = summary(&db).unwrap();
        assert!(text.contains("Total tracks:    3"));
        assert!(text.contains("Classified:      3 (100.0%)"));
    }

    #[test]
    fn parent_report_has_bars() {
        let db = seeded_db();
        let text = by_parent(&db).unwrap();
        assert!(text.contains("Bass"));
        assert!(text.contains("Jazz"));
        assert!(text.contains('#'));
    }

    #[test]
    fn m3u_export_shape() {
        let db = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bass.m3u");

        let n = export_m3u(&db, &out, Some("Bass"), None, Path::new("/media/radio")).unwrap();
        assert_eq!(n, 2);

        let content = fs::read_to_string(&out).unwrap();
        assert!(content.starts_with("#EXTM3U"));
        assert!(content.contains("#EXTINF:120,Artist A - Track A"));
        assert!(content.contains("/media/radio/bass/a.mp3"));
        assert!(!content.contains("jazz/c.mp3"));
    }

    #[test]
    fn csv_export_quotes_commas() {
        let db = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("all.csv");

        export_csv(&db, &out, None, None).unwrap();
        let content = fs::read_to_string(&out).unwrap();
        assert!(content.lines().next().unwrap().starts_with("path,artist"));
        assert!(content.contains("\"Track, B\""));
    }

    #[test]
    fn json_export_roundtrips() {
        let db = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("all.json");

        export_json(&db, &out, None, Some("Swing")).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["genre_sub"], "Swing");
    }

    #[test]
    fn default_names() {
        assert_eq!(default_export_name(None, None, "json"), "knob_all.json");
        assert_eq!(
            default_export_name(Some("Dub/Reggae"), None, "m3u"),
            "knob_dub-reggae.m3u"
        );
        assert_eq!(
            default_export_name(Some("Bass"), Some("Deep Dubstep"), "csv"),
            "knob_deep_dubstep.csv"
        );
    }
}
