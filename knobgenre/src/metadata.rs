//! Metadata pass: classify songs from their tags
//!
//! Reads ID3/Vorbis/MP4 tags with lofty, normalizes the genre string
//! through the taxonomy tables, and falls back to directory hints. Tag
//! columns are refreshed even when no genre is found, and every visited
//! row is marked tagged so reruns only touch new files.

use crate::db::{GenreDb, Track};
use crate::error::Result;
use crate::taxonomy::{directory_hint, normalize_tag};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::path::Path;
use tracing::{debug, warn};

const METADATA_CONFIDENCE: f64 = 0.9;
const DIRECTORY_CONFIDENCE: f64 = 0.7;

/// Outcome of one metadata pass run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub classified: usize,
    pub skipped: usize,
}

/// Tag fields pulled from one file
#[derive(Debug, Default)]
struct FileTags {
    artist: Option<String>,
    title: Option<String>,
    album: Option<String>,
    genre: Option<String>,
    duration: Option<f64>,
}

fn read_tags(path: &Path) -> Option<FileTags> {
    let tagged_file = match Probe::open(path).and_then(|p| p.read()) {
        Ok(f) => f,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "Unreadable tags");
            return None;
        }
    };

    let mut tags = FileTags {
        duration: Some(tagged_file.properties().duration().as_secs_f64()),
        ..Default::default()
    };

    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        tags.artist = tag.artist().map(|s| s.to_string());
        tags.title = tag.title().map(|s| s.to_string());
        tags.album = tag.album().map(|s| s.to_string());
        tags.genre = tag.genre().map(|s| s.to_string());
    }

    Some(tags)
}

/// Classifies one track; returns true when a genre was assigned
fn classify_track(db: &GenreDb, media_root: &Path, track: &Track) -> Result<bool> {
    let filepath = media_root.join(&track.path);
    let tags = read_tags(&filepath);

    let mut classification = None;
    let mut raw_label = String::new();

    if let Some(tags) = &tags {
        db.update_tag_fields(
            track.id,
            tags.artist.as_deref(),
            tags.title.as_deref(),
            tags.album.as_deref(),
            tags.duration,
        )?;

        if let Some(genre) = &tags.genre {
            raw_label = genre.trim().to_string();
            if let Some((parent, sub)) = normalize_tag(genre) {
                classification = Some((parent, sub, "metadata", METADATA_CONFIDENCE));
            }
        }
    }

    if classification.is_none() {
        if let Some((parent, sub)) = directory_hint(&track.directory) {
            raw_label = format!("dir:{}", track.directory);
            classification = Some((parent, sub, "directory", DIRECTORY_CONFIDENCE));
        }
    }

    match classification {
        Some((parent, sub, source, confidence)) => {
            db.update_classification(track.id, parent, sub, source, confidence, &raw_label)?;
            debug!(path = %track.path, source, genre = %format!("{}/{}", parent, sub), "classified");
            Ok(true)
        }
        None => {
            db.mark_tagged(track.id)?;
            debug!(path = %track.path, "no classification");
            Ok(false)
        }
    }
}

/// Runs the metadata pass over every song that still needs it
pub fn run_metadata_pass(
    db: &GenreDb,
    media_root: &Path,
    limit: Option<usize>,
) -> Result<PassStats> {
    let tracks = db.tracks_needing_tags(limit)?;
    let mut stats = PassStats::default();

    for track in &tracks {
        match classify_track(db, media_root, track) {
            Ok(true) => stats.classified += 1,
            Ok(false) => stats.skipped += 1,
            Err(err) => {
                warn!(path = %track.path, error = %err, "Classification failed");
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScannedFile;
    use std::fs;

    fn seed(db: &GenreDb, path: &str, directory: &str) -> i64 {
        db.upsert_track(&ScannedFile {
            path: path.to_string(),
            filename: path.rsplit('/').next().unwrap().to_string(),
            directory: directory.to_string(),
            filesize: 10,
            mtime: 100,
            content_type: "song".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn directory_hint_classifies_untagged_files() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("MOBCOIN_DEEP_DUBSTEAP")).unwrap();
        // Not a real audio file, so the tag read fails and the hint applies
        fs::write(root.path().join("MOBCOIN_DEEP_DUBSTEAP/a.mp3"), b"x").unwrap();

        let db = GenreDb::open_in_memory().unwrap();
        seed(&db, "MOBCOIN_DEEP_DUBSTEAP/a.mp3", "MOBCOIN_DEEP_DUBSTEAP");

        let stats = run_metadata_pass(&db, root.path(), None).unwrap();
        assert_eq!(stats, PassStats { classified: 1, skipped: 0 });

        let track = db
            .get_track_by_path("MOBCOIN_DEEP_DUBSTEAP/a.mp3")
            .unwrap()
            .unwrap();
        assert_eq!(track.genre_parent.as_deref(), Some("Bass"));
        assert_eq!(track.genre_sub.as_deref(), Some("Dubstep"));
        assert_eq!(track.genre_source.as_deref(), Some("directory"));
        assert_eq!(track.genre_confidence, Some(0.7));
    }

    #[test]
    fn unmatched_files_are_marked_tagged() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("misc")).unwrap();
        fs::write(root.path().join("misc/a.mp3"), b"x").unwrap();

        let db = GenreDb::open_in_memory().unwrap();
        seed(&db, "misc/a.mp3", "misc");

        let stats = run_metadata_pass(&db, root.path(), None).unwrap();
        assert_eq!(stats, PassStats { classified: 0, skipped: 1 });

        let track = db.get_track_by_path("misc/a.mp3").unwrap().unwrap();
        assert!(track.tagged);
        assert!(track.genre_parent.is_none());

        // A rerun has nothing left to do
        let stats = run_metadata_pass(&db, root.path(), None).unwrap();
        assert_eq!(stats, PassStats { classified: 0, skipped: 0 });
    }

    #[test]
    fn limit_bounds_the_pass() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("misc")).unwrap();
        let db = GenreDb::open_in_memory().unwrap();
        for name in ["a.mp3", "b.mp3", "c.mp3"] {
            fs::write(root.path().join("misc").join(name), b"x").unwrap();
            seed(&db, &format!("misc/{}", name), "misc");
        }

        let stats = run_metadata_pass(&db, root.path(), Some(2)).unwrap();
        assert_eq!(stats.classified + stats.skipped, 2);
        assert_eq!(db.tracks_needing_tags(None).unwrap().len(), 1);
    }
}
