//! Media library discovery and incremental indexing
//!
//! Walks the media root, keeps only audio files, tags station assets by
//! their directory, and reconciles the database: upsert new or changed
//! files, drop rows whose files vanished.

use crate::db::GenreDb;
use crate::error::Result;
use crate::taxonomy::content_type_for;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::debug;
use walkdir::WalkDir;

pub const DEFAULT_MEDIA_ROOT: &str = "/media/radio";

pub const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".ogg", ".flac", ".wav", ".m4a", ".opus", ".wma"];

/// Top-level directories that hold no station content
pub const SKIP_DIRS: &[&str] = &[
    "lost+found",
    "configs",
    "html",
    "random_assets",
    "scripts",
    "log",
    "kstk",
    "gdrive",
    "radiobot",
];

/// One audio file as seen on disk, paths relative to the media root
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: String,
    pub filename: String,
    pub directory: String,
    pub filesize: u64,
    pub mtime: i64,
    pub content_type: String,
}

/// Outcome of one scan run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub new: usize,
    pub updated: usize,
    pub removed: usize,
}

pub fn is_audio_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Walks the media root and collects audio files
pub fn scan_files(media_root: &Path) -> Result<Vec<ScannedFile>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(media_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            // Skip list applies to top-level directories only
            if entry.depth() == 1 {
                let name = entry.file_name().to_string_lossy();
                if SKIP_DIRS.iter().any(|d| *d == name) {
                    return false;
                }
            }
            true
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                debug!(error = %err, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        if !is_audio_file(&filename) {
            continue;
        }

        let rel = match entry.path().strip_prefix(media_root) {
            Ok(r) => r,
            Err(_) => continue,
        };
        let rel_path = rel.to_string_lossy().to_string();
        let directory = rel
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(err) => {
                debug!(path = %rel_path, error = %err, "Skipping unstatable file");
                continue;
            }
        };

        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let content_type = content_type_for(&directory).unwrap_or("song").to_string();

        files.push(ScannedFile {
            path: rel_path,
            filename,
            directory,
            filesize: metadata.len(),
            mtime,
            content_type,
        });
    }

    Ok(files)
}

/// Scans the media root and reconciles the database
pub fn scan_to_db(db: &GenreDb, media_root: &Path) -> Result<ScanStats> {
    let existing = db.all_paths()?;
    let mut seen = std::collections::HashSet::new();
    let mut stats = ScanStats::default();

    for file in scan_files(media_root)? {
        seen.insert(file.path.clone());

        if existing.contains(&file.path) {
            if db.needs_rescan(&file.path, file.mtime, file.filesize)? {
                db.upsert_track(&file)?;
                stats.updated += 1;
                debug!(path = %file.path, "updated");
            }
        } else {
            db.upsert_track(&file)?;
            stats.new += 1;
            debug!(path = %file.path, "new");
        }
    }

    for path in existing.difference(&seen) {
        db.remove_track(path)?;
        stats.removed += 1;
        debug!(path = %path, "removed");
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn audio_extension_matching() {
        assert!(is_audio_file("track.mp3"));
        assert!(is_audio_file("TRACK.MP3"));
        assert!(is_audio_file("song.flac"));
        assert!(!is_audio_file("cover.jpg"));
        assert!(!is_audio_file("notes.txt"));
        assert!(!is_audio_file("mp3"));
    }

    #[test]
    fn scan_finds_audio_and_skips_junk() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("bass")).unwrap();
        fs::create_dir_all(root.path().join("scripts")).unwrap();
        fs::write(root.path().join("bass/track.mp3"), b"x").unwrap();
        fs::write(root.path().join("bass/cover.jpg"), b"x").unwrap();
        fs::write(root.path().join("scripts/jingle.mp3"), b"x").unwrap();

        let files = scan_files(root.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "bass/track.mp3");
        assert_eq!(files[0].directory, "bass");
        assert_eq!(files[0].content_type, "song");
    }

    #[test]
    fn scan_tags_station_assets() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("callsigns")).unwrap();
        fs::write(root.path().join("callsigns/id.mp3"), b"x").unwrap();

        let files = scan_files(root.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content_type, "callsign");
    }

    #[test]
    fn incremental_scan_reconciles() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("bass")).unwrap();
        fs::write(root.path().join("bass/a.mp3"), b"aa").unwrap();
        fs::write(root.path().join("bass/b.mp3"), b"bb").unwrap();

        let db = crate::db::GenreDb::open_in_memory().unwrap();

        let stats = scan_to_db(&db, root.path()).unwrap();
        assert_eq!(stats, ScanStats { new: 2, updated: 0, removed: 0 });

        // Unchanged rescan touches nothing
        let stats = scan_to_db(&db, root.path()).unwrap();
        assert_eq!(stats, ScanStats { new: 0, updated: 0, removed: 0 });

        // Grow one file, delete the other
        fs::write(root.path().join("bass/a.mp3"), b"aaaa").unwrap();
        fs::remove_file(root.path().join("bass/b.mp3")).unwrap();

        let stats = scan_to_db(&db, root.path()).unwrap();
        assert_eq!(stats, ScanStats { new: 0, updated: 1, removed: 1 });
        assert_eq!(db.count_all().unwrap(), 1);
    }
}
