//! SQLite layer for the genre index
//!
//! One connection behind a mutex, WAL journal, schema applied from
//! `schema.sql` on open. Scan-level upserts never touch an existing
//! classification.

use crate::error::Result;
use crate::scanner::ScannedFile;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");
const SCHEMA_VERSION: &str = "1";

/// One row of the tracks table
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    pub id: i64,
    pub path: String,
    pub filename: String,
    pub directory: String,
    pub filesize: u64,
    pub mtime: i64,
    pub duration: Option<f64>,
    pub content_type: String,
    pub genre_parent: Option<String>,
    pub genre_sub: Option<String>,
    pub genre_source: Option<String>,
    pub genre_confidence: Option<f64>,
    pub genre_raw: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub tagged: bool,
}

impl Track {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            path: row.get("path")?,
            filename: row.get("filename")?,
            directory: row.get("directory")?,
            filesize: row.get::<_, i64>("filesize")? as u64,
            mtime: row.get("mtime")?,
            duration: row.get("duration")?,
            content_type: row.get("content_type")?,
            genre_parent: row.get("genre_parent")?,
            genre_sub: row.get("genre_sub")?,
            genre_source: row.get("genre_source")?,
            genre_confidence: row.get("genre_confidence")?,
            genre_raw: row.get("genre_raw")?,
            artist: row.get("artist")?,
            title: row.get("title")?,
            album: row.get("album")?,
            tagged: row.get::<_, i64>("tagged")? != 0,
        })
    }
}

/// Simple (label, count) pair for the reports
#[derive(Debug, Clone)]
pub struct CountRow {
    pub label: Option<String>,
    pub count: u64,
}

/// Genre index database
#[derive(Debug)]
pub struct GenreDb {
    conn: Mutex<Connection>,
}

impl GenreDb {
    /// Opens (or creates) the index at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory index, used by the tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Inserts or refreshes a scanned file
    ///
    /// On update only the scan-level columns change; genre columns and the
    /// tagged flag are preserved. Returns the track id.
    pub fn upsert_track(&self, file: &ScannedFile) -> Result<i64> {
        let conn = self.conn.lock().unwrap();

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM tracks WHERE path = ?1",
                params![file.path],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE tracks SET
                        filename = ?1, directory = ?2, filesize = ?3, mtime = ?4,
                        updated_at = datetime('now')
                     WHERE id = ?5",
                    params![
                        file.filename,
                        file.directory,
                        file.filesize as i64,
                        file.mtime,
                        id
                    ],
                )?;
                Ok(id)
            }
            None => {
                conn.execute(
                    "INSERT INTO tracks
                        (path, filename, directory, filesize, mtime, content_type)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        file.path,
                        file.filename,
                        file.directory,
                        file.filesize as i64,
                        file.mtime,
                        file.content_type
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            }
        }
    }

    /// All indexed paths, for change detection
    pub fn all_paths(&self) -> Result<HashSet<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT path FROM tracks")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut paths = HashSet::new();
        for row in rows {
            paths.insert(row?);
        }
        Ok(paths)
    }

    /// Whether a file changed since it was last indexed
    pub fn needs_rescan(&self, path: &str, mtime: i64, filesize: u64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(i64, i64)> = conn
            .query_row(
                "SELECT mtime, filesize FROM tracks WHERE path = ?1",
                params![path],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(true),
            Some((m, s)) => Ok(m != mtime || s != filesize as i64),
        }
    }

    /// Removes a track whose file disappeared
    pub fn remove_track(&self, path: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM tracks WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = id {
            conn.execute(
                "DELETE FROM classification_log WHERE track_id = ?1",
                params![id],
            )?;
            conn.execute("DELETE FROM tracks WHERE id = ?1", params![id])?;
        }
        Ok(())
    }

    /// Songs that have not been through the metadata pass yet
    pub fn tracks_needing_tags(&self, limit: Option<usize>) -> Result<Vec<Track>> {
        let conn = self.conn.lock().unwrap();
        let sql = match limit {
            Some(_) => {
                "SELECT * FROM tracks WHERE tagged = 0 AND content_type = 'song' LIMIT ?1"
            }
            None => "SELECT * FROM tracks WHERE tagged = 0 AND content_type = 'song'",
        };

        let mut stmt = conn.prepare(sql)?;
        let rows = match limit {
            Some(n) => stmt.query_map(params![n as i64], Track::from_row)?,
            None => stmt.query_map([], Track::from_row)?,
        };

        let mut tracks = Vec::new();
        for row in rows {
            tracks.push(row?);
        }
        Ok(tracks)
    }

    /// Records a classification and appends to the log
    pub fn update_classification(
        &self,
        track_id: i64,
        genre_parent: &str,
        genre_sub: &str,
        source: &str,
        confidence: f64,
        raw_label: &str,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE tracks SET
                genre_parent = ?1, genre_sub = ?2, genre_source = ?3,
                genre_confidence = ?4, genre_raw = ?5, tagged = 1,
                updated_at = datetime('now')
             WHERE id = ?6",
            params![genre_parent, genre_sub, source, confidence, raw_label, track_id],
        )?;
        conn.execute(
            "INSERT INTO classification_log
                (track_id, genre_parent, genre_sub, confidence, raw_label)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![track_id, genre_parent, genre_sub, confidence, raw_label],
        )?;
        Ok(())
    }

    /// Refreshes the tag columns without touching the classification
    pub fn update_tag_fields(
        &self,
        track_id: i64,
        artist: Option<&str>,
        title: Option<&str>,
        album: Option<&str>,
        duration: Option<f64>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE tracks SET
                artist = COALESCE(?1, artist),
                title = COALESCE(?2, title),
                album = COALESCE(?3, album),
                duration = COALESCE(?4, duration),
                updated_at = datetime('now')
             WHERE id = ?5",
            params![artist, title, album, duration, track_id],
        )?;
        Ok(())
    }

    /// Marks the metadata pass done without classifying
    pub fn mark_tagged(&self, track_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE tracks SET tagged = 1, updated_at = datetime('now') WHERE id = ?1",
            params![track_id],
        )?;
        Ok(())
    }

    pub fn count_all(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM tracks")
    }

    pub fn count_songs(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM tracks WHERE content_type = 'song'")
    }

    pub fn count_classified(&self) -> Result<u64> {
        self.count(
            "SELECT COUNT(*) FROM tracks
             WHERE content_type = 'song' AND genre_parent IS NOT NULL",
        )
    }

    pub fn count_unclassified(&self) -> Result<u64> {
        self.count(
            "SELECT COUNT(*) FROM tracks
             WHERE content_type = 'song' AND genre_parent IS NULL",
        )
    }

    pub fn count_tagged(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM tracks WHERE tagged = 1 AND content_type = 'song'")
    }

    fn count(&self, sql: &str) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// Track counts per content type, most common first
    pub fn content_type_counts(&self) -> Result<Vec<CountRow>> {
        self.grouped_counts(
            "SELECT content_type, COUNT(*) FROM tracks
             GROUP BY content_type ORDER BY COUNT(*) DESC",
        )
    }

    /// Classified-song counts per classification source
    pub fn source_counts(&self) -> Result<Vec<CountRow>> {
        self.grouped_counts(
            "SELECT genre_source, COUNT(*) FROM tracks
             WHERE genre_parent IS NOT NULL
             GROUP BY genre_source ORDER BY COUNT(*) DESC",
        )
    }

    /// Song counts per parent genre
    pub fn parent_counts(&self) -> Result<Vec<CountRow>> {
        self.grouped_counts(
            "SELECT genre_parent, COUNT(*) FROM tracks
             WHERE content_type = 'song' AND genre_parent IS NOT NULL
             GROUP BY genre_parent ORDER BY COUNT(*) DESC",
        )
    }

    fn grouped_counts(&self, sql: &str) -> Result<Vec<CountRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(CountRow {
                label: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
            })
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    /// Song counts per (parent, sub), grouped for the subgenre report
    pub fn sub_counts(&self) -> Result<Vec<(String, Option<String>, u64)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT genre_parent, genre_sub, COUNT(*) FROM tracks
             WHERE content_type = 'song' AND genre_parent IS NOT NULL
             GROUP BY genre_parent, genre_sub
             ORDER BY genre_parent, COUNT(*) DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, i64>(2)? as u64,
            ))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    /// Songs matching an optional parent/sub filter, ordered for playlists
    pub fn tracks_by_genre(
        &self,
        parent: Option<&str>,
        sub: Option<&str>,
    ) -> Result<Vec<Track>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = String::from("SELECT * FROM tracks WHERE content_type = 'song'");
        let mut bindings: Vec<&str> = Vec::new();
        if let Some(p) = parent {
            sql.push_str(" AND genre_parent = ?");
            bindings.push(p);
        }
        if let Some(s) = sub {
            sql.push_str(" AND genre_sub = ?");
            bindings.push(s);
        }
        sql.push_str(" ORDER BY artist, title");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(bindings), Track::from_row)?;

        let mut tracks = Vec::new();
        for row in rows {
            tracks.push(row?);
        }
        Ok(tracks)
    }

    /// Songs with no genre, ordered by directory for the report
    pub fn unclassified(&self) -> Result<Vec<Track>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM tracks
             WHERE content_type = 'song' AND genre_parent IS NULL
             ORDER BY directory, filename",
        )?;
        let rows = stmt.query_map([], Track::from_row)?;

        let mut tracks = Vec::new();
        for row in rows {
            tracks.push(row?);
        }
        Ok(tracks)
    }

    pub fn get_track_by_path(&self, path: &str) -> Result<Option<Track>> {
        let conn = self.conn.lock().unwrap();
        let track = conn
            .query_row(
                "SELECT * FROM tracks WHERE path = ?1",
                params![path],
                Track::from_row,
            )
            .optional()?;
        Ok(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned(path: &str, mtime: i64, filesize: u64) -> ScannedFile {
        let filename = path.rsplit('/').next().unwrap_or(path).to_string();
        let directory = path.rsplit_once('/').map(|(d, _)| d).unwrap_or("").to_string();
        ScannedFile {
            path: path.to_string(),
            filename,
            directory,
            filesize,
            mtime,
            content_type: "song".to_string(),
        }
    }

    #[test]
    fn upsert_preserves_classification() {
        let db = GenreDb::open_in_memory().unwrap();
        let id = db.upsert_track(&scanned("bass/track.mp3", 100, 1000)).unwrap();
        db.update_classification(id, "Bass", "Dubstep", "metadata", 0.9, "Dubstep")
            .unwrap();

        // Re-scan with a newer mtime
        let same_id = db.upsert_track(&scanned("bass/track.mp3", 200, 1000)).unwrap();
        assert_eq!(id, same_id);

        let track = db.get_track_by_path("bass/track.mp3").unwrap().unwrap();
        assert_eq!(track.mtime, 200);
        assert_eq!(track.genre_parent.as_deref(), Some("Bass"));
        assert_eq!(track.genre_sub.as_deref(), Some("Dubstep"));
        assert!(track.tagged);
    }

    #[test]
    fn needs_rescan_detects_changes() {
        let db = GenreDb::open_in_memory().unwrap();
        db.upsert_track(&scanned("a.mp3", 100, 1000)).unwrap();

        assert!(!db.needs_rescan("a.mp3", 100, 1000).unwrap());
        assert!(db.needs_rescan("a.mp3", 200, 1000).unwrap());
        assert!(db.needs_rescan("a.mp3", 100, 2000).unwrap());
        assert!(db.needs_rescan("missing.mp3", 0, 0).unwrap());
    }

    #[test]
    fn remove_track_drops_log_rows() {
        let db = GenreDb::open_in_memory().unwrap();
        let id = db.upsert_track(&scanned("a.mp3", 100, 1000)).unwrap();
        db.update_classification(id, "Bass", "Dubstep", "metadata", 0.9, "Dubstep")
            .unwrap();

        db.remove_track("a.mp3").unwrap();
        assert!(db.get_track_by_path("a.mp3").unwrap().is_none());
        assert_eq!(db.count_all().unwrap(), 0);
    }

    #[test]
    fn genre_counts_ignore_station_assets() {
        let db = GenreDb::open_in_memory().unwrap();

        let mut callsign = scanned("callsigns/id.mp3", 100, 500);
        callsign.content_type = "callsign".to_string();
        db.upsert_track(&callsign).unwrap();

        let id = db.upsert_track(&scanned("bass/track.mp3", 100, 1000)).unwrap();
        db.update_classification(id, "Bass", "Dubstep", "metadata", 0.9, "Dubstep")
            .unwrap();

        assert_eq!(db.count_all().unwrap(), 2);
        assert_eq!(db.count_songs().unwrap(), 1);
        assert_eq!(db.count_classified().unwrap(), 1);

        let parents = db.parent_counts().unwrap();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].label.as_deref(), Some("Bass"));
        assert_eq!(parents[0].count, 1);
    }

    #[test]
    fn tracks_by_genre_filters() {
        let db = GenreDb::open_in_memory().unwrap();
        for (path, parent, sub) in [
            ("a.mp3", "Bass", "Dubstep"),
            ("b.mp3", "Bass", "Grime"),
            ("c.mp3", "Jazz", "Swing"),
        ] {
            let id = db.upsert_track(&scanned(path, 100, 1000)).unwrap();
            db.update_classification(id, parent, sub, "metadata", 0.9, sub)
                .unwrap();
        }

        assert_eq!(db.tracks_by_genre(Some("Bass"), None).unwrap().len(), 2);
        assert_eq!(
            db.tracks_by_genre(Some("Bass"), Some("Grime")).unwrap().len(),
            1
        );
        assert_eq!(db.tracks_by_genre(None, None).unwrap().len(), 3);
    }
}
