//! # knobgenre - media library genre indexer
//!
//! Offline tooling for the station's music collection: walk the media
//! root, index every audio file into SQLite, classify songs against a
//! fixed genre taxonomy from their tags (with directory-name fallback),
//! then report on the result or export playlists.
//!
//! The index feeds playlist curation for the scheduled stations; the
//! running appliance never touches it.

pub mod config_ext;
pub mod db;
pub mod error;
pub mod metadata;
pub mod report;
pub mod scanner;
pub mod taxonomy;

pub use config_ext::MediaConfigExt;
pub use db::{GenreDb, Track};
pub use error::{Error, Result};
pub use metadata::run_metadata_pass;
pub use scanner::{ScanStats, scan_to_db};
