//! Configuration extension for the genre indexer

use anyhow::Result;
use knobconfig::Config;
use serde_yaml::Value;

use crate::scanner::DEFAULT_MEDIA_ROOT;

/// Default index location, on the media volume itself
pub const DEFAULT_GENRE_DB: &str = "/media/radio/genre_index.db";

/// Extension trait adding media library settings to `knobconfig::Config`
pub trait MediaConfigExt {
    /// Root of the station's media library
    fn get_media_root(&self) -> Result<String>;
    fn set_media_root(&self, root: &str) -> Result<()>;

    /// Path of the genre index database
    fn get_genre_db_path(&self) -> Result<String>;
    fn set_genre_db_path(&self, path: &str) -> Result<()>;
}

impl MediaConfigExt for Config {
    fn get_media_root(&self) -> Result<String> {
        match self.get_value(&["media", "root"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => {
                self.set_media_root(DEFAULT_MEDIA_ROOT)?;
                Ok(DEFAULT_MEDIA_ROOT.to_string())
            }
        }
    }

    fn set_media_root(&self, root: &str) -> Result<()> {
        self.set_value(&["media", "root"], Value::String(root.to_string()))
    }

    fn get_genre_db_path(&self) -> Result<String> {
        match self.get_value(&["media", "genre_db"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => {
                self.set_genre_db_path(DEFAULT_GENRE_DB)?;
                Ok(DEFAULT_GENRE_DB.to_string())
            }
        }
    }

    fn set_genre_db_path(&self, path: &str) -> Result<()> {
        self.set_value(&["media", "genre_db"], Value::String(path.to_string()))
    }
}
