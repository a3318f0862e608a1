//! Liquidsoap server command protocol
//!
//! The wire format is plain lines: one command, newline, and a response
//! terminated by a line containing `END`. When the session is closed with
//! `quit`, Liquidsoap appends a `Bye!` line. Both trailers are protocol
//! noise and are stripped before the response reaches callers.

use crate::error::{Error, Result};

/// Response trailer closing every command reply
pub const END_MARKER: &str = "END";

/// Session trailer sent after `quit`
pub const BYE_MARKER: &str = "Bye!";

/// The closed set of commands this client will put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `station.get` - name of the station currently on air
    StationGet,
    /// `station.set <name>` - switch to the named station
    StationSet(String),
    /// `help` - list of registered server commands
    Help,
    /// `list` - server state listing
    List,
    /// `quit` - close the session
    Quit,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::StationGet => write!(f, "station.get"),
            Command::StationSet(name) => write!(f, "station.set {}", name),
            Command::Help => write!(f, "help"),
            Command::List => write!(f, "list"),
            Command::Quit => write!(f, "quit"),
        }
    }
}

/// Validates a station name before it is interpolated into `station.set`
///
/// Names come from operator input; restricting them to letters, digits,
/// spaces and `_ - ' .` keeps newlines and command separators off the
/// wire.
pub fn validate_station_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidStationName(name.to_string()));
    }

    let ok = trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-' | '\'' | '.'));
    if !ok {
        return Err(Error::InvalidStationName(name.to_string()));
    }

    Ok(())
}

/// Strips protocol trailers from a raw response
///
/// Removes trailing `END` and `Bye!` lines (in any order, however many the
/// session produced) and trims surrounding whitespace.
pub fn strip_trailers(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();

    while let Some(last) = lines.last() {
        let trimmed = last.trim();
        if trimmed == END_MARKER || trimmed == BYE_MARKER || trimmed.is_empty() {
            lines.pop();
        } else {
            break;
        }
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        assert_eq!(Command::StationGet.to_string(), "station.get");
        assert_eq!(
            Command::StationSet("AUTODJ".to_string()).to_string(),
            "station.set AUTODJ"
        );
        assert_eq!(Command::Help.to_string(), "help");
        assert_eq!(Command::List.to_string(), "list");
        assert_eq!(Command::Quit.to_string(), "quit");
    }

    #[test]
    fn test_strip_trailers() {
        assert_eq!(strip_trailers("AUTODJ\nEND\nBye!\n"), "AUTODJ");
        assert_eq!(strip_trailers("AUTODJ\nEND"), "AUTODJ");
        assert_eq!(strip_trailers("line one\nline two\nEND\nBye!"), "line one\nline two");
        assert_eq!(strip_trailers("END\nBye!"), "");
        assert_eq!(strip_trailers(""), "");
    }

    #[test]
    fn test_strip_trailers_keeps_interior_end() {
        // A payload line that merely contains END is not a trailer
        let raw = "THE END of an era\nEND\nBye!";
        assert_eq!(strip_trailers(raw), "THE END of an era");
    }

    #[test]
    fn test_validate_station_name() {
        assert!(validate_station_name("AUTODJ").is_ok());
        assert!(validate_station_name("Pandora's Box").is_ok());
        assert!(validate_station_name("Noisefloor").is_ok());
        assert!(validate_station_name("late-night_mix.2").is_ok());

        assert!(validate_station_name("").is_err());
        assert!(validate_station_name("   ").is_err());
        assert!(validate_station_name("bad\nstation.set other").is_err());
        assert!(validate_station_name("semi;colon").is_err());
    }
}
