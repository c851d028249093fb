//! Note identity: the 12-digit timestamp token embedded in every note filename

use chrono::{DateTime, TimeZone};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Number of consecutive ASCII digits that make up a note identifier (yyyyMMddhhmm)
pub const ID_LEN: usize = 12;

/// A note identifier: exactly twelve ASCII digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(String);

impl NoteId {
    /// Find the first window of twelve consecutive digits in `s`.
    ///
    /// A longer run of digits yields its first twelve.
    pub fn find_in(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        let mut run_start = 0;
        let mut run_len = 0;

        for (i, b) in bytes.iter().enumerate() {
            if b.is_ascii_digit() {
                if run_len == 0 {
                    run_start = i;
                }
                run_len += 1;
                if run_len == ID_LEN {
                    return Some(Self(s[run_start..run_start + ID_LEN].to_string()));
                }
            } else {
                run_len = 0;
            }
        }

        None
    }

    /// Extract the identifier from a note's filename stem
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(Self::find_in)
    }

    /// Build the identifier for a point in time (minute resolution)
    pub fn from_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(time.format("%Y%m%d%H%M").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse an identifier from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_LEN {
            return Err(IdParseError::InvalidLength(s.to_string()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdParseError::NonDigit(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

/// Errors that can occur when parsing note identifiers
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("note id '{0}' must be exactly 12 digits long")]
    InvalidLength(String),

    #[error("note id '{0}' contains non-digit characters")]
    NonDigit(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    #[test]
    fn test_find_in_filename_stem() {
        let id = NoteId::find_in("202401010000-a").unwrap();
        assert_eq!(id.as_str(), "202401010000");
    }

    #[test]
    fn test_find_in_middle_of_name() {
        let id = NoteId::find_in("draft_202403151245_ideas").unwrap();
        assert_eq!(id.as_str(), "202403151245");
    }

    #[test]
    fn test_find_in_takes_first_window_of_long_run() {
        let id = NoteId::find_in("x20240101000099").unwrap();
        assert_eq!(id.as_str(), "202401010000");
    }

    #[test]
    fn test_find_in_skips_short_runs() {
        let id = NoteId::find_in("v2-2024-202401010000").unwrap();
        assert_eq!(id.as_str(), "202401010000");
        assert!(NoteId::find_in("20240101000").is_none());
        assert!(NoteId::find_in("2024-01-01-0000").is_none());
    }

    #[test]
    fn test_from_path_ignores_extension_and_parents() {
        let path = PathBuf::from("/notes/202301010101/readme.adoc");
        assert!(NoteId::from_path(&path).is_none());

        let path = PathBuf::from("/notes/sub/202401020000-c.adoc");
        assert_eq!(NoteId::from_path(&path).unwrap().as_str(), "202401020000");
    }

    #[test]
    fn test_from_timestamp() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 59).unwrap();
        assert_eq!(NoteId::from_timestamp(&time).as_str(), "202403090705");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(matches!(
            NoteId::parse("2024"),
            Err(IdParseError::InvalidLength(_))
        ));
        assert!(matches!(
            NoteId::parse("2024010100ab"),
            Err(IdParseError::NonDigit(_))
        ));
        assert!(NoteId::parse("202401010000").is_ok());
    }
}
