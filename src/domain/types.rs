//! Query-level value types shared by the feed and listing paths.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Optional read-state filter applied to a subscriber feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadFilter {
    #[default]
    Any,
    Read,
    Unread,
}

impl ReadFilter {
    /// Parse the `is_read` query parameter. Absent or blank means no filter.
    pub fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Any),
            Some(value) => parse_flag(value, "is_read").map(Self::from),
        }
    }

    pub fn matches(self, is_read: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Read => is_read,
            Self::Unread => !is_read,
        }
    }
}

impl From<bool> for ReadFilter {
    fn from(value: bool) -> Self {
        if value { Self::Read } else { Self::Unread }
    }
}

/// Parse a boolean flag the way form and query payloads send it.
pub fn parse_flag(raw: &str, field: &'static str) -> Result<bool, DomainError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(DomainError::validation(field, "must be boolean")),
    }
}

/// Ordering applied to the author listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorOrdering {
    PostCountAsc,
    PostCountDesc,
}

impl FromStr for AuthorOrdering {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "count_post" => Ok(Self::PostCountAsc),
            "-count_post" => Ok(Self::PostCountDesc),
            other => Err(DomainError::validation(
                "o",
                format!("unsupported ordering `{other}`"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_filter_accepts_mixed_case() {
        assert_eq!(ReadFilter::parse(Some("TRUE")).unwrap(), ReadFilter::Read);
        assert_eq!(ReadFilter::parse(Some("False")).unwrap(), ReadFilter::Unread);
        assert_eq!(ReadFilter::parse(Some("1")).unwrap(), ReadFilter::Read);
    }

    #[test]
    fn read_filter_absent_or_blank_is_unfiltered() {
        assert_eq!(ReadFilter::parse(None).unwrap(), ReadFilter::Any);
        assert_eq!(ReadFilter::parse(Some("  ")).unwrap(), ReadFilter::Any);
    }

    #[test]
    fn read_filter_rejects_garbage() {
        let err = ReadFilter::parse(Some("maybe")).expect_err("invalid flag");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "is_read",
                ..
            }
        ));
    }

    #[test]
    fn read_filter_matches() {
        assert!(ReadFilter::Any.matches(true));
        assert!(ReadFilter::Any.matches(false));
        assert!(ReadFilter::Read.matches(true));
        assert!(!ReadFilter::Read.matches(false));
        assert!(ReadFilter::Unread.matches(false));
        assert!(!ReadFilter::Unread.matches(true));
    }

    #[test]
    fn author_ordering_parses_both_directions() {
        assert_eq!(
            "count_post".parse::<AuthorOrdering>().unwrap(),
            AuthorOrdering::PostCountAsc
        );
        assert_eq!(
            "-count_post".parse::<AuthorOrdering>().unwrap(),
            AuthorOrdering::PostCountDesc
        );
        assert!("username".parse::<AuthorOrdering>().is_err());
    }
}
