//! Registry tags.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// The floating tag every push also updates.
pub const LATEST: &str = "latest";

/// Second-precision timestamp used when nothing better is available.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// A single registry tag. Computed right before a push and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub version: String,
    pub is_latest: bool,
}

impl Tag {
    pub fn versioned(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            is_latest: false,
        }
    }

    pub fn latest() -> Self {
        Self {
            version: LATEST.to_owned(),
            is_latest: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

/// Where a resolved version tag came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    Revision,
    Explicit,
    Timestamp,
}

impl fmt::Display for TagSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Revision => "revision",
            Self::Explicit => "explicit",
            Self::Timestamp => "timestamp",
        })
    }
}

/// The versioned tag plus `latest`, in push order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagPair {
    pub version: Tag,
    pub latest: Tag,
    pub source: TagSource,
}

impl TagPair {
    /// Versioned first, then `latest`.
    pub fn in_push_order(&self) -> [&Tag; 2] {
        [&self.version, &self.latest]
    }
}

/// Pick the version tag: revision hash, else explicit tag, else timestamp.
///
/// Blank inputs count as missing.
pub fn resolve_version_tag(
    revision: Option<&str>,
    explicit: &str,
    now: NaiveDateTime,
) -> TagPair {
    let (version, source) = match revision.map(str::trim).filter(|r| !r.is_empty()) {
        Some(hash) => (hash.to_owned(), TagSource::Revision),
        None if !explicit.trim().is_empty() => (explicit.trim().to_owned(), TagSource::Explicit),
        None => (now.format(TIMESTAMP_FORMAT).to_string(), TagSource::Timestamp),
    };

    TagPair {
        version: Tag::versioned(version),
        latest: Tag::latest(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 5)
            .unwrap()
    }

    #[test]
    fn revision_wins_over_everything() {
        let pair = resolve_version_tag(Some("a1b2c3d"), "v1.2.0", noon());
        assert_eq!(pair.version.as_str(), "a1b2c3d");
        assert_eq!(pair.source, TagSource::Revision);
        assert!(!pair.version.is_latest);
    }

    #[test]
    fn explicit_tag_when_no_revision() {
        let pair = resolve_version_tag(None, "v1.2.0", noon());
        assert_eq!(pair.version.as_str(), "v1.2.0");
        assert_eq!(pair.source, TagSource::Explicit);
    }

    #[test]
    fn timestamp_as_last_resort() {
        let pair = resolve_version_tag(Some("  "), "", noon());
        assert_eq!(pair.version.as_str(), "20260314-120005");
        assert_eq!(pair.source, TagSource::Timestamp);
    }

    #[test]
    fn latest_is_always_second() {
        let pair = resolve_version_tag(None, "", noon());
        let [first, second] = pair.in_push_order();
        assert!(!first.is_latest);
        assert!(second.is_latest);
        assert_eq!(second.to_string(), "latest");
    }
}
