//! Stored cache records and their validity rules.

use serde::{Deserialize, Serialize};

/// When a record stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expiry {
    /// The record never expires.
    Never,
    /// The record expires at this Unix timestamp.
    At(i64),
}

impl Expiry {
    /// Build from a nullable timestamp column.
    pub fn from_timestamp(expire: Option<i64>) -> Self {
        expire.map_or(Expiry::Never, Expiry::At)
    }

    /// The timestamp, `0` standing for "never".
    pub fn timestamp(self) -> i64 {
        match self {
            Expiry::Never => 0,
            Expiry::At(ts) => ts,
        }
    }
}

/// A cached value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    /// Stored data.
    pub data: String,
    /// Optional grouping tag.
    pub tag: Option<String>,
    /// Expiry timestamp, `None` for an infinite lifetime.
    pub expire: Option<i64>,
    /// Creation timestamp.
    pub created: i64,
}

impl CacheRecord {
    /// The record's expiry if it is still valid at `now`.
    pub fn validity(&self, now: i64) -> Option<Expiry> {
        match self.expire {
            None => Some(Expiry::Never),
            Some(ts) if ts > now => Some(Expiry::At(ts)),
            Some(_) => None,
        }
    }

    /// Whether `load` may return the data when probed at `at`.
    pub fn loadable(&self, bypass_check: bool, at: i64) -> bool {
        bypass_check || self.expire.is_none_or(|ts| at <= ts)
    }
}

/// Whether `tag` is one of `tags`.
pub(crate) fn tagged(tag: Option<&str>, tags: &[&str]) -> bool {
    tag.is_some_and(|tag| tags.contains(&tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expire: Option<i64>) -> CacheRecord {
        CacheRecord {
            data: "data".to_string(),
            tag: None,
            expire,
            created: 0,
        }
    }

    #[test]
    fn test_validity() {
        assert_eq!(record(None).validity(100), Some(Expiry::Never));
        assert_eq!(record(Some(200)).validity(100), Some(Expiry::At(200)));
        assert_eq!(record(Some(100)).validity(100), None);
        assert_eq!(record(Some(50)).validity(100), None);
    }

    #[test]
    fn test_loadable() {
        assert!(record(None).loadable(false, 1_000));
        assert!(record(Some(200)).loadable(false, 200));
        assert!(!record(Some(200)).loadable(false, 201));
        assert!(record(Some(200)).loadable(true, 201));
    }

    #[test]
    fn test_expiry_timestamp() {
        assert_eq!(Expiry::Never.timestamp(), 0);
        assert_eq!(Expiry::from_timestamp(Some(12)), Expiry::At(12));
        assert_eq!(Expiry::from_timestamp(None), Expiry::Never);
    }

    #[test]
    fn test_tagged() {
        assert!(tagged(Some("a"), &["a", "b"]));
        assert!(!tagged(Some("c"), &["a", "b"]));
        assert!(!tagged(None, &["a"]));
        assert!(!tagged(Some("a"), &[]));
    }
}
