// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The stored representation of a cached value.

use std::time::{Duration, SystemTime};

/// A cached value with versioning and expiration metadata.
///
/// The value is an `Option` so that a deliberately cached "nothing" is
/// representable: such an entry still carries a version, still expires, and
/// still occupies its key, but reads as absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Entry<V> {
    value: Option<V>,
    version: Option<String>,
    expires_in: Option<Duration>,
    created_at: SystemTime,
}

impl<V> Entry<V> {
    /// Creates a new entry stamped with the given creation time.
    pub fn new(value: Option<V>, version: Option<String>, expires_in: Option<Duration>, created_at: SystemTime) -> Self {
        Self {
            value,
            version,
            expires_in,
            created_at,
        }
    }

    /// Returns a reference to the cached value, if one was stored.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Returns the stored version tag, if any.
    #[cfg(test)]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns `true` if the entry's lifetime has elapsed at `now`.
    ///
    /// Entries without `expires_in` never expire. A deadline that is not
    /// representable as a `SystemTime` is treated the same way.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.expires_in
            .and_then(|ttl| self.created_at.checked_add(ttl))
            .is_some_and(|deadline| deadline <= now)
    }

    /// Returns `true` if both the stored and the requested version are set
    /// and differ.
    ///
    /// An unversioned entry matches any request, and an unversioned request
    /// matches any entry.
    pub fn mismatches(&self, requested: Option<&str>) -> bool {
        match (self.version.as_deref(), requested) {
            (Some(stored), Some(requested)) => stored != requested,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn entry_without_ttl_never_expires() {
        let entry = Entry::new(Some(1), None, None, at(0));
        assert!(!entry.is_expired(at(1_000_000_000_000)));
    }

    #[test]
    fn entry_expires_exactly_at_deadline() {
        let entry = Entry::new(Some(1), None, Some(TTL), at(100));
        assert!(!entry.is_expired(at(159)));
        assert!(entry.is_expired(at(160)));
        assert!(entry.is_expired(at(161)));
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let entry = Entry::new(Some(1), None, Some(Duration::ZERO), at(100));
        assert!(entry.is_expired(at(100)));
    }

    #[test]
    fn unrepresentable_deadline_never_expires() {
        let entry = Entry::new(Some(1), None, Some(Duration::MAX), at(100));
        assert!(!entry.is_expired(at(200)));
    }

    #[test]
    fn version_comparison_is_strict_only_when_both_present() {
        let versioned = Entry::new(Some(1), Some("v1".to_string()), None, at(0));
        assert!(!versioned.mismatches(None));
        assert!(!versioned.mismatches(Some("v1")));
        assert!(versioned.mismatches(Some("v2")));

        let unversioned = Entry::<i32>::new(Some(1), None, None, at(0));
        assert!(!unversioned.mismatches(None));
        assert!(!unversioned.mismatches(Some("v1")));
    }

    #[test]
    fn cached_none_is_a_real_entry() {
        let entry = Entry::<i32>::new(None, Some("v1".to_string()), Some(TTL), at(0));
        assert!(entry.value().is_none());
        assert_eq!(entry.version(), Some("v1"));
        assert!(entry.is_expired(at(60)));
    }
}
