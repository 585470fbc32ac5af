// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-call options for cache operations.
//!
//! Every cache operation takes an [`Options`] value. Fields left unset fall
//! back to the cache-level defaults configured on the builder. The batch
//! operations instead take a [`MultiOptions`], which resolves one shared
//! option set, a positional sequence, or a by-key map.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

/// Options applied to a single cache operation.
///
/// Constructed with chainable setters; unset fields inherit the cache-level
/// defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use burrow::Options;
///
/// let options = Options::new()
///     .version("v2")
///     .expires_in(Duration::from_secs(30));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub(crate) version: Option<String>,
    pub(crate) expires_in: Option<Duration>,
    pub(crate) expires_at: Option<SystemTime>,
    pub(crate) skip_none: bool,
    pub(crate) force: bool,
}

impl Options {
    /// Options with every field unset, used when a batch option source has
    /// no entry for a key.
    pub(crate) const DEFAULT: Self = Self {
        version: None,
        expires_in: None,
        expires_at: None,
        skip_none: false,
        force: false,
    };

    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the version tag for this operation.
    ///
    /// On write, the tag is stored with the entry. On read, an entry whose
    /// stored tag differs from the requested one is treated as invalid and
    /// removed. Versions are opaque and compared only for equality.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the relative lifetime of the written entry.
    ///
    /// A zero duration produces an entry that is already expired.
    #[must_use]
    pub fn expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Sets an absolute expiration deadline for the written entry.
    ///
    /// Converted to a relative lifetime at write time; takes precedence over
    /// [`expires_in`](Self::expires_in) when both are set. A deadline in the
    /// past produces an entry that is already expired.
    #[must_use]
    pub fn expires_at(mut self, expires_at: impl Into<SystemTime>) -> Self {
        self.expires_at = Some(expires_at.into());
        self
    }

    /// When set, a write whose value resolves to `None` stores nothing.
    ///
    /// Without this, an absent value is cached as a real entry that reads
    /// back as `None` until it expires or is deleted.
    #[must_use]
    pub fn skip_none(mut self, skip_none: bool) -> Self {
        self.skip_none = skip_none;
        self
    }

    /// When set, [`fetch`](crate::Cache::fetch) bypasses the read and always
    /// runs the producer, overwriting whatever is stored.
    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Overlays these options on top of cache-level defaults.
    pub(crate) fn with_defaults(&self, defaults: &Self) -> Self {
        Self {
            version: self.version.clone().or_else(|| defaults.version.clone()),
            expires_in: self.expires_in.or(defaults.expires_in),
            expires_at: self.expires_at,
            skip_none: self.skip_none,
            force: self.force,
        }
    }

    /// Resolves the effective lifetime at write time.
    ///
    /// `expires_at` wins over `expires_in`; a deadline already in the past
    /// collapses to a zero lifetime.
    pub(crate) fn effective_ttl(&self, now: SystemTime) -> Option<Duration> {
        match self.expires_at {
            Some(deadline) => Some(deadline.duration_since(now).unwrap_or(Duration::ZERO)),
            None => self.expires_in,
        }
    }
}

/// Option source for the batch operations.
///
/// A batch call takes one option set shared across all keys, a positional
/// sequence with one entry per key, or a map keyed by cache key. Positions
/// or keys without a matching entry resolve to default options.
///
/// # Examples
///
/// ```
/// use burrow::{MultiOptions, Options};
///
/// let shared = Options::new().version("v1");
/// let multi = MultiOptions::from(&shared);
///
/// let per_key = [Options::new(), Options::new().version("v2")];
/// let multi = MultiOptions::from(per_key.as_slice());
/// ```
#[derive(Clone, Copy, Debug)]
pub enum MultiOptions<'a> {
    /// One option set applied to every key.
    Shared(&'a Options),
    /// One option set per key, matched by position.
    Each(&'a [Options]),
    /// Option sets matched by key.
    ByKey(&'a HashMap<String, Options>),
}

impl MultiOptions<'_> {
    /// Resolves the options for the key at `index`.
    pub(crate) fn resolve(&self, index: usize, key: &str) -> &Options {
        match self {
            Self::Shared(options) => options,
            Self::Each(options) => options.get(index).unwrap_or(&Options::DEFAULT),
            Self::ByKey(options) => options.get(key).unwrap_or(&Options::DEFAULT),
        }
    }
}

impl<'a> From<&'a Options> for MultiOptions<'a> {
    fn from(options: &'a Options) -> Self {
        Self::Shared(options)
    }
}

impl<'a> From<&'a [Options]> for MultiOptions<'a> {
    fn from(options: &'a [Options]) -> Self {
        Self::Each(options)
    }
}

impl<'a> From<&'a HashMap<String, Options>> for MultiOptions<'a> {
    fn from(options: &'a HashMap<String, Options>) -> Self {
        Self::ByKey(options)
    }
}
