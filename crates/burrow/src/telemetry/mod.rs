// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Telemetry integration for cache operations.
//!
//! When the `logs` feature is enabled, cache operations emit structured
//! `tracing` events. When the `metrics` feature is enabled, operations are
//! recorded to OpenTelemetry instruments. Construct a [`CacheTelemetry`] and
//! pass it to the cache builder via `.telemetry()`.

#[cfg(any(feature = "logs", feature = "metrics", test))]
use std::sync::Arc;

#[cfg(any(feature = "logs", feature = "metrics", test))]
use cache::CacheTelemetryInner;
#[cfg(any(feature = "logs", feature = "metrics", test))]
use opentelemetry::logs::Severity;

#[cfg(any(feature = "logs", feature = "metrics", test))]
pub(crate) mod attributes;
#[cfg(any(feature = "logs", feature = "metrics", test))]
pub(crate) mod cache;
#[cfg(any(feature = "logs", feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

/// Telemetry collector recording cache operations as logs and metrics.
///
/// Cloning is cheap; clones share the same instruments.
#[derive(Clone, Debug)]
pub struct CacheTelemetry {
    #[cfg(any(feature = "logs", feature = "metrics", test))]
    inner: Arc<CacheTelemetryInner>,
}

/// The cache operation being recorded.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CacheOperation {
    Read,
    Write,
    Fetch,
    Delete,
    Sweep,
    Counter,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "cache.read",
            Self::Write => "cache.write",
            Self::Fetch => "cache.fetch",
            Self::Delete => "cache.delete",
            Self::Sweep => "cache.sweep",
            Self::Counter => "cache.counter",
        }
    }
}

/// What the operation observed or did.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Expired,
    Mismatched,
    Written,
    Skipped,
    Computed,
    Deleted,
    Swept,
    Cleared,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Expired => "cache.expired",
            Self::Mismatched => "cache.mismatched",
            Self::Written => "cache.written",
            Self::Skipped => "cache.skipped",
            Self::Computed => "cache.computed",
            Self::Deleted => "cache.deleted",
            Self::Swept => "cache.swept",
            Self::Cleared => "cache.cleared",
        }
    }

    #[cfg(any(feature = "logs", feature = "metrics", test))]
    pub fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss | Self::Skipped => Severity::Debug,
            Self::Expired | Self::Mismatched | Self::Written | Self::Computed | Self::Deleted | Self::Swept | Self::Cleared => {
                Severity::Info
            }
        }
    }
}
