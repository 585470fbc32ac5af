// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring caches.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use tick::Clock;

use crate::cache::Cache;
use crate::options::Options;
#[cfg(any(feature = "logs", feature = "metrics", test))]
use crate::telemetry::CacheTelemetry;

/// Namespace used when the builder is not given one.
const DEFAULT_NAMESPACE: &str = "default";

/// Builder for constructing a [`Cache`].
///
/// Created by calling [`Cache::builder`]. Allows configuring the namespace,
/// cache-level default options, and telemetry.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use burrow::Cache;
/// use tick::Clock;
///
/// let clock = Clock::new_frozen();
/// let cache = Cache::builder::<String>(clock)
///     .namespace("sessions")
///     .version("deploy-7")
///     .expires_in(Duration::from_secs(300))
///     .build();
/// ```
#[derive(Debug)]
pub struct CacheBuilder<V> {
    namespace: Option<String>,
    defaults: Options,
    clock: Clock,
    #[cfg(any(feature = "logs", feature = "metrics", test))]
    telemetry: Option<CacheTelemetry>,
    _values: PhantomData<fn() -> V>,
}

impl<V> CacheBuilder<V> {
    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            namespace: None,
            defaults: Options::new(),
            clock,
            #[cfg(any(feature = "logs", feature = "metrics", test))]
            telemetry: None,
            _values: PhantomData,
        }
    }

    /// Sets the namespace identifying this cache's per-thread stores.
    ///
    /// Handles built with the same namespace and value type address the same
    /// store on any given thread. Defaults to `"default"`.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the default version tag, applied when a call's options leave the
    /// version unset.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.defaults = self.defaults.version(version);
        self
    }

    /// Sets the default entry lifetime, applied when a call's options leave
    /// the expiration unset.
    #[must_use]
    pub fn expires_in(mut self, expires_in: Duration) -> Self {
        self.defaults = self.defaults.expires_in(expires_in);
        self
    }

    /// Attaches a telemetry collector; every cache operation is recorded
    /// through it.
    #[cfg(any(feature = "logs", feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(any(feature = "logs", feature = "metrics"))))]
    #[must_use]
    pub fn telemetry(mut self, telemetry: CacheTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Builds the configured cache handle.
    #[must_use]
    pub fn build(self) -> Cache<V> {
        Cache {
            namespace: Arc::from(self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)),
            clock: self.clock,
            defaults: self.defaults,
            #[cfg(any(feature = "logs", feature = "metrics", test))]
            telemetry: self.telemetry,
            _values: PhantomData,
        }
    }
}
