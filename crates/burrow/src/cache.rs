// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cache handle and its operations.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tick::Clock;

use crate::builder::CacheBuilder;
use crate::entry::Entry;
use crate::options::{MultiOptions, Options};
use crate::store;
#[cfg(any(feature = "logs", feature = "metrics", test))]
use crate::telemetry::CacheTelemetry;
use crate::telemetry::{CacheActivity, CacheOperation};

/// A handle to a per-thread key-value cache.
///
/// Every thread that touches the cache gets its own independent store,
/// addressed by the cache's namespace. The handle itself is cheap to clone
/// and freely shareable across threads; the cached data never moves between
/// threads, which is why all operations are synchronous, lock-free, and
/// `V` needs neither `Send` nor `Sync`.
///
/// Entries expire lazily: an expired or version-mismatched entry is deleted
/// by the next access that finds it, or by an explicit [`cleanup`](Self::cleanup)
/// sweep.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use burrow::{Cache, Options};
/// use tick::Clock;
///
/// let clock = Clock::new_frozen();
/// let cache = Cache::builder::<i32>(clock).namespace("scores").build();
///
/// cache.write("alice", 10, &Options::new());
/// assert_eq!(cache.read("alice", &Options::new()), Some(10));
/// assert_eq!(cache.read("bob", &Options::new()), None);
/// ```
///
/// # Versioning
///
/// ```
/// use burrow::{Cache, Options};
/// use tick::Clock;
///
/// let clock = Clock::new_frozen();
/// let cache = Cache::builder::<i32>(clock).build();
///
/// cache.write("config", 1, &Options::new().version("v1"));
///
/// // A read requesting a different version invalidates the entry.
/// assert_eq!(cache.read("config", &Options::new().version("v2")), None);
/// assert_eq!(cache.read("config", &Options::new()), None);
/// ```
#[derive(Clone, Debug)]
pub struct Cache<V> {
    pub(crate) namespace: Arc<str>,
    pub(crate) clock: Clock,
    pub(crate) defaults: Options,
    #[cfg(any(feature = "logs", feature = "metrics", test))]
    pub(crate) telemetry: Option<CacheTelemetry>,
    pub(crate) _values: PhantomData<fn() -> V>,
}

/// Outcome of looking up a key in the calling thread's store.
enum Lookup<V> {
    Missing,
    Invalid(CacheActivity),
    Hit(Option<V>),
}

impl Cache<()> {
    /// Creates a new cache builder.
    ///
    /// The clock is injected rather than constructed internally so that
    /// tests can control the passage of time.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::Cache;
    /// use tick::Clock;
    ///
    /// let clock = Clock::new_frozen();
    /// let cache = Cache::builder::<String>(clock).namespace("sessions").build();
    /// ```
    #[must_use]
    pub fn builder<V>(clock: Clock) -> CacheBuilder<V> {
        CacheBuilder::new(clock)
    }
}

impl<V> Cache<V> {
    /// Returns the namespace identifying this cache's per-thread stores.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns a reference to the cache's clock.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

impl<V> Cache<V>
where
    V: Clone + 'static,
{
    /// Stores a value under `key` with the effective version and expiration.
    ///
    /// The value parameter accepts both `V` and `Option<V>`. When it resolves
    /// to `None` and `skip_none` is set, nothing is stored and `false` is
    /// returned; otherwise the absent value is cached as a real entry that
    /// reads back as `None`.
    ///
    /// An existing entry under the same key is overwritten unconditionally.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use burrow::{Cache, Options};
    /// use tick::Clock;
    ///
    /// let clock = Clock::new_frozen();
    /// let cache = Cache::builder::<i32>(clock).build();
    ///
    /// assert!(cache.write("a", 1, &Options::new().expires_in(Duration::from_secs(60))));
    ///
    /// // `skip_none` turns an absent value into a no-op.
    /// assert!(!cache.write("b", None::<i32>, &Options::new().skip_none(true)));
    /// ```
    pub fn write<T>(&self, key: impl Into<String>, value: T, options: &Options) -> bool
    where
        T: Into<Option<V>>,
    {
        let options = options.with_defaults(&self.defaults);
        self.write_entry(key.into(), value.into(), &options, CacheOperation::Write)
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `None` when the key is missing, the entry has expired, or the
    /// entry's version mismatches the effective requested version. Invalid
    /// entries are deleted as a side effect of being found.
    #[must_use]
    pub fn read(&self, key: &str, options: &Options) -> Option<V> {
        let options = options.with_defaults(&self.defaults);
        self.read_entry(key, &options, CacheOperation::Read).flatten()
    }

    /// Reads the value under `key`, computing and storing it on a miss.
    ///
    /// A valid entry is returned as-is, including a cached absent value.
    /// Otherwise the producer runs and its result is written (subject to
    /// `skip_none`) and returned. With `force`, the read is bypassed and the
    /// producer always runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Cache, Options};
    /// use tick::Clock;
    ///
    /// let clock = Clock::new_frozen();
    /// let cache = Cache::builder::<String>(clock).build();
    ///
    /// let value = cache.fetch("greeting", &Options::new(), || "hello".to_string());
    /// assert_eq!(value.as_deref(), Some("hello"));
    ///
    /// // Subsequent fetches hit the cache; the producer's result is unused.
    /// let value = cache.fetch("greeting", &Options::new(), || "ignored".to_string());
    /// assert_eq!(value.as_deref(), Some("hello"));
    /// ```
    pub fn fetch<T>(&self, key: impl Into<String>, options: &Options, producer: impl FnOnce() -> T) -> Option<V>
    where
        T: Into<Option<V>>,
    {
        let key = key.into();
        let options = options.with_defaults(&self.defaults);

        if !options.force {
            if let Some(cached) = self.read_entry(&key, &options, CacheOperation::Fetch) {
                return cached;
            }
        }

        let computed: Option<V> = producer().into();
        self.record(CacheOperation::Fetch, CacheActivity::Computed, None);
        self.write_entry(key, computed.clone(), &options, CacheOperation::Fetch);
        computed
    }

    /// Returns `true` if a valid entry exists under `key`.
    ///
    /// A cached absent value counts as existing. Shares read's lazy-expiry
    /// side effect: an invalid entry found by this check is deleted.
    #[must_use]
    pub fn contains(&self, key: &str, options: &Options) -> bool {
        let options = options.with_defaults(&self.defaults);
        self.read_entry(key, &options, CacheOperation::Read).is_some()
    }

    /// Removes the entry under `key` regardless of its validity.
    ///
    /// Returns `true` if an entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        let (removed, len) = store::with_store::<V, _>(&self.namespace, |store| (store.remove(key).is_some(), store.len()));
        if removed {
            self.record(CacheOperation::Delete, CacheActivity::Deleted, None);
        }
        self.record_size(len);
        removed
    }

    /// Removes every listed key, returning how many entries were removed.
    pub fn delete_multi<I>(&self, keys: I) -> usize
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let (removed, len) = store::with_store::<V, _>(&self.namespace, |store| {
            let removed = keys.into_iter().filter(|key| store.remove(key.as_ref()).is_some()).count();
            (removed, store.len())
        });
        if removed > 0 {
            self.record(CacheOperation::Delete, CacheActivity::Deleted, None);
        }
        self.record_size(len);
        removed
    }

    /// Removes every entry whose key matches `pattern`, regardless of
    /// validity. Returns how many entries were removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Cache, Options};
    /// use regex::Regex;
    /// use tick::Clock;
    ///
    /// let clock = Clock::new_frozen();
    /// let cache = Cache::builder::<i32>(clock).build();
    ///
    /// cache.write("user:1", 1, &Options::new());
    /// cache.write("user:2", 2, &Options::new());
    /// cache.write("group:1", 3, &Options::new());
    ///
    /// let pattern = Regex::new("^user:").unwrap();
    /// assert_eq!(cache.delete_matched(&pattern), 2);
    /// assert_eq!(cache.read("group:1", &Options::new()), Some(3));
    /// ```
    pub fn delete_matched(&self, pattern: &Regex) -> usize {
        let (removed, len) = store::with_store::<V, _>(&self.namespace, |store| {
            let before = store.len();
            store.retain(|key, _| !pattern.is_match(key));
            (before - store.len(), store.len())
        });
        if removed > 0 {
            self.record(CacheOperation::Delete, CacheActivity::Deleted, None);
        }
        self.record_size(len);
        removed
    }

    /// Sweeps the calling thread's store, deleting every entry that is
    /// expired or mismatches the effective requested version.
    ///
    /// Returns the deleted keys in store order (unordered).
    pub fn cleanup(&self, options: &Options) -> Vec<String> {
        let stopwatch = self.clock.stopwatch();
        let options = options.with_defaults(&self.defaults);
        let now = self.clock.system_time();
        let requested = options.version.as_deref();

        let (swept, len) = store::with_store::<V, _>(&self.namespace, |store| {
            let invalid: Vec<String> = store
                .iter()
                .filter(|(_, entry)| entry.is_expired(now) || entry.mismatches(requested))
                .map(|(key, _)| key.clone())
                .collect();
            for key in &invalid {
                store.remove(key);
            }
            (invalid, store.len())
        });

        self.record(CacheOperation::Sweep, CacheActivity::Swept, Some(stopwatch.elapsed()));
        self.record_size(len);
        swept
    }

    /// Drops every entry in the calling thread's store for this namespace.
    pub fn clear(&self) {
        store::with_store::<V, _>(&self.namespace, hashbrown::HashMap::clear);
        self.record(CacheOperation::Delete, CacheActivity::Cleared, None);
        self.record_size(0);
    }

    /// Returns the raw number of entries in the calling thread's store.
    ///
    /// Expired-but-unswept entries count until they are accessed or cleaned
    /// up.
    #[must_use]
    pub fn len(&self) -> usize {
        store::with_store::<V, _>(&self.namespace, |store| store.len())
    }

    /// Returns `true` if the calling thread's store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores multiple entries in one call.
    ///
    /// `options` accepts a shared [`Options`], a positional `&[Options]`, or
    /// a by-key map; see [`MultiOptions`]. Returns how many entries were
    /// stored (entries skipped via `skip_none` are not counted).
    pub fn write_multi<'a, K, T, I>(&self, entries: I, options: impl Into<MultiOptions<'a>>) -> usize
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Option<V>>,
    {
        let options = options.into();
        let mut written = 0;
        for (index, (key, value)) in entries.into_iter().enumerate() {
            let key = key.into();
            let per_key = options.resolve(index, &key).with_defaults(&self.defaults);
            if self.write_entry(key, value.into(), &per_key, CacheOperation::Write) {
                written += 1;
            }
        }
        written
    }

    /// Reads multiple keys in one call, returning only the hits.
    ///
    /// Each key resolves its own options through [`MultiOptions`]. Invalid
    /// entries are deleted on the way, exactly as with [`read`](Self::read).
    /// Cached absent values do not appear in the result.
    #[must_use]
    pub fn read_multi<'a, K, I>(&self, keys: I, options: impl Into<MultiOptions<'a>>) -> HashMap<String, V>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let options = options.into();
        let mut found = HashMap::new();
        for (index, key) in keys.into_iter().enumerate() {
            let key = key.into();
            let per_key = options.resolve(index, &key).with_defaults(&self.defaults);
            if let Some(value) = self.read_entry(&key, &per_key, CacheOperation::Read).flatten() {
                found.insert(key, value);
            }
        }
        found
    }

    /// Reads multiple keys, computing and storing values for the misses.
    ///
    /// The producer receives each missing key. Computed absent values are
    /// subject to that key's `skip_none` and never appear in the result.
    /// With `force` on a key, its producer always runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Cache, Options};
    /// use tick::Clock;
    ///
    /// let clock = Clock::new_frozen();
    /// let cache = Cache::builder::<String>(clock).build();
    ///
    /// cache.write("a", "cached".to_string(), &Options::new());
    ///
    /// let values = cache.fetch_multi(["a", "b"], &Options::new(), |key| format!("computed {key}"));
    /// assert_eq!(values["a"], "cached");
    /// assert_eq!(values["b"], "computed b");
    /// ```
    pub fn fetch_multi<'a, K, T, I>(
        &self,
        keys: I,
        options: impl Into<MultiOptions<'a>>,
        mut producer: impl FnMut(&str) -> T,
    ) -> HashMap<String, V>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        T: Into<Option<V>>,
    {
        let options = options.into();
        let mut found = HashMap::new();
        for (index, key) in keys.into_iter().enumerate() {
            let key = key.into();
            let per_key = options.resolve(index, &key).with_defaults(&self.defaults);

            let cached = if per_key.force {
                None
            } else {
                self.read_entry(&key, &per_key, CacheOperation::Fetch)
            };
            let value = match cached {
                Some(cached) => cached,
                None => {
                    let computed: Option<V> = producer(&key).into();
                    self.record(CacheOperation::Fetch, CacheActivity::Computed, None);
                    self.write_entry(key.clone(), computed.clone(), &per_key, CacheOperation::Fetch);
                    computed
                }
            };
            if let Some(value) = value {
                found.insert(key, value);
            }
        }
        found
    }

    /// Looks up `key`, deleting it if invalid.
    ///
    /// The outer `Option` distinguishes a valid entry from a miss; the inner
    /// one carries the (possibly absent) cached value. Expects `options` to
    /// already have defaults applied.
    fn read_entry(&self, key: &str, options: &Options, operation: CacheOperation) -> Option<Option<V>> {
        let stopwatch = self.clock.stopwatch();
        let now = self.clock.system_time();
        let requested = options.version.as_deref();

        let lookup = store::with_store::<V, _>(&self.namespace, |store| {
            let decision = store.get(key).map(|entry| {
                if entry.is_expired(now) {
                    Lookup::Invalid(CacheActivity::Expired)
                } else if entry.mismatches(requested) {
                    Lookup::Invalid(CacheActivity::Mismatched)
                } else {
                    Lookup::Hit(entry.value().cloned())
                }
            });
            match decision {
                None => Lookup::Missing,
                Some(Lookup::Invalid(activity)) => {
                    store.remove(key);
                    Lookup::Invalid(activity)
                }
                Some(found) => found,
            }
        });

        match lookup {
            Lookup::Missing => {
                self.record(operation, CacheActivity::Miss, Some(stopwatch.elapsed()));
                None
            }
            Lookup::Invalid(activity) => {
                self.record(operation, activity, Some(stopwatch.elapsed()));
                None
            }
            Lookup::Hit(value) => {
                self.record(operation, CacheActivity::Hit, Some(stopwatch.elapsed()));
                Some(value)
            }
        }
    }

    /// Stores `value` under `key`. Expects `options` to already have
    /// defaults applied.
    fn write_entry(&self, key: String, value: Option<V>, options: &Options, operation: CacheOperation) -> bool {
        let stopwatch = self.clock.stopwatch();

        if value.is_none() && options.skip_none {
            self.record(operation, CacheActivity::Skipped, Some(stopwatch.elapsed()));
            return false;
        }

        let now = self.clock.system_time();
        let entry = Entry::new(value, options.version.clone(), options.effective_ttl(now), now);
        let len = store::with_store::<V, _>(&self.namespace, |store| {
            store.insert(key, entry);
            store.len()
        });

        self.record(operation, CacheActivity::Written, Some(stopwatch.elapsed()));
        self.record_size(len);
        true
    }

    #[cfg(any(feature = "logs", feature = "metrics", test))]
    fn record(&self, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.record(&self.namespace, operation, activity, duration);
        }
    }

    #[cfg(not(any(feature = "logs", feature = "metrics", test)))]
    #[expect(clippy::unused_self, reason = "signature parity with the telemetry-enabled build")]
    fn record(&self, _operation: CacheOperation, _activity: CacheActivity, _duration: Option<Duration>) {}

    #[cfg(any(feature = "logs", feature = "metrics", test))]
    fn record_size(&self, size: usize) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.record_size(&self.namespace, size);
        }
    }

    #[cfg(not(any(feature = "logs", feature = "metrics", test)))]
    #[expect(clippy::unused_self, reason = "signature parity with the telemetry-enabled build")]
    fn record_size(&self, _size: usize) {}
}

/// Counter operations for integer caches.
impl Cache<i64> {
    /// Adds `amount` to the integer stored under `key` and returns the new
    /// value.
    ///
    /// A missing, expired, mismatched, or absent prior value counts as zero.
    /// The result is rewritten with the same options, so the effective
    /// version and expiration apply to the updated entry. Arithmetic wraps
    /// on overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Cache, Options};
    /// use tick::Clock;
    ///
    /// let clock = Clock::new_frozen();
    /// let cache = Cache::builder::<i64>(clock).build();
    ///
    /// assert_eq!(cache.increment("hits", 1, &Options::new()), 1);
    /// assert_eq!(cache.increment("hits", 2, &Options::new()), 3);
    /// assert_eq!(cache.decrement("hits", 3, &Options::new()), 0);
    /// ```
    pub fn increment(&self, key: impl Into<String>, amount: i64, options: &Options) -> i64 {
        let key = key.into();
        let options = options.with_defaults(&self.defaults);
        let current = self.read_entry(&key, &options, CacheOperation::Counter).flatten().unwrap_or(0);
        let updated = current.wrapping_add(amount);
        self.write_entry(key, Some(updated), &options, CacheOperation::Counter);
        updated
    }

    /// Subtracts `amount` from the integer stored under `key` and returns
    /// the new value. See [`increment`](Self::increment).
    pub fn decrement(&self, key: impl Into<String>, amount: i64, options: &Options) -> i64 {
        self.increment(key, amount.wrapping_neg(), options)
    }
}
