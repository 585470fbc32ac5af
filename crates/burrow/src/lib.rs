// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A thread-local key-value cache with expiration and optimistic versioning.
//!
//! This crate provides [`Cache`], a small per-thread cache:
//!
//! 1. **Thread-Local Storage:** Every thread owns an independent store,
//!    addressed by a configurable namespace. Data never crosses threads, so
//!    operations are synchronous and lock-free, and cached values need
//!    neither `Send` nor `Sync`.
//! 2. **Lazy Expiration:** Entries carry an optional lifetime, checked
//!    against the cache's [`tick::Clock`]. Expired entries are deleted by
//!    the access that finds them, or by an explicit [`Cache::cleanup`]
//!    sweep - never by a background task.
//! 3. **Optimistic Versioning:** Entries carry an opaque version tag. A read
//!    requesting a different tag treats the entry as stale, removes it, and
//!    reports a miss - cheap invalidation without enumerating keys.
//! 4. **Testable Time:** The clock is injected, never constructed
//!    internally; tests freeze and advance time with `tick`'s
//!    `ClockControl` instead of sleeping.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use burrow::{Cache, Options};
//! use tick::Clock;
//!
//! let clock = Clock::new_frozen();
//! let cache = Cache::builder::<String>(clock)
//!     .namespace("sessions")
//!     .expires_in(Duration::from_secs(300))
//!     .build();
//!
//! cache.write("user:42", "alice".to_string(), &Options::new());
//! assert_eq!(cache.read("user:42", &Options::new()), Some("alice".to_string()));
//!
//! // Reads requesting a mismatched version invalidate the entry.
//! cache.write("config", "blue".to_string(), &Options::new().version("v1"));
//! assert_eq!(cache.read("config", &Options::new().version("v2")), None);
//! ```
//!
//! # Expiration
//!
//! An entry is expired once `created_at + expires_in` is not after the
//! clock's current time; a zero lifetime is expired immediately. Expiry is
//! lazy: entries stay in the store until an access or a [`Cache::cleanup`]
//! sweep finds them.
//!
//! ```
//! use std::time::Duration;
//!
//! use burrow::{Cache, Options};
//! use tick::ClockControl;
//!
//! let control = ClockControl::new();
//! let cache = Cache::builder::<i32>(control.to_clock()).build();
//!
//! cache.write("k", 1, &Options::new().expires_in(Duration::from_secs(10)));
//! assert_eq!(cache.read("k", &Options::new()), Some(1));
//!
//! control.advance(Duration::from_secs(10));
//! assert_eq!(cache.read("k", &Options::new()), None);
//! ```
//!
//! # Counters
//!
//! `Cache<i64>` additionally supports [`increment`](Cache::increment) and
//! [`decrement`](Cache::decrement), which treat a missing or invalid prior
//! entry as zero and rewrite the result with the call's options.
//!
//! # Batch Operations
//!
//! [`write_multi`](Cache::write_multi), [`read_multi`](Cache::read_multi),
//! and [`fetch_multi`](Cache::fetch_multi) accept one option set shared
//! across all keys, or per-key options by position or by key - see
//! [`MultiOptions`].
//!
//! # Features
//!
//! - **`logs`** - Structured `tracing` events for every cache operation.
//! - **`metrics`** - OpenTelemetry instruments: an event counter, an
//!   operation duration histogram, and a store size gauge.
//! - **`test-util`** - Enables `tick`'s controllable clocks for
//!   deterministic expiry tests. **Only enable this in `dev-dependencies`.**

mod builder;
mod cache;
mod entry;
mod options;
mod store;
mod telemetry;

pub use builder::CacheBuilder;
pub use cache::Cache;
pub use options::{MultiOptions, Options};
#[cfg(any(feature = "logs", feature = "metrics", test))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "logs", feature = "metrics"))))]
pub use telemetry::CacheTelemetry;
