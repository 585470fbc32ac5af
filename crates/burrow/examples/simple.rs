// Copyright (c) Microsoft Corporation.

//! Simple Cache Example
//!
//! Demonstrates basic cache operations: write, read, fetch, delete.

use std::time::Duration;

use burrow::{Cache, Options};
use tick::runtime::InactiveClock;

fn main() {
    let (clock, _driver) = InactiveClock::default().activate();

    // Build a cache whose entries expire after 5 seconds by default
    let cache = Cache::builder::<String>(clock)
        .namespace("users")
        .expires_in(Duration::from_secs(5))
        .build();

    // Store a value
    cache.write("user:1", "Alice".to_string(), &Options::new());

    // Read it back (returns Some("Alice"))
    let value = cache.read("user:1", &Options::new());
    println!("user:1 = {value:?}");

    // Fetch computes and caches on a miss
    let value = cache.fetch("user:2", &Options::new(), || "Bob".to_string());
    println!("user:2 = {value:?}");

    // A versioned write is invalidated by a read requesting another version
    cache.write("config", "blue".to_string(), &Options::new().version("v1"));
    let stale = cache.read("config", &Options::new().version("v2"));
    println!("config under v2 = {stale:?}");

    // Delete a key
    cache.delete("user:1");
    println!("user:1 after delete = {:?}", cache.read("user:1", &Options::new()));
}
