// Copyright (c) Microsoft Corporation.

//! Per-Thread Counters Example
//!
//! Each thread owns an independent store, so the same counter key tracks a
//! separate tally on every thread without any synchronization.

use std::thread;

use burrow::{Cache, Options};
use tick::runtime::InactiveClock;

fn main() {
    let (clock, _driver) = InactiveClock::default().activate();
    let cache = Cache::builder::<i64>(clock).namespace("request-stats").build();

    let mut handles = Vec::new();
    for worker in 0..4 {
        let cache = cache.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..=worker {
                cache.increment("handled", 1, &Options::new());
            }
            let handled = cache.read("handled", &Options::new());
            println!("worker {worker} handled {handled:?} requests");
        }));
    }

    for handle in handles {
        let _ = handle.join();
    }

    // The spawning thread never touched its own counter.
    println!("main thread handled {:?} requests", cache.read("handled", &Options::new()));
}
