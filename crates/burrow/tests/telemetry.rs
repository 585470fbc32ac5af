// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(all(feature = "logs", feature = "metrics"))]

//! Integration tests for telemetry wired through the cache builder.

use burrow::{Cache, CacheTelemetry, Options};
use opentelemetry::metrics::MeterProvider;
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, SdkMeterProvider};
use tick::Clock;

fn instrumented(namespace: &str) -> (InMemoryMetricExporter, SdkMeterProvider, Cache<i32>) {
    let exporter = InMemoryMetricExporter::default();
    let provider = SdkMeterProvider::builder().with_periodic_exporter(exporter.clone()).build();
    let meter = provider.meter("burrow");

    let cache = Cache::builder::<i32>(Clock::new_frozen())
        .namespace(namespace)
        .telemetry(CacheTelemetry::new(false, Some(&meter)))
        .build();

    (exporter, provider, cache)
}

fn metric_names(exporter: &InMemoryMetricExporter, provider: &SdkMeterProvider) -> Vec<String> {
    provider.force_flush().expect("force flush succeeds in tests");
    exporter
        .get_finished_metrics()
        .expect("in-memory exporter yields metrics")
        .iter()
        .flat_map(opentelemetry_sdk::metrics::data::ResourceMetrics::scope_metrics)
        .flat_map(opentelemetry_sdk::metrics::data::ScopeMetrics::metrics)
        .map(|metric| metric.name().to_string())
        .collect()
}

#[test]
fn operations_record_event_counts_and_durations() {
    let (exporter, provider, cache) = instrumented("tm_events");

    cache.write("k", 1, &Options::new());
    assert_eq!(cache.read("k", &Options::new()), Some(1));
    assert_eq!(cache.read("missing", &Options::new()), None);

    let names = metric_names(&exporter, &provider);
    assert!(names.iter().any(|name| name == "cache.event.count"), "got: {names:?}");
    assert!(names.iter().any(|name| name == "cache.operation.duration"), "got: {names:?}");
}

#[test]
fn mutations_record_the_store_size() {
    let (exporter, provider, cache) = instrumented("tm_size");

    cache.write("k", 1, &Options::new());
    cache.delete("k");

    let names = metric_names(&exporter, &provider);
    assert!(names.iter().any(|name| name == "cache.size"), "got: {names:?}");
}

#[test]
fn telemetry_does_not_change_cache_semantics() {
    let (_exporter, _provider, cache) = instrumented("tm_semantics");

    cache.write("k", 1, &Options::new().version("v1"));
    assert_eq!(cache.read("k", &Options::new().version("v2")), None);
    assert!(cache.is_empty());
}
