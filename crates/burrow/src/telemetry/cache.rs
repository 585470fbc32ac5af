// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry implementation and recording.

use std::sync::Arc;
use std::time::Duration;

#[cfg(any(feature = "logs", test))]
use opentelemetry::logs::Severity;
use opentelemetry::{
    KeyValue,
    metrics::{Counter, Gauge, Histogram, Meter},
};

use crate::telemetry::{
    CacheActivity, CacheOperation, CacheTelemetry, attributes,
    metrics::{create_event_counter, create_operation_duration_histogram, create_store_size_gauge},
};

#[derive(Clone, Debug)]
pub(crate) struct CacheTelemetryInner {
    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(dead_code, reason = "log emission requires the `logs` feature")
    )]
    logging_enabled: bool,
    event_counter: Option<Counter<u64>>,
    operation_duration: Option<Histogram<f64>>,
    store_size: Option<Gauge<u64>>,
}

impl CacheTelemetry {
    /// Creates a new cache telemetry collector.
    ///
    /// # Arguments
    ///
    /// * `logging_enabled` - Whether operations emit `tracing` events
    ///   (requires the `logs` feature to have any effect)
    /// * `meter` - The meter to register instruments with; `None` disables
    ///   metrics
    #[must_use]
    pub fn new(logging_enabled: bool, meter: Option<&Meter>) -> Self {
        Self {
            inner: Arc::new(CacheTelemetryInner {
                logging_enabled,
                event_counter: meter.map(create_event_counter),
                operation_duration: meter.map(create_operation_duration_histogram),
                store_size: meter.map(create_store_size_gauge),
            }),
        }
    }

    /// Records a cache operation.
    #[inline]
    pub(crate) fn record(&self, namespace: &str, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        let attrs = [
            KeyValue::new(attributes::CACHE_NAMESPACE, namespace.to_string()),
            KeyValue::new(attributes::CACHE_OPERATION_NAME, operation.as_str()),
            KeyValue::new(attributes::CACHE_ACTIVITY_NAME, activity.as_str()),
        ];

        if let Some(counter) = &self.inner.event_counter {
            counter.add(1, &attrs);
        }

        if let (Some(duration), Some(histogram)) = (duration, &self.inner.operation_duration) {
            histogram.record(duration.as_secs_f64(), &attrs);
        }

        #[cfg(any(feature = "logs", test))]
        if self.inner.logging_enabled {
            Self::emit(namespace, operation, activity, duration);
        }
    }

    /// Records the current size of the calling thread's store.
    #[inline]
    pub(crate) fn record_size(&self, namespace: &str, size: usize) {
        if let Some(gauge) = &self.inner.store_size {
            let attrs = [KeyValue::new(attributes::CACHE_NAMESPACE, namespace.to_string())];
            gauge.record(u64::try_from(size).unwrap_or(u64::MAX), &attrs);
        }
    }

    #[cfg(any(feature = "logs", test))]
    fn emit(namespace: &str, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        let op = operation.as_str();
        let act = activity.as_str();
        let duration_ns = duration.map(|d| d.as_nanos());

        // Tracing level must be constant, so we use a macro to select the appropriate level.
        // Field names must match constants in attributes.rs - see the emit tests below.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.namespace = namespace,
                    cache.operation = op,
                    cache.activity = act,
                    cache.duration_ns = ?duration_ns,
                    "cache.event"
                )
            };
        }

        match activity.severity() {
            Severity::Error => emit_event!(error),
            Severity::Info => emit_event!(info),
            Severity::Debug => emit_event!(debug),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::telemetry::metrics::create_meter;
    use crate::telemetry::testing::{LogCapture, MetricTester};

    #[test]
    fn metrics_record_emits_correct_attributes() {
        let tester = MetricTester::new();
        let meter = create_meter(tester.meter_provider());
        let telemetry = CacheTelemetry::new(false, Some(&meter));

        telemetry.record(
            "my_cache",
            CacheOperation::Read,
            CacheActivity::Hit,
            Some(Duration::from_millis(5)),
        );

        tester.assert_attributes_contain(&[
            KeyValue::new(attributes::CACHE_NAMESPACE, "my_cache"),
            KeyValue::new(attributes::CACHE_OPERATION_NAME, CacheOperation::Read.as_str()),
            KeyValue::new(attributes::CACHE_ACTIVITY_NAME, CacheActivity::Hit.as_str()),
        ]);
    }

    #[test]
    fn metrics_record_size_emits_namespace() {
        let tester = MetricTester::new();
        let meter = create_meter(tester.meter_provider());
        let telemetry = CacheTelemetry::new(false, Some(&meter));

        telemetry.record_size("size_test_cache", 42);

        tester.assert_attributes_contain(&[KeyValue::new(attributes::CACHE_NAMESPACE, "size_test_cache")]);
    }

    #[test]
    fn logs_emit_contains_all_fields_and_values() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        CacheTelemetry::emit(
            "my_test_cache",
            CacheOperation::Delete,
            CacheActivity::Deleted,
            Some(Duration::from_nanos(12345)),
        );

        // Verify field names
        capture.assert_contains(attributes::CACHE_NAMESPACE);
        capture.assert_contains(attributes::CACHE_OPERATION_NAME);
        capture.assert_contains(attributes::CACHE_ACTIVITY_NAME);
        capture.assert_contains(attributes::CACHE_DURATION_NAME);
        capture.assert_contains(attributes::CACHE_EVENT_NAME);

        // Verify values
        capture.assert_contains("my_test_cache");
        capture.assert_contains(CacheOperation::Delete.as_str());
        capture.assert_contains(CacheActivity::Deleted.as_str());
    }

    #[test]
    fn logs_emit_at_correct_severity_levels() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        CacheTelemetry::emit("cache", CacheOperation::Read, CacheActivity::Expired, None);
        capture.assert_contains("INFO");

        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        CacheTelemetry::emit("cache", CacheOperation::Read, CacheActivity::Hit, None);
        capture.assert_contains("DEBUG");
    }

    #[test]
    fn telemetry_disabled_emits_nothing() {
        // No meter, no logs
        let telemetry = CacheTelemetry::new(false, None);

        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        // This should not panic and should not emit logs
        telemetry.record("cache", CacheOperation::Read, CacheActivity::Hit, Some(Duration::from_secs(1)));

        assert!(capture.output().is_empty());
    }
}
