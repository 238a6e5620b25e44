//! A metrics recorder that periodically logs the dispatch counters.

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Renders a metric key as `name{label=value,...}`, or just `name` when it
/// carries no labels.
pub fn metric_key(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|label| format!("{}={}", label.key(), label.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

/// Counter storage shared between the recorder and its logging task.
type CounterMap = Arc<Mutex<BTreeMap<String, Arc<AtomicU64>>>>;

/// Records counters in memory and logs them on an interval.
///
/// Gauges and histograms are accepted but dropped.
#[derive(Clone, Debug, Default)]
pub struct LoggingRecorder {
    counters: CounterMap,
}

impl LoggingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of every counter seen so far, ordered by key.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .iter()
            .map(|(key, value)| (key.clone(), value.load(Ordering::Relaxed)))
            .collect()
    }

    /// Value of one counter, keyed as rendered by [`metric_key`].
    pub fn counter(&self, key: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(key)
            .map(|value| value.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Spawns a task that logs a snapshot every `interval`, and once more
    /// when `shutdown_rx` fires.
    pub fn spawn_logger(&self, interval: Duration, mut shutdown_rx: watch::Receiver<()>) -> JoinHandle<()> {
        let recorder = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => recorder.log_snapshot(),
                    _ = shutdown_rx.changed() => {
                        recorder.log_snapshot();
                        break;
                    }
                }
            }
        })
    }

    fn log_snapshot(&self) {
        for (key, value) in self.snapshot() {
            info!("[Counter] {}: {}", key, value);
        }
    }
}

impl Recorder for LoggingRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        let counter = counters.entry(metric_key(key)).or_default().clone();
        Counter::from_arc(counter)
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}
