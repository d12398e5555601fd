//! Observers for resolution and lifecycle events.
//!
//! Every definition a graph resolves or tears down is reported to the
//! observers registered with [`Graph::add_observer`](crate::Graph::add_observer).
//! Calls are synchronous and happen on the resolving thread, so keep
//! implementations cheap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::InjectError;
use crate::slot::SlotRef;

/// Hooks for resolution and lifecycle events.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Graph, GraphObserver, InjectError, Provider, Slot, SlotRef};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder(Mutex<Vec<String>>);
///
/// impl GraphObserver for Recorder {
///     fn resolving(&self, slot: &SlotRef) {
///         self.0.lock().unwrap().push(format!("resolving {}", slot.label()));
///     }
///
///     fn resolved(&self, slot: &SlotRef, _duration: Duration) {
///         self.0.lock().unwrap().push(format!("resolved {}", slot.label()));
///     }
///
///     fn failed(&self, slot: &SlotRef, _error: &InjectError) {
///         self.0.lock().unwrap().push(format!("failed {}", slot.label()));
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let answer: Slot<u32> = Slot::named("answer");
///
/// let mut graph = Graph::default();
/// graph.add_observer(recorder.clone());
/// graph.define(&answer, Provider::new(|| 42u32, vec![]).unwrap()).unwrap();
/// graph.resolve(&answer).unwrap();
///
/// assert_eq!(
///     *recorder.0.lock().unwrap(),
///     vec!["resolving answer".to_string(), "resolved answer".to_string()]
/// );
/// ```
pub trait GraphObserver: Send + Sync {
    /// A definition is about to run its provider.
    fn resolving(&self, slot: &SlotRef);

    /// A definition produced, cached and stored its value.
    fn resolved(&self, slot: &SlotRef, duration: Duration);

    /// A definition's provider failed. Reported once per definition on the
    /// failing path, innermost first.
    fn failed(&self, slot: &SlotRef, error: &InjectError);

    fn initialized(&self, _slot: &SlotRef) {}

    fn finalized(&self, _slot: &SlotRef) {}
}

/// Registered observers, notified in registration order.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn GraphObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn GraphObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn resolving(&self, slot: &SlotRef) {
        for observer in &self.observers {
            observer.resolving(slot);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, slot: &SlotRef, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(slot, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, slot: &SlotRef, error: &InjectError) {
        for observer in &self.observers {
            observer.failed(slot, error);
        }
    }

    #[inline]
    pub(crate) fn initialized(&self, slot: &SlotRef) {
        for observer in &self.observers {
            observer.initialized(slot);
        }
    }

    #[inline]
    pub(crate) fn finalized(&self, slot: &SlotRef) {
        for observer in &self.observers {
            observer.finalized(slot);
        }
    }
}

/// Observer that forwards every event to `tracing`.
///
/// Events are emitted under the `ferrous_inject` target: progress at
/// `debug`, failures at `warn`.
///
/// ```
/// use ferrous_inject::{Graph, LoggingObserver};
/// use std::sync::Arc;
///
/// let mut graph = Graph::default();
/// graph.add_observer(Arc::new(LoggingObserver::with_prefix("[app]")));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-inject]".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphObserver for LoggingObserver {
    fn resolving(&self, slot: &SlotRef) {
        tracing::debug!(target: "ferrous_inject", slot = %slot.label(), ty = slot.type_key().name(), "{} resolving", self.prefix);
    }

    fn resolved(&self, slot: &SlotRef, duration: Duration) {
        tracing::debug!(target: "ferrous_inject", slot = %slot.label(), ?duration, "{} resolved", self.prefix);
    }

    fn failed(&self, slot: &SlotRef, error: &InjectError) {
        tracing::warn!(target: "ferrous_inject", slot = %slot.label(), %error, "{} resolution failed", self.prefix);
    }

    fn initialized(&self, slot: &SlotRef) {
        tracing::debug!(target: "ferrous_inject", slot = %slot.label(), "{} initialized", self.prefix);
    }

    fn finalized(&self, slot: &SlotRef) {
        tracing::debug!(target: "ferrous_inject", slot = %slot.label(), "{} finalized", self.prefix);
    }
}

/// Observer that counts resolutions, failures and time spent in providers.
///
/// Durations are inclusive: a definition's time covers the resolution of
/// its own dependencies.
#[derive(Default)]
pub struct MetricsObserver {
    resolutions: AtomicU64,
    failures: AtomicU64,
    total_nanos: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution_count(&self) -> u64 {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed))
    }

    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        Some(self.total_resolution_time() / count as u32)
    }

    pub fn reset(&self) {
        self.resolutions.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.total_nanos.store(0, Ordering::Relaxed);
    }
}

impl GraphObserver for MetricsObserver {
    fn resolving(&self, _slot: &SlotRef) {}

    fn resolved(&self, _slot: &SlotRef, duration: Duration) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn failed(&self, _slot: &SlotRef, _error: &InjectError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Slot;

    #[test]
    fn metrics_accumulate_and_reset() {
        let metrics = MetricsObserver::new();
        let slot: Slot<u8> = Slot::new();
        let slot = slot.erased();

        assert_eq!(metrics.average_resolution_time(), None);
        metrics.resolved(&slot, Duration::from_millis(2));
        metrics.resolved(&slot, Duration::from_millis(4));
        metrics.failed(&slot, &InjectError::UnsetSlot("x".into()));

        assert_eq!(metrics.resolution_count(), 2);
        assert_eq!(metrics.failure_count(), 1);
        assert_eq!(metrics.average_resolution_time(), Some(Duration::from_millis(3)));

        metrics.reset();
        assert_eq!(metrics.resolution_count(), 0);
        assert_eq!(metrics.total_resolution_time(), Duration::ZERO);
    }

    #[test]
    fn observers_fan_out_in_order() {
        let first = Arc::new(MetricsObserver::new());
        let second = Arc::new(MetricsObserver::new());
        let mut observers = Observers::default();
        observers.add(first.clone());
        observers.add(second.clone());
        assert_eq!(observers.len(), 2);

        let slot: Slot<u8> = Slot::new();
        observers.resolved(&slot.erased(), Duration::from_nanos(10));
        assert_eq!(first.resolution_count(), 1);
        assert_eq!(second.resolution_count(), 1);
    }
}
