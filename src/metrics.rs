// Render metrics module
//
// Lightweight counters for a render batch, shared between the scheduler and its tasks

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Render batch metrics
///
/// Uses atomic operations so render tasks can record progress without locks.
/// `peak_in_flight` is the highest number of conversions observed running at
/// the same time and must never exceed the batch concurrency ceiling.
#[derive(Debug)]
pub struct RenderMetrics {
    /// Conversions started
    pub tasks_started: AtomicUsize,

    /// Conversions that finished successfully
    pub tasks_completed: AtomicUsize,

    /// Conversions that failed
    pub tasks_failed: AtomicUsize,

    /// Conversions cancelled before they finished
    pub tasks_aborted: AtomicUsize,

    /// Conversions currently running
    pub in_flight: AtomicUsize,

    /// Highest value `in_flight` has reached
    pub peak_in_flight: AtomicUsize,

    /// Sum of per-conversion wall time in milliseconds
    pub total_render_time_ms: AtomicU64,

    start_time: Instant,
}

impl RenderMetrics {
    pub fn new() -> Self {
        Self {
            tasks_started: AtomicUsize::new(0),
            tasks_completed: AtomicUsize::new(0),
            tasks_failed: AtomicUsize::new(0),
            tasks_aborted: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            total_render_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a conversion starting
    pub fn record_started(&self) {
        self.tasks_started.fetch_add(1, Ordering::Relaxed);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
    }

    /// Record a conversion finishing, successfully or not
    pub fn record_finished(&self, duration: Duration, success: bool) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.total_render_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);

        if success {
            self.tasks_completed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.tasks_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a conversion cancelled while running
    pub fn record_aborted(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.tasks_aborted.fetch_add(1, Ordering::Relaxed);
    }

    /// Start tracking one conversion.
    ///
    /// Dropping the returned guard without calling [`InFlightGuard::finish`]
    /// counts the conversion as aborted.
    pub fn track(self: &Arc<Self>) -> InFlightGuard {
        self.record_started();
        InFlightGuard {
            metrics: Arc::clone(self),
            started: Instant::now(),
            done: false,
        }
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Time since the metrics were created
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average conversion time in milliseconds
    pub fn avg_render_time_ms(&self) -> f64 {
        let total = self.total_render_time_ms.load(Ordering::Relaxed);
        let count = self.tasks_completed.load(Ordering::Relaxed)
            + self.tasks_failed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Render Metrics Summary ===");
        tracing::info!("Elapsed: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Tasks: {} started, {} completed, {} failed, {} aborted",
            self.tasks_started.load(Ordering::Relaxed),
            self.tasks_completed.load(Ordering::Relaxed),
            self.tasks_failed.load(Ordering::Relaxed),
            self.tasks_aborted.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Total render time: {:.2}s (avg: {:.2}ms per file), peak concurrency: {}",
            self.total_render_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_render_time_ms(),
            self.peak()
        );
    }
}

impl Default for RenderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// One running conversion, see [`RenderMetrics::track`]
#[derive(Debug)]
pub struct InFlightGuard {
    metrics: Arc<RenderMetrics>,
    started: Instant,
    done: bool,
}

impl InFlightGuard {
    pub fn finish(mut self, success: bool) {
        self.done = true;
        self.metrics.record_finished(self.started.elapsed(), success);
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.done {
            self.metrics.record_aborted();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = RenderMetrics::new();
        assert_eq!(metrics.tasks_started.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.peak(), 0);
    }

    #[test]
    fn test_peak_tracks_overlap() {
        let metrics = RenderMetrics::new();

        metrics.record_started();
        metrics.record_started();
        metrics.record_finished(Duration::from_millis(10), true);
        metrics.record_started();
        metrics.record_finished(Duration::from_millis(10), true);
        metrics.record_finished(Duration::from_millis(10), false);

        assert_eq!(metrics.peak(), 2);
        assert_eq!(metrics.in_flight.load(Ordering::SeqCst), 0);
        assert_eq!(metrics.tasks_completed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.tasks_failed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_avg_render_time() {
        let metrics = RenderMetrics::new();

        metrics.record_started();
        metrics.record_finished(Duration::from_millis(100), true);
        metrics.record_started();
        metrics.record_finished(Duration::from_millis(200), true);

        assert_eq!(metrics.total_render_time_ms.load(Ordering::Relaxed), 300);
        assert_eq!(metrics.avg_render_time_ms(), 150.0);
    }

    #[test]
    fn test_avg_render_time_empty() {
        assert_eq!(RenderMetrics::new().avg_render_time_ms(), 0.0);
    }

    #[test]
    fn test_uptime() {
        let metrics = RenderMetrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }

    #[test]
    fn test_dropped_guard_counts_as_aborted() {
        let metrics = Arc::new(RenderMetrics::new());

        let finished = metrics.track();
        let cancelled = metrics.track();
        assert_eq!(metrics.in_flight.load(Ordering::SeqCst), 2);

        finished.finish(false);
        drop(cancelled);

        assert_eq!(metrics.in_flight.load(Ordering::SeqCst), 0);
        assert_eq!(metrics.tasks_started.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.tasks_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.tasks_aborted.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.tasks_completed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_concurrent_recording() {
        let metrics = Arc::new(RenderMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    metrics.record_started();
                    metrics.record_finished(Duration::from_millis(1), true);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.tasks_completed.load(Ordering::Relaxed), 8);
        assert!(metrics.peak() >= 1 && metrics.peak() <= 8);
    }
}
