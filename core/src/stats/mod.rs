//! Runtime counters for the viewer: load latency, cache effectiveness and discarded work.
//!
//! The session records into a shared [`StatsCollector`]; the embedding shell can poll
//! [`StatsCollector::snapshot`] for a debug overlay.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::warn;

const DEFAULT_SAMPLE_CAPACITY: usize = 240;

#[derive(Debug, Default)]
struct SampleWindow {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleWindow {
    fn new(capacity: usize) -> Self {
        Self { samples: VecDeque::with_capacity(capacity), capacity }
    }

    fn push(&mut self, value: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    fn percentile(&self, percentile: f32) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }

        let mut sorted: Vec<f32> = self.samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let rank = percentile.clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
        let index = rank.round() as usize;
        sorted.get(index).copied().unwrap_or(0.0)
    }

    fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.samples.iter().copied().sum();
        sum / self.samples.len() as f32
    }
}

#[derive(Debug)]
struct StatsInner {
    started_at: Instant,
    load_times_ms: SampleWindow,
    decode_times_ms: SampleWindow,
    cache_requests: u64,
    cache_hits: u64,
    cache_entries: usize,
    cache_capacity: usize,
    prefetch_pending: usize,
    stale_completions: u64,
    failed_loads: u64,
}

impl Default for StatsInner {
    fn default() -> Self {
        Self {
            started_at: Instant::now(),
            load_times_ms: SampleWindow::new(DEFAULT_SAMPLE_CAPACITY),
            decode_times_ms: SampleWindow::new(DEFAULT_SAMPLE_CAPACITY),
            cache_requests: 0,
            cache_hits: 0,
            cache_entries: 0,
            cache_capacity: 0,
            prefetch_pending: 0,
            stale_completions: 0,
            failed_loads: 0,
        }
    }
}

/// Thread-safe counter collection shared between the session and the shell.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: parking_lot::Mutex<StatsInner>,
}

impl StatsCollector {
    /// Create a new collector with default sampling capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the time from issuing a lightbox image request to its completion.
    pub fn record_load(&self, duration: Duration) {
        let mut guard = self.inner.lock();
        guard.load_times_ms.push(duration.as_secs_f64() as f32 * 1_000.0);
    }

    /// Record the time spent decoding a fetched image.
    pub fn record_decode(&self, duration: Duration) {
        let mut guard = self.inner.lock();
        guard.decode_times_ms.push(duration.as_secs_f64() as f32 * 1_000.0);
    }

    /// Record whether a cache lookup produced a hit.
    pub fn record_cache_lookup(&self, hit: bool) {
        let mut guard = self.inner.lock();
        guard.cache_requests = guard.cache_requests.saturating_add(1);
        if hit {
            guard.cache_hits = guard.cache_hits.saturating_add(1);
        }
    }

    pub fn update_cache_usage(&self, entries: usize, capacity: usize) {
        let mut guard = self.inner.lock();
        guard.cache_entries = entries;
        guard.cache_capacity = capacity;
    }

    /// Update the number of pending prefetch operations.
    pub fn update_prefetch_pending(&self, pending: usize) {
        let mut guard = self.inner.lock();
        guard.prefetch_pending = pending;
    }

    /// A completion arrived for a photo the viewer had already moved away from.
    pub fn record_stale_completion(&self) {
        let mut guard = self.inner.lock();
        guard.stale_completions = guard.stale_completions.saturating_add(1);
    }

    pub fn record_failed_load(&self) {
        let mut guard = self.inner.lock();
        guard.failed_loads = guard.failed_loads.saturating_add(1);
    }

    /// Generate a snapshot of the current metrics for presentation to the UI.
    pub fn snapshot(&self) -> ViewerStats {
        let guard = self.inner.lock();

        let uptime = guard.started_at.elapsed();
        let cache_requests = guard.cache_requests.max(1);
        let cache_hit_ratio = guard.cache_hits as f32 / cache_requests as f32;

        ViewerStats {
            timestamp_ms: now_ms(),
            uptime_ms: uptime.as_millis() as u64,
            load_time_ms_mean: guard.load_times_ms.mean(),
            load_time_ms_p50: guard.load_times_ms.percentile(0.50),
            load_time_ms_p95: guard.load_times_ms.percentile(0.95),
            decode_time_ms_p50: guard.decode_times_ms.percentile(0.50),
            decode_time_ms_p95: guard.decode_times_ms.percentile(0.95),
            cache_hit_ratio,
            cache_requests: guard.cache_requests,
            cache_entries: guard.cache_entries,
            cache_capacity: guard.cache_capacity,
            prefetch_pending: guard.prefetch_pending,
            stale_completions: guard.stale_completions,
            failed_loads: guard.failed_loads,
        }
    }
}

fn now_ms() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(delta) => delta.as_millis() as u64,
        Err(err) => {
            warn!("system clock error: {err}");
            0
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerStats {
    pub timestamp_ms: u64,
    pub uptime_ms: u64,
    pub load_time_ms_mean: f32,
    pub load_time_ms_p50: f32,
    pub load_time_ms_p95: f32,
    pub decode_time_ms_p50: f32,
    pub decode_time_ms_p95: f32,
    pub cache_hit_ratio: f32,
    pub cache_requests: u64,
    pub cache_entries: usize,
    pub cache_capacity: usize,
    pub prefetch_pending: usize,
    pub stale_completions: u64,
    pub failed_loads: u64,
}
