//! Grid thumbnail loading in fixed-size batches with a pause between them.

use std::collections::VecDeque;

use crate::config::ViewerConfig;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 50;

/// Issues at most `batch_size` items at a time and waits for the whole batch to settle before
/// the next one may start.
#[derive(Debug)]
pub struct BatchLoader<T> {
    queue: VecDeque<T>,
    batch_size: usize,
    delay_ms: u64,
    in_flight: usize,
}

impl<T> BatchLoader<T> {
    pub fn new(batch_size: usize, delay_ms: u64) -> Self {
        Self { queue: VecDeque::new(), batch_size: batch_size.max(1), delay_ms, in_flight: 0 }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.batch_size, config.batch_delay_ms)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Pause to observe between a settled batch and the next one.
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }

    pub fn enqueue(&mut self, items: impl IntoIterator<Item = T>) {
        self.queue.extend(items);
    }

    /// Take the next batch. Empty while a batch is still in flight or nothing is queued.
    pub fn next_batch(&mut self) -> Vec<T> {
        if self.in_flight > 0 {
            return Vec::new();
        }
        let take = self.batch_size.min(self.queue.len());
        let batch: Vec<T> = self.queue.drain(..take).collect();
        self.in_flight = batch.len();
        batch
    }

    /// One item of the current batch finished, successfully or not. Returns true once the batch
    /// has fully settled and more items are waiting.
    pub fn settle(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        self.in_flight -= 1;
        self.in_flight == 0 && !self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.in_flight = 0;
    }
}

impl<T> Default for BatchLoader<T> {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_BATCH_DELAY_MS)
    }
}
