//! Prefetch planning for the photos around the one in the lightbox.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::catalog::Photo;
use crate::types::{ImageKey, RequestToken, Variant};

/// Variants warmed for every neighbour: the grid thumbnail and the lightbox preview.
pub const PRELOAD_VARIANTS: [Variant; 2] = [Variant::Thumbnail, Variant::Preview];

/// One scheduled prefetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefetchTask {
    pub index: usize,
    pub key: ImageKey,
    /// Signed step count from the current photo; positive is forward.
    pub distance: i32,
    pub priority: f64,
}

#[derive(Debug, Copy, Clone)]
struct QueuePriority {
    value: f64,
    sequence: u64,
}

impl Eq for QueuePriority {}

impl PartialEq for QueuePriority {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.sequence == other.sequence
    }
}

impl Ord for QueuePriority {
    fn cmp(&self, other: &Self) -> Ordering {
        // Equal priorities come out in insertion order.
        match self.value.partial_cmp(&other.value) {
            Some(ordering) => ordering.then_with(|| other.sequence.cmp(&self.sequence)),
            None => Ordering::Equal,
        }
    }
}

impl PartialOrd for QueuePriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
struct QueueEntry {
    priority: QueuePriority,
    task: PrefetchTask,
}

impl Eq for QueueEntry {}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority)
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of neighbour prefetches, deduplicated against queued and in-flight keys.
#[derive(Debug, Default)]
pub struct PreloadQueue {
    pending: BinaryHeap<QueueEntry>,
    queued: HashSet<ImageKey>,
    active: HashMap<RequestToken, ImageKey>,
    active_keys: HashSet<ImageKey>,
    sequence: u64,
    next_token: u64,
}

impl PreloadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks waiting to be issued.
    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.active.len()
    }

    pub fn is_in_flight(&self, key: &ImageKey) -> bool {
        self.active_keys.contains(key)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.queued.clear();
        self.active.clear();
        self.active_keys.clear();
    }

    /// Rebuild the queue around `center`.
    ///
    /// Covers up to `count` photos on each side with wraparound, both variants per photo. Keys for
    /// which `is_cached` returns true, and keys already in flight, are skipped. `direction` is the
    /// sign of the last navigation step and favours photos on that side.
    pub fn plan_window(
        &mut self,
        photos: &[Photo],
        center: usize,
        count: usize,
        direction: i32,
        is_cached: impl Fn(&ImageKey) -> bool,
    ) {
        self.pending.clear();
        self.queued.clear();

        let total = photos.len();
        if total <= 1 || center >= total {
            return;
        }

        let reach = count.min(total - 1);
        let mut seen = HashSet::new();
        seen.insert(center);

        for step in 1..=reach {
            let forward = (center + step) % total;
            let backward = (center + total - step) % total;
            for (index, distance) in [(forward, step as i32), (backward, -(step as i32))] {
                if !seen.insert(index) {
                    continue;
                }
                let priority = compute_priority(distance, direction);
                for variant in PRELOAD_VARIANTS {
                    let key = ImageKey::new(photos[index].path.clone(), variant);
                    if self.active_keys.contains(&key) || is_cached(&key) {
                        continue;
                    }
                    self.push_task(PrefetchTask { index, key, distance, priority });
                }
            }
        }
    }

    /// Remove and return the next highest-priority task, issuing a token for its completion.
    pub fn next_task(&mut self) -> Option<(RequestToken, PrefetchTask)> {
        while let Some(entry) = self.pending.pop() {
            if self.queued.remove(&entry.task.key) {
                let token = self.allocate_token();
                self.active.insert(token, entry.task.key.clone());
                self.active_keys.insert(entry.task.key.clone());
                return Some((token, entry.task));
            }
        }
        None
    }

    /// Drain every queued task.
    pub fn drain(&mut self) -> Vec<(RequestToken, PrefetchTask)> {
        std::iter::from_fn(|| self.next_task()).collect()
    }

    /// Release the token of a finished prefetch. Returns the key it was fetching.
    pub fn complete(&mut self, token: &RequestToken) -> Option<ImageKey> {
        let key = self.active.remove(token)?;
        self.active_keys.remove(&key);
        Some(key)
    }

    fn push_task(&mut self, task: PrefetchTask) {
        if !self.queued.insert(task.key.clone()) {
            return;
        }
        self.sequence = self.sequence.wrapping_add(1);
        let priority = QueuePriority { value: task.priority, sequence: self.sequence };
        self.pending.push(QueueEntry { priority, task });
    }

    fn allocate_token(&mut self) -> RequestToken {
        self.next_token = self.next_token.wrapping_add(1).max(1);
        RequestToken::new(self.next_token)
    }
}

fn compute_priority(distance: i32, direction: i32) -> f64 {
    let distance_weight = 1.0 / (distance.abs() as f64 + 1.0);
    let alignment = if direction == 0 { 0.0 } else { (distance.signum() * direction.signum()) as f64 };
    let score = (distance_weight + alignment * 0.125).max(0.0);
    if score.is_finite() { score } else { 0.0 }
}
