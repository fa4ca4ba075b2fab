//! Horizontal paging for touch devices when the image is not zoomed.
//!
//! The pages sit side by side on a strip; the strip translates with the finger and snaps to the
//! nearest page on release. A short, fast gesture advances one page even if the finger did not
//! travel past the midpoint.

use crate::config::ViewerConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    pub flick_duration_ms: u64,
    pub flick_distance_px: f64,
}

impl From<&ViewerConfig> for SwipeConfig {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            flick_duration_ms: config.flick_duration_ms,
            flick_distance_px: config.flick_distance_px,
        }
    }
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeOutcome {
    pub target: usize,
    pub flicked: bool,
}

#[derive(Debug, Clone, Copy)]
struct SwipeDrag {
    start_x: f64,
    start_translate: f64,
    started_at_ms: u64,
    page_width: f64,
    page_count: usize,
    start_index: usize,
}

#[derive(Debug, Default)]
pub struct SwipePager {
    config: SwipeConfig,
    drag: Option<SwipeDrag>,
    translate: f64,
}

impl SwipePager {
    pub fn new(config: SwipeConfig) -> Self {
        Self { config, drag: None, translate: 0.0 }
    }

    pub fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    /// Current strip offset; `-(index * page_width)` at rest.
    pub fn translate(&self) -> f64 {
        self.translate
    }

    pub fn begin(&mut self, x: f64, timestamp_ms: u64, index: usize, page_count: usize, page_width: f64) {
        if page_count == 0 || !(page_width > 0.0) {
            self.drag = None;
            return;
        }
        let index = index.min(page_count - 1);
        self.translate = -(index as f64) * page_width;
        self.drag = Some(SwipeDrag {
            start_x: x,
            start_translate: self.translate,
            started_at_ms: timestamp_ms,
            page_width,
            page_count,
            start_index: index,
        });
    }

    /// Follow the finger. Returns the clamped strip offset.
    pub fn move_to(&mut self, x: f64) -> Option<f64> {
        let drag = self.drag?;
        let min = -((drag.page_count - 1) as f64) * drag.page_width;
        self.translate = (drag.start_translate + (x - drag.start_x)).clamp(min, 0.0);
        Some(self.translate)
    }

    /// Snap to a page. `None` when no swipe was in progress.
    pub fn release(&mut self, timestamp_ms: u64) -> Option<SwipeOutcome> {
        let drag = self.drag.take()?;
        let duration_ms = timestamp_ms.saturating_sub(drag.started_at_ms);
        let outcome = snap_target(
            self.translate,
            drag.start_translate,
            drag.page_width,
            drag.page_count,
            duration_ms,
            &self.config,
        );
        self.translate = -(outcome.target as f64) * drag.page_width;
        if outcome.target != drag.start_index {
            tracing::trace!(
                target: "viewer::swipe",
                from = drag.start_index,
                to = outcome.target,
                flicked = outcome.flicked,
                "swipe settled on new page"
            );
        }
        Some(outcome)
    }

    pub fn cancel(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.translate = -(drag.start_index as f64) * drag.page_width;
        }
    }
}

/// Page the strip settles on when released at `translate`.
///
/// The nearest page wins, except that a gesture shorter than the flick duration whose residual
/// past the nearest page exceeds the flick distance *in the direction of travel* moves one page
/// further. There is no wraparound at either end.
pub fn snap_target(
    translate: f64,
    start_translate: f64,
    page_width: f64,
    page_count: usize,
    duration_ms: u64,
    config: &SwipeConfig,
) -> SwipeOutcome {
    if page_count == 0 || !(page_width > 0.0) {
        return SwipeOutcome { target: 0, flicked: false };
    }
    let last = page_count - 1;
    let nearest = (-translate / page_width).round().clamp(0.0, last as f64) as usize;

    if duration_ms >= config.flick_duration_ms {
        return SwipeOutcome { target: nearest, flicked: false };
    }

    let residual = translate + nearest as f64 * page_width;
    let travel = translate - start_translate;
    if travel < 0.0 && residual < -config.flick_distance_px && nearest < last {
        return SwipeOutcome { target: nearest + 1, flicked: true };
    }
    if travel > 0.0 && residual > config.flick_distance_px && nearest > 0 {
        return SwipeOutcome { target: nearest - 1, flicked: true };
    }
    SwipeOutcome { target: nearest, flicked: false }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_fast_swipe_flicks_forward() {
        let mut pager = SwipePager::new(SwipeConfig::default());
        pager.begin(300.0, 1_000, 1, 3, 400.0);
        assert_eq!(pager.move_to(240.0), Some(-460.0));
        let outcome = pager.release(1_150).expect("swipe in progress");
        assert_eq!(outcome, SwipeOutcome { target: 2, flicked: true });
        assert_eq!(pager.translate(), -800.0);
    }

    #[test]
    fn slow_swipe_snaps_to_nearest() {
        let mut pager = SwipePager::new(SwipeConfig::default());
        pager.begin(300.0, 0, 1, 3, 400.0);
        pager.move_to(240.0);
        assert_eq!(pager.release(500).map(|o| o.target), Some(1));
    }

    #[test]
    fn no_wraparound_at_last_page() {
        let mut pager = SwipePager::new(SwipeConfig::default());
        pager.begin(300.0, 0, 2, 3, 400.0);
        assert_eq!(pager.move_to(100.0), Some(-800.0));
        assert_eq!(pager.release(50).map(|o| o.target), Some(2));
    }

    #[test]
    fn residual_against_travel_does_not_flick() {
        // Swiped right from page 1 to just short of page 0: the nearest page is 0 and the residual
        // points left, opposite to the travel, so the strip must not bounce back to page 1.
        let outcome = snap_target(-130.0, -400.0, 400.0, 3, 100, &SwipeConfig::default());
        assert_eq!(outcome, SwipeOutcome { target: 0, flicked: false });
    }
}
