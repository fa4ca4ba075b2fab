//! Pointer and touch sequences classified into tap, drag and pinch intents.
//!
//! The recognizer never mutates the [`ViewerState`]; it reads it and returns
//! [`GestureIntent`]s which the session applies in order. A release that ends a drag therefore
//! clears the dragging flag (via [`GestureIntent::EndDrag`]) before any tap classified from the
//! same release is acted on.

use serde::Serialize;

use crate::config::ViewerConfig;
use crate::types::{Rect, Vec2};

use super::state::{MIN_SCALE, ViewerState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub drag_threshold_px: f64,
    pub center_tap_fraction: f64,
    pub click_reset_delay_ms: u64,
    pub max_pinch_scale: f64,
}

impl From<&ViewerConfig> for GestureConfig {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            drag_threshold_px: config.drag_threshold_px,
            center_tap_fraction: config.center_tap_fraction,
            click_reset_delay_ms: config.click_reset_delay_ms,
            max_pinch_scale: config.max_pinch_scale,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GesturePhase {
    Idle,
    /// Pointer is down and still a click candidate.
    Armed,
    /// Movement exceeded the threshold, or a zoomed image is being dragged.
    Dragging,
    Pinching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TapZone {
    /// Close enough to the image centre to toggle zoom.
    Center,
    /// Elsewhere; left to navigation hit-testing.
    Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GestureIntent {
    BeginDrag,
    /// Absolute pan offset for the ongoing drag.
    Pan(Vec2),
    EndDrag,
    Tap(TapZone),
    /// Release of a session that moved past the threshold.
    Drag,
    /// Absolute scale for the ongoing pinch.
    Pinch(f64),
    /// Ask the host to call [`GestureRecognizer::deferred_reset`] with `seq` after `after_ms`.
    ScheduleReset { seq: u64, after_ms: u64 },
}

#[derive(Debug, Clone, Copy)]
struct PointerSession {
    start: Vec2,
    demoted: bool,
    /// Pan offset when the drag began; `None` unless the image was zoomed at pointer-down.
    drag_origin: Option<Vec2>,
}

#[derive(Debug, Clone, Copy)]
struct PinchSession {
    start_distance: f64,
    start_scale: f64,
}

#[derive(Debug)]
pub struct GestureRecognizer {
    config: GestureConfig,
    session: Option<PointerSession>,
    pinch: Option<PinchSession>,
    real_click: bool,
    reset_seq: u64,
    reset_pending: bool,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            session: None,
            pinch: None,
            real_click: true,
            reset_seq: 0,
            reset_pending: false,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        if self.pinch.is_some() {
            return GesturePhase::Pinching;
        }
        match self.session {
            Some(session) if session.demoted || session.drag_origin.is_some() => {
                GesturePhase::Dragging
            }
            Some(_) => GesturePhase::Armed,
            None => GesturePhase::Idle,
        }
    }

    /// Whether the current interaction still counts as a click.
    pub fn is_real_click(&self) -> bool {
        self.real_click
    }

    pub fn pointer_down(&mut self, state: &ViewerState, at: Vec2) -> Vec<GestureIntent> {
        if self.pinch.is_some() {
            return Vec::new();
        }

        self.real_click = true;
        self.reset_pending = false;
        let drag_origin = state.is_dragging_enabled().then(|| state.pan_offset());
        self.session = Some(PointerSession { start: at, demoted: false, drag_origin });

        if drag_origin.is_some() { vec![GestureIntent::BeginDrag] } else { Vec::new() }
    }

    pub fn pointer_move(&mut self, state: &ViewerState, at: Vec2) -> Vec<GestureIntent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let delta = at - session.start;
        let threshold = self.config.drag_threshold_px;
        if !session.demoted && (delta.x.abs() > threshold || delta.y.abs() > threshold) {
            session.demoted = true;
            self.real_click = false;
        }

        match session.drag_origin {
            Some(origin) if state.is_dragging() => vec![GestureIntent::Pan(origin + delta)],
            _ => Vec::new(),
        }
    }

    /// Finish the pointer sequence. `image_bounds` is the on-screen box of the image, when the
    /// release happened over it; without it a tap cannot be a centre tap.
    pub fn pointer_up(
        &mut self,
        state: &ViewerState,
        at: Vec2,
        image_bounds: Option<Rect>,
    ) -> Vec<GestureIntent> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };

        let mut intents = Vec::new();
        let ended_drag = session.drag_origin.is_some();
        if ended_drag {
            intents.push(GestureIntent::EndDrag);
        }

        // A drag owned by another pointer keeps the flag set; this release cannot be a tap.
        let dragging_elsewhere = state.is_dragging() && !ended_drag;
        if !session.demoted && self.real_click && !dragging_elsewhere {
            let zone = match image_bounds {
                Some(bounds) => classify_tap(bounds, at, self.config.center_tap_fraction),
                None => TapZone::Edge,
            };
            intents.push(GestureIntent::Tap(zone));
        } else if session.demoted {
            intents.push(GestureIntent::Drag);
        }

        if ended_drag || session.demoted {
            intents.push(self.schedule_reset());
        } else {
            self.real_click = true;
        }
        intents
    }

    /// Pointer left the surface mid-gesture.
    pub fn pointer_leave(&mut self) -> Vec<GestureIntent> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        let mut intents = Vec::new();
        if session.drag_origin.is_some() {
            intents.push(GestureIntent::EndDrag);
        }
        if session.drag_origin.is_some() || session.demoted {
            intents.push(self.schedule_reset());
        } else {
            self.real_click = true;
        }
        intents
    }

    /// Run the deferred reset scheduled by the release with the matching `seq`.
    pub fn deferred_reset(&mut self, seq: u64) -> bool {
        if !self.reset_pending || seq != self.reset_seq {
            return false;
        }
        self.reset_pending = false;
        self.real_click = true;
        true
    }

    /// Whether a click the platform synthesises after a release should be honoured.
    pub fn accepts_click(&self, state: &ViewerState) -> bool {
        if state.is_dragging() || self.session.is_some_and(|s| s.demoted) {
            return false;
        }
        !(self.reset_pending && !self.real_click)
    }

    /// Two fingers touched down. Ends any single-pointer session.
    pub fn pinch_start(&mut self, state: &ViewerState, a: Vec2, b: Vec2) -> Vec<GestureIntent> {
        let mut intents = Vec::new();
        if let Some(session) = self.session.take() {
            if session.drag_origin.is_some() {
                intents.push(GestureIntent::EndDrag);
            }
        }
        self.real_click = false;
        self.pinch = Some(PinchSession { start_distance: (b - a).length(), start_scale: state.scale() });
        intents
    }

    pub fn pinch_move(&mut self, a: Vec2, b: Vec2) -> Vec<GestureIntent> {
        let Some(pinch) = self.pinch else {
            return Vec::new();
        };
        if pinch.start_distance < 1.0 {
            return Vec::new();
        }
        let scale = pinch_scale(
            pinch.start_distance,
            (b - a).length(),
            pinch.start_scale,
            self.config.max_pinch_scale,
        );
        vec![GestureIntent::Pinch(scale)]
    }

    pub fn pinch_end(&mut self) -> Vec<GestureIntent> {
        if self.pinch.take().is_none() {
            return Vec::new();
        }
        vec![self.schedule_reset()]
    }

    pub fn cancel(&mut self) {
        self.session = None;
        self.pinch = None;
        self.real_click = true;
        self.reset_pending = false;
    }

    fn schedule_reset(&mut self) -> GestureIntent {
        self.reset_seq = self.reset_seq.wrapping_add(1);
        self.reset_pending = true;
        GestureIntent::ScheduleReset { seq: self.reset_seq, after_ms: self.config.click_reset_delay_ms }
    }
}

/// Distance-ratio pinch scale, clamped to `[1, max_scale]`.
pub fn pinch_scale(start_distance: f64, current_distance: f64, start_scale: f64, max_scale: f64) -> f64 {
    if start_distance <= 0.0 {
        return start_scale.clamp(MIN_SCALE, max_scale);
    }
    let scale = current_distance / start_distance * start_scale;
    if scale.is_finite() { scale.clamp(MIN_SCALE, max_scale) } else { MIN_SCALE }
}

/// Centre tap when the release lies within `fraction` of the half-width from the box centre.
pub fn classify_tap(bounds: Rect, at: Vec2, fraction: f64) -> TapZone {
    let radius = bounds.width / 2.0 * fraction;
    if (at - bounds.center()).length() <= radius { TapZone::Center } else { TapZone::Edge }
}
