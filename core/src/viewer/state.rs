//! The lightbox context record: one owner, every mutation funnels through the methods below.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{Photo, PhotoMetadata};
use crate::codec::DecodedImage;
use crate::config::{PanPolicy, ViewerConfig};
use crate::types::{Size, Variant, Vec2};

/// Shared handle to a decoded image; cheap to clone into the cache and the display slot.
pub type ImageHandle = Arc<DecodedImage>;

pub const MIN_SCALE: f64 = 1.0;

/// What the lightbox currently shows in place of the image.
#[derive(Debug, Clone, Default)]
pub enum DisplaySlot {
    #[default]
    Empty,
    Loading { variant: Variant, url: String },
    Ready { variant: Variant, image: ImageHandle },
    /// The fetch or decode failed; the UI renders a placeholder.
    Failed { variant: Variant, reason: String },
}

impl DisplaySlot {
    pub fn is_ready(&self) -> bool {
        matches!(self, DisplaySlot::Ready { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DisplaySlot::Failed { .. })
    }
}

/// Rendered sizes needed to keep a zoomed image inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ViewportLayout {
    /// Size of the image at scale 1 (fit-to-container).
    pub image: Size,
    pub viewport: Size,
}

impl ViewportLayout {
    /// Largest pan offset per axis that keeps the scaled image edge inside the viewport.
    pub fn pan_limit(&self, scale: f64) -> Vec2 {
        let overflow_x = (self.image.width * scale - self.viewport.width).max(0.0) / 2.0;
        let overflow_y = (self.image.height * scale - self.viewport.height).max(0.0) / 2.0;
        Vec2::new(overflow_x, overflow_y)
    }
}

/// Serializable view of the zoom-related fields, handy for UI bindings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformSnapshot {
    pub scale: f64,
    pub pan: Vec2,
    pub dragging_enabled: bool,
    pub dragging: bool,
}

#[derive(Debug)]
pub struct ViewerState {
    photos: Vec<Photo>,
    current_index: Option<usize>,
    original_mode: bool,
    scale: f64,
    pan: Vec2,
    dragging_enabled: bool,
    dragging: bool,
    zoom_factor: f64,
    max_pinch_scale: f64,
    pan_policy: PanPolicy,
    layout: Option<ViewportLayout>,
    metadata: Option<PhotoMetadata>,
    display: DisplaySlot,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            photos: Vec::new(),
            current_index: None,
            original_mode: false,
            scale: MIN_SCALE,
            pan: Vec2::ZERO,
            dragging_enabled: false,
            dragging: false,
            zoom_factor: config.zoom_factor.max(MIN_SCALE),
            max_pinch_scale: config.max_pinch_scale.max(MIN_SCALE),
            pan_policy: config.pan_policy,
            layout: None,
            metadata: None,
            display: DisplaySlot::Empty,
        }
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_photo(&self) -> Option<&Photo> {
        self.current_index.and_then(|index| self.photos.get(index))
    }

    pub fn is_open(&self) -> bool {
        self.current_index.is_some()
    }

    pub fn is_original_mode(&self) -> bool {
        self.original_mode
    }

    /// Variant the lightbox requests for the current mode.
    pub fn viewer_variant(&self) -> Variant {
        Variant::for_viewer(self.original_mode)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.pan
    }

    pub fn is_dragging_enabled(&self) -> bool {
        self.dragging_enabled
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    pub fn layout(&self) -> Option<ViewportLayout> {
        self.layout
    }

    pub fn metadata(&self) -> Option<&PhotoMetadata> {
        self.metadata.as_ref()
    }

    pub fn display(&self) -> &DisplaySlot {
        &self.display
    }

    pub fn transform(&self) -> TransformSnapshot {
        TransformSnapshot {
            scale: self.scale,
            pan: self.pan,
            dragging_enabled: self.dragging_enabled,
            dragging: self.dragging,
        }
    }

    /// Replace the photo sequence after a directory load. Closes the viewer.
    pub fn set_photos(&mut self, photos: Vec<Photo>) {
        self.photos = photos;
        self.close();
    }

    /// Swap in an updated copy of the photo at `index` (e.g. after a rating change).
    pub fn replace_photo(&mut self, index: usize, photo: Photo) -> bool {
        match self.photos.get_mut(index) {
            Some(slot) => {
                *slot = photo;
                true
            }
            None => false,
        }
    }

    /// Open the lightbox at `index`. Out-of-range indices are ignored.
    pub fn open(&mut self, index: usize) -> bool {
        if index >= self.photos.len() {
            return false;
        }
        self.original_mode = false;
        self.go_to(index)
    }

    pub fn close(&mut self) {
        self.current_index = None;
        self.original_mode = false;
        self.metadata = None;
        self.display = DisplaySlot::Empty;
        self.reset_zoom();
    }

    /// Move to `index` keeping the original-mode flag. Resets zoom and the metadata panel.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.photos.len() {
            return false;
        }
        self.current_index = Some(index);
        self.metadata = None;
        self.display = DisplaySlot::Empty;
        self.reset_zoom();
        true
    }

    /// Index after the current one, wrapping around. A closed viewer starts at the first photo.
    pub fn next_index(&self) -> Option<usize> {
        let len = self.photos.len();
        if len == 0 {
            return None;
        }
        Some(self.current_index.map_or(0, |index| (index + 1) % len))
    }

    /// Index before the current one, wrapping around. A closed viewer starts at the last photo.
    pub fn previous_index(&self) -> Option<usize> {
        let len = self.photos.len();
        if len == 0 {
            return None;
        }
        Some(self.current_index.map_or(len - 1, |index| (index + len - 1) % len))
    }

    pub fn next(&mut self) -> Option<usize> {
        let index = self.next_index()?;
        self.go_to(index).then_some(index)
    }

    pub fn previous(&mut self) -> Option<usize> {
        let index = self.previous_index()?;
        self.go_to(index).then_some(index)
    }

    /// Flip between preview and original. Returning to preview drops any zoom.
    pub fn toggle_original(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.original_mode = !self.original_mode;
        if !self.original_mode {
            self.reset_zoom();
        }
        true
    }

    /// Zoom to `scale`, clamped to `[1, zoom_factor]`.
    ///
    /// With an `origin` (relative to the image centre) the point under it stays put; without one
    /// the image recentres.
    pub fn set_zoom(&mut self, scale: f64, origin: Option<Vec2>) {
        let target = clamp_scale(scale, self.zoom_factor);
        self.apply_scale(target, origin);
    }

    /// Pinch zoom, clamped to `[1, max_pinch_scale]`. Pan scales around the image centre.
    pub fn pinch_zoom(&mut self, scale: f64) {
        let target = clamp_scale(scale, self.max_pinch_scale);
        self.apply_scale(target, Some(Vec2::ZERO));
    }

    /// Centre-tap behaviour: zoom in to `zoom_factor` when at rest, otherwise back to fit.
    pub fn toggle_zoom(&mut self) {
        if self.scale > MIN_SCALE {
            self.reset_zoom();
        } else {
            self.set_zoom(self.zoom_factor, None);
        }
    }

    pub fn reset_zoom(&mut self) {
        self.scale = MIN_SCALE;
        self.pan = Vec2::ZERO;
        self.dragging_enabled = false;
        self.dragging = false;
    }

    /// Shift the pan offset by `delta`. Ignored while not zoomed.
    pub fn pan(&mut self, delta: Vec2) {
        if !self.dragging_enabled {
            return;
        }
        self.pan = self.constrain_pan(self.pan + delta);
    }

    /// Mark the start of a drag. Only possible while zoomed in.
    pub fn begin_drag(&mut self) -> bool {
        if !self.dragging_enabled {
            return false;
        }
        self.dragging = true;
        true
    }

    /// Set the absolute pan offset during a drag.
    pub fn drag_to(&mut self, offset: Vec2) {
        if !self.dragging || !self.dragging_enabled {
            return;
        }
        self.pan = self.constrain_pan(offset);
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn set_layout(&mut self, layout: Option<ViewportLayout>) {
        self.layout = layout;
        self.pan = self.constrain_pan(self.pan);
    }

    pub fn set_metadata(&mut self, metadata: Option<PhotoMetadata>) {
        self.metadata = metadata;
    }

    pub fn set_display(&mut self, display: DisplaySlot) {
        self.display = display;
    }

    fn apply_scale(&mut self, target: f64, origin: Option<Vec2>) {
        if target <= MIN_SCALE {
            self.reset_zoom();
            return;
        }

        let previous = self.scale;
        self.pan = match origin {
            Some(origin) => origin - (origin - self.pan) * (target / previous),
            None => Vec2::ZERO,
        };
        self.scale = target;
        self.dragging_enabled = true;
        self.pan = self.constrain_pan(self.pan);
    }

    fn constrain_pan(&self, offset: Vec2) -> Vec2 {
        if self.scale <= MIN_SCALE {
            return Vec2::ZERO;
        }
        match (self.pan_policy, self.layout) {
            (PanPolicy::KeepEdgeInView, Some(layout)) => {
                let limit = layout.pan_limit(self.scale);
                Vec2::new(offset.x.clamp(-limit.x, limit.x), offset.y.clamp(-limit.y, limit.y))
            }
            _ => offset,
        }
    }
}

fn clamp_scale(scale: f64, max: f64) -> f64 {
    if scale.is_nan() { MIN_SCALE } else { scale.clamp(MIN_SCALE, max) }
}
