//! Moving between photos and deciding which completions still matter.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ViewerConfig;
use crate::resolve::ImageSourceResolver;
use crate::types::{ImageKey, Variant};

use super::state::{DisplaySlot, ViewerState};

/// Identifies the navigation step an image or metadata request belongs to.
///
/// `navigation` changes on every index change; `image` additionally changes on an original-mode
/// toggle, so a toggle drops the pending image but keeps the pending metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadTicket {
    pub navigation: u64,
    pub image: u64,
    pub index: usize,
    pub variant: Variant,
}

/// Requests to issue after the current photo changed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub key: ImageKey,
    pub image_url: String,
    /// Absent when only the image needs reloading (original-mode toggle).
    pub metadata_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "Escape" | "Esc" => Some(Key::Escape),
            "ArrowLeft" | "Left" => Some(Key::ArrowLeft),
            "ArrowRight" | "Right" => Some(Key::ArrowRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavAction {
    Close,
    Previous,
    Next,
}

/// Key bindings of the open lightbox.
pub fn key_action(key: Key) -> NavAction {
    match key {
        Key::Escape => NavAction::Close,
        Key::ArrowLeft => NavAction::Previous,
        Key::ArrowRight => NavAction::Next,
    }
}

/// Zones of the backdrop outside the image: left steps back, right steps forward, the middle
/// does nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropZones {
    pub previous_below: f64,
    pub next_above: f64,
}

impl From<&ViewerConfig> for BackdropZones {
    fn from(config: &ViewerConfig) -> Self {
        Self { previous_below: config.nav_prev_zone, next_above: config.nav_next_zone }
    }
}

impl Default for BackdropZones {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl BackdropZones {
    pub fn action(&self, x: f64, container_width: f64) -> Option<NavAction> {
        if !(container_width > 0.0) {
            return None;
        }
        let fraction = x / container_width;
        if fraction < self.previous_below {
            Some(NavAction::Previous)
        } else if fraction > self.next_above {
            Some(NavAction::Next)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
pub struct NavigationController {
    navigation: u64,
    image: u64,
    /// Sign of the last step, used to bias prefetching: -1, 0 or 1.
    direction: i32,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    /// Open the lightbox at `index`.
    pub fn open(
        &mut self,
        state: &mut ViewerState,
        resolver: &mut ImageSourceResolver,
        index: usize,
        now_ms: u64,
    ) -> Option<LoadRequest> {
        if !state.open(index) {
            return None;
        }
        self.direction = 0;
        Some(self.begin(state, resolver, index, true, now_ms))
    }

    /// Show `index` keeping original mode. Out-of-range indices are ignored.
    pub fn go_to(
        &mut self,
        state: &mut ViewerState,
        resolver: &mut ImageSourceResolver,
        index: usize,
        now_ms: u64,
    ) -> Option<LoadRequest> {
        let previous = state.current_index();
        if !state.go_to(index) {
            return None;
        }
        self.direction = match previous {
            Some(from) if index > from => 1,
            Some(from) if index < from => -1,
            _ => 0,
        };
        Some(self.begin(state, resolver, index, true, now_ms))
    }

    pub fn next(
        &mut self,
        state: &mut ViewerState,
        resolver: &mut ImageSourceResolver,
        now_ms: u64,
    ) -> Option<LoadRequest> {
        let index = state.next_index()?;
        let request = self.go_to(state, resolver, index, now_ms)?;
        self.direction = 1;
        Some(request)
    }

    pub fn previous(
        &mut self,
        state: &mut ViewerState,
        resolver: &mut ImageSourceResolver,
        now_ms: u64,
    ) -> Option<LoadRequest> {
        let index = state.previous_index()?;
        let request = self.go_to(state, resolver, index, now_ms)?;
        self.direction = -1;
        Some(request)
    }

    /// Flip original mode and reload the image of the current photo.
    pub fn toggle_original(
        &mut self,
        state: &mut ViewerState,
        resolver: &mut ImageSourceResolver,
        now_ms: u64,
    ) -> Option<LoadRequest> {
        let index = state.current_index()?;
        if !state.toggle_original() {
            return None;
        }
        Some(self.begin(state, resolver, index, false, now_ms))
    }

    /// Close the lightbox and orphan everything in flight.
    pub fn close(&mut self, state: &mut ViewerState, resolver: &mut ImageSourceResolver) {
        state.close();
        resolver.reset();
        self.invalidate();
    }

    /// Drop any pending image or metadata completion without touching the state.
    pub fn invalidate(&mut self) {
        self.navigation = self.navigation.wrapping_add(1);
        self.image = self.image.wrapping_add(1);
        self.direction = 0;
    }

    pub fn is_image_current(&self, state: &ViewerState, ticket: &LoadTicket) -> bool {
        ticket.image == self.image
            && ticket.navigation == self.navigation
            && state.current_index() == Some(ticket.index)
            && state.viewer_variant() == ticket.variant
    }

    pub fn is_metadata_current(&self, state: &ViewerState, ticket: &LoadTicket) -> bool {
        ticket.navigation == self.navigation && state.current_index() == Some(ticket.index)
    }

    fn begin(
        &mut self,
        state: &mut ViewerState,
        resolver: &mut ImageSourceResolver,
        index: usize,
        with_metadata: bool,
        now_ms: u64,
    ) -> LoadRequest {
        if with_metadata {
            self.navigation = self.navigation.wrapping_add(1);
        }
        self.image = self.image.wrapping_add(1);

        let variant = state.viewer_variant();
        let path = state.photos()[index].path.clone();
        let image_url = resolver.viewer_url(&path, state.is_original_mode(), now_ms);
        let metadata_url = with_metadata.then(|| resolver.metadata_url(&path));
        state.set_display(DisplaySlot::Loading { variant, url: image_url.clone() });

        debug!(
            target: "viewer::navigation",
            index,
            %variant,
            navigation = self.navigation,
            image = self.image,
            "requesting photo"
        );

        LoadRequest {
            ticket: LoadTicket { navigation: self.navigation, image: self.image, index, variant },
            key: ImageKey::new(path, variant),
            image_url,
            metadata_url,
        }
    }
}
