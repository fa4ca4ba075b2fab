//! Lightbox state, input recognition and navigation.

pub mod gesture;
pub mod navigation;
pub mod state;
pub mod swipe;

pub use gesture::{GestureConfig, GestureIntent, GesturePhase, GestureRecognizer, TapZone};
pub use navigation::{
    BackdropZones, Key, LoadRequest, LoadTicket, NavAction, NavigationController, key_action,
};
pub use state::{DisplaySlot, ImageHandle, MIN_SCALE, TransformSnapshot, ViewerState, ViewportLayout};
pub use swipe::{SwipeConfig, SwipeOutcome, SwipePager};
