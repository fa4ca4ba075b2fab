//! Core of the photo gallery lightbox: viewer state, gesture recognition, navigation, image
//! source resolution, prefetching and caching.

#![deny(missing_debug_implementations)]

pub mod api;
pub mod cache;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod resolve;
pub mod session;
pub mod stats;
pub mod types;
pub mod viewer;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

pub use config::{PanPolicy, ViewerConfig};
pub use driver::{Driver, DriverReport};
pub use error::FetchError;
pub use session::{Command, Effect, Session, Ticket};
pub use types::{ImageKey, Rect, RequestToken, Size, Variant, Vec2};
pub use viewer::{DisplaySlot, ViewerState};

/// Returns the version of the core crate for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
