//! Background loading: neighbour prefetch and batched grid thumbnails.

pub mod batch;
pub mod preload;

pub use batch::BatchLoader;
pub use preload::{PRELOAD_VARIANTS, PrefetchTask, PreloadQueue};
