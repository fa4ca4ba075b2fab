//! Turning fetched bytes into displayable pixels.

pub mod image;

pub use image::{DecodedImage, ImageDimensions, decode_image};

pub type Result<T> = crate::Result<T>;
