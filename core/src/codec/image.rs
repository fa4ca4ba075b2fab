//! Decoding of thumbnail, preview and original responses.

use std::io::Cursor;

use anyhow::{Context, anyhow};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder as _, ImageFormat, ImageReader, RgbaImage};
use moxcms::{CmsError, ColorProfile, Layout, TransformOptions};
use tracing::warn;

use crate::types::ImageKey;

use super::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Straight-alpha RGBA8888 pixels, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub dimensions: ImageDimensions,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

/// Decode a fetched variant of `key`.
///
/// Thumbnails and previews come back as JPEG from the server regardless of the source format, so
/// the format is sniffed from the bytes first and the path extension is only a fallback. EXIF
/// orientation is applied and embedded ICC profiles are converted to sRGB.
pub fn decode_image(key: &ImageKey, data: &[u8]) -> Result<DecodedImage> {
    if data.is_empty() {
        return Err(anyhow!("empty image data for {key}"));
    }

    let reader = match image::guess_format(data) {
        Ok(format) => ImageReader::with_format(Cursor::new(data), format),
        Err(_) => match infer_format(&key.path) {
            Some(format) => ImageReader::with_format(Cursor::new(data), format),
            None => return Err(anyhow!("unrecognised image format for {key}")),
        },
    };

    let mut decoder =
        reader.into_decoder().with_context(|| format!("constructing decoder for {key}"))?;

    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let icc_profile = decoder.icc_profile().unwrap_or(None);

    let mut image =
        DynamicImage::from_decoder(decoder).with_context(|| format!("decoding {key}"))?;
    if orientation != Orientation::NoTransforms {
        image.apply_orientation(orientation);
    }

    let mut rgba = image.into_rgba8();
    if let Some(profile) = icc_profile {
        if let Err(err) = convert_to_srgb_in_place(&mut rgba, &profile) {
            warn!(target: "codec::image", "failed to convert ICC profile for {key}: {err}");
        }
    }

    let dimensions = ImageDimensions { width: rgba.width(), height: rgba.height() };
    Ok(DecodedImage { dimensions, pixels: rgba.into_raw() })
}

fn infer_format(path: &str) -> Option<ImageFormat> {
    let (_, ext) = path.rsplit_once('.')?;
    ImageFormat::from_extension(ext.to_ascii_lowercase())
}

fn convert_to_srgb_in_place(image: &mut RgbaImage, profile_bytes: &[u8]) -> Result<()> {
    let src_profile = ColorProfile::new_from_slice(profile_bytes)
        .map_err(|err| anyhow!("invalid ICC profile: {err}"))?;
    let dest_profile = ColorProfile::new_srgb();
    let raw = image.as_mut();

    match src_profile.create_transform_8bit(
        Layout::Rgba,
        &dest_profile,
        Layout::Rgba,
        TransformOptions::default(),
    ) {
        Ok(transform) => {
            let mut dst = vec![0u8; raw.len()];
            transform
                .transform(&raw[..], &mut dst)
                .map_err(|err| anyhow!("icc transform failed: {err}"))?;
            raw.copy_from_slice(&dst);
            Ok(())
        }
        // Gray and some CMYK-derived profiles only expose an RGB layout.
        Err(CmsError::InvalidLayout) => {
            let rgb: Vec<u8> = raw.chunks_exact(4).flat_map(|px| px[..3].to_vec()).collect();
            let mut dst_rgb = vec![0u8; rgb.len()];
            let transform = src_profile.create_transform_8bit(
                Layout::Rgb,
                &dest_profile,
                Layout::Rgb,
                TransformOptions::default(),
            )?;
            transform
                .transform(&rgb, &mut dst_rgb)
                .map_err(|err| anyhow!("icc transform failed: {err}"))?;
            for (rgba_px, rgb_px) in raw.chunks_exact_mut(4).zip(dst_rgb.chunks_exact(3)) {
                rgba_px[0..3].copy_from_slice(rgb_px);
            }
            Ok(())
        }
        Err(err) => Err(anyhow!("icc transform setup failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Variant;
    use image::{ImageBuffer, Rgba};

    fn sample(format: ImageFormat) -> Vec<u8> {
        let buffer: RgbaImage = ImageBuffer::from_fn(3, 2, |x, _| match x {
            0 => Rgba([255, 0, 0, 255]),
            1 => Rgba([0, 255, 0, 255]),
            _ => Rgba([0, 0, 255, 255]),
        });
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(buffer).write_to(&mut cursor, format).expect("encode sample");
        cursor.into_inner()
    }

    #[test]
    fn decodes_png_regardless_of_extension() {
        // The viewer_image endpoint serves encoded bytes under the original file name.
        let key = ImageKey::new("holiday/raw_0001.jpg", Variant::Preview);
        let decoded = decode_image(&key, &sample(ImageFormat::Png)).expect("decode");
        assert_eq!(decoded.dimensions, ImageDimensions { width: 3, height: 2 });
        assert_eq!(&decoded.pixels()[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn decodes_jpeg_thumbnail() {
        let key = ImageKey::new("a.png", Variant::Thumbnail);
        let decoded = decode_image(&key, &sample(ImageFormat::Jpeg)).expect("decode");
        assert_eq!(decoded.byte_len(), 3 * 2 * 4);
    }

    #[test]
    fn rejects_empty_and_unknown_input() {
        let key = ImageKey::new("a.jpg", Variant::Preview);
        assert!(decode_image(&key, &[]).unwrap_err().to_string().contains("empty image data"));

        let key = ImageKey::new("notes", Variant::Preview);
        assert!(decode_image(&key, b"plain text").is_err());
    }
}
