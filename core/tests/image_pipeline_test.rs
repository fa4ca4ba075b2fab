use std::io::Cursor;

use gallery_core::codec::{ImageDimensions, decode_image};
use gallery_core::{ImageKey, Variant};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use moxcms::{ColorProfile, RenderingIntent};

fn key(name: &str) -> ImageKey {
    ImageKey::new(format!("holiday/{name}"), Variant::Preview)
}

fn encode_sample(width: u32, height: u32, pixels: &[[u8; 4]]) -> Vec<u8> {
    let mut image = ImageBuffer::<Rgba<u8>, Vec<u8>>::new(width, height);
    for (i, pixel) in image.pixels_mut().enumerate() {
        pixel.0 = pixels[i];
    }
    let dynamic = DynamicImage::ImageRgba8(image);
    let mut buf = Cursor::new(Vec::new());
    dynamic.write_to(&mut buf, ImageFormat::Jpeg).expect("encode baseline jpeg");
    buf.into_inner()
}

fn inject_exif_and_icc(base: &[u8], orientation: u16, icc: Option<&[u8]>) -> Vec<u8> {
    assert!(base.starts_with(&[0xFF, 0xD8]));
    let mut output = Vec::with_capacity(base.len() + 128 + icc.map_or(0, |icc| icc.len()));
    output.extend_from_slice(&base[..2]); // SOI
    output.extend_from_slice(&build_exif_segment(orientation));
    if let Some(profile) = icc {
        output.extend_from_slice(&build_icc_segment(profile));
    }
    output.extend_from_slice(&base[2..]);
    output
}

fn build_exif_segment(orientation: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(b"Exif\0\0");
    payload.extend_from_slice(b"II*\0");
    payload.extend_from_slice(&8u32.to_le_bytes());
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&0x0112u16.to_le_bytes());
    payload.extend_from_slice(&3u16.to_le_bytes()); // SHORT
    payload.extend_from_slice(&1u32.to_le_bytes());
    let mut value = orientation.to_le_bytes().to_vec();
    value.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(&value);
    payload.extend_from_slice(&0u32.to_le_bytes());

    let length = (payload.len() + 2) as u16;
    let mut segment = Vec::with_capacity(2 + payload.len());
    segment.extend_from_slice(&[0xFF, 0xE1]);
    segment.extend_from_slice(&length.to_be_bytes());
    segment.extend_from_slice(&payload);
    segment
}

fn build_icc_segment(icc: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(b"ICC_PROFILE\0");
    payload.push(1); // sequence number
    payload.push(1); // total chunks
    payload.extend_from_slice(icc);

    let length = (payload.len() + 2) as u16;
    let mut segment = Vec::with_capacity(2 + payload.len());
    segment.extend_from_slice(&[0xFF, 0xE2]);
    segment.extend_from_slice(&length.to_be_bytes());
    segment.extend_from_slice(&payload);
    segment
}

#[test]
fn camera_jpeg_is_rotated_and_converted_to_srgb() {
    let base = encode_sample(2, 1, &[[200, 80, 40, 255], [40, 160, 220, 255]]);
    let orientation_only = inject_exif_and_icc(&base, 6, None);

    let mut profile = ColorProfile::new_display_p3();
    profile.rendering_intent = RenderingIntent::RelativeColorimetric;
    let icc_bytes = profile.encode().expect("encode icc");
    let orientation_and_icc = inject_exif_and_icc(&base, 6, Some(&icc_bytes));

    let decoded_plain = decode_image(&key("plain.jpg"), &base).expect("decode");
    let decoded_oriented =
        decode_image(&key("oriented.jpg"), &orientation_only).expect("decode oriented");
    let decoded_icc =
        decode_image(&key("icc.jpg"), &orientation_and_icc).expect("decode icc");

    assert_eq!(decoded_plain.dimensions, ImageDimensions { width: 2, height: 1 });
    assert_eq!(decoded_oriented.dimensions, ImageDimensions { width: 1, height: 2 });
    assert_eq!(decoded_icc.dimensions, decoded_oriented.dimensions);

    let plain_first = &decoded_plain.pixels()[0..3];
    let oriented_top = &decoded_oriented.pixels()[0..3];
    let icc_top = &decoded_icc.pixels()[0..3];
    // Rotation keeps the first pixel colour, give or take JPEG loss.
    for (o, p) in oriented_top.iter().zip(plain_first.iter()) {
        assert!((*o as i16 - *p as i16).abs() <= 5);
    }
    assert_ne!(oriented_top, icc_top, "ICC conversion should adjust colour channels");
}

#[test]
fn server_jpeg_behind_png_extension_still_decodes() {
    let base = encode_sample(3, 2, &[[255, 255, 255, 255]; 6]);
    let decoded = decode_image(&ImageKey::new("scans/page.png", Variant::Thumbnail), &base)
        .expect("sniffed as jpeg");
    assert_eq!(decoded.dimensions, ImageDimensions { width: 3, height: 2 });
    assert_eq!(decoded.byte_len(), 3 * 2 * 4);
}

#[test]
fn truncated_download_is_an_error() {
    let base = encode_sample(2, 2, &[[10, 10, 10, 255]; 4]);
    let err = decode_image(&key("cut.jpg"), &base[..20]).expect_err("truncated");
    assert!(format!("{err:#}").contains("holiday/cut.jpg"));
}
