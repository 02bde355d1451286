//! Tests for thumbnail rendering through the codec trait object.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use thumbra_codec::{Codec, CodecSettingsBuilder, ImageCodec};
use thumbra_core::RasterFormat;

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

#[test]
fn test_output_spills_past_memory_limit() {
    let settings = CodecSettingsBuilder::default()
        .scratch_memory_limit(64usize)
        .build()
        .unwrap();
    let codec: Arc<dyn Codec> = Arc::new(ImageCodec::new(settings));

    let scratch = codec
        .thumbnail(&jpeg(640, 480), RasterFormat::Jpeg, "320")
        .unwrap();
    assert!(scratch.is_rolled());

    let bytes = scratch.into_bytes().unwrap();
    let thumb = image::load_from_memory(&bytes).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (320, 240));
}

#[test]
fn test_lower_quality_yields_smaller_output() {
    let source = jpeg(512, 512);
    let render = |quality: u8| {
        let settings = CodecSettingsBuilder::default()
            .jpeg_quality(quality)
            .build()
            .unwrap();
        ImageCodec::new(settings)
            .thumbnail(&source, RasterFormat::Jpeg, "256")
            .unwrap()
            .into_bytes()
            .unwrap()
            .len()
    };
    assert!(render(10) < render(95));
}

#[test]
fn test_invalid_width_is_rejected_before_decoding() {
    let codec = ImageCodec::default();
    let err = codec
        .thumbnail(b"not an image", RasterFormat::Png, "wide")
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        thumbra_codec::CodecErrorKind::InvalidWidth(_)
    ));
}
