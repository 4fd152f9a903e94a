//! Test image generator

use fieldops_install::models::CapturedImage;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// PNG with a busy pattern, so a JPEG re-encode comes out smaller
pub fn generate_test_png(name: &str, width: u32, height: u32) -> CapturedImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let v = ((x * 13 + y * 7) ^ (x * y)) as u8;
        Rgb([v, v.wrapping_add(40), v.wrapping_mul(5)])
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encode");
    CapturedImage::new(name, "image/png", bytes)
}
