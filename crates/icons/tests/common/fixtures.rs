//! Icon fixtures.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// A PNG whose pixels depend on `seed`, so different seeds hash differently.
pub fn icon_png(seed: u8, width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([seed, (x % 256) as u8, (y % 256) as u8, 255])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("Failed to encode fixture");
    out
}

pub fn b1() -> Vec<u8> {
    icon_png(1, 128, 128)
}

pub fn b2() -> Vec<u8> {
    icon_png(2, 128, 128)
}
