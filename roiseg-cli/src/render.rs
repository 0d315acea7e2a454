//! Conversions between `image` buffers and roiseg grids.

use image::{GrayImage, Luma, Rgb, RgbImage};
use roiseg::{IntensityGrid, LabelGrid, Mask};

/// Luma bytes scaled to `[0, 1]`.
pub fn gray_to_intensity(image: &GrayImage) -> IntensityGrid {
    IntensityGrid::from_fn(image.width() as usize, image.height() as usize, |x, y| {
        image.get_pixel(x as u32, y as u32).0[0] as f32 / 255.0
    })
}

/// White where the mask is set.
pub fn mask_to_gray(mask: &Mask) -> GrayImage {
    GrayImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
        Luma([if mask.get_xy(x as usize, y as usize) { 255 } else { 0 }])
    })
}

/// False-colour label image. Background is black; label hues step by the
/// golden ratio so neighbouring ids get distinct colours.
pub fn labels_to_rgb(labels: &LabelGrid) -> RgbImage {
    RgbImage::from_fn(labels.width() as u32, labels.height() as u32, |x, y| {
        label_color(labels[(x as usize, y as usize)])
    })
}

fn label_color(label: u32) -> Rgb<u8> {
    if label == 0 {
        return Rgb([0, 0, 0]);
    }
    let hue = ((label as f32) * 0.618_034) % 1.0;
    hsv_to_rgb(hue, 0.8, 0.9)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb<u8> {
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb([
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    ])
}
