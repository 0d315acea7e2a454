//! Image conditioning before segmentation: smoothing, local contrast
//! equalization, speckle removal and resampling to the working size.

use image::GrayImage;
use image::imageops::{self, FilterType};
use imageproc::filter::median_filter;

/// Gaussian sigma of the initial smoothing.
const BLUR_SIGMA: f32 = 1.0;
/// CLAHE clip limit, relative to a flat histogram.
const CLAHE_CLIP_LIMIT: f32 = 2.0;
/// CLAHE tiles per axis.
const CLAHE_TILES: u32 = 8;
/// Median window radius (5x5 window).
const MEDIAN_RADIUS: u32 = 2;

const LEVELS: usize = 256;

/// Blur, CLAHE, 5x5 median, then resize to `size` x `size`.
///
/// The triangle filter widens with the downscale factor, which acts as the
/// anti-aliasing step.
pub fn preprocess(gray: &GrayImage, size: u32) -> GrayImage {
    let smoothed = imageops::blur(gray, BLUR_SIGMA);
    let equalized = clahe(&smoothed, CLAHE_CLIP_LIMIT, CLAHE_TILES);
    let denoised = median_filter(&equalized, MEDIAN_RADIUS, MEDIAN_RADIUS);
    imageops::resize(&denoised, size, size, FilterType::Triangle)
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into up to `tiles` x `tiles` tiles. Each tile gets an
/// equalization table from its histogram, with bins clipped at
/// `clip_limit * area / 256` and the excess spread evenly over all bins. A
/// pixel's output blends the tables of the four nearest tile centres
/// bilinearly. `clip_limit <= 0` disables clipping.
pub fn clahe(image: &GrayImage, clip_limit: f32, tiles: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tiles_x = tiles.clamp(1, width);
    let tiles_y = tiles.clamp(1, height);
    let bounds = |t: u32, tiles: u32, len: u32| (t * len / tiles, (t + 1) * len / tiles);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        let (y0, y1) = bounds(ty, tiles_y, height);
        for tx in 0..tiles_x {
            let (x0, x1) = bounds(tx, tiles_x, width);
            let mut histogram = [0u32; LEVELS];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[image.get_pixel(x, y).0[0] as usize] += 1;
                }
            }
            luts.push(tile_lut(&mut histogram, (x1 - x0) * (y1 - y0), clip_limit));
        }
    }

    let tile_w = width as f32 / tiles_x as f32;
    let tile_h = height as f32 / tiles_y as f32;
    // Nearest lower/upper tile along one axis and the weight of the upper one.
    let neighbours = |pos: u32, tile: f32, tiles: u32| {
        let f = pos as f32 / tile - 0.5;
        let lower = f.floor();
        let weight = f - lower;
        let lo = (lower as i64).clamp(0, tiles as i64 - 1) as usize;
        let hi = (lower as i64 + 1).clamp(0, tiles as i64 - 1) as usize;
        (lo, hi, weight)
    };

    GrayImage::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y).0[0] as usize;
        let (x_lo, x_hi, xa) = neighbours(x, tile_w, tiles_x);
        let (y_lo, y_hi, ya) = neighbours(y, tile_h, tiles_y);
        let at = |tx: usize, ty: usize| luts[ty * tiles_x as usize + tx][v] as f32;

        let top = at(x_lo, y_lo) * (1.0 - xa) + at(x_hi, y_lo) * xa;
        let bottom = at(x_lo, y_hi) * (1.0 - xa) + at(x_hi, y_hi) * xa;
        let out = top * (1.0 - ya) + bottom * ya;
        image::Luma([out.round().clamp(0.0, 255.0) as u8])
    })
}

/// Equalization table of one tile, clipping the histogram in place.
fn tile_lut(histogram: &mut [u32; LEVELS], area: u32, clip_limit: f32) -> [u8; LEVELS] {
    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / LEVELS as f32) as u32).max(1);
        let mut excess = 0u32;
        for count in histogram.iter_mut() {
            if *count > limit {
                excess += *count - limit;
                *count = limit;
            }
        }

        let batch = excess / LEVELS as u32;
        let residual = (excess % LEVELS as u32) as usize;
        for count in histogram.iter_mut() {
            *count += batch;
        }
        if residual > 0 {
            let step = (LEVELS / residual).max(1);
            for count in histogram.iter_mut().step_by(step).take(residual) {
                *count += 1;
            }
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; LEVELS];
    let mut cumulative = 0u32;
    for (entry, &count) in lut.iter_mut().zip(histogram.iter()) {
        cumulative += count;
        *entry = (cumulative as f32 * scale).round().min(255.0) as u8;
    }
    lut
}
