use crate::error::LedgerError;
use crate::preprocessing::PreprocessConfig;
use image::{DynamicImage, GrayImage, Luma};

const HIST_SIZE: usize = 256;

/// Contrast-limited adaptive histogram equalization (CLAHE)
///
/// Evens out the lighting of a phone photo: each tile of the grid gets its own
/// equalization curve, and pixels blend the curves of the four nearest tiles.
pub fn apply(image: DynamicImage, config: &PreprocessConfig) -> Result<DynamicImage, LedgerError> {
    let gray = image.to_luma8();
    let enhanced = clahe(&gray, config.clahe_tile_grid, config.clahe_clip_limit);
    Ok(DynamicImage::ImageLuma8(enhanced))
}

fn clahe(img: &GrayImage, tile_grid: u32, clip_limit: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }

    // Tiles on the right/bottom edge are smaller when the size isn't divisible
    let tile_w = width.div_ceil(tile_grid.clamp(1, width));
    let tile_h = height.div_ceil(tile_grid.clamp(1, height));
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);

            let mut hist = [0u32; HIST_SIZE];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[img.get_pixel(x, y).0[0] as usize] += 1;
                }
            }

            let area = (x1 - x0) * (y1 - y0);
            clip_histogram(&mut hist, clip_limit, area);
            luts.push(build_lut(&hist, area));
        }
    }

    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles_x + tx) as usize];
    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;

    GrayImage::from_fn(width, height, |x, y| {
        let (tx1, tx2, xa) = neighbours(x, inv_tw, tiles_x);
        let (ty1, ty2, ya) = neighbours(y, inv_th, tiles_y);
        let v = img.get_pixel(x, y).0[0] as usize;

        let top = lut_at(tx1, ty1)[v] as f32 * (1.0 - xa) + lut_at(tx2, ty1)[v] as f32 * xa;
        let bottom = lut_at(tx1, ty2)[v] as f32 * (1.0 - xa) + lut_at(tx2, ty2)[v] as f32 * xa;
        let blended = top * (1.0 - ya) + bottom * ya;

        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

/// The two tile indices surrounding `pos` along one axis, and the weight of the second
fn neighbours(pos: u32, inv_tile: f32, tiles: u32) -> (u32, u32, f32) {
    let f = pos as f32 * inv_tile - 0.5;
    let lower = f.floor();
    let weight = f - lower;
    let first = (lower.max(0.0) as u32).min(tiles - 1);
    let second = ((lower + 1.0).max(0.0) as u32).min(tiles - 1);
    (first, second, weight)
}

/// Cap every bin at the clip limit and spread the excess over all bins
fn clip_histogram(hist: &mut [u32; HIST_SIZE], clip_limit: f32, area: u32) {
    let limit = ((clip_limit * area as f32 / HIST_SIZE as f32) as u32).max(1);

    let mut clipped = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }

    let batch = clipped / HIST_SIZE as u32;
    let mut residual = clipped - batch * HIST_SIZE as u32;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (HIST_SIZE / residual as usize).max(1);
        let mut i = 0;
        while i < HIST_SIZE && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

/// Cumulative distribution scaled to 0..=255
fn build_lut(hist: &[u32; HIST_SIZE], area: u32) -> [u8; HIST_SIZE] {
    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; HIST_SIZE];
    let mut sum = 0u32;
    for (i, &count) in hist.iter().enumerate() {
        sum += count;
        lut[i] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(img: GrayImage) -> GrayImage {
        apply(DynamicImage::ImageLuma8(img), &PreprocessConfig::default())
            .unwrap()
            .to_luma8()
    }

    #[test]
    fn test_clahe_preserves_dimensions() {
        // Not divisible by the 8x8 grid
        let img = GrayImage::from_fn(37, 21, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
        let result = run(img);
        assert_eq!(result.dimensions(), (37, 21));
    }

    #[test]
    fn test_clahe_flat_image_stays_flat() {
        let result = run(GrayImage::from_pixel(64, 64, Luma([128])));
        let first = result.get_pixel(0, 0).0[0];
        assert!(result.pixels().all(|p| p.0[0] == first));
    }

    #[test]
    fn test_clahe_handles_image_smaller_than_grid() {
        let img = GrayImage::from_fn(3, 2, |x, _| Luma([(x * 100) as u8]));
        let result = run(img);
        assert_eq!(result.dimensions(), (3, 2));
    }

    #[test]
    fn test_clahe_keeps_dark_ink_darker_than_paper() {
        let mut img = GrayImage::from_pixel(64, 64, Luma([190]));
        for x in 10..50 {
            img.put_pixel(x, 30, Luma([60]));
        }
        let result = run(img);
        assert!(result.get_pixel(30, 30).0[0] < result.get_pixel(30, 10).0[0]);
    }

    #[test]
    fn test_clip_histogram_preserves_pixel_count() {
        let mut hist = [0u32; HIST_SIZE];
        hist[10] = 900;
        hist[200] = 124;
        clip_histogram(&mut hist, 2.0, 1024);

        assert_eq!(hist.iter().sum::<u32>(), 1024);
        // 2.0 * 1024 / 256 = 8 before redistribution
        assert!(hist[10] < 900);
    }

    #[test]
    fn test_lut_is_monotonic_and_ends_at_white() {
        let mut hist = [0u32; HIST_SIZE];
        hist[50] = 30;
        hist[120] = 20;
        hist[240] = 14;
        let lut = build_lut(&hist, 64);

        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(lut[255], 255);
        assert_eq!(lut[0], 0);
    }
}
