use crate::error::LedgerError;
use image::DynamicImage;
use imageproc::filter::filter3x3;

/// 3x3 Gaussian kernel (sigma derived from the kernel size), weights sum to 1
const GAUSSIAN_3X3: [f32; 9] = [
    1.0 / 16.0,
    2.0 / 16.0,
    1.0 / 16.0,
    2.0 / 16.0,
    4.0 / 16.0,
    2.0 / 16.0,
    1.0 / 16.0,
    2.0 / 16.0,
    1.0 / 16.0,
];

/// Smooth sensor noise before contrast enhancement
pub fn apply(image: DynamicImage) -> Result<DynamicImage, LedgerError> {
    let gray = image.to_luma8();
    let blurred = filter3x3(&gray, &GAUSSIAN_3X3);
    Ok(DynamicImage::ImageLuma8(blurred))
}
