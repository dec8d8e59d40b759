use crate::error::LedgerError;
use crate::preprocessing::PreprocessConfig;
use image::DynamicImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;

/// Morphological closing (dilate, then erode) with a square kernel
///
/// Fills pinholes in strokes. The kernel side is `2 * (close_kernel / 2) + 1`,
/// so a size of 1 returns the image unchanged and even sizes round up.
pub fn apply(image: DynamicImage, config: &PreprocessConfig) -> Result<DynamicImage, LedgerError> {
    let gray = image.to_luma8();
    let radius = config.close_kernel / 2;
    if radius == 0 {
        return Ok(DynamicImage::ImageLuma8(gray));
    }

    Ok(DynamicImage::ImageLuma8(close(&gray, Norm::LInf, radius)))
}
