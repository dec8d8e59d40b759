use crate::error::LedgerError;
use image::DynamicImage;

/// Convert image to single-channel luma
pub fn apply(image: DynamicImage) -> Result<DynamicImage, LedgerError> {
    Ok(DynamicImage::ImageLuma8(image.to_luma8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_grayscale_converts_color_ink() {
        // Red and blue ballpoint ink should both read as darker than paper
        let mut img = RgbImage::from_pixel(10, 10, Rgb([245, 245, 240]));
        img.put_pixel(0, 0, Rgb([200, 20, 20]));
        img.put_pixel(1, 0, Rgb([20, 20, 160]));

        let result = apply(DynamicImage::ImageRgb8(img)).unwrap();
        let gray = result.to_luma8();

        let paper = gray.get_pixel(5, 5).0[0];
        assert!(gray.get_pixel(0, 0).0[0] < paper);
        assert!(gray.get_pixel(1, 0).0[0] < paper);
    }

    #[test]
    fn test_grayscale_preserves_dimensions() {
        let img = RgbImage::new(100, 50);
        let result = apply(DynamicImage::ImageRgb8(img)).unwrap();
        assert!(matches!(result, DynamicImage::ImageLuma8(_)));
        assert_eq!(result.width(), 100);
        assert_eq!(result.height(), 50);
    }
}
