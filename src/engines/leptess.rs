//! Leptess/Tesseract engine implementation
//!
//! Tesseract-based OCR engine with Korean support. Uses tesseract-static for
//! static linking (no system dependencies). Downloads tessdata (training data)
//! automatically on first use.
//!
//! Serves both passes: per-line regions from TSV output, and a single text
//! block from the preprocessed image.

use super::models::ensure_downloaded;
use super::tsv::parse_tsv_lines;
use crate::config::Config;
use crate::engine::{OcrResult, RawOcrFragment, TextBlockEngine, TextRegionEngine};
use crate::error::LedgerError;
use crate::preprocessing::load_image;
use image::DynamicImage;
use std::path::Path;
use tesseract_static::tesseract::Tesseract;

const ENGINE_NAME: &str = "leptess";

/// Fully automatic page segmentation, used for region detection
const PSM_AUTO: &str = "3";
/// Treat the image as one uniform block of text, used for the text block pass
const PSM_SINGLE_BLOCK: &str = "6";

/// Tesseract OCR Engine
pub struct LeptessEngine {
    /// Path to tessdata directory
    tessdata_path: String,
    /// Tesseract language set, e.g. "kor+eng"
    language: String,
}

impl LeptessEngine {
    /// Create a new Tesseract-based OCR engine
    pub fn new(config: &Config) -> Result<Self, LedgerError> {
        let language = config.language.clone();

        let tessdata_path = match &config.tessdata_path {
            Some(path) => path.clone(),
            None => ensure_tessdata_available(&config.model_cache_dir().join("tessdata"), &language)?,
        };

        // Validate that tessdata is accessible by doing a test initialization
        let test_tess = Tesseract::new(Some(&tessdata_path), Some(&language)).map_err(|e| {
            LedgerError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
        })?;
        drop(test_tess);

        tracing::info!(
            "Leptess engine initialized (tessdata: {}, language: {})",
            tessdata_path,
            language
        );

        Ok(Self {
            tessdata_path,
            language,
        })
    }

    /// Run recognition on an image and hand back the recognized instance
    fn recognize(&self, img: &DynamicImage, page_seg_mode: &str) -> Result<Tesseract, LedgerError> {
        // Convert to RGB8 and encode as BMP (BMP is always supported by leptonica)
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut bmp_data = Vec::new();
        rgb_img
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| LedgerError::adapter(ENGINE_NAME, format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Processing image: {}x{}, BMP size: {} bytes, psm {}",
            width,
            height,
            bmp_data.len(),
            page_seg_mode
        );

        let tess = Tesseract::new(Some(&self.tessdata_path), Some(&self.language))
            .map_err(|e| LedgerError::adapter(ENGINE_NAME, format!("Failed to create Tesseract: {}", e)))?
            .set_variable("tessedit_pageseg_mode", page_seg_mode)
            .map_err(|e| LedgerError::adapter(ENGINE_NAME, format!("Failed to set page mode: {}", e)))?
            .set_image_from_mem(&bmp_data)
            .map_err(|e| {
                LedgerError::adapter(
                    ENGINE_NAME,
                    format!("Failed to set image ({}x{}): {}", width, height, e),
                )
            })?
            .recognize()
            .map_err(|e| LedgerError::adapter(ENGINE_NAME, format!("Failed to recognize text: {}", e)))?;

        Ok(tess)
    }
}

impl TextRegionEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - reads Hangul, better for handwriting photos"
    }

    fn detect_regions(&self, path: &Path) -> Result<Vec<RawOcrFragment>, LedgerError> {
        let img = load_image(path)?;
        let mut tess = self.recognize(&img, PSM_AUTO)?;

        let tsv = tess
            .get_tsv_text(0)
            .map_err(|e| LedgerError::adapter(ENGINE_NAME, format!("Failed to get TSV: {}", e)))?;

        parse_tsv_lines(&tsv)
    }
}

impl TextBlockEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - single text block from the preprocessed image"
    }

    fn recognize_text(&self, image: &DynamicImage) -> Result<OcrResult, LedgerError> {
        let mut tess = self.recognize(image, PSM_SINGLE_BLOCK)?;

        let text = tess
            .get_text()
            .map_err(|e| LedgerError::adapter(ENGINE_NAME, format!("Failed to get text: {}", e)))?;

        // 0-100 scale, -1 when nothing was recognized
        let confidence = (tess.mean_text_conf() as f32 / 100.0).clamp(0.0, 1.0);

        let mut warnings = Vec::new();
        if text.trim().is_empty() {
            warnings.push("no text recognized in preprocessed image".to_string());
        }

        Ok(OcrResult {
            text: text.trim().to_string(),
            confidence,
            warnings,
        })
    }
}

// ============================================================================
// Tessdata download helpers
// ============================================================================

/// Ensure traineddata for every language in `language` ("kor+eng") is cached,
/// returning the tessdata directory
fn ensure_tessdata_available(cache_dir: &Path, language: &str) -> Result<String, LedgerError> {
    for lang in language.split('+').filter(|l| !l.is_empty()) {
        let traineddata_file = format!("{}.traineddata", lang);
        ensure_downloaded(&tessdata_url(lang), cache_dir, &traineddata_file)?;
    }

    // Tesseract expects the directory, not the file
    cache_dir
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| LedgerError::InitializationError("Invalid tessdata path".to_string()))
}

/// Get tessdata download URL for a language
fn tessdata_url(language: &str) -> String {
    // tessdata_fast keeps downloads small
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}
