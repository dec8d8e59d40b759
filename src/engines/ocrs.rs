//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use. The published
//! recognition model covers the Latin alphabet, so Hangul names come through
//! only with the leptess engine; amounts and digits are read fine.

use super::confidence::line_confidence;
use super::models::ensure_downloaded;
use crate::config::Config;
use crate::engine::{Point, RawOcrFragment, TextRegionEngine};
use crate::error::LedgerError;
use crate::preprocessing::load_image;
use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams, TextItem};
use rten::Model;
use std::path::Path;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

const ENGINE_NAME: &str = "ocrs";

/// OCR Engine wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

impl OcrsEngine {
    /// Load (downloading if needed) both models and build the engine
    pub fn new(config: &Config) -> Result<Self, LedgerError> {
        tracing::info!("Initializing ocrs OCR engine...");

        let cache_dir = config.model_cache_dir();
        let detection_model_path =
            ensure_downloaded(DETECTION_MODEL_URL, &cache_dir, "text-detection.rten")?;
        let recognition_model_path =
            ensure_downloaded(RECOGNITION_MODEL_URL, &cache_dir, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            LedgerError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            LedgerError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            LedgerError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized successfully");

        Ok(Self { engine })
    }

    /// Detect, group and recognize text lines, one fragment per line
    fn recognize_lines(&self, img: &DynamicImage) -> Result<Vec<RawOcrFragment>, LedgerError> {
        // Convert to RGB8 (HWC format, which is what ImageSource::from_bytes expects)
        let rgb_img = img.to_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions).map_err(|e| {
            LedgerError::adapter(ENGINE_NAME, format!("Failed to create image source: {}", e))
        })?;

        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .map_err(|e| LedgerError::adapter(ENGINE_NAME, format!("Failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .map_err(|e| LedgerError::adapter(ENGINE_NAME, format!("Failed to detect words: {}", e)))?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| {
                LedgerError::adapter(ENGINE_NAME, format!("Failed to recognize text: {}", e))
            })?;

        let mut fragments = Vec::new();
        for line in line_texts.iter().filter_map(|line| line.as_ref()) {
            let text = line
                .words()
                .map(|word| word.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            if text.trim().is_empty() {
                continue;
            }

            let polygon = line
                .rotated_rect()
                .corners()
                .iter()
                .map(|corner| Point::new(corner.x, corner.y))
                .collect();
            let confidence = line_confidence(&text);

            fragments.push(RawOcrFragment::new(text, confidence, polygon)?);
        }

        Ok(fragments)
    }
}

impl TextRegionEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies, Latin script only"
    }

    fn detect_regions(&self, path: &Path) -> Result<Vec<RawOcrFragment>, LedgerError> {
        let img = load_image(path)?;
        let fragments = self.recognize_lines(&img)?;
        tracing::debug!("ocrs recognized {} lines", fragments.len());
        Ok(fragments)
    }
}
