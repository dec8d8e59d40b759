use crate::error::LedgerError;
use image::DynamicImage;
use serde::Serialize;
use std::path::Path;

/// A corner of a detected text region, in source image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One text span reported by a region engine.
///
/// Built only through [`RawOcrFragment::new`], so every fragment that reaches
/// the parser has a confidence in `0.0..=1.0` and finite coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawOcrFragment {
    text: String,
    confidence: f32,
    polygon: Vec<Point>,
}

impl RawOcrFragment {
    pub fn new(
        text: impl Into<String>,
        confidence: f32,
        polygon: Vec<Point>,
    ) -> Result<Self, LedgerError> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(LedgerError::adapter(
                "fragment",
                format!("confidence out of range: {}", confidence),
            ));
        }
        if polygon.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(LedgerError::adapter(
                "fragment",
                "bounding polygon has non-finite coordinates",
            ));
        }

        Ok(Self {
            text: text.into(),
            confidence,
            polygon,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }
}

/// OCR processing result for a whole image
#[derive(Debug, Clone, Serialize)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f32,
    pub warnings: Vec<String>,
}

/// Engine that reports individual text regions (the structured pass)
pub trait TextRegionEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Detect and recognize text regions, in the engine's scan order
    fn detect_regions(&self, path: &Path) -> Result<Vec<RawOcrFragment>, LedgerError>;
}

/// Engine that reads a whole image into one text block (the diagnostic pass)
pub trait TextBlockEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn recognize_text(&self, image: &DynamicImage) -> Result<OcrResult, LedgerError>;
}
