//! One ledger photo from start to finish

use crate::engine::{RawOcrFragment, TextBlockEngine, TextRegionEngine};
use crate::error::LedgerError;
use crate::ledger::{parse_fragments, LedgerEntry};
use crate::preprocessing::{Pipeline, PreprocessConfig, StepTiming};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct LedgerReport {
    /// Fragments from the region engine, in scan order
    pub fragments: Vec<RawOcrFragment>,
    /// Text block from the secondary engine, if that pass ran and succeeded
    pub secondary_text: Option<String>,
    /// Parsed rows, in fragment order
    pub entries: Vec<LedgerEntry>,
    /// Preprocessing step timings, if preprocessing ran
    pub preprocessing: Option<Vec<StepTiming>>,
    pub warnings: Vec<String>,
    pub processing_time_ms: u64,
}

/// Runs the OCR engines and the parser over a ledger photo.
///
/// Engines are built once by the caller and shared read-only across runs.
pub struct LedgerProcessor {
    primary: Arc<dyn TextRegionEngine>,
    secondary: Option<Arc<dyn TextBlockEngine>>,
    pipeline: Pipeline,
}

impl LedgerProcessor {
    pub fn new(
        primary: Arc<dyn TextRegionEngine>,
        secondary: Option<Arc<dyn TextBlockEngine>>,
        preprocess: PreprocessConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            pipeline: Pipeline::new(preprocess),
        }
    }

    /// Process one image.
    ///
    /// Unreadable images and primary engine failures abort the run. The
    /// preprocessing + secondary pass is diagnostic only: its failures become
    /// warnings and the entries are still returned.
    pub fn process(&self, path: &Path, use_preprocessing: bool) -> Result<LedgerReport, LedgerError> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        ensure_readable(path)?;
        tracing::info!("Processing {}", path.display());

        tracing::info!("1. Running primary OCR ({})...", self.primary.name());
        let fragments = self.primary.detect_regions(path)?;
        tracing::info!("Primary OCR found {} text regions", fragments.len());

        let mut secondary_text = None;
        let mut preprocessing = None;
        if use_preprocessing {
            match &self.secondary {
                Some(engine) => match self.run_secondary(engine.as_ref(), path) {
                    Ok((text, timings)) => {
                        secondary_text = Some(text);
                        preprocessing = Some(timings);
                    }
                    Err(e) => {
                        tracing::warn!("Secondary OCR pass failed, continuing without it: {}", e);
                        warnings.push(format!("{}: {}", e.code(), e));
                    }
                },
                None => {
                    tracing::warn!("No secondary OCR engine available, skipping preprocessing pass");
                    warnings.push("secondary OCR engine not available".to_string());
                }
            }
        }

        tracing::info!("4. Parsing ledger rows...");
        let entries = parse_fragments(&fragments);
        tracing::info!(
            "Parsed {} ledger rows from {} fragments",
            entries.len(),
            fragments.len()
        );

        Ok(LedgerReport {
            fragments,
            secondary_text,
            entries,
            preprocessing,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn run_secondary(
        &self,
        engine: &dyn TextBlockEngine,
        path: &Path,
    ) -> Result<(String, Vec<StepTiming>), LedgerError> {
        tracing::info!("2. Preprocessing image...");
        let preprocessed = self.pipeline.process_path(path)?;
        tracing::debug!("Preprocessing took {}ms", preprocessed.total_time_ms);

        tracing::info!("3. Running secondary OCR ({})...", engine.name());
        let result = engine.recognize_text(&preprocessed.image)?;
        for warning in &result.warnings {
            tracing::warn!("{}: {}", engine.name(), warning);
        }
        tracing::info!(
            "Secondary OCR read {} chars, confidence: {:.2}",
            result.text.chars().count(),
            result.confidence
        );

        Ok((result.text, preprocessed.steps))
    }
}

/// Fail fast with `ImageReadError` before any engine touches the file
pub fn ensure_readable(path: &Path) -> Result<(), LedgerError> {
    image::image_dimensions(path)
        .map(|_| ())
        .map_err(|e| LedgerError::ImageReadError(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{OcrResult, Point};
    use image::{DynamicImage, GrayImage, Luma};

    struct FixedRegions(Vec<&'static str>);

    impl TextRegionEngine for FixedRegions {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn description(&self) -> &'static str {
            "returns preset regions"
        }

        fn detect_regions(&self, _path: &Path) -> Result<Vec<RawOcrFragment>, LedgerError> {
            self.0
                .iter()
                .map(|t| RawOcrFragment::new(*t, 0.8, vec![Point::new(0.0, 0.0)]))
                .collect()
        }
    }

    struct FailingRegions;

    impl TextRegionEngine for FailingRegions {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn description(&self) -> &'static str {
            "always fails"
        }

        fn detect_regions(&self, _path: &Path) -> Result<Vec<RawOcrFragment>, LedgerError> {
            Err(LedgerError::adapter("failing", "model crashed"))
        }
    }

    struct EchoBlock {
        fail: bool,
    }

    impl TextBlockEngine for EchoBlock {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "reports the image size"
        }

        fn recognize_text(&self, image: &DynamicImage) -> Result<OcrResult, LedgerError> {
            if self.fail {
                return Err(LedgerError::adapter("echo", "no tessdata"));
            }
            Ok(OcrResult {
                text: format!("{}x{}", image.width(), image.height()),
                confidence: 0.5,
                warnings: Vec::new(),
            })
        }
    }

    fn sample_image(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("ledger.png");
        GrayImage::from_fn(32, 16, |x, _| Luma([if x % 8 == 0 { 20 } else { 230 }]))
            .save(&path)
            .unwrap();
        path
    }

    fn processor(secondary: Option<EchoBlock>) -> LedgerProcessor {
        LedgerProcessor::new(
            Arc::new(FixedRegions(vec!["홍길동", "100,000원", "大2", "김철수 50,000 小1"])),
            secondary.map(|s| Arc::new(s) as Arc<dyn TextBlockEngine>),
            PreprocessConfig::default(),
        )
    }

    #[test]
    fn test_process_parses_primary_fragments() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_image(dir.path());

        let report = processor(Some(EchoBlock { fail: false }))
            .process(&path, true)
            .unwrap();

        assert_eq!(report.fragments.len(), 4);
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.entries[2].notes, "소 1인");
        assert_eq!(report.secondary_text.as_deref(), Some("32x16"));
        assert_eq!(report.preprocessing.as_ref().map(|s| s.len()), Some(5));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_secondary_failure_does_not_block_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_image(dir.path());

        let report = processor(Some(EchoBlock { fail: true }))
            .process(&path, true)
            .unwrap();

        assert_eq!(report.entries.len(), 3);
        assert!(report.secondary_text.is_none());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("ADAPTER_ERROR"));
    }

    #[test]
    fn test_without_preprocessing_secondary_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_image(dir.path());

        let report = processor(Some(EchoBlock { fail: false }))
            .process(&path, false)
            .unwrap();

        assert!(report.secondary_text.is_none());
        assert!(report.preprocessing.is_none());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_secondary_engine_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_image(dir.path());

        let report = processor(None).process(&path, true).unwrap();
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_missing_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = processor(None)
            .process(&dir.path().join("nope.jpg"), true)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ImageReadError(_)));
    }

    #[test]
    fn test_primary_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_image(dir.path());
        let processor = LedgerProcessor::new(
            Arc::new(FailingRegions),
            None,
            PreprocessConfig::default(),
        );

        let err = processor.process(&path, true).unwrap_err();
        assert!(matches!(err, LedgerError::AdapterError { .. }));
    }
}
