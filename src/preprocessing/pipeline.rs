use crate::error::LedgerError;
use image::DynamicImage;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use super::steps;

/// Tunable parameters of the filter chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreprocessConfig {
    /// Side length of the square closing kernel. 1 leaves the image unchanged.
    pub close_kernel: u8,
    /// CLAHE clip limit, relative to a flat histogram
    pub clahe_clip_limit: f32,
    /// Number of CLAHE tiles along each axis
    pub clahe_tile_grid: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            close_kernel: 1,
            clahe_clip_limit: 2.0,
            clahe_tile_grid: 8,
        }
    }
}

impl PreprocessConfig {
    fn validate(&self) -> Result<(), LedgerError> {
        if self.close_kernel == 0 {
            return Err(LedgerError::PreprocessingError(
                "closing kernel must be at least 1 pixel".to_string(),
            ));
        }
        if !self.clahe_clip_limit.is_finite() || self.clahe_clip_limit <= 0.0 {
            return Err(LedgerError::PreprocessingError(format!(
                "CLAHE clip limit must be positive, got {}",
                self.clahe_clip_limit
            )));
        }
        if self.clahe_tile_grid == 0 {
            return Err(LedgerError::PreprocessingError(
                "CLAHE tile grid must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Preprocessed image (not serialized)
    #[serde(skip)]
    pub image: DynamicImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Parameters the chain ran with
    pub config: PreprocessConfig,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Open and decode an image file
pub fn load_image(path: &Path) -> Result<DynamicImage, LedgerError> {
    image::open(path)
        .map_err(|e| LedgerError::ImageReadError(format!("{}: {}", path.display(), e)))
}

/// Preprocessing pipeline: grayscale, blur, contrast, threshold, morphology
pub struct Pipeline {
    config: PreprocessConfig,
}

impl Pipeline {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Load an image from disk and run the chain on it
    pub fn process_path(&self, path: &Path) -> Result<PreprocessingResult, LedgerError> {
        let image = load_image(path)?;
        self.process(image)
    }

    /// Run the full chain. The output is always a single-channel image.
    pub fn process(&self, image: DynamicImage) -> Result<PreprocessingResult, LedgerError> {
        self.config.validate()?;

        let start = Instant::now();
        let mut steps_timing = Vec::new();
        let config = &self.config;

        let mut img = image;
        img = self.run_step("grayscale", img, &mut steps_timing, steps::grayscale::apply)?;
        img = self.run_step("blur", img, &mut steps_timing, steps::blur::apply)?;
        img = self.run_step("contrast", img, &mut steps_timing, |img| {
            steps::contrast::apply(img, config)
        })?;
        img = self.run_step("threshold", img, &mut steps_timing, steps::threshold::apply)?;
        img = self.run_step("morphology", img, &mut steps_timing, |img| {
            steps::morphology::apply(img, config)
        })?;

        tracing::debug!(
            "Preprocessing finished in {}ms ({} steps)",
            start.elapsed().as_millis(),
            steps_timing.len()
        );

        Ok(PreprocessingResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            config: self.config,
            steps: steps_timing,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: DynamicImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<DynamicImage, LedgerError>
    where
        F: FnOnce(DynamicImage) -> Result<DynamicImage, LedgerError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        Ok(result)
    }
}
