//! Image preprocessing for the secondary OCR pass
//!
//! A fixed chain of filters that turns a ledger photo into a clean two-level
//! image: grayscale, blur, contrast, threshold, morphology.

pub mod pipeline;
pub mod steps;

pub use pipeline::{load_image, Pipeline, PreprocessConfig, PreprocessingResult, StepTiming};
