//! Individual preprocessing steps, in the order the pipeline runs them

pub mod grayscale;
pub mod blur;
pub mod contrast;
pub mod threshold;
pub mod morphology;
