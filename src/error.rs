use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to read image: {0}")]
    ImageReadError(String),

    #[error("OCR engine '{engine}' failed: {message}")]
    AdapterError { engine: String, message: String },

    #[error("Preprocessing failed: {0}")]
    PreprocessingError(String),

    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

impl LedgerError {
    pub fn adapter(engine: &str, message: impl Into<String>) -> Self {
        LedgerError::AdapterError {
            engine: engine.to_string(),
            message: message.into(),
        }
    }

    /// Short machine-readable code, used in the JSON report warnings
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::ImageReadError(_) => "IMAGE_READ_ERROR",
            LedgerError::AdapterError { .. } => "ADAPTER_ERROR",
            LedgerError::PreprocessingError(_) => "PREPROCESSING_ERROR",
            LedgerError::InitializationError(_) => "INIT_ERROR",
            LedgerError::WriteError(_) => "WRITE_ERROR",
        }
    }
}
