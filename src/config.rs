use clap::Parser;
use std::path::PathBuf;

use crate::preprocessing::PreprocessConfig;

#[derive(Parser, Debug)]
#[command(name = "gift-ledger-ocr")]
#[command(about = "Extract name/amount/guest rows from a photographed gift-money ledger")]
#[command(version)]
pub struct Args {
    /// Ledger photo to read (JPEG, PNG or any format the decoder supports)
    pub image_path: PathBuf,

    /// Destination CSV file (overwritten)
    #[arg(short, long, env = "LEDGER_OUTPUT", default_value = "output.csv")]
    pub output: PathBuf,

    /// Skip preprocessing and the secondary OCR pass
    #[arg(long)]
    pub no_preprocessing: bool,

    /// Also write a JSON report of the whole run to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Engine producing the structured text regions ("ocrs" or "leptess")
    #[arg(long, env = "LEDGER_PRIMARY_ENGINE")]
    pub primary_engine: Option<String>,

    /// Tesseract language set used by the leptess engine
    #[arg(long, env = "LEDGER_LANGUAGE", default_value = "kor+eng")]
    pub language: String,

    /// Directory for downloaded models (defaults to the user cache dir)
    #[arg(long, env = "LEDGER_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Path to tessdata directory (downloaded into the model dir if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Side length of the square closing kernel, in pixels
    #[arg(long, default_value = "1")]
    pub close_kernel: u8,

    /// CLAHE clip limit
    #[arg(long, default_value = "2.0")]
    pub clahe_clip_limit: f32,

    /// CLAHE tile grid size (tiles per axis)
    #[arg(long, default_value = "8")]
    pub clahe_tile_grid: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub image_path: PathBuf,
    pub output_path: PathBuf,
    pub use_preprocessing: bool,
    pub report_path: Option<PathBuf>,
    pub primary_engine: Option<String>,
    pub language: String,
    pub model_dir: Option<PathBuf>,
    pub tessdata_path: Option<String>,
    pub preprocess: PreprocessConfig,
}

impl Config {
    /// Configuration for `image_path` with every other option at its default
    pub fn for_image(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            output_path: PathBuf::from("output.csv"),
            use_preprocessing: true,
            report_path: None,
            primary_engine: None,
            language: "kor+eng".to_string(),
            model_dir: None,
            tessdata_path: None,
            preprocess: PreprocessConfig::default(),
        }
    }

    /// Directory where models and tessdata are cached
    pub fn model_cache_dir(&self) -> PathBuf {
        self.model_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("gift-ledger-ocr")
        })
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            image_path: args.image_path,
            output_path: args.output,
            use_preprocessing: !args.no_preprocessing,
            report_path: args.report,
            primary_engine: args.primary_engine,
            language: args.language,
            model_dir: args.model_dir,
            tessdata_path: args.tessdata_path,
            preprocess: PreprocessConfig {
                close_kernel: args.close_kernel,
                clahe_clip_limit: args.clahe_clip_limit,
                clahe_tile_grid: args.clahe_tile_grid,
            },
        }
    }
}
