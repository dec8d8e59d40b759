//! OCR engine implementations
//!
//! This module contains implementations of the engine traits for different
//! OCR backends. Engines are conditionally compiled based on feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

#[cfg(feature = "engine-ocrs")]
mod confidence;

#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
mod models;

pub mod tsv;

use crate::config::Config;
use crate::engine::{TextBlockEngine, TextRegionEngine};
use crate::error::LedgerError;
use std::sync::Arc;

/// Default primary when compiled in; the only engine here that reads Hangul
const PREFERRED_PRIMARY: &str = "leptess";

/// Which pass an engine serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineRole {
    /// Structured text regions for the parser
    Regions,
    /// Diagnostic text block from the preprocessed image
    TextBlock,
}

/// Information about an available engine
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub role: EngineRole,
}

/// Engines built for this run, constructed once and reused
pub struct EngineRegistry {
    region_engines: Vec<Arc<dyn TextRegionEngine>>,
    block_engines: Vec<Arc<dyn TextBlockEngine>>,
    primary: Arc<dyn TextRegionEngine>,
}

impl EngineRegistry {
    /// Create a registry with all compiled-in engines initialized
    pub fn new(config: &Config) -> Result<Self, LedgerError> {
        #[allow(unused_mut)]
        let mut region_engines: Vec<Arc<dyn TextRegionEngine>> = Vec::new();
        #[allow(unused_mut)]
        let mut block_engines: Vec<Arc<dyn TextBlockEngine>> = Vec::new();

        #[cfg(feature = "engine-ocrs")]
        {
            tracing::info!("Initializing ocrs engine...");
            region_engines.push(Arc::new(ocrs::OcrsEngine::new(config)?));
        }

        #[cfg(feature = "engine-leptess")]
        {
            tracing::info!("Initializing leptess engine...");
            let leptess_engine = Arc::new(leptess::LeptessEngine::new(config)?);
            region_engines.push(leptess_engine.clone());
            block_engines.push(leptess_engine);
        }

        Self::from_engines(region_engines, block_engines, config.primary_engine.as_deref())
    }

    /// Build from already constructed engines. The primary is `primary_name`
    /// if given, otherwise leptess when present, otherwise the first region
    /// engine.
    pub fn from_engines(
        region_engines: Vec<Arc<dyn TextRegionEngine>>,
        block_engines: Vec<Arc<dyn TextBlockEngine>>,
        primary_name: Option<&str>,
    ) -> Result<Self, LedgerError> {
        if region_engines.is_empty() {
            return Err(LedgerError::InitializationError(
                "No OCR engines available. Build with --features engine-ocrs or --features engine-leptess".to_string(),
            ));
        }

        let primary = match primary_name {
            Some(name) => region_engines
                .iter()
                .find(|e| e.name() == name)
                .cloned()
                .ok_or_else(|| {
                    let available: Vec<&str> = region_engines.iter().map(|e| e.name()).collect();
                    LedgerError::InitializationError(format!(
                        "Unknown primary engine '{}' (available: {})",
                        name,
                        available.join(", ")
                    ))
                })?,
            None => region_engines
                .iter()
                .find(|e| e.name() == PREFERRED_PRIMARY)
                .unwrap_or(&region_engines[0])
                .clone(),
        };

        Ok(Self {
            region_engines,
            block_engines,
            primary,
        })
    }

    /// The engine whose regions feed the parser
    pub fn primary(&self) -> Arc<dyn TextRegionEngine> {
        self.primary.clone()
    }

    /// The engine for the diagnostic pass, if one is compiled in
    pub fn secondary(&self) -> Option<Arc<dyn TextBlockEngine>> {
        self.block_engines.first().cloned()
    }

    /// Get info about all available engines
    pub fn info(&self) -> Vec<EngineInfo> {
        let regions = self.region_engines.iter().map(|e| EngineInfo {
            name: e.name(),
            description: e.description(),
            role: EngineRole::Regions,
        });
        let blocks = self.block_engines.iter().map(|e| EngineInfo {
            name: e.name(),
            description: e.description(),
            role: EngineRole::TextBlock,
        });
        regions.chain(blocks).collect()
    }
}
