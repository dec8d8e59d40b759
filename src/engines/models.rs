//! Model and tessdata cache

use crate::error::LedgerError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// The recognition model sits close to ureq's default 10 MB body limit
const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// Ensure `filename` exists in `cache_dir`, downloading it from `url` if not
pub fn ensure_downloaded(url: &str, cache_dir: &Path, filename: &str) -> Result<PathBuf, LedgerError> {
    std::fs::create_dir_all(cache_dir).map_err(|e| {
        LedgerError::InitializationError(format!(
            "Failed to create cache directory {:?}: {}",
            cache_dir, e
        ))
    })?;

    let target = cache_dir.join(filename);
    if target.exists() {
        tracing::info!("Using cached {} from {:?}", filename, target);
        return Ok(target);
    }

    tracing::info!("Downloading {} (this may take a moment)...", filename);
    // Download next to the target and rename, so an interrupted download
    // never leaves a truncated file under the final name
    let partial = cache_dir.join(format!("{}.part", filename));
    download_file(url, &partial)?;
    std::fs::rename(&partial, &target).map_err(|e| {
        LedgerError::InitializationError(format!("Failed to move {} into cache: {}", filename, e))
    })?;
    tracing::info!("Downloaded {} to {:?}", filename, target);

    Ok(target)
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), LedgerError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| LedgerError::InitializationError(format!("Failed to download {}: {}", url, e)))?;

    let mut body = response.into_body();
    let buffer = body.with_config().limit(MAX_DOWNLOAD_BYTES).read_to_vec().map_err(|e| {
        LedgerError::InitializationError(format!("Failed to read response body: {}", e))
    })?;

    let mut file = File::create(path).map_err(|e| {
        LedgerError::InitializationError(format!("Failed to create {:?}: {}", path, e))
    })?;
    file.write_all(&buffer)
        .map_err(|e| LedgerError::InitializationError(format!("Failed to write {:?}: {}", path, e)))?;

    Ok(())
}
