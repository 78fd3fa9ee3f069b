//! JSON persistence for fitted models and run metadata

use crate::error::{ForecastError, Result};
use crate::training::RunMetadata;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::debug;

fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(())
}

/// Persist a fitted model
pub fn save_model<M: Serialize, P: AsRef<Path>>(model: &M, path: P) -> Result<()> {
    write_json(model, path)
}

/// Load a fitted model; a missing file is `MissingDataError`
pub fn load_model<M: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<M> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ForecastError::MissingDataError(format!(
            "Model not found: {}. Train first.",
            path.display()
        )));
    }

    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Persist run metadata
pub fn save_metadata<P: AsRef<Path>>(metadata: &RunMetadata, path: P) -> Result<()> {
    write_json(metadata, path)
}

/// Load run metadata, `None` when no run has been recorded yet
pub fn load_metadata<P: AsRef<Path>>(path: P) -> Result<Option<RunMetadata>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let reader = BufReader::new(File::open(path)?);
    Ok(Some(serde_json::from_reader(reader)?))
}
