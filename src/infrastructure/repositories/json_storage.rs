use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Writes a pretty-printed JSON snapshot to `path`
pub fn save<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing snapshot")?;
    fs::write(path, json).with_context(|| format!("writing snapshot to {}", path.display()))?;
    Ok(())
}

/// Reads a JSON snapshot from `path`; a missing file loads as the default
pub fn load<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot from {}", path.display()))?;
    serde_json::from_str(&data).context("parsing snapshot")
}
