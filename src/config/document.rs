//! Read/write boundary for the configuration document.
//!
//! A document is an ordered JSON array of [`Config`] records. Reading a
//! malformed document is a fatal error; a *missing* document is handled one
//! level up by the resolver, which treats absence as an empty directive
//! list.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::Config;

/// Load every config from the document at `path`, assigning each one's
/// `file_name`.
///
/// Document order is preserved. Unknown fields in the document are
/// ignored; fields absent from a record take their defaults.
///
/// # Errors
///
/// Returns an error if the document cannot be read or does not parse as a
/// JSON array of config records.
pub fn read_document(path: &Path) -> Result<Vec<Config>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading configuration document {}", path.display()))?;

    let mut configs: Vec<Config> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing configuration document {}", path.display()))?;

    for config in &mut configs {
        config.file_name = path.to_path_buf();
    }

    Ok(configs)
}

/// Serialize `configs` to the document at `path`, overwriting it in place.
///
/// Output is pretty-printed JSON. Fields at their default value are
/// omitted, so a round-trip never pollutes the document with noise.
///
/// # Errors
///
/// Returns an error if serialization fails or the document cannot be
/// written.
pub fn write_document(path: &Path, configs: &[Config]) -> Result<()> {
    let contents = serde_json::to_string_pretty(configs)
        .context("serializing configuration document")?;

    fs::write(path, contents)
        .with_context(|| format!("writing configuration document {}", path.display()))?;

    Ok(())
}
