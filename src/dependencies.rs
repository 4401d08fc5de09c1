//! Boundary to the external dependency index.
//!
//! Discovering which files an input file imports is the job of an external
//! collaborator (per-compiler import scanners). The staleness predicate
//! only consumes the result through [`DependencyProvider`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies the dependency set for an input file.
///
/// Implementations return the *transitive* set: first-level imports and
/// everything deeper. The staleness predicate probes each returned path's
/// last-modified time and nothing else.
pub trait DependencyProvider {
    /// All files the given input file transitively depends on. Unknown
    /// inputs yield an empty set.
    fn dependencies_of(&self, input_file: &Path) -> Vec<PathBuf>;
}

/// A plain map-backed [`DependencyProvider`].
///
/// Useful as the in-memory sink for an external import scanner, and as a
/// fixture in tests.
#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    /// Transitive dependency sets keyed by absolute input path.
    entries: HashMap<PathBuf, Vec<PathBuf>>,
}

impl DependencyMap {
    /// Create an empty dependency map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the transitive dependency set for an input file, replacing
    /// any previous set.
    pub fn insert(&mut self, input_file: impl Into<PathBuf>, dependencies: Vec<PathBuf>) {
        self.entries.insert(input_file.into(), dependencies);
    }

    /// Remove the recorded set for an input file.
    pub fn remove(&mut self, input_file: &Path) -> Option<Vec<PathBuf>> {
        self.entries.remove(input_file)
    }

    /// Number of input files with a recorded dependency set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no dependency sets are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DependencyProvider for DependencyMap {
    fn dependencies_of(&self, input_file: &Path) -> Vec<PathBuf> {
        self.entries.get(input_file).cloned().unwrap_or_default()
    }
}
