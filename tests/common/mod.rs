#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test project fixture: a temp folder holding a configuration document
/// and a source tree next to it.
pub struct TestProject {
    pub temp: TempDir,
}

impl TestProject {
    /// Create an empty project folder.
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: TempDir::new()?,
        })
    }

    /// The project root folder.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Path of the configuration document (not necessarily written yet).
    pub fn document(&self) -> PathBuf {
        self.root().join("compilerconfig.json")
    }

    /// Write the configuration document with the given JSON contents.
    pub fn write_document(&self, contents: &str) -> Result<PathBuf> {
        let path = self.document();
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Create a source file (and its parent folders) under the project
    /// root.
    pub fn create_source(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}
