//! Recursive file-system scanning for extension-suffix matches.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find every file under `root` whose name ends with `suffix`
/// (e.g. `".razor.scss"`), recursing into subdirectories.
///
/// Symlinks are not followed. Entries that cannot be read are skipped.
/// The result is in file-system enumeration order, not sorted.
#[must_use]
pub fn find_files_with_suffix(root: &Path, suffix: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().to_string_lossy().ends_with(suffix))
        .map(walkdir::DirEntry::into_path)
        .collect()
}
