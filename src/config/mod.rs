pub mod document;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::dependencies::DependencyProvider;

/// One compile directive from a configuration document.
///
/// A `Config` is either a concrete input/output file pair, or an extension
/// pattern (`inputFile` of the form `*.<ext>`) that the resolver expands
/// into one concrete `Config` per matching physical file. Pattern configs
/// never participate in compilation directly; they only seed expansion.
///
/// On the wire a config is a camelCase JSON record. Fields left at their
/// default value are omitted when the document is written back, and unknown
/// fields in an existing document are ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Path to the owning configuration document. Assigned when the config
    /// is loaded or created; never serialized.
    #[serde(skip)]
    pub file_name: PathBuf,

    /// Path to the output file, relative to the document folder. May carry
    /// a `*.<ext>` wildcard matching the input pattern.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output_file: String,

    /// Path to the input file, relative to the document folder. May carry
    /// a single leading `*.<ext>` wildcard (an extension pattern).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub input_file: String,

    /// Whether the external minifier should produce a minified sibling of
    /// the output file.
    #[serde(default = "default_minify", skip_serializing_if = "is_true")]
    pub minify: bool,

    /// Whether the output file should be included in the owning project.
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_in_project: bool,

    /// Whether a source map should be generated for file types that
    /// support it.
    #[serde(default, skip_serializing_if = "is_false")]
    pub source_map: bool,

    /// Opaque compiler-specific options, passed through unmodified to the
    /// external compiler.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub options: HashMap<String, serde_json::Value>,

    /// True only for configs synthesized by pattern expansion. Never set
    /// for configs read verbatim from a document, and never serialized.
    #[serde(skip)]
    pub from_extension_pattern: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_name: PathBuf::new(),
            output_file: String::new(),
            input_file: String::new(),
            minify: default_minify(),
            include_in_project: false,
            source_map: false,
            options: HashMap::new(),
            from_extension_pattern: false,
        }
    }
}

impl Config {
    /// Whether the input file is an extension pattern (`*.<ext>`).
    #[must_use]
    pub fn is_extension_pattern(&self) -> bool {
        self.input_file.starts_with('*')
    }

    /// The input extension with the leading `*` stripped, or the empty
    /// string when the input is not a pattern.
    #[must_use]
    pub fn input_extension(&self) -> &str {
        self.input_file.strip_prefix('*').unwrap_or("")
    }

    /// The output extension with the leading `*` stripped, or the empty
    /// string when the output carries no wildcard.
    #[must_use]
    pub fn output_extension(&self) -> &str {
        self.output_file.strip_prefix('*').unwrap_or("")
    }

    /// The folder containing the owning document. Relative input and
    /// output paths resolve against this folder.
    #[must_use]
    pub fn document_folder(&self) -> &Path {
        match self.file_name.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// The output file resolved against the document folder.
    #[must_use]
    pub fn absolute_output_file(&self) -> PathBuf {
        self.document_folder().join(&self.output_file)
    }

    /// The input file resolved against the document folder.
    #[must_use]
    pub fn absolute_input_file(&self) -> PathBuf {
        self.document_folder().join(&self.input_file)
    }

    /// Whether the output file is outdated relative to the input file and
    /// its dependency set.
    ///
    /// Compilation is required when:
    /// - the output file does not exist,
    /// - the input file does not exist (freshness cannot be verified),
    /// - the input file was modified strictly later than the output file,
    /// - any dependency reported by `dependencies` for the input file was
    ///   modified strictly later than the output file.
    ///
    /// The provider returns the full transitive dependency set; this
    /// predicate only probes timestamps. A dependency that no longer
    /// exists on disk contributes nothing. Read-only and safe to call
    /// concurrently for different configs.
    #[must_use]
    pub fn compilation_required(&self, dependencies: &dyn DependencyProvider) -> bool {
        let input = self.absolute_input_file();
        let output = self.absolute_output_file();

        let Some(output_modified) = last_modified(&output) else {
            return true;
        };
        let Some(input_modified) = last_modified(&input) else {
            return true;
        };

        if input_modified > output_modified {
            return true;
        }

        dependencies
            .dependencies_of(&input)
            .iter()
            .any(|dependency| {
                last_modified(dependency).is_some_and(|modified| modified > output_modified)
            })
    }
}

/// Last-modified time of a file, or `None` when the file is missing or its
/// metadata cannot be read.
fn last_modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}

/// Serde default for `minify`.
const fn default_minify() -> bool {
    true
}

/// Serde skip helper: omit boolean fields whose default is `true`.
const fn is_true(value: &bool) -> bool {
    *value
}

/// Serde skip helper: omit boolean fields whose default is `false`.
const fn is_false(value: &bool) -> bool {
    !*value
}
