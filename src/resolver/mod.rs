pub mod cache;

use anyhow::{Context, Result};
use serde_json::json;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Config;
use crate::config::document::{read_document, write_document};
use crate::resolver::cache::ExpansionCache;
use crate::scanner;

/// Resolves a configuration document into concrete compile directives.
///
/// The resolver owns an [`ExpansionCache`]; clones share it, so a set of
/// file-watcher callbacks can each hold a clone and still observe one
/// process-wide expansion state. All operations are safe to invoke
/// concurrently. Document rewrites (`add_config`/`remove_config`) race at
/// the file level with last-writer-wins semantics; callers that need
/// atomicity across the read-modify-write must serialize those calls.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    /// Shared pattern-expansion cache.
    cache: ExpansionCache,
}

impl ConfigResolver {
    /// Create a resolver with a fresh, empty expansion cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver sharing an existing expansion cache.
    #[must_use]
    pub fn with_cache(cache: ExpansionCache) -> Self {
        Self { cache }
    }

    /// The expansion cache backing this resolver.
    #[must_use]
    pub fn cache(&self) -> &ExpansionCache {
        &self.cache
    }

    /// Drop every cached expansion for every document, forcing a full
    /// re-scan on the next [`ConfigResolver::get_configs`] call.
    pub fn clear_expansion_cache(&self) {
        self.cache.clear();
    }

    /// Resolve the document at `document` into a list of configs.
    ///
    /// A missing document resolves to an empty list; "no directives" is a
    /// normal, silent case for callers. Raw non-pattern configs pass
    /// through in document order. Pattern configs are expanded into one
    /// synthesized config per matching file under the document folder,
    /// via the expansion cache; synthesized configs follow the raw ones in
    /// file-system enumeration order. A synthesized config whose input
    /// path is already explicitly declared in the document is suppressed.
    ///
    /// `source_file` is the incremental path for watcher callbacks: a file
    /// not seen at scan time is inserted into the cache without a re-scan,
    /// and pattern configs whose extension does not match `source_file`
    /// are skipped entirely (no scan, no emission).
    ///
    /// With `expand_patterns == false` no scan occurs and raw pattern
    /// configs are retained verbatim in the result; this is the load path
    /// for document mutation, which must not persist synthesized entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the document exists but cannot be read or
    /// parsed.
    pub fn get_configs(
        &self,
        document: &Path,
        source_file: Option<&Path>,
        expand_patterns: bool,
    ) -> Result<Vec<Config>> {
        if !document.exists() {
            debug!(document = %document.display(), "document not found, resolving to empty");
            return Ok(Vec::new());
        }

        let raw = read_document(document)?;
        // Cache entries and per-file keys both derive from the canonical
        // document path, so relative and absolute spellings of the same
        // document share one expansion state and never double-count a
        // physical file.
        let document_key = fs::canonicalize(document).unwrap_or_else(|_| document.to_path_buf());
        let folder = document_folder(&document_key);
        let source_file = source_file.map(|source| {
            let absolute = if source.is_absolute() {
                source.to_path_buf()
            } else {
                folder.join(source)
            };
            fs::canonicalize(&absolute).unwrap_or(absolute)
        });

        let explicit_inputs: HashSet<String> = raw
            .iter()
            .filter(|config| !config.is_extension_pattern())
            .map(|config| config.input_file.clone())
            .collect();

        let mut resolved = Vec::with_capacity(raw.len());
        let mut synthesized = Vec::new();

        for config in raw {
            if !config.is_extension_pattern() {
                resolved.push(config);
                continue;
            }
            if !expand_patterns {
                resolved.push(config);
                continue;
            }

            let extension = config.input_extension().to_string();

            // A watcher callback names one changed file; patterns for
            // unrelated extensions are skipped without a scan.
            if let Some(source) = &source_file
                && !source.to_string_lossy().ends_with(&extension)
            {
                continue;
            }

            let expansions = self.cache.get_or_populate(&document_key, &extension, || {
                scanner::find_files_with_suffix(&folder, &extension)
                    .into_iter()
                    .map(|file| {
                        let synthesized = synthesize_config(&config, &folder, document, &file);
                        (file, synthesized)
                    })
                    .collect()
            });

            if let Some(source) = &source_file {
                self.cache
                    .insert_if_absent(&document_key, &extension, source, || {
                        synthesize_config(&config, &folder, document, source)
                    });
            }

            for cached in expansions.iter() {
                if explicit_inputs.contains(&cached.value().input_file) {
                    continue;
                }
                synthesized.push(cached.value().clone());
            }
        }

        resolved.append(&mut synthesized);
        Ok(resolved)
    }

    /// Append `config` to the document at `document`, creating the
    /// document if it does not exist yet.
    ///
    /// The existing entries are loaded unexpanded, so pattern configs are
    /// preserved verbatim and no synthesized entry is ever persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing document cannot be parsed or the
    /// rewrite fails.
    pub fn add_config(&self, document: &Path, mut config: Config) -> Result<()> {
        let mut configs = self.get_configs(document, None, false)?;

        config.file_name = document.to_path_buf();
        configs.push(config);

        debug!(document = %document.display(), count = configs.len(), "appending config");
        write_document(document, &configs)
    }

    /// Remove `config` from its owning document.
    ///
    /// Matching is by value equality over all fields; the first structural
    /// match in document order is removed. Two field-identical configs are
    /// indistinguishable here. Removal of a config not present in the
    /// current document state is a silent no-op: the document is not
    /// rewritten at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or the rewrite
    /// fails.
    pub fn remove_config(&self, config: &Config) -> Result<()> {
        let mut configs = self.get_configs(&config.file_name, None, false)?;

        let Some(position) = configs.iter().position(|existing| existing == config) else {
            debug!(
                document = %config.file_name.display(),
                input = %config.input_file,
                "config not present, nothing to remove"
            );
            return Ok(());
        };

        configs.remove(position);
        debug!(
            document = %config.file_name.display(),
            input = %config.input_file,
            "removing config"
        );
        write_document(&config.file_name, &configs)
    }

    /// Write a defaults document holding the default compiler and
    /// minifier option blocks, unless a file already exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults document cannot be written.
    pub fn create_defaults_file(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }

        let defaults = json!({
            "compilers": {
                "less": {
                    "autoPrefix": "",
                    "ieCompat": true,
                    "strictMath": false,
                    "strictUnits": false,
                    "relativeUrls": true,
                    "rootPath": "",
                    "sourceMapRoot": ""
                },
                "sass": {
                    "autoPrefix": "",
                    "includePath": "",
                    "indentType": "space",
                    "indentWidth": 2,
                    "outputStyle": "nested",
                    "precision": 5,
                    "relativeUrls": true,
                    "sourceMapRoot": ""
                },
                "stylus": {
                    "sourceMapRoot": ""
                },
                "babel": {
                    "sourceMapRoot": ""
                },
                "coffeescript": {
                    "bare": false,
                    "runtimeMode": "node",
                    "sourceMapRoot": ""
                },
                "handlebars": {
                    "root": "",
                    "noBOM": false,
                    "name": "",
                    "namespace": "",
                    "knownHelpersOnly": false,
                    "forcePartial": false,
                    "knownHelpers": [],
                    "commonjs": "",
                    "amd": false,
                    "sourceMapRoot": ""
                }
            },
            "minifiers": {
                "css": {
                    "enabled": true,
                    "termSemicolons": true,
                    "gzip": false
                },
                "javascript": {
                    "enabled": true,
                    "termSemicolons": true,
                    "gzip": false
                }
            }
        });

        let contents =
            serde_json::to_string_pretty(&defaults).context("serializing defaults document")?;
        fs::write(path, contents)
            .with_context(|| format!("writing defaults document {}", path.display()))?;

        debug!(path = %path.display(), "created defaults document");
        Ok(())
    }
}

/// The folder containing a configuration document.
fn document_folder(document: &Path) -> PathBuf {
    match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Build the concrete config for one file matched by a pattern config.
///
/// The input path is re-relativized to the document folder; the output
/// path is the input path with the pattern's input-extension suffix
/// replaced by its output extension. Option values are inherited from the
/// pattern as of expansion time.
fn synthesize_config(pattern: &Config, folder: &Path, document: &Path, file: &Path) -> Config {
    let input_file = file
        .strip_prefix(folder)
        .unwrap_or(file)
        .to_string_lossy()
        .into_owned();
    let output_file = input_file
        .strip_suffix(pattern.input_extension())
        .map_or_else(
            || input_file.clone(),
            |stem| format!("{stem}{}", pattern.output_extension()),
        );

    Config {
        file_name: document.to_path_buf(),
        input_file,
        output_file,
        minify: pattern.minify,
        include_in_project: pattern.include_in_project,
        source_map: pattern.source_map,
        options: pattern.options.clone(),
        from_extension_pattern: true,
    }
}
