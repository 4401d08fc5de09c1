use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;

/// The synthesized configs for one `(document, extension)` pair, keyed by
/// absolute source-file path.
pub type Expansions = Arc<DashMap<PathBuf, Config>>;

/// Cache key: one expansion map per `(document, input extension)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Canonicalized path of the owning configuration document.
    document: PathBuf,
    /// Input extension of the pattern config, leading `*` stripped.
    extension: String,
}

impl CacheKey {
    /// Build a key from a document path and input extension.
    fn new(document: &Path, extension: &str) -> Self {
        Self {
            document: document.to_path_buf(),
            extension: extension.to_string(),
        }
    }
}

/// Process-lifetime cache of pattern expansions, shared across every
/// clone of the owning resolver.
///
/// Entries map `(document, input extension)` to the set of configs
/// synthesized for that pattern, keyed by absolute source-file path.
/// Population is lazy and first-writer-wins: two threads racing to expand
/// the same pattern produce exactly one population, and the loser observes
/// the winner's result. Entries are never evicted except through
/// [`ExpansionCache::clear`].
#[derive(Debug, Clone, Default)]
pub struct ExpansionCache {
    /// Shared expansion maps; cloning the cache shares this storage.
    entries: Arc<DashMap<CacheKey, Expansions>>,
}

impl ExpansionCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the expansions for `(document, extension)`, running
    /// `populate` to produce them when the entry does not exist yet.
    ///
    /// Exactly one caller populates a given key; concurrent callers block
    /// on the entry and then observe the populated map. The returned view
    /// is shared, so later insertions through
    /// [`ExpansionCache::insert_if_absent`] are visible through it.
    pub fn get_or_populate(
        &self,
        document: &Path,
        extension: &str,
        populate: impl FnOnce() -> HashMap<PathBuf, Config>,
    ) -> Expansions {
        match self.entries.entry(CacheKey::new(document, extension)) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let expansions: Expansions = Arc::new(populate().into_iter().collect());
                debug!(
                    document = %document.display(),
                    extension,
                    files = expansions.len(),
                    "populated expansion cache entry"
                );
                Arc::clone(entry.insert(expansions).value())
            }
        }
    }

    /// Insert one synthesized config for `source_file` into an existing
    /// entry, unless that file is already cached.
    ///
    /// This is the incremental path used when a watcher reports a newly
    /// created file: no re-scan, and concurrent insertions of the same
    /// file keep the first one's options. A no-op when the
    /// `(document, extension)` entry has not been populated.
    pub fn insert_if_absent(
        &self,
        document: &Path,
        extension: &str,
        source_file: &Path,
        synthesize: impl FnOnce() -> Config,
    ) {
        let Some(entry) = self.entries.get(&CacheKey::new(document, extension)) else {
            return;
        };
        let expansions = Arc::clone(entry.value());
        drop(entry);

        expansions
            .entry(source_file.to_path_buf())
            .or_insert_with(|| {
                debug!(
                    source = %source_file.display(),
                    extension,
                    "inserting newly reported source file into expansion cache"
                );
                synthesize()
            });
    }

    /// Drop every entry for every document, forcing a full re-scan on the
    /// next expansion.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Whether an expansion entry exists for `(document, extension)`.
    #[must_use]
    pub fn is_populated(&self, document: &Path, extension: &str) -> bool {
        self.entries.contains_key(&CacheKey::new(document, extension))
    }

    /// Number of `(document, extension)` entries currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    fn synthesized(input: &str) -> Config {
        Config {
            input_file: input.to_string(),
            from_extension_pattern: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_concurrent_population_has_single_winner() {
        let cache = Arc::new(ExpansionCache::new());
        let populations = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(10));
        let mut handles = vec![];

        for _ in 0..10 {
            let cache = Arc::clone(&cache);
            let populations = Arc::clone(&populations);
            let barrier = Arc::clone(&barrier);

            handles.push(thread::spawn(move || {
                barrier.wait();

                let expansions =
                    cache.get_or_populate(Path::new("/p/compilerconfig.json"), ".scss", || {
                        populations.fetch_add(1, Ordering::SeqCst);
                        let mut files = HashMap::new();
                        files.insert(PathBuf::from("/p/site.scss"), synthesized("site.scss"));
                        files
                    });

                assert_eq!(expansions.len(), 1);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(populations.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_if_absent_keeps_existing_entry() {
        let cache = ExpansionCache::new();
        let document = Path::new("/p/compilerconfig.json");

        cache.get_or_populate(document, ".scss", || {
            let mut files = HashMap::new();
            files.insert(PathBuf::from("/p/site.scss"), synthesized("site.scss"));
            files
        });

        // Same source file twice: the second synthesize closure never runs.
        cache.insert_if_absent(document, ".scss", Path::new("/p/new.scss"), || {
            synthesized("new.scss")
        });
        cache.insert_if_absent(document, ".scss", Path::new("/p/new.scss"), || {
            panic!("must not re-synthesize a cached file")
        });

        let expansions = cache.get_or_populate(document, ".scss", HashMap::new);
        assert_eq!(expansions.len(), 2);
    }

    #[test]
    fn test_insert_into_unpopulated_entry_is_noop() {
        let cache = ExpansionCache::new();

        cache.insert_if_absent(
            Path::new("/p/compilerconfig.json"),
            ".scss",
            Path::new("/p/new.scss"),
            || synthesized("new.scss"),
        );

        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_drops_all_entries() {
        let cache = ExpansionCache::new();
        cache.get_or_populate(Path::new("/a/compilerconfig.json"), ".scss", HashMap::new);
        cache.get_or_populate(Path::new("/b/compilerconfig.json"), ".less", HashMap::new);
        assert_eq!(cache.len(), 2);

        cache.clear();

        assert!(cache.is_empty());
        assert!(!cache.is_populated(Path::new("/a/compilerconfig.json"), ".scss"));
    }
}
