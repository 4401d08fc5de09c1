#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # Assetpipe - Asset Compilation Configuration Resolver
//!
//! Assetpipe resolves a declarative build-configuration document into a
//! concrete, per-file set of compile tasks and decides which of those tasks
//! are stale and must be re-run. It is the configuration core of an
//! asset-compilation pipeline (LESS/Sass/Babel/CoffeeScript preprocessors):
//! a project declares either explicit input/output file pairs or wildcard
//! extension patterns ("compile every file matching this suffix"), and this
//! crate turns that declaration into work items.
//!
//! ## Architecture
//!
//! The codebase is organized into a few focused modules:
//!
//! - [`config`]: The [`Config`] directive model, its document serialization
//!   and the timestamp-based staleness predicate
//! - [`resolver`]: The [`ConfigResolver`] engine that expands wildcard
//!   directives, caches expansions and mutates the document
//! - [`scanner`]: Recursive file-system scanning for extension matches
//! - [`dependencies`]: The [`DependencyProvider`] boundary through which an
//!   external dependency index feeds the staleness predicate
//!
//! The compilers themselves, the minifier, dependency discovery and
//! file-system watching are external collaborators: this crate decides
//! *what* to compile and *whether* it needs compiling, never *how*.
//!
//! ## Example Usage
//!
//! ```no_run
//! use assetpipe::{ConfigResolver, DependencyMap};
//!
//! # fn main() -> anyhow::Result<()> {
//! let resolver = ConfigResolver::new();
//! let dependencies = DependencyMap::new();
//!
//! for config in resolver.get_configs("compilerconfig.json".as_ref(), None, true)? {
//!     if config.compilation_required(&dependencies) {
//!         // hand `config` to the external compiler
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Configuration directive model, document serialization and staleness.
pub mod config;

/// Dependency index boundary consumed by the staleness predicate.
pub mod dependencies;

/// Resolution engine: pattern expansion, caching and document mutation.
pub mod resolver;

/// Recursive file-system scanning for extension-suffix matches.
pub mod scanner;

pub use config::Config;
pub use dependencies::{DependencyMap, DependencyProvider};
pub use resolver::ConfigResolver;
pub use resolver::cache::ExpansionCache;

/// Current version of the assetpipe crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Conventional name of the configuration document in a project folder.
pub const CONFIG_FILE: &str = "compilerconfig.json";

/// Conventional name of the defaults document holding compiler and
/// minifier option blocks.
pub const DEFAULTS_FILE: &str = "compilerconfig.json.defaults";
