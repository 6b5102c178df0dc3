//! Import resolution: the two-tier resolver at the heart of the tool.
//!
//! Resolution of an import path tries the fast path first (compiled
//! package metadata on disk) and falls back to the slow path (locate
//! the package's own sources, parse them, and type-check them from
//! scratch). Either way the result is one [`Package`] handle, memoized
//! per import path for the lifetime of the [`Resolver`].
//!
//! The cache is an instance field, not a global: a long-lived caller
//! can run independent checks with independent resolvers.

mod compiled;
mod discovery;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::project::loader::{self, LoadError};
use crate::semantic::engine;
use crate::semantic::package::{Package, Provenance};

pub use compiled::{COMPILED_DIR, COMPILED_SUFFIX, CompiledError, import_compiled};
pub use discovery::{PackageSources, find_package_sources};

/// The seam between the type engine and import resolution.
///
/// The engine calls back through this for every import it encounters,
/// which is how dependency packages get checked recursively against
/// the same cache.
pub trait Importer {
    fn import(&mut self, path: &str, from_dir: &Path) -> Result<Arc<Package>, ImportError>;
}

/// Why an import path could not be resolved.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot find package \"{path}\" in any source root above '{}'", dir.display())]
    NotFound { path: String, dir: PathBuf },
    #[error("import cycle not allowed: \"{0}\"")]
    Cycle(String),
    #[error("could not load package \"{path}\": {source}")]
    Load {
        path: String,
        #[source]
        source: LoadError,
    },
    #[error("package \"{path}\" has type errors: {message}")]
    Typecheck { path: String, message: String },
}

/// The run-scoped import resolver.
pub struct Resolver {
    /// Base working directory; relative requesting directories are
    /// resolved against it before either path runs.
    base_dir: PathBuf,
    cache: FxHashMap<String, Arc<Package>>,
    /// Import paths currently being resolved, for cycle rejection.
    in_flight: FxHashSet<String>,
}

impl Resolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache: FxHashMap::default(),
            in_flight: FxHashSet::default(),
        }
    }

    /// Look up an already resolved package without doing any work.
    pub fn cached(&self, path: &str) -> Option<&Arc<Package>> {
        self.cache.get(path)
    }

    fn full_dir(&self, from_dir: &Path) -> PathBuf {
        if from_dir.is_absolute() {
            from_dir.to_path_buf()
        } else {
            self.base_dir.join(from_dir)
        }
    }

    fn resolve_uncached(&mut self, path: &str, dir: &Path) -> Result<Arc<Package>, ImportError> {
        match import_compiled(path, dir) {
            Ok(package) => {
                tracing::debug!(import = path, "resolved from compiled metadata");
                Ok(Arc::new(package))
            }
            Err(fast_error) => {
                tracing::debug!(
                    import = path,
                    error = %fast_error,
                    "compiled lookup failed; falling back to source"
                );
                let sources = find_package_sources(path, dir)?;
                let files =
                    loader::parse_files(&sources.dir, &sources.files).map_err(|source| {
                        ImportError::Load {
                            path: path.to_string(),
                            source,
                        }
                    })?;
                let checked = engine::check_package(path, &sources.dir, &files, self);
                if let Some(first) = checked.diagnostics.first() {
                    return Err(ImportError::Typecheck {
                        path: path.to_string(),
                        message: first.message.to_string(),
                    });
                }
                debug_assert_eq!(checked.package.provenance, Provenance::SourceFallback);
                tracing::debug!(import = path, dir = %sources.dir.display(), "resolved from source");
                Ok(Arc::new(checked.package))
            }
        }
    }
}

impl Importer for Resolver {
    /// Resolve `path`, fast path first, memoizing successes.
    ///
    /// Failures are not cached: a second reference to the same bad
    /// import repeats the full lookup. Only successful handles enter
    /// the cache, so a transient failure cannot poison later runs of
    /// the same path within this process.
    fn import(&mut self, path: &str, from_dir: &Path) -> Result<Arc<Package>, ImportError> {
        if let Some(package) = self.cache.get(path) {
            tracing::trace!(import = path, "cache hit");
            return Ok(package.clone());
        }
        if !self.in_flight.insert(path.to_string()) {
            return Err(ImportError::Cycle(path.to_string()));
        }

        let dir = self.full_dir(from_dir);
        let result = self.resolve_uncached(path, &dir);
        self.in_flight.remove(path);

        let package = result?;
        self.cache.insert(path.to_string(), package.clone());
        Ok(package)
    }
}
