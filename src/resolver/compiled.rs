//! The fast path: compiled package metadata.
//!
//! A compiled package is a `.mpkg.json` file holding the package's
//! exported interface (see [`PackageMeta`]). Metadata lives under a
//! `mica-pkg/` directory keyed by import path, so `math/vec` compiled
//! below `/work` is `/work/mica-pkg/math/vec.mpkg.json`. Lookup walks
//! from the requesting directory up to the filesystem root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::semantic::package::{Package, PackageMeta};

pub const COMPILED_DIR: &str = "mica-pkg";
pub const COMPILED_SUFFIX: &str = ".mpkg.json";

#[derive(Debug, Error)]
pub enum CompiledError {
    #[error("no compiled package metadata for \"{0}\"")]
    NotFound(String),
    #[error("{}: {source}", file.display())]
    Unreadable {
        file: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: malformed package metadata: {source}", file.display())]
    Malformed {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Import `path` from compiled metadata, searching upward from `from_dir`.
///
/// Any error here sends the resolver to the source fallback; a
/// malformed metadata file is reported distinctly so the condition is
/// visible in debug logs rather than silently shadowed by the
/// fallback's own result.
pub fn import_compiled(path: &str, from_dir: &Path) -> Result<Package, CompiledError> {
    for root in from_dir.ancestors() {
        let candidate = root.join(COMPILED_DIR).join(format!("{path}{COMPILED_SUFFIX}"));
        if !candidate.is_file() {
            continue;
        }
        let text = fs::read_to_string(&candidate).map_err(|source| CompiledError::Unreadable {
            file: candidate.clone(),
            source,
        })?;
        let meta: PackageMeta =
            serde_json::from_str(&text).map_err(|source| CompiledError::Malformed {
                file: candidate.clone(),
                source,
            })?;
        tracing::trace!(import = path, file = %candidate.display(), "read compiled metadata");
        return Ok(meta.into_package(path));
    }
    Err(CompiledError::NotFound(path.to_string()))
}
