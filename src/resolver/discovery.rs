//! The slow path's first step: locating a package's sources on disk.
//!
//! An import path names a directory relative to some source root; the
//! roots considered are the ancestors of the requesting directory, so
//! `math/vec` imported from `/work/app` is looked for at
//! `/work/app/math/vec`, `/work/math/vec`, and so on upward. Test
//! files never participate in dependency resolution.

use std::path::{Path, PathBuf};

use crate::project::loader;

use super::ImportError;

/// The on-disk location and file list constituting one package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageSources {
    pub dir: PathBuf,
    /// Sorted file names relative to `dir`.
    pub files: Vec<String>,
}

/// Find the directory and file list for `path`, searching upward from
/// `from_dir`. A directory that exists but holds no Mica sources does
/// not satisfy the import; the search continues upward.
pub fn find_package_sources(path: &str, from_dir: &Path) -> Result<PackageSources, ImportError> {
    for root in from_dir.ancestors() {
        let dir = root.join(path);
        if !dir.is_dir() {
            continue;
        }
        match loader::list_source_files(&dir, false) {
            Ok(files) if !files.is_empty() => {
                return Ok(PackageSources { dir, files });
            }
            Ok(_) => {}
            Err(error) => {
                tracing::debug!(dir = %dir.display(), %error, "skipping unreadable candidate");
            }
        }
    }
    Err(ImportError::NotFound {
        path: path.to_string(),
        dir: from_dir.to_path_buf(),
    })
}
