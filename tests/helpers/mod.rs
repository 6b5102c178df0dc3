//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Write a file under `root`, creating parent directories as needed.
pub fn write_source(root: &Path, rel: &str, text: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path
}

/// Write compiled package metadata for `import_path` under the
/// `mica-pkg/` directory of `root`.
pub fn write_compiled_meta(root: &Path, import_path: &str, json: &str) -> PathBuf {
    write_source(root, &format!("mica-pkg/{import_path}.mpkg.json"), json)
}
