//! Unit discovery: which files constitute the package being checked.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::base::normalize_path;

use super::loader::{self, SOURCE_SUFFIX, is_test_file};

/// Policy knobs for unit discovery, set from the command line.
#[derive(Debug, Clone, Copy)]
pub struct UnitOptions {
    /// Check the whole owning package but restrict reported
    /// diagnostics to the named file. Off means the named files alone
    /// form the unit.
    pub package_context: bool,
    /// Allow in-package `_test.mica` files into the unit when the
    /// named file is itself a test file.
    pub include_tests: bool,
}

impl Default for UnitOptions {
    fn default() -> Self {
        Self {
            package_context: true,
            include_tests: false,
        }
    }
}

/// The resolved unit: a directory, the files to check inside it, and
/// the optional single file diagnostics are restricted to.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckUnit {
    pub dir: PathBuf,
    pub files: Vec<String>,
    /// Normalized absolute path of the restriction file, if any.
    pub restriction: Option<PathBuf>,
    /// True when the unit is read from standard input.
    pub stdin: bool,
}

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("ambiguous unit: expected one file or directory, found {0} paths")]
    Ambiguous(usize),
    #[error("{}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: cannot list package files: {source}", dir.display())]
    List {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no Mica source files in {}", .0.display())]
    EmptyDirectory(PathBuf),
    #[error("not a Mica source file: {}", .0.display())]
    NotSource(PathBuf),
}

/// Determine the unit from the command-line paths.
///
/// - no paths: standard input, one anonymous file, no restriction;
/// - one directory: every non-test source file in it, no restriction;
/// - one file (package-context mode): the file's whole directory,
///   restricted to that file;
/// - package-context mode off: the named files alone;
/// - anything else is an ambiguous unit.
pub fn determine_unit(
    paths: &[PathBuf],
    base_dir: &Path,
    options: &UnitOptions,
) -> Result<CheckUnit, UnitError> {
    if paths.is_empty() {
        return Ok(CheckUnit {
            dir: base_dir.to_path_buf(),
            files: Vec::new(),
            restriction: None,
            stdin: true,
        });
    }

    if !options.package_context {
        return loose_files_unit(paths, base_dir);
    }

    if paths.len() > 1 {
        return Err(UnitError::Ambiguous(paths.len()));
    }

    let target = normalize_path(base_dir, &paths[0]);
    let metadata = fs::metadata(&target).map_err(|source| UnitError::Stat {
        path: target.clone(),
        source,
    })?;

    if metadata.is_dir() {
        let files = loader::list_source_files(&target, false).map_err(|source| UnitError::List {
            dir: target.clone(),
            source,
        })?;
        if files.is_empty() {
            return Err(UnitError::EmptyDirectory(target));
        }
        return Ok(CheckUnit {
            dir: target,
            files,
            restriction: None,
            stdin: false,
        });
    }

    single_file_unit(target, options)
}

fn single_file_unit(target: PathBuf, options: &UnitOptions) -> Result<CheckUnit, UnitError> {
    let Some(name) = target.file_name().and_then(|n| n.to_str()) else {
        return Err(UnitError::NotSource(target));
    };
    if !name.ends_with(SOURCE_SUFFIX) {
        return Err(UnitError::NotSource(target));
    }

    // Test files join the unit only when the restriction file itself
    // is one and the policy flag allows it.
    let include_tests = options.include_tests && is_test_file(name);

    let dir = target
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut files =
        loader::list_source_files(&dir, include_tests).map_err(|source| UnitError::List {
            dir: dir.clone(),
            source,
        })?;

    // The named file always belongs to its own unit, even when test
    // files are otherwise excluded from the listing.
    let name = name.to_string();
    if let Err(pos) = files.binary_search(&name) {
        files.insert(pos, name);
    }

    Ok(CheckUnit {
        dir,
        files,
        restriction: Some(target),
        stdin: false,
    })
}

fn loose_files_unit(paths: &[PathBuf], base_dir: &Path) -> Result<CheckUnit, UnitError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let target = normalize_path(base_dir, path);
        let metadata = fs::metadata(&target).map_err(|source| UnitError::Stat {
            path: target.clone(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(UnitError::NotSource(target));
        }
        files.push(target.to_string_lossy().into_owned());
    }
    Ok(CheckUnit {
        // File paths are already absolute; the directory only anchors
        // import resolution for files without a parent.
        dir: base_dir.to_path_buf(),
        files,
        restriction: None,
        stdin: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, text: &str) {
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn test_no_paths_is_stdin() {
        let unit = determine_unit(&[], Path::new("/work"), &UnitOptions::default()).unwrap();
        assert!(unit.stdin);
        assert!(unit.restriction.is_none());
        assert!(unit.files.is_empty());
    }

    #[test]
    fn test_directory_unit_has_no_restriction() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.mica", "package p\n");
        write(dir.path(), "b.mica", "package p\n");
        write(dir.path(), "b_test.mica", "package p\n");

        let unit = determine_unit(
            &[dir.path().to_path_buf()],
            Path::new("/work"),
            &UnitOptions::default(),
        )
        .unwrap();
        assert_eq!(unit.files, vec!["a.mica", "b.mica"]);
        assert!(unit.restriction.is_none());
    }

    #[test]
    fn test_file_unit_restricts_to_that_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.mica", "package p\n");
        write(dir.path(), "b.mica", "package p\n");

        let unit = determine_unit(
            &[dir.path().join("a.mica")],
            Path::new("/work"),
            &UnitOptions::default(),
        )
        .unwrap();
        assert_eq!(unit.files, vec!["a.mica", "b.mica"]);
        assert_eq!(
            unit.restriction,
            Some(normalize_path(Path::new("/work"), &dir.path().join("a.mica")))
        );
    }

    #[test]
    fn test_tests_joined_only_for_test_restriction() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.mica", "package p\n");
        write(dir.path(), "a_test.mica", "package p\n");

        let options = UnitOptions {
            include_tests: true,
            ..UnitOptions::default()
        };
        let plain = determine_unit(&[dir.path().join("a.mica")], Path::new("/"), &options).unwrap();
        assert_eq!(plain.files, vec!["a.mica"]);

        let test_file =
            determine_unit(&[dir.path().join("a_test.mica")], Path::new("/"), &options).unwrap();
        assert_eq!(test_file.files, vec!["a.mica", "a_test.mica"]);
    }

    #[test]
    fn test_named_test_file_joins_its_unit() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.mica", "package p\n");
        write(dir.path(), "a_test.mica", "package p\n");
        write(dir.path(), "b_test.mica", "package p\n");

        // Without the tests flag, other test files stay out but the
        // named file itself is still checked.
        let unit = determine_unit(
            &[dir.path().join("a_test.mica")],
            Path::new("/"),
            &UnitOptions::default(),
        )
        .unwrap();
        assert_eq!(unit.files, vec!["a.mica", "a_test.mica"]);
    }

    #[test]
    fn test_two_paths_is_ambiguous() {
        let err = determine_unit(
            &[PathBuf::from("a.mica"), PathBuf::from("b.mica")],
            Path::new("/work"),
            &UnitOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, UnitError::Ambiguous(2)));
    }

    #[test]
    fn test_loose_files_mode_takes_all_paths() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.mica", "package p\n");
        write(dir.path(), "b.mica", "package p\n");

        let options = UnitOptions {
            package_context: false,
            ..UnitOptions::default()
        };
        let unit = determine_unit(
            &[dir.path().join("a.mica"), dir.path().join("b.mica")],
            Path::new("/work"),
            &options,
        )
        .unwrap();
        assert_eq!(unit.files.len(), 2);
        assert!(unit.restriction.is_none());
    }

    #[test]
    fn test_missing_path_is_stat_error() {
        let err = determine_unit(
            &[PathBuf::from("/no/such/file.mica")],
            Path::new("/"),
            &UnitOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, UnitError::Stat { .. }));
    }
}
