//! The source loader: file listing, reading, and parsing.
//!
//! A pure function of (directory, file names) to parsed files. Used by
//! the driver for the unit being checked and by the resolver's slow
//! path for dependency packages.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::parser;
use crate::semantic::diagnostics::{Diagnostic, codes};
use crate::syntax::SourceFile;

pub const SOURCE_SUFFIX: &str = ".mica";
pub const TEST_SUFFIX: &str = "_test.mica";

/// Whether a file name denotes an in-package test file.
pub fn is_test_file(name: &str) -> bool {
    name.ends_with(TEST_SUFFIX)
}

/// One successfully parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub ast: SourceFile,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {} syntax error(s)", path.display(), errors.len())]
    Parse {
        path: PathBuf,
        errors: Vec<Diagnostic>,
    },
}

/// List the Mica source file names in `dir`, sorted for deterministic
/// check order. Test files are skipped unless `include_tests` is set.
pub fn list_source_files(dir: &Path, include_tests: bool) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.ends_with(SOURCE_SUFFIX) {
            continue;
        }
        if !include_tests && is_test_file(name) {
            continue;
        }
        files.push(name.to_string());
    }
    files.sort();
    Ok(files)
}

/// Read and parse each named file under `dir`.
pub fn parse_files(dir: &Path, filenames: &[String]) -> Result<Vec<ParsedFile>, LoadError> {
    filenames
        .iter()
        .map(|name| {
            let path = dir.join(name);
            let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            parse_source(path, &text)
        })
        .collect()
}

/// Parse already-read source text, attributing errors to `path`.
pub fn parse_source(path: PathBuf, source: &str) -> Result<ParsedFile, LoadError> {
    match parser::parse_file(source) {
        Ok(ast) => Ok(ParsedFile { path, ast }),
        Err(errors) => {
            let errors = errors
                .into_iter()
                .map(|e| {
                    Diagnostic::error(e.message)
                        .with_code(codes::SYNTAX)
                        .at(path.clone(), e.span.start)
                })
                .collect();
            Err(LoadError::Parse { path, errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file("vec_test.mica"));
        assert!(!is_test_file("vec.mica"));
        assert!(!is_test_file("vec_test.rs"));
    }

    #[test]
    fn test_parse_source_reports_positions() {
        let err = parse_source(PathBuf::from("bad.mica"), "package a\nconst X Int = 1");
        let LoadError::Parse { errors, .. } = err.unwrap_err() else {
            panic!("expected parse error");
        };
        let locus = errors[0].locus.as_ref().unwrap();
        assert_eq!(locus.path, PathBuf::from("bad.mica"));
        assert_eq!(locus.position.line, 1);
    }

    #[test]
    fn test_list_source_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mica", "a.mica", "a_test.mica", "notes.txt"] {
            fs::write(dir.path().join(name), "package p\n").unwrap();
        }
        let files = list_source_files(dir.path(), false).unwrap();
        assert_eq!(files, vec!["a.mica", "b.mica"]);
        let with_tests = list_source_files(dir.path(), true).unwrap();
        assert_eq!(with_tests, vec!["a.mica", "a_test.mica", "b.mica"]);
    }
}
