//! Driver: orchestration of one check run.
//!
//! The driver determines the unit, loads it, runs the type engine with
//! the import resolver plugged in, and routes every diagnostic through
//! the [`DiagnosticFilter`] to the output stream. It is the only layer
//! that decides process termination, and it does so purely from the
//! returned outcome.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::base::normalize_path;
use crate::project::loader::{self, LoadError, ParsedFile};
use crate::project::{CheckUnit, UnitError, UnitOptions, determine_unit};
use crate::resolver::Resolver;
use crate::semantic::{Diagnostic, DiagnosticCollector, check_package};

/// Display name of the anonymous standard-input file.
pub const STDIN_NAME: &str = "<stdin>";

/// One run's configuration, assembled from the command line.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub paths: Vec<PathBuf>,
    /// Base directory for relative paths and import resolution.
    pub working_dir: PathBuf,
    pub options: UnitOptions,
    /// Print the files being checked to stderr.
    pub verbose: bool,
}

/// Run-level state surfaced to the caller: how many diagnostics were
/// admitted past the filter. Zero means a clean exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    pub admitted: usize,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error("reading standard input: {0}")]
    Stdin(std::io::Error),
    #[error("writing diagnostics: {0}")]
    Output(std::io::Error),
}

/// Decides which diagnostics of a whole-package check are surfaced.
pub struct DiagnosticFilter {
    base: PathBuf,
    restriction: Option<PathBuf>,
}

impl DiagnosticFilter {
    pub fn new(base: &Path, restriction: Option<&Path>) -> Self {
        Self {
            base: base.to_path_buf(),
            restriction: restriction.map(|r| normalize_path(base, r)),
        }
    }

    /// Admit everything without a restriction; with one, admit
    /// diagnostics in the restriction file plus any diagnostic with no
    /// file locus (package-level conditions are always relevant).
    pub fn admit(&self, diagnostic: &Diagnostic) -> bool {
        let Some(restriction) = &self.restriction else {
            return true;
        };
        let Some(locus) = &diagnostic.locus else {
            return true;
        };
        normalize_path(&self.base, &locus.path) == *restriction
    }
}

/// Render one diagnostic as a machine-parseable line.
pub fn render(diagnostic: &Diagnostic) -> String {
    match &diagnostic.locus {
        Some(locus) => format!(
            "{}:{}:{}: {}",
            locus.path.display(),
            locus.position.line + 1,
            locus.position.column + 1,
            diagnostic.message
        ),
        None => diagnostic.message.to_string(),
    }
}

/// Check one unit, writing admitted diagnostics to `out`.
///
/// `input` is consumed only in standard-input mode. Unit discovery
/// failures are returned as errors (usage level); everything below
/// that comes back as diagnostics in the outcome count.
pub fn run_check(
    config: &CheckConfig,
    input: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<CheckOutcome, DriverError> {
    let unit = determine_unit(&config.paths, &config.working_dir, &config.options)?;

    if config.verbose && !unit.stdin {
        for name in &unit.files {
            eprintln!("{}", unit.dir.join(name).display());
        }
    }

    let mut collector = DiagnosticCollector::new();
    let parsed = load_unit(&unit, input, &mut collector)?;

    if !parsed.is_empty() {
        let mut resolver = Resolver::new(&config.working_dir);
        let import_path = if unit.stdin {
            STDIN_NAME.to_string()
        } else {
            unit.dir.to_string_lossy().into_owned()
        };
        let checked = check_package(&import_path, &unit.dir, &parsed, &mut resolver);
        collector.extend(checked.diagnostics);
    }

    let filter = DiagnosticFilter::new(&config.working_dir, unit.restriction.as_deref());
    let mut admitted = 0;
    for diagnostic in collector.take() {
        if filter.admit(&diagnostic) {
            writeln!(out, "{}", render(&diagnostic)).map_err(DriverError::Output)?;
            admitted += 1;
        }
    }

    Ok(CheckOutcome { admitted })
}

fn load_unit(
    unit: &CheckUnit,
    input: &mut dyn Read,
    collector: &mut DiagnosticCollector,
) -> Result<Vec<ParsedFile>, DriverError> {
    if unit.stdin {
        let mut text = String::new();
        input
            .read_to_string(&mut text)
            .map_err(DriverError::Stdin)?;
        match loader::parse_source(PathBuf::from(STDIN_NAME), &text) {
            Ok(file) => Ok(vec![file]),
            Err(LoadError::Parse { errors, .. }) => {
                collector.extend(errors);
                Ok(Vec::new())
            }
            Err(other) => {
                collector.add(Diagnostic::error(other.to_string()));
                Ok(Vec::new())
            }
        }
    } else {
        match loader::parse_files(&unit.dir, &unit.files) {
            Ok(files) => Ok(files),
            Err(LoadError::Parse { errors, .. }) => {
                collector.extend(errors);
                Ok(Vec::new())
            }
            // I/O failures have no single-file locus; they surface as
            // package-level diagnostics and pass any filter.
            Err(other) => {
                collector.add(Diagnostic::error(other.to_string()));
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Position;

    fn diag_at(path: &str) -> Diagnostic {
        Diagnostic::error("boom").at(PathBuf::from(path), Position::new(0, 0))
    }

    #[test]
    fn test_no_restriction_admits_everything() {
        let filter = DiagnosticFilter::new(Path::new("/work"), None);
        assert!(filter.admit(&diag_at("/work/pkg/a.mica")));
        assert!(filter.admit(&Diagnostic::error("boom")));
    }

    #[test]
    fn test_restriction_admits_only_the_named_file() {
        let filter = DiagnosticFilter::new(Path::new("/work"), Some(Path::new("pkg/a.mica")));
        assert!(filter.admit(&diag_at("/work/pkg/a.mica")));
        assert!(!filter.admit(&diag_at("/work/pkg/b.mica")));
        // Spelling differences are normalized away on both sides.
        assert!(filter.admit(&diag_at("./pkg/a.mica")));
    }

    #[test]
    fn test_locus_free_diagnostic_passes_any_restriction() {
        let filter = DiagnosticFilter::new(Path::new("/work"), Some(Path::new("pkg/a.mica")));
        assert!(filter.admit(&Diagnostic::error("no Mica source files")));
    }

    #[test]
    fn test_render_is_one_based() {
        assert_eq!(render(&diag_at("a.mica")), "a.mica:1:1: boom");
        assert_eq!(render(&Diagnostic::error("boom")), "boom");
    }
}
