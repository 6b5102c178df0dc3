//! Diagnostics — error reporting for the whole front end.
//!
//! A [`Diagnostic`] is an error message with an optional file locus;
//! everything this front end reports is an error. The type engine and
//! the source loader both produce them; the driver routes them through
//! the diagnostic filter to the output stream.

use std::path::PathBuf;
use std::sync::Arc;

use crate::base::Position;

/// Where a diagnostic points. Package-level diagnostics have none.
#[derive(Clone, Debug, PartialEq)]
pub struct Locus {
    pub path: PathBuf,
    pub position: Position,
}

/// An error message with an optional location.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// Error code (e.g., "E0001").
    pub code: Option<&'static str>,
    pub message: Arc<str>,
    pub locus: Option<Locus>,
}

impl Diagnostic {
    /// Create a new diagnostic with no location.
    pub fn error(message: impl Into<Arc<str>>) -> Self {
        Self {
            code: None,
            message: message.into(),
            locus: None,
        }
    }

    /// Attach a file position.
    pub fn at(mut self, path: impl Into<PathBuf>, position: Position) -> Self {
        self.locus = Some(Locus {
            path: path.into(),
            position,
        });
        self
    }

    /// Set the error code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }
}

/// Standard diagnostic codes.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: type checking errors
/// - **E0100-E0199**: syntax errors
pub mod codes {
    /// Undefined name (not a local, package-level, or imported name).
    pub const UNDEFINED_NAME: &str = "E0001";
    /// Type mismatch.
    pub const TYPE_MISMATCH: &str = "E0002";
    /// Duplicate package-level definition.
    pub const DUPLICATE_DEFINITION: &str = "E0003";
    /// An import could not be resolved by either path.
    pub const UNRESOLVED_IMPORT: &str = "E0004";
    /// Imported package has no such member.
    pub const UNKNOWN_MEMBER: &str = "E0005";
    /// Call of a non-function value.
    pub const NOT_CALLABLE: &str = "E0006";
    /// Wrong number of call arguments.
    pub const WRONG_ARG_COUNT: &str = "E0007";
    /// A file declares a different package than the rest of the unit.
    pub const PACKAGE_NAME_MISMATCH: &str = "E0008";
    /// Import that is never referenced.
    pub const UNUSED_IMPORT: &str = "E0009";
    /// Unknown type in an annotation.
    pub const UNKNOWN_TYPE: &str = "E0010";
    /// Syntax error from the parser.
    pub const SYNTAX: &str = "E0100";
}

/// Collects diagnostics during a check.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_builder() {
        let diag = Diagnostic::error("undefined name: 'x'")
            .with_code(codes::UNDEFINED_NAME)
            .at("a.mica", Position::new(3, 7));
        assert_eq!(diag.code, Some("E0001"));
        let locus = diag.locus.unwrap();
        assert_eq!(locus.path, PathBuf::from("a.mica"));
        assert_eq!(locus.position, Position::new(3, 7));
    }

    #[test]
    fn test_package_level_diagnostic_has_no_locus() {
        let diag = Diagnostic::error("no Mica source files");
        assert!(diag.locus.is_none());
    }

    #[test]
    fn test_collector_take_drains() {
        let mut collector = DiagnosticCollector::new();
        collector.add(Diagnostic::error("one"));
        collector.add(Diagnostic::error("two"));
        assert_eq!(collector.take().len(), 2);
        assert!(collector.take().is_empty());
    }
}
