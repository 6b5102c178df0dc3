//! # micatype
//!
//! A package-at-a-time type-checking front end for the Mica language,
//! in the manner of a compiler front end: parse one package, resolve
//! its imports, type-check it, report diagnostics.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! driver    → unit discovery, orchestration, diagnostic filtering
//!   ↓
//! resolver  → two-tier import resolution with a per-run cache
//!   ↓
//! semantic  → type engine, package interfaces, diagnostics
//!   ↓
//! project   → source loading, unit/file discovery
//!   ↓
//! syntax    → AST types
//!   ↓
//! parser    → logos lexer, recursive-descent parser
//!   ↓
//! base      → primitives (Position, Span, path normalization)
//! ```
//!
//! Checking is whole-package even when the caller asks about one file:
//! type correctness is a package property, so the driver checks the
//! owning package and the diagnostic filter scopes the output.

/// Foundation types: Position, Span, LineIndex, path normalization
pub mod base;

/// Parser: logos lexer, recursive-descent parser
pub mod parser;

/// Syntax: AST types
pub mod syntax;

/// Project: source loading and unit discovery
pub mod project;

/// Semantic: the type engine, package interfaces, diagnostics
pub mod semantic;

/// Resolver: fast-path/slow-path import resolution
pub mod resolver;

/// Driver: orchestration, diagnostic filtering, run state
pub mod driver;

// Re-export the types most callers need
pub use base::{Position, Span};
pub use driver::{CheckConfig, CheckOutcome, DiagnosticFilter, run_check};
pub use project::{CheckUnit, UnitOptions, determine_unit};
pub use resolver::{ImportError, Importer, Resolver};
pub use semantic::{Diagnostic, Package, Provenance, Type, check_package};
