//! Semantic layer: the type engine and everything it produces.
//!
//! - [`Type`] - the Mica type lattice (scalars plus function types)
//! - [`Package`] - a fully checked package interface (the handle the
//!   resolver caches and hands back to the engine)
//! - [`Diagnostic`] / [`DiagnosticCollector`] - error reporting
//! - [`check_package`] - whole-package type checking against an
//!   [`Importer`](crate::resolver::Importer)

pub mod diagnostics;
pub mod engine;
pub mod package;
pub mod types;

pub use diagnostics::{Diagnostic, DiagnosticCollector, Locus, codes};
pub use engine::{CheckedPackage, check_package};
pub use package::{Package, PackageMeta, Provenance};
pub use types::Type;
