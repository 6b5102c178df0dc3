//! Foundation types for the micatype front end.
//!
//! This module provides fundamental types used throughout the checker:
//! - [`Position`], [`Span`] - Line/column positions for AST nodes and diagnostics
//! - [`LineIndex`] - Byte offset to line/column conversion
//! - [`normalize_path`] - Canonical absolute paths for diagnostic scoping
//!
//! This module has NO dependencies on other micatype modules.

mod line_index;
mod paths;
mod position;

pub use line_index::LineIndex;
pub use paths::normalize_path;
pub use position::{Position, Span};
