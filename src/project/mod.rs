//! Project layer: loading source files and determining the check unit.

pub mod loader;
pub mod unit;

pub use loader::{LoadError, ParsedFile, SOURCE_SUFFIX, TEST_SUFFIX, is_test_file};
pub use unit::{CheckUnit, UnitError, UnitOptions, determine_unit};
