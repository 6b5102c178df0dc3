//! Checked package interfaces and their compiled metadata form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::Type;

/// How a package interface was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// The fast path: deserialized from compiled package metadata.
    Compiled,
    /// The slow path: located, parsed, and type-checked from source.
    SourceFallback,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Compiled => "compiled",
            Provenance::SourceFallback => "source-fallback",
        }
    }
}

/// A resolved, typed package.
///
/// Immutable once produced; the resolver caches one per import path
/// for the lifetime of a run and shares it via `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// The package name declared in its sources (`vec`).
    pub name: String,
    /// The import path it was resolved under (`math/vec`).
    pub import_path: String,
    /// Exported package-level names and their types, in declaration order.
    pub exports: IndexMap<String, Type>,
    pub provenance: Provenance,
}

impl Package {
    pub fn export(&self, name: &str) -> Option<&Type> {
        self.exports.get(name)
    }
}

/// The on-disk `.mpkg.json` interface of a compiled package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageMeta {
    pub name: String,
    pub exports: IndexMap<String, Type>,
}

impl PackageMeta {
    pub fn from_package(package: &Package) -> Self {
        Self {
            name: package.name.clone(),
            exports: package.exports.clone(),
        }
    }

    pub fn into_package(self, import_path: &str) -> Package {
        Package {
            name: self.name,
            import_path: import_path.to_string(),
            exports: self.exports,
            provenance: Provenance::Compiled,
        }
    }
}
