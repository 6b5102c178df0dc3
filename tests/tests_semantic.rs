//! Type engine behavior against a scripted importer, no filesystem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use micatype::parser;
use micatype::project::ParsedFile;
use micatype::resolver::{ImportError, Importer};
use micatype::semantic::{CheckedPackage, check_package, codes};
use micatype::{Package, Provenance, Type};

/// Serves canned packages and records every import request.
struct StubImporter {
    packages: IndexMap<String, Arc<Package>>,
    calls: Vec<String>,
}

impl StubImporter {
    fn empty() -> Self {
        Self {
            packages: IndexMap::new(),
            calls: Vec::new(),
        }
    }

    fn with(import_path: &str, exports: &[(&str, Type)]) -> Self {
        let mut stub = Self::empty();
        let name = import_path.rsplit('/').next().unwrap().to_string();
        stub.packages.insert(
            import_path.to_string(),
            Arc::new(Package {
                name,
                import_path: import_path.to_string(),
                exports: exports
                    .iter()
                    .map(|(n, ty)| (n.to_string(), ty.clone()))
                    .collect(),
                provenance: Provenance::Compiled,
            }),
        );
        stub
    }
}

impl Importer for StubImporter {
    fn import(&mut self, path: &str, _from_dir: &Path) -> Result<Arc<Package>, ImportError> {
        self.calls.push(path.to_string());
        self.packages
            .get(path)
            .cloned()
            .ok_or_else(|| ImportError::NotFound {
                path: path.to_string(),
                dir: PathBuf::from("/"),
            })
    }
}

fn parse(name: &str, text: &str) -> ParsedFile {
    ParsedFile {
        path: PathBuf::from(name),
        ast: parser::parse_file(text).unwrap(),
    }
}

fn run(importer: &mut StubImporter, files: &[(&str, &str)]) -> CheckedPackage {
    let files: Vec<ParsedFile> = files.iter().map(|(n, t)| parse(n, t)).collect();
    check_package("p", Path::new("/pkg"), &files, importer)
}

#[test]
fn test_clean_package_exports_its_globals() {
    let mut importer = StubImporter::empty();
    let checked = run(
        &mut importer,
        &[(
            "a.mica",
            "package p\n\
             const Limit: Int = 100\n\
             fn double(x: Int) -> Int {\n\
                 return x + x\n\
             }\n",
        )],
    );
    assert!(checked.diagnostics.is_empty());
    assert_eq!(checked.package.export("Limit"), Some(&Type::Int));
    assert_eq!(
        checked.package.export("double"),
        Some(&Type::Func {
            params: vec![Type::Int],
            result: Box::new(Type::Int),
        })
    );
}

#[test]
fn test_qualified_member_type_flows_through() {
    let mut importer = StubImporter::with("geo", &[("Pi", Type::Real)]);
    let checked = run(
        &mut importer,
        &[(
            "a.mica",
            "package p\nimport \"geo\"\nconst Tau: Real = geo.Pi + geo.Pi\n",
        )],
    );
    assert!(checked.diagnostics.is_empty());
    assert_eq!(importer.calls, vec!["geo"]);
}

#[test]
fn test_unknown_member_of_resolved_package() {
    let mut importer = StubImporter::with("geo", &[("Pi", Type::Real)]);
    let checked = run(
        &mut importer,
        &[(
            "a.mica",
            "package p\nimport \"geo\"\nconst E: Real = geo.Euler\n",
        )],
    );
    let errors = &checked.diagnostics;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, Some(codes::UNKNOWN_MEMBER));
    assert!(errors[0].message.contains("no member 'Euler'"));
}

#[test]
fn test_failed_import_reports_once_and_stays_silent() {
    let mut importer = StubImporter::empty();
    let checked = run(
        &mut importer,
        &[(
            "a.mica",
            "package p\n\
             import \"nope\"\n\
             const A: Int = nope.X\n\
             const B: Int = nope.X\n",
        )],
    );
    let errors = &checked.diagnostics;
    assert_eq!(errors.len(), 1, "diagnostics: {:?}", checked.diagnostics);
    assert_eq!(errors[0].code, Some(codes::UNRESOLVED_IMPORT));
    assert_eq!(importer.calls, vec!["nope"]);
}

#[test]
fn test_unused_import_is_an_error() {
    let mut importer = StubImporter::with("geo", &[("Pi", Type::Real)]);
    let checked = run(
        &mut importer,
        &[("a.mica", "package p\nimport \"geo\"\nconst A: Int = 1\n")],
    );
    let errors = &checked.diagnostics;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, Some(codes::UNUSED_IMPORT));
    assert!(errors[0].message.contains("imported and not used"));
}

#[test]
fn test_imports_are_file_scoped() {
    let mut importer = StubImporter::with("geo", &[("Pi", Type::Real)]);
    let checked = run(
        &mut importer,
        &[
            ("a.mica", "package p\nimport \"geo\"\nconst A: Real = geo.Pi\n"),
            ("b.mica", "package p\nconst B: Real = geo.Pi\n"),
        ],
    );
    // b.mica has no import of its own, so `geo` is undefined there.
    let errors = &checked.diagnostics;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, Some(codes::UNDEFINED_NAME));
    assert_eq!(
        errors[0].locus.as_ref().unwrap().path,
        PathBuf::from("b.mica")
    );
}

#[test]
fn test_package_clause_mismatch_across_files() {
    let mut importer = StubImporter::empty();
    let checked = run(
        &mut importer,
        &[
            ("a.mica", "package p\nconst A: Int = 1\n"),
            ("b.mica", "package q\nconst B: Int = 2\n"),
        ],
    );
    let errors = &checked.diagnostics;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, Some(codes::PACKAGE_NAME_MISMATCH));
    assert_eq!(checked.package.name, "p");
}

#[test]
fn test_duplicate_definition_across_files() {
    let mut importer = StubImporter::empty();
    let checked = run(
        &mut importer,
        &[
            ("a.mica", "package p\nconst A: Int = 1\n"),
            ("b.mica", "package p\nconst A: Int = 2\n"),
        ],
    );
    let errors = &checked.diagnostics;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, Some(codes::DUPLICATE_DEFINITION));
}

#[test]
fn test_call_checking() {
    let mut importer = StubImporter::with(
        "geo",
        &[(
            "area",
            Type::Func {
                params: vec![Type::Real],
                result: Box::new(Type::Real),
            },
        )],
    );
    let checked = run(
        &mut importer,
        &[(
            "a.mica",
            "package p\n\
             import \"geo\"\n\
             const Good: Real = geo.area(2.0)\n\
             const BadArity: Real = geo.area(1.0, 2.0)\n\
             const BadArg: Real = geo.area(true)\n",
        )],
    );
    let errors = &checked.diagnostics;
    assert_eq!(errors.len(), 2, "diagnostics: {:?}", checked.diagnostics);
    assert_eq!(errors[0].code, Some(codes::WRONG_ARG_COUNT));
    assert_eq!(errors[1].code, Some(codes::TYPE_MISMATCH));
}

#[test]
fn test_return_type_mismatch() {
    let mut importer = StubImporter::empty();
    let checked = run(
        &mut importer,
        &[(
            "a.mica",
            "package p\nfn f(x: Int) -> Bool {\n    return x + 1\n}\n",
        )],
    );
    let errors = &checked.diagnostics;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("cannot return value of type 'Int'"));
}

#[test]
fn test_comparison_yields_bool() {
    let mut importer = StubImporter::empty();
    let checked = run(
        &mut importer,
        &[(
            "a.mica",
            "package p\nfn small(x: Int) -> Bool {\n    return x < 10\n}\n",
        )],
    );
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.diagnostics);
}

#[test]
fn test_local_let_shadows_and_types() {
    let mut importer = StubImporter::empty();
    let checked = run(
        &mut importer,
        &[(
            "a.mica",
            "package p\n\
             const X: Int = 1\n\
             fn f() -> String {\n\
                 let x: String = \"hi\"\n\
                 return x + x\n\
             }\n",
        )],
    );
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.diagnostics);
}

#[test]
fn test_unknown_type_reported_once() {
    let mut importer = StubImporter::empty();
    let checked = run(
        &mut importer,
        &[("a.mica", "package p\nconst V: Vector = 1\n")],
    );
    let errors = &checked.diagnostics;
    assert_eq!(errors.len(), 1, "diagnostics: {:?}", checked.diagnostics);
    assert_eq!(errors[0].code, Some(codes::UNKNOWN_TYPE));
    // Incomplete globals are not exported.
    assert!(checked.package.export("V").is_none());
}
