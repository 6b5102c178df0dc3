//! The type engine: whole-package checking.
//!
//! Checking is a package-granularity operation: every file of the unit
//! is examined together, package-level names are shared across files,
//! and imports are file-scoped. Imports are resolved through the
//! [`Importer`] plugged in by the caller, which is how dependency
//! packages get checked recursively with a shared cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::base::Span;
use crate::project::ParsedFile;
use crate::resolver::Importer;
use crate::syntax::{BinOp, BindingDecl, Decl, Expr, FnDecl, SourceFile, Stmt, TypeExpr, UnaryOp};

use super::diagnostics::{Diagnostic, codes};
use super::package::{Package, Provenance};
use super::types::Type;

/// The result of checking one package: its interface plus every
/// diagnostic produced along the way.
#[derive(Debug)]
pub struct CheckedPackage {
    pub package: Package,
    pub diagnostics: Vec<Diagnostic>,
}

/// Type-check `files` as one package.
///
/// `dir` is the package directory, used as the import origin for files
/// without a parent directory (standard input). The engine never
/// terminates the process; all failures come back as diagnostics.
pub fn check_package(
    import_path: &str,
    dir: &Path,
    files: &[ParsedFile],
    importer: &mut dyn Importer,
) -> CheckedPackage {
    let mut checker = Checker {
        importer,
        dir,
        diags: Vec::new(),
        globals: IndexMap::new(),
    };

    let package_name = files
        .first()
        .map(|f| f.ast.package.name.clone())
        .unwrap_or_default();
    checker.check_package_clauses(&package_name, files);

    let mut contexts: Vec<FileCtx> = files.iter().map(|f| checker.resolve_imports(f)).collect();

    for file in files {
        checker.collect_globals(file);
    }

    for (file, ctx) in files.iter().zip(contexts.iter_mut()) {
        checker.check_file(&file.ast, ctx);
        checker.report_unused_imports(ctx);
    }

    let exports = checker
        .globals
        .iter()
        .filter_map(|(name, ty)| ty.clone().map(|ty| (name.clone(), ty)))
        .collect();

    CheckedPackage {
        package: Package {
            name: package_name,
            import_path: import_path.to_string(),
            exports,
            provenance: Provenance::SourceFallback,
        },
        diagnostics: checker.diags,
    }
}

/// One file's imports. A failed import stays in the table poisoned
/// (`package: None`, pre-marked used) so references through its alias
/// do not cascade into further errors.
struct ImportEntry {
    path: String,
    package: Option<Arc<Package>>,
    span: Span,
    used: bool,
}

struct FileCtx {
    path: PathBuf,
    imports: IndexMap<String, ImportEntry>,
}

/// A lexical scope inside a function body. `None` types mean the
/// binding's annotation was already reported as unknown.
type Scope = Vec<(String, Option<Type>)>;

struct Checker<'a> {
    importer: &'a mut dyn Importer,
    dir: &'a Path,
    diags: Vec<Diagnostic>,
    /// Package-level names; `None` marks a binding with an unknown
    /// declared type (reported once, then silent).
    globals: IndexMap<String, Option<Type>>,
}

impl<'a> Checker<'a> {
    // ------------------------------------------------------------
    // Package clause and imports
    // ------------------------------------------------------------

    fn check_package_clauses(&mut self, expected: &str, files: &[ParsedFile]) {
        for file in files.iter().skip(1) {
            let clause = &file.ast.package;
            if clause.name != expected {
                self.diags.push(
                    Diagnostic::error(format!(
                        "found package '{}', expected '{}'",
                        clause.name, expected
                    ))
                    .with_code(codes::PACKAGE_NAME_MISMATCH)
                    .at(file.path.clone(), clause.span.start),
                );
            }
        }
    }

    fn resolve_imports(&mut self, file: &ParsedFile) -> FileCtx {
        let from_dir = file
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.dir.to_path_buf());

        let mut imports: IndexMap<String, ImportEntry> = IndexMap::new();
        for decl in &file.ast.decls {
            let Decl::Import(import) = decl else {
                continue;
            };
            let alias = import.alias().to_string();
            if imports.contains_key(&alias) {
                self.diags.push(
                    Diagnostic::error(format!("duplicate import alias '{alias}'"))
                        .with_code(codes::DUPLICATE_DEFINITION)
                        .at(file.path.clone(), import.span.start),
                );
                continue;
            }
            let entry = match self.importer.import(&import.path, &from_dir) {
                Ok(package) => ImportEntry {
                    path: import.path.clone(),
                    package: Some(package),
                    span: import.span,
                    used: false,
                },
                Err(error) => {
                    self.diags.push(
                        Diagnostic::error(format!(
                            "could not import \"{}\": {error}",
                            import.path
                        ))
                        .with_code(codes::UNRESOLVED_IMPORT)
                        .at(file.path.clone(), import.span.start),
                    );
                    ImportEntry {
                        path: import.path.clone(),
                        package: None,
                        span: import.span,
                        used: true,
                    }
                }
            };
            imports.insert(alias, entry);
        }

        FileCtx {
            path: file.path.clone(),
            imports,
        }
    }

    fn report_unused_imports(&mut self, ctx: &FileCtx) {
        for entry in ctx.imports.values() {
            if !entry.used {
                self.diags.push(
                    Diagnostic::error(format!("imported and not used: \"{}\"", entry.path))
                        .with_code(codes::UNUSED_IMPORT)
                        .at(ctx.path.clone(), entry.span.start),
                );
            }
        }
    }

    // ------------------------------------------------------------
    // Package-level names
    // ------------------------------------------------------------

    fn collect_globals(&mut self, file: &ParsedFile) {
        for decl in &file.ast.decls {
            match decl {
                Decl::Import(_) => {}
                Decl::Const(binding) | Decl::Let(binding) => {
                    let ty = self.resolve_type(&binding.ty, &file.path);
                    self.define_global(&binding.name, ty, binding.span, &file.path);
                }
                Decl::Fn(func) => {
                    let ty = self.fn_type(func, &file.path);
                    self.define_global(&func.name, ty, func.span, &file.path);
                }
            }
        }
    }

    fn fn_type(&mut self, func: &FnDecl, path: &Path) -> Option<Type> {
        let mut params = Vec::with_capacity(func.params.len());
        let mut complete = true;
        for param in &func.params {
            match self.resolve_type(&param.ty, path) {
                Some(ty) => params.push(ty),
                None => complete = false,
            }
        }
        let result = match &func.result {
            Some(annotation) => self.resolve_type(annotation, path),
            None => Some(Type::Unit),
        };
        match (complete, result) {
            (true, Some(result)) => Some(Type::Func {
                params,
                result: Box::new(result),
            }),
            _ => None,
        }
    }

    fn define_global(&mut self, name: &str, ty: Option<Type>, span: Span, path: &Path) {
        if self.globals.contains_key(name) {
            self.diags.push(
                Diagnostic::error(format!("duplicate definition of '{name}'"))
                    .with_code(codes::DUPLICATE_DEFINITION)
                    .at(path.to_path_buf(), span.start),
            );
            return;
        }
        self.globals.insert(name.to_string(), ty);
    }

    /// Resolve a type annotation, reporting unknown names once.
    fn resolve_type(&mut self, annotation: &TypeExpr, path: &Path) -> Option<Type> {
        match Type::from_name(&annotation.name) {
            Some(ty) => Some(ty),
            None => {
                self.diags.push(
                    Diagnostic::error(format!("unknown type: '{}'", annotation.name))
                        .with_code(codes::UNKNOWN_TYPE)
                        .at(path.to_path_buf(), annotation.span.start),
                );
                None
            }
        }
    }

    /// Re-resolve an annotation already reported by the globals pass.
    fn quiet_type(annotation: &TypeExpr) -> Option<Type> {
        Type::from_name(&annotation.name)
    }

    // ------------------------------------------------------------
    // Bodies
    // ------------------------------------------------------------

    fn check_file(&mut self, ast: &SourceFile, ctx: &mut FileCtx) {
        for decl in &ast.decls {
            match decl {
                Decl::Import(_) => {}
                Decl::Const(binding) | Decl::Let(binding) => {
                    let declared = Self::quiet_type(&binding.ty);
                    self.check_initializer(binding, declared, &mut Vec::new(), ctx);
                }
                Decl::Fn(func) => self.check_fn(func, ctx),
            }
        }
    }

    fn check_initializer(
        &mut self,
        binding: &BindingDecl,
        declared: Option<Type>,
        scope: &mut Scope,
        ctx: &mut FileCtx,
    ) {
        let actual = self.check_expr(&binding.value, scope, ctx);
        if let (Some(declared), Some(actual)) = (&declared, &actual)
            && declared != actual
        {
            self.diags.push(
                Diagnostic::error(format!(
                    "cannot use value of type '{actual}' as '{declared}' in initialization of '{}'",
                    binding.name
                ))
                .with_code(codes::TYPE_MISMATCH)
                .at(ctx.path.clone(), binding.value.span().start),
            );
        }
    }

    fn check_fn(&mut self, func: &FnDecl, ctx: &mut FileCtx) {
        let mut scope: Scope = func
            .params
            .iter()
            .map(|p| (p.name.clone(), Self::quiet_type(&p.ty)))
            .collect();
        let result = match &func.result {
            Some(annotation) => Self::quiet_type(annotation),
            None => Some(Type::Unit),
        };

        for stmt in &func.body {
            match stmt {
                Stmt::Let(binding) => {
                    let path = ctx.path.clone();
                    let declared = self.resolve_type(&binding.ty, &path);
                    self.check_initializer(binding, declared.clone(), &mut scope, ctx);
                    scope.push((binding.name.clone(), declared));
                }
                Stmt::Return { value, span } => {
                    let actual = match value {
                        Some(expr) => self.check_expr(expr, &mut scope, ctx),
                        None => Some(Type::Unit),
                    };
                    if let (Some(expected), Some(actual)) = (&result, &actual)
                        && expected != actual
                    {
                        self.diags.push(
                            Diagnostic::error(format!(
                                "cannot return value of type '{actual}' from function returning '{expected}'"
                            ))
                            .with_code(codes::TYPE_MISMATCH)
                            .at(ctx.path.clone(), span.start),
                        );
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------

    /// Type an expression. `None` means a diagnostic was already
    /// reported somewhere below; callers stay silent to avoid cascades.
    fn check_expr(&mut self, expr: &Expr, scope: &mut Scope, ctx: &mut FileCtx) -> Option<Type> {
        match expr {
            Expr::Int(..) => Some(Type::Int),
            Expr::Real(..) => Some(Type::Real),
            Expr::Str(..) => Some(Type::Str),
            Expr::Bool(..) => Some(Type::Bool),
            Expr::Name(name, span) => {
                if let Some((_, ty)) = scope.iter().rev().find(|(n, _)| n == name) {
                    return ty.clone();
                }
                if let Some(ty) = self.globals.get(name) {
                    return ty.clone();
                }
                if let Some(entry) = ctx.imports.get_mut(name) {
                    entry.used = true;
                    self.diags.push(
                        Diagnostic::error(format!(
                            "use of package '{name}' without member selector"
                        ))
                        .with_code(codes::UNDEFINED_NAME)
                        .at(ctx.path.clone(), span.start),
                    );
                    return None;
                }
                self.diags.push(
                    Diagnostic::error(format!("undefined name: '{name}'"))
                        .with_code(codes::UNDEFINED_NAME)
                        .at(ctx.path.clone(), span.start),
                );
                None
            }
            Expr::Qualified {
                alias,
                member,
                span,
            } => {
                let Some(entry) = ctx.imports.get_mut(alias) else {
                    self.diags.push(
                        Diagnostic::error(format!("'{alias}' is not an imported package"))
                            .with_code(codes::UNDEFINED_NAME)
                            .at(ctx.path.clone(), span.start),
                    );
                    return None;
                };
                entry.used = true;
                let Some(package) = &entry.package else {
                    // Import already failed with its own diagnostic.
                    return None;
                };
                match package.export(member) {
                    Some(ty) => Some(ty.clone()),
                    None => {
                        let message = format!(
                            "package \"{}\" has no member '{member}'",
                            entry.path
                        );
                        self.diags.push(
                            Diagnostic::error(message)
                                .with_code(codes::UNKNOWN_MEMBER)
                                .at(ctx.path.clone(), span.start),
                        );
                        None
                    }
                }
            }
            Expr::Unary { op, operand, span } => {
                let ty = self.check_expr(operand, scope, ctx)?;
                match op {
                    UnaryOp::Neg if ty.is_numeric() => Some(ty),
                    UnaryOp::Neg => {
                        self.diags.push(
                            Diagnostic::error(format!(
                                "operator '-' requires a numeric operand, found '{ty}'"
                            ))
                            .with_code(codes::TYPE_MISMATCH)
                            .at(ctx.path.clone(), span.start),
                        );
                        None
                    }
                }
            }
            Expr::Binary { op, lhs, rhs, span } => {
                let left = self.check_expr(lhs, scope, ctx);
                let right = self.check_expr(rhs, scope, ctx);
                let (left, right) = (left?, right?);
                self.check_binary(*op, left, right, *span, ctx)
            }
            Expr::Call { callee, args, span } => {
                let callee_ty = self.check_expr(callee, scope, ctx);
                let arg_tys: Vec<Option<Type>> = args
                    .iter()
                    .map(|arg| self.check_expr(arg, scope, ctx))
                    .collect();
                match callee_ty? {
                    Type::Func { params, result } => {
                        if params.len() != arg_tys.len() {
                            self.diags.push(
                                Diagnostic::error(format!(
                                    "wrong number of arguments: expected {}, found {}",
                                    params.len(),
                                    arg_tys.len()
                                ))
                                .with_code(codes::WRONG_ARG_COUNT)
                                .at(ctx.path.clone(), span.start),
                            );
                            return Some(*result);
                        }
                        for (i, (param, arg)) in params.iter().zip(&arg_tys).enumerate() {
                            if let Some(arg) = arg
                                && arg != param
                            {
                                self.diags.push(
                                    Diagnostic::error(format!(
                                        "cannot use value of type '{arg}' as '{param}' in argument {}",
                                        i + 1
                                    ))
                                    .with_code(codes::TYPE_MISMATCH)
                                    .at(ctx.path.clone(), args[i].span().start),
                                );
                            }
                        }
                        Some(*result)
                    }
                    other => {
                        self.diags.push(
                            Diagnostic::error(format!(
                                "cannot call non-function value of type '{other}'"
                            ))
                            .with_code(codes::NOT_CALLABLE)
                            .at(ctx.path.clone(), span.start),
                        );
                        None
                    }
                }
            }
        }
    }

    fn check_binary(
        &mut self,
        op: BinOp,
        left: Type,
        right: Type,
        span: Span,
        ctx: &mut FileCtx,
    ) -> Option<Type> {
        let ok = if op.is_comparison() {
            if op.is_ordering() {
                left == right && left.is_numeric()
            } else {
                left == right
            }
        } else {
            // Arithmetic: matching numerics, plus `+` for strings.
            left == right && (left.is_numeric() || (op == BinOp::Add && left == Type::Str))
        };

        if !ok {
            self.diags.push(
                Diagnostic::error(format!(
                    "invalid operation: '{left}' {} '{right}'",
                    op.symbol()
                ))
                .with_code(codes::TYPE_MISMATCH)
                .at(ctx.path.clone(), span.start),
            );
            return None;
        }

        if op.is_comparison() {
            Some(Type::Bool)
        } else {
            Some(left)
        }
    }
}
