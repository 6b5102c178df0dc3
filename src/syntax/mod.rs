//! Syntax definitions for the Mica language.
//!
//! A typed AST produced by the recursive-descent parser. One
//! [`SourceFile`] per physical file: a `package` clause followed by
//! imports, bindings, and functions.

pub mod ast;

pub use ast::{
    BinOp, BindingDecl, Decl, Expr, FnDecl, ImportDecl, PackageClause, Param, SourceFile, Stmt,
    TypeExpr, UnaryOp,
};

// Re-export Position and Span from base for convenience
pub use crate::base::{Position, Span};
