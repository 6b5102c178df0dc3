//! AST node types for Mica source files.

use crate::base::Span;

/// A single parsed source file: a package clause followed by declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub package: PackageClause,
    pub decls: Vec<Decl>,
}

/// The `package NAME` clause opening every file.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageClause {
    pub name: String,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Import(ImportDecl),
    Const(BindingDecl),
    Let(BindingDecl),
    Fn(FnDecl),
}

/// `import "math/vec"` — file-scoped; the alias is the last path segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub path: String,
    pub span: Span,
}

impl ImportDecl {
    /// The qualifier this import binds (`vec` for `"math/vec"`).
    pub fn alias(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(self.path.as_str())
    }
}

/// `const NAME: Type = expr` or `let NAME: Type = expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub value: Expr,
    pub span: Span,
}

/// `fn name(p: Type, ...) -> Type { ... }`; a missing result type means `Unit`.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub result: Option<TypeExpr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A type annotation, resolved to a concrete type during checking.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub name: String,
    pub span: Span,
}

/// A statement inside a function body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(BindingDecl),
    Return { value: Option<Expr>, span: Span },
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64, Span),
    Real(f64, Span),
    Str(String, Span),
    Bool(bool, Span),
    /// A bare identifier: a local or a package-level name.
    Name(String, Span),
    /// `alias.member` — a member of an imported package.
    Qualified {
        alias: String,
        member: String,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int(_, span)
            | Expr::Real(_, span)
            | Expr::Str(_, span)
            | Expr::Bool(_, span)
            | Expr::Name(_, span)
            | Expr::Qualified { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinOp {
    /// Operators that yield `Bool` regardless of operand type.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }

    /// Operators that require identical numeric operands.
    pub fn is_ordering(self) -> bool {
        matches!(self, BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
        }
    }
}
