//! Recursive-descent parser for Mica source files.

use crate::base::{Position, Span};
use crate::syntax::{
    BinOp, BindingDecl, Decl, Expr, FnDecl, ImportDecl, PackageClause, Param, SourceFile, Stmt,
    TypeExpr, UnaryOp,
};

use super::lexer::{Token, TokenKind, tokenize};

/// A syntax error with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Parse one source file.
///
/// All syntax errors found (with recovery at declaration boundaries)
/// are returned together; a file with any error yields no AST.
pub fn parse_file(source: &str) -> Result<SourceFile, Vec<ParseError>> {
    let mut parser = Parser::new(source);
    let file = parser.parse_source_file();
    if parser.errors.is_empty() {
        // No errors implies every production succeeded.
        Ok(file.unwrap_or(SourceFile {
            package: PackageClause {
                name: String::new(),
                span: Span::from_coords(0, 0, 0, 0),
            },
            decls: Vec::new(),
        }))
    } else {
        Err(parser.errors)
    }
}

type PResult<T> = Result<T, ()>;

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    errors: Vec<ParseError>,
    eof_span: Span,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let tokens = tokenize(source);
        let eof_span = tokens
            .last()
            .map(|t| Span::new(t.span.end, t.span.end))
            .unwrap_or(Span::new(Position::new(0, 0), Position::new(0, 0)));
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            eof_span,
        }
    }

    // ------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn bump(&mut self) -> Token<'a> {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or(self.eof_span)
    }

    fn describe_current(&self) -> String {
        match self.peek() {
            Some(token) => format!("'{}'", token.text),
            None => "end of file".to_string(),
        }
    }

    fn error_here(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token<'a>> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            let found = self.describe_current();
            self.error_here(format!("expected {what}, found {found}"));
            Err(())
        }
    }

    // ------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------

    fn parse_source_file(&mut self) -> Option<SourceFile> {
        let package = self.parse_package_clause().ok()?;

        let mut decls = Vec::new();
        while !self.at_eof() {
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(()) => self.recover_to_decl(),
            }
        }

        Some(SourceFile { package, decls })
    }

    fn parse_package_clause(&mut self) -> PResult<PackageClause> {
        let keyword = self.expect(TokenKind::Package, "'package'")?;
        let name = self.expect(TokenKind::Ident, "package name")?;
        Ok(PackageClause {
            name: name.text.to_string(),
            span: keyword.span.cover(name.span),
        })
    }

    fn parse_decl(&mut self) -> PResult<Decl> {
        match self.peek_kind() {
            Some(TokenKind::Import) => self.parse_import().map(Decl::Import),
            Some(TokenKind::Const) => self.parse_binding(TokenKind::Const).map(Decl::Const),
            Some(TokenKind::Let) => self.parse_binding(TokenKind::Let).map(Decl::Let),
            Some(TokenKind::Fn) => self.parse_fn().map(Decl::Fn),
            _ => {
                let found = self.describe_current();
                self.error_here(format!("expected declaration, found {found}"));
                Err(())
            }
        }
    }

    fn parse_import(&mut self) -> PResult<ImportDecl> {
        let keyword = self.expect(TokenKind::Import, "'import'")?;
        let literal = self.expect(TokenKind::String, "import path string")?;
        let path = unquote(literal.text);
        if path.is_empty() {
            self.errors
                .push(ParseError::new("empty import path", literal.span));
            return Err(());
        }
        Ok(ImportDecl {
            path,
            span: keyword.span.cover(literal.span),
        })
    }

    fn parse_binding(&mut self, keyword: TokenKind) -> PResult<BindingDecl> {
        let what = if keyword == TokenKind::Const {
            "'const'"
        } else {
            "'let'"
        };
        let kw = self.expect(keyword, what)?;
        let name = self.expect(TokenKind::Ident, "binding name")?;
        self.expect(TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expr()?;
        let span = kw.span.cover(value.span());
        Ok(BindingDecl {
            name: name.text.to_string(),
            ty,
            value,
            span,
        })
    }

    fn parse_fn(&mut self) -> PResult<FnDecl> {
        let keyword = self.expect(TokenKind::Fn, "'fn'")?;
        let name = self.expect(TokenKind::Ident, "function name")?;
        self.expect(TokenKind::LParen, "'('")?;

        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let pname = self.expect(TokenKind::Ident, "parameter name")?;
                self.expect(TokenKind::Colon, "':'")?;
                let ty = self.parse_type()?;
                let span = pname.span.cover(ty.span);
                params.push(Param {
                    name: pname.text.to_string(),
                    ty,
                    span,
                });
                if self.at(TokenKind::Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;

        let result = if self.at(TokenKind::Arrow) {
            self.bump();
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(TokenKind::LBrace, "'{'")?;
        let mut body = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            body.push(self.parse_stmt()?);
        }
        let close = self.expect(TokenKind::RBrace, "'}'")?;

        Ok(FnDecl {
            name: name.text.to_string(),
            params,
            result,
            body,
            span: keyword.span.cover(close.span),
        })
    }

    fn parse_type(&mut self) -> PResult<TypeExpr> {
        let name = self.expect(TokenKind::Ident, "type name")?;
        Ok(TypeExpr {
            name: name.text.to_string(),
            span: name.span,
        })
    }

    /// Skip to the start of the next declaration after an error.
    fn recover_to_decl(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
        while let Some(kind) = self.peek_kind() {
            if matches!(
                kind,
                TokenKind::Import | TokenKind::Const | TokenKind::Let | TokenKind::Fn
            ) {
                break;
            }
            self.pos += 1;
        }
    }

    // ------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        match self.peek_kind() {
            Some(TokenKind::Let) => self.parse_binding(TokenKind::Let).map(Stmt::Let),
            Some(TokenKind::Return) => {
                let keyword = self.bump();
                let value = if matches!(
                    self.peek_kind(),
                    None | Some(TokenKind::RBrace) | Some(TokenKind::Let) | Some(TokenKind::Return)
                ) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let span = value
                    .as_ref()
                    .map(|v| keyword.span.cover(v.span()))
                    .unwrap_or(keyword.span);
                Ok(Stmt::Return { value, span })
            }
            _ => {
                let found = self.describe_current();
                self.error_here(format!("expected statement, found {found}"));
                Err(())
            }
        }
    }

    // ------------------------------------------------------------
    // Expressions (precedence: comparison < additive < multiplicative
    // < unary < call < primary)
    // ------------------------------------------------------------

    fn parse_expr(&mut self) -> PResult<Expr> {
        let lhs = self.parse_additive()?;
        let op = match self.peek_kind() {
            Some(TokenKind::EqEq) => BinOp::Eq,
            Some(TokenKind::BangEq) => BinOp::Ne,
            Some(TokenKind::Lt) => BinOp::Lt,
            Some(TokenKind::Gt) => BinOp::Gt,
            Some(TokenKind::LtEq) => BinOp::Le,
            Some(TokenKind::GtEq) => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.bump();
        let rhs = self.parse_additive()?;
        let span = lhs.span().cover(rhs.span());
        Ok(Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        })
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.parse_multiplicative()?;
            let span = lhs.span().cover(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.parse_unary()?;
            let span = lhs.span().cover(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        if self.at(TokenKind::Minus) {
            let keyword = self.bump();
            let operand = self.parse_unary()?;
            let span = keyword.span.cover(operand.span());
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_call()
    }

    fn parse_call(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        while self.at(TokenKind::LParen) {
            self.bump();
            let mut args = Vec::new();
            if !self.at(TokenKind::RParen) {
                loop {
                    args.push(self.parse_expr()?);
                    if self.at(TokenKind::Comma) {
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
            let close = self.expect(TokenKind::RParen, "')'")?;
            let span = expr.span().cover(close.span);
            expr = Expr::Call {
                callee: Box::new(expr),
                args,
                span,
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Int) => {
                let token = self.bump();
                match token.text.parse::<i64>() {
                    Ok(value) => Ok(Expr::Int(value, token.span)),
                    Err(_) => {
                        self.errors.push(ParseError::new(
                            format!("integer literal too large: {}", token.text),
                            token.span,
                        ));
                        Err(())
                    }
                }
            }
            Some(TokenKind::Real) => {
                let token = self.bump();
                match token.text.parse::<f64>() {
                    Ok(value) => Ok(Expr::Real(value, token.span)),
                    Err(_) => {
                        self.errors.push(ParseError::new(
                            format!("malformed real literal: {}", token.text),
                            token.span,
                        ));
                        Err(())
                    }
                }
            }
            Some(TokenKind::String) => {
                let token = self.bump();
                Ok(Expr::Str(unquote(token.text), token.span))
            }
            Some(TokenKind::True) => {
                let token = self.bump();
                Ok(Expr::Bool(true, token.span))
            }
            Some(TokenKind::False) => {
                let token = self.bump();
                Ok(Expr::Bool(false, token.span))
            }
            Some(TokenKind::Ident) => {
                let token = self.bump();
                if self.at(TokenKind::Dot) && self.nth_kind(1) == Some(TokenKind::Ident) {
                    self.bump();
                    let member = self.bump();
                    let span = token.span.cover(member.span);
                    Ok(Expr::Qualified {
                        alias: token.text.to_string(),
                        member: member.text.to_string(),
                        span,
                    })
                } else {
                    Ok(Expr::Name(token.text.to_string(), token.span))
                }
            }
            Some(TokenKind::LParen) => {
                self.bump();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            _ => {
                let found = self.describe_current();
                self.error_here(format!("expected expression, found {found}"));
                Err(())
            }
        }
    }
}

/// Strip quotes and resolve escapes in a string literal token.
fn unquote(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
