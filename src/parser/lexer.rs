//! Logos-based lexer for Mica.

use logos::Logos;

use crate::base::{LineIndex, Span};

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    index: LineIndex,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            index: LineIndex::new(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let range = self.inner.span();
        let span = Span::new(self.index.position(range.start), self.index.position(range.end));

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => TokenKind::Error,
        };

        Some(Token { kind, text, span })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to [`TokenKind`]
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
enum LogosToken {
    // Keywords (take priority over Ident)
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("const")]
    Const,
    #[token("let")]
    Let,
    #[token("fn")]
    Fn,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Literals
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+\.[0-9]+")]
    Real,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // Multi-character punctuation (must not be shadowed by single-char)
    #[token("->")]
    Arrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    // Single-character punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
}

/// Public token kind; [`TokenKind::Error`] marks text logos rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Package,
    Import,
    Const,
    Let,
    Fn,
    Return,
    True,
    False,
    Ident,
    Real,
    Int,
    String,
    Arrow,
    EqEq,
    BangEq,
    LtEq,
    GtEq,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Dot,
    Eq,
    Lt,
    Gt,
    Plus,
    Minus,
    Star,
    Slash,
    Error,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Package => TokenKind::Package,
            LogosToken::Import => TokenKind::Import,
            LogosToken::Const => TokenKind::Const,
            LogosToken::Let => TokenKind::Let,
            LogosToken::Fn => TokenKind::Fn,
            LogosToken::Return => TokenKind::Return,
            LogosToken::True => TokenKind::True,
            LogosToken::False => TokenKind::False,
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::Real => TokenKind::Real,
            LogosToken::Int => TokenKind::Int,
            LogosToken::String => TokenKind::String,
            LogosToken::Arrow => TokenKind::Arrow,
            LogosToken::EqEq => TokenKind::EqEq,
            LogosToken::BangEq => TokenKind::BangEq,
            LogosToken::LtEq => TokenKind::LtEq,
            LogosToken::GtEq => TokenKind::GtEq,
            LogosToken::LParen => TokenKind::LParen,
            LogosToken::RParen => TokenKind::RParen,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Dot => TokenKind::Dot,
            LogosToken::Eq => TokenKind::Eq,
            LogosToken::Lt => TokenKind::Lt,
            LogosToken::Gt => TokenKind::Gt,
            LogosToken::Plus => TokenKind::Plus,
            LogosToken::Minus => TokenKind::Minus,
            LogosToken::Star => TokenKind::Star,
            LogosToken::Slash => TokenKind::Slash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_package_clause() {
        assert_eq!(
            kinds("package geometry"),
            vec![TokenKind::Package, TokenKind::Ident]
        );
    }

    #[test]
    fn test_keywords_not_idents() {
        assert_eq!(
            kinds("import const let fn return"),
            vec![
                TokenKind::Import,
                TokenKind::Const,
                TokenKind::Let,
                TokenKind::Fn,
                TokenKind::Return,
            ]
        );
    }

    #[test]
    fn test_real_wins_over_int() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Real]);
        assert_eq!(kinds("3"), vec![TokenKind::Int]);
    }

    #[test]
    fn test_multi_char_punctuation() {
        assert_eq!(
            kinds("-> == != <= >="),
            vec![
                TokenKind::Arrow,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("let x // trailing\nconst"),
            vec![TokenKind::Let, TokenKind::Ident, TokenKind::Const]
        );
    }

    #[test]
    fn test_error_token() {
        assert_eq!(kinds("let @"), vec![TokenKind::Let, TokenKind::Error]);
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = tokenize("package a\nlet x");
        assert_eq!(tokens[2].span.start.line, 1);
        assert_eq!(tokens[2].span.start.column, 0);
    }
}
