//! Lexer and parser for Mica source files.
//!
//! - **logos** for fast tokenization
//! - a hand-written recursive-descent parser producing the typed AST
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind + Span
//!     ↓
//! Parser → syntax::SourceFile (typed AST)
//! ```
//!
//! The parser recovers at declaration boundaries so a single malformed
//! declaration does not hide errors in the rest of the file.

mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{ParseError, parse_file};
