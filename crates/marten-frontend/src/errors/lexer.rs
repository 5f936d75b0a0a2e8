// errors/lexer.rs
//! Lexer errors (E0xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexerError {
    #[error("unexpected character '{ch}'")]
    #[diagnostic(code(E0001))]
    UnexpectedCharacter {
        ch: char,
        #[label("not a valid token")]
        span: SourceSpan,
    },

    #[error("unterminated string literal")]
    #[diagnostic(code(E0002), help("add a closing '\"' before the end of the line"))]
    UnterminatedString {
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("unterminated character literal")]
    #[diagnostic(code(E0003), help("add a closing '\''"))]
    UnterminatedChar {
        #[label("character starts here")]
        span: SourceSpan,
    },

    #[error("character literal must contain a character")]
    #[diagnostic(code(E0004))]
    EmptyCharLiteral {
        #[label("empty literal")]
        span: SourceSpan,
    },

    #[error("invalid escape sequence '\\{ch}'")]
    #[diagnostic(code(E0005), help("supported escapes: \\t \\r \\n \\0 \\\\ \\' \\\""))]
    InvalidEscape {
        ch: char,
        #[label("unknown escape")]
        span: SourceSpan,
    },

    #[error("integer literal does not fit in 64 bits")]
    #[diagnostic(code(E0006))]
    IntegerOverflow {
        #[label("too large")]
        span: SourceSpan,
    },

    #[error("invalid number literal")]
    #[diagnostic(code(E0007))]
    InvalidNumber {
        #[label("cannot be parsed")]
        span: SourceSpan,
    },
}
