// errors/parser.rs
//! Parser errors (E1xxx).
//!
//! Every parser rule that fails emits exactly one of these, naming the
//! expected token, the rule it was parsing and the offending token.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("expected '{expected}' in {context}, found '{found}'")]
    #[diagnostic(code(E1001))]
    ExpectedToken {
        expected: String,
        found: String,
        context: &'static str,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("expected a declaration, found '{found}'")]
    #[diagnostic(
        code(E1002),
        help("top-level declarations are `Name :: ...`, `import`, `use` or `impl`")
    )]
    ExpectedDeclaration {
        found: String,
        #[label("not a declaration")]
        span: SourceSpan,
    },

    #[error("expected a type signature in {context}, found '{found}'")]
    #[diagnostic(code(E1003))]
    ExpectedType {
        found: String,
        context: &'static str,
        #[label("expected a type here")]
        span: SourceSpan,
    },

    #[error("expected a basic type in {context}, found '{found}'")]
    #[diagnostic(code(E1004), help("basic types: i8 u8 i16 u16 i32 u32 i64 u64 f32 f64 bool string"))]
    ExpectedBasicType {
        found: String,
        context: &'static str,
        #[label("expected a basic type here")]
        span: SourceSpan,
    },

    #[error("expected an expression, found '{found}'")]
    #[diagnostic(code(E1005))]
    ExpectedExpression {
        found: String,
        #[label("expected expression")]
        span: SourceSpan,
    },

    #[error("expected an assignment operator in {context}, found '{found}'")]
    #[diagnostic(code(E1006))]
    ExpectedAssignOp {
        found: String,
        context: &'static str,
        #[label("expected '=' or a compound assignment")]
        span: SourceSpan,
    },
}
