// token.rs

use marten_identity::{Span, Symbol};

use crate::ast::{AssignOp, BasicType, BinaryOp, UnaryOp};

/// Single source of truth for keyword-to-token mapping.
///
/// Each entry `"text" => Variant` generates:
/// - A match arm in `TokenType::keyword_type`: `"text" => Some(TokenType::Variant)`
/// - A match arm in `TokenType::as_str`:       `Self::Variant => "text"`
macro_rules! define_keywords {
    ( $( $text:literal => $variant:ident ),+ $(,)? ) => {
        impl TokenType {
            /// Check if a string is a keyword and return its token type.
            pub fn keyword_type(text: &str) -> Option<TokenType> {
                match text {
                    $( $text => Some(TokenType::$variant), )+
                    _ => None,
                }
            }

            /// String representation for keyword tokens (used by `as_str`).
            fn keyword_as_str(&self) -> Option<&'static str> {
                match self {
                    $( Self::$variant => Some($text), )+
                    _ => None,
                }
            }
        }
    };
}

define_keywords! {
    // Language keywords
    "struct"   => KwStruct,
    "enum"     => KwEnum,
    "if"       => KwIf,
    "else"     => KwElse,
    "true"     => KwTrue,
    "false"    => KwFalse,
    "for"      => KwFor,
    "break"    => KwBreak,
    "return"   => KwReturn,
    "continue" => KwContinue,
    "cast"     => KwCast,
    "defer"    => KwDefer,
    "switch"   => KwSwitch,
    "sizeof"   => KwSizeof,
    "import"   => KwImport,
    "use"      => KwUse,
    "impl"     => KwImpl,
    "self"     => KwSelf,
    // Built-in type names
    "i8"       => KwI8,
    "u8"       => KwU8,
    "i16"      => KwI16,
    "u16"      => KwU16,
    "i32"      => KwI32,
    "u32"      => KwU32,
    "i64"      => KwI64,
    "u64"      => KwU64,
    "f32"      => KwF32,
    "f64"      => KwF64,
    "bool"     => KwBool,
    "string"   => KwString,
}

/// All token types in the Marten language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Literals
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BoolLiteral,
    Identifier,

    // Keywords
    KwStruct,
    KwEnum,
    KwIf,
    KwElse,
    KwTrue,  // lexed into BoolLiteral, kept for keyword classification
    KwFalse, // lexed into BoolLiteral, kept for keyword classification
    KwFor,
    KwBreak,
    KwReturn,
    KwContinue,
    KwCast,
    KwDefer,
    KwSwitch,
    KwSizeof,
    KwImport,
    KwUse,
    KwImpl,
    KwSelf,

    // Built-in type names
    KwI8,
    KwU8,
    KwI16,
    KwU16,
    KwI32,
    KwU32,
    KwI64,
    KwU64,
    KwF32,
    KwF64,
    KwBool,
    KwString,

    // Punctuation
    Dot,
    Comma,
    Colon,
    Semicolon,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,

    // Multi-character symbols
    ColonColon, // ::
    DotDot,     // ..
    Arrow,      // ->
    At,         // @

    // Operators
    Eq, // = (assignment)
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Ampersand, // &
    Pipe,      // |
    Caret,     // ^
    Tilde,     // ~
    Bang,      // !
    Lt,
    Gt,
    EqEq,
    BangEq,
    LtEq,
    GtEq,
    AmpAmp,   // &&
    PipePipe, // ||
    Shl,      // <<
    Shr,      // >>

    // Compound assignment operators (parsed, rejected by the checker)
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    AmpEq,     // &=
    PipeEq,    // |=
    CaretEq,   // ^=
    ShlEq,     // <<=
    ShrEq,     // >>=

    // Special
    Eof,
    Error,
}

impl TokenType {
    /// Get string representation for error messages
    pub fn as_str(&self) -> &'static str {
        // Keywords are defined once in `define_keywords!`; delegate to the
        // generated helper so they never diverge from `keyword_type()`.
        if let Some(s) = self.keyword_as_str() {
            return s;
        }
        match self {
            Self::IntLiteral => "integer",
            Self::FloatLiteral => "float",
            Self::StringLiteral => "string literal",
            Self::BoolLiteral => "bool literal",
            Self::Identifier => "identifier",
            Self::Dot => ".",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::ColonColon => "::",
            Self::DotDot => "..",
            Self::Arrow => "->",
            Self::At => "@",
            Self::Eq => "=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Ampersand => "&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::Bang => "!",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::EqEq => "==",
            Self::BangEq => "!=",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::AmpAmp => "&&",
            Self::PipePipe => "||",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::PlusEq => "+=",
            Self::MinusEq => "-=",
            Self::StarEq => "*=",
            Self::SlashEq => "/=",
            Self::PercentEq => "%=",
            Self::AmpEq => "&=",
            Self::PipeEq => "|=",
            Self::CaretEq => "^=",
            Self::ShlEq => "<<=",
            Self::ShrEq => ">>=",
            Self::Eof => "end of input",
            Self::Error => "error",
            // All keyword variants are handled by `keyword_as_str()` above.
            _ => unreachable!("keyword variant not covered by define_keywords! macro"),
        }
    }

    /// Built-in type name tokens map to their basic type.
    pub fn basic_type(&self) -> Option<BasicType> {
        match self {
            Self::KwI8 => Some(BasicType::I8),
            Self::KwU8 => Some(BasicType::U8),
            Self::KwI16 => Some(BasicType::I16),
            Self::KwU16 => Some(BasicType::U16),
            Self::KwI32 => Some(BasicType::I32),
            Self::KwU32 => Some(BasicType::U32),
            Self::KwI64 => Some(BasicType::I64),
            Self::KwU64 => Some(BasicType::U64),
            Self::KwF32 => Some(BasicType::F32),
            Self::KwF64 => Some(BasicType::F64),
            Self::KwBool => Some(BasicType::Bool),
            Self::KwString => Some(BasicType::String),
            _ => None,
        }
    }

    /// Binary operator classification for precedence climbing.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            Self::PipePipe => Some(BinaryOp::LogicOr),
            Self::AmpAmp => Some(BinaryOp::LogicAnd),
            Self::EqEq => Some(BinaryOp::Eq),
            Self::BangEq => Some(BinaryOp::NotEq),
            Self::Lt => Some(BinaryOp::Less),
            Self::Gt => Some(BinaryOp::Greater),
            Self::LtEq => Some(BinaryOp::LessEq),
            Self::GtEq => Some(BinaryOp::GreaterEq),
            Self::Pipe => Some(BinaryOp::BitOr),
            Self::Caret => Some(BinaryOp::BitXor),
            Self::Ampersand => Some(BinaryOp::BitAnd),
            Self::Shl => Some(BinaryOp::Shl),
            Self::Shr => Some(BinaryOp::Shr),
            Self::Plus => Some(BinaryOp::Add),
            Self::Minus => Some(BinaryOp::Sub),
            Self::Star => Some(BinaryOp::Mul),
            Self::Slash => Some(BinaryOp::Div),
            Self::Percent => Some(BinaryOp::Rem),
            _ => None,
        }
    }

    /// Unary prefix operator classification.
    pub fn unary_op(&self) -> Option<UnaryOp> {
        match self {
            Self::Minus => Some(UnaryOp::Neg),
            Self::Bang => Some(UnaryOp::LogicNot),
            Self::Tilde => Some(UnaryOp::BitNot),
            Self::Ampersand => Some(UnaryOp::AddressOf),
            Self::Star => Some(UnaryOp::Deref),
            _ => None,
        }
    }

    /// Assignment operator classification (plain `=` plus the reserved
    /// compound forms).
    pub fn assign_op(&self) -> Option<AssignOp> {
        match self {
            Self::Eq => Some(AssignOp::Assign),
            Self::PlusEq => Some(AssignOp::Add),
            Self::MinusEq => Some(AssignOp::Sub),
            Self::StarEq => Some(AssignOp::Mul),
            Self::SlashEq => Some(AssignOp::Div),
            Self::PercentEq => Some(AssignOp::Rem),
            Self::AmpEq => Some(AssignOp::BitAnd),
            Self::PipeEq => Some(AssignOp::BitOr),
            Self::CaretEq => Some(AssignOp::BitXor),
            Self::ShlEq => Some(AssignOp::Shl),
            Self::ShrEq => Some(AssignOp::Shr),
            _ => None,
        }
    }
}

impl BinaryOp {
    /// Operator precedence, lowest (1) to highest (8). Precedence climbing
    /// parses a right-hand side at `precedence() + 1`, so every level is
    /// left-associative.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::LogicOr => 1,
            Self::LogicAnd => 2,
            Self::Eq | Self::NotEq => 3,
            Self::Less | Self::Greater | Self::LessEq | Self::GreaterEq => 4,
            Self::BitOr | Self::BitXor | Self::BitAnd => 5,
            Self::Shl | Self::Shr => 6,
            Self::Add | Self::Sub => 7,
            Self::Mul | Self::Div | Self::Rem => 8,
        }
    }
}

/// Typed payload carried by literal and identifier tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenValue {
    None,
    /// Integer and char literals (chars carry the escaped byte value)
    Int(u64),
    Float(f64),
    Bool(bool),
    /// Decoded string-literal payload, stored in the interner
    Str(Symbol),
    Ident(Symbol),
}

/// A token with its location in source code
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub ty: TokenType,
    pub value: TokenValue,
    pub span: Span,
}

impl Token {
    pub fn new(ty: TokenType, value: TokenValue, span: Span) -> Self {
        Self { ty, value, span }
    }

    /// Identifier payload; panics on non-identifier tokens.
    pub fn ident(&self) -> Symbol {
        match self.value {
            TokenValue::Ident(sym) => sym,
            _ => unreachable!("token {:?} has no identifier payload", self.ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_round_trips_through_as_str() {
        for text in ["struct", "enum", "defer", "sizeof", "impl", "u64"] {
            let ty = TokenType::keyword_type(text).unwrap();
            assert_eq!(ty.as_str(), text);
        }
    }

    #[test]
    fn non_keyword_is_not_classified() {
        assert_eq!(TokenType::keyword_type("structs"), None);
        assert_eq!(TokenType::keyword_type(""), None);
        assert_eq!(TokenType::keyword_type("Main"), None);
    }

    #[test]
    fn precedence_orders_operator_families() {
        assert!(BinaryOp::LogicOr.precedence() < BinaryOp::LogicAnd.precedence());
        assert!(BinaryOp::Eq.precedence() < BinaryOp::Less.precedence());
        assert!(BinaryOp::BitAnd.precedence() < BinaryOp::Shl.precedence());
        assert!(BinaryOp::Add.precedence() < BinaryOp::Mul.precedence());
    }

    #[test]
    fn assign_ops_cover_compound_forms() {
        assert_eq!(TokenType::Eq.assign_op(), Some(AssignOp::Assign));
        assert_eq!(TokenType::ShlEq.assign_op(), Some(AssignOp::Shl));
        assert_eq!(TokenType::EqEq.assign_op(), None);
    }
}
