// parser/mod.rs

use marten_identity::{Interner, Span, Symbol};

use crate::ast::Module;
use crate::errors::{LexerError, ParserError};
use crate::lexer::Lexer;
use crate::ring::TokenRing;
use crate::token::{Token, TokenType};

/// Recursive-descent parser with predictive lookahead of up to three tokens.
/// The first failing rule reports and parsing aborts; enclosing rules only
/// propagate.
pub struct Parser<'src, 'i> {
    pub(crate) lexer: Lexer<'src, 'i>,
    ring: TokenRing,
    previous: Token,
    pub(crate) self_sym: Symbol,
}

/// A parse error wrapping a miette-enabled ParserError
#[derive(Debug)]
pub struct ParseError {
    pub error: ParserError,
    pub span: Span,
}

impl ParseError {
    pub fn new(error: ParserError, span: Span) -> Self {
        Self { error, span }
    }
}

impl<'src, 'i> Parser<'src, 'i> {
    pub fn new(source: &'src str, interner: &'i mut Interner) -> Self {
        // Pre-intern "self" so method receivers always have a name.
        let self_sym = interner.intern("self");
        let mut lexer = Lexer::new(source, interner);
        let ring = TokenRing::new(&mut lexer);
        Self {
            lexer,
            ring,
            previous: Token::new(TokenType::Eof, crate::token::TokenValue::None, Span::default()),
            self_sym,
        }
    }

    /// Parse one module (one source file).
    pub fn parse_module(&mut self) -> Result<Module, ParseError> {
        self.module()
    }

    /// Take lexer errors collected so far (for diagnostic rendering).
    pub fn take_lexer_errors(&mut self) -> Vec<LexerError> {
        self.lexer.take_errors()
    }

    pub fn has_lexer_errors(&self) -> bool {
        self.lexer.has_errors()
    }

    // -- token access -------------------------------------------------------

    pub(crate) fn peek(&self, offset: usize) -> TokenType {
        self.ring.peek(offset).ty
    }

    pub(crate) fn peek_token(&self, offset: usize) -> Token {
        *self.ring.peek(offset)
    }

    pub(crate) fn current_span(&self) -> Span {
        self.ring.peek(0).span
    }

    /// Span of the most recently consumed token; used to close node spans.
    pub(crate) fn previous_span(&self) -> Span {
        self.previous.span
    }

    pub(crate) fn advance(&mut self) {
        self.previous = *self.ring.peek(0);
        self.ring.advance(&mut self.lexer);
    }

    pub(crate) fn consume_get(&mut self) -> Token {
        let token = self.peek_token(0);
        self.advance();
        token
    }

    pub(crate) fn check(&self, ty: TokenType) -> bool {
        self.peek(0) == ty
    }

    /// Consume the current token if it matches, otherwise return false
    pub(crate) fn match_token(&mut self, ty: TokenType) -> bool {
        if self.check(ty) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn try_consume(&mut self, ty: TokenType) -> Option<Token> {
        if self.check(ty) {
            Some(self.consume_get())
        } else {
            None
        }
    }

    /// Require a token of the given type, naming the rule on failure.
    pub(crate) fn expect(&mut self, ty: TokenType, context: &'static str) -> Result<Token, ParseError> {
        if self.check(ty) {
            Ok(self.consume_get())
        } else {
            Err(self.expected(ty, context, 0))
        }
    }

    /// Build an expected-token error for the token at `offset`.
    pub(crate) fn expected(&self, ty: TokenType, context: &'static str, offset: usize) -> ParseError {
        let found = self.peek_token(offset);
        ParseError::new(
            ParserError::ExpectedToken {
                expected: ty.as_str().to_string(),
                found: found.ty.as_str().to_string(),
                context,
                span: found.span.into(),
            },
            found.span,
        )
    }
}

#[cfg(test)]
mod tests;
