// lexer/mod.rs

mod numbers;
mod strings;

use marten_identity::{Interner, Span};

use crate::errors::LexerError;
use crate::token::{Token, TokenType, TokenValue};

/// Turns source bytes into tokens. Tokens are pulled in batches into the
/// parser's ring (`lex_batch`); the lexer itself never materializes the full
/// token stream. Errors are collected and surfaced as `Error` tokens so that
/// lexing can continue where recovery is meaningful.
pub struct Lexer<'src, 'i> {
    source: &'src str,
    bytes: &'src [u8],
    current: usize,
    start: usize,
    line: u32,
    column: u32,
    start_line: u32,
    start_column: u32,
    interner: &'i mut Interner,
    errors: Vec<LexerError>,
}

impl<'src, 'i> Lexer<'src, 'i> {
    pub fn new(source: &'src str, interner: &'i mut Interner) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            current: 0,
            start: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            interner,
            errors: Vec::new(),
        }
    }

    /// Take all collected errors, leaving the internal list empty.
    pub fn take_errors(&mut self) -> Vec<LexerError> {
        std::mem::take(&mut self.errors)
    }

    /// Check if any errors have been collected.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Fill a token slice. Once the input is exhausted every remaining slot
    /// is an `Eof` token, so the parser can always look ahead a full reserve.
    pub fn lex_batch(&mut self, tokens: &mut [Token]) {
        for k in 0..tokens.len() {
            let token = self.next_token();
            let at_end = token.ty == TokenType::Eof;
            tokens[k] = token;
            if at_end {
                for slot in tokens[k..].iter_mut() {
                    *slot = token;
                }
                return;
            }
        }
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        self.start = self.current;
        self.start_line = self.line;
        self.start_column = self.column;

        let Some(b) = self.peek_byte() else {
            return self.make_token(TokenType::Eof, TokenValue::None);
        };

        match b {
            b'\'' => self.char_literal(),
            b'"' => self.string_literal(),
            b'0'..=b'9' => self.number(),
            b'_' | b'A'..=b'Z' | b'a'..=b'z' => self.identifier(),
            _ => self.symbol(),
        }
    }

    /// Scan an identifier and classify it as a keyword, built-in type name,
    /// boolean literal or plain identifier.
    fn identifier(&mut self) -> Token {
        while let Some(b) = self.peek_byte() {
            if b == b'_' || b.is_ascii_alphanumeric() {
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.source[self.start..self.current];
        match TokenType::keyword_type(text) {
            Some(TokenType::KwTrue) => self.make_token(TokenType::BoolLiteral, TokenValue::Bool(true)),
            Some(TokenType::KwFalse) => {
                self.make_token(TokenType::BoolLiteral, TokenValue::Bool(false))
            }
            Some(keyword) => self.make_token(keyword, TokenValue::None),
            None => {
                let sym = self.interner.intern(text);
                self.make_token(TokenType::Identifier, TokenValue::Ident(sym))
            }
        }
    }

    /// Scan a punctuation or operator token, greedily extending a single
    /// character into a valid two- and then three-character composite.
    fn symbol(&mut self) -> Token {
        let b = self.peek_byte().expect("symbol dispatch requires a byte");
        self.advance();

        let Some(mut ty) = symbol_1(b) else {
            return self.error_unexpected_char();
        };

        if let Some(next) = self.peek_byte()
            && let Some(composite) = symbol_2(next, ty)
        {
            self.advance();
            ty = composite;
            if let Some(next) = self.peek_byte()
                && let Some(composite) = symbol_3(next, ty)
            {
                self.advance();
                ty = composite;
            }
        }

        self.make_token(ty, TokenValue::None)
    }

    /// Skip whitespace, line comments and nested block comments; every
    /// newline advances the line counter.
    fn skip_whitespace(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    self.advance();
                }
                Some(b'\n') => {
                    self.advance_line();
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte() {
                        if b == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    let mut depth = 1u32;
                    while depth > 0 {
                        match self.peek_byte() {
                            None => return,
                            Some(b'\n') => self.advance_line(),
                            Some(b'/') if self.peek_byte_at(1) == Some(b'*') => {
                                self.advance();
                                self.advance();
                                depth += 1;
                            }
                            Some(b'*') if self.peek_byte_at(1) == Some(b'/') => {
                                self.advance();
                                self.advance();
                                depth -= 1;
                            }
                            Some(_) => self.advance(),
                        }
                    }
                }
                _ => break,
            }
        }
    }

    #[inline]
    pub(crate) fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.current).copied()
    }

    #[inline]
    pub(crate) fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.current + offset).copied()
    }

    /// Advance one byte. Multi-byte UTF-8 sequences only occur inside string
    /// literals and error recovery; those paths use `advance_char`.
    #[inline]
    pub(crate) fn advance(&mut self) {
        self.current += 1;
        self.column += 1;
    }

    #[inline]
    fn advance_line(&mut self) {
        self.current += 1;
        self.line += 1;
        self.column = 1;
    }

    /// Decode and consume one full character.
    pub(crate) fn advance_char(&mut self) -> Option<char> {
        let c = self.source[self.current..].chars().next()?;
        self.current += c.len_utf8();
        self.column += 1;
        Some(c)
    }

    pub(crate) fn make_token(&self, ty: TokenType, value: TokenValue) -> Token {
        Token::new(ty, value, self.token_span())
    }

    pub(crate) fn token_span(&self) -> Span {
        Span::new_with_end(
            self.start,
            self.current,
            self.start_line,
            self.start_column,
            self.line,
            self.column,
        )
    }

    pub(crate) fn push_error(&mut self, error: LexerError) -> Token {
        self.errors.push(error);
        self.make_token(TokenType::Error, TokenValue::None)
    }

    fn error_unexpected_char(&mut self) -> Token {
        // The offending byte was already consumed; re-decode it for the
        // message and skip the rest of a multi-byte sequence.
        self.current = self.start;
        let ch = self.advance_char().unwrap_or('\u{fffd}');
        let span = self.token_span();
        tracing::debug!(%ch, line = self.start_line, col = self.start_column, "lexer error: unexpected character");
        self.push_error(LexerError::UnexpectedCharacter {
            ch,
            span: span.into(),
        })
    }

    pub(crate) fn intern(&mut self, text: &str) -> marten_identity::Symbol {
        self.interner.intern(text)
    }
}

fn symbol_1(b: u8) -> Option<TokenType> {
    match b {
        b'.' => Some(TokenType::Dot),
        b',' => Some(TokenType::Comma),
        b':' => Some(TokenType::Colon),
        b';' => Some(TokenType::Semicolon),
        b'{' => Some(TokenType::LBrace),
        b'}' => Some(TokenType::RBrace),
        b'[' => Some(TokenType::LBracket),
        b']' => Some(TokenType::RBracket),
        b'(' => Some(TokenType::LParen),
        b')' => Some(TokenType::RParen),
        b'@' => Some(TokenType::At),
        b'=' => Some(TokenType::Eq),
        b'+' => Some(TokenType::Plus),
        b'-' => Some(TokenType::Minus),
        b'*' => Some(TokenType::Star),
        b'/' => Some(TokenType::Slash),
        b'%' => Some(TokenType::Percent),
        b'&' => Some(TokenType::Ampersand),
        b'|' => Some(TokenType::Pipe),
        b'^' => Some(TokenType::Caret),
        b'~' => Some(TokenType::Tilde),
        b'!' => Some(TokenType::Bang),
        b'<' => Some(TokenType::Lt),
        b'>' => Some(TokenType::Gt),
        _ => None,
    }
}

fn symbol_2(b: u8, ty: TokenType) -> Option<TokenType> {
    match (b, ty) {
        (b'.', TokenType::Dot) => Some(TokenType::DotDot),
        (b':', TokenType::Colon) => Some(TokenType::ColonColon),
        (b'&', TokenType::Ampersand) => Some(TokenType::AmpAmp),
        (b'|', TokenType::Pipe) => Some(TokenType::PipePipe),
        (b'<', TokenType::Lt) => Some(TokenType::Shl),
        (b'>', TokenType::Minus) => Some(TokenType::Arrow),
        (b'>', TokenType::Gt) => Some(TokenType::Shr),
        (b'=', TokenType::Eq) => Some(TokenType::EqEq),
        (b'=', TokenType::Plus) => Some(TokenType::PlusEq),
        (b'=', TokenType::Minus) => Some(TokenType::MinusEq),
        (b'=', TokenType::Star) => Some(TokenType::StarEq),
        (b'=', TokenType::Slash) => Some(TokenType::SlashEq),
        (b'=', TokenType::Percent) => Some(TokenType::PercentEq),
        (b'=', TokenType::Ampersand) => Some(TokenType::AmpEq),
        (b'=', TokenType::Pipe) => Some(TokenType::PipeEq),
        (b'=', TokenType::Caret) => Some(TokenType::CaretEq),
        (b'=', TokenType::Lt) => Some(TokenType::LtEq),
        (b'=', TokenType::Gt) => Some(TokenType::GtEq),
        (b'=', TokenType::Bang) => Some(TokenType::BangEq),
        _ => None,
    }
}

fn symbol_3(b: u8, ty: TokenType) -> Option<TokenType> {
    match (b, ty) {
        (b'=', TokenType::Shl) => Some(TokenType::ShlEq),
        (b'=', TokenType::Shr) => Some(TokenType::ShrEq),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_types(source: &str) -> Vec<TokenType> {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(source, &mut interner);
        let mut types = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.ty == TokenType::Eof {
                break;
            }
            types.push(token.ty);
        }
        types
    }

    #[test]
    fn lex_punctuation() {
        assert_eq!(
            lex_types(". , : ; { } [ ] ( )"),
            vec![
                TokenType::Dot,
                TokenType::Comma,
                TokenType::Colon,
                TokenType::Semicolon,
                TokenType::LBrace,
                TokenType::RBrace,
                TokenType::LBracket,
                TokenType::RBracket,
                TokenType::LParen,
                TokenType::RParen,
            ]
        );
    }

    #[test]
    fn lex_composite_symbols() {
        assert_eq!(
            lex_types(":: .. -> @ == != <= >= && || << >>"),
            vec![
                TokenType::ColonColon,
                TokenType::DotDot,
                TokenType::Arrow,
                TokenType::At,
                TokenType::EqEq,
                TokenType::BangEq,
                TokenType::LtEq,
                TokenType::GtEq,
                TokenType::AmpAmp,
                TokenType::PipePipe,
                TokenType::Shl,
                TokenType::Shr,
            ]
        );
    }

    #[test]
    fn lex_three_character_symbols() {
        assert_eq!(lex_types("<<= >>="), vec![TokenType::ShlEq, TokenType::ShrEq]);
    }

    #[test]
    fn lex_adjacent_colons_compose_once() {
        // `a::b` must not lex the second `:` into the first token's span
        assert_eq!(
            lex_types("a::b:c"),
            vec![
                TokenType::Identifier,
                TokenType::ColonColon,
                TokenType::Identifier,
                TokenType::Colon,
                TokenType::Identifier,
            ]
        );
    }

    #[test]
    fn lex_keywords_and_type_names() {
        assert_eq!(
            lex_types("struct enum defer switch sizeof impl self i8 u64 f32 bool string"),
            vec![
                TokenType::KwStruct,
                TokenType::KwEnum,
                TokenType::KwDefer,
                TokenType::KwSwitch,
                TokenType::KwSizeof,
                TokenType::KwImpl,
                TokenType::KwSelf,
                TokenType::KwI8,
                TokenType::KwU64,
                TokenType::KwF32,
                TokenType::KwBool,
                TokenType::KwString,
            ]
        );
    }

    #[test]
    fn lex_bool_literals_carry_values() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("true false", &mut interner);
        let t = lexer.next_token();
        assert_eq!(t.ty, TokenType::BoolLiteral);
        assert_eq!(t.value, TokenValue::Bool(true));
        let f = lexer.next_token();
        assert_eq!(f.ty, TokenType::BoolLiteral);
        assert_eq!(f.value, TokenValue::Bool(false));
    }

    #[test]
    fn lex_line_comments() {
        assert_eq!(
            lex_types("1 // comment with @ garbage\n2"),
            vec![TokenType::IntLiteral, TokenType::IntLiteral]
        );
    }

    #[test]
    fn lex_nested_block_comments() {
        assert_eq!(
            lex_types("1 /* outer /* inner */ still out */ 2"),
            vec![TokenType::IntLiteral, TokenType::IntLiteral]
        );
    }

    #[test]
    fn lex_tracks_lines_through_comments() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("/* a\nb */\nx", &mut interner);
        let token = lexer.next_token();
        assert_eq!(token.ty, TokenType::Identifier);
        assert_eq!(token.span.line, 3);
        assert_eq!(token.span.column, 1);
    }

    #[test]
    fn lex_unexpected_character_recovers() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("a # b", &mut interner);
        assert_eq!(lexer.next_token().ty, TokenType::Identifier);
        assert_eq!(lexer.next_token().ty, TokenType::Error);
        assert_eq!(lexer.next_token().ty, TokenType::Identifier);
        let errors = lexer.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            LexerError::UnexpectedCharacter { ch: '#', .. }
        ));
    }

    #[test]
    fn lex_token_spans_cover_source_bytes() {
        let source = "alpha == 12";
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(source, &mut interner);
        loop {
            let token = lexer.next_token();
            if token.ty == TokenType::Eof {
                break;
            }
            assert!(token.span.start <= token.span.end);
            assert!(token.span.end <= source.len());
        }
    }

    #[test]
    fn lex_batch_pads_with_eof() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("a b", &mut interner);
        let eof = Token::new(TokenType::Eof, TokenValue::None, Span::default());
        let mut tokens = [eof; 8];
        lexer.lex_batch(&mut tokens);
        assert_eq!(tokens[0].ty, TokenType::Identifier);
        assert_eq!(tokens[1].ty, TokenType::Identifier);
        for token in &tokens[2..] {
            assert_eq!(token.ty, TokenType::Eof);
        }
    }
}
