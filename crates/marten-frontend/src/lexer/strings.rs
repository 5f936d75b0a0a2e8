// lexer/strings.rs
//
// String and character literals. Decoded string payloads go into the
// interner; char literals become integer tokens carrying the byte value.

use crate::errors::LexerError;
use crate::token::{Token, TokenType, TokenValue};

use super::Lexer;

impl<'src, 'i> Lexer<'src, 'i> {
    /// Scan a string literal. Newline or end of input before the closing
    /// quote fails; the decoded payload is appended to the interner.
    pub(super) fn string_literal(&mut self) -> Token {
        self.advance(); // opening '"'
        let mut payload = String::new();

        loop {
            match self.peek_byte() {
                None | Some(b'\n') => {
                    let span = self.token_span();
                    return self.push_error(LexerError::UnterminatedString { span: span.into() });
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    match self.escape(b'"') {
                        Ok(c) => payload.push(c),
                        Err(token) => return token,
                    }
                }
                Some(_) => {
                    if let Some(c) = self.advance_char() {
                        payload.push(c);
                    }
                }
            }
        }

        let sym = self.intern(&payload);
        self.make_token(TokenType::StringLiteral, TokenValue::Str(sym))
    }

    /// Scan a character literal; its value becomes an integer literal.
    pub(super) fn char_literal(&mut self) -> Token {
        self.advance(); // opening '\''

        let value = match self.peek_byte() {
            None | Some(b'\n') => {
                let span = self.token_span();
                return self.push_error(LexerError::UnterminatedChar { span: span.into() });
            }
            Some(b'\'') => {
                self.advance();
                let span = self.token_span();
                return self.push_error(LexerError::EmptyCharLiteral { span: span.into() });
            }
            Some(b'\\') => {
                self.advance();
                match self.escape(b'\'') {
                    Ok(c) => c,
                    Err(token) => return token,
                }
            }
            Some(b) => {
                self.advance();
                b as char
            }
        };

        if self.peek_byte() != Some(b'\'') {
            let span = self.token_span();
            return self.push_error(LexerError::UnterminatedChar { span: span.into() });
        }
        self.advance(); // closing '\''

        self.make_token(TokenType::IntLiteral, TokenValue::Int(value as u64))
    }

    /// Decode one escape sequence after a consumed `\`. The quote escape
    /// differs between string (`\"`) and char (`\'`) literals.
    fn escape(&mut self, quote: u8) -> Result<char, Token> {
        let Some(b) = self.peek_byte() else {
            let span = self.token_span();
            let error = if quote == b'"' {
                LexerError::UnterminatedString { span: span.into() }
            } else {
                LexerError::UnterminatedChar { span: span.into() }
            };
            return Err(self.push_error(error));
        };
        let c = match b {
            b't' => '\t',
            b'r' => '\r',
            b'n' => '\n',
            b'0' => '\0',
            b'\\' => '\\',
            _ if b == quote => quote as char,
            _ => {
                let ch = self.advance_char().unwrap_or('\u{fffd}');
                let span = self.token_span();
                return Err(self.push_error(LexerError::InvalidEscape {
                    ch,
                    span: span.into(),
                }));
            }
        };
        self.advance();
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use marten_identity::Interner;

    use super::*;

    #[test]
    fn lex_string_decodes_escapes() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(r#""a\tb\n\"c\"""#, &mut interner);
        let token = lexer.next_token();
        assert_eq!(token.ty, TokenType::StringLiteral);
        let TokenValue::Str(sym) = token.value else {
            panic!("expected string payload");
        };
        assert_eq!(interner.resolve(sym), "a\tb\n\"c\"");
    }

    #[test]
    fn lex_unterminated_string_at_newline() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("\"abc\nx", &mut interner);
        let token = lexer.next_token();
        assert_eq!(token.ty, TokenType::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexerError::UnterminatedString { .. }
        ));
    }

    #[test]
    fn lex_char_is_an_integer_literal() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("'A'", &mut interner);
        let token = lexer.next_token();
        assert_eq!(token.ty, TokenType::IntLiteral);
        assert_eq!(token.value, TokenValue::Int(65));
    }

    #[test]
    fn lex_char_escapes() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(r"'\n' '\0' '\''", &mut interner);
        assert_eq!(lexer.next_token().value, TokenValue::Int(10));
        assert_eq!(lexer.next_token().value, TokenValue::Int(0));
        assert_eq!(lexer.next_token().value, TokenValue::Int(39));
    }

    #[test]
    fn lex_empty_char_is_an_error() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("''", &mut interner);
        assert_eq!(lexer.next_token().ty, TokenType::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexerError::EmptyCharLiteral { .. }
        ));
    }

    #[test]
    fn lex_invalid_escape_is_an_error() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(r#""\q""#, &mut interner);
        assert_eq!(lexer.next_token().ty, TokenType::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexerError::InvalidEscape { ch: 'q', .. }
        ));
    }

    #[test]
    fn lex_multichar_char_literal_is_unterminated() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("'ab'", &mut interner);
        assert_eq!(lexer.next_token().ty, TokenType::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexerError::UnterminatedChar { .. }
        ));
    }
}
