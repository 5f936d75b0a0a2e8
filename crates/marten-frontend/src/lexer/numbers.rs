// lexer/numbers.rs
//
// Number literal scanning: overflow-checked base-10 integers and floats
// parsed from the scanned slice.

use crate::errors::LexerError;
use crate::token::{Token, TokenType, TokenValue};

use super::Lexer;

impl<'src, 'i> Lexer<'src, 'i> {
    /// Scan an integer or float literal. A `.` continues the literal only
    /// when followed by another digit, so `0..10` lexes as `0 .. 10`.
    pub(super) fn number(&mut self) -> Token {
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let is_float = self.peek_byte() == Some(b'.')
            && self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit());

        if !is_float {
            return self.integer();
        }

        self.advance(); // '.'
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.scanned();
        match text.parse::<f64>() {
            Ok(value) => self.make_token(TokenType::FloatLiteral, TokenValue::Float(value)),
            Err(_) => {
                let span = self.token_span();
                self.push_error(LexerError::InvalidNumber { span: span.into() })
            }
        }
    }

    /// Accumulate the scanned digits without allocating; 64-bit overflow is
    /// a lexer error.
    fn integer(&mut self) -> Token {
        let mut value: u64 = 0;
        for b in self.scanned().bytes() {
            let digit = (b - b'0') as u64;
            let next = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit));
            match next {
                Some(v) => value = v,
                None => {
                    let span = self.token_span();
                    return self.push_error(LexerError::IntegerOverflow { span: span.into() });
                }
            }
        }
        self.make_token(TokenType::IntLiteral, TokenValue::Int(value))
    }

    fn scanned(&self) -> &'src str {
        &self.source[self.start..self.current]
    }
}

#[cfg(test)]
mod tests {
    use marten_identity::Interner;

    use super::*;

    fn lex_one(source: &str) -> (Token, Vec<LexerError>) {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(source, &mut interner);
        let token = lexer.next_token();
        (token, lexer.take_errors())
    }

    #[test]
    fn lex_integer() {
        let (token, errors) = lex_one("12345");
        assert_eq!(token.ty, TokenType::IntLiteral);
        assert_eq!(token.value, TokenValue::Int(12345));
        assert!(errors.is_empty());
    }

    #[test]
    fn lex_u64_max() {
        let (token, errors) = lex_one("18446744073709551615");
        assert_eq!(token.value, TokenValue::Int(u64::MAX));
        assert!(errors.is_empty());
    }

    #[test]
    fn lex_integer_overflow_is_an_error() {
        let (token, errors) = lex_one("18446744073709551616");
        assert_eq!(token.ty, TokenType::Error);
        assert!(matches!(errors[0], LexerError::IntegerOverflow { .. }));
    }

    #[test]
    fn lex_float() {
        let (token, _) = lex_one("3.25");
        assert_eq!(token.ty, TokenType::FloatLiteral);
        assert_eq!(token.value, TokenValue::Float(3.25));
    }

    #[test]
    fn lex_range_is_not_a_float() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("0..10", &mut interner);
        assert_eq!(lexer.next_token().ty, TokenType::IntLiteral);
        assert_eq!(lexer.next_token().ty, TokenType::DotDot);
        assert_eq!(lexer.next_token().ty, TokenType::IntLiteral);
    }

    #[test]
    fn lex_trailing_dot_is_member_access() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("3.x", &mut interner);
        assert_eq!(lexer.next_token().ty, TokenType::IntLiteral);
        assert_eq!(lexer.next_token().ty, TokenType::Dot);
        assert_eq!(lexer.next_token().ty, TokenType::Identifier);
    }
}
