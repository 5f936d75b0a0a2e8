// ring.rs
//
// Fixed-size token ring between the lexer and the parser. The parser sees a
// window of `TOKEN_LOOKAHEAD` tokens; when its cursor crosses
// `TOKEN_BUFFER_SIZE - TOKEN_LOOKAHEAD` the reserve is copied to the front
// and the rest of the buffer is refilled, so the full token stream is never
// materialized.

use marten_identity::Span;

use crate::lexer::Lexer;
use crate::token::{Token, TokenType, TokenValue};

pub const TOKEN_BUFFER_SIZE: usize = 256;
pub const TOKEN_LOOKAHEAD: usize = 4;

pub struct TokenRing {
    tokens: Box<[Token; TOKEN_BUFFER_SIZE]>,
    cursor: usize,
}

impl TokenRing {
    pub fn new(lexer: &mut Lexer) -> Self {
        let eof = Token::new(TokenType::Eof, TokenValue::None, Span::default());
        let mut tokens = Box::new([eof; TOKEN_BUFFER_SIZE]);
        lexer.lex_batch(&mut tokens[..]);
        Self { tokens, cursor: 0 }
    }

    /// Look ahead without consuming. `offset` must stay inside the reserve.
    pub fn peek(&self, offset: usize) -> &Token {
        debug_assert!(offset < TOKEN_LOOKAHEAD, "lookahead exceeds the ring reserve");
        &self.tokens[self.cursor + offset]
    }

    /// Consume one token, refilling the buffer when the cursor crosses the
    /// reserve boundary.
    pub fn advance(&mut self, lexer: &mut Lexer) {
        self.cursor += 1;
        if self.cursor >= TOKEN_BUFFER_SIZE - TOKEN_LOOKAHEAD {
            for k in 0..TOKEN_LOOKAHEAD {
                self.tokens[k] = self.tokens[TOKEN_BUFFER_SIZE - TOKEN_LOOKAHEAD + k];
            }
            lexer.lex_batch(&mut self.tokens[TOKEN_LOOKAHEAD..]);
            self.cursor = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use marten_identity::Interner;

    use super::*;

    #[test]
    fn ring_streams_more_tokens_than_the_buffer_holds() {
        // 2000 identifier tokens, far beyond one buffer fill
        let source = (0..2000).map(|i| format!("x{i} ")).collect::<String>();
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(&source, &mut interner);
        let mut ring = TokenRing::new(&mut lexer);

        let mut count = 0;
        while ring.peek(0).ty != TokenType::Eof {
            assert_eq!(ring.peek(0).ty, TokenType::Identifier);
            ring.advance(&mut lexer);
            count += 1;
        }
        assert_eq!(count, 2000);
    }

    #[test]
    fn ring_lookahead_survives_refill() {
        let source = "a ".repeat(TOKEN_BUFFER_SIZE * 2);
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(&source, &mut interner);
        let mut ring = TokenRing::new(&mut lexer);

        for _ in 0..(TOKEN_BUFFER_SIZE * 2 - TOKEN_LOOKAHEAD) {
            // Every lookahead slot keeps pointing at real tokens across the
            // copy-to-front refill.
            for offset in 0..TOKEN_LOOKAHEAD {
                assert_eq!(ring.peek(offset).ty, TokenType::Identifier);
            }
            ring.advance(&mut lexer);
        }
    }

    #[test]
    fn ring_pads_lookahead_past_the_end() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("a", &mut interner);
        let mut ring = TokenRing::new(&mut lexer);
        assert_eq!(ring.peek(0).ty, TokenType::Identifier);
        assert_eq!(ring.peek(1).ty, TokenType::Eof);
        assert_eq!(ring.peek(2).ty, TokenType::Eof);
        ring.advance(&mut lexer);
        assert_eq!(ring.peek(0).ty, TokenType::Eof);
    }
}
