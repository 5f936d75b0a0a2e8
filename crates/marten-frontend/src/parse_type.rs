// parse_type.rs
//
// Type signatures: pointers, basic types, arrays, procedure types and
// unresolved (named) types.

use crate::ast::*;
use crate::errors::ParserError;
use crate::parser::{ParseError, Parser};
use crate::token::TokenType;

impl<'src, 'i> Parser<'src, 'i> {
    pub(crate) fn parse_type(&mut self, context: &'static str) -> Result<Type, ParseError> {
        let mut pointer_level = 0u32;
        while self.match_token(TokenType::Star) {
            pointer_level += 1;
        }

        if let Some(basic) = self.peek(0).basic_type() {
            self.advance();
            return Ok(Type {
                pointer_level,
                kind: TypeKind::Basic(basic),
            });
        }

        let kind = match self.peek(0) {
            TokenType::LBracket => {
                self.advance();
                TypeKind::Array(Box::new(self.array_type()?))
            }
            TokenType::LParen => {
                self.advance();
                TypeKind::Procedure(Box::new(self.proc_type()?))
            }
            TokenType::Identifier => TypeKind::Unresolved(Box::new(self.unresolved_type()?)),
            _ => {
                let found = self.peek_token(0);
                return Err(ParseError::new(
                    ParserError::ExpectedType {
                        found: found.ty.as_str().to_string(),
                        context,
                        span: found.span.into(),
                    },
                    found.span,
                ));
            }
        };

        Ok(Type {
            pointer_level,
            kind,
        })
    }

    /// `[size_expr] element_type`: the opening bracket is already consumed.
    fn array_type(&mut self) -> Result<ArrayType, ParseError> {
        let size = self.sub_expr()?;
        self.expect(TokenType::RBracket, "array type signature")?;
        let elem = self.parse_type("array element type")?;
        Ok(ArrayType {
            size: ConstevalExpr::new(size),
            len: None,
            elem,
        })
    }

    /// `(T, U) -> R`: the opening paren is already consumed.
    fn proc_type(&mut self) -> Result<ProcType, ParseError> {
        let mut params = Vec::new();
        if !self.match_token(TokenType::RParen) {
            loop {
                params.push(self.parse_type("procedure type parameter")?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
            self.expect(TokenType::RParen, "procedure type signature")?;
        }

        let return_ty = if self.match_token(TokenType::Arrow) {
            Some(self.parse_type("procedure type return")?)
        } else {
            None
        };

        Ok(ProcType { params, return_ty })
    }

    fn unresolved_type(&mut self) -> Result<UnresolvedType, ParseError> {
        let module_access = self.module_access();
        let token = self.expect(TokenType::Identifier, "named type signature")?;
        Ok(UnresolvedType {
            module_access,
            ident: Ident {
                name: token.ident(),
                span: token.span,
            },
        })
    }

    /// `a::b::` prefix of a reference; present only when an identifier is
    /// directly followed by `::`.
    pub(crate) fn module_access(&mut self) -> Option<ModuleAccess> {
        if self.peek(0) != TokenType::Identifier || self.peek(1) != TokenType::ColonColon {
            return None;
        }

        let mut modules = Vec::new();
        while self.peek(0) == TokenType::Identifier && self.peek(1) == TokenType::ColonColon {
            let token = self.consume_get();
            modules.push(Ident {
                name: token.ident(),
                span: token.span,
            });
            self.advance(); // '::'
        }

        Some(ModuleAccess {
            modules,
            resolved: None,
        })
    }
}
