// parse_expr.rs
//
// Expression parsing: precedence climbing over the fixed operator table,
// prefix operators, and the term grammar (literals, casts, sizeof, enum
// literals, struct/array initializers and access chains).

use crate::ast::*;
use crate::errors::ParserError;
use crate::parser::{ParseError, Parser};
use crate::token::{TokenType, TokenValue};

impl<'src, 'i> Parser<'src, 'i> {
    /// Sub-expression without a trailing semicolon.
    pub(crate) fn sub_expr(&mut self) -> Result<Expr, ParseError> {
        self.sub_expr_prec(0)
    }

    /// Sub-expression followed by a required `;`.
    pub(crate) fn expr_semi(&mut self) -> Result<Expr, ParseError> {
        let expr = self.sub_expr()?;
        self.expect(TokenType::Semicolon, "expression")?;
        Ok(expr)
    }

    fn sub_expr_prec(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.primary_expr()?;

        loop {
            let Some(op) = self.peek(0).binary_op() else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            let op_span = self.current_span();
            self.advance();

            // prec + 1 keeps every level left-associative
            let rhs = self.sub_expr_prec(prec + 1)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr {
                kind: ExprKind::Binary(Box::new(BinaryExpr {
                    op,
                    op_span,
                    lhs,
                    rhs,
                })),
                span,
            };
        }

        Ok(lhs)
    }

    /// Parenthesized expression, prefix operator or term. Prefix operands
    /// parse at primary level so `!!x` and `--x` nest.
    fn primary_expr(&mut self) -> Result<Expr, ParseError> {
        if self.match_token(TokenType::LParen) {
            let expr = self.sub_expr()?;
            self.expect(TokenType::RParen, "parenthesized expression")?;
            return Ok(expr);
        }

        if let Some(op) = self.peek(0).unary_op() {
            let op_span = self.current_span();
            self.advance();
            let rhs = self.primary_expr()?;
            let span = op_span.merge(rhs.span);
            return Ok(Expr {
                kind: ExprKind::Unary(Box::new(UnaryExpr { op, op_span, rhs })),
                span,
            });
        }

        self.term()
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();

        let kind = match self.peek(0) {
            TokenType::KwCast => ExprKind::Cast(Box::new(self.cast_expr()?)),
            TokenType::KwSizeof => ExprKind::Sizeof(Box::new(self.sizeof_expr()?)),
            TokenType::IntLiteral
            | TokenType::FloatLiteral
            | TokenType::BoolLiteral
            | TokenType::StringLiteral => {
                let token = self.consume_get();
                let lit = match token.value {
                    TokenValue::Int(v) => LitExpr::Int(v),
                    TokenValue::Float(v) => LitExpr::Float(v),
                    TokenValue::Bool(v) => LitExpr::Bool(v),
                    TokenValue::Str(v) => LitExpr::Str(v),
                    _ => unreachable!("literal token without payload"),
                };
                ExprKind::Lit(lit)
            }
            TokenType::LBrace | TokenType::LBracket => {
                ExprKind::ArrayInit(Box::new(self.array_init()?))
            }
            TokenType::Dot if self.peek(1) == TokenType::LBrace => {
                ExprKind::StructInit(Box::new(self.struct_init(None, None)?))
            }
            TokenType::Dot => ExprKind::EnumLit(self.enum_lit()?),
            TokenType::Identifier | TokenType::KwSelf => {
                let module_access = self.module_access();
                if self.peek(0) == TokenType::Identifier
                    && self.peek(1) == TokenType::Dot
                    && self.peek(2) == TokenType::LBrace
                {
                    let token = self.consume_get();
                    let ident = Ident {
                        name: token.ident(),
                        span: token.span,
                    };
                    ExprKind::StructInit(Box::new(self.struct_init(module_access, Some(ident))?))
                } else {
                    ExprKind::Chain(Box::new(self.chain(module_access)?))
                }
            }
            _ => {
                let found = self.peek_token(0);
                return Err(ParseError::new(
                    ParserError::ExpectedExpression {
                        found: found.ty.as_str().to_string(),
                        span: found.span.into(),
                    },
                    found.span,
                ));
            }
        };

        Ok(Expr {
            kind,
            span: start.merge(self.previous_span()),
        })
    }

    /// `cast(basic_type, expr)`
    fn cast_expr(&mut self) -> Result<CastExpr, ParseError> {
        self.advance(); // 'cast'
        self.expect(TokenType::LParen, "cast expression")?;

        let Some(ty) = self.peek(0).basic_type() else {
            let found = self.peek_token(0);
            return Err(ParseError::new(
                ParserError::ExpectedBasicType {
                    found: found.ty.as_str().to_string(),
                    context: "cast expression",
                    span: found.span.into(),
                },
                found.span,
            ));
        };
        self.advance();

        self.expect(TokenType::Comma, "cast expression")?;
        let expr = self.sub_expr()?;
        self.expect(TokenType::RParen, "cast expression")?;

        Ok(CastExpr { ty, expr })
    }

    /// `sizeof(type)`
    fn sizeof_expr(&mut self) -> Result<SizeofExpr, ParseError> {
        self.advance(); // 'sizeof'
        self.expect(TokenType::LParen, "sizeof expression")?;
        let ty = self.parse_type("sizeof expression")?;
        self.expect(TokenType::RParen, "sizeof expression")?;
        Ok(SizeofExpr { ty })
    }

    /// `.Variant`
    fn enum_lit(&mut self) -> Result<EnumLitExpr, ParseError> {
        self.advance(); // '.'
        let token = self.expect(TokenType::Identifier, "enum literal")?;
        Ok(EnumLitExpr {
            variant: Ident {
                name: token.ident(),
                span: token.span,
            },
            resolved: None,
        })
    }

    /// `Type.{ exprs }` or `.{ exprs }`
    fn struct_init(
        &mut self,
        module_access: Option<ModuleAccess>,
        ident: Option<Ident>,
    ) -> Result<StructInitExpr, ParseError> {
        self.expect(TokenType::Dot, "struct initializer")?;
        let args =
            self.expr_list(TokenType::LBrace, TokenType::RBrace, "struct initializer")?;
        Ok(StructInitExpr {
            module_access,
            ident,
            args,
            resolved: None,
        })
    }

    /// `[n]T{ exprs }` or `{ exprs }`
    fn array_init(&mut self) -> Result<ArrayInitExpr, ParseError> {
        let ty = if self.check(TokenType::LBracket) {
            Some(self.parse_type("array initializer")?)
        } else {
            None
        };
        let args = self.expr_list(TokenType::LBrace, TokenType::RBrace, "array initializer")?;
        Ok(ArrayInitExpr { ty, args })
    }

    /// Access chain rooted at an identifier: `a`, `a(args)`, then any
    /// sequence of `.name`, `.name(args)` and `[index]` links.
    pub(crate) fn chain(&mut self, module_access: Option<ModuleAccess>) -> Result<ChainExpr, ParseError> {
        let mut links = Vec::new();
        links.push(self.chain_root()?);

        loop {
            match self.peek(0) {
                TokenType::Dot => {
                    let dot_span = self.current_span();
                    self.advance();
                    let token = self.expect(TokenType::Identifier, "access chain")?;
                    let ident = Ident {
                        name: token.ident(),
                        span: token.span,
                    };
                    let kind = if self.check(TokenType::LParen) {
                        let args = self.expr_list(
                            TokenType::LParen,
                            TokenType::RParen,
                            "method call",
                        )?;
                        ChainLinkKind::Call(ident, args)
                    } else {
                        ChainLinkKind::Name(ident)
                    };
                    links.push(ChainLink {
                        kind,
                        span: dot_span.merge(self.previous_span()),
                        resolved: None,
                    });
                }
                TokenType::LBracket => {
                    let start = self.current_span();
                    self.advance();
                    let index = self.sub_expr()?;
                    self.expect(TokenType::RBracket, "array access")?;
                    links.push(ChainLink {
                        kind: ChainLinkKind::Index(Box::new(index)),
                        span: start.merge(self.previous_span()),
                        resolved: None,
                    });
                }
                _ => break,
            }
        }

        Ok(ChainExpr {
            module_access,
            links,
        })
    }

    fn chain_root(&mut self) -> Result<ChainLink, ParseError> {
        let token = if self.check(TokenType::KwSelf) {
            let token = self.consume_get();
            // `self` reads like a variable inside member procedures
            crate::token::Token::new(
                TokenType::Identifier,
                TokenValue::Ident(self.self_sym),
                token.span,
            )
        } else {
            self.expect(TokenType::Identifier, "access chain")?
        };
        let ident = Ident {
            name: token.ident(),
            span: token.span,
        };

        let kind = if self.check(TokenType::LParen) {
            let args = self.expr_list(TokenType::LParen, TokenType::RParen, "procedure call")?;
            ChainLinkKind::Call(ident, args)
        } else {
            ChainLinkKind::Name(ident)
        };

        Ok(ChainLink {
            kind,
            span: token.span.merge(self.previous_span()),
            resolved: None,
        })
    }

    /// `start expr, expr, ... end` with an empty list allowed.
    pub(crate) fn expr_list(
        &mut self,
        start: TokenType,
        end: TokenType,
        context: &'static str,
    ) -> Result<Vec<Expr>, ParseError> {
        self.expect(start, context)?;
        let mut exprs = Vec::new();
        if self.match_token(end) {
            return Ok(exprs);
        }
        loop {
            exprs.push(self.sub_expr()?);
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        self.expect(end, context)?;
        Ok(exprs)
    }
}
