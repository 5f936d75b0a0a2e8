// parse_stmt.rs
//
// Statement parsing: blocks, control flow, variable declarations and
// assignments, and procedure-call statements.

use crate::ast::*;
use crate::errors::ParserError;
use crate::parser::{ParseError, Parser};
use crate::token::TokenType;

impl<'src, 'i> Parser<'src, 'i> {
    pub(crate) fn block(&mut self) -> Result<Block, ParseError> {
        let start = self.expect(TokenType::LBrace, "code block")?.span;
        let mut stmts = Vec::new();
        while !self.match_token(TokenType::RBrace) {
            if self.check(TokenType::Eof) {
                return Err(self.expected(TokenType::RBrace, "code block", 0));
            }
            stmts.push(self.stmt()?);
        }
        Ok(Block {
            stmts,
            span: start.merge(self.previous_span()),
        })
    }

    /// A block, or a single statement wrapped in one (`defer foo();`).
    fn block_short(&mut self) -> Result<Block, ParseError> {
        if self.check(TokenType::LBrace) {
            return self.block();
        }
        let stmt = self.stmt()?;
        let span = stmt.span;
        Ok(Block {
            stmts: vec![stmt],
            span,
        })
    }

    fn stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();

        let kind = match self.peek(0) {
            TokenType::KwIf => StmtKind::If(Box::new(self.if_stmt()?)),
            TokenType::KwFor => StmtKind::For(Box::new(self.for_stmt()?)),
            TokenType::LBrace => StmtKind::Block(Box::new(self.block()?)),
            TokenType::KwDefer => {
                self.advance();
                StmtKind::Defer(Box::new(self.block_short()?))
            }
            TokenType::KwBreak => {
                self.advance();
                self.expect(TokenType::Semicolon, "break statement")?;
                StmtKind::Break
            }
            TokenType::KwContinue => {
                self.advance();
                self.expect(TokenType::Semicolon, "continue statement")?;
                StmtKind::Continue
            }
            TokenType::KwReturn => {
                self.advance();
                if self.match_token(TokenType::Semicolon) {
                    StmtKind::Return(None)
                } else {
                    StmtKind::Return(Some(self.expr_semi()?))
                }
            }
            TokenType::KwSwitch => StmtKind::Switch(Box::new(self.switch_stmt()?)),
            TokenType::Identifier if self.peek(1) == TokenType::Colon => {
                StmtKind::VarDecl(Box::new(self.var_decl()?))
            }
            _ => return self.chain_stmt(),
        };

        Ok(Stmt {
            kind,
            span: start.merge(self.previous_span()),
        })
    }

    fn if_stmt(&mut self) -> Result<IfStmt, ParseError> {
        self.advance(); // 'if'
        let cond = self.sub_expr()?;
        let block = self.block()?;

        let else_branch = if self.match_token(TokenType::KwElse) {
            match self.peek(0) {
                TokenType::KwIf => Some(ElseBranch::If(Box::new(self.if_stmt()?))),
                TokenType::LBrace => Some(ElseBranch::Block(self.block()?)),
                _ => return Err(self.expected(TokenType::KwIf, "else branch", 0)),
            }
        } else {
            None
        };

        Ok(IfStmt {
            cond,
            block,
            else_branch,
        })
    }

    /// Three forms: `for { }`, `for cond { }`, `for decl; cond; step { }`.
    fn for_stmt(&mut self) -> Result<ForStmt, ParseError> {
        self.advance(); // 'for'

        if self.check(TokenType::LBrace) {
            let block = self.block()?;
            return Ok(ForStmt {
                decl: None,
                cond: None,
                step: None,
                block,
            });
        }

        if self.peek(0) == TokenType::Identifier && self.peek(1) == TokenType::Colon {
            // C-style: declaration (consumes its ';'), condition, assignment
            let decl = self.var_decl()?;
            let cond = self.sub_expr()?;
            self.expect(TokenType::Semicolon, "for loop condition")?;
            let step = self.assign_stmt()?;
            let block = self.block()?;
            return Ok(ForStmt {
                decl: Some(decl),
                cond: Some(cond),
                step: Some(step),
                block,
            });
        }

        // While-style
        let cond = self.sub_expr()?;
        let block = self.block()?;
        Ok(ForStmt {
            decl: None,
            cond: Some(cond),
            step: None,
            block,
        })
    }

    fn switch_stmt(&mut self) -> Result<SwitchStmt, ParseError> {
        self.advance(); // 'switch'
        let expr = self.sub_expr()?;
        self.expect(TokenType::LBrace, "switch statement")?;

        let mut cases = Vec::new();
        while !self.match_token(TokenType::RBrace) {
            if self.check(TokenType::Eof) {
                return Err(self.expected(TokenType::RBrace, "switch statement", 0));
            }
            let value = self.sub_expr()?;
            let block = if self.match_token(TokenType::Colon) {
                None
            } else {
                Some(self.block_short()?)
            };
            cases.push(SwitchCase {
                value: ConstevalExpr::new(value),
                block,
            });
        }

        Ok(SwitchStmt { expr, cases })
    }

    /// `name : [type] [= expr] ;`: a type, an initializer, or both.
    pub(crate) fn var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let token = self.consume_get();
        let ident = Ident {
            name: token.ident(),
            span: token.span,
        };
        self.advance(); // ':'

        if self.match_token(TokenType::Eq) {
            let value = self.expr_semi()?;
            return Ok(VarDecl {
                ident,
                ty: None,
                value: Some(value),
                span: token.span.merge(self.previous_span()),
            });
        }

        let ty = self.parse_type("variable declaration")?;
        if self.match_token(TokenType::Semicolon) {
            return Ok(VarDecl {
                ident,
                ty: Some(ty),
                value: None,
                span: token.span.merge(self.previous_span()),
            });
        }

        self.expect(TokenType::Eq, "variable declaration")?;
        let value = self.expr_semi()?;
        Ok(VarDecl {
            ident,
            ty: Some(ty),
            value: Some(value),
            span: token.span.merge(self.previous_span()),
        })
    }

    /// An access chain used as a statement: a procedure call (`a.b(c);`) or
    /// the target of an assignment (`a.b[0] = expr;`).
    fn chain_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        let module_access = self.module_access();
        let chain = self.chain(module_access)?;

        if self.match_token(TokenType::Semicolon) {
            return Ok(Stmt {
                kind: StmtKind::Call(Box::new(chain)),
                span: start.merge(self.previous_span()),
            });
        }

        let target_span = start.merge(self.previous_span());
        let assign = self.assign_tail(chain, target_span)?;
        self.expect(TokenType::Semicolon, "variable assignment statement")?;
        Ok(Stmt {
            kind: StmtKind::Assign(Box::new(assign)),
            span: start.merge(self.previous_span()),
        })
    }

    /// Assignment without the trailing semicolon (also the step of a C-style
    /// `for`).
    fn assign_stmt(&mut self) -> Result<AssignStmt, ParseError> {
        let start = self.current_span();
        let module_access = self.module_access();
        let chain = self.chain(module_access)?;
        let target_span = start.merge(self.previous_span());
        self.assign_tail(chain, target_span)
    }

    fn assign_tail(&mut self, target: ChainExpr, target_span: marten_identity::Span) -> Result<AssignStmt, ParseError> {
        let Some(op) = self.peek(0).assign_op() else {
            let found = self.peek_token(0);
            return Err(ParseError::new(
                ParserError::ExpectedAssignOp {
                    found: found.ty.as_str().to_string(),
                    context: "variable assignment statement",
                    span: found.span.into(),
                },
                found.span,
            ));
        };
        let op_span = self.current_span();
        self.advance();

        let value = self.sub_expr()?;
        Ok(AssignStmt {
            target,
            target_span,
            op,
            op_span,
            value,
        })
    }
}
