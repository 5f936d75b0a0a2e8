// parse_decl.rs
//
// Top-level declarations. Every declaration except import/use/impl opens
// with `ident ::`; the token after the `::` selects the rule (three-token
// lookahead).

use crate::ast::*;
use crate::errors::ParserError;
use crate::parser::{ParseError, Parser};
use crate::token::TokenType;

impl<'src, 'i> Parser<'src, 'i> {
    pub(crate) fn module(&mut self) -> Result<Module, ParseError> {
        let mut module = Module::default();

        loop {
            match self.peek(0) {
                TokenType::Eof => return Ok(module),
                TokenType::Identifier => {
                    if self.peek(1) != TokenType::ColonColon {
                        return Err(self.expected(TokenType::ColonColon, "declaration", 1));
                    }
                    match self.peek(2) {
                        TokenType::KwStruct => module.structs.push(self.struct_decl()?),
                        TokenType::KwEnum => module.enums.push(self.enum_decl()?),
                        TokenType::LParen => module.procs.push(self.proc_decl()?),
                        _ => module.globals.push(self.global_decl()?),
                    }
                }
                TokenType::KwImport => module.imports.push(self.import_decl()?),
                TokenType::KwUse => module.uses.push(self.use_decl()?),
                TokenType::KwImpl => module.impls.push(self.impl_decl()?),
                _ => {
                    let found = self.peek_token(0);
                    return Err(ParseError::new(
                        ParserError::ExpectedDeclaration {
                            found: found.ty.as_str().to_string(),
                            span: found.span.into(),
                        },
                        found.span,
                    ));
                }
            }
        }
    }

    fn decl_ident(&mut self) -> Ident {
        // `ident ::`: both were validated by lookahead
        let token = self.consume_get();
        self.advance();
        Ident {
            name: token.ident(),
            span: token.span,
        }
    }

    /// `Name :: struct { field: T; field2: T = expr; }`
    fn struct_decl(&mut self) -> Result<StructDecl, ParseError> {
        let ident = self.decl_ident();
        self.advance(); // 'struct'
        self.expect(TokenType::LBrace, "struct declaration")?;

        let mut fields = Vec::new();
        while !self.match_token(TokenType::RBrace) {
            let token = self.expect(TokenType::Identifier, "struct field")?;
            let field_ident = Ident {
                name: token.ident(),
                span: token.span,
            };
            self.expect(TokenType::Colon, "struct field")?;
            let ty = self.parse_type("struct field")?;

            let default = if self.match_token(TokenType::Eq) {
                Some(ConstevalExpr::new(self.sub_expr()?))
            } else {
                None
            };
            self.expect(TokenType::Semicolon, "struct field")?;

            fields.push(StructField {
                ident: field_ident,
                ty,
                default,
            });
        }

        Ok(StructDecl {
            ident,
            fields,
            span: ident.span.merge(self.previous_span()),
        })
    }

    /// `Name :: enum [basic_type] { A = expr, B = expr }`: the base type
    /// defaults to i32.
    fn enum_decl(&mut self) -> Result<EnumDecl, ParseError> {
        let ident = self.decl_ident();
        self.advance(); // 'enum'

        let basic_ty = match self.peek(0).basic_type() {
            Some(basic) => {
                self.advance();
                basic
            }
            None => BasicType::I32,
        };

        self.expect(TokenType::LBrace, "enum declaration")?;
        let mut variants = Vec::new();
        while !self.match_token(TokenType::RBrace) {
            let token = self.expect(TokenType::Identifier, "enum variant")?;
            let variant_ident = Ident {
                name: token.ident(),
                span: token.span,
            };
            self.expect(TokenType::Eq, "enum variant")?;
            let value = self.sub_expr()?;
            variants.push(EnumVariant {
                ident: variant_ident,
                value: ConstevalExpr::new(value),
            });

            if !self.match_token(TokenType::Comma) {
                self.expect(TokenType::RBrace, "enum declaration")?;
                break;
            }
        }

        Ok(EnumDecl {
            ident,
            basic_ty,
            variants,
            span: ident.span.merge(self.previous_span()),
        })
    }

    /// `Name :: (params) [-> type] (block | @)`
    fn proc_decl(&mut self) -> Result<ProcDecl, ParseError> {
        let ident = self.decl_ident();
        self.advance(); // '('

        let mut params = Vec::new();
        let mut is_variadic = false;
        if !self.check(TokenType::RParen) {
            loop {
                if self.match_token(TokenType::DotDot) {
                    is_variadic = true;
                    break;
                }

                if self.check(TokenType::KwSelf) {
                    let token = self.consume_get();
                    params.push(ProcParam {
                        ident: Ident {
                            name: self.self_sym,
                            span: token.span,
                        },
                        ty: None,
                        is_self: true,
                    });
                } else {
                    let token = self.expect(TokenType::Identifier, "procedure parameter")?;
                    let param_ident = Ident {
                        name: token.ident(),
                        span: token.span,
                    };
                    self.expect(TokenType::Colon, "procedure parameter")?;
                    let ty = self.parse_type("procedure parameter")?;
                    params.push(ProcParam {
                        ident: param_ident,
                        ty: Some(ty),
                        is_self: false,
                    });
                }

                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenType::RParen, "procedure declaration")?;

        let return_ty = if self.match_token(TokenType::Arrow) {
            Some(self.parse_type("procedure return type")?)
        } else {
            None
        };

        let (block, is_external) = if self.match_token(TokenType::At) {
            (None, true)
        } else {
            (Some(self.block()?), false)
        };

        Ok(ProcDecl {
            ident,
            params,
            return_ty,
            block,
            is_external,
            is_variadic,
            is_main: false,
            span: ident.span.merge(self.previous_span()),
        })
    }

    /// `Name :: expr;`
    fn global_decl(&mut self) -> Result<GlobalDecl, ParseError> {
        let ident = self.decl_ident();
        let value = self.expr_semi()?;
        Ok(GlobalDecl {
            ident,
            value: ConstevalExpr::new(value),
            span: ident.span.merge(self.previous_span()),
        })
    }

    /// `import a::b::c;`: the last segment is the alias.
    fn import_decl(&mut self) -> Result<ImportDecl, ParseError> {
        let start = self.current_span();
        self.advance(); // 'import'

        let mut path = Vec::new();
        let token = self.expect(TokenType::Identifier, "import declaration")?;
        path.push(Ident {
            name: token.ident(),
            span: token.span,
        });
        while self.match_token(TokenType::ColonColon) {
            let token = self.expect(TokenType::Identifier, "import declaration")?;
            path.push(Ident {
                name: token.ident(),
                span: token.span,
            });
        }
        self.expect(TokenType::Semicolon, "import declaration")?;

        let alias = *path.last().expect("import path has at least one segment");
        Ok(ImportDecl {
            alias,
            path,
            span: start.merge(self.previous_span()),
            resolved: None,
        })
    }

    /// `use alias = mod::Name;`
    fn use_decl(&mut self) -> Result<UseDecl, ParseError> {
        let start = self.current_span();
        self.advance(); // 'use'

        let token = self.expect(TokenType::Identifier, "use declaration")?;
        let alias = Ident {
            name: token.ident(),
            span: token.span,
        };
        self.expect(TokenType::Eq, "use declaration")?;
        let token = self.expect(TokenType::Identifier, "use declaration")?;
        let module = Ident {
            name: token.ident(),
            span: token.span,
        };
        self.expect(TokenType::ColonColon, "use declaration")?;
        let token = self.expect(TokenType::Identifier, "use declaration")?;
        let symbol = Ident {
            name: token.ident(),
            span: token.span,
        };
        self.expect(TokenType::Semicolon, "use declaration")?;

        Ok(UseDecl {
            alias,
            module,
            symbol,
            span: start.merge(self.previous_span()),
        })
    }

    /// `impl Name { member procedures }`
    fn impl_decl(&mut self) -> Result<ImplDecl, ParseError> {
        let start = self.current_span();
        self.advance(); // 'impl'

        let module_access = self.module_access();
        let token = self.expect(TokenType::Identifier, "impl block")?;
        let target = UnresolvedType {
            module_access,
            ident: Ident {
                name: token.ident(),
                span: token.span,
            },
        };

        self.expect(TokenType::LBrace, "impl block")?;
        let mut procs = Vec::new();
        while !self.match_token(TokenType::RBrace) {
            if self.peek(0) != TokenType::Identifier {
                return Err(self.expected(TokenType::Identifier, "impl block member", 0));
            }
            if self.peek(1) != TokenType::ColonColon {
                return Err(self.expected(TokenType::ColonColon, "impl block member", 1));
            }
            if self.peek(2) != TokenType::LParen {
                return Err(self.expected(TokenType::LParen, "impl block member", 2));
            }
            procs.push(self.proc_decl()?);
        }

        Ok(ImplDecl {
            target,
            procs,
            span: start.merge(self.previous_span()),
        })
    }
}
