//! Marten frontend: lexer, token ring, AST and parser.

pub mod ast;
pub mod errors;
pub mod lexer;
mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parse_type;
pub mod parser;
pub mod ring;
pub mod token;

pub use ast::{
    ArrayInitExpr, ArrayType, AssignOp, AssignStmt, BasicType, BinaryExpr, BinaryOp, Block,
    CastExpr, ChainExpr, ChainLink, ChainLinkKind, ChainRes, ChainResKind, ConstValue,
    ConstevalExpr, ConstevalState, ElseBranch, EnumDecl, EnumLitExpr, EnumVariant, Expr, ExprKind,
    ForStmt, GlobalDecl, Ident, IfStmt, ImplDecl, ImportDecl, LitExpr, Module, ModuleAccess,
    ProcDecl, ProcParam, ProcType, SizeofExpr, Stmt, StmtKind, StructDecl, StructField,
    StructInitExpr, SwitchCase, SwitchStmt, Type, TypeKind, UnaryExpr, UnaryOp, UnresolvedType,
    UseDecl, VarDecl,
};
pub use errors::{LexerError, ParserError};
pub use lexer::Lexer;
pub use parser::{ParseError, Parser};
pub use ring::{TOKEN_BUFFER_SIZE, TOKEN_LOOKAHEAD, TokenRing};
pub use token::{Token, TokenType, TokenValue};

pub use marten_identity::{Interner, Span, Symbol};
