// parser/tests.rs

use marten_identity::Interner;

use crate::ast::*;
use crate::errors::ParserError;
use crate::parser::Parser;

fn parse(source: &str) -> Module {
    let mut interner = Interner::new();
    let mut parser = Parser::new(source, &mut interner);
    let module = parser.parse_module().expect("parse should succeed");
    assert!(!parser.has_lexer_errors(), "unexpected lexer errors");
    module
}

fn parse_err(source: &str) -> ParserError {
    let mut interner = Interner::new();
    let mut parser = Parser::new(source, &mut interner);
    parser.parse_module().expect_err("parse should fail").error
}

fn parse_with(source: &str, interner: &mut Interner) -> Module {
    let mut parser = Parser::new(source, interner);
    parser.parse_module().expect("parse should succeed")
}

#[test]
fn parse_empty_module() {
    let module = parse("");
    assert!(module.structs.is_empty());
    assert!(module.procs.is_empty());
}

#[test]
fn parse_struct_decl() {
    let module = parse("Point :: struct { x: f32; y: f32; tag: u8 = 0; }");
    assert_eq!(module.structs.len(), 1);
    let decl = &module.structs[0];
    assert_eq!(decl.fields.len(), 3);
    assert!(decl.fields[0].default.is_none());
    assert!(decl.fields[2].default.is_some());
    assert!(matches!(
        decl.fields[0].ty.kind,
        TypeKind::Basic(BasicType::F32)
    ));
}

#[test]
fn parse_enum_decl_with_base_type() {
    let module = parse("Color :: enum u8 { Red = 1, Green = 2, Blue = 3 }");
    let decl = &module.enums[0];
    assert_eq!(decl.basic_ty, BasicType::U8);
    assert_eq!(decl.variants.len(), 3);
}

#[test]
fn parse_enum_decl_defaults_to_i32() {
    let module = parse("Flag :: enum { On = 1, Off = 0, }");
    assert_eq!(module.enums[0].basic_ty, BasicType::I32);
    assert_eq!(module.enums[0].variants.len(), 2);
}

#[test]
fn parse_proc_decl() {
    let module = parse("add :: (a: i32, b: i32) -> i32 { return a + b; }");
    let decl = &module.procs[0];
    assert_eq!(decl.params.len(), 2);
    assert!(!decl.is_external);
    assert!(!decl.is_variadic);
    assert!(decl.block.is_some());
    assert!(matches!(
        decl.return_ty.as_ref().unwrap().kind,
        TypeKind::Basic(BasicType::I32)
    ));
}

#[test]
fn parse_external_variadic_proc() {
    let module = parse("printf :: (fmt: string, ..) -> i32 @");
    let decl = &module.procs[0];
    assert!(decl.is_external);
    assert!(decl.is_variadic);
    assert!(decl.block.is_none());
}

#[test]
fn parse_global_decl() {
    let module = parse("MAX :: 1024;");
    assert_eq!(module.globals.len(), 1);
}

#[test]
fn parse_import_and_use() {
    let mut interner = Interner::new();
    let module = parse_with("import core::mem;\nuse copy = mem::copy;", &mut interner);
    assert_eq!(module.imports.len(), 1);
    let import = &module.imports[0];
    assert_eq!(import.path.len(), 2);
    assert_eq!(interner.resolve(import.alias.name), "mem");
    assert_eq!(module.uses.len(), 1);
}

#[test]
fn parse_impl_block() {
    let module = parse("impl Point { length :: (self) -> f32 { return 0.0; } }");
    let impl_decl = &module.impls[0];
    assert_eq!(impl_decl.procs.len(), 1);
    assert!(impl_decl.procs[0].params[0].is_self);
    assert!(impl_decl.procs[0].params[0].ty.is_none());
}

#[test]
fn parse_pointer_and_array_types() {
    let module = parse("Node :: struct { next: *Node; items: [4]i32; grid: [2][2]f64; }");
    let fields = &module.structs[0].fields;
    assert_eq!(fields[0].ty.pointer_level, 1);
    assert!(matches!(fields[0].ty.kind, TypeKind::Unresolved(_)));
    let TypeKind::Array(inner) = &fields[2].ty.kind else {
        panic!("expected array type");
    };
    assert!(matches!(inner.elem.kind, TypeKind::Array(_)));
}

#[test]
fn parse_procedure_type() {
    let module = parse("Callbacks :: struct { on_read: (i32, *u8) -> bool; on_close: (); }");
    let fields = &module.structs[0].fields;
    let TypeKind::Procedure(proc_ty) = &fields[0].ty.kind else {
        panic!("expected procedure type");
    };
    assert_eq!(proc_ty.params.len(), 2);
    assert!(proc_ty.return_ty.is_some());
}

fn body_of(module: &Module) -> &Block {
    module.procs[0].block.as_ref().expect("proc has a body")
}

fn first_expr(module: &Module) -> &Expr {
    match &body_of(module).stmts[0].kind {
        StmtKind::Return(Some(expr)) => expr,
        other => panic!("expected return statement, got {other:?}"),
    }
}

#[test]
fn parse_precedence_mul_binds_tighter_than_add() {
    let module = parse("f :: () -> i32 { return 1 + 2 * 3; }");
    let ExprKind::Binary(add) = &first_expr(&module).kind else {
        panic!("expected binary expression");
    };
    assert_eq!(add.op, BinaryOp::Add);
    let ExprKind::Binary(mul) = &add.rhs.kind else {
        panic!("expected multiplication on the right");
    };
    assert_eq!(mul.op, BinaryOp::Mul);
}

#[test]
fn parse_binary_ops_are_left_associative() {
    let module = parse("f :: () -> i32 { return 1 - 2 - 3; }");
    let ExprKind::Binary(outer) = &first_expr(&module).kind else {
        panic!("expected binary expression");
    };
    assert_eq!(outer.op, BinaryOp::Sub);
    assert!(matches!(outer.lhs.kind, ExprKind::Binary(_)));
    assert!(matches!(outer.rhs.kind, ExprKind::Lit(LitExpr::Int(3))));
}

#[test]
fn parse_parens_override_precedence() {
    let module = parse("f :: () -> i32 { return (1 + 2) * 3; }");
    let ExprKind::Binary(mul) = &first_expr(&module).kind else {
        panic!("expected binary expression");
    };
    assert_eq!(mul.op, BinaryOp::Mul);
    assert!(matches!(&mul.lhs.kind, ExprKind::Binary(b) if b.op == BinaryOp::Add));
}

#[test]
fn parse_nested_unary() {
    let module = parse("f :: () -> bool { return !!ok; }");
    let ExprKind::Unary(outer) = &first_expr(&module).kind else {
        panic!("expected unary expression");
    };
    assert_eq!(outer.op, UnaryOp::LogicNot);
    assert!(matches!(&outer.rhs.kind, ExprKind::Unary(u) if u.op == UnaryOp::LogicNot));
}

#[test]
fn parse_cast_and_sizeof() {
    let module = parse("f :: () -> u64 { return cast(u64, 1) + sizeof(*Point); }");
    let ExprKind::Binary(add) = &first_expr(&module).kind else {
        panic!("expected binary expression");
    };
    assert!(matches!(&add.lhs.kind, ExprKind::Cast(c) if c.ty == BasicType::U64));
    let ExprKind::Sizeof(sizeof) = &add.rhs.kind else {
        panic!("expected sizeof");
    };
    assert_eq!(sizeof.ty.pointer_level, 1);
}

#[test]
fn parse_enum_literal_and_struct_init() {
    let module = parse("f :: () { c: Color = .Red; p: Point = Point.{1, 2}; q: Point = .{3, 4}; }");
    let stmts = &body_of(&module).stmts;
    let StmtKind::VarDecl(decl) = &stmts[0].kind else {
        panic!("expected var decl");
    };
    assert!(matches!(
        decl.value.as_ref().unwrap().kind,
        ExprKind::EnumLit(_)
    ));
    let StmtKind::VarDecl(decl) = &stmts[1].kind else {
        panic!("expected var decl");
    };
    let ExprKind::StructInit(init) = &decl.value.as_ref().unwrap().kind else {
        panic!("expected struct init");
    };
    assert!(init.ident.is_some());
    assert_eq!(init.args.len(), 2);
    let StmtKind::VarDecl(decl) = &stmts[2].kind else {
        panic!("expected var decl");
    };
    let ExprKind::StructInit(init) = &decl.value.as_ref().unwrap().kind else {
        panic!("expected struct init");
    };
    assert!(init.ident.is_none());
}

#[test]
fn parse_bare_array_init_and_inferred_decl() {
    let module = parse("f :: () { a: [2]i32 = {1, 2}; b: = 0; }");
    let stmts = &body_of(&module).stmts;
    let StmtKind::VarDecl(decl) = &stmts[0].kind else {
        panic!("expected var decl");
    };
    let ExprKind::ArrayInit(init) = &decl.value.as_ref().unwrap().kind else {
        panic!("expected array init");
    };
    assert!(init.ty.is_none());
    let StmtKind::VarDecl(inferred) = &stmts[1].kind else {
        panic!("expected var decl");
    };
    assert!(inferred.ty.is_none() && inferred.value.is_some());
}

#[test]
fn parse_array_init_with_explicit_type() {
    let module = parse("f :: () { a: [2]i32 = [2]i32{1, 2}; }");
    let StmtKind::VarDecl(decl) = &body_of(&module).stmts[0].kind else {
        panic!("expected var decl");
    };
    let ExprKind::ArrayInit(init) = &decl.value.as_ref().unwrap().kind else {
        panic!("expected array init");
    };
    assert!(init.ty.is_some());
    assert_eq!(init.args.len(), 2);
}

#[test]
fn parse_access_chain() {
    let module = parse("f :: () { a.b[3].c(1, 2); }");
    let StmtKind::Call(chain) = &body_of(&module).stmts[0].kind else {
        panic!("expected call statement");
    };
    assert_eq!(chain.links.len(), 4);
    assert!(matches!(chain.links[0].kind, ChainLinkKind::Name(_)));
    assert!(matches!(chain.links[1].kind, ChainLinkKind::Name(_)));
    assert!(matches!(chain.links[2].kind, ChainLinkKind::Index(_)));
    assert!(matches!(chain.links[3].kind, ChainLinkKind::Call(_, _)));
}

#[test]
fn parse_module_qualified_call() {
    let module = parse("f :: () { core::mem::copy(dst, src); }");
    let StmtKind::Call(chain) = &body_of(&module).stmts[0].kind else {
        panic!("expected call statement");
    };
    let access = chain.module_access.as_ref().expect("module access");
    assert_eq!(access.modules.len(), 2);
    assert!(matches!(chain.links[0].kind, ChainLinkKind::Call(_, _)));
}

#[test]
fn parse_for_forms() {
    let module = parse(
        "f :: () {\
           for { break; }\
           for x < 10 { x = x + 1; }\
           for i: i32 = 0; i < 10; i = i + 1 { }\
         }",
    );
    let stmts = &body_of(&module).stmts;
    let StmtKind::For(infinite) = &stmts[0].kind else {
        panic!("expected for");
    };
    assert!(infinite.decl.is_none() && infinite.cond.is_none() && infinite.step.is_none());
    let StmtKind::For(while_style) = &stmts[1].kind else {
        panic!("expected for");
    };
    assert!(while_style.decl.is_none() && while_style.cond.is_some() && while_style.step.is_none());
    let StmtKind::For(c_style) = &stmts[2].kind else {
        panic!("expected for");
    };
    assert!(c_style.decl.is_some() && c_style.cond.is_some() && c_style.step.is_some());
}

#[test]
fn parse_switch_with_empty_case() {
    let module = parse("f :: () { switch x { 1: 2 { return; } } }");
    let StmtKind::Switch(switch) = &body_of(&module).stmts[0].kind else {
        panic!("expected switch");
    };
    assert_eq!(switch.cases.len(), 2);
    assert!(switch.cases[0].block.is_none());
    assert!(switch.cases[1].block.is_some());
}

#[test]
fn parse_defer_single_statement() {
    let module = parse("f :: () { defer close(h); }");
    let StmtKind::Defer(block) = &body_of(&module).stmts[0].kind else {
        panic!("expected defer");
    };
    assert_eq!(block.stmts.len(), 1);
}

#[test]
fn parse_if_else_chain() {
    let module = parse("f :: () { if a { } else if b { } else { } }");
    let StmtKind::If(if_stmt) = &body_of(&module).stmts[0].kind else {
        panic!("expected if");
    };
    let Some(ElseBranch::If(elif)) = &if_stmt.else_branch else {
        panic!("expected else-if");
    };
    assert!(matches!(elif.else_branch, Some(ElseBranch::Block(_))));
}

#[test]
fn parse_compound_assignment_is_accepted() {
    let module = parse("f :: () { x += 1; }");
    let StmtKind::Assign(assign) = &body_of(&module).stmts[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(assign.op, AssignOp::Add);
}

#[test]
fn parse_is_deterministic() {
    let source = "A :: struct { x: i32; }\n\
                  E :: enum u8 { V = 1 }\n\
                  G :: 3 * 7;\n\
                  main :: () -> i32 { for i: i32 = 0; i < 3; i = i + 1 { } return 0; }";
    let mut interner_a = Interner::new();
    let mut interner_b = Interner::new();
    let a = parse_with(source, &mut interner_a);
    let b = parse_with(source, &mut interner_b);
    assert_eq!(a, b);
}

#[test]
fn parse_error_missing_double_colon() {
    let err = parse_err("main () { }");
    assert!(matches!(err, ParserError::ExpectedToken { expected, .. } if expected == "::"));
}

#[test]
fn parse_error_names_the_rule() {
    let err = parse_err("P :: struct { x i32; }");
    let ParserError::ExpectedToken { context, .. } = err else {
        panic!("expected ExpectedToken, got {err:?}");
    };
    assert_eq!(context, "struct field");
}

#[test]
fn parse_error_statement_without_assign() {
    let err = parse_err("f :: () { a.b 1; }");
    assert!(matches!(err, ParserError::ExpectedAssignOp { .. }));
}

#[test]
fn parse_error_top_level_garbage() {
    let err = parse_err("+");
    assert!(matches!(err, ParserError::ExpectedDeclaration { .. }));
}
