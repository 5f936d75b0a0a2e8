// analyzer/tests.rs
//
// End-to-end checks: source text through parsing and all four passes.

use std::path::PathBuf;

use marten_frontend::ast::{ConstValue, ExprKind, StmtKind, TypeKind};
use marten_frontend::parser::Parser;
use marten_identity::Interner;

use crate::errors::SemanticError;
use crate::loader::ModuleSource;

use super::Analyzer;

fn analyze(sources: &[(&str, &str)]) -> (Analyzer, bool) {
    let mut interner = Interner::new();
    let mut modules = Vec::new();
    let mut module_sources = Vec::new();
    for (path, source) in sources {
        let mut parser = Parser::new(source, &mut interner);
        let module = parser
            .parse_module()
            .unwrap_or_else(|e| panic!("parse error in {path}: {:?}", e.error));
        assert!(!parser.has_lexer_errors(), "lexer errors in {path}");
        modules.push(module);
        module_sources.push(ModuleSource {
            path: (*path).to_string(),
            file: PathBuf::from(format!("src/{path}.mar")),
            source: (*source).to_string(),
        });
    }
    let mut analyzer = Analyzer::new(modules, module_sources, interner);
    let ok = analyzer.analyze();
    (analyzer, ok)
}

fn analyze_main(source: &str) -> (Analyzer, bool) {
    analyze(&[("main", source)])
}

fn errors_of(analyzer: &Analyzer) -> Vec<&SemanticError> {
    analyzer.errors().iter().map(|e| &e.error).collect()
}

// -- happy paths -------------------------------------------------------------

#[test]
fn empty_program_compiles() {
    let (analyzer, ok) = analyze_main("main :: () -> i32 { return 0; }");
    assert!(ok, "errors: {:?}", errors_of(&analyzer));

    assert_eq!(analyzer.program.registry.procs.len(), 1);
    let main_def = &analyzer.program.registry.procs[0];
    assert!(main_def.is_main);
    assert!(main_def.params.is_empty());
    let return_ty = main_def.return_ty.as_ref().unwrap();
    assert!(matches!(
        return_ty.kind,
        TypeKind::Basic(marten_frontend::ast::BasicType::I32)
    ));
}

#[test]
fn declaration_ids_follow_parse_order() {
    let (analyzer, ok) = analyze_main(
        "A :: struct { x: i32; }\n\
         B :: struct { a: A; }\n\
         First :: 1;\n\
         Second :: 2;\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));

    let registry = &analyzer.program.registry;
    assert_eq!(analyzer.interner.resolve(registry.structs[0].ident.name), "A");
    assert_eq!(analyzer.interner.resolve(registry.structs[1].ident.name), "B");
    assert_eq!(
        analyzer.interner.resolve(registry.globals[0].ident.name),
        "First"
    );
    assert_eq!(
        analyzer.interner.resolve(registry.globals[1].ident.name),
        "Second"
    );
}

#[test]
fn globals_fold_and_infer_types() {
    let (analyzer, ok) = analyze_main(
        "SEVEN :: 1 + 2 * 3;\n\
         BIG :: 5000000000;\n\
         HALF :: 1.0 / 2.0;\n\
         FLAG :: 1 < 2 && true;\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));

    let globals = &analyzer.program.registry.globals;
    assert_eq!(globals[0].value, Some(ConstValue::Signed(7)));
    assert!(matches!(
        globals[0].ty.as_ref().unwrap().kind,
        TypeKind::Basic(marten_frontend::ast::BasicType::I32)
    ));
    assert!(matches!(
        globals[1].ty.as_ref().unwrap().kind,
        TypeKind::Basic(marten_frontend::ast::BasicType::I64)
    ));
    assert_eq!(globals[2].value, Some(ConstValue::Float(0.5)));
    assert_eq!(globals[3].value, Some(ConstValue::Bool(true)));
}

#[test]
fn global_initializer_is_folded_in_place() {
    let (analyzer, ok) = analyze_main(
        "SEVEN :: 1 + 2 * 3;\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));

    let init = &analyzer.program.modules[0].globals[0].value;
    assert!(matches!(
        init.expr.kind,
        ExprKind::Folded(ConstValue::Signed(7))
    ));
}

#[test]
fn struct_layout_with_padding() {
    let (analyzer, ok) = analyze_main(
        "Mixed :: struct { a: u8; b: u32; c: u8; }\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));

    let def = &analyzer.program.registry.structs[0];
    assert_eq!(def.size, Some(12));
    assert_eq!(def.align, Some(4));
}

#[test]
fn acyclic_structs_are_sized() {
    let (analyzer, ok) = analyze_main(
        "Inner :: struct { a: u16; }\n\
         Outer :: struct { xs: [3]Inner; tail: u64; }\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));

    for def in &analyzer.program.registry.structs {
        let size = def.size.expect("sized");
        let align = def.align.expect("aligned");
        assert_eq!(size % align, 0, "size is a multiple of alignment");
    }
    // [3]Inner = 6 bytes, padded to 8 for the u64 tail, 16 total
    assert_eq!(analyzer.program.registry.structs[1].size, Some(16));
}

#[test]
fn sizeof_folds_after_sizing() {
    let (analyzer, ok) = analyze_main(
        "Point :: struct { x: f32; y: f32; }\n\
         main :: () -> i32 { s: u64 = sizeof(Point) + sizeof([4]u32); return 0; }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));

    let block = analyzer.program.modules[0].procs[0].block.as_ref().unwrap();
    let StmtKind::VarDecl(decl) = &block.stmts[0].kind else {
        panic!("expected var decl");
    };
    assert!(matches!(
        decl.value.as_ref().unwrap().kind,
        ExprKind::Folded(ConstValue::Unsigned(24))
    ));
}

#[test]
fn enums_and_switch() {
    let (analyzer, ok) = analyze_main(
        "Color :: enum u8 { Red = 1, Green = 2, Blue = 3 }\n\
         main :: () -> i32 {\n\
           c: Color = .Green;\n\
           switch c {\n\
             .Red: \n\
             .Green { return 1; }\n\
             Color.Blue { return 2; }\n\
           }\n\
           return 0;\n\
         }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));

    let variants = &analyzer.program.registry.enums[0].variants;
    assert_eq!(variants[1].value, Some(ConstValue::Signed(2)));
}

#[test]
fn cross_module_import_and_use() {
    let (analyzer, ok) = analyze(&[
        (
            "main",
            "import core::limits;\n\
             use MAX = limits::MAX_LEN;\n\
             main :: () -> i32 {\n\
               a: u64 = limits::MAX_LEN;\n\
               b: u64 = MAX;\n\
               limits::report(a, b);\n\
               return 0;\n\
             }",
        ),
        (
            "core::limits",
            "MAX_LEN :: cast(u64, 4096);\n\
             report :: (a: u64, b: u64) @",
        ),
    ]);
    assert!(ok, "errors: {:?}", errors_of(&analyzer));
}

#[test]
fn impl_methods_check() {
    let (analyzer, ok) = analyze_main(
        "Vec2 :: struct { x: f32; y: f32; }\n\
         impl Vec2 {\n\
           dot :: (self, other: Vec2) -> f32 {\n\
             return self.x * other.x + self.y * other.y;\n\
           }\n\
         }\n\
         main :: () -> i32 {\n\
           v: Vec2 = Vec2.{1.0, 2.0};\n\
           d: f32 = v.dot(Vec2.{3.0, 4.0});\n\
           return 0;\n\
         }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));
    assert_eq!(analyzer.program.registry.structs[0].methods.len(), 1);
}

#[test]
fn defer_and_loops_check() {
    let (analyzer, ok) = analyze_main(
        "tick :: () @\n\
         main :: () -> i32 {\n\
           total: i32 = 0;\n\
           defer tick();\n\
           for i: i32 = 0; i < 10; i = i + 1 {\n\
             if i == 5 { continue; }\n\
             total = total + i;\n\
           }\n\
           for total > 0 { total = total - 1; }\n\
           return total;\n\
         }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));
}

#[test]
fn pointers_break_struct_cycles() {
    let (analyzer, ok) = analyze_main(
        "Node :: struct { value: i64; next: *Node; }\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));
    assert_eq!(analyzer.program.registry.structs[0].size, Some(16));
}

// -- failure scenarios -------------------------------------------------------

#[test]
fn missing_main_module() {
    let (analyzer, ok) = analyze(&[("util", "foo :: () -> i32 { return 1; }")]);
    assert!(!ok);
    let errors = errors_of(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SemanticError::MainFileNotFound));
}

#[test]
fn missing_main_proc() {
    let (analyzer, ok) = analyze_main("foo :: () -> i32 { return 1; }");
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::MainProcNotFound
    ));
}

#[test]
fn wrong_main_return_type() {
    let (analyzer, ok) = analyze_main("main :: () -> u64 { return 0; }");
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::MainProcWrongReturnType { .. }
    ));
}

#[test]
fn infinite_struct_reports_field_chain() {
    let (analyzer, ok) = analyze_main(
        "A :: struct { x: B; }\n\
         B :: struct { y: A; }\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(!ok);
    let errors = errors_of(&analyzer);
    let SemanticError::StructInfiniteSize { name, chain, .. } = errors[0] else {
        panic!("expected StructInfiniteSize, got {:?}", errors[0]);
    };
    assert_eq!(name, "A");
    assert_eq!(chain, "A.x -> B.y -> A");
}

#[test]
fn unreachable_after_return_without_coverage_error() {
    let (analyzer, ok) = analyze_main("main :: () -> i32 { return 0; x: i32 = 1; }");
    assert!(!ok);
    let errors = errors_of(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SemanticError::UnreachableStatement { .. }));
}

#[test]
fn const_fold_overflow_leaves_global_untyped() {
    let (analyzer, ok) = analyze_main(
        "G :: 9223372036854775807 + 1;\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(!ok);
    let errors = errors_of(&analyzer);
    assert!(
        matches!(errors[0], SemanticError::FoldOverflow { op, .. } if op == "+"),
        "got {:?}",
        errors[0]
    );
    assert!(analyzer.program.registry.globals[0].ty.is_none());
}

#[test]
fn mutually_recursive_globals_cycle() {
    let (analyzer, ok) = analyze_main(
        "A :: B + 1;\n\
         B :: A + 1;\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(!ok);
    let errors = errors_of(&analyzer);
    let SemanticError::ConstevalDependencyCycle { chain, .. } = errors[0] else {
        panic!("expected cycle, got {:?}", errors[0]);
    };
    assert!(chain.contains('A') && chain.contains('B'), "chain: {chain}");
}

#[test]
fn duplicate_symbol_reports_previous_site() {
    let (analyzer, ok) = analyze_main(
        "foo :: () { }\n\
         foo :: 1;\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::SymbolAlreadyDeclared { .. }
    ));
}

#[test]
fn unknown_import_path() {
    let (analyzer, ok) = analyze_main(
        "import nowhere::missing;\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::ImportPathNotFound { .. }
    ));
}

#[test]
fn use_of_unknown_symbol() {
    let (analyzer, ok) = analyze(&[
        (
            "main",
            "import util;\n\
             use nope = util::missing;\n\
             main :: () -> i32 { return 0; }",
        ),
        ("util", "VALUE :: 1;"),
    ]);
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::UseSymbolNotFound { .. }
    ));
}

#[test]
fn local_cannot_shadow_global() {
    let (analyzer, ok) = analyze_main(
        "LIMIT :: 10;\n\
         main :: () -> i32 { LIMIT: i32 = 1; return 0; }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::VarShadowsGlobal { .. }
    ));
}

#[test]
fn redeclaration_in_scope() {
    let (analyzer, ok) = analyze_main("main :: () -> i32 { x: i32 = 1; x: i32 = 2; return 0; }");
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::VarAlreadyInScope { .. }
    ));
}

#[test]
fn implicit_casts_are_narrow() {
    // u8 widens into i32, i32 does not narrow into u8
    let (analyzer, ok) = analyze_main(
        "main :: () -> i32 {\n\
           small: u8 = 1;\n\
           wide: i32 = small;\n\
           narrow: u8 = wide;\n\
           return 0;\n\
         }",
    );
    assert!(!ok);
    let errors = errors_of(&analyzer);
    assert_eq!(errors.len(), 1, "got {errors:?}");
    assert!(matches!(errors[0], SemanticError::TypeMismatch { .. }));
}

#[test]
fn redundant_cast_is_rejected() {
    let (analyzer, ok) = analyze_main(
        "main :: () -> i32 { x: i32 = 1; y: i32 = cast(i32, x); return 0; }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::CastRedundant { .. }
    ));
}

#[test]
fn cast_cannot_target_bool() {
    let (analyzer, ok) = analyze_main("main :: () -> i32 { b: bool = cast(bool, 1); return 0; }");
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::CastInvalidTarget { .. }
    ));
}

#[test]
fn compound_assignment_is_reserved() {
    let (analyzer, ok) = analyze_main("main :: () -> i32 { x: i32 = 1; x += 1; return 0; }");
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::AssignOpUnsupported { .. }
    ));
}

#[test]
fn call_argument_count_checked() {
    let (analyzer, ok) = analyze_main(
        "add :: (a: i32, b: i32) -> i32 { return a + b; }\n\
         main :: () -> i32 { return add(1); }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::WrongArgumentCount { expected: 2, found: 1, .. }
    ));
}

#[test]
fn variadic_tail_is_unchecked() {
    let (analyzer, ok) = analyze_main(
        "printf :: (fmt: string, ..) -> i32 @\n\
         main :: () -> i32 { printf(\"%d %s\", 1, \"two\"); return 0; }",
    );
    assert!(!ok);
    // The call is a statement discarding the declared i32 return
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::CallReturnDiscarded { .. }
    ));
}

#[test]
fn statement_chain_must_call() {
    let (analyzer, ok) = analyze_main("main :: () -> i32 { x: i32 = 1; x; return 0; }");
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::ExpectedCallStatement { .. }
    ));
}

#[test]
fn enum_literal_requires_context() {
    let (analyzer, ok) = analyze_main(
        "Color :: enum { Red = 1 }\n\
         main :: () -> i32 { x: = .Red; return 0; }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::EnumLitNoContext { .. }
    ));
}

#[test]
fn zero_variant_enum_rejected() {
    let (analyzer, ok) = analyze_main(
        "Empty :: enum { }\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::EnumZeroVariants { .. }
    ));
}

#[test]
fn enum_variant_must_fit_base_type() {
    let (analyzer, ok) = analyze_main(
        "Tiny :: enum u8 { Big = 300 }\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::LiteralOutOfRange { .. }
    ));
}

#[test]
fn array_size_must_be_positive() {
    let (analyzer, ok) = analyze_main(
        "Buf :: struct { data: [0]u8; }\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::ArrayZeroSize { .. }
    ));
}

#[test]
fn array_sizes_can_reference_globals() {
    let (analyzer, ok) = analyze_main(
        "LEN :: 4;\n\
         Buf :: struct { data: [LEN]u8; }\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(ok, "errors: {:?}", errors_of(&analyzer));
    assert_eq!(analyzer.program.registry.structs[0].size, Some(4));
}

#[test]
fn division_by_zero_in_constant() {
    let (analyzer, ok) = analyze_main(
        "BAD :: 1 / 0;\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::FoldDivisionByZero { .. }
    ));
}

#[test]
fn shift_count_limit_in_constant() {
    let (analyzer, ok) = analyze_main(
        "BAD :: 1 << 64;\n\
         main :: () -> i32 { return 0; }",
    );
    assert!(!ok);
    assert!(matches!(
        errors_of(&analyzer)[0],
        SemanticError::FoldShiftOverflow { .. }
    ));
}
