// cfg.rs
//
// Control-flow validation for procedure bodies: reachability, return
// coverage, and loop/defer scoping rules. Runs before type checking for
// each procedure.

use marten_frontend::ast::{Block, ElseBranch, IfStmt, ProcDecl, StmtKind};
use marten_identity::ModuleId;

use crate::errors::SemanticError;
use crate::program::TypeError;

/// The control-flow effect of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    None,
    Break,
    Continue,
    Return,
}

pub fn check_proc_cfg(proc_decl: &ProcDecl, module: ModuleId, errors: &mut Vec<TypeError>) {
    let Some(block) = &proc_decl.block else {
        return;
    };

    let terminator = check_block_cfg(block, false, false, module, errors);
    if proc_decl.return_ty.is_some() && terminator != Terminator::Return {
        errors.push(TypeError::new(
            SemanticError::NotAllPathsReturn {
                span: proc_decl.ident.span.into(),
            },
            module,
        ));
    }
}

/// Walk a block recording its terminator. Statements after a terminator are
/// unreachable; that is reported once per block and traversal stops.
pub fn check_block_cfg(
    block: &Block,
    is_loop: bool,
    is_defer: bool,
    module: ModuleId,
    errors: &mut Vec<TypeError>,
) -> Terminator {
    let mut terminator = Terminator::None;

    for stmt in &block.stmts {
        if terminator != Terminator::None {
            errors.push(TypeError::new(
                SemanticError::UnreachableStatement {
                    span: stmt.span.into(),
                },
                module,
            ));
            break;
        }

        match &stmt.kind {
            StmtKind::If(if_stmt) => {
                terminator = check_if_cfg(if_stmt, is_loop, is_defer, module, errors);
            }
            StmtKind::For(for_stmt) => {
                // The loop body runs zero or more times; its terminator does
                // not propagate out of the loop.
                check_block_cfg(&for_stmt.block, true, is_defer, module, errors);
            }
            StmtKind::Block(inner) => {
                terminator = check_block_cfg(inner, is_loop, is_defer, module, errors);
            }
            StmtKind::Defer(inner) => {
                if is_defer {
                    errors.push(TypeError::new(
                        SemanticError::NestedDefer {
                            span: stmt.span.into(),
                        },
                        module,
                    ));
                } else {
                    // Defer bodies are not part of the enclosing loop
                    check_block_cfg(inner, false, true, module, errors);
                }
            }
            StmtKind::Break => {
                if is_loop {
                    terminator = Terminator::Break;
                } else {
                    let error = if is_defer {
                        SemanticError::BreakInsideDefer {
                            span: stmt.span.into(),
                        }
                    } else {
                        SemanticError::BreakOutsideLoop {
                            span: stmt.span.into(),
                        }
                    };
                    errors.push(TypeError::new(error, module));
                }
            }
            StmtKind::Continue => {
                if is_loop {
                    terminator = Terminator::Continue;
                } else {
                    let error = if is_defer {
                        SemanticError::ContinueInsideDefer {
                            span: stmt.span.into(),
                        }
                    } else {
                        SemanticError::ContinueOutsideLoop {
                            span: stmt.span.into(),
                        }
                    };
                    errors.push(TypeError::new(error, module));
                }
            }
            StmtKind::Return(_) => {
                if is_defer {
                    errors.push(TypeError::new(
                        SemanticError::ReturnInsideDefer {
                            span: stmt.span.into(),
                        },
                        module,
                    ));
                } else {
                    terminator = Terminator::Return;
                }
            }
            StmtKind::Switch(switch) => {
                for case in &switch.cases {
                    if let Some(case_block) = &case.block {
                        check_block_cfg(case_block, is_loop, is_defer, module, errors);
                    }
                }
            }
            StmtKind::VarDecl(_) | StmtKind::Assign(_) | StmtKind::Call(_) => {}
        }
    }

    terminator
}

/// The join of an if/else chain: when every branch (including a final else)
/// ends with the same terminator, that terminator propagates; otherwise the
/// statement falls through.
fn check_if_cfg(
    if_stmt: &IfStmt,
    is_loop: bool,
    is_defer: bool,
    module: ModuleId,
    errors: &mut Vec<TypeError>,
) -> Terminator {
    let then_term = check_block_cfg(&if_stmt.block, is_loop, is_defer, module, errors);

    let else_term = match &if_stmt.else_branch {
        Some(ElseBranch::If(elif)) => check_if_cfg(elif, is_loop, is_defer, module, errors),
        Some(ElseBranch::Block(block)) => {
            check_block_cfg(block, is_loop, is_defer, module, errors)
        }
        // No else: the condition may be false and control falls through
        None => return Terminator::None,
    };

    if then_term == else_term {
        then_term
    } else {
        Terminator::None
    }
}

#[cfg(test)]
mod tests {
    use marten_frontend::parser::Parser;
    use marten_identity::Interner;

    use super::*;

    fn check(source: &str) -> Vec<SemanticError> {
        let mut interner = Interner::new();
        let mut parser = Parser::new(source, &mut interner);
        let module = parser.parse_module().expect("parse should succeed");
        let mut errors = Vec::new();
        for proc_decl in &module.procs {
            check_proc_cfg(proc_decl, ModuleId::new(0), &mut errors);
        }
        errors.into_iter().map(|e| e.error).collect()
    }

    #[test]
    fn return_on_every_path_is_accepted() {
        let errors = check("f :: () -> i32 { if c { return 1; } else { return 2; } }");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn if_without_else_does_not_cover() {
        let errors = check("f :: () -> i32 { if c { return 1; } }");
        assert!(matches!(errors[0], SemanticError::NotAllPathsReturn { .. }));
    }

    #[test]
    fn else_if_chain_covers_when_all_branches_return() {
        let errors = check(
            "f :: () -> i32 { if a { return 1; } else if b { return 2; } else { return 3; } }",
        );
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn unreachable_after_return_reports_once() {
        let errors = check("f :: () -> i32 { return 0; x: i32 = 1; y: i32 = 2; }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SemanticError::UnreachableStatement { .. }));
    }

    #[test]
    fn break_outside_loop() {
        let errors = check("f :: () { break; }");
        assert!(matches!(errors[0], SemanticError::BreakOutsideLoop { .. }));
    }

    #[test]
    fn break_inside_defer() {
        let errors = check("f :: () { defer break; }");
        assert!(matches!(errors[0], SemanticError::BreakInsideDefer { .. }));
    }

    #[test]
    fn loop_inside_defer_allows_break() {
        let errors = check("f :: () { defer { for { break; } } }");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn defer_leaves_the_enclosing_loop() {
        let errors = check("f :: () { for { defer break; } }");
        assert!(matches!(errors[0], SemanticError::BreakInsideDefer { .. }));
    }

    #[test]
    fn return_inside_defer() {
        let errors = check("f :: () { defer { return; } }");
        assert!(matches!(errors[0], SemanticError::ReturnInsideDefer { .. }));
    }

    #[test]
    fn nested_defer() {
        let errors = check("f :: () { defer { defer x(); } }");
        assert!(matches!(errors[0], SemanticError::NestedDefer { .. }));
    }

    #[test]
    fn continue_in_loop_is_fine() {
        let errors = check("f :: () { for { continue; } }");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn loop_does_not_satisfy_return_coverage() {
        let errors = check("f :: () -> i32 { for { return 0; } }");
        assert!(matches!(errors[0], SemanticError::NotAllPathsReturn { .. }));
    }

    #[test]
    fn switch_blocks_inherit_defer_context() {
        let errors = check("f :: () { defer { switch x { 1 { return; } } } }");
        assert!(matches!(errors[0], SemanticError::ReturnInsideDefer { .. }));
    }
}
