// analyzer/stmt.rs
//
// Pass 4: procedure bodies. Each body first runs the CFG rules, then a
// scoped type-checking walk that folds constants as it goes. The body is
// moved out of its slot for the duration of the walk so the checker can
// read every signature through the registry while it mutates statements.

use marten_frontend::ast::{
    AssignOp, BasicType, Block, ConstevalState, ElseBranch, Stmt, StmtKind, Type, TypeKind,
    VarDecl,
};
use marten_identity::{Interner, ModuleId, ProcId};

use crate::cfg;
use crate::consteval::{self, FoldOutcome};
use crate::errors::SemanticError;
use crate::program::{ModuleSymbols, Program, TypeError};
use crate::registry::ProcLoc;
use crate::resolve;
use crate::scope::BlockStack;
use crate::type_display::display_type;

use super::Analyzer;
use super::expr::ChainMode;

impl Analyzer {
    pub(crate) fn run_pass4(&mut self) {
        let proc_count = self.program.registry.procs.len();
        for index in 0..proc_count {
            let proc_id = ProcId::new(index as u32);
            self.check_proc_body(proc_id);
        }
    }

    fn check_proc_body(&mut self, proc_id: ProcId) {
        let (module, ast) = {
            let def = self.program.registry.proc_def(proc_id);
            if def.is_external {
                return;
            }
            (def.module, def.ast)
        };
        let m = module.index() as usize;

        {
            let Analyzer {
                program, errors, ..
            } = self;
            let decl = match ast {
                ProcLoc::Free(i) => &program.modules[m].procs[i as usize],
                ProcLoc::Member(i, j) => {
                    &program.modules[m].impls[i as usize].procs[j as usize]
                }
            };
            cfg::check_proc_cfg(decl, module, errors);
        }

        let Some(mut block) = body_slot(&mut self.program, m, ast).take() else {
            return;
        };
        {
            let Analyzer {
                program,
                interner,
                errors,
            } = self;
            let mut checker = BodyChecker::new(program, interner, errors, module, proc_id);
            checker.check_body(&mut block);
        }
        *body_slot(&mut self.program, m, ast) = Some(block);
    }
}

fn body_slot(program: &mut Program, m: usize, ast: ProcLoc) -> &mut Option<Block> {
    match ast {
        ProcLoc::Free(i) => &mut program.modules[m].procs[i as usize].block,
        ProcLoc::Member(i, j) => &mut program.modules[m].impls[i as usize].procs[j as usize].block,
    }
}

pub(crate) struct BodyChecker<'a> {
    pub(crate) program: &'a Program,
    pub(crate) interner: &'a Interner,
    pub(crate) errors: &'a mut Vec<TypeError>,
    pub(crate) module: ModuleId,
    pub(crate) proc_id: ProcId,
    pub(crate) scopes: BlockStack,
}

impl<'a> BodyChecker<'a> {
    pub(crate) fn new(
        program: &'a Program,
        interner: &'a Interner,
        errors: &'a mut Vec<TypeError>,
        module: ModuleId,
        proc_id: ProcId,
    ) -> Self {
        Self {
            program,
            interner,
            errors,
            module,
            proc_id,
            scopes: BlockStack::new(),
        }
    }

    pub(crate) fn module_symbols(&self) -> &ModuleSymbols {
        self.program.module_symbols(self.module)
    }

    pub(crate) fn error(&mut self, error: SemanticError) {
        self.errors.push(TypeError::new(error, self.module));
    }

    pub(crate) fn display(&self, ty: &Type) -> String {
        display_type(ty, self.interner, &self.program.registry)
    }

    fn check_body(&mut self, block: &mut Block) {
        self.scopes.reset();
        self.scopes.push();

        let params: Vec<_> = self
            .program
            .registry
            .proc_def(self.proc_id)
            .params
            .iter()
            .map(|p| (p.ident, p.ty.clone()))
            .collect();
        for (ident, ty) in params {
            if self.module_symbols().globals.contains_key(&ident.name) {
                let name = self.interner.resolve(ident.name).to_string();
                self.error(SemanticError::VarShadowsGlobal {
                    name,
                    span: ident.span.into(),
                });
                continue;
            }
            self.scopes.define(ident.name, ty);
        }

        self.check_block(block, false);
        self.scopes.pop();
    }

    pub(crate) fn check_block(&mut self, block: &mut Block, new_frame: bool) {
        if new_frame {
            self.scopes.push();
        }
        for stmt in &mut block.stmts {
            self.check_stmt(stmt);
        }
        if new_frame {
            self.scopes.pop();
        }
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) {
        let span = stmt.span;
        match &mut stmt.kind {
            StmtKind::If(if_stmt) => {
                self.check_expr_expect(&mut if_stmt.cond, &Type::basic(BasicType::Bool));
                self.check_block(&mut if_stmt.block, true);
                let mut else_branch = if_stmt.else_branch.as_mut();
                while let Some(branch) = else_branch {
                    match branch {
                        ElseBranch::Block(block) => {
                            self.check_block(block, true);
                            break;
                        }
                        ElseBranch::If(elif) => {
                            self.check_expr_expect(&mut elif.cond, &Type::basic(BasicType::Bool));
                            self.check_block(&mut elif.block, true);
                            else_branch = elif.else_branch.as_mut();
                        }
                    }
                }
            }

            StmtKind::For(for_stmt) => {
                // Header declarations share the body's scope
                self.scopes.push();
                if let Some(decl) = &mut for_stmt.decl {
                    self.check_var_decl(decl);
                }
                if let Some(cond) = &mut for_stmt.cond {
                    self.check_expr_expect(cond, &Type::basic(BasicType::Bool));
                }
                if let Some(step) = &mut for_stmt.step {
                    self.check_assign(step);
                }
                self.check_block(&mut for_stmt.block, false);
                self.scopes.pop();
            }

            StmtKind::Block(block) => self.check_block(block, true),
            StmtKind::Defer(block) => self.check_block(block, true),
            StmtKind::Break | StmtKind::Continue => {}

            StmtKind::Return(expr) => {
                let return_ty = self
                    .program
                    .registry
                    .proc_def(self.proc_id)
                    .return_ty
                    .clone();
                match (expr, return_ty) {
                    (Some(expr), Some(expected)) => {
                        self.check_expr_expect(expr, &expected);
                    }
                    (Some(_), None) => {
                        self.error(SemanticError::ReturnUnexpectedExpr { span: span.into() });
                    }
                    (None, Some(expected)) => {
                        let expected = self.display(&expected);
                        self.error(SemanticError::ReturnExpectedExpr {
                            expected,
                            span: span.into(),
                        });
                    }
                    (None, None) => {}
                }
            }

            StmtKind::Switch(switch) => {
                let ty = self.check_expr(&mut switch.expr, None);
                let ty = ty.filter(|ty| {
                    let valid = ty.pointer_level == 0
                        && match &ty.kind {
                            TypeKind::Basic(basic) => basic.is_integer(),
                            TypeKind::Enum(_) => true,
                            _ => false,
                        };
                    if !valid {
                        let found = self.display(ty);
                        self.error(SemanticError::SwitchNotIntegerOrEnum {
                            found,
                            span: switch.expr.span.into(),
                        });
                    }
                    valid
                });

                if switch.cases.is_empty() {
                    self.error(SemanticError::SwitchZeroCases {
                        span: switch.expr.span.into(),
                    });
                }

                for case in &mut switch.cases {
                    case.value.state = ConstevalState::Evaluating;
                    let outcome =
                        consteval::fold_expr(self, &mut case.value.expr, ty.as_ref(), true);
                    case.value.state = ConstevalState::Evaluated;
                    if let (Ok(FoldOutcome::Value(value)), Some(expected)) = (outcome, &ty) {
                        let span = case.value.expr.span;
                        self.check_value_against(&value, expected, span);
                    }
                    if let Some(block) = &mut case.block {
                        self.check_block(block, true);
                    }
                }
            }

            StmtKind::VarDecl(decl) => self.check_var_decl(decl),
            StmtKind::Assign(assign) => self.check_assign(assign),

            StmtKind::Call(chain) => {
                self.check_chain(chain, ChainMode::Stmt);
            }
        }
    }

    /// A local is introduced iff its name is neither a global nor already in
    /// scope. With an explicit type the initializer checks against it; bare
    /// initializers have their type adopted.
    fn check_var_decl(&mut self, decl: &mut VarDecl) {
        let name = decl.ident.name;
        if self.module_symbols().globals.contains_key(&name) {
            let name = self.interner.resolve(name).to_string();
            self.error(SemanticError::VarShadowsGlobal {
                name,
                span: decl.ident.span.into(),
            });
            return;
        }
        if self.scopes.contains(name) {
            let name = self.interner.resolve(name).to_string();
            self.error(SemanticError::VarAlreadyInScope {
                name,
                span: decl.ident.span.into(),
            });
            return;
        }

        if let Some(ty) = &mut decl.ty {
            if !resolve::resolve_type_full(self, ty) {
                return;
            }
            let expected = ty.clone();
            if let Some(value) = &mut decl.value {
                self.check_expr_expect(value, &expected);
            }
            self.scopes.define(name, expected);
        } else if let Some(value) = &mut decl.value {
            // The local only enters scope when inference succeeded
            if let Some(ty) = self.check_expr(value, None) {
                self.scopes.define(name, ty);
            }
        }
    }

    fn check_assign(&mut self, assign: &mut marten_frontend::ast::AssignStmt) {
        let target = self.check_chain(&mut assign.target, ChainMode::Place);

        // Compound assignment parses but is reserved
        if assign.op != AssignOp::Assign {
            self.error(SemanticError::AssignOpUnsupported {
                span: assign.op_span.into(),
            });
            return;
        }

        if let Some(result) = target
            && let Some(ty) = result.ty
        {
            self.check_expr_expect(&mut assign.value, &ty);
        }
    }
}
