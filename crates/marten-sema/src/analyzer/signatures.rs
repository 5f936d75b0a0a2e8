// analyzer/signatures.rs
//
// Pass 2: use-imports, type-signature resolution, declaration shape checks,
// constant evaluation of globals / enum variants / field defaults / array
// sizes, and the `main` procedure contract.
//
// Constant evaluation works directly on the AST through a take-and-restore
// protocol: the expression under evaluation is moved out of its slot, folded
// (possibly recursing into other globals), and written back folded. The
// tri-state on each slot turns re-entry into a dependency-cycle diagnostic.

use marten_frontend::ast::{
    BasicType, ConstValue, ConstevalExpr, ConstevalState, Expr, ExprKind, LitExpr, Type, TypeKind,
};
use marten_frontend::ChainLinkKind;
use marten_identity::{EnumId, GlobalId, Interner, ModuleId, Span, Symbol};
use rustc_hash::FxHashSet;

use crate::consteval::{self, ConstEnv, FitResult, FoldOutcome};
use crate::errors::SemanticError;
use crate::program::{ModuleSymbols, Program, TypeError};
use crate::registry::{FieldDef, ImplTarget, ParamDef, Registry};
use crate::resolve;
use crate::type_display::display_type;

use super::Analyzer;

impl Analyzer {
    pub(crate) fn run_pass2(&mut self) {
        self.resolve_uses();
        self.check_signatures();
        self.attach_impls();
        self.run_consteval();
        self.mirror_registry();
        self.check_main();
    }

    /// Copy `use`d symbols into the local kind maps. Resolution sees only
    /// pass-1 declarations, never other `use` aliases, so the result does
    /// not depend on module order.
    fn resolve_uses(&mut self) {
        enum Found {
            Struct(marten_identity::StructId),
            Enum(EnumId),
            Proc(marten_identity::ProcId),
            Global(GlobalId),
        }

        let mut resolved: Vec<(usize, Symbol, Found)> = Vec::new();
        for (m, module) in self.program.modules.iter().enumerate() {
            let module_id = ModuleId::new(m as u32);
            for use_decl in &module.uses {
                let Some(&target) = self.program.symbols[m].imports.get(&use_decl.module.name)
                else {
                    self.errors.push(TypeError::new(
                        SemanticError::ModuleNotFound {
                            name: self.interner.resolve(use_decl.module.name).to_string(),
                            span: use_decl.module.span.into(),
                        },
                        module_id,
                    ));
                    continue;
                };

                let tables = &self.program.symbols[target.index() as usize];
                let symbol = use_decl.symbol.name;
                let found = if let Some(&id) = tables.structs.get(&symbol) {
                    Found::Struct(id)
                } else if let Some(&id) = tables.enums.get(&symbol) {
                    Found::Enum(id)
                } else if let Some(&id) = tables.procs.get(&symbol) {
                    Found::Proc(id)
                } else if let Some(&id) = tables.globals.get(&symbol) {
                    Found::Global(id)
                } else {
                    self.errors.push(TypeError::new(
                        SemanticError::UseSymbolNotFound {
                            name: self.interner.resolve(symbol).to_string(),
                            module: self.interner.resolve(use_decl.module.name).to_string(),
                            span: use_decl.symbol.span.into(),
                        },
                        module_id,
                    ));
                    continue;
                };
                resolved.push((m, use_decl.alias.name, found));
            }
        }

        for (m, alias, found) in resolved {
            let tables = &mut self.program.symbols[m];
            match found {
                Found::Struct(id) => {
                    tables.structs.insert(alias, id);
                }
                Found::Enum(id) => {
                    tables.enums.insert(alias, id);
                }
                Found::Proc(id) => {
                    tables.procs.insert(alias, id);
                }
                Found::Global(id) => {
                    tables.globals.insert(alias, id);
                }
            }
        }
    }

    fn check_signatures(&mut self) {
        for m in 0..self.program.modules.len() {
            let module_id = ModuleId::new(m as u32);

            let mut structs = std::mem::take(&mut self.program.modules[m].structs);
            {
                let mut cx = Pass2Cx::new(self, module_id);
                let mut name_set = FxHashSet::default();
                for decl in &mut structs {
                    name_set.clear();
                    for field in &mut decl.fields {
                        resolve::resolve_signature(&mut cx, &mut field.ty);
                        if !name_set.insert(field.ident.name) {
                            cx.report(SemanticError::StructDuplicateField {
                                name: cx.interner.resolve(field.ident.name).to_string(),
                                span: field.ident.span.into(),
                            });
                        }
                    }
                }
            }
            self.program.modules[m].structs = structs;

            let enums = std::mem::take(&mut self.program.modules[m].enums);
            {
                let mut cx = Pass2Cx::new(self, module_id);
                let mut name_set = FxHashSet::default();
                for decl in &enums {
                    if decl.variants.is_empty() {
                        cx.report(SemanticError::EnumZeroVariants {
                            span: decl.ident.span.into(),
                        });
                        continue;
                    }
                    if !decl.basic_ty.is_integer() {
                        cx.report(SemanticError::EnumNonIntegerType {
                            span: decl.ident.span.into(),
                        });
                        continue;
                    }
                    name_set.clear();
                    for variant in &decl.variants {
                        if !name_set.insert(variant.ident.name) {
                            cx.report(SemanticError::EnumDuplicateVariant {
                                name: cx.interner.resolve(variant.ident.name).to_string(),
                                span: variant.ident.span.into(),
                            });
                        }
                    }
                }
            }
            self.program.modules[m].enums = enums;

            let mut procs = std::mem::take(&mut self.program.modules[m].procs);
            {
                let mut cx = Pass2Cx::new(self, module_id);
                for decl in &mut procs {
                    cx.check_proc_signature(decl, false);
                }
            }
            self.program.modules[m].procs = procs;

            let mut impls = std::mem::take(&mut self.program.modules[m].impls);
            {
                let mut cx = Pass2Cx::new(self, module_id);
                for impl_decl in &mut impls {
                    for decl in &mut impl_decl.procs {
                        cx.check_proc_signature(decl, true);
                    }
                }
            }
            self.program.modules[m].impls = impls;
        }
    }

    /// Resolve impl targets, type the `self` receivers, and attach member
    /// procedures to their target's method table.
    fn attach_impls(&mut self) {
        for m in 0..self.program.modules.len() {
            let module_id = ModuleId::new(m as u32);
            let mut impls = std::mem::take(&mut self.program.modules[m].impls);
            let member_ids = std::mem::take(&mut self.program.symbols[m].impl_proc_ids);

            {
                let mut cx = Pass2Cx::new(self, module_id);
                for (i, impl_decl) in impls.iter_mut().enumerate() {
                    let mut target_ty = Type {
                        pointer_level: 0,
                        kind: TypeKind::Unresolved(Box::new(impl_decl.target.clone())),
                    };
                    if !resolve::resolve_signature(&mut cx, &mut target_ty) {
                        continue;
                    }
                    let target = match target_ty.kind {
                        TypeKind::Struct(id) => ImplTarget::Struct(id),
                        TypeKind::Enum(id) => ImplTarget::Enum(id),
                        _ => {
                            cx.report(SemanticError::ImplTargetInvalid {
                                span: impl_decl.target.ident.span.into(),
                            });
                            continue;
                        }
                    };
                    let self_ty = Type {
                        pointer_level: 1,
                        kind: target_ty.kind.clone(),
                    };

                    for (j, decl) in impl_decl.procs.iter_mut().enumerate() {
                        let proc_id = member_ids[i][j];
                        for param in &mut decl.params {
                            if param.is_self {
                                param.ty = Some(self_ty.clone());
                            }
                        }

                        let methods = match target {
                            ImplTarget::Struct(id) => {
                                &mut cx.program.registry.structs[id.index() as usize].methods
                            }
                            ImplTarget::Enum(id) => {
                                &mut cx.program.registry.enums[id.index() as usize].methods
                            }
                        };
                        if methods.insert(decl.ident.name, proc_id).is_some() {
                            let name = cx.interner.resolve(decl.ident.name).to_string();
                            cx.report(SemanticError::ImplDuplicateMethod {
                                name,
                                span: decl.ident.span.into(),
                            });
                        }
                        cx.program.registry.procs[proc_id.index() as usize].impl_target =
                            Some(target);
                    }
                }
            }

            self.program.modules[m].impls = impls;
            self.program.symbols[m].impl_proc_ids = member_ids;
        }
    }

    /// Evaluate every compile-time expression: array sizes in signatures,
    /// globals (adopting their inferred type), enum variants (checked
    /// against the enum type) and struct field defaults.
    fn run_consteval(&mut self) {
        // Array sizes in struct fields and procedure signatures
        for m in 0..self.program.modules.len() {
            let module_id = ModuleId::new(m as u32);

            let mut structs = std::mem::take(&mut self.program.modules[m].structs);
            {
                let mut cx = Pass2Cx::new(self, module_id);
                for decl in &mut structs {
                    for field in &mut decl.fields {
                        resolve::fold_array_sizes(&mut cx, &mut field.ty);
                    }
                }
            }
            self.program.modules[m].structs = structs;

            let mut procs = std::mem::take(&mut self.program.modules[m].procs);
            {
                let mut cx = Pass2Cx::new(self, module_id);
                for decl in &mut procs {
                    cx.fold_proc_signature_sizes(decl);
                }
            }
            self.program.modules[m].procs = procs;

            let mut impls = std::mem::take(&mut self.program.modules[m].impls);
            {
                let mut cx = Pass2Cx::new(self, module_id);
                for impl_decl in &mut impls {
                    for decl in &mut impl_decl.procs {
                        cx.fold_proc_signature_sizes(decl);
                    }
                }
            }
            self.program.modules[m].impls = impls;
        }

        // Globals, then enum variants, then field defaults. Evaluation order
        // within each group is parse order; dependencies pull each other in
        // recursively and the tri-state catches cycles.
        let global_count = self.program.registry.globals.len();
        {
            let mut cx = Pass2Cx::new(self, ModuleId::new(0));
            for index in 0..global_count {
                let id = GlobalId::new(index as u32);
                if cx.program.registry.global_def(id).state == ConstevalState::NotEvaluated {
                    let _ = cx.eval_global(id);
                }
            }

            let enum_count = cx.program.registry.enums.len();
            for index in 0..enum_count {
                let id = EnumId::new(index as u32);
                let variant_count = cx.program.registry.enum_def(id).variants.len();
                for variant in 0..variant_count {
                    if cx.program.registry.enum_def(id).variants[variant].state
                        == ConstevalState::NotEvaluated
                    {
                        let _ = cx.eval_variant(id, variant as u32);
                    }
                }
            }
        }

        self.check_field_defaults();
    }

    fn check_field_defaults(&mut self) {
        for struct_index in 0..self.program.registry.structs.len() {
            let (m, ast_index) = {
                let def = &self.program.registry.structs[struct_index];
                (def.module.index() as usize, def.ast_index as usize)
            };
            let module_id = ModuleId::new(m as u32);

            let field_count = self.program.modules[m].structs[ast_index].fields.len();
            for field in 0..field_count {
                let slot = &mut self.program.modules[m].structs[ast_index].fields[field];
                let expected = slot.ty.clone();
                let Some(mut default) = slot.default.take() else {
                    continue;
                };

                {
                    let mut cx = Pass2Cx::new(self, module_id);
                    default.state = ConstevalState::Evaluating;
                    match consteval::fold_expr(&mut cx, &mut default.expr, Some(&expected), true) {
                        Ok(FoldOutcome::Value(value)) => {
                            default.state = ConstevalState::Evaluated;
                            cx.check_value_against(&value, &expected, default.expr.span);
                        }
                        Ok(FoldOutcome::NotConst) => {
                            unreachable!("required fold reported")
                        }
                        Err(()) => default.state = ConstevalState::Evaluated,
                    }
                }

                self.program.modules[m].structs[ast_index].fields[field].default = Some(default);
            }
        }
    }

    /// Copy resolved signatures into the registry defs that passes 3 and 4
    /// read.
    fn mirror_registry(&mut self) {
        for m in 0..self.program.modules.len() {
            let Program {
                modules,
                symbols,
                registry,
                ..
            } = &mut self.program;
            let module = &modules[m];
            let tables = &symbols[m];

            for decl in &module.structs {
                let Some(&id) = tables.structs.get(&decl.ident.name) else {
                    continue;
                };
                registry.structs[id.index() as usize].fields = decl
                    .fields
                    .iter()
                    .map(|f| FieldDef {
                        ident: f.ident,
                        ty: f.ty.clone(),
                    })
                    .collect();
            }

            for (i, decl) in module.procs.iter().enumerate() {
                let id = tables.proc_ids[i];
                mirror_proc(registry, id, decl);
            }
            for (i, impl_decl) in module.impls.iter().enumerate() {
                for (j, decl) in impl_decl.procs.iter().enumerate() {
                    let id = tables.impl_proc_ids[i][j];
                    mirror_proc(registry, id, decl);
                }
            }
        }
    }

    /// The entry module must define `main :: () -> i32` with a body.
    fn check_main(&mut self) {
        let Some(&main_module) = self.program.module_map.get("main") else {
            return; // already diagnosed in pass 1
        };

        let main_sym = self.interner.lookup("main");
        let proc_id = main_sym
            .and_then(|sym| self.program.symbols[main_module.index() as usize].procs.get(&sym))
            .copied();
        let Some(proc_id) = proc_id else {
            self.errors.push(TypeError::new(
                SemanticError::MainProcNotFound,
                main_module,
            ));
            return;
        };

        let def = &mut self.program.registry.procs[proc_id.index() as usize];
        def.is_main = true;
        let span = def.ident.span;
        let (is_external, is_variadic, has_params) =
            (def.is_external, def.is_variadic, !def.params.is_empty());
        let return_ty = def.return_ty.clone();

        if let crate::registry::ProcLoc::Free(i) = self.program.registry.procs[proc_id.index() as usize].ast {
            self.program.modules[main_module.index() as usize].procs[i as usize].is_main = true;
        }

        let mut report = |error| {
            self.errors.push(TypeError::new(error, main_module));
        };
        if is_external {
            report(SemanticError::MainProcExternal { span: span.into() });
        }
        if is_variadic {
            report(SemanticError::MainProcVariadic { span: span.into() });
        }
        if has_params {
            report(SemanticError::MainProcHasParams { span: span.into() });
        }
        match return_ty {
            None => report(SemanticError::MainProcNoReturnType { span: span.into() }),
            Some(ty) => {
                if !resolve::match_type(&ty, &Type::basic(BasicType::I32)) {
                    report(SemanticError::MainProcWrongReturnType { span: span.into() });
                }
            }
        }
    }
}

fn mirror_proc(registry: &mut Registry, id: marten_identity::ProcId, decl: &marten_frontend::ast::ProcDecl) {
    let def = &mut registry.procs[id.index() as usize];
    def.params = decl
        .params
        .iter()
        .map(|p| ParamDef {
            ident: p.ident,
            // A missing type here means `self` outside an impl, which was
            // already diagnosed; the placeholder never reaches pass 4.
            ty: p.ty.clone().unwrap_or(Type::basic(BasicType::I32)),
            is_self: p.is_self,
        })
        .collect();
    def.return_ty = decl.return_ty.clone();
}

// ---------------------------------------------------------------------------
// Pass-2 constant environment
// ---------------------------------------------------------------------------

/// Shape of a constant initializer before folding erases it; used to carry
/// enum and global types into inference.
enum PeekRef {
    Global(Option<Symbol>, Symbol),
    Variant(Option<Symbol>, Symbol),
    Other,
}

pub(crate) struct Pass2Cx<'a> {
    pub program: &'a mut Program,
    pub interner: &'a Interner,
    pub errors: &'a mut Vec<TypeError>,
    pub module: ModuleId,
    /// Names currently being evaluated, for cycle reporting
    stack: Vec<Symbol>,
}

impl<'a> Pass2Cx<'a> {
    pub(crate) fn new(analyzer: &'a mut Analyzer, module: ModuleId) -> Self {
        let Analyzer {
            program,
            interner,
            errors,
        } = analyzer;
        Self {
            program,
            interner,
            errors,
            module,
            stack: Vec::new(),
        }
    }

    fn check_proc_signature(&mut self, decl: &mut marten_frontend::ast::ProcDecl, in_impl: bool) {
        let mut name_set = FxHashSet::default();
        for (index, param) in decl.params.iter_mut().enumerate() {
            if param.is_self {
                if !in_impl {
                    self.report(SemanticError::SelfOutsideImpl {
                        span: param.ident.span.into(),
                    });
                } else if index != 0 {
                    self.report(SemanticError::SelfNotFirst {
                        span: param.ident.span.into(),
                    });
                }
            }
            if !name_set.insert(param.ident.name) {
                let name = self.interner.resolve(param.ident.name).to_string();
                self.report(SemanticError::ProcDuplicateParam {
                    name,
                    span: param.ident.span.into(),
                });
            }
            if let Some(ty) = &mut param.ty {
                resolve::resolve_signature(self, ty);
            }
        }
        if let Some(return_ty) = &mut decl.return_ty {
            resolve::resolve_signature(self, return_ty);
        }
    }

    fn fold_proc_signature_sizes(&mut self, decl: &mut marten_frontend::ast::ProcDecl) {
        for param in &mut decl.params {
            if let Some(ty) = &mut param.ty {
                resolve::fold_array_sizes(self, ty);
            }
        }
        if let Some(return_ty) = &mut decl.return_ty {
            resolve::fold_array_sizes(self, return_ty);
        }
    }

    /// A folded value must narrow into the given (resolved) type.
    fn check_value_against(&mut self, value: &ConstValue, expected: &Type, span: Span) {
        let basic = match (&expected.kind, expected.pointer_level) {
            (TypeKind::Basic(basic), 0) => *basic,
            (TypeKind::Enum(id), 0) => self.program.registry.enum_def(*id).basic_ty,
            _ => {
                let expected = display_type(expected, self.interner, &self.program.registry);
                self.report(SemanticError::TypeMismatch {
                    expected,
                    found: consteval::kind_name(value).to_string(),
                    span: span.into(),
                });
                return;
            }
        };
        match consteval::value_fit(value, basic) {
            FitResult::Fits => {}
            FitResult::OutOfRange => self.report(SemanticError::LiteralOutOfRange {
                ty: basic.as_str().to_string(),
                span: span.into(),
            }),
            FitResult::WrongKind => self.report(SemanticError::TypeMismatch {
                expected: basic.as_str().to_string(),
                found: consteval::kind_name(value).to_string(),
                span: span.into(),
            }),
        }
    }

    fn cycle_error(&mut self, closing: Symbol, use_span: Span) {
        let mut chain = self
            .stack
            .iter()
            .map(|sym| self.interner.resolve(*sym))
            .collect::<Vec<_>>()
            .join(" -> ");
        chain.push_str(" -> ");
        chain.push_str(self.interner.resolve(closing));
        self.report(SemanticError::ConstevalDependencyCycle {
            chain,
            span: use_span.into(),
        });
    }

    /// Evaluate one global: mark it evaluating, fold its initializer in
    /// place, adopt the inferred type.
    fn eval_global(&mut self, id: GlobalId) -> Result<ConstValue, ()> {
        let (module, ast_index, ident) = {
            let def = self.program.registry.global_def(id);
            (def.module, def.ast_index as usize, def.ident)
        };

        self.program.registry.globals[id.index() as usize].state = ConstevalState::Evaluating;
        self.stack.push(ident.name);
        let saved_module = std::mem::replace(&mut self.module, module);

        let slot = &mut self.program.modules[module.index() as usize].globals[ast_index];
        let mut consteval_expr = std::mem::replace(&mut slot.value, placeholder_consteval());
        consteval_expr.state = ConstevalState::Evaluating;

        let peek = peek_const_ref(&consteval_expr.expr);
        let result = consteval::fold_expr(self, &mut consteval_expr.expr, None, true);

        self.module = saved_module;
        self.stack.pop();

        let value = match result {
            Ok(FoldOutcome::Value(value)) => Some(value),
            Ok(FoldOutcome::NotConst) => unreachable!("required fold reported"),
            Err(()) => None,
        };
        consteval_expr.state = ConstevalState::Evaluated;
        self.program.modules[module.index() as usize].globals[ast_index].value = consteval_expr;

        let ty = value.map(|v| self.infer_global_type(module, &peek, &v));
        let def = &mut self.program.registry.globals[id.index() as usize];
        def.state = ConstevalState::Evaluated;
        def.value = value;
        def.ty = ty;

        value.ok_or(())
    }

    /// The inferred type of a global: references to enum variants and other
    /// globals keep their richer type; plain values default by kind.
    fn infer_global_type(&self, module: ModuleId, peek: &PeekRef, value: &ConstValue) -> Type {
        let resolve_module = |alias: &Option<Symbol>| -> Option<ModuleId> {
            match alias {
                None => Some(module),
                Some(alias) => self.program.symbols[module.index() as usize]
                    .imports
                    .get(alias)
                    .copied(),
            }
        };

        match peek {
            PeekRef::Variant(alias, name) => {
                if let Some(m) = resolve_module(alias)
                    && let Some(&id) = self.program.symbols[m.index() as usize].enums.get(name)
                {
                    return Type {
                        pointer_level: 0,
                        kind: TypeKind::Enum(id),
                    };
                }
            }
            PeekRef::Global(alias, name) => {
                if let Some(m) = resolve_module(alias)
                    && let Some(&id) = self.program.symbols[m.index() as usize].globals.get(name)
                    && let Some(ty) = &self.program.registry.global_def(id).ty
                {
                    return ty.clone();
                }
            }
            PeekRef::Other => {}
        }
        Type::basic(consteval::default_basic(value))
    }

    /// Evaluate one enum variant against the enum's base type.
    pub(crate) fn eval_variant(&mut self, id: EnumId, variant: u32) -> Result<ConstValue, ()> {
        let (module, ast_index, basic_ty, ident) = {
            let def = self.program.registry.enum_def(id);
            let v = &def.variants[variant as usize];
            (def.module, def.ast_index as usize, def.basic_ty, v.ident)
        };

        self.program.registry.enums[id.index() as usize].variants[variant as usize].state =
            ConstevalState::Evaluating;
        self.stack.push(ident.name);
        let saved_module = std::mem::replace(&mut self.module, module);

        let slot = &mut self.program.modules[module.index() as usize].enums[ast_index].variants
            [variant as usize];
        let mut consteval_expr = std::mem::replace(&mut slot.value, placeholder_consteval());
        consteval_expr.state = ConstevalState::Evaluating;

        let expected = Type {
            pointer_level: 0,
            kind: TypeKind::Enum(id),
        };
        let result = consteval::fold_expr(self, &mut consteval_expr.expr, Some(&expected), true);
        let span = consteval_expr.expr.span;

        self.module = saved_module;
        self.stack.pop();

        let value = match result {
            Ok(FoldOutcome::Value(value)) => {
                match consteval::value_fit(&value, basic_ty) {
                    FitResult::Fits => Some(value),
                    FitResult::OutOfRange => {
                        self.module = module;
                        self.report(SemanticError::LiteralOutOfRange {
                            ty: basic_ty.as_str().to_string(),
                            span: span.into(),
                        });
                        self.module = saved_module;
                        None
                    }
                    FitResult::WrongKind => {
                        self.module = module;
                        self.report(SemanticError::TypeMismatch {
                            expected: basic_ty.as_str().to_string(),
                            found: consteval::kind_name(&value).to_string(),
                            span: span.into(),
                        });
                        self.module = saved_module;
                        None
                    }
                }
            }
            Ok(FoldOutcome::NotConst) => unreachable!("required fold reported"),
            Err(()) => None,
        };
        consteval_expr.state = ConstevalState::Evaluated;
        self.program.modules[module.index() as usize].enums[ast_index].variants[variant as usize]
            .value = consteval_expr;

        let def_variant =
            &mut self.program.registry.enums[id.index() as usize].variants[variant as usize];
        def_variant.state = ConstevalState::Evaluated;
        def_variant.value = value;

        value.ok_or(())
    }
}

impl ConstEnv for Pass2Cx<'_> {
    fn module(&self) -> ModuleId {
        self.module
    }

    fn symbols(&self) -> &[ModuleSymbols] {
        &self.program.symbols
    }

    fn registry(&self) -> &Registry {
        &self.program.registry
    }

    fn interner(&self) -> &Interner {
        self.interner
    }

    fn report(&mut self, error: SemanticError) {
        self.errors.push(TypeError::new(error, self.module));
    }

    fn global_value(&mut self, id: GlobalId, use_span: Span) -> Result<ConstValue, ()> {
        let def = self.program.registry.global_def(id);
        match def.state {
            ConstevalState::Evaluated => def.value.ok_or(()),
            ConstevalState::Evaluating => {
                let name = def.ident.name;
                self.cycle_error(name, use_span);
                Err(())
            }
            ConstevalState::NotEvaluated => self.eval_global(id),
        }
    }

    fn variant_value(&mut self, id: EnumId, variant: u32, use_span: Span) -> Result<ConstValue, ()> {
        let slot = &self.program.registry.enum_def(id).variants[variant as usize];
        match slot.state {
            ConstevalState::Evaluated => slot.value.ok_or(()),
            ConstevalState::Evaluating => {
                let name = slot.ident.name;
                self.cycle_error(name, use_span);
                Err(())
            }
            ConstevalState::NotEvaluated => self.eval_variant(id, variant),
        }
    }

    fn resolve_type(&mut self, ty: &mut Type) -> bool {
        resolve::resolve_type_full(self, ty)
    }

    fn type_size(&mut self, ty: &Type) -> Option<u64> {
        // Struct and array-of-struct sizes are unknown until pass 3
        crate::layout::type_size_align(&self.program.registry, ty).map(|(size, _)| size)
    }

    fn is_local(&self, _name: Symbol) -> bool {
        false
    }
}

fn placeholder_consteval() -> ConstevalExpr {
    ConstevalExpr {
        expr: Expr {
            kind: ExprKind::Lit(LitExpr::Bool(false)),
            span: Span::default(),
        },
        state: ConstevalState::Evaluated,
    }
}

/// Look at a constant initializer before folding replaces it: is it a plain
/// reference to a global or an enum variant?
fn peek_const_ref(expr: &Expr) -> PeekRef {
    let ExprKind::Chain(chain) = &expr.kind else {
        return PeekRef::Other;
    };
    let alias = chain
        .module_access
        .as_ref()
        .map(|access| access.modules.last().expect("non-empty access").name);
    match chain.links.as_slice() {
        [link] => match &link.kind {
            ChainLinkKind::Name(ident) => PeekRef::Global(alias, ident.name),
            _ => PeekRef::Other,
        },
        [root, _variant] => match &root.kind {
            ChainLinkKind::Name(ident) => PeekRef::Variant(alias, ident.name),
            _ => PeekRef::Other,
        },
        _ => PeekRef::Other,
    }
}
