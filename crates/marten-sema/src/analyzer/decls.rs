// analyzer/decls.rs
//
// Pass 1: per-module symbol tables and program-level identities. Every
// top-level declaration is either registered or produces a diagnostic, and
// registry ids are handed out in parse order.

use marten_frontend::ast::ConstevalState;
use marten_identity::ModuleId;
use rustc_hash::FxHashMap;

use crate::errors::SemanticError;
use crate::program::{ModuleSymbols, TypeError};
use crate::registry::{EnumDef, GlobalDef, ProcDef, ProcLoc, StructDef, VariantDef};

use super::Analyzer;

impl Analyzer {
    pub(crate) fn run_pass1(&mut self) {
        if !self.program.module_map.contains_key("main") {
            self.errors
                .push(TypeError::program_level(SemanticError::MainFileNotFound));
        }

        for module_id in 0..self.program.modules.len() {
            self.collect_module(ModuleId::new(module_id as u32));
        }
    }

    fn collect_module(&mut self, module_id: ModuleId) {
        let Self {
            program,
            interner,
            errors,
        } = self;
        let m = module_id.index() as usize;
        let mut symbols = ModuleSymbols::default();

        // Destructure so the module AST, the registry and the module map can
        // be borrowed side by side.
        let crate::program::Program {
            modules,
            module_map,
            registry,
            symbols: symbol_tables,
            ..
        } = program;
        let module = &mut modules[m];

        let declare = |symbols: &mut ModuleSymbols,
                           errors: &mut Vec<TypeError>,
                           ident: marten_frontend::ast::Ident|
         -> bool {
            if let Some(&previous) = symbols.declared.get(&ident.name) {
                errors.push(TypeError::new(
                    SemanticError::SymbolAlreadyDeclared {
                        name: interner.resolve(ident.name).to_string(),
                        span: ident.span.into(),
                        previous: previous.into(),
                    },
                    module_id,
                ));
                return false;
            }
            symbols.declared.insert(ident.name, ident.span);
            true
        };

        for import in &mut module.imports {
            let path = import
                .path
                .iter()
                .map(|seg| interner.resolve(seg.name))
                .collect::<Vec<_>>()
                .join("::");
            let Some(&target) = module_map.get(&path) else {
                errors.push(TypeError::new(
                    SemanticError::ImportPathNotFound {
                        path,
                        span: import.span.into(),
                    },
                    module_id,
                ));
                continue;
            };
            import.resolved = Some(target);

            if declare(&mut symbols, errors, import.alias) {
                symbols.imports.insert(import.alias.name, target);
            }
        }

        for use_decl in &module.uses {
            // The alias is reserved now; the symbol itself is copied from the
            // imported module in pass 2.
            declare(&mut symbols, errors, use_decl.alias);
        }

        for (i, decl) in module.structs.iter().enumerate() {
            if !declare(&mut symbols, errors, decl.ident) {
                continue;
            }
            let id = registry.add_struct(StructDef {
                module: module_id,
                ast_index: i as u32,
                ident: decl.ident,
                fields: Vec::new(),
                methods: FxHashMap::default(),
                size: None,
                align: None,
            });
            symbols.structs.insert(decl.ident.name, id);
        }

        for (i, decl) in module.enums.iter().enumerate() {
            if !declare(&mut symbols, errors, decl.ident) {
                continue;
            }
            let id = registry.add_enum(EnumDef {
                module: module_id,
                ast_index: i as u32,
                ident: decl.ident,
                basic_ty: decl.basic_ty,
                variants: decl
                    .variants
                    .iter()
                    .map(|v| VariantDef {
                        ident: v.ident,
                        state: ConstevalState::NotEvaluated,
                        value: None,
                    })
                    .collect(),
                methods: FxHashMap::default(),
            });
            symbols.enums.insert(decl.ident.name, id);
        }

        for (i, decl) in module.procs.iter().enumerate() {
            let registered = declare(&mut symbols, errors, decl.ident);
            let id = registry.add_proc(ProcDef {
                module: module_id,
                ast: ProcLoc::Free(i as u32),
                ident: decl.ident,
                params: Vec::new(),
                return_ty: None,
                is_external: decl.is_external,
                is_variadic: decl.is_variadic,
                is_main: false,
                impl_target: None,
            });
            symbols.proc_ids.push(id);
            if registered {
                symbols.procs.insert(decl.ident.name, id);
            }
        }

        for (i, decl) in module.globals.iter().enumerate() {
            let registered = declare(&mut symbols, errors, decl.ident);
            let id = registry.add_global(GlobalDef {
                module: module_id,
                ast_index: i as u32,
                ident: decl.ident,
                state: ConstevalState::NotEvaluated,
                ty: None,
                value: None,
            });
            if registered {
                symbols.globals.insert(decl.ident.name, id);
            }
        }

        // Impl members are not module symbols; they get registry ids here and
        // are attached to their target type in pass 2.
        for (i, impl_decl) in module.impls.iter().enumerate() {
            let mut member_ids = Vec::with_capacity(impl_decl.procs.len());
            for (j, decl) in impl_decl.procs.iter().enumerate() {
                let id = registry.add_proc(ProcDef {
                    module: module_id,
                    ast: ProcLoc::Member(i as u32, j as u32),
                    ident: decl.ident,
                    params: Vec::new(),
                    return_ty: None,
                    is_external: decl.is_external,
                    is_variadic: decl.is_variadic,
                    is_main: false,
                    impl_target: None,
                });
                member_ids.push(id);
            }
            symbols.impl_proc_ids.push(member_ids);
        }

        symbol_tables[m] = symbols;
    }
}
