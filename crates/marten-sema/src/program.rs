// program.rs
//
// The whole compilation: module ASTs, their sources, per-module symbol
// tables and the program-level registry.

use marten_frontend::ast::Module;
use marten_identity::{EnumId, GlobalId, ModuleId, ProcId, Span, StructId, Symbol};
use rustc_hash::FxHashMap;

use crate::errors::SemanticError;
use crate::loader::ModuleSource;
use crate::registry::Registry;

/// Per-module symbol tables, populated exactly once during pass 1 and only
/// read thereafter. `use` declarations extend the kind maps in pass 2.
#[derive(Debug, Default)]
pub struct ModuleSymbols {
    /// Every top-level name with its declaration span (for duplicate reports)
    pub declared: FxHashMap<Symbol, Span>,
    pub imports: FxHashMap<Symbol, ModuleId>,
    pub structs: FxHashMap<Symbol, StructId>,
    pub enums: FxHashMap<Symbol, EnumId>,
    pub procs: FxHashMap<Symbol, ProcId>,
    pub globals: FxHashMap<Symbol, GlobalId>,
    /// Registry ids aligned with `Module::procs`
    pub proc_ids: Vec<ProcId>,
    /// Registry ids aligned with `Module::impls` and their member procedures
    pub impl_proc_ids: Vec<Vec<ProcId>>,
}

#[derive(Debug)]
pub struct Program {
    pub modules: Vec<Module>,
    pub sources: Vec<ModuleSource>,
    pub symbols: Vec<ModuleSymbols>,
    pub module_map: FxHashMap<String, ModuleId>,
    pub registry: Registry,
}

impl Program {
    pub fn new(modules: Vec<Module>, sources: Vec<ModuleSource>) -> Self {
        debug_assert_eq!(modules.len(), sources.len());
        let symbols = modules.iter().map(|_| ModuleSymbols::default()).collect();
        let module_map = sources
            .iter()
            .enumerate()
            .map(|(i, src)| (src.path.clone(), ModuleId::new(i as u32)))
            .collect();
        Self {
            modules,
            sources,
            symbols,
            module_map,
            registry: Registry::default(),
        }
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index() as usize]
    }

    pub fn module_symbols(&self, id: ModuleId) -> &ModuleSymbols {
        &self.symbols[id.index() as usize]
    }

    pub fn source(&self, id: ModuleId) -> &ModuleSource {
        &self.sources[id.index() as usize]
    }

    pub fn module_ids(&self) -> impl Iterator<Item = ModuleId> + use<> {
        (0..self.modules.len() as u32).map(ModuleId::new)
    }
}

/// A semantic error bound to the module whose source it points into.
/// Program-level errors (e.g. a missing main module) carry no module.
#[derive(Debug, Clone)]
pub struct TypeError {
    pub error: SemanticError,
    pub module: Option<ModuleId>,
}

impl TypeError {
    pub fn new(error: SemanticError, module: ModuleId) -> Self {
        Self {
            error,
            module: Some(module),
        }
    }

    pub fn program_level(error: SemanticError) -> Self {
        Self {
            error,
            module: None,
        }
    }
}
