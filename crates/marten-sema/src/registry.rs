// registry.rs
//
// Program-level definition vectors. Pass 1 appends one def per declaration
// in parse order; the index is the declaration's durable identity. Pass 2
// fills signatures, pass 3 fills struct layout, and pass 4 reads these defs
// while it mutates procedure bodies.

use marten_frontend::ast::{BasicType, ConstValue, ConstevalState, Ident, Type};
use marten_identity::{EnumId, GlobalId, ModuleId, ProcId, StructId, Symbol};
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct Registry {
    pub structs: Vec<StructDef>,
    pub enums: Vec<EnumDef>,
    pub procs: Vec<ProcDef>,
    pub globals: Vec<GlobalDef>,
}

impl Registry {
    pub fn struct_def(&self, id: StructId) -> &StructDef {
        &self.structs[id.index() as usize]
    }

    pub fn enum_def(&self, id: EnumId) -> &EnumDef {
        &self.enums[id.index() as usize]
    }

    pub fn proc_def(&self, id: ProcId) -> &ProcDef {
        &self.procs[id.index() as usize]
    }

    pub fn global_def(&self, id: GlobalId) -> &GlobalDef {
        &self.globals[id.index() as usize]
    }

    pub fn add_struct(&mut self, def: StructDef) -> StructId {
        let id = StructId::new(self.structs.len() as u32);
        self.structs.push(def);
        id
    }

    pub fn add_enum(&mut self, def: EnumDef) -> EnumId {
        let id = EnumId::new(self.enums.len() as u32);
        self.enums.push(def);
        id
    }

    pub fn add_proc(&mut self, def: ProcDef) -> ProcId {
        let id = ProcId::new(self.procs.len() as u32);
        self.procs.push(def);
        id
    }

    pub fn add_global(&mut self, def: GlobalDef) -> GlobalId {
        let id = GlobalId::new(self.globals.len() as u32);
        self.globals.push(def);
        id
    }
}

#[derive(Debug)]
pub struct StructDef {
    pub module: ModuleId,
    /// Position in the owning module's struct list
    pub ast_index: u32,
    pub ident: Ident,
    /// Resolved field signatures, mirrored from the AST after pass 2
    pub fields: Vec<FieldDef>,
    /// Member procedures attached by impl blocks
    pub methods: FxHashMap<Symbol, ProcId>,
    /// Set by pass 3 for acyclic structs
    pub size: Option<u64>,
    pub align: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub ident: Ident,
    pub ty: Type,
}

#[derive(Debug)]
pub struct EnumDef {
    pub module: ModuleId,
    /// Position in the owning module's enum list
    pub ast_index: u32,
    pub ident: Ident,
    pub basic_ty: BasicType,
    pub variants: Vec<VariantDef>,
    pub methods: FxHashMap<Symbol, ProcId>,
}

impl EnumDef {
    pub fn variant_index(&self, name: Symbol) -> Option<u32> {
        self.variants
            .iter()
            .position(|v| v.ident.name == name)
            .map(|i| i as u32)
    }
}

#[derive(Debug)]
pub struct VariantDef {
    pub ident: Ident,
    pub state: ConstevalState,
    /// Folded variant value, present once `state` is `Evaluated`
    pub value: Option<ConstValue>,
}

#[derive(Debug)]
pub struct ProcDef {
    pub module: ModuleId,
    /// Where the declaration lives in the owning module's AST
    pub ast: ProcLoc,
    pub ident: Ident,
    /// Resolved parameter signatures; a `self` receiver is params[0]
    pub params: Vec<ParamDef>,
    pub return_ty: Option<Type>,
    pub is_external: bool,
    pub is_variadic: bool,
    pub is_main: bool,
    /// Present for impl member procedures
    pub impl_target: Option<ImplTarget>,
}

#[derive(Debug, Clone)]
pub struct ParamDef {
    pub ident: Ident,
    pub ty: Type,
    pub is_self: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplTarget {
    Struct(StructId),
    Enum(EnumId),
}

/// Location of a procedure declaration inside its module's AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcLoc {
    /// `Module::procs[i]`
    Free(u32),
    /// `Module::impls[i].procs[j]`
    Member(u32, u32),
}

#[derive(Debug)]
pub struct GlobalDef {
    pub module: ModuleId,
    /// Position in the owning module's global list
    pub ast_index: u32,
    pub ident: Ident,
    pub state: ConstevalState,
    /// Type adopted from the initializer (pass 2, inferring mode)
    pub ty: Option<Type>,
    pub value: Option<ConstValue>,
}
