//! Marten semantic analysis: module loading, name resolution, signature
//! checking, constant evaluation, struct layout and body checking.

pub mod analyzer;
mod cfg;
mod consteval;
pub mod errors;
mod layout;
pub mod loader;
pub mod program;
pub mod registry;
mod resolve;
mod scope;
pub mod type_display;

pub use analyzer::Analyzer;
pub use cfg::Terminator;
pub use errors::SemanticError;
pub use loader::{LoadError, ModuleSource, load_tree};
pub use program::{Program, TypeError};
pub use registry::{
    EnumDef, FieldDef, GlobalDef, ImplTarget, ParamDef, ProcDef, ProcLoc, Registry, StructDef,
    VariantDef,
};
