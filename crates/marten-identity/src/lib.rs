//! Marten identity: source spans, string interning and entity ids.
//!
//! Everything in this crate is shared by the frontend and the semantic
//! checker. Identities are plain `u32` newtypes so that cross-module
//! references stay valid for the whole compilation.

mod entities;
mod intern;
mod span;

pub use entities::{EnumId, GlobalId, ModuleId, ProcId, StructId};
pub use intern::{Interner, Symbol};
pub use span::Span;
