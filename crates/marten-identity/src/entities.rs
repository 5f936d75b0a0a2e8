//! First-class identity types for language entities.
//!
//! Declarations are appended to program-level vectors in parse order; the
//! resulting index is the durable identity used for every cross-module
//! reference after name resolution.

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name(u32);

        impl $name {
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            pub fn index(self) -> u32 {
                self.0
            }
        }
    };
}

define_entity_id! {
    /// Identity for a struct declaration
    pub struct StructId;
}

define_entity_id! {
    /// Identity for an enum declaration
    pub struct EnumId;
}

define_entity_id! {
    /// Identity for a procedure declaration (free or impl member)
    pub struct ProcId;
}

define_entity_id! {
    /// Identity for a module-level global constant
    pub struct GlobalId;
}

define_entity_id! {
    /// Identity for a module (one source file under `src/`)
    pub struct ModuleId;
}
