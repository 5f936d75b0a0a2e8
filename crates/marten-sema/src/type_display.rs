// type_display.rs
//
// Human-readable type names for diagnostics.

use marten_frontend::ast::{Type, TypeKind};
use marten_identity::Interner;

use crate::registry::Registry;

pub fn display_type(ty: &Type, interner: &Interner, registry: &Registry) -> String {
    let mut out = String::new();
    for _ in 0..ty.pointer_level {
        out.push('*');
    }
    match &ty.kind {
        TypeKind::Basic(basic) => out.push_str(basic.as_str()),
        TypeKind::Struct(id) => {
            out.push_str(interner.resolve(registry.struct_def(*id).ident.name));
        }
        TypeKind::Enum(id) => {
            out.push_str(interner.resolve(registry.enum_def(*id).ident.name));
        }
        TypeKind::Array(array) => {
            match array.len {
                Some(len) => out.push_str(&format!("[{len}]")),
                None => out.push_str("[?]"),
            }
            out.push_str(&display_type(&array.elem, interner, registry));
        }
        TypeKind::Procedure(proc_ty) => {
            out.push('(');
            for (i, param) in proc_ty.params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&display_type(param, interner, registry));
            }
            out.push(')');
            if let Some(return_ty) = &proc_ty.return_ty {
                out.push_str(" -> ");
                out.push_str(&display_type(return_ty, interner, registry));
            }
        }
        TypeKind::Unresolved(unresolved) => {
            out.push_str(interner.resolve(unresolved.ident.name));
        }
    }
    out
}
