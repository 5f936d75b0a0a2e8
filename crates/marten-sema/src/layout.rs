// layout.rs
//
// Pass 3: struct sizing. A depth-first search over "field stored by value"
// edges finds structs that store themselves (pointers break the edge);
// acyclic structs get their size and alignment computed, fields laid out in
// declaration order with padding up to each field's alignment.

use marten_frontend::ast::{BasicType, Type, TypeKind};
use marten_identity::{Interner, StructId, Symbol};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::errors::SemanticError;
use crate::program::{Program, TypeError};
use crate::registry::Registry;

pub(crate) fn run(program: &mut Program, interner: &Interner, errors: &mut Vec<TypeError>) {
    let struct_count = program.registry.structs.len();

    let mut cyclic: FxHashSet<StructId> = FxHashSet::default();
    for index in 0..struct_count {
        let root = StructId::new(index as u32);
        // One diagnostic per cycle: structs already named on a reported
        // field chain are not re-rooted.
        if cyclic.contains(&root) {
            continue;
        }
        let mut visited: SmallVec<[StructId; 8]> = SmallVec::new();
        let mut chain: SmallVec<[(StructId, Symbol); 8]> = SmallVec::new();
        if find_cycle(&program.registry, root, root, &mut visited, &mut chain) {
            let def = program.registry.struct_def(root);
            let name = interner.resolve(def.ident.name).to_string();
            let chain_text = render_chain(&program.registry, interner, &name, &chain);
            errors.push(TypeError::new(
                SemanticError::StructInfiniteSize {
                    name,
                    chain: chain_text,
                    span: def.ident.span.into(),
                },
                def.module,
            ));
            cyclic.insert(root);
            for (owner, _) in &chain {
                cyclic.insert(*owner);
            }
        }
    }
    let mut in_progress = FxHashSet::default();
    for index in 0..struct_count {
        let id = StructId::new(index as u32);
        if !cyclic.contains(&id) {
            ensure_layout(&mut program.registry, id, &mut in_progress);
        }
    }
}

/// Depth-first search for a value-storage path from `current` back to
/// `root`. The chain collects `(owner, field)` pairs innermost-first.
fn find_cycle(
    registry: &Registry,
    root: StructId,
    current: StructId,
    visited: &mut SmallVec<[StructId; 8]>,
    chain: &mut SmallVec<[(StructId, Symbol); 8]>,
) -> bool {
    let def = registry.struct_def(current);
    for field in &def.fields {
        let Some(stored) = struct_value_type(&field.ty) else {
            continue;
        };
        if stored == root {
            chain.push((current, field.ident.name));
            return true;
        }
        if visited.contains(&stored) {
            continue;
        }
        visited.push(stored);
        if find_cycle(registry, root, stored, visited, chain) {
            chain.push((current, field.ident.name));
            return true;
        }
    }
    false
}

/// The struct stored by value through this type, if any. Pointers break the
/// edge; arrays store their element by value.
fn struct_value_type(ty: &Type) -> Option<StructId> {
    if ty.pointer_level > 0 {
        return None;
    }
    match &ty.kind {
        TypeKind::Struct(id) => Some(*id),
        TypeKind::Array(array) => struct_value_type(&array.elem),
        _ => None,
    }
}

/// `A.x -> B.y -> A` for a chain collected innermost-first.
fn render_chain(
    registry: &Registry,
    interner: &Interner,
    root_name: &str,
    chain: &[(StructId, Symbol)],
) -> String {
    let mut out = String::new();
    for (owner, field) in chain.iter().rev() {
        let owner_name = interner.resolve(registry.struct_def(*owner).ident.name);
        out.push_str(owner_name);
        out.push('.');
        out.push_str(interner.resolve(*field));
        out.push_str(" -> ");
    }
    out.push_str(root_name);
    out
}

/// Compute (and cache) the layout of an acyclic struct. Returns `None` when
/// a field depends on a struct that failed sizing.
fn ensure_layout(
    registry: &mut Registry,
    id: StructId,
    in_progress: &mut FxHashSet<StructId>,
) -> Option<(u64, u64)> {
    {
        let def = registry.struct_def(id);
        if let (Some(size), Some(align)) = (def.size, def.align) {
            return Some((size, align));
        }
    }
    // Re-entry means a cycle that was already diagnosed against another root
    if !in_progress.insert(id) {
        return None;
    }

    let field_types: Vec<Type> = registry
        .struct_def(id)
        .fields
        .iter()
        .map(|f| f.ty.clone())
        .collect();

    let mut offset = 0u64;
    let mut max_align = 1u64;
    let mut ok = true;
    for ty in &field_types {
        let Some((size, align)) = sized_type(registry, ty, in_progress) else {
            ok = false;
            break;
        };
        offset = align_up(offset, align);
        offset += size;
        max_align = max_align.max(align);
    }
    in_progress.remove(&id);

    if !ok {
        return None;
    }
    let size = align_up(offset, max_align);
    let def = &mut registry.structs[id.index() as usize];
    def.size = Some(size);
    def.align = Some(max_align);
    Some((size, max_align))
}

fn sized_type(
    registry: &mut Registry,
    ty: &Type,
    in_progress: &mut FxHashSet<StructId>,
) -> Option<(u64, u64)> {
    if ty.pointer_level > 0 {
        return Some((8, 8));
    }
    match &ty.kind {
        TypeKind::Basic(basic) => Some(basic_size_align(*basic)),
        TypeKind::Enum(id) => Some(basic_size_align(registry.enum_def(*id).basic_ty)),
        TypeKind::Procedure(_) => Some((8, 8)),
        TypeKind::Array(array) => {
            let len = array.len?;
            let (elem_size, elem_align) = sized_type(registry, &array.elem, in_progress)?;
            Some((elem_size * len, elem_align))
        }
        TypeKind::Struct(id) => ensure_layout(registry, *id, in_progress),
        TypeKind::Unresolved(_) => None,
    }
}

/// Size and alignment of a type after pass 3 (read-only; struct layouts are
/// already cached).
pub(crate) fn type_size_align(registry: &Registry, ty: &Type) -> Option<(u64, u64)> {
    if ty.pointer_level > 0 {
        return Some((8, 8));
    }
    match &ty.kind {
        TypeKind::Basic(basic) => Some(basic_size_align(*basic)),
        TypeKind::Enum(id) => Some(basic_size_align(registry.enum_def(*id).basic_ty)),
        TypeKind::Procedure(_) => Some((8, 8)),
        TypeKind::Array(array) => {
            let len = array.len?;
            let (elem_size, elem_align) = type_size_align(registry, &array.elem)?;
            Some((elem_size * len, elem_align))
        }
        TypeKind::Struct(id) => {
            let def = registry.struct_def(*id);
            Some((def.size?, def.align?))
        }
        TypeKind::Unresolved(_) => None,
    }
}

fn basic_size_align(basic: BasicType) -> (u64, u64) {
    match basic {
        BasicType::I8 | BasicType::U8 | BasicType::Bool => (1, 1),
        BasicType::I16 | BasicType::U16 => (2, 2),
        BasicType::I32 | BasicType::U32 | BasicType::F32 => (4, 4),
        BasicType::I64 | BasicType::U64 | BasicType::F64 => (8, 8),
        // Strings are pointer-sized references into the literal store
        BasicType::String => (8, 8),
    }
}

fn align_up(offset: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (offset + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_power_of_two() {
        assert_eq!(align_up(0, 1), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(4, 4), 4);
        assert_eq!(align_up(9, 8), 16);
    }

    #[test]
    fn basic_sizes_match_the_target() {
        assert_eq!(basic_size_align(BasicType::Bool), (1, 1));
        assert_eq!(basic_size_align(BasicType::U16), (2, 2));
        assert_eq!(basic_size_align(BasicType::F32), (4, 4));
        assert_eq!(basic_size_align(BasicType::U64), (8, 8));
    }
}
