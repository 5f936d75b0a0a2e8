// resolve.rs
//
// Type-signature resolution: named references become struct/enum ids in
// place, recursively through pointers, arrays and procedure types. Array
// sizes are folded separately once constants can be evaluated.

use marten_frontend::ast::{ConstValue, Type, TypeKind};

use crate::consteval::{self, ConstEnv, FoldOutcome};
use crate::errors::SemanticError;

/// Resolve every name in a type signature. Returns false after reporting.
pub(crate) fn resolve_signature<E: ConstEnv>(env: &mut E, ty: &mut Type) -> bool {
    match &mut ty.kind {
        TypeKind::Basic(_) | TypeKind::Struct(_) | TypeKind::Enum(_) => true,
        TypeKind::Array(array) => resolve_signature(env, &mut array.elem),
        TypeKind::Procedure(proc_ty) => {
            let mut ok = true;
            for param in &mut proc_ty.params {
                ok &= resolve_signature(env, param);
            }
            if let Some(return_ty) = &mut proc_ty.return_ty {
                ok &= resolve_signature(env, return_ty);
            }
            ok
        }
        TypeKind::Unresolved(unresolved) => {
            let module = if let Some(access) = &mut unresolved.module_access {
                let alias = *access.modules.last().expect("module access is non-empty");
                let Some(&target) = env.symbols()[env.module().index() as usize]
                    .imports
                    .get(&alias.name)
                else {
                    let name = env.interner().resolve(alias.name).to_string();
                    env.report(SemanticError::ModuleNotFound {
                        name,
                        span: alias.span.into(),
                    });
                    return false;
                };
                access.resolved = Some(target);
                target
            } else {
                env.module()
            };

            let tables = &env.symbols()[module.index() as usize];
            let name = unresolved.ident.name;
            let kind = if let Some(&id) = tables.structs.get(&name) {
                TypeKind::Struct(id)
            } else if let Some(&id) = tables.enums.get(&name) {
                TypeKind::Enum(id)
            } else {
                let name = env.interner().resolve(name).to_string();
                env.report(SemanticError::TypeNotFound {
                    name,
                    span: unresolved.ident.span.into(),
                });
                return false;
            };
            ty.kind = kind;
            true
        }
    }
}

/// Fold the size expression of every array in an already name-resolved
/// signature, caching the element count. Sizes must be constant integers
/// greater than zero.
pub(crate) fn fold_array_sizes<E: ConstEnv>(env: &mut E, ty: &mut Type) -> bool {
    match &mut ty.kind {
        TypeKind::Array(array) => {
            let span = array.size.expr.span;
            match consteval::fold_expr(env, &mut array.size.expr, None, true) {
                Err(()) => return false,
                Ok(FoldOutcome::NotConst) => unreachable!("required fold reported"),
                Ok(FoldOutcome::Value(value)) => {
                    let len = match value {
                        ConstValue::Signed(v) if v > 0 => v as u64,
                        ConstValue::Unsigned(v) if v > 0 => v,
                        ConstValue::Signed(_) | ConstValue::Unsigned(_) => {
                            env.report(SemanticError::ArrayZeroSize { span: span.into() });
                            return false;
                        }
                        other => {
                            env.report(SemanticError::TypeMismatch {
                                expected: "integer array size".to_string(),
                                found: consteval::kind_name(&other).to_string(),
                                span: span.into(),
                            });
                            return false;
                        }
                    };
                    array.size.state = marten_frontend::ast::ConstevalState::Evaluated;
                    array.len = Some(len);
                }
            }
            fold_array_sizes(env, &mut array.elem)
        }
        TypeKind::Procedure(proc_ty) => {
            let mut ok = true;
            for param in &mut proc_ty.params {
                ok &= fold_array_sizes(env, param);
            }
            if let Some(return_ty) = &mut proc_ty.return_ty {
                ok &= fold_array_sizes(env, return_ty);
            }
            ok
        }
        _ => true,
    }
}

/// Resolve names and fold array sizes in one go (pass-4 signatures).
pub(crate) fn resolve_type_full<E: ConstEnv>(env: &mut E, ty: &mut Type) -> bool {
    resolve_signature(env, ty) && fold_array_sizes(env, ty)
}

/// Structural type equality: pointer level, tag, and for arrays the element
/// type plus the folded length; struct and enum types match by id.
pub(crate) fn match_type(a: &Type, b: &Type) -> bool {
    if a.pointer_level != b.pointer_level {
        return false;
    }
    match (&a.kind, &b.kind) {
        (TypeKind::Basic(x), TypeKind::Basic(y)) => x == y,
        (TypeKind::Struct(x), TypeKind::Struct(y)) => x == y,
        (TypeKind::Enum(x), TypeKind::Enum(y)) => x == y,
        (TypeKind::Array(x), TypeKind::Array(y)) => {
            x.len.is_some() && x.len == y.len && match_type(&x.elem, &y.elem)
        }
        (TypeKind::Procedure(x), TypeKind::Procedure(y)) => {
            x.params.len() == y.params.len()
                && x.params.iter().zip(&y.params).all(|(p, q)| match_type(p, q))
                && match (&x.return_ty, &y.return_ty) {
                    (Some(p), Some(q)) => match_type(p, q),
                    (None, None) => true,
                    _ => false,
                }
        }
        // Unresolved types never match; pass 2 must have replaced them
        _ => false,
    }
}

/// The narrow implicit coercions: f32 to f64 and value-preserving integer
/// widening. Everything else needs an explicit cast.
pub(crate) fn implicit_cast_ok(from: &Type, to: &Type) -> bool {
    if from.pointer_level != 0 || to.pointer_level != 0 {
        return false;
    }
    let (TypeKind::Basic(from), TypeKind::Basic(to)) = (&from.kind, &to.kind) else {
        return false;
    };
    implicit_basic_cast_ok(*from, *to)
}

pub(crate) fn implicit_basic_cast_ok(
    from: marten_frontend::ast::BasicType,
    to: marten_frontend::ast::BasicType,
) -> bool {
    use marten_frontend::ast::BasicType::*;

    fn int_width(ty: marten_frontend::ast::BasicType) -> u32 {
        match ty {
            I8 | U8 => 8,
            I16 | U16 => 16,
            I32 | U32 => 32,
            I64 | U64 => 64,
            _ => 0,
        }
    }

    match (from, to) {
        (F32, F64) => true,
        _ if from.is_signed_integer() && to.is_signed_integer() => int_width(from) < int_width(to),
        _ if from.is_unsigned_integer() && to.is_unsigned_integer() => {
            int_width(from) < int_width(to)
        }
        // Unsigned fits in any strictly wider signed type
        _ if from.is_unsigned_integer() && to.is_signed_integer() => int_width(from) < int_width(to),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use marten_frontend::ast::BasicType::*;

    use super::implicit_basic_cast_ok;

    #[test]
    fn widening_is_value_preserving() {
        assert!(implicit_basic_cast_ok(I8, I32));
        assert!(implicit_basic_cast_ok(U8, U64));
        assert!(implicit_basic_cast_ok(U8, I16));
        assert!(implicit_basic_cast_ok(F32, F64));

        assert!(!implicit_basic_cast_ok(I32, I32));
        assert!(!implicit_basic_cast_ok(I32, I8));
        assert!(!implicit_basic_cast_ok(I8, U16));
        assert!(!implicit_basic_cast_ok(U16, U8));
        assert!(!implicit_basic_cast_ok(U64, I64));
        assert!(!implicit_basic_cast_ok(F64, F32));
        assert!(!implicit_basic_cast_ok(I32, F64));
    }
}
