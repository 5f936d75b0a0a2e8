// consteval.rs
//
// Compile-time expression evaluation. Literals are held at maximum width
// (i64 / u64 / f64); arithmetic happens at that width and narrowing to a
// basic type occurs at the use site. The fold walker rewrites expressions
// to `ExprKind::Folded` in place.
//
// The same walker serves two stages through `ConstEnv`: pass 2 evaluates
// globals and enum variants recursively (the tri-state visit state detects
// dependency cycles), pass 4 reads the settled values while folding inside
// procedure bodies.

use marten_frontend::ast::{
    BasicType, BinaryOp, ChainExpr, ChainLinkKind, ConstValue, Expr, ExprKind, LitExpr, Type,
    TypeKind, UnaryOp,
};
use marten_identity::{EnumId, GlobalId, Interner, ModuleId, Span, Symbol};

use crate::errors::SemanticError;
use crate::program::{ModuleSymbols, TypeError};
use crate::registry::Registry;

// ---------------------------------------------------------------------------
// Value arithmetic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FoldError {
    Overflow,
    DivisionByZero,
    ShiftOverflow,
    /// Operator applied to a kind it does not support
    Invalid(&'static str),
    /// Signed and unsigned integers mixed in one operator
    MixedSigns,
}

pub(crate) fn kind_name(value: &ConstValue) -> &'static str {
    match value {
        ConstValue::Bool(_) => "bool",
        ConstValue::Signed(_) => "signed integer",
        ConstValue::Unsigned(_) => "unsigned integer",
        ConstValue::Float(_) => "float",
        ConstValue::Str(_) => "string",
    }
}

pub(crate) fn lit_value(lit: LitExpr) -> ConstValue {
    match lit {
        // Plain integer literals are signed while they fit; only literals
        // beyond i64::MAX become unsigned.
        LitExpr::Int(v) if v <= i64::MAX as u64 => ConstValue::Signed(v as i64),
        LitExpr::Int(v) => ConstValue::Unsigned(v),
        LitExpr::Float(v) => ConstValue::Float(v),
        LitExpr::Bool(v) => ConstValue::Bool(v),
        LitExpr::Str(v) => ConstValue::Str(v),
    }
}

pub(crate) fn fold_unary(op: UnaryOp, value: ConstValue) -> Result<ConstValue, FoldError> {
    use ConstValue::*;
    match (op, value) {
        (UnaryOp::Neg, Signed(v)) => v.checked_neg().map(Signed).ok_or(FoldError::Overflow),
        (UnaryOp::Neg, Unsigned(v)) => {
            // Promote to signed when the negated value is representable
            if v <= i64::MAX as u64 {
                Ok(Signed(-(v as i64)))
            } else if v == i64::MAX as u64 + 1 {
                Ok(Signed(i64::MIN))
            } else {
                Err(FoldError::Overflow)
            }
        }
        (UnaryOp::Neg, Float(v)) => Ok(Float(-v)),
        (UnaryOp::Neg, other) => Err(FoldError::Invalid(kind_name(&other))),

        (UnaryOp::LogicNot, Bool(v)) => Ok(Bool(!v)),
        (UnaryOp::LogicNot, other) => Err(FoldError::Invalid(kind_name(&other))),

        (UnaryOp::BitNot, Signed(v)) => Ok(Signed(!v)),
        (UnaryOp::BitNot, Unsigned(v)) => Ok(Unsigned(!v)),
        (UnaryOp::BitNot, other) => Err(FoldError::Invalid(kind_name(&other))),

        // Address-of and dereference never fold; the walker filters them out
        (UnaryOp::AddressOf | UnaryOp::Deref, other) => Err(FoldError::Invalid(kind_name(&other))),
    }
}

pub(crate) fn fold_binary(
    op: BinaryOp,
    lhs: ConstValue,
    rhs: ConstValue,
) -> Result<ConstValue, FoldError> {
    use ConstValue::*;

    if op.is_comparison() {
        return fold_comparison(op, lhs, rhs);
    }

    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            match (lhs, rhs) {
                (Signed(a), Signed(b)) => fold_signed_arith(op, a, b).map(Signed),
                (Unsigned(a), Unsigned(b)) => fold_unsigned_arith(op, a, b).map(Unsigned),
                (Float(a), Float(b)) => fold_float_arith(op, a, b).map(Float),
                (Signed(_) | Unsigned(_), Unsigned(_) | Signed(_)) => Err(FoldError::MixedSigns),
                (a, _) => Err(FoldError::Invalid(kind_name(&a))),
            }
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            let (a, b, both_signed) = int_bits(lhs, rhs)?;
            let bits = match op {
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                _ => a ^ b,
            };
            Ok(if both_signed { Signed(bits as i64) } else { Unsigned(bits) })
        }
        BinaryOp::Shl | BinaryOp::Shr => {
            let count = match rhs {
                Signed(v) if v >= 0 => v as u64,
                Unsigned(v) => v,
                Signed(_) => return Err(FoldError::ShiftOverflow),
                other => return Err(FoldError::Invalid(kind_name(&other))),
            };
            if count >= 64 {
                return Err(FoldError::ShiftOverflow);
            }
            match (lhs, op) {
                (Signed(v), BinaryOp::Shl) => Ok(Signed(((v as u64) << count) as i64)),
                (Signed(v), _) => Ok(Signed(v >> count)), // arithmetic shift
                (Unsigned(v), BinaryOp::Shl) => Ok(Unsigned(v << count)),
                (Unsigned(v), _) => Ok(Unsigned(v >> count)),
                (other, _) => Err(FoldError::Invalid(kind_name(&other))),
            }
        }
        // Short-circuit operators are handled by the walker
        BinaryOp::LogicAnd | BinaryOp::LogicOr => unreachable!("handled by fold_expr"),
        _ => unreachable!("comparisons handled above"),
    }
}

fn fold_comparison(op: BinaryOp, lhs: ConstValue, rhs: ConstValue) -> Result<ConstValue, FoldError> {
    use ConstValue::*;
    use std::cmp::Ordering;

    let ordering = match (lhs, rhs) {
        (Signed(a), Signed(b)) => a.cmp(&b),
        (Unsigned(a), Unsigned(b)) => a.cmp(&b),
        (Float(a), Float(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Greater),
        (Bool(a), Bool(b)) if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) => a.cmp(&b),
        (Signed(_) | Unsigned(_), Unsigned(_) | Signed(_)) => return Err(FoldError::MixedSigns),
        (a, _) => return Err(FoldError::Invalid(kind_name(&a))),
    };

    let result = match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::NotEq => ordering != Ordering::Equal,
        BinaryOp::Less => ordering == Ordering::Less,
        BinaryOp::LessEq => ordering != Ordering::Greater,
        BinaryOp::Greater => ordering == Ordering::Greater,
        BinaryOp::GreaterEq => ordering != Ordering::Less,
        _ => unreachable!(),
    };
    Ok(Bool(result))
}

fn fold_signed_arith(op: BinaryOp, a: i64, b: i64) -> Result<i64, FoldError> {
    match op {
        BinaryOp::Add => a.checked_add(b).ok_or(FoldError::Overflow),
        BinaryOp::Sub => a.checked_sub(b).ok_or(FoldError::Overflow),
        BinaryOp::Mul => a.checked_mul(b).ok_or(FoldError::Overflow),
        BinaryOp::Div if b == 0 => Err(FoldError::DivisionByZero),
        BinaryOp::Div => a.checked_div(b).ok_or(FoldError::Overflow),
        BinaryOp::Rem if b == 0 => Err(FoldError::DivisionByZero),
        BinaryOp::Rem => a.checked_rem(b).ok_or(FoldError::Overflow),
        _ => unreachable!(),
    }
}

fn fold_unsigned_arith(op: BinaryOp, a: u64, b: u64) -> Result<u64, FoldError> {
    match op {
        BinaryOp::Add => a.checked_add(b).ok_or(FoldError::Overflow),
        BinaryOp::Sub => a.checked_sub(b).ok_or(FoldError::Overflow),
        BinaryOp::Mul => a.checked_mul(b).ok_or(FoldError::Overflow),
        BinaryOp::Div if b == 0 => Err(FoldError::DivisionByZero),
        BinaryOp::Div => Ok(a / b),
        BinaryOp::Rem if b == 0 => Err(FoldError::DivisionByZero),
        BinaryOp::Rem => Ok(a % b),
        _ => unreachable!(),
    }
}

fn fold_float_arith(op: BinaryOp, a: f64, b: f64) -> Result<f64, FoldError> {
    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Sub => Ok(a - b),
        BinaryOp::Mul => Ok(a * b),
        BinaryOp::Div => Ok(a / b),
        BinaryOp::Rem => Err(FoldError::Invalid("float")),
        _ => unreachable!(),
    }
}

fn int_bits(lhs: ConstValue, rhs: ConstValue) -> Result<(u64, u64, bool), FoldError> {
    use ConstValue::*;
    match (lhs, rhs) {
        (Signed(a), Signed(b)) => Ok((a as u64, b as u64, true)),
        (Unsigned(a), Unsigned(b)) => Ok((a, b, false)),
        (Signed(a), Unsigned(b)) => Ok((a as u64, b, false)),
        (Unsigned(a), Signed(b)) => Ok((a, b as u64, false)),
        (a, _) => Err(FoldError::Invalid(kind_name(&a))),
    }
}

/// Explicit cast applied to a folded value. Integer casts truncate to the
/// target width like the generated code would; float-to-integer casts must
/// be in range.
pub(crate) fn const_cast(value: ConstValue, ty: BasicType) -> Result<ConstValue, FoldError> {
    use ConstValue::*;

    let bits = match value {
        Signed(v) => v as u64,
        Unsigned(v) => v,
        Float(f) => {
            return match ty {
                BasicType::F32 => Ok(Float(f as f32 as f64)),
                BasicType::F64 => Ok(Float(f)),
                _ if ty.is_integer() => {
                    let t = f.trunc();
                    if ty.is_signed_integer() {
                        if t >= i64::MIN as f64 && t <= i64::MAX as f64 {
                            const_cast(Signed(t as i64), ty)
                        } else {
                            Err(FoldError::Overflow)
                        }
                    } else if t >= 0.0 && t <= u64::MAX as f64 {
                        const_cast(Unsigned(t as u64), ty)
                    } else {
                        Err(FoldError::Overflow)
                    }
                }
                _ => Err(FoldError::Invalid("float")),
            };
        }
        other => return Err(FoldError::Invalid(kind_name(&other))),
    };

    Ok(match ty {
        BasicType::I8 => Signed(bits as u8 as i8 as i64),
        BasicType::I16 => Signed(bits as u16 as i16 as i64),
        BasicType::I32 => Signed(bits as u32 as i32 as i64),
        BasicType::I64 => Signed(bits as i64),
        BasicType::U8 => Unsigned(bits as u8 as u64),
        BasicType::U16 => Unsigned(bits as u16 as u64),
        BasicType::U32 => Unsigned(bits as u32 as u64),
        BasicType::U64 => Unsigned(bits),
        BasicType::F32 => Float(signed_or_unsigned_to_f64(value) as f32 as f64),
        BasicType::F64 => Float(signed_or_unsigned_to_f64(value)),
        BasicType::Bool | BasicType::String => return Err(FoldError::Invalid("integer")),
    })
}

fn signed_or_unsigned_to_f64(value: ConstValue) -> f64 {
    match value {
        ConstValue::Signed(v) => v as f64,
        ConstValue::Unsigned(v) => v as f64,
        ConstValue::Float(v) => v,
        _ => unreachable!(),
    }
}

// ---------------------------------------------------------------------------
// Use-site narrowing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FitResult {
    Fits,
    OutOfRange,
    WrongKind,
}

/// Does the folded value narrow to the basic type at a use site?
pub(crate) fn value_fit(value: &ConstValue, ty: BasicType) -> FitResult {
    use ConstValue::*;

    let in_range = |min: i128, max: i128, v: i128| {
        if v >= min && v <= max {
            FitResult::Fits
        } else {
            FitResult::OutOfRange
        }
    };

    match (value, ty) {
        (Bool(_), BasicType::Bool) => FitResult::Fits,
        (Str(_), BasicType::String) => FitResult::Fits,
        (Float(_), BasicType::F32 | BasicType::F64) => FitResult::Fits,
        (Signed(v), _) if ty.is_integer() => {
            let (min, max) = integer_range(ty);
            in_range(min, max, *v as i128)
        }
        (Unsigned(v), _) if ty.is_integer() => {
            let (min, max) = integer_range(ty);
            in_range(min, max, *v as i128)
        }
        _ => FitResult::WrongKind,
    }
}

pub(crate) fn integer_range(ty: BasicType) -> (i128, i128) {
    match ty {
        BasicType::I8 => (i8::MIN as i128, i8::MAX as i128),
        BasicType::I16 => (i16::MIN as i128, i16::MAX as i128),
        BasicType::I32 => (i32::MIN as i128, i32::MAX as i128),
        BasicType::I64 => (i64::MIN as i128, i64::MAX as i128),
        BasicType::U8 => (0, u8::MAX as i128),
        BasicType::U16 => (0, u16::MAX as i128),
        BasicType::U32 => (0, u32::MAX as i128),
        BasicType::U64 => (0, u64::MAX as i128),
        _ => unreachable!("integer_range on non-integer type"),
    }
}

/// Basic type adopted when a folded value meets no expected type ("inferring"
/// mode): integers default to i32 when they fit.
pub(crate) fn default_basic(value: &ConstValue) -> BasicType {
    match value {
        ConstValue::Bool(_) => BasicType::Bool,
        ConstValue::Signed(v) => {
            if *v >= i32::MIN as i64 && *v <= i32::MAX as i64 {
                BasicType::I32
            } else {
                BasicType::I64
            }
        }
        ConstValue::Unsigned(_) => BasicType::U64,
        ConstValue::Float(_) => BasicType::F64,
        ConstValue::Str(_) => BasicType::String,
    }
}

// ---------------------------------------------------------------------------
// Fold walker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FoldOutcome {
    Value(ConstValue),
    NotConst,
}

/// What the walker needs from its surrounding pass. Pass 2 evaluates
/// referenced globals and variants on demand (detecting cycles); pass 4
/// reads values settled in pass 2 and knows about local variables and
/// struct sizes.
pub(crate) trait ConstEnv {
    fn module(&self) -> ModuleId;
    fn symbols(&self) -> &[ModuleSymbols];
    fn registry(&self) -> &Registry;
    fn interner(&self) -> &Interner;
    fn report(&mut self, error: SemanticError);

    /// The folded value of a global. `Err` means an error was reported.
    fn global_value(&mut self, id: GlobalId, use_span: Span) -> Result<ConstValue, ()>;

    /// The folded value of an enum variant.
    fn variant_value(&mut self, id: EnumId, variant: u32, use_span: Span) -> Result<ConstValue, ()>;

    /// Resolve a type signature in place (for `sizeof`). `false` means an
    /// error was reported.
    fn resolve_type(&mut self, ty: &mut Type) -> bool;

    /// Size of a resolved type, if known at this stage.
    fn type_size(&mut self, ty: &Type) -> Option<u64>;

    /// Is the name a local variable here? (Pass 2 has no locals.)
    fn is_local(&self, name: Symbol) -> bool;
}

/// Fold an expression in place. `required` marks constant contexts: there a
/// non-constant node is an error; elsewhere it just stops the fold and the
/// typed checker takes over. Returns `Err(())` after reporting.
pub(crate) fn fold_expr<E: ConstEnv>(
    env: &mut E,
    expr: &mut Expr,
    expected: Option<&Type>,
    required: bool,
) -> Result<FoldOutcome, ()> {
    let outcome = fold_expr_inner(env, expr, expected, required)?;
    if let FoldOutcome::Value(value) = outcome {
        expr.kind = ExprKind::Folded(value);
    }
    Ok(outcome)
}

fn fold_expr_inner<E: ConstEnv>(
    env: &mut E,
    expr: &mut Expr,
    expected: Option<&Type>,
    required: bool,
) -> Result<FoldOutcome, ()> {
    match &mut expr.kind {
        ExprKind::Folded(value) => Ok(FoldOutcome::Value(*value)),
        ExprKind::Lit(lit) => Ok(FoldOutcome::Value(lit_value(*lit))),

        ExprKind::Unary(unary) => {
            if matches!(unary.op, UnaryOp::AddressOf | UnaryOp::Deref) {
                return not_const(env, expr.span, required);
            }
            let op = unary.op;
            let op_span = unary.op_span;
            let rhs = match fold_expr(env, &mut unary.rhs, expected, required)? {
                FoldOutcome::Value(v) => v,
                FoldOutcome::NotConst => return Ok(FoldOutcome::NotConst),
            };
            match fold_unary(op, rhs) {
                Ok(value) => Ok(FoldOutcome::Value(value)),
                Err(err) => {
                    env.report(fold_error_to_semantic(err, op.as_str(), op_span));
                    Err(())
                }
            }
        }

        ExprKind::Binary(binary) => {
            let op = binary.op;
            let op_span = binary.op_span;

            if matches!(op, BinaryOp::LogicAnd | BinaryOp::LogicOr) {
                let lhs = match fold_expr(env, &mut binary.lhs, None, required)? {
                    FoldOutcome::Value(v) => v,
                    FoldOutcome::NotConst => {
                        // Still give the right-hand side its fold chance
                        fold_expr(env, &mut binary.rhs, None, required)?;
                        return Ok(FoldOutcome::NotConst);
                    }
                };
                let ConstValue::Bool(lhs_bool) = lhs else {
                    env.report(SemanticError::InvalidOperand {
                        op: op.as_str().to_string(),
                        found: kind_name(&lhs).to_string(),
                        span: op_span.into(),
                    });
                    return Err(());
                };
                // Short-circuit: the other side is not evaluated
                match (op, lhs_bool) {
                    (BinaryOp::LogicAnd, false) => return Ok(FoldOutcome::Value(ConstValue::Bool(false))),
                    (BinaryOp::LogicOr, true) => return Ok(FoldOutcome::Value(ConstValue::Bool(true))),
                    _ => {}
                }
                let rhs = match fold_expr(env, &mut binary.rhs, None, required)? {
                    FoldOutcome::Value(v) => v,
                    FoldOutcome::NotConst => return Ok(FoldOutcome::NotConst),
                };
                let ConstValue::Bool(rhs_bool) = rhs else {
                    env.report(SemanticError::InvalidOperand {
                        op: op.as_str().to_string(),
                        found: kind_name(&rhs).to_string(),
                        span: op_span.into(),
                    });
                    return Err(());
                };
                return Ok(FoldOutcome::Value(ConstValue::Bool(rhs_bool)));
            }

            let lhs = fold_expr(env, &mut binary.lhs, expected, required)?;
            let rhs = fold_expr(env, &mut binary.rhs, expected, required)?;
            let (FoldOutcome::Value(lhs), FoldOutcome::Value(rhs)) = (lhs, rhs) else {
                return Ok(FoldOutcome::NotConst);
            };
            match fold_binary(op, lhs, rhs) {
                Ok(value) => Ok(FoldOutcome::Value(value)),
                Err(err) => {
                    env.report(fold_error_to_semantic(err, op.as_str(), op_span));
                    Err(())
                }
            }
        }

        ExprKind::Cast(cast) => {
            let ty = cast.ty;
            if matches!(ty, BasicType::Bool | BasicType::String) {
                env.report(SemanticError::CastInvalidTarget {
                    into: ty.as_str().to_string(),
                    span: expr.span.into(),
                });
                return Err(());
            }
            let value = match fold_expr(env, &mut cast.expr, None, required)? {
                FoldOutcome::Value(v) => v,
                FoldOutcome::NotConst => return Ok(FoldOutcome::NotConst),
            };
            if matches!(value, ConstValue::Bool(_) | ConstValue::Str(_)) {
                env.report(SemanticError::CastInvalidSource {
                    from: kind_name(&value).to_string(),
                    span: expr.span.into(),
                });
                return Err(());
            }
            match const_cast(value, ty) {
                Ok(value) => Ok(FoldOutcome::Value(value)),
                Err(err) => {
                    env.report(fold_error_to_semantic(err, "cast", expr.span));
                    Err(())
                }
            }
        }

        ExprKind::Sizeof(sizeof) => {
            if !env.resolve_type(&mut sizeof.ty) {
                return Err(());
            }
            match env.type_size(&sizeof.ty) {
                Some(size) => Ok(FoldOutcome::Value(ConstValue::Unsigned(size))),
                None => not_const(env, expr.span, required),
            }
        }

        ExprKind::EnumLit(enum_lit) => {
            let Some(expected) = expected else {
                if required {
                    env.report(SemanticError::EnumLitNoContext {
                        span: expr.span.into(),
                    });
                    return Err(());
                }
                return Ok(FoldOutcome::NotConst);
            };
            let TypeKind::Enum(enum_id) = expected.kind else {
                if required {
                    env.report(SemanticError::EnumLitNoContext {
                        span: expr.span.into(),
                    });
                    return Err(());
                }
                return Ok(FoldOutcome::NotConst);
            };
            if expected.pointer_level > 0 {
                return not_const(env, expr.span, required);
            }

            let def = env.registry().enum_def(enum_id);
            let Some(index) = def.variant_index(enum_lit.variant.name) else {
                env.report(SemanticError::EnumVariantNotFound {
                    name: env.interner().resolve(enum_lit.variant.name).to_string(),
                    span: enum_lit.variant.span.into(),
                });
                return Err(());
            };
            enum_lit.resolved = Some((enum_id, index));
            let span = expr.span;
            env.variant_value(enum_id, index, span)
                .map(FoldOutcome::Value)
        }

        ExprKind::Chain(_) => fold_chain(env, expr, required),

        ExprKind::StructInit(_) | ExprKind::ArrayInit(_) => not_const(env, expr.span, required),
    }
}

/// Constant access chains: a global reference (`G`, `mod::G`) or an enum
/// variant reference (`Color.Red`, `mod::Color.Red`). Anything else is not
/// constant.
fn fold_chain<E: ConstEnv>(env: &mut E, expr: &mut Expr, required: bool) -> Result<FoldOutcome, ()> {
    let span = expr.span;
    let ExprKind::Chain(chain) = &mut expr.kind else {
        unreachable!()
    };

    let qualified = chain.module_access.is_some();
    let module = match resolve_chain_module(env, chain, required)? {
        Some(module) => module,
        None => return Ok(FoldOutcome::NotConst),
    };

    match chain.links.as_slice() {
        [link] => {
            let ChainLinkKind::Name(ident) = &link.kind else {
                return chain_proc_call(env, span, required);
            };
            let name = ident.name;
            if !qualified && env.is_local(name) {
                if required {
                    env.report(SemanticError::ConstVarNotGlobal { span: span.into() });
                    return Err(());
                }
                return Ok(FoldOutcome::NotConst);
            }
            let Some(&global_id) = env.symbols()[module.index() as usize].globals.get(&name) else {
                // Unknown name: the typed checker owns the diagnostic unless
                // this is a constant-only context.
                if required {
                    env.report(SemanticError::NameNotFound {
                        name: env.interner().resolve(name).to_string(),
                        span: ident.span.into(),
                    });
                    return Err(());
                }
                return Ok(FoldOutcome::NotConst);
            };
            env.global_value(global_id, span).map(FoldOutcome::Value)
        }
        [root, variant_link] => {
            let (ChainLinkKind::Name(root_ident), ChainLinkKind::Name(variant)) =
                (&root.kind, &variant_link.kind)
            else {
                return chain_proc_call(env, span, required);
            };
            let Some(&enum_id) = env.symbols()[module.index() as usize]
                .enums
                .get(&root_ident.name)
            else {
                return not_const(env, span, required);
            };
            let Some(index) = env.registry().enum_def(enum_id).variant_index(variant.name) else {
                env.report(SemanticError::EnumVariantNotFound {
                    name: env.interner().resolve(variant.name).to_string(),
                    span: variant_link.span.into(),
                });
                return Err(());
            };
            env.variant_value(enum_id, index, span).map(FoldOutcome::Value)
        }
        _ => {
            if chain
                .links
                .iter()
                .any(|l| matches!(l.kind, ChainLinkKind::Call(_, _)))
            {
                return chain_proc_call(env, span, required);
            }
            not_const(env, span, required)
        }
    }
}

fn chain_proc_call<E: ConstEnv>(env: &mut E, span: Span, required: bool) -> Result<FoldOutcome, ()> {
    if required {
        env.report(SemanticError::ConstProcCall { span: span.into() });
        return Err(());
    }
    Ok(FoldOutcome::NotConst)
}

fn not_const<E: ConstEnv>(env: &mut E, span: Span, required: bool) -> Result<FoldOutcome, ()> {
    if required {
        env.report(SemanticError::ExpectedConstant { span: span.into() });
        return Err(());
    }
    Ok(FoldOutcome::NotConst)
}

/// Resolve the module an access chain roots in. `Ok(None)` means the access
/// could not be resolved in a non-required context.
pub(crate) fn resolve_chain_module<E: ConstEnv>(
    env: &mut E,
    chain: &mut ChainExpr,
    required: bool,
) -> Result<Option<ModuleId>, ()> {
    let Some(access) = &mut chain.module_access else {
        return Ok(Some(env.module()));
    };
    if let Some(resolved) = access.resolved {
        return Ok(Some(resolved));
    }

    let alias = *access.modules.last().expect("module access is non-empty");
    let Some(&target) = env.symbols()[env.module().index() as usize]
        .imports
        .get(&alias.name)
    else {
        if required {
            env.report(SemanticError::ModuleNotFound {
                name: env.interner().resolve(alias.name).to_string(),
                span: alias.span.into(),
            });
            return Err(());
        }
        return Ok(None);
    };
    access.resolved = Some(target);
    Ok(Some(target))
}

pub(crate) fn fold_error_to_semantic(err: FoldError, op: &str, span: Span) -> SemanticError {
    match err {
        FoldError::Overflow => SemanticError::FoldOverflow {
            op: op.to_string(),
            span: span.into(),
        },
        FoldError::DivisionByZero => SemanticError::FoldDivisionByZero { span: span.into() },
        FoldError::ShiftOverflow => SemanticError::FoldShiftOverflow { span: span.into() },
        FoldError::Invalid(found) => SemanticError::InvalidOperand {
            op: op.to_string(),
            found: found.to_string(),
            span: span.into(),
        },
        FoldError::MixedSigns => SemanticError::InvalidOperand {
            op: op.to_string(),
            found: "mixed signed and unsigned integers".to_string(),
            span: span.into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConstValue::*;

    #[test]
    fn signed_overflow_is_reported() {
        let err = fold_binary(BinaryOp::Add, Signed(i64::MAX), Signed(1)).unwrap_err();
        assert_eq!(err, FoldError::Overflow);
    }

    #[test]
    fn unsigned_subtraction_underflow() {
        let err = fold_binary(BinaryOp::Sub, Unsigned(u64::MAX - 1), Unsigned(u64::MAX)).unwrap_err();
        assert_eq!(err, FoldError::Overflow);
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            fold_binary(BinaryOp::Div, Signed(1), Signed(0)).unwrap_err(),
            FoldError::DivisionByZero
        );
        assert_eq!(
            fold_binary(BinaryOp::Rem, Signed(1), Signed(0)).unwrap_err(),
            FoldError::DivisionByZero
        );
    }

    #[test]
    fn shift_count_is_bounded() {
        assert_eq!(
            fold_binary(BinaryOp::Shl, Signed(1), Signed(64)).unwrap_err(),
            FoldError::ShiftOverflow
        );
        assert_eq!(fold_binary(BinaryOp::Shl, Signed(1), Signed(3)), Ok(Signed(8)));
    }

    #[test]
    fn neg_promotes_unsigned_in_range() {
        assert_eq!(fold_unary(UnaryOp::Neg, Unsigned(5)), Ok(Signed(-5)));
        assert_eq!(
            fold_unary(UnaryOp::Neg, Unsigned(i64::MAX as u64 + 1)),
            Ok(Signed(i64::MIN))
        );
        assert_eq!(
            fold_unary(UnaryOp::Neg, Unsigned(u64::MAX)).unwrap_err(),
            FoldError::Overflow
        );
    }

    #[test]
    fn rem_rejects_float() {
        assert_eq!(
            fold_binary(BinaryOp::Rem, Float(1.0), Float(2.0)).unwrap_err(),
            FoldError::Invalid("float")
        );
    }

    #[test]
    fn comparison_produces_bool() {
        assert_eq!(fold_binary(BinaryOp::Less, Signed(1), Signed(2)), Ok(Bool(true)));
        assert_eq!(fold_binary(BinaryOp::Eq, Bool(true), Bool(true)), Ok(Bool(true)));
        assert!(fold_binary(BinaryOp::Less, Bool(true), Bool(false)).is_err());
    }

    #[test]
    fn literals_default_signed_until_i64_max() {
        assert_eq!(lit_value(LitExpr::Int(5)), Signed(5));
        assert_eq!(lit_value(LitExpr::Int(i64::MAX as u64)), Signed(i64::MAX));
        assert_eq!(
            lit_value(LitExpr::Int(i64::MAX as u64 + 1)),
            Unsigned(i64::MAX as u64 + 1)
        );
    }

    #[test]
    fn const_cast_truncates_integers() {
        assert_eq!(const_cast(Signed(0x1FF), BasicType::U8), Ok(Unsigned(0xFF)));
        assert_eq!(const_cast(Signed(-1), BasicType::U8), Ok(Unsigned(0xFF)));
        assert_eq!(const_cast(Unsigned(200), BasicType::I8), Ok(Signed(-56)));
    }

    #[test]
    fn const_cast_float_to_int_requires_range() {
        assert_eq!(const_cast(Float(3.9), BasicType::I32), Ok(Signed(3)));
        assert_eq!(
            const_cast(Float(1e30), BasicType::I32).unwrap_err(),
            FoldError::Overflow
        );
    }

    #[test]
    fn value_fit_checks_ranges() {
        assert_eq!(value_fit(&Signed(255), BasicType::U8), FitResult::Fits);
        assert_eq!(value_fit(&Signed(256), BasicType::U8), FitResult::OutOfRange);
        assert_eq!(value_fit(&Signed(-1), BasicType::U64), FitResult::OutOfRange);
        assert_eq!(value_fit(&Signed(1), BasicType::F64), FitResult::WrongKind);
        assert_eq!(value_fit(&Bool(true), BasicType::Bool), FitResult::Fits);
    }

    #[test]
    fn default_basic_prefers_i32() {
        assert_eq!(default_basic(&Signed(1)), BasicType::I32);
        assert_eq!(default_basic(&Signed(i64::MAX)), BasicType::I64);
        assert_eq!(default_basic(&Unsigned(u64::MAX)), BasicType::U64);
        assert_eq!(default_basic(&Float(1.0)), BasicType::F64);
    }
}
