// analyzer/expr.rs
//
// Pass 4 expression checking. Expressions are checked against an optional
// expected type that steers literal defaulting; chains are resolved link by
// link and annotated; operator expressions get a folding attempt first and
// fall back to structural checking when an operand is not constant.

use marten_frontend::ast::{
    BasicType, BinaryOp, ChainExpr, ChainLinkKind, ChainRes, ChainResKind, ConstValue, Expr,
    ExprKind, Type, TypeKind, UnaryOp,
};
use marten_identity::{EnumId, GlobalId, Interner, ModuleId, ProcId, Span, StructId, Symbol};

use crate::consteval::{self, ConstEnv, FitResult, FoldOutcome};
use crate::errors::SemanticError;
use crate::layout;
use crate::program::ModuleSymbols;
use crate::registry::Registry;
use crate::resolve;

use super::stmt::BodyChecker;

/// How a chain is being used; statements and assignment targets have extra
/// rules at the final link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChainMode {
    Expr,
    Stmt,
    Place,
}

pub(crate) struct ChainResult {
    /// Resulting type; a call statement without a return value has none
    pub ty: Option<Type>,
    /// Present when the chain denotes a constant (global or enum variant)
    pub const_value: Option<ConstValue>,
}

impl<'a> BodyChecker<'a> {
    /// Check an expression and produce its type. The expected type is a
    /// hint: it steers literal defaulting and initializer inference; the
    /// caller compares the result (`check_expr_expect`) where a hard match
    /// is needed.
    pub(crate) fn check_expr(&mut self, expr: &mut Expr, expected: Option<&Type>) -> Option<Type> {
        match &mut expr.kind {
            ExprKind::Folded(value) => {
                let value = *value;
                self.narrow_value(value, expected, expr.span)
            }
            ExprKind::Lit(lit) => {
                let value = consteval::lit_value(*lit);
                expr.kind = ExprKind::Folded(value);
                self.narrow_value(value, expected, expr.span)
            }
            ExprKind::Chain(chain) => {
                let result = self.check_chain(chain, ChainMode::Expr)?;
                if let Some(value) = result.const_value {
                    expr.kind = ExprKind::Folded(value);
                }
                result.ty
            }
            ExprKind::EnumLit(_) => self.check_enum_lit(expr, expected),
            ExprKind::StructInit(_) => self.check_struct_init(expr, expected),
            ExprKind::ArrayInit(_) => self.check_array_init(expr, expected),
            ExprKind::Unary(_) | ExprKind::Binary(_) | ExprKind::Cast(_) | ExprKind::Sizeof(_) => {
                match consteval::fold_expr(self, expr, expected, false) {
                    Err(()) => None,
                    Ok(FoldOutcome::Value(value)) => self.narrow_value(value, expected, expr.span),
                    Ok(FoldOutcome::NotConst) => self.check_operator_expr(expr, expected),
                }
            }
        }
    }

    /// Check an expression against a required type, with the one implicit
    /// widening attempt the language allows.
    pub(crate) fn check_expr_expect(&mut self, expr: &mut Expr, expected: &Type) -> Option<Type> {
        let found = self.check_expr(expr, Some(expected))?;
        if resolve::match_type(&found, expected) || resolve::implicit_cast_ok(&found, expected) {
            Some(found)
        } else {
            let expected = self.display(expected);
            let found = self.display(&found);
            self.error(SemanticError::TypeMismatch {
                expected,
                found,
                span: expr.span.into(),
            });
            None
        }
    }

    /// Narrow a folded value at its use site.
    pub(crate) fn narrow_value(
        &mut self,
        value: ConstValue,
        expected: Option<&Type>,
        span: Span,
    ) -> Option<Type> {
        let Some(expected) = expected else {
            return Some(Type::basic(consteval::default_basic(&value)));
        };

        let basic = match (&expected.kind, expected.pointer_level) {
            (TypeKind::Basic(basic), 0) => *basic,
            (TypeKind::Enum(id), 0) => self.program.registry.enum_def(*id).basic_ty,
            _ => {
                let expected = self.display(expected);
                self.error(SemanticError::TypeMismatch {
                    expected,
                    found: consteval::kind_name(&value).to_string(),
                    span: span.into(),
                });
                return None;
            }
        };

        match consteval::value_fit(&value, basic) {
            FitResult::Fits => Some(expected.clone()),
            FitResult::OutOfRange => {
                self.error(SemanticError::LiteralOutOfRange {
                    ty: basic.as_str().to_string(),
                    span: span.into(),
                });
                None
            }
            FitResult::WrongKind => {
                let expected = self.display(expected);
                self.error(SemanticError::TypeMismatch {
                    expected,
                    found: consteval::kind_name(&value).to_string(),
                    span: span.into(),
                });
                None
            }
        }
    }

    /// Fit check shared with switch cases (value already folded).
    pub(crate) fn check_value_against(&mut self, value: &ConstValue, expected: &Type, span: Span) {
        let _ = self.narrow_value(*value, Some(expected), span);
    }

    // -- operators ----------------------------------------------------------

    fn check_operator_expr(&mut self, expr: &mut Expr, expected: Option<&Type>) -> Option<Type> {
        let span = expr.span;
        match &mut expr.kind {
            ExprKind::Unary(unary) => {
                let op = unary.op;
                let op_span = unary.op_span;
                match op {
                    UnaryOp::Neg => {
                        let ty = self.check_expr(&mut unary.rhs, expected)?;
                        let ok = ty.pointer_level == 0
                            && matches!(&ty.kind, TypeKind::Basic(b)
                                if b.is_signed_integer() || b.is_float());
                        if !ok {
                            return self.invalid_operand(op.as_str(), &ty, op_span);
                        }
                        Some(ty)
                    }
                    UnaryOp::LogicNot => {
                        self.check_expr_expect(&mut unary.rhs, &Type::basic(BasicType::Bool))?;
                        Some(Type::basic(BasicType::Bool))
                    }
                    UnaryOp::BitNot => {
                        let ty = self.check_expr(&mut unary.rhs, expected)?;
                        let ok = ty.pointer_level == 0
                            && matches!(&ty.kind, TypeKind::Basic(b) if b.is_integer());
                        if !ok {
                            return self.invalid_operand(op.as_str(), &ty, op_span);
                        }
                        Some(ty)
                    }
                    UnaryOp::AddressOf => {
                        if !matches!(unary.rhs.kind, ExprKind::Chain(_)) {
                            self.error(SemanticError::InvalidOperand {
                                op: "&".to_string(),
                                found: "a temporary value".to_string(),
                                span: op_span.into(),
                            });
                            return None;
                        }
                        let inner_expected = expected
                            .filter(|ty| ty.pointer_level > 0)
                            .map(|ty| ty.deref());
                        let ty = self.check_expr(&mut unary.rhs, inner_expected.as_ref())?;
                        Some(Type {
                            pointer_level: ty.pointer_level + 1,
                            kind: ty.kind,
                        })
                    }
                    UnaryOp::Deref => {
                        let ty = self.check_expr(&mut unary.rhs, None)?;
                        if ty.pointer_level == 0 {
                            return self.invalid_operand("*", &ty, op_span);
                        }
                        Some(ty.deref())
                    }
                }
            }

            ExprKind::Binary(binary) => {
                let op = binary.op;
                let op_span = binary.op_span;
                match op {
                    BinaryOp::LogicAnd | BinaryOp::LogicOr => {
                        let bool_ty = Type::basic(BasicType::Bool);
                        self.check_expr_expect(&mut binary.lhs, &bool_ty);
                        self.check_expr_expect(&mut binary.rhs, &bool_ty);
                        Some(bool_ty)
                    }
                    BinaryOp::Eq | BinaryOp::NotEq => {
                        let lhs = self.check_expr(&mut binary.lhs, None)?;
                        let comparable = lhs.pointer_level > 0
                            || matches!(&lhs.kind, TypeKind::Basic(b) if *b != BasicType::String)
                            || matches!(&lhs.kind, TypeKind::Enum(_));
                        if !comparable {
                            return self.invalid_operand(op.as_str(), &lhs, op_span);
                        }
                        self.check_expr_expect(&mut binary.rhs, &lhs);
                        Some(Type::basic(BasicType::Bool))
                    }
                    BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
                        let lhs = self.check_expr(&mut binary.lhs, None)?;
                        if !is_numeric(&lhs) {
                            return self.invalid_operand(op.as_str(), &lhs, op_span);
                        }
                        self.check_expr_expect(&mut binary.rhs, &lhs);
                        Some(Type::basic(BasicType::Bool))
                    }
                    BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                        let lhs = self.check_expr(&mut binary.lhs, expected)?;
                        if !is_numeric(&lhs) {
                            return self.invalid_operand(op.as_str(), &lhs, op_span);
                        }
                        self.check_expr_expect(&mut binary.rhs, &lhs);
                        Some(lhs)
                    }
                    BinaryOp::Rem
                    | BinaryOp::BitAnd
                    | BinaryOp::BitOr
                    | BinaryOp::BitXor => {
                        let lhs = self.check_expr(&mut binary.lhs, expected)?;
                        if !is_integer(&lhs) {
                            return self.invalid_operand(op.as_str(), &lhs, op_span);
                        }
                        self.check_expr_expect(&mut binary.rhs, &lhs);
                        Some(lhs)
                    }
                    BinaryOp::Shl | BinaryOp::Shr => {
                        let lhs = self.check_expr(&mut binary.lhs, expected)?;
                        if !is_integer(&lhs) {
                            return self.invalid_operand(op.as_str(), &lhs, op_span);
                        }
                        // The shift count only needs to be an integer
                        if let Some(rhs) = self.check_expr(&mut binary.rhs, None)
                            && !is_integer(&rhs)
                        {
                            self.invalid_operand::<()>(op.as_str(), &rhs, op_span);
                        }
                        Some(lhs)
                    }
                }
            }

            ExprKind::Cast(cast) => {
                // Target validity was enforced during the fold attempt
                let target = cast.ty;
                let src = self.check_expr(&mut cast.expr, None)?;
                let src_basic = match (&src.kind, src.pointer_level) {
                    (TypeKind::Basic(basic), 0) => *basic,
                    _ => {
                        let found = self.display(&src);
                        self.error(SemanticError::CastNonBasicSource {
                            found,
                            span: span.into(),
                        });
                        return None;
                    }
                };
                if matches!(src_basic, BasicType::Bool | BasicType::String) {
                    self.error(SemanticError::CastInvalidSource {
                        from: src_basic.as_str().to_string(),
                        span: span.into(),
                    });
                    return None;
                }
                if src_basic == target {
                    self.error(SemanticError::CastRedundant {
                        ty: target.as_str().to_string(),
                        span: span.into(),
                    });
                    return None;
                }
                Some(Type::basic(target))
            }

            // The fold attempt resolves and sizes the type; after pass 3
            // every valid type has a size
            ExprKind::Sizeof(_) => Some(Type::basic(BasicType::U64)),

            _ => unreachable!("operator path only sees operator expressions"),
        }
    }

    fn invalid_operand<T>(&mut self, op: &str, ty: &Type, span: Span) -> Option<T> {
        let found = self.display(ty);
        self.error(SemanticError::InvalidOperand {
            op: op.to_string(),
            found,
            span: span.into(),
        });
        None
    }

    // -- initializers and enum literals -------------------------------------

    fn check_enum_lit(&mut self, expr: &mut Expr, expected: Option<&Type>) -> Option<Type> {
        let span = expr.span;
        let ExprKind::EnumLit(lit) = &mut expr.kind else {
            unreachable!()
        };

        let enum_id = match expected {
            Some(ty) if ty.pointer_level == 0 => match ty.kind {
                TypeKind::Enum(id) => Some(id),
                _ => None,
            },
            _ => None,
        };
        let Some(enum_id) = enum_id else {
            self.error(SemanticError::EnumLitNoContext { span: span.into() });
            return None;
        };

        let def = self.program.registry.enum_def(enum_id);
        let Some(index) = def.variant_index(lit.variant.name) else {
            let name = self.interner.resolve(lit.variant.name).to_string();
            self.error(SemanticError::EnumVariantNotFound {
                name,
                span: lit.variant.span.into(),
            });
            return None;
        };
        lit.resolved = Some((enum_id, index));

        let value = def.variants[index as usize].value.expect("variant evaluated in pass 2");
        expr.kind = ExprKind::Folded(value);
        Some(Type {
            pointer_level: 0,
            kind: TypeKind::Enum(enum_id),
        })
    }

    fn check_struct_init(&mut self, expr: &mut Expr, expected: Option<&Type>) -> Option<Type> {
        let span = expr.span;
        let ExprKind::StructInit(init) = &mut expr.kind else {
            unreachable!()
        };

        let expected_struct = match expected {
            Some(ty) if ty.pointer_level == 0 => match ty.kind {
                TypeKind::Struct(id) => Some(id),
                _ => None,
            },
            _ => None,
        };

        let struct_id = if let Some(ident) = init.ident {
            let module = match &mut init.module_access {
                Some(access) => {
                    let alias = *access.modules.last().expect("non-empty access");
                    let Some(&target) = self.module_symbols().imports.get(&alias.name) else {
                        let name = self.interner.resolve(alias.name).to_string();
                        self.error(SemanticError::ModuleNotFound {
                            name,
                            span: alias.span.into(),
                        });
                        return None;
                    };
                    access.resolved = Some(target);
                    target
                }
                None => self.module,
            };
            let Some(&id) = self.program.symbols[module.index() as usize]
                .structs
                .get(&ident.name)
            else {
                let name = self.interner.resolve(ident.name).to_string();
                self.error(SemanticError::TypeNotFound {
                    name,
                    span: ident.span.into(),
                });
                return None;
            };

            // An explicit name must agree with the context
            if let Some(expected_id) = expected_struct
                && expected_id != id
            {
                let expected = self.display(expected.unwrap());
                let found = self.interner.resolve(ident.name).to_string();
                self.error(SemanticError::TypeMismatch {
                    expected,
                    found,
                    span: ident.span.into(),
                });
                return None;
            }
            id
        } else if let Some(id) = expected_struct {
            id
        } else if let Some(expected) = expected {
            let expected = self.display(expected);
            self.error(SemanticError::StructInitWrongContext {
                expected,
                span: span.into(),
            });
            return None;
        } else {
            self.error(SemanticError::StructInitNoContext { span: span.into() });
            return None;
        };

        init.resolved = Some(struct_id);

        let field_tys: Vec<Type> = self
            .program
            .registry
            .struct_def(struct_id)
            .fields
            .iter()
            .map(|f| f.ty.clone())
            .collect();
        if init.args.len() != field_tys.len() {
            self.error(SemanticError::WrongArgumentCount {
                expected: field_tys.len(),
                found: init.args.len(),
                span: span.into(),
            });
            return None;
        }
        for (arg, field_ty) in init.args.iter_mut().zip(&field_tys) {
            self.check_expr_expect(arg, field_ty);
        }

        Some(Type {
            pointer_level: 0,
            kind: TypeKind::Struct(struct_id),
        })
    }

    fn check_array_init(&mut self, expr: &mut Expr, expected: Option<&Type>) -> Option<Type> {
        let span = expr.span;
        let ExprKind::ArrayInit(init) = &mut expr.kind else {
            unreachable!()
        };

        let array_ty = if let Some(ty) = &mut init.ty {
            if !resolve::resolve_type_full(self, ty) {
                return None;
            }
            if let Some(expected) = expected
                && !resolve::match_type(ty, expected)
            {
                let expected = self.display(expected);
                let found = self.display(ty);
                self.error(SemanticError::TypeMismatch {
                    expected,
                    found,
                    span: span.into(),
                });
                return None;
            }
            ty.clone()
        } else if let Some(expected) = expected {
            if expected.pointer_level != 0 || !matches!(expected.kind, TypeKind::Array(_)) {
                let expected = self.display(expected);
                self.error(SemanticError::ArrayInitWrongContext {
                    expected,
                    span: span.into(),
                });
                return None;
            }
            expected.clone()
        } else {
            self.error(SemanticError::ArrayInitNoContext { span: span.into() });
            return None;
        };

        let TypeKind::Array(array) = &array_ty.kind else {
            unreachable!("validated above");
        };
        let len = array.len.expect("array length folded in signature resolution");
        if init.args.len() as u64 != len {
            self.error(SemanticError::WrongArgumentCount {
                expected: len as usize,
                found: init.args.len(),
                span: span.into(),
            });
        }
        let elem_ty = array.elem.clone();
        for arg in &mut init.args {
            self.check_expr_expect(arg, &elem_ty);
        }

        Some(array_ty)
    }

    // -- access chains -------------------------------------------------------

    /// Resolve an access chain link by link, annotating each one. Field
    /// access works on a struct or a single pointer to one; indexing needs
    /// an array and an integer index; call links resolve to procedures at
    /// the root and methods after it.
    pub(crate) fn check_chain(
        &mut self,
        chain: &mut ChainExpr,
        mode: ChainMode,
    ) -> Option<ChainResult> {
        enum State {
            Value(Type),
            EnumType(EnumId),
            Void,
        }

        let module = match &mut chain.module_access {
            Some(access) => {
                if let Some(resolved) = access.resolved {
                    resolved
                } else {
                    let alias = *access.modules.last().expect("non-empty access");
                    let Some(&target) = self.module_symbols().imports.get(&alias.name) else {
                        let name = self.interner.resolve(alias.name).to_string();
                        self.error(SemanticError::ModuleNotFound {
                            name,
                            span: alias.span.into(),
                        });
                        return None;
                    };
                    access.resolved = Some(target);
                    target
                }
            }
            None => self.module,
        };
        let qualified = chain.module_access.is_some();

        let mut state = State::Void;
        let mut const_value: Option<ConstValue> = None;
        let link_count = chain.links.len();

        for index in 0..link_count {
            let is_last = index + 1 == link_count;
            const_value = None;

            // The link's kind is moved out so its sub-expressions can be
            // checked while the link itself is annotated.
            let placeholder = ChainLinkKind::Name(marten_frontend::ast::Ident {
                name: Symbol::new(0),
                span: Span::default(),
            });
            let mut kind = std::mem::replace(&mut chain.links[index].kind, placeholder);
            let link_span = chain.links[index].span;

            match &mut kind {
                ChainLinkKind::Name(ident) => {
                    let ident = *ident;
                    if index == 0 {
                        // Root: local, global, or an enum type awaiting its
                        // variant
                        if !qualified && self.scopes.contains(ident.name) {
                            let ty = self.scopes.get(ident.name).expect("checked").clone();
                            state = State::Value(ty.clone());
                            chain.links[index].resolved = Some(ChainRes {
                                kind: ChainResKind::Local,
                                ty: Some(ty),
                            });
                        } else if let Some(&id) = self.program.symbols[module.index() as usize]
                            .globals
                            .get(&ident.name)
                        {
                            let def = self.program.registry.global_def(id);
                            let ty = def.ty.clone().expect("global typed in pass 2");
                            if is_last {
                                const_value = def.value;
                            }
                            state = State::Value(ty.clone());
                            chain.links[index].resolved = Some(ChainRes {
                                kind: ChainResKind::Global(id),
                                ty: Some(ty),
                            });
                        } else if let Some(&id) = self.program.symbols[module.index() as usize]
                            .enums
                            .get(&ident.name)
                        {
                            state = State::EnumType(id);
                            chain.links[index].resolved = Some(ChainRes {
                                kind: ChainResKind::EnumType(id),
                                ty: None,
                            });
                        } else {
                            let name = self.interner.resolve(ident.name).to_string();
                            self.error(SemanticError::NameNotFound {
                                name,
                                span: ident.span.into(),
                            });
                            return None;
                        }
                    } else {
                        match &state {
                            State::EnumType(enum_id) => {
                                let enum_id = *enum_id;
                                let def = self.program.registry.enum_def(enum_id);
                                let Some(variant) = def.variant_index(ident.name) else {
                                    let name = self.interner.resolve(ident.name).to_string();
                                    self.error(SemanticError::EnumVariantNotFound {
                                        name,
                                        span: ident.span.into(),
                                    });
                                    return None;
                                };
                                let ty = Type {
                                    pointer_level: 0,
                                    kind: TypeKind::Enum(enum_id),
                                };
                                if is_last {
                                    const_value = def.variants[variant as usize].value;
                                }
                                state = State::Value(ty.clone());
                                chain.links[index].resolved = Some(ChainRes {
                                    kind: ChainResKind::Variant(variant),
                                    ty: Some(ty),
                                });
                            }
                            State::Value(receiver) => {
                                let Some(struct_id) = struct_of(receiver) else {
                                    let found = self.display(receiver);
                                    self.error(SemanticError::FieldAccessOnNonStruct {
                                        found,
                                        span: ident.span.into(),
                                    });
                                    return None;
                                };
                                let def = self.program.registry.struct_def(struct_id);
                                let Some(field_index) = def
                                    .fields
                                    .iter()
                                    .position(|f| f.ident.name == ident.name)
                                else {
                                    let ty =
                                        self.interner.resolve(def.ident.name).to_string();
                                    let name = self.interner.resolve(ident.name).to_string();
                                    self.error(SemanticError::FieldNotFound {
                                        ty,
                                        name,
                                        span: ident.span.into(),
                                    });
                                    return None;
                                };
                                let ty = def.fields[field_index].ty.clone();
                                state = State::Value(ty.clone());
                                chain.links[index].resolved = Some(ChainRes {
                                    kind: ChainResKind::Field(field_index as u32),
                                    ty: Some(ty),
                                });
                            }
                            State::Void => unreachable!("void only occurs at the last link"),
                        }
                    }
                }

                ChainLinkKind::Index(index_expr) => {
                    let State::Value(receiver) = &state else {
                        self.error(SemanticError::IndexOnNonArray {
                            found: "enum type".to_string(),
                            span: link_span.into(),
                        });
                        return None;
                    };
                    let elem_ty = match (&receiver.kind, receiver.pointer_level) {
                        (TypeKind::Array(array), 0) => array.elem.clone(),
                        _ => {
                            let found = self.display(receiver);
                            self.error(SemanticError::IndexOnNonArray {
                                found,
                                span: link_span.into(),
                            });
                            return None;
                        }
                    };

                    if let Some(index_ty) = self.check_expr(index_expr, None)
                        && !is_integer(&index_ty)
                    {
                        let found = self.display(&index_ty);
                        let span = index_expr.span;
                        self.error(SemanticError::IndexNotInteger {
                            found,
                            span: span.into(),
                        });
                    }

                    state = State::Value(elem_ty.clone());
                    chain.links[index].resolved = Some(ChainRes {
                        kind: ChainResKind::Index,
                        ty: Some(elem_ty),
                    });
                }

                ChainLinkKind::Call(ident, args) => {
                    let ident = *ident;

                    let (proc_id, res_kind) = if index == 0 {
                        let Some(&id) = self.program.symbols[module.index() as usize]
                            .procs
                            .get(&ident.name)
                        else {
                            let name = self.interner.resolve(ident.name).to_string();
                            self.error(SemanticError::ProcNotFound {
                                name,
                                span: ident.span.into(),
                            });
                            return None;
                        };
                        (id, ChainResKind::Proc(id))
                    } else {
                        let receiver_methods = match &state {
                            State::Value(receiver) if receiver.pointer_level <= 1 => {
                                match &receiver.kind {
                                    TypeKind::Struct(id) => {
                                        Some(&self.program.registry.struct_def(*id).methods)
                                    }
                                    TypeKind::Enum(id) => {
                                        Some(&self.program.registry.enum_def(*id).methods)
                                    }
                                    _ => None,
                                }
                            }
                            _ => None,
                        };
                        let method = receiver_methods.and_then(|m| m.get(&ident.name)).copied();
                        let Some(id) = method else {
                            let ty = match &state {
                                State::Value(receiver) => self.display(receiver),
                                _ => "enum type".to_string(),
                            };
                            let name = self.interner.resolve(ident.name).to_string();
                            self.error(SemanticError::MethodNotFound {
                                ty,
                                name,
                                span: ident.span.into(),
                            });
                            return None;
                        };
                        (id, ChainResKind::Method(id))
                    };

                    // The receiver binds the `self` parameter of a method
                    let skip_self = matches!(res_kind, ChainResKind::Method(_))
                        && self
                            .program
                            .registry
                            .proc_def(proc_id)
                            .params
                            .first()
                            .is_some_and(|p| p.is_self);
                    let return_ty = self.check_call_args(proc_id, args, skip_self, link_span);

                    match &return_ty {
                        Some(ty) => {
                            if is_last && mode == ChainMode::Stmt {
                                let name = self.interner.resolve(ident.name).to_string();
                                self.error(SemanticError::CallReturnDiscarded {
                                    name,
                                    span: link_span.into(),
                                });
                            }
                            state = State::Value(ty.clone());
                        }
                        None => {
                            if !(is_last && mode == ChainMode::Stmt) {
                                let name = self.interner.resolve(ident.name).to_string();
                                self.error(SemanticError::CallNoReturnValue {
                                    name,
                                    span: link_span.into(),
                                });
                                return None;
                            }
                            state = State::Void;
                        }
                    }
                    chain.links[index].resolved = Some(ChainRes {
                        kind: res_kind,
                        ty: return_ty,
                    });
                }
            }

            chain.links[index].kind = kind;
        }

        let last_is_call = matches!(
            chain.links.last().expect("chains are non-empty").kind,
            ChainLinkKind::Call(_, _)
        );
        let chain_span = chain.links[0]
            .span
            .merge(chain.links[link_count - 1].span);

        match mode {
            ChainMode::Stmt => {
                if !last_is_call {
                    self.error(SemanticError::ExpectedCallStatement {
                        span: chain_span.into(),
                    });
                    return None;
                }
            }
            ChainMode::Place => {
                if last_is_call {
                    self.error(SemanticError::AssignToCall {
                        span: chain_span.into(),
                    });
                    return None;
                }
            }
            ChainMode::Expr => {}
        }

        match state {
            State::Value(ty) => Some(ChainResult {
                ty: Some(ty),
                const_value,
            }),
            State::Void => Some(ChainResult {
                ty: None,
                const_value: None,
            }),
            State::EnumType(id) => {
                let name = self.interner.resolve(self.program.registry.enum_def(id).ident.name);
                self.error(SemanticError::TypeMismatch {
                    expected: "a value".to_string(),
                    found: format!("enum type {name}"),
                    span: chain_span.into(),
                });
                None
            }
        }
    }

    /// Argument count and types against the callee's signature; variadic
    /// procedures accept extra arguments checked without context.
    fn check_call_args(
        &mut self,
        proc_id: ProcId,
        args: &mut [Expr],
        skip_self: bool,
        span: Span,
    ) -> Option<Type> {
        let (param_tys, return_ty, is_variadic) = {
            let def = self.program.registry.proc_def(proc_id);
            let skip = skip_self as usize;
            (
                def.params[skip..]
                    .iter()
                    .map(|p| p.ty.clone())
                    .collect::<Vec<_>>(),
                def.return_ty.clone(),
                def.is_variadic,
            )
        };

        let count_ok = if is_variadic {
            args.len() >= param_tys.len()
        } else {
            args.len() == param_tys.len()
        };
        if !count_ok {
            self.error(SemanticError::WrongArgumentCount {
                expected: param_tys.len(),
                found: args.len(),
                span: span.into(),
            });
        }

        for (index, arg) in args.iter_mut().enumerate() {
            match param_tys.get(index) {
                Some(param_ty) => {
                    self.check_expr_expect(arg, param_ty);
                }
                None => {
                    // Variadic tail: checked without an expected type
                    self.check_expr(arg, None);
                }
            }
        }

        return_ty
    }
}

fn struct_of(ty: &Type) -> Option<StructId> {
    if ty.pointer_level > 1 {
        return None;
    }
    match ty.kind {
        TypeKind::Struct(id) => Some(id),
        _ => None,
    }
}

fn is_numeric(ty: &Type) -> bool {
    ty.pointer_level == 0
        && matches!(&ty.kind, TypeKind::Basic(b) if b.is_integer() || b.is_float())
}

fn is_integer(ty: &Type) -> bool {
    ty.pointer_level == 0 && matches!(&ty.kind, TypeKind::Basic(b) if b.is_integer())
}

// ---------------------------------------------------------------------------
// Pass-4 constant environment: values were settled in pass 2, sizes in
// pass 3; the walker only reads them here.
// ---------------------------------------------------------------------------

impl ConstEnv for BodyChecker<'_> {
    fn module(&self) -> ModuleId {
        self.module
    }

    fn symbols(&self) -> &[ModuleSymbols] {
        &self.program.symbols
    }

    fn registry(&self) -> &Registry {
        &self.program.registry
    }

    fn interner(&self) -> &Interner {
        self.interner
    }

    fn report(&mut self, error: SemanticError) {
        self.error(error);
    }

    fn global_value(&mut self, id: GlobalId, _use_span: Span) -> Result<ConstValue, ()> {
        self.program.registry.global_def(id).value.ok_or(())
    }

    fn variant_value(&mut self, id: EnumId, variant: u32, _use_span: Span) -> Result<ConstValue, ()> {
        self.program.registry.enum_def(id).variants[variant as usize]
            .value
            .ok_or(())
    }

    fn resolve_type(&mut self, ty: &mut Type) -> bool {
        resolve::resolve_type_full(self, ty)
    }

    fn type_size(&mut self, ty: &Type) -> Option<u64> {
        layout::type_size_align(&self.program.registry, ty).map(|(size, _)| size)
    }

    fn is_local(&self, name: Symbol) -> bool {
        self.scopes.contains(name)
    }
}
