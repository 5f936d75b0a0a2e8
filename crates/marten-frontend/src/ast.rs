// ast.rs
//
// Abstract syntax tree for one Marten module. Nodes are owned by their
// parents; a module's tree lives for the whole compilation. The semantic
// passes mutate the tree in exactly two ways: resolution (unresolved types
// and access-chain links gain their ids) and constant folding (expressions
// are rewritten to `ExprKind::Folded`).

use marten_identity::{EnumId, GlobalId, ModuleId, ProcId, Span, StructId, Symbol};

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bool,
    String,
}

impl BasicType {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::U8 | Self::I16 | Self::U16 | Self::I32 | Self::U32 | Self::I64 | Self::U64
        )
    }

    pub fn is_signed_integer(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn is_unsigned_integer(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::String => "string",
        }
    }
}

/// An identifier with its source span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident {
    pub name: Symbol,
    pub span: Span,
}

/// `a::b::...` prefix of a reference
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleAccess {
    pub modules: Vec<Ident>,
    /// Import alias resolved to the target module (pass 4 / resolution)
    pub resolved: Option<ModuleId>,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A type signature. `pointer_level > 0` wraps the underlying kind in that
/// many levels of indirection.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub pointer_level: u32,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Basic(BasicType),
    Array(Box<ArrayType>),
    Procedure(Box<ProcType>),
    Struct(StructId),
    Enum(EnumId),
    /// Parser-level name reference; none remain after pass 2 on success.
    Unresolved(Box<UnresolvedType>),
}

impl Type {
    pub fn basic(basic: BasicType) -> Self {
        Self {
            pointer_level: 0,
            kind: TypeKind::Basic(basic),
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_level > 0
    }

    /// The same type with one level of indirection removed.
    pub fn deref(&self) -> Type {
        debug_assert!(self.pointer_level > 0);
        Type {
            pointer_level: self.pointer_level - 1,
            kind: self.kind.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub size: ConstevalExpr,
    /// Folded element count, cached by signature resolution
    pub len: Option<u64>,
    pub elem: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcType {
    pub params: Vec<Type>,
    pub return_ty: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedType {
    pub module_access: Option<ModuleAccess>,
    pub ident: Ident,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// A literal value held at maximum width. Folding computes at this width;
/// narrowing to a basic type happens at the use site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Str(Symbol),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    /// Literal token payload, not yet folded
    Lit(LitExpr),
    Cast(Box<CastExpr>),
    Sizeof(Box<SizeofExpr>),
    /// `.Variant`: requires an enum expected-type context
    EnumLit(EnumLitExpr),
    StructInit(Box<StructInitExpr>),
    ArrayInit(Box<ArrayInitExpr>),
    /// Access chain rooted at an identifier, possibly module-qualified
    Chain(Box<ChainExpr>),
    /// Rewritten in place by the constant folder
    Folded(ConstValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub op_span: Span,
    pub rhs: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    /// Fold failures (division by zero, overflow, oversized shifts) are
    /// reported at the operator, not the whole expression
    pub op_span: Span,
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LitExpr {
    Int(u64),
    Float(f64),
    Bool(bool),
    Str(Symbol),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub ty: BasicType,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeofExpr {
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumLitExpr {
    pub variant: Ident,
    /// Enum id and variant index, filled during checking
    pub resolved: Option<(EnumId, u32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructInitExpr {
    pub module_access: Option<ModuleAccess>,
    /// Explicit struct name; absent for `.{ ... }` inferred from context
    pub ident: Option<Ident>,
    pub args: Vec<Expr>,
    pub resolved: Option<StructId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayInitExpr {
    /// Explicit `[n]T` prefix; absent when inferred from context
    pub ty: Option<Type>,
    pub args: Vec<Expr>,
}

/// `a.b[3].c()`: identifier root followed by field, index and call links.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainExpr {
    pub module_access: Option<ModuleAccess>,
    pub links: Vec<ChainLink>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainLink {
    pub kind: ChainLinkKind,
    pub span: Span,
    /// Resolution and result type, annotated during checking
    pub resolved: Option<ChainRes>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainLinkKind {
    /// Root variable/global, or a field access after the first link
    Name(Ident),
    /// `[index]`
    Index(Box<Expr>),
    /// `name(args)`: procedure call at the root, method call after it
    Call(Ident, Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainRes {
    pub kind: ChainResKind,
    /// Type produced by this link; a call without a return type has none
    pub ty: Option<Type>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainResKind {
    Local,
    Global(GlobalId),
    /// The chain root names an enum type; the next link picks a variant
    EnumType(EnumId),
    Variant(u32),
    Proc(ProcId),
    Method(ProcId),
    Field(u32),
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    LogicNot,
    BitNot,
    AddressOf,
    Deref,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::LogicNot => "!",
            Self::BitNot => "~",
            Self::AddressOf => "&",
            Self::Deref => "*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    LogicOr,
    LogicAnd,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LogicOr => "||",
            Self::LogicAnd => "&&",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAnd => "&",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Less | Self::Greater | Self::LessEq | Self::GreaterEq
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

// ---------------------------------------------------------------------------
// Compile-time evaluation
// ---------------------------------------------------------------------------

/// Tri-state visit marker guarding each compile-time expression against
/// dependency cycles among globals and enum variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstevalState {
    #[default]
    NotEvaluated,
    Evaluating,
    Evaluated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstevalExpr {
    pub expr: Expr,
    pub state: ConstevalState,
}

impl ConstevalExpr {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            state: ConstevalState::NotEvaluated,
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    If(Box<IfStmt>),
    For(Box<ForStmt>),
    Block(Box<Block>),
    Defer(Box<Block>),
    Break,
    Continue,
    Return(Option<Expr>),
    Switch(Box<SwitchStmt>),
    VarDecl(Box<VarDecl>),
    Assign(Box<AssignStmt>),
    /// Procedure-call statement; the chain must end in a call link
    Call(Box<ChainExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub block: Block,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    If(Box<IfStmt>),
    Block(Block),
}

/// All three forms: `for { }`, `for cond { }`, `for decl; cond; step { }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub decl: Option<VarDecl>,
    pub cond: Option<Expr>,
    pub step: Option<AssignStmt>,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub expr: Expr,
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: ConstevalExpr,
    /// `expr:` cases have no block
    pub block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ident: Ident,
    /// Explicit type; inferred from the initializer when absent
    pub ty: Option<Type>,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: ChainExpr,
    pub target_span: Span,
    pub op: AssignOp,
    pub op_span: Span,
    pub value: Expr,
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Last path segment; the name the module is referenced by
    pub alias: Ident,
    pub path: Vec<Ident>,
    pub span: Span,
    pub resolved: Option<ModuleId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseDecl {
    pub alias: Ident,
    /// Import alias of the module the symbol comes from
    pub module: Ident,
    pub symbol: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub ident: Ident,
    pub fields: Vec<StructField>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub ident: Ident,
    pub ty: Type,
    pub default: Option<ConstevalExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub ident: Ident,
    pub basic_ty: BasicType,
    pub variants: Vec<EnumVariant>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    pub ident: Ident,
    pub value: ConstevalExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcDecl {
    pub ident: Ident,
    pub params: Vec<ProcParam>,
    pub return_ty: Option<Type>,
    /// Absent for external procedures (`@` in place of a body)
    pub block: Option<Block>,
    pub is_external: bool,
    pub is_variadic: bool,
    pub is_main: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcParam {
    pub ident: Ident,
    /// `self` params have their type filled in during signature checking
    pub ty: Option<Type>,
    pub is_self: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDecl {
    pub ident: Ident,
    pub value: ConstevalExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImplDecl {
    pub target: UnresolvedType,
    pub procs: Vec<ProcDecl>,
    pub span: Span,
}

/// The AST of one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub imports: Vec<ImportDecl>,
    pub uses: Vec<UseDecl>,
    pub structs: Vec<StructDecl>,
    pub enums: Vec<EnumDecl>,
    pub procs: Vec<ProcDecl>,
    pub globals: Vec<GlobalDecl>,
    pub impls: Vec<ImplDecl>,
}
