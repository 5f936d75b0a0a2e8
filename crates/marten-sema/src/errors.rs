// errors.rs
//! Semantic analysis errors (E2xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    // -- main entry ---------------------------------------------------------
    #[error("no `main` module found under src/")]
    #[diagnostic(code(E2001), help("the entry module is the file src/main with any extension"))]
    MainFileNotFound,

    #[error("`main` module has no `main` procedure")]
    #[diagnostic(code(E2002))]
    MainProcNotFound,

    #[error("`main` procedure cannot be external")]
    #[diagnostic(code(E2003))]
    MainProcExternal {
        #[label("declared external here")]
        span: SourceSpan,
    },

    #[error("`main` procedure cannot be variadic")]
    #[diagnostic(code(E2004))]
    MainProcVariadic {
        #[label("declared variadic here")]
        span: SourceSpan,
    },

    #[error("`main` procedure must take zero parameters")]
    #[diagnostic(code(E2005))]
    MainProcHasParams {
        #[label("parameters declared here")]
        span: SourceSpan,
    },

    #[error("`main` procedure must declare a return type")]
    #[diagnostic(code(E2006), help("declare it as `main :: () -> i32`"))]
    MainProcNoReturnType {
        #[label("missing `-> i32`")]
        span: SourceSpan,
    },

    #[error("`main` procedure must return i32")]
    #[diagnostic(code(E2007))]
    MainProcWrongReturnType {
        #[label("wrong return type")]
        span: SourceSpan,
    },

    // -- declarations -------------------------------------------------------
    #[error("symbol '{name}' is already declared in this module")]
    #[diagnostic(code(E2010))]
    SymbolAlreadyDeclared {
        name: String,
        #[label("redeclared here")]
        span: SourceSpan,
        #[label("previously declared here")]
        previous: SourceSpan,
    },

    #[error("imported module '{path}' was not found")]
    #[diagnostic(code(E2011))]
    ImportPathNotFound {
        path: String,
        #[label("no module with this path")]
        span: SourceSpan,
    },

    #[error("symbol '{name}' was not found in module '{module}'")]
    #[diagnostic(code(E2012))]
    UseSymbolNotFound {
        name: String,
        module: String,
        #[label("not declared by that module")]
        span: SourceSpan,
    },

    #[error("duplicate struct field '{name}'")]
    #[diagnostic(code(E2013))]
    StructDuplicateField {
        name: String,
        #[label("field redeclared here")]
        span: SourceSpan,
    },

    #[error("enum must declare at least one variant")]
    #[diagnostic(code(E2014))]
    EnumZeroVariants {
        #[label("empty enum")]
        span: SourceSpan,
    },

    #[error("enum base type must be an integer type")]
    #[diagnostic(code(E2015))]
    EnumNonIntegerType {
        #[label("not an integer type")]
        span: SourceSpan,
    },

    #[error("duplicate enum variant '{name}'")]
    #[diagnostic(code(E2016))]
    EnumDuplicateVariant {
        name: String,
        #[label("variant redeclared here")]
        span: SourceSpan,
    },

    #[error("duplicate procedure parameter '{name}'")]
    #[diagnostic(code(E2017))]
    ProcDuplicateParam {
        name: String,
        #[label("parameter redeclared here")]
        span: SourceSpan,
    },

    #[error("duplicate method '{name}'")]
    #[diagnostic(code(E2018))]
    ImplDuplicateMethod {
        name: String,
        #[label("method redeclared here")]
        span: SourceSpan,
    },

    #[error("impl target must be a struct or enum declared in this module")]
    #[diagnostic(code(E2019))]
    ImplTargetInvalid {
        #[label("not a struct or enum")]
        span: SourceSpan,
    },

    #[error("`self` parameter is only allowed in impl member procedures")]
    #[diagnostic(code(E2020))]
    SelfOutsideImpl {
        #[label("`self` not allowed here")]
        span: SourceSpan,
    },

    #[error("`self` must be the first parameter")]
    #[diagnostic(code(E2021))]
    SelfNotFirst {
        #[label("move `self` to the front")]
        span: SourceSpan,
    },

    // -- resolution ---------------------------------------------------------
    #[error("type '{name}' was not found")]
    #[diagnostic(code(E2030))]
    TypeNotFound {
        name: String,
        #[label("unknown type")]
        span: SourceSpan,
    },

    #[error("module '{name}' is not imported here")]
    #[diagnostic(code(E2031))]
    ModuleNotFound {
        name: String,
        #[label("unknown module")]
        span: SourceSpan,
    },

    #[error("array size must be greater than zero")]
    #[diagnostic(code(E2032))]
    ArrayZeroSize {
        #[label("zero-sized array")]
        span: SourceSpan,
    },

    #[error("name '{name}' was not found")]
    #[diagnostic(code(E2033))]
    NameNotFound {
        name: String,
        #[label("not a local, global or enum in scope")]
        span: SourceSpan,
    },

    #[error("procedure '{name}' was not found")]
    #[diagnostic(code(E2034))]
    ProcNotFound {
        name: String,
        #[label("unknown procedure")]
        span: SourceSpan,
    },

    #[error("enum variant '{name}' was not found")]
    #[diagnostic(code(E2035))]
    EnumVariantNotFound {
        name: String,
        #[label("unknown variant")]
        span: SourceSpan,
    },

    #[error("type '{ty}' has no field '{name}'")]
    #[diagnostic(code(E2036))]
    FieldNotFound {
        ty: String,
        name: String,
        #[label("unknown field")]
        span: SourceSpan,
    },

    #[error("type '{ty}' has no method '{name}'")]
    #[diagnostic(code(E2037))]
    MethodNotFound {
        ty: String,
        name: String,
        #[label("unknown method")]
        span: SourceSpan,
    },

    #[error("struct initializer requires a type from context")]
    #[diagnostic(code(E2038), help("write the struct name: `Name.{{ ... }}`"))]
    StructInitNoContext {
        #[label("cannot infer the struct type")]
        span: SourceSpan,
    },

    #[error("struct initializer used where {expected} was expected")]
    #[diagnostic(code(E2039))]
    StructInitWrongContext {
        expected: String,
        #[label("not a struct context")]
        span: SourceSpan,
    },

    #[error("array initializer requires an array type from context")]
    #[diagnostic(code(E2040))]
    ArrayInitNoContext {
        #[label("cannot infer the element type")]
        span: SourceSpan,
    },

    #[error("array initializer used where {expected} was expected")]
    #[diagnostic(code(E2041))]
    ArrayInitWrongContext {
        expected: String,
        #[label("not an array context")]
        span: SourceSpan,
    },

    #[error("enum literal requires an enum type from context")]
    #[diagnostic(code(E2042))]
    EnumLitNoContext {
        #[label("cannot infer the enum type")]
        span: SourceSpan,
    },

    // -- control flow -------------------------------------------------------
    #[error("not all control-flow paths return a value")]
    #[diagnostic(code(E2050))]
    NotAllPathsReturn {
        #[label("this procedure declares a return type")]
        span: SourceSpan,
    },

    #[error("unreachable statement")]
    #[diagnostic(code(E2051))]
    UnreachableStatement {
        #[label("no control-flow path reaches this")]
        span: SourceSpan,
    },

    #[error("defer cannot be nested inside another defer")]
    #[diagnostic(code(E2052))]
    NestedDefer {
        #[label("nested defer")]
        span: SourceSpan,
    },

    #[error("return is not allowed inside a defer block")]
    #[diagnostic(code(E2053))]
    ReturnInsideDefer {
        #[label("inside defer")]
        span: SourceSpan,
    },

    #[error("break is not allowed inside a defer block")]
    #[diagnostic(code(E2054))]
    BreakInsideDefer {
        #[label("inside defer")]
        span: SourceSpan,
    },

    #[error("continue is not allowed inside a defer block")]
    #[diagnostic(code(E2055))]
    ContinueInsideDefer {
        #[label("inside defer")]
        span: SourceSpan,
    },

    #[error("break outside of a loop")]
    #[diagnostic(code(E2056))]
    BreakOutsideLoop {
        #[label("not inside a `for`")]
        span: SourceSpan,
    },

    #[error("continue outside of a loop")]
    #[diagnostic(code(E2057))]
    ContinueOutsideLoop {
        #[label("not inside a `for`")]
        span: SourceSpan,
    },

    // -- struct layout ------------------------------------------------------
    #[error("struct '{name}' stores itself and has infinite size")]
    #[diagnostic(code(E2060), help("break the cycle with a pointer field"))]
    StructInfiniteSize {
        name: String,
        /// Field access path, innermost to outermost
        chain: String,
        #[label("field access path: {chain}")]
        span: SourceSpan,
    },

    // -- types --------------------------------------------------------------
    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(E2070))]
    TypeMismatch {
        expected: String,
        found: String,
        #[label("type mismatch")]
        span: SourceSpan,
    },

    #[error("variable '{name}' shadows a global constant")]
    #[diagnostic(code(E2071))]
    VarShadowsGlobal {
        name: String,
        #[label("a global with this name exists")]
        span: SourceSpan,
    },

    #[error("variable '{name}' is already declared in this scope")]
    #[diagnostic(code(E2072))]
    VarAlreadyInScope {
        name: String,
        #[label("redeclared here")]
        span: SourceSpan,
    },

    #[error("expected {expected} arguments, found {found}")]
    #[diagnostic(code(E2073))]
    WrongArgumentCount {
        expected: usize,
        found: usize,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("call to '{name}' has no return value to use")]
    #[diagnostic(code(E2074))]
    CallNoReturnValue {
        name: String,
        #[label("used as an expression")]
        span: SourceSpan,
    },

    #[error("call to '{name}' discards its return value")]
    #[diagnostic(code(E2075), help("assign the result or use it in an expression"))]
    CallReturnDiscarded {
        name: String,
        #[label("return value ignored")]
        span: SourceSpan,
    },

    #[error("expected a procedure call statement")]
    #[diagnostic(code(E2076))]
    ExpectedCallStatement {
        #[label("this expression has no effect")]
        span: SourceSpan,
    },

    #[error("compound assignment operators are not supported yet")]
    #[diagnostic(code(E2077), help("write `x = x op value` instead"))]
    AssignOpUnsupported {
        #[label("reserved operator")]
        span: SourceSpan,
    },

    #[error("cannot assign to a procedure call")]
    #[diagnostic(code(E2078))]
    AssignToCall {
        #[label("not an assignable place")]
        span: SourceSpan,
    },

    #[error("field access requires a struct value, found {found}")]
    #[diagnostic(code(E2079))]
    FieldAccessOnNonStruct {
        found: String,
        #[label("not a struct or pointer to struct")]
        span: SourceSpan,
    },

    #[error("array access requires an array value, found {found}")]
    #[diagnostic(code(E2080))]
    IndexOnNonArray {
        found: String,
        #[label("not an array")]
        span: SourceSpan,
    },

    #[error("array index must be an integer, found {found}")]
    #[diagnostic(code(E2081))]
    IndexNotInteger {
        found: String,
        #[label("not an integer")]
        span: SourceSpan,
    },

    #[error("operator '{op}' cannot be applied to {found}")]
    #[diagnostic(code(E2082))]
    InvalidOperand {
        op: String,
        found: String,
        #[label("invalid operand")]
        span: SourceSpan,
    },

    #[error("switch requires an integer or enum value, found {found}")]
    #[diagnostic(code(E2083))]
    SwitchNotIntegerOrEnum {
        found: String,
        #[label("cannot switch on this")]
        span: SourceSpan,
    },

    #[error("switch must have at least one case")]
    #[diagnostic(code(E2084))]
    SwitchZeroCases {
        #[label("empty switch")]
        span: SourceSpan,
    },

    #[error("return value does not match: expected no expression")]
    #[diagnostic(code(E2085))]
    ReturnUnexpectedExpr {
        #[label("this procedure declares no return type")]
        span: SourceSpan,
    },

    #[error("return value missing: expected {expected}")]
    #[diagnostic(code(E2086))]
    ReturnExpectedExpr {
        expected: String,
        #[label("add a return expression")]
        span: SourceSpan,
    },

    // -- casts --------------------------------------------------------------
    #[error("cast source must have a basic type, found {found}")]
    #[diagnostic(code(E2090))]
    CastNonBasicSource {
        found: String,
        #[label("cannot cast this")]
        span: SourceSpan,
    },

    #[error("cannot cast from {from}")]
    #[diagnostic(code(E2091))]
    CastInvalidSource {
        from: String,
        #[label("bool and string cannot be cast")]
        span: SourceSpan,
    },

    #[error("cannot cast into {into}")]
    #[diagnostic(code(E2092))]
    CastInvalidTarget {
        into: String,
        #[label("bool and string are not cast targets")]
        span: SourceSpan,
    },

    #[error("redundant cast: expression already has type {ty}")]
    #[diagnostic(code(E2093))]
    CastRedundant {
        ty: String,
        #[label("cast has no effect")]
        span: SourceSpan,
    },

    // -- constants ----------------------------------------------------------
    #[error("expected a compile-time constant expression")]
    #[diagnostic(code(E2100))]
    ExpectedConstant {
        #[label("not constant")]
        span: SourceSpan,
    },

    #[error("procedure calls are not allowed in constant expressions")]
    #[diagnostic(code(E2101))]
    ConstProcCall {
        #[label("call in constant context")]
        span: SourceSpan,
    },

    #[error("constant expressions can only reference globals, not local variables")]
    #[diagnostic(code(E2102))]
    ConstVarNotGlobal {
        #[label("local variable in constant context")]
        span: SourceSpan,
    },

    #[error("constant dependency cycle: {chain}")]
    #[diagnostic(code(E2103))]
    ConstevalDependencyCycle {
        chain: String,
        #[label("cycle closes here")]
        span: SourceSpan,
    },

    #[error("constant fold overflow in '{op}'")]
    #[diagnostic(code(E2104))]
    FoldOverflow {
        op: String,
        #[label("overflows 64-bit arithmetic")]
        span: SourceSpan,
    },

    #[error("division by zero in constant expression")]
    #[diagnostic(code(E2105))]
    FoldDivisionByZero {
        #[label("divisor is zero")]
        span: SourceSpan,
    },

    #[error("shift count must be smaller than 64")]
    #[diagnostic(code(E2106))]
    FoldShiftOverflow {
        #[label("shift count too large")]
        span: SourceSpan,
    },

    #[error("constant value does not fit in {ty}")]
    #[diagnostic(code(E2107))]
    LiteralOutOfRange {
        ty: String,
        #[label("out of range")]
        span: SourceSpan,
    },
}
