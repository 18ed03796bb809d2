use std::collections::BTreeMap;

use cu::pre::*;

use cast::{NodeIdMap, Type};

/// A member recorded in a struct layout
///
/// Nested aggregate members are flattened: for a member `s` of struct
/// type containing `x`, both `s` (typed as the inner struct) and the
/// leaf `s.x` appear in the field table, at their absolute offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructField {
    pub ty: Type,
    pub name: String,
}

/// Computed layout of one struct or union definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Struct {
    /// Byte offset to the fields living there, in declaration order.
    /// Unions and anonymous aggregates put multiple names at one offset
    pub fields: BTreeMap<u32, Vec<StructField>>,
    /// For structs, a multiple of `align`; for unions, the largest
    /// member size with no tail padding
    pub size: u32,
    pub align: u32,
}

/// A declared function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub ty: Type,
    pub name: Option<String>,
}

/// A parsed function signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    /// None means the function returns `void`
    pub ret_type: Option<Type>,
    /// None means the declaration had an empty `()`, i.e. unknown arity.
    /// An explicit `(void)` yields an empty list instead
    pub params: Option<Vec<Param>>,
    pub is_variadic: bool,
}

/// Everything the analyzer knows about one translation unit
///
/// Populated once by [`build_typemap`](crate::build_typemap) and read-only
/// afterwards. Layouts are memoized: named definitions under their tag,
/// anonymous ones under their AST node identity.
#[derive(Debug, Default, Clone, Serialize)]
pub struct TypeMap {
    pub typedefs: BTreeMap<String, Type>,
    pub var_types: BTreeMap<String, Type>,
    pub functions: BTreeMap<String, Function>,
    pub named_structs: BTreeMap<String, Struct>,
    pub anon_structs: NodeIdMap<Struct>,
}
