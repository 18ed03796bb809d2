use cu::pre::*;

use crate::{Expr, NodeId};

/// A parsed C translation unit, as handed over by the upstream parser
///
/// Only declaration-level constructs are represented: typedefs, type
/// definitions, global variable declarations and function prototypes.
/// Statement and expression bodies never reach the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub items: Vec<Item>,
}

/// A top-level item of a translation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Typedef(Typedef),
    Decl(Decl),
    FuncDef(FuncDef),
}

/// `typedef <ty> <name>;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typedef {
    pub name: String,
    pub ty: Type,
}

/// A declaration: a declarator-shaped type with an optional name
///
/// Used both for top-level declarations and for struct/union members;
/// `bitsize` is only ever present on members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decl {
    pub name: Option<String>,
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitsize: Option<Expr>,
}

/// A function definition. The body is not carried over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDef {
    pub decl: Decl,
}

/// A C type in declarator form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// The leaf of a declarator: an optional declared name wrapping a
    /// type specifier
    Decl(TypeDecl),
    /// Pointer to the inner type
    Ptr(Box<Type>),
    /// Array of the inner type
    Array(ArrayDecl),
    /// Function type
    Func(FuncDecl),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub declname: Option<String>,
    pub spec: TypeSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayDecl {
    pub elem: Box<Type>,
    /// Dimension expression; None for `[]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDecl {
    /// Declared parameters; None when the declaration has an empty `()`
    pub params: Option<Vec<ParamDecl>>,
    pub ret: Box<Type>,
}

/// The specifier at the leaf of a declarator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeSpec {
    /// Identifier list, e.g. `["unsigned", "long", "long"]`, or a single
    /// typedef name
    Ident(Vec<String>),
    Enum(EnumSpec),
    /// Struct or union
    Aggregate(AggregateSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSpec {
    pub name: Option<String>,
    /// Enumerators; None for a bare tag reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Enumerator>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Expr>,
}

/// A struct or union specifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSpec {
    /// Node identity, unique within the translation unit. Anonymous
    /// definitions are memoized under this id
    pub id: NodeId,
    pub kind: AggregateKind,
    pub name: Option<String>,
    /// Member items; None for a tag reference to an incomplete type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decls: Option<Vec<MemberItem>>,
}

impl AggregateSpec {
    /// Tag rendering, e.g. `struct Foo` or `anon union`
    pub fn tag(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {name}", self.kind.keyword()),
            None => format!("anon {}", self.kind.keyword()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Struct,
    Union,
}

impl AggregateKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Union => "union",
        }
    }
}

/// One item of a struct/union member list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberItem {
    /// A member declaration
    Field(Decl),
    /// A bare tag introduction with no declarator, e.g. `enum E { A };`
    /// inside a struct. Takes no storage
    Tag(TypeSpec),
}

/// One entry of a declared parameter list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamDecl {
    Decl(Decl),
    /// An unnamed parameter spelled as a bare type
    Typename(Type),
    /// A bare identifier from a K&R-style parameter list
    Id(String),
    Ellipsis,
}

/// Make a plain type from an identifier list, e.g. `basic_type(&["int"])`
pub fn basic_type(names: &[&str]) -> Type {
    Type::Decl(TypeDecl {
        declname: None,
        spec: TypeSpec::Ident(names.iter().map(|x| x.to_string()).collect()),
    })
}

/// Wrap a type in a pointer
pub fn pointer(ty: Type) -> Type {
    Type::Ptr(Box::new(ty))
}

impl Type {
    /// Whether the type is exactly `void`
    pub fn is_void(&self) -> bool {
        if let Type::Decl(td) = self
            && let TypeSpec::Ident(names) = &td.spec
        {
            *names == ["void"]
        } else {
            false
        }
    }
}
