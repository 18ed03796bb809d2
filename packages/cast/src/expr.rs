use cu::pre::*;

/// The subset of C expressions that appear in declarations
///
/// Array dimensions, bitfield widths and enumerator values are the only
/// expression positions the analyzer sees. Anything the upstream parser
/// cannot map onto these variants still deserializes (operators are kept
/// as source text), and the constant folder decides what it supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal, kept as source text, e.g. `"0x20"` or `"7L"`
    Constant(String),
    /// An identifier reference
    Ident(String),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryExpr {
    /// Operator as source text, e.g. `"<<"`
    pub op: String,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: String,
    pub expr: Box<Expr>,
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(text) => write!(f, "{text}"),
            Self::Ident(name) => write!(f, "{name}"),
            Self::Binary(b) => write!(f, "({} {} {})", b.left, b.op, b.right),
            Self::Unary(u) => write!(f, "{}{}", u.op, u.expr),
        }
    }
}
