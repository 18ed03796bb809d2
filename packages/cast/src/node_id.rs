use std::collections::BTreeMap;

use cu::pre::*;

/// Stable identity of an AST node within one translation unit
///
/// A NodeId is assigned by the upstream parser (or by [`NodeIdGen`] for
/// trees built in memory). Two syntactically identical nodes always carry
/// distinct ids, which is what anonymous struct layouts are keyed by.
/// Ids are not stable across parser runs.
#[rustfmt::skip]
#[derive(DebugCustom, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, From, Into, Display)]
#[display("0x{:06x}", self.0)]
#[debug("0x{:06x}", self.0)]
pub struct NodeId(pub u32);

impl Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        return de.deserialize_str(Visitor);
        struct Visitor;
        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = NodeId;
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a hex integer literal")
            }
            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                match cu::parse::<u32>(v) {
                    Ok(x) => Ok(NodeId(x)),
                    Err(e) => Err(serde::de::Error::custom(format!(
                        "failed to parse NodeId: {e}"
                    ))),
                }
            }
        }
    }
}

pub type NodeIdMap<T> = BTreeMap<NodeId, T>;

/// Hands out fresh node ids when building an AST in memory
#[derive(Debug, Default)]
pub struct NodeIdGen(u32);

impl NodeIdGen {
    pub fn fresh(&mut self) -> NodeId {
        self.0 += 1;
        NodeId(self.0)
    }
}
