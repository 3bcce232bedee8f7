//! The front-end value-type tree consumed by the codec.
//!
//! These are the compiler's own types, before ABI lowering. Aggregates carry
//! an ordered member list; byte arrays and strings carry the maximum length
//! the front end proved for them.

use crate::utils::ceil32;

/// Single-word base types of the front-end alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Uint256,
    Int128,
    Address,
    Bytes32,
    Bool,
    Decimal,
}

/// Key addressing one member of a tuple-like value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKey {
    Name(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Base(BaseType),
    /// Named, ordered fields.
    Struct { members: Vec<(String, ValueType)> },
    /// Positional, ordered fields.
    Tuple { members: Vec<ValueType> },
    /// Fixed-length homogeneous array.
    List { elem: Box<ValueType>, count: usize },
    /// Variable-length byte blob with a compile-time length bound.
    ByteArray { bound: usize },
    /// Like `ByteArray`, distinct for selector purposes.
    Str { bound: usize },
}

impl ValueType {
    /// Whether the type is an aggregate with addressable members.
    pub fn is_tuple_like(&self) -> bool {
        matches!(
            self,
            ValueType::Struct { .. } | ValueType::Tuple { .. } | ValueType::List { .. }
        )
    }

    /// Ordered member keys and types, for tuple-like values.
    pub fn members(&self) -> Option<Vec<(MemberKey, &ValueType)>> {
        match self {
            ValueType::Struct { members } => Some(
                members
                    .iter()
                    .map(|(name, typ)| (MemberKey::Name(name.clone()), typ))
                    .collect(),
            ),
            ValueType::Tuple { members } => Some(
                members
                    .iter()
                    .enumerate()
                    .map(|(i, typ)| (MemberKey::Index(i), typ))
                    .collect(),
            ),
            ValueType::List { elem, count } => Some(
                (0..*count)
                    .map(|i| (MemberKey::Index(i), elem.as_ref()))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Bytes this type occupies in the compiler's in-memory representation:
    /// one word per base value, a length word plus padded data for byte
    /// arrays, members laid out back to back for aggregates.
    pub fn memory_size(&self) -> usize {
        match self {
            ValueType::Base(_) => 32,
            ValueType::ByteArray { bound } | ValueType::Str { bound } => 32 + ceil32(*bound),
            ValueType::List { elem, count } => count * elem.memory_size(),
            ValueType::Struct { members } => {
                members.iter().map(|(_, typ)| typ.memory_size()).sum()
            }
            ValueType::Tuple { members } => members.iter().map(ValueType::memory_size).sum(),
        }
    }
}
