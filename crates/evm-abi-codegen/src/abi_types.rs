//! ABI-level type descriptors and the child enumerator shared by the
//! packing and unpacking emitters.
//!
//! A descriptor mirrors the Contract ABI's static/dynamic partitioning of a
//! front-end type. `static_size` is the slot the value occupies in its
//! parent aggregate's head (always one word for dynamic values, where the
//! slot holds an offset); `dynamic_size_bound` caps what the value can
//! contribute to the tail. `is_tuple` drives the encoding shape: a bare
//! `bytes` is laid out as `<len> <data>`, the same value wrapped in a
//! one-element tuple as `<ofst> <len> <data>`.

pub mod error;
pub mod packing;
pub mod type_mapping;
pub mod unpacking;

use crate::il::IlNode;
use crate::setters::variable_offset;
use crate::utils::ceil32;
#[cfg(test)]
use crate::value_types::ValueType;
use error::{AbiTypeError, CodegenError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    /// `uint<M>` / `int<M>`.
    GIntM { m_bits: usize, signed: bool },
    /// Laid out as `uint160`; distinct tag for the selector name.
    Address,
    /// Laid out as `uint8` restricted to 0 and 1; distinct tag for the
    /// selector name.
    Bool,
    /// `fixed<M>x<N>` / `ufixed<M>x<N>`.
    FixedMxN {
        m_bits: usize,
        n_places: usize,
        signed: bool,
    },
    /// `bytes<M>`, right-padded in its word.
    BytesM { m_bytes: usize },
    /// Address plus selector, laid out as `bytes24`; distinct tag for the
    /// selector name.
    Function,
    /// `<type>[M]`.
    StaticArray { elem: Box<AbiType>, count: usize },
    /// `bytes`, with the front end's length bound.
    Bytes { bound: usize },
    /// `string`, with the front end's length bound.
    String { bound: usize },
    /// `<type>[]`, with the front end's element-count bound.
    DynamicArray { elem: Box<AbiType>, bound: usize },
    Tuple { members: Vec<AbiType> },
}

fn check_word_width(m_bits: usize) -> bool {
    m_bits > 0 && m_bits <= 256 && m_bits % 8 == 0
}

impl AbiType {
    pub fn integer(m_bits: usize, signed: bool) -> Result<Self, AbiTypeError> {
        if !check_word_width(m_bits) {
            return Err(AbiTypeError::InvalidIntegerWidth { m_bits });
        }
        Ok(AbiType::GIntM { m_bits, signed })
    }

    pub fn address() -> Self {
        AbiType::Address
    }

    pub fn boolean() -> Self {
        AbiType::Bool
    }

    pub fn fixed(m_bits: usize, n_places: usize, signed: bool) -> Result<Self, AbiTypeError> {
        if !check_word_width(m_bits) {
            return Err(AbiTypeError::InvalidFixedWidth { m_bits });
        }
        if n_places == 0 || n_places > 80 {
            return Err(AbiTypeError::InvalidFixedScale { n_places });
        }
        Ok(AbiType::FixedMxN {
            m_bits,
            n_places,
            signed,
        })
    }

    pub fn bytes_m(m_bytes: usize) -> Result<Self, AbiTypeError> {
        if m_bytes == 0 || m_bytes > 32 {
            return Err(AbiTypeError::InvalidBytesWidth { m_bytes });
        }
        Ok(AbiType::BytesM { m_bytes })
    }

    pub fn function_pointer() -> Self {
        AbiType::Function
    }

    pub fn static_array(elem: AbiType, count: usize) -> Self {
        AbiType::StaticArray {
            elem: Box::new(elem),
            count,
        }
    }

    pub fn bytes(bound: usize) -> Self {
        AbiType::Bytes { bound }
    }

    pub fn string(bound: usize) -> Self {
        AbiType::String { bound }
    }

    pub fn dynamic_array(elem: AbiType, bound: usize) -> Self {
        AbiType::DynamicArray {
            elem: Box::new(elem),
            bound,
        }
    }

    pub fn tuple(members: Vec<AbiType>) -> Self {
        AbiType::Tuple { members }
    }

    /// Whether the value owns a tail in the dynamic section.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes { .. } | AbiType::String { .. } | AbiType::DynamicArray { .. } => true,
            AbiType::StaticArray { elem, .. } => elem.is_dynamic(),
            AbiType::Tuple { members } => members.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Bytes occupied in the parent aggregate's head: one word for scalars
    /// and for every dynamic value (the offset slot), the summed member
    /// slots for static aggregates. A zero-length array occupies no slot
    /// at all, even when its element type is dynamic.
    pub fn static_size(&self) -> usize {
        match self {
            AbiType::StaticArray { elem, count } => {
                if *count > 0 && self.is_dynamic() {
                    32
                } else {
                    count * elem.static_size()
                }
            }
            AbiType::Tuple { members } => {
                if self.is_dynamic() {
                    32
                } else {
                    members.iter().map(AbiType::static_size).sum()
                }
            }
            _ => 32,
        }
    }

    /// Upper bound, in bytes, on the value's tail contribution.
    pub fn dynamic_size_bound(&self) -> usize {
        match self {
            AbiType::Bytes { bound } | AbiType::String { bound } => 32 + ceil32(*bound),
            AbiType::StaticArray { elem, count } => count * elem.dynamic_size_bound(),
            AbiType::DynamicArray { elem, bound } => bound * elem.dynamic_size_bound(),
            AbiType::Tuple { members } => members.iter().map(AbiType::dynamic_size_bound).sum(),
            _ => 0,
        }
    }

    /// Canonical name used to derive function selectors.
    pub fn selector_name(&self) -> String {
        match self {
            AbiType::GIntM { m_bits, signed } => {
                format!("{}int{m_bits}", if *signed { "" } else { "u" })
            }
            AbiType::Address => "address".to_string(),
            AbiType::Bool => "bool".to_string(),
            AbiType::FixedMxN {
                m_bits,
                n_places,
                signed,
            } => format!("{}fixed{m_bits}x{n_places}", if *signed { "" } else { "u" }),
            AbiType::BytesM { m_bytes } => format!("bytes{m_bytes}"),
            AbiType::Function => "function".to_string(),
            AbiType::StaticArray { elem, count } => {
                format!("{}[{count}]", elem.selector_name())
            }
            AbiType::Bytes { .. } => "bytes".to_string(),
            AbiType::String { .. } => "string".to_string(),
            AbiType::DynamicArray { elem, .. } => format!("{}[]", elem.selector_name()),
            AbiType::Tuple { members } => {
                let names: Vec<String> = members.iter().map(AbiType::selector_name).collect();
                format!("({})", names.join(","))
            }
        }
    }

    /// Whether the value is a tuple at the ABI level, i.e. reserves head
    /// slots for its members. A `DynamicArray` is not: its inner length and
    /// head/tail section live in the tail, written by the setter
    /// infrastructure, while the parent head only carries its offset.
    pub fn is_tuple(&self) -> bool {
        matches!(self, AbiType::StaticArray { .. } | AbiType::Tuple { .. })
    }
}

/// Ordered IL nodes for the children of `node` at the encoding level.
///
/// Scalars and byte arrays are their own sole child; a literal `multi`
/// aggregate yields its elements unchanged; any other aggregate yields one
/// member reference per key. Composes subtree references only, never
/// allocates IL cells.
pub fn child_elements(node: &IlNode) -> Result<Vec<IlNode>, CodegenError> {
    let typ = node.typ().ok_or(CodegenError::MissingType)?;
    if !typ.is_tuple_like() {
        return Ok(vec![node.clone()]);
    }
    if node.is_multi() {
        return Ok(node.args.clone());
    }
    let members = typ.members().expect("tuple-like type has members");
    let mut children = Vec::with_capacity(members.len());
    for (key, _) in members {
        children.push(variable_offset(node, &key)?);
    }
    Ok(children)
}
