//! IL emission primitives shared by the code generator: reading through a
//! location, addressing a member of a composite, copying a typed value
//! between locations, and padding byte-array tails.

use crate::il::{IlNode, Location};
use crate::value_types::{MemberKey, ValueType};

/// Name of the cell that caches a byte-array source pointer while copying.
const COPY_SRC: &str = "copy_src";

#[derive(Debug, thiserror::Error)]
pub enum SetterError {
    #[error("IL node is missing a type annotation")]
    MissingType,

    #[error("cannot take a member offset of a value without a location")]
    MissingLocation,

    #[error("no member {key:?} in type {typ:?}")]
    UnknownMember { typ: ValueType, key: MemberKey },

    #[error("list index {index} out of range for length {count}")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("generated stores only target memory, found {0:?}")]
    UnsupportedLocation(Location),

    #[error("copy sources must be references to a location")]
    UnlocatedSource,

    #[error("setter types mismatch: expected {expected:?} but found {found:?}")]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },

    #[error("literal aggregate has {found} elements but the destination type has {expected}")]
    AggregateArity { expected: usize, found: usize },
}

/// Turns a reference into a value expression by reading through its location.
/// Nodes without a location already are value expressions.
// TODO: read through calldata and storage once the codec needs to encode
// from those locations; today every source is memory or a literal.
pub fn unwrap_location(node: &IlNode) -> Result<IlNode, SetterError> {
    match node.location {
        None => Ok(node.clone()),
        Some(Location::Memory) => Ok(IlNode::mload(node.clone())),
        Some(other) => Err(SetterError::UnsupportedLocation(other)),
    }
}

/// Reference to the member of `parent` selected by `key`, at the member's
/// offset in the compiler's memory layout. `parent` must be a typed
/// reference; no runtime bounds check is emitted, the caller enumerates
/// in-range keys.
pub fn variable_offset(parent: &IlNode, key: &MemberKey) -> Result<IlNode, SetterError> {
    let typ = parent.typ().ok_or(SetterError::MissingType)?;
    let location = parent.location.ok_or(SetterError::MissingLocation)?;

    let (offset, member_typ) = match (typ, key) {
        (ValueType::Struct { members }, MemberKey::Name(name)) => {
            let mut offset = 0;
            let mut found = None;
            for (member_name, member_typ) in members {
                if member_name == name {
                    found = Some(member_typ);
                    break;
                }
                offset += member_typ.memory_size();
            }
            let member_typ = found.ok_or_else(|| SetterError::UnknownMember {
                typ: typ.clone(),
                key: key.clone(),
            })?;
            (offset, member_typ)
        }
        (ValueType::Tuple { members }, MemberKey::Index(index)) => {
            let member_typ = members.get(*index).ok_or_else(|| SetterError::UnknownMember {
                typ: typ.clone(),
                key: key.clone(),
            })?;
            let offset = members[..*index].iter().map(ValueType::memory_size).sum();
            (offset, member_typ)
        }
        (ValueType::List { elem, count }, MemberKey::Index(index)) => {
            if index >= count {
                return Err(SetterError::IndexOutOfRange {
                    index: *index,
                    count: *count,
                });
            }
            (index * elem.memory_size(), elem.as_ref())
        }
        _ => {
            return Err(SetterError::UnknownMember {
                typ: typ.clone(),
                key: key.clone(),
            });
        }
    };

    Ok(IlNode::add(parent.clone(), IlNode::lit(offset))
        .with_type(member_typ.clone())
        .with_location(location))
}

/// Emits IL copying `src` into the typed reference `dst`.
///
/// Base values are stored as one word; byte arrays are copied as their
/// length word plus data; tuple-like destinations recurse member by member
/// for literal aggregates and copy their whole memory footprint otherwise.
pub fn make_setter(dst: &IlNode, src: &IlNode) -> Result<IlNode, SetterError> {
    let typ = dst.typ().ok_or(SetterError::MissingType)?;
    match dst.location {
        Some(Location::Memory) => {}
        Some(other) => return Err(SetterError::UnsupportedLocation(other)),
        None => return Err(SetterError::MissingLocation),
    }

    match typ {
        ValueType::Base(_) => Ok(IlNode::mstore(dst.clone(), unwrap_location(src)?)),
        ValueType::ByteArray { .. } | ValueType::Str { .. } => {
            if src.location.is_none() {
                return Err(SetterError::UnlocatedSource);
            }
            // Bind the source pointer once; length word plus payload.
            Ok(IlNode::with_binding(
                COPY_SRC,
                src.clone(),
                IlNode::mcopy(
                    dst.clone(),
                    IlNode::sym(COPY_SRC),
                    IlNode::add(IlNode::lit(32), IlNode::mload(IlNode::sym(COPY_SRC))),
                ),
            ))
        }
        ValueType::Struct { .. } | ValueType::Tuple { .. } | ValueType::List { .. } => {
            if src.is_multi() {
                let members = typ.members().expect("tuple-like type has members");
                if members.len() != src.args.len() {
                    return Err(SetterError::AggregateArity {
                        expected: members.len(),
                        found: src.args.len(),
                    });
                }
                let mut items = Vec::with_capacity(members.len());
                for ((key, _), src_member) in members.iter().zip(&src.args) {
                    let dst_member = variable_offset(dst, key)?;
                    items.push(make_setter(&dst_member, src_member)?);
                }
                Ok(IlNode::seq(items))
            } else {
                if let Some(src_typ) = src.typ() {
                    if src_typ != typ {
                        return Err(SetterError::TypeMismatch {
                            expected: typ.clone(),
                            found: src_typ.clone(),
                        });
                    }
                }
                if src.location.is_none() {
                    return Err(SetterError::UnlocatedSource);
                }
                // Same layout on both sides, one flat copy.
                Ok(IlNode::mcopy(
                    dst.clone(),
                    src.clone(),
                    IlNode::lit(typ.memory_size()),
                ))
            }
        }
    }
}

/// Zero-fills the tail of the dynamic byte array at `dst` up to the next
/// 32-byte boundary by storing one zero word at the end of the data. The
/// store may touch up to one word past the boundary; encode buffers keep a
/// word of scratch after their bound and tail writes are sequential, so the
/// touched bytes are never live.
pub fn zero_pad(dst: &IlNode) -> Result<IlNode, SetterError> {
    let typ = dst.typ().ok_or(SetterError::MissingType)?;
    if !matches!(typ, ValueType::ByteArray { .. } | ValueType::Str { .. }) {
        return Err(SetterError::TypeMismatch {
            expected: ValueType::ByteArray { bound: 0 },
            found: typ.clone(),
        });
    }

    Ok(IlNode::with_binding(
        "pad_end",
        IlNode::add(
            IlNode::add(dst.clone(), IlNode::lit(32)),
            IlNode::mload(dst.clone()),
        ),
        IlNode::mstore(IlNode::sym("pad_end"), IlNode::lit(0)),
    ))
}
