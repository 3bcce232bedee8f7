//! Encoder: emits an IL program that lays a typed value out in a
//! caller-supplied memory buffer according to the Contract ABI.

use super::child_elements;
use super::error::CodegenError;
use super::type_mapping::abi_type_of;
use crate::il::{IlNode, Location};
use crate::setters::{make_setter, zero_pad};
use crate::value_types::ValueType;

/// Pointer to the beginning of the buffer.
const DST: &str = "dst";
/// Write cursor in the static section.
const DST_LOC: &str = "dst_loc";
/// Current offset of the dynamic section, relative to the buffer start.
const DYN_OFST: &str = "dyn_ofst";

/// Emits an IL program writing `node` into the memory buffer at `dst`.
///
/// `dst` may be any IL expression; it is evaluated once and cached in a
/// cell. When `bufsz` is given it is checked against the type's
/// `static_size + dynamic_size_bound`. That check excludes the word of
/// scratch that tail padding can touch past the bound, so callers keep one
/// spare word after the buffer. With `returns`, the program's value is the
/// number of bytes written.
///
/// Tuple-like values reserve one head slot per member and write dynamic
/// members' payloads to the tail behind an offset; a bare dynamic value at
/// the top level is written directly, with no leading offset. Emission
/// re-walks the child list once per nesting level, so emitter time is
/// quadratic in the nesting depth; the emitted program runs in time linear
/// in the payload.
pub fn abi_encode(
    dst: &IlNode,
    node: &IlNode,
    bufsz: Option<usize>,
    returns: bool,
) -> Result<IlNode, CodegenError> {
    let typ = node.typ().ok_or(CodegenError::MissingType)?.clone();
    let parent_abi = abi_type_of(&typ)?;

    let size_bound = parent_abi.static_size() + parent_abi.dynamic_size_bound();
    if let Some(bufsz) = bufsz {
        if bufsz < size_bound {
            return Err(CodegenError::BufferTooSmall {
                required: size_bound,
                provided: bufsz,
            });
        }
    }

    let children = child_elements(node)?;
    let mut body = Vec::new();

    for (i, child) in children.iter().enumerate() {
        let child_typ = child.typ().ok_or(CodegenError::MissingType)?.clone();
        let child_abi = abi_type_of(&child_typ)?;

        if parent_abi.is_tuple() {
            // a zero-length array is vacuously dynamic: it owns no head
            // slot and no tail, so it takes the inline path, which emits
            // nothing for it
            if child_abi.is_dynamic() && child_abi.static_size() > 0 {
                // reserve the head slot with the child's tail offset, then
                // write the payload there and advance the tail cursor by
                // the bytes the recursive program reports
                body.push(IlNode::mstore(IlNode::sym(DST_LOC), IlNode::sym(DYN_OFST)));
                let child_dst = IlNode::add(IlNode::sym(DST), IlNode::sym(DYN_OFST));
                let written = abi_encode(&child_dst, child, None, true)?;
                body.push(IlNode::set(
                    DYN_OFST,
                    IlNode::add(IlNode::sym(DYN_OFST), written),
                ));
            } else {
                body.push(abi_encode(&IlNode::sym(DST_LOC), child, None, false)?);
            }
        } else {
            match &child_typ {
                ValueType::Base(_) => {
                    let head = IlNode::sym(DST_LOC)
                        .with_type(child_typ.clone())
                        .with_location(Location::Memory);
                    body.push(make_setter(&head, child)?);
                }
                ValueType::ByteArray { .. } | ValueType::Str { .. } => {
                    let head = IlNode::sym(DST_LOC)
                        .with_type(child_typ.clone())
                        .with_location(Location::Memory);
                    body.push(IlNode::seq(vec![
                        make_setter(&head, child)?,
                        zero_pad(&head)?,
                    ]));
                }
                other => return Err(CodegenError::NotAbiEncodable(other.clone())),
            }
        }

        // the last advance is dead and elided
        if i + 1 != children.len() {
            body.push(IlNode::set(
                DST_LOC,
                IlNode::add(IlNode::sym(DST_LOC), IlNode::lit(child_abi.static_size())),
            ));
        }
    }

    if returns {
        if !parent_abi.is_dynamic() {
            body.push(IlNode::lit(parent_abi.static_size()));
        } else if parent_abi.is_tuple() {
            // head slots plus every tail written so far
            body.push(IlNode::sym(DYN_OFST));
        } else if matches!(typ, ValueType::ByteArray { .. } | ValueType::Str { .. }) {
            // length word plus zero-padded payload, read back from the
            // length just written at the (never advanced) cursor
            body.push(IlNode::ceil32(IlNode::add(
                IlNode::lit(32),
                IlNode::mload(IlNode::sym(DST_LOC)),
            )));
        } else {
            return Err(CodegenError::NotAbiEncodable(typ));
        }
    }

    let mut program = IlNode::seq(body);
    if parent_abi.is_dynamic() && parent_abi.is_tuple() {
        let mut dyn_section_start = 0;
        for child in &children {
            let child_typ = child.typ().ok_or(CodegenError::MissingType)?;
            dyn_section_start += abi_type_of(child_typ)?.static_size();
        }
        program = IlNode::with_binding(DYN_OFST, IlNode::lit(dyn_section_start), program);
    }

    Ok(IlNode::with_binding(
        DST,
        dst.clone(),
        IlNode::with_binding(DST_LOC, IlNode::sym(DST), program),
    ))
}
