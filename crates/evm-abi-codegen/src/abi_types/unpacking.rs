//! Decoder: emits an IL program that copies an ABI-encoded buffer into
//! typed destinations.
//!
//! The buffer is trusted: it was produced by a conforming encoder and is
//! not length-checked here. Bounding the input is the caller's concern.

use super::child_elements;
use super::error::CodegenError;
use super::type_mapping::abi_type_of;
use crate::il::{IlNode, Location};
use crate::setters::make_setter;

/// Pointer to the beginning of the buffer.
const SRC: &str = "src";
/// Read cursor in the static section.
const SRC_LOC: &str = "src_loc";

/// Emits an IL program reading the ABI buffer at `src` into the typed
/// destination `node`.
///
/// Static members are read from the head in place; a dynamic member's head
/// slot holds the offset of its payload, relative to the enclosing tuple's
/// start, and decoding recurses there. The head cursor is a plain cell;
/// typed references to it are built per child.
pub fn abi_decode(node: &IlNode, src: &IlNode) -> Result<IlNode, CodegenError> {
    let typ = node.typ().ok_or(CodegenError::MissingType)?.clone();
    let parent_abi = abi_type_of(&typ)?;
    let src_location = src.location.unwrap_or(Location::Memory);

    let children = child_elements(node)?;
    let mut body = Vec::new();

    for (i, child) in children.iter().enumerate() {
        let child_typ = child.typ().ok_or(CodegenError::MissingType)?.clone();
        let child_abi = abi_type_of(&child_typ)?;

        if parent_abi.is_tuple() {
            // a zero-length array owns no head slot, so there is no offset
            // to read through; its recursion decodes nothing
            let child_loc = if child_abi.is_dynamic() && child_abi.static_size() > 0 {
                // the head slot holds the payload's offset into the buffer
                IlNode::add(IlNode::sym(SRC), IlNode::mload(IlNode::sym(SRC_LOC)))
            } else {
                IlNode::sym(SRC_LOC)
            };
            body.push(abi_decode(child, &child_loc)?);
        } else {
            let cursor = IlNode::sym(SRC_LOC)
                .with_type(child_typ.clone())
                .with_location(src_location);
            body.push(make_setter(child, &cursor)?);
        }

        // the last advance is dead and elided
        if i + 1 != children.len() {
            body.push(IlNode::set(
                SRC_LOC,
                IlNode::add(IlNode::sym(SRC_LOC), IlNode::lit(child_abi.static_size())),
            ));
        }
    }

    Ok(IlNode::with_binding(
        SRC,
        src.clone(),
        IlNode::with_binding(SRC_LOC, IlNode::sym(SRC), IlNode::seq(body)),
    ))
}
