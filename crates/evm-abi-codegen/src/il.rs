//! The host compiler's intermediate instruction language.
//!
//! An IL program is an S-expression tree of operators over a 256-bit word
//! machine with byte-addressable memory. Nodes optionally carry a front-end
//! type and a data location; a node with both is a *reference*: an address
//! expression pointing at a value of that type in that location.

use std::fmt;

use alloy_primitives::U256;

use crate::value_types::ValueType;

/// Head value of an IL node: a 256-bit literal or a symbol.
///
/// Symbols double as operator names (`seq`, `mstore`, ...) and as the names
/// of lexically scoped cells introduced by `with` bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Num(U256),
    Sym(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{n}"),
            Value::Sym(s) => f.write_str(s),
        }
    }
}

/// Data location a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Memory,
    Storage,
    Calldata,
    Code,
}

/// A node of the IL tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IlNode {
    pub value: Value,
    pub args: Vec<IlNode>,
    pub typ: Option<ValueType>,
    pub location: Option<Location>,
}

impl IlNode {
    pub fn num(n: U256) -> Self {
        Self {
            value: Value::Num(n),
            args: Vec::new(),
            typ: None,
            location: None,
        }
    }

    /// Numeric literal from a host-side size or offset.
    pub fn lit(n: usize) -> Self {
        Self::num(U256::from(n))
    }

    pub fn sym(name: &str) -> Self {
        Self {
            value: Value::Sym(name.to_string()),
            args: Vec::new(),
            typ: None,
            location: None,
        }
    }

    pub fn op(name: &str, args: Vec<IlNode>) -> Self {
        Self {
            value: Value::Sym(name.to_string()),
            args,
            typ: None,
            location: None,
        }
    }

    /// `(seq ...)` evaluates its items in order and yields the last value.
    pub fn seq(items: Vec<IlNode>) -> Self {
        Self::op("seq", items)
    }

    /// `(with name init body)` binds a fresh lexical cell for `body`.
    /// Rebinding an outer name shadows it for the extent of `body`.
    pub fn with_binding(name: &str, init: IlNode, body: IlNode) -> Self {
        Self::op("with", vec![Self::sym(name), init, body])
    }

    /// `(set name expr)` assigns the innermost cell named `name`.
    pub fn set(name: &str, expr: IlNode) -> Self {
        Self::op("set", vec![Self::sym(name), expr])
    }

    pub fn mstore(addr: IlNode, word: IlNode) -> Self {
        Self::op("mstore", vec![addr, word])
    }

    pub fn mload(addr: IlNode) -> Self {
        Self::op("mload", vec![addr])
    }

    /// `(mcopy dst src len)` copies `len` bytes between memory regions,
    /// with EVM MCOPY overlap semantics.
    pub fn mcopy(dst: IlNode, src: IlNode, len: IlNode) -> Self {
        Self::op("mcopy", vec![dst, src, len])
    }

    pub fn add(a: IlNode, b: IlNode) -> Self {
        Self::op("add", vec![a, b])
    }

    pub fn sub(a: IlNode, b: IlNode) -> Self {
        Self::op("sub", vec![a, b])
    }

    pub fn mul(a: IlNode, b: IlNode) -> Self {
        Self::op("mul", vec![a, b])
    }

    /// `(ceil32 x)` rounds up to the nearest 32-byte boundary.
    pub fn ceil32(x: IlNode) -> Self {
        Self::op("ceil32", vec![x])
    }

    /// The no-op.
    pub fn pass() -> Self {
        Self::sym("pass")
    }

    /// Literal aggregate whose args are its elements in order.
    pub fn multi(items: Vec<IlNode>) -> Self {
        Self::op("multi", items)
    }

    pub fn with_type(mut self, typ: ValueType) -> Self {
        self.typ = Some(typ);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn typ(&self) -> Option<&ValueType> {
        self.typ.as_ref()
    }

    pub fn is_multi(&self) -> bool {
        matches!(&self.value, Value::Sym(s) if s == "multi")
    }
}

impl fmt::Display for IlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "({}", self.value)?;
            for arg in &self.args {
                write!(f, " {arg}")?;
            }
            f.write_str(")")
        }
    }
}
