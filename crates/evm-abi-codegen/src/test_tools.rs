//! Aux helpers used by unit tests in this crate: a reference interpreter
//! that executes emitted IL programs against an EVM-style byte-addressable
//! memory, plus helpers that move front-end values in and out of the
//! compiler's memory layout.
#![allow(dead_code)]

use alloy_primitives::U256;

use crate::il::{IlNode, Location, Value};
use crate::value_types::ValueType;

/// A 256-bit word machine with grow-on-touch memory and a stack of named
/// cells for `with` bindings.
pub struct Machine {
    pub memory: Vec<u8>,
    bindings: Vec<(String, U256)>,
}

pub fn to_usize(v: U256) -> usize {
    let limbs = v.as_limbs();
    assert!(
        limbs[1] == 0 && limbs[2] == 0 && limbs[3] == 0,
        "address out of range: {v}"
    );
    limbs[0] as usize
}

fn cell_name(node: &IlNode) -> &str {
    match &node.value {
        Value::Sym(name) => name,
        other => panic!("expected a cell name, found {other:?}"),
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Self {
            memory: Vec::new(),
            bindings: Vec::new(),
        }
    }

    fn touch(&mut self, end: usize) {
        if self.memory.len() < end {
            self.memory.resize(end.next_multiple_of(32), 0);
        }
    }

    pub fn store_word(&mut self, addr: usize, word: U256) {
        self.touch(addr + 32);
        self.memory[addr..addr + 32].copy_from_slice(&word.to_be_bytes::<32>());
    }

    pub fn load_word(&mut self, addr: usize) -> U256 {
        self.touch(addr + 32);
        U256::from_be_slice(&self.memory[addr..addr + 32])
    }

    pub fn write_bytes(&mut self, addr: usize, bytes: &[u8]) {
        self.touch(addr + bytes.len());
        self.memory[addr..addr + bytes.len()].copy_from_slice(bytes);
    }

    pub fn read_bytes(&mut self, addr: usize, len: usize) -> Vec<u8> {
        self.touch(addr + len);
        self.memory[addr..addr + len].to_vec()
    }

    /// Evaluates an IL tree and returns its value.
    pub fn run(&mut self, node: &IlNode) -> U256 {
        match &node.value {
            Value::Num(n) => *n,
            Value::Sym(name) => match name.as_str() {
                "seq" => {
                    let mut last = U256::ZERO;
                    for item in &node.args {
                        last = self.run(item);
                    }
                    last
                }
                "with" => {
                    let cell = cell_name(&node.args[0]).to_string();
                    let init = self.run(&node.args[1]);
                    self.bindings.push((cell, init));
                    let value = self.run(&node.args[2]);
                    self.bindings.pop();
                    value
                }
                "set" => {
                    let cell = cell_name(&node.args[0]).to_string();
                    let value = self.run(&node.args[1]);
                    let slot = self
                        .bindings
                        .iter_mut()
                        .rev()
                        .find(|(name, _)| *name == cell)
                        .unwrap_or_else(|| panic!("set of unbound cell {cell}"));
                    slot.1 = value;
                    U256::ZERO
                }
                "mstore" => {
                    let addr = to_usize(self.run(&node.args[0]));
                    let word = self.run(&node.args[1]);
                    self.store_word(addr, word);
                    U256::ZERO
                }
                "mload" => {
                    let addr = to_usize(self.run(&node.args[0]));
                    self.load_word(addr)
                }
                "mcopy" => {
                    let dst = to_usize(self.run(&node.args[0]));
                    let src = to_usize(self.run(&node.args[1]));
                    let len = to_usize(self.run(&node.args[2]));
                    let data = self.read_bytes(src, len);
                    self.write_bytes(dst, &data);
                    U256::ZERO
                }
                "add" => self.run(&node.args[0]).wrapping_add(self.run(&node.args[1])),
                "sub" => self.run(&node.args[0]).wrapping_sub(self.run(&node.args[1])),
                "mul" => self.run(&node.args[0]).wrapping_mul(self.run(&node.args[1])),
                "ceil32" => {
                    let x = self.run(&node.args[0]);
                    x.wrapping_add(U256::from(31)) / U256::from(32) * U256::from(32)
                }
                "pass" => U256::ZERO,
                "multi" => panic!("literal aggregate reached the interpreter"),
                cell => self
                    .bindings
                    .iter()
                    .rev()
                    .find(|(name, _)| name == cell)
                    .map(|(_, value)| *value)
                    .unwrap_or_else(|| panic!("unbound symbol {cell}")),
            },
        }
    }
}

/// A front-end value for round-trip tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestValue {
    Word(U256),
    Bytes(Vec<u8>),
    Aggregate(Vec<TestValue>),
}

impl TestValue {
    pub fn word(n: u64) -> Self {
        TestValue::Word(U256::from(n))
    }

    pub fn bytes(data: &[u8]) -> Self {
        TestValue::Bytes(data.to_vec())
    }
}

/// Lays `value` out at `addr` in the compiler's memory representation.
pub fn write_value(machine: &mut Machine, addr: usize, typ: &ValueType, value: &TestValue) {
    match (typ, value) {
        (ValueType::Base(_), TestValue::Word(word)) => machine.store_word(addr, *word),
        (
            ValueType::ByteArray { bound } | ValueType::Str { bound },
            TestValue::Bytes(data),
        ) => {
            assert!(data.len() <= *bound, "payload exceeds the type bound");
            machine.store_word(addr, U256::from(data.len()));
            machine.write_bytes(addr + 32, data);
        }
        (composite, TestValue::Aggregate(items)) if composite.is_tuple_like() => {
            let members = composite.members().expect("tuple-like type has members");
            assert_eq!(members.len(), items.len(), "aggregate arity mismatch");
            let mut offset = addr;
            for ((_, member_typ), item) in members.iter().zip(items) {
                write_value(machine, offset, member_typ, item);
                offset += member_typ.memory_size();
            }
        }
        (typ, value) => panic!("value {value:?} does not fit type {typ:?}"),
    }
}

/// Reads the value of type `typ` laid out at `addr`.
pub fn read_value(machine: &mut Machine, addr: usize, typ: &ValueType) -> TestValue {
    match typ {
        ValueType::Base(_) => TestValue::Word(machine.load_word(addr)),
        ValueType::ByteArray { .. } | ValueType::Str { .. } => {
            let len = to_usize(machine.load_word(addr));
            TestValue::Bytes(machine.read_bytes(addr + 32, len))
        }
        composite => {
            let members = composite.members().expect("tuple-like type has members");
            let mut offset = addr;
            let mut items = Vec::with_capacity(members.len());
            for (_, member_typ) in members {
                items.push(read_value(machine, offset, member_typ));
                offset += member_typ.memory_size();
            }
            TestValue::Aggregate(items)
        }
    }
}

/// Reference to a typed value at `addr` in memory.
pub fn memory_ref(addr: usize, typ: ValueType) -> IlNode {
    IlNode::lit(addr)
        .with_type(typ)
        .with_location(Location::Memory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_types::BaseType;

    #[test]
    fn with_bindings_shadow_and_unwind() {
        let mut machine = Machine::new();
        // (with x 1 (seq (with x 2 x) x)) -> inner x reads 2, outer x reads 1
        let program = IlNode::with_binding(
            "x",
            IlNode::lit(1),
            IlNode::seq(vec![
                IlNode::with_binding("x", IlNode::lit(2), IlNode::sym("x")),
                IlNode::sym("x"),
            ]),
        );
        assert_eq!(machine.run(&program), U256::from(1));
    }

    #[test]
    fn set_targets_the_innermost_binding() {
        let mut machine = Machine::new();
        let program = IlNode::with_binding(
            "x",
            IlNode::lit(1),
            IlNode::with_binding(
                "x",
                IlNode::lit(2),
                IlNode::seq(vec![
                    IlNode::set("x", IlNode::add(IlNode::sym("x"), IlNode::lit(10))),
                    IlNode::sym("x"),
                ]),
            ),
        );
        assert_eq!(machine.run(&program), U256::from(12));
    }

    #[test]
    fn arithmetic_wraps_at_256_bits() {
        let mut machine = Machine::new();
        assert_eq!(
            machine.run(&IlNode::sub(IlNode::lit(0), IlNode::lit(1))),
            U256::MAX
        );
        assert_eq!(
            machine.run(&IlNode::mul(IlNode::lit(3), IlNode::lit(4))),
            U256::from(12)
        );
        assert_eq!(machine.run(&IlNode::pass()), U256::ZERO);
    }

    #[test]
    fn memory_words_round_trip() {
        let mut machine = Machine::new();
        machine.run(&IlNode::mstore(IlNode::lit(0x40), IlNode::lit(0x2a)));
        assert_eq!(
            machine.run(&IlNode::mload(IlNode::lit(0x40))),
            U256::from(0x2a)
        );
        // untouched memory reads as zero
        assert_eq!(machine.run(&IlNode::mload(IlNode::lit(0x5000))), U256::ZERO);
    }

    #[test]
    fn ceil32_matches_the_host_helper() {
        let mut machine = Machine::new();
        for x in [0usize, 1, 31, 32, 33, 95, 96] {
            assert_eq!(
                machine.run(&IlNode::ceil32(IlNode::lit(x))),
                U256::from(crate::utils::ceil32(x))
            );
        }
    }

    #[test]
    fn values_round_trip_through_the_memory_layout() {
        let typ = ValueType::Struct {
            members: vec![
                ("id".to_string(), ValueType::Base(BaseType::Uint256)),
                ("tag".to_string(), ValueType::ByteArray { bound: 8 }),
            ],
        };
        let value = TestValue::Aggregate(vec![TestValue::word(9), TestValue::bytes(b"abc")]);

        let mut machine = Machine::new();
        write_value(&mut machine, 0x100, &typ, &value);
        assert_eq!(read_value(&mut machine, 0x100, &typ), value);
    }
}
