//! ABI codec core of the contract code generator.
//!
//! Maps the compiler's value-type lattice onto the Ethereum Contract ABI
//! layout and emits IL programs that encode typed values into memory buffers
//! or decode such buffers back into typed destinations. The codec is a pure
//! tree-to-tree transformation: it consumes typed [`il::IlNode`] trees and
//! returns new trees for the downstream lowering passes.

pub mod abi_types;
pub mod il;
pub mod setters;
pub mod utils;
pub mod value_types;

#[cfg(test)]
mod test_tools;

pub use abi_types::error::{AbiTypeError, CodegenError};
pub use abi_types::packing::abi_encode;
pub use abi_types::type_mapping::abi_type_of;
pub use abi_types::unpacking::abi_decode;
pub use abi_types::{AbiType, child_elements};
