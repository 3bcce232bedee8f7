//! Lowering from the front-end value types to ABI descriptors.

use super::AbiType;
use super::error::AbiTypeError;
use crate::value_types::{BaseType, ValueType};

/// ABI descriptor for a front-end type.
///
/// `decimal` is a signed 168-bit fixed-point number with ten decimal
/// places; struct and tuple types both lower to ABI tuples; lists lower to
/// fixed-length arrays.
pub fn abi_type_of(typ: &ValueType) -> Result<AbiType, AbiTypeError> {
    match typ {
        ValueType::Base(BaseType::Uint256) => AbiType::integer(256, false),
        ValueType::Base(BaseType::Int128) => AbiType::integer(128, true),
        ValueType::Base(BaseType::Address) => Ok(AbiType::address()),
        ValueType::Base(BaseType::Bytes32) => AbiType::bytes_m(32),
        ValueType::Base(BaseType::Bool) => Ok(AbiType::boolean()),
        ValueType::Base(BaseType::Decimal) => AbiType::fixed(168, 10, true),
        ValueType::Struct { members } => {
            let members = members
                .iter()
                .map(|(_, typ)| abi_type_of(typ))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AbiType::tuple(members))
        }
        ValueType::Tuple { members } => {
            let members = members
                .iter()
                .map(abi_type_of)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AbiType::tuple(members))
        }
        ValueType::List { elem, count } => Ok(AbiType::static_array(abi_type_of(elem)?, *count)),
        ValueType::ByteArray { bound } => Ok(AbiType::bytes(*bound)),
        ValueType::Str { bound } => Ok(AbiType::string(*bound)),
    }
}
