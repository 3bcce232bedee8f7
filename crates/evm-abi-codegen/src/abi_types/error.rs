use crate::setters::SetterError;
use crate::value_types::ValueType;

/// An illegal descriptor parameter. Indicates a compiler bug upstream of
/// the codec; the current compilation is aborted.
#[derive(Debug, thiserror::Error)]
pub enum AbiTypeError {
    #[error("invalid integer width {m_bits}, expected a multiple of 8 in 8..=256")]
    InvalidIntegerWidth { m_bits: usize },

    #[error("invalid fixed-point width {m_bits}, expected a multiple of 8 in 8..=256")]
    InvalidFixedWidth { m_bits: usize },

    #[error("invalid fixed-point scale {n_places}, expected 1..=80")]
    InvalidFixedScale { n_places: usize },

    #[error("invalid fixed bytes width {m_bytes}, expected 1..=32")]
    InvalidBytesWidth { m_bytes: usize },
}

/// Failure while emitting an encode or decode program. Like
/// [`AbiTypeError`], these only arise from ill-formed compiler input and
/// are never recovered.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("abi type error: {0}")]
    AbiType(#[from] AbiTypeError),

    #[error("setter error: {0}")]
    Setter(#[from] SetterError),

    #[error("IL node is missing a type annotation")]
    MissingType,

    #[error("encode buffer holds {provided} bytes but the value needs up to {required}")]
    BufferTooSmall { required: usize, provided: usize },

    #[error("type {0:?} cannot be laid out at this point of an ABI value")]
    NotAbiEncodable(ValueType),
}
