//! Marshal value model
//!
//! Every value crossing the boundary is a [`MarshalledValue`] whose tag is one
//! of the closed [`MarshalKind`]s. Conversion to the native call
//! representation allocates backing storage from a per-call [`ScratchArena`].

mod arena;
mod convert;
mod kind;
mod value;

pub use arena::ScratchArena;
pub use convert::{allocate_return_slot, marshal_from_native, marshal_to_native};
pub use kind::MarshalKind;
pub use value::MarshalledValue;

/// Errors raised while converting a value to or from the native representation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarshalError {
    /// Value tag does not match the slot's kind
    #[error("expected {expected}, got {found}")]
    KindMismatch {
        /// Kind declared by the slot
        expected: MarshalKind,
        /// Kind of the supplied value
        found: MarshalKind,
    },

    /// Slot of unknown kind needs an opaque handle
    #[error("type '{type_name}' can only be passed as an opaque handle")]
    MissingHandle {
        /// Declared type name of the slot
        type_name: String,
    },

    /// No storage can be allocated for the kind
    #[error("unsupported value kind {0}")]
    Unsupported(MarshalKind),

    /// Value could not be decoded
    #[error("malformed value: {0}")]
    Malformed(String),
}
