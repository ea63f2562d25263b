//! Error types for native callables

use crate::TypeId;

/// Result type for native calls
pub type AbiResult<T> = Result<T, NativeError>;

/// Errors raised inside native callables.
///
/// The call convention itself only reports success or failure, so these are
/// folded into `false` by [`native_fn`](crate::native_fn).
#[derive(Debug, Clone, thiserror::Error)]
pub enum NativeError {
    /// Argument carried a different type id than the callable expects
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type id
        expected: TypeId,
        /// Actual type id
        got: TypeId,
    },

    /// Wrong number of arguments
    #[error("Expected {expected} arguments, got {got}")]
    ArgumentCount {
        /// Declared arity
        expected: usize,
        /// Supplied arity
        got: usize,
    },

    /// Argument slot has no backing storage
    #[error("Argument {0} is null")]
    NullArgument(usize),

    /// Callable needs a return slot but none was supplied
    #[error("Missing return slot")]
    MissingReturnSlot,

    /// Object handle was null
    #[error("Null object handle")]
    NullHandle,

    /// Anything else reported by the native side
    #[error("{0}")]
    AbiError(String),
}

impl From<String> for NativeError {
    fn from(s: String) -> Self {
        NativeError::AbiError(s)
    }
}

impl From<&str> for NativeError {
    fn from(s: &str) -> Self {
        NativeError::AbiError(s.to_string())
    }
}
