//! Dispatch results and errors

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::marshal::{MarshalError, MarshalledValue};

/// Coarse failure classification reported across the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchErrorKind {
    /// Class, channel, method, property or global is absent
    NotFound,
    /// Descriptor present but has no native callable
    NoBinding,
    /// No same-named overload takes the supplied argument count
    ArityMismatch,
    /// A value could not be converted
    MarshalFailure,
    /// The native call reported failure
    InvocationFailure,
    /// Path not available for this target
    NotImplemented,
    /// No catalog has been built
    Uninitialized,
}

/// Which family of call a lookup was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallFlavor {
    /// Static method
    Static,
    /// Instance method
    Instance,
    /// Free function
    Global,
}

impl fmt::Display for CallFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallFlavor::Static => write!(f, "Static"),
            CallFlavor::Instance => write!(f, "Instance"),
            CallFlavor::Global => write!(f, "Global"),
        }
    }
}

/// Dispatch failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// Verb called before a catalog was published
    #[error("Dispatcher not initialized")]
    Uninitialized,

    /// Class lookup miss
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// Method lookup miss
    #[error("{flavor} method not found: {target}")]
    MethodNotFound {
        /// Call family
        flavor: CallFlavor,
        /// `Class.Method` or free function name
        target: String,
    },

    /// Name matched, arity did not
    #[error("{flavor} method not found: {target} (no overload takes {supplied} arguments; available: {available:?})")]
    ArityMismatch {
        /// Call family
        flavor: CallFlavor,
        /// `Class.Method` or free function name
        target: String,
        /// Supplied argument count
        supplied: usize,
        /// Arities of the same-named overloads
        available: Vec<usize>,
    },

    /// No constructor of the requested arity
    #[error("Failed to create instance of {class}: no constructor takes {supplied} arguments")]
    NoConstructor {
        /// Class name
        class: String,
        /// Supplied argument count
        supplied: usize,
    },

    /// Property lookup miss
    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    /// Channel lookup miss
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// Event lookup miss
    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// Event argument count mismatch
    #[error("Event {target} takes {expected} arguments, got {supplied}")]
    EventArity {
        /// `Channel.Event`
        target: String,
        /// Declared count
        expected: usize,
        /// Supplied count
        supplied: usize,
    },

    /// Descriptor present without a callable
    #[error("{0} has no native binding")]
    NoBinding(String),

    /// Read of a property without getter
    #[error("Property is write-only: {0}")]
    WriteOnly(String),

    /// Write of a property without setter
    #[error("Property is read-only: {0}")]
    ReadOnly(String),

    /// Null receiver
    #[error("Instance handle is null")]
    NullInstance,

    /// Argument conversion failed
    #[error("Failed to marshal argument {index}: {source}")]
    Argument {
        /// Zero-based argument index
        index: usize,
        /// Underlying failure
        source: MarshalError,
    },

    /// Non-argument conversion failed (result, address, decoded input)
    #[error("Failed to marshal value: {0}")]
    Value(#[source] MarshalError),

    /// Native call reported failure
    #[error("Method invocation failed: {0}")]
    InvocationFailed(String),

    /// Delivery path not available
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl DispatchError {
    /// Coarse classification
    pub fn kind(&self) -> DispatchErrorKind {
        match self {
            DispatchError::Uninitialized => DispatchErrorKind::Uninitialized,
            DispatchError::ClassNotFound(_)
            | DispatchError::MethodNotFound { .. }
            | DispatchError::PropertyNotFound(_)
            | DispatchError::ChannelNotFound(_)
            | DispatchError::EventNotFound(_) => DispatchErrorKind::NotFound,
            DispatchError::ArityMismatch { .. }
            | DispatchError::NoConstructor { .. }
            | DispatchError::EventArity { .. } => DispatchErrorKind::ArityMismatch,
            DispatchError::NoBinding(_) | DispatchError::WriteOnly(_) | DispatchError::ReadOnly(_) => {
                DispatchErrorKind::NoBinding
            }
            DispatchError::NullInstance | DispatchError::Argument { .. } | DispatchError::Value(_) => {
                DispatchErrorKind::MarshalFailure
            }
            DispatchError::InvocationFailed(_) => DispatchErrorKind::InvocationFailure,
            DispatchError::NotImplemented(_) => DispatchErrorKind::NotImplemented,
        }
    }

    /// Index of the failing argument, for argument marshal failures
    pub fn failing_index(&self) -> Option<usize> {
        match self {
            DispatchError::Argument { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Outcome of a dispatcher verb.
///
/// Verbs never panic or return `Err`; every failure is folded in here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResult {
    /// Success flag
    pub success: bool,
    /// Human-readable failure message, empty on success
    pub error_message: String,
    /// Returned value, `Void` on failure or for void calls
    pub return_value: MarshalledValue,
    /// Failure classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<DispatchErrorKind>,
    /// Failing argument index for argument marshal failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_index: Option<usize>,
}

impl DispatchResult {
    /// Successful result
    pub fn success(value: MarshalledValue) -> Self {
        DispatchResult {
            success: true,
            error_message: String::new(),
            return_value: value,
            error_kind: None,
            error_index: None,
        }
    }

    /// Failed result
    pub fn error(error: &DispatchError) -> Self {
        DispatchResult {
            success: false,
            error_message: error.to_string(),
            return_value: MarshalledValue::Void,
            error_kind: Some(error.kind()),
            error_index: error.failing_index(),
        }
    }

    /// Check for success
    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl From<Result<MarshalledValue, DispatchError>> for DispatchResult {
    fn from(outcome: Result<MarshalledValue, DispatchError>) -> Self {
        match outcome {
            Ok(value) => DispatchResult::success(value),
            Err(error) => DispatchResult::error(&error),
        }
    }
}
