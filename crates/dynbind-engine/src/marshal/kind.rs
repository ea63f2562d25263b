use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed classification of a native type for boundary transport.
///
/// `Unknown` is a valid terminal classification: such values can only cross
/// by opaque handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarshalKind {
    /// No value
    Void,
    /// Boolean
    Bool,
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 8-bit integer
    UInt8,
    /// Unsigned 16-bit integer
    UInt16,
    /// Unsigned 32-bit integer
    UInt32,
    /// Unsigned 64-bit integer
    UInt64,
    /// Single-precision float
    Float32,
    /// Double-precision float
    Float64,
    /// Owned string
    String,
    /// 3-float vector
    Vec3,
    /// 4-float quaternion
    Quat,
    /// Reference to a reflected class, carrying the class name
    OpaqueHandle(String),
    /// Anything else
    Unknown,
}

impl MarshalKind {
    /// Name used by the catalog export format
    pub fn export_name(&self) -> &'static str {
        match self {
            MarshalKind::Void => "Void",
            MarshalKind::Bool => "Bool",
            MarshalKind::Int8 => "Int8",
            MarshalKind::Int16 => "Int16",
            MarshalKind::Int32 => "Int32",
            MarshalKind::Int64 => "Int64",
            MarshalKind::UInt8 => "UInt8",
            MarshalKind::UInt16 => "UInt16",
            MarshalKind::UInt32 => "UInt32",
            MarshalKind::UInt64 => "UInt64",
            MarshalKind::Float32 => "Float",
            MarshalKind::Float64 => "Double",
            MarshalKind::String => "String",
            MarshalKind::Vec3 => "Vector3",
            MarshalKind::Quat => "Quaternion",
            MarshalKind::OpaqueHandle(_) => "Object",
            MarshalKind::Unknown => "Unknown",
        }
    }

    /// Check for `Void`
    pub fn is_void(&self) -> bool {
        matches!(self, MarshalKind::Void)
    }

    /// Values of this kind travel by handle
    pub fn is_handle(&self) -> bool {
        matches!(self, MarshalKind::OpaqueHandle(_) | MarshalKind::Unknown)
    }
}

impl fmt::Display for MarshalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarshalKind::OpaqueHandle(name) => write!(f, "OpaqueHandle({})", name),
            other => write!(f, "{:?}", other),
        }
    }
}
