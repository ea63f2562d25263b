use dynbind_sdk::{Handle, Quaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::MarshalKind;

/// A value that can cross the boundary.
///
/// Serializes adjacently tagged: `{"kind": "Int32", "value": 3}`. Opaque
/// handles carry their address as an integer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum MarshalledValue {
    /// No value
    #[default]
    Void,
    /// Boolean
    Bool(bool),
    /// Signed 8-bit integer
    Int8(i8),
    /// Signed 16-bit integer
    Int16(i16),
    /// Signed 32-bit integer
    Int32(i32),
    /// Signed 64-bit integer
    Int64(i64),
    /// Unsigned 8-bit integer
    UInt8(u8),
    /// Unsigned 16-bit integer
    UInt16(u16),
    /// Unsigned 32-bit integer
    UInt32(u32),
    /// Unsigned 64-bit integer
    UInt64(u64),
    /// Single-precision float
    Float32(f32),
    /// Double-precision float
    Float64(f64),
    /// Owned string
    String(String),
    /// 3-float vector
    Vec3([f32; 3]),
    /// 4-float quaternion
    Quat([f32; 4]),
    /// Reference to a native object
    OpaqueHandle {
        /// Object address
        #[serde(with = "handle_addr")]
        handle: Handle,
        /// Declared class name
        type_name: String,
    },
}

impl MarshalledValue {
    /// Opaque handle to an object of class `type_name`
    pub fn opaque(handle: Handle, type_name: impl Into<String>) -> Self {
        MarshalledValue::OpaqueHandle {
            handle,
            type_name: type_name.into(),
        }
    }

    /// Kind of the active tag
    pub fn kind(&self) -> MarshalKind {
        match self {
            MarshalledValue::Void => MarshalKind::Void,
            MarshalledValue::Bool(_) => MarshalKind::Bool,
            MarshalledValue::Int8(_) => MarshalKind::Int8,
            MarshalledValue::Int16(_) => MarshalKind::Int16,
            MarshalledValue::Int32(_) => MarshalKind::Int32,
            MarshalledValue::Int64(_) => MarshalKind::Int64,
            MarshalledValue::UInt8(_) => MarshalKind::UInt8,
            MarshalledValue::UInt16(_) => MarshalKind::UInt16,
            MarshalledValue::UInt32(_) => MarshalKind::UInt32,
            MarshalledValue::UInt64(_) => MarshalKind::UInt64,
            MarshalledValue::Float32(_) => MarshalKind::Float32,
            MarshalledValue::Float64(_) => MarshalKind::Float64,
            MarshalledValue::String(_) => MarshalKind::String,
            MarshalledValue::Vec3(_) => MarshalKind::Vec3,
            MarshalledValue::Quat(_) => MarshalKind::Quat,
            MarshalledValue::OpaqueHandle { type_name, .. } => {
                MarshalKind::OpaqueHandle(type_name.clone())
            }
        }
    }

    /// Whether this value can fill a slot of `kind`.
    ///
    /// Handles are accepted by any handle-kind slot regardless of the class
    /// name they carry; the native side owns the real type check.
    pub fn fits(&self, kind: &MarshalKind) -> bool {
        match (self, kind) {
            (MarshalledValue::OpaqueHandle { .. }, k) => k.is_handle(),
            (value, k) => !k.is_handle() && value.kind() == *k,
        }
    }

    /// Check for `Void`
    pub fn is_void(&self) -> bool {
        matches!(self, MarshalledValue::Void)
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MarshalledValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any signed or unsigned integer payload that fits in an `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            MarshalledValue::Int8(v) => Some(v as i64),
            MarshalledValue::Int16(v) => Some(v as i64),
            MarshalledValue::Int32(v) => Some(v as i64),
            MarshalledValue::Int64(v) => Some(v),
            MarshalledValue::UInt8(v) => Some(v as i64),
            MarshalledValue::UInt16(v) => Some(v as i64),
            MarshalledValue::UInt32(v) => Some(v as i64),
            MarshalledValue::UInt64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Any float payload widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            MarshalledValue::Float32(v) => Some(v as f64),
            MarshalledValue::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MarshalledValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Handle payload
    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            MarshalledValue::OpaqueHandle { handle, .. } => Some(*handle),
            _ => None,
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for MarshalledValue {
                fn from(v: $ty) -> Self {
                    MarshalledValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    String => String,
}

impl From<&str> for MarshalledValue {
    fn from(v: &str) -> Self {
        MarshalledValue::String(v.to_string())
    }
}

impl From<Vector3> for MarshalledValue {
    fn from(v: Vector3) -> Self {
        MarshalledValue::Vec3(v.to_array())
    }
}

impl From<Quaternion> for MarshalledValue {
    fn from(q: Quaternion) -> Self {
        MarshalledValue::Quat(q.to_array())
    }
}

mod handle_addr {
    use dynbind_sdk::Handle;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(handle: &Handle, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(handle.addr())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Handle, D::Error> {
        u64::deserialize(deserializer).map(Handle::from_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_tag() {
        assert_eq!(MarshalledValue::from(3i32).kind(), MarshalKind::Int32);
        assert_eq!(MarshalledValue::from("x").kind(), MarshalKind::String);
        assert_eq!(
            MarshalledValue::opaque(Handle::null(), "Widget").kind(),
            MarshalKind::OpaqueHandle("Widget".into())
        );
        assert!(MarshalledValue::default().is_void());
    }

    #[test]
    fn test_fits() {
        let handle = MarshalledValue::opaque(Handle::from_addr(0x10), "Widget");
        assert!(handle.fits(&MarshalKind::OpaqueHandle("Base".into())));
        assert!(handle.fits(&MarshalKind::Unknown));
        assert!(!handle.fits(&MarshalKind::Int32));
        assert!(MarshalledValue::Int32(1).fits(&MarshalKind::Int32));
        assert!(!MarshalledValue::Int32(1).fits(&MarshalKind::Int64));
        assert!(!MarshalledValue::Int32(1).fits(&MarshalKind::Unknown));
    }

    #[test]
    fn test_json_shape() {
        let v = serde_json::to_value(MarshalledValue::Int32(7)).unwrap();
        assert_eq!(v, serde_json::json!({"kind": "Int32", "value": 7}));

        let v = serde_json::to_value(MarshalledValue::Void).unwrap();
        assert_eq!(v, serde_json::json!({"kind": "Void"}));

        let v = serde_json::to_value(MarshalledValue::opaque(Handle::from_addr(4096), "Widget"))
            .unwrap();
        assert_eq!(
            v,
            serde_json::json!({"kind": "OpaqueHandle", "value": {"handle": 4096, "type_name": "Widget"}})
        );

        let back: MarshalledValue =
            serde_json::from_value(serde_json::json!({"kind": "Vec3", "value": [1.0, 2.0, 3.0]}))
                .unwrap();
        assert_eq!(back, MarshalledValue::Vec3([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(MarshalledValue::UInt16(9).as_i64(), Some(9));
        assert_eq!(MarshalledValue::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(MarshalledValue::Float32(0.5).as_f64(), Some(0.5));
        assert_eq!(MarshalledValue::Bool(true).as_i64(), None);
    }
}
