//! Marshal kind classification
//!
//! Type ids are checked against a fixed ladder of builtin ids before the
//! class map is consulted, so platform integer aliases never fall through to
//! the opaque-class case.

use dynbind_sdk::{builtin, TypeId};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::marshal::MarshalKind;

/// Classes known to the build in progress, by type id
pub type ClassNames = FxHashMap<TypeId, String>;

/// Classification of the builtin ids, in ladder order
fn builtin_kind(type_id: TypeId) -> Option<MarshalKind> {
    let kind = match type_id {
        builtin::VOID => MarshalKind::Void,
        builtin::BOOL => MarshalKind::Bool,
        builtin::S8 => MarshalKind::Int8,
        builtin::S16 => MarshalKind::Int16,
        builtin::S32 | builtin::INT => MarshalKind::Int32,
        builtin::S64 => MarshalKind::Int64,
        builtin::U8 => MarshalKind::UInt8,
        builtin::U16 => MarshalKind::UInt16,
        builtin::U32 | builtin::UINT => MarshalKind::UInt32,
        builtin::U64 => MarshalKind::UInt64,
        builtin::F32 => MarshalKind::Float32,
        builtin::F64 => MarshalKind::Float64,
        builtin::STRING | builtin::CSTR => MarshalKind::String,
        builtin::VECTOR3 => MarshalKind::Vec3,
        builtin::QUATERNION => MarshalKind::Quat,
        _ => return None,
    };
    Some(kind)
}

/// Human-readable type name: builtin spelling, class name, or the id itself
pub fn type_name(type_id: TypeId, classes: &ClassNames) -> String {
    let name = match type_id {
        builtin::VOID => "void",
        builtin::BOOL => "bool",
        builtin::S8 => "int8",
        builtin::S16 => "int16",
        builtin::S32 | builtin::INT => "int32",
        builtin::S64 => "int64",
        builtin::U8 => "uint8",
        builtin::U16 => "uint16",
        builtin::U32 | builtin::UINT => "uint32",
        builtin::U64 => "uint64",
        builtin::F32 => "float",
        builtin::F64 => "double",
        builtin::STRING | builtin::CSTR => "string",
        builtin::VECTOR3 => "Vector3",
        builtin::QUATERNION => "Quaternion",
        other => {
            return match classes.get(&other) {
                Some(class) => class.clone(),
                None => other.to_string(),
            }
        }
    };
    name.to_string()
}

/// Memoizing classifier.
///
/// The cache lives as long as one catalog; [`Classifier::reset`] drops it.
#[derive(Debug, Default)]
pub struct Classifier {
    cache: Mutex<FxHashMap<TypeId, MarshalKind>>,
}

impl Classifier {
    /// Create with an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `type_id` against the builtin ladder, then `classes`
    pub fn classify(&self, type_id: TypeId, classes: &ClassNames) -> MarshalKind {
        if let Some(kind) = self.cache.lock().get(&type_id) {
            return kind.clone();
        }

        let kind = builtin_kind(type_id).unwrap_or_else(|| match classes.get(&type_id) {
            Some(name) => MarshalKind::OpaqueHandle(name.clone()),
            None => MarshalKind::Unknown,
        });

        self.cache.lock().insert(type_id, kind.clone());
        kind
    }

    /// Drop cached `Unknown` entries so they are looked up again
    pub fn forget_unknown(&self) {
        self.cache.lock().retain(|_, kind| *kind != MarshalKind::Unknown);
    }

    /// Drop a cached `Unknown` for `type_id`, once it names an admitted class
    pub fn forget(&self, type_id: TypeId) {
        let mut cache = self.cache.lock();
        if cache.get(&type_id) == Some(&MarshalKind::Unknown) {
            cache.remove(&type_id);
        }
    }

    /// Drop the whole cache
    pub fn reset(&self) {
        self.cache.lock().clear();
    }

    /// Number of cached classifications
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }
}
