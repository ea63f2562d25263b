//! Conversion between [`MarshalledValue`] and [`NativeArgument`]

use std::ffi::c_void;

use dynbind_sdk::{Handle, NativeArgument, ParamTraits, Quaternion, Vector3};

use super::{MarshalError, MarshalKind, MarshalledValue, ScratchArena};
use crate::catalog::ParameterDescriptor;

fn slot<T: 'static>(arena: &mut ScratchArena, value: T, expected: &ParameterDescriptor) -> NativeArgument {
    NativeArgument::from_storage(arena.alloc(value), expected.type_id, expected.traits)
}

/// Convert `value` into a native argument for the slot `expected`.
///
/// Scalars, strings and math aggregates are copied into arena storage;
/// handles are passed by pointer.
pub fn marshal_to_native(
    value: &MarshalledValue,
    expected: &ParameterDescriptor,
    arena: &mut ScratchArena,
) -> Result<NativeArgument, MarshalError> {
    use MarshalledValue as V;

    let arg = match (&expected.kind, value) {
        (MarshalKind::Bool, V::Bool(v)) => slot(arena, *v, expected),
        (MarshalKind::Int8, V::Int8(v)) => slot(arena, *v, expected),
        (MarshalKind::Int16, V::Int16(v)) => slot(arena, *v, expected),
        (MarshalKind::Int32, V::Int32(v)) => slot(arena, *v, expected),
        (MarshalKind::Int64, V::Int64(v)) => slot(arena, *v, expected),
        (MarshalKind::UInt8, V::UInt8(v)) => slot(arena, *v, expected),
        (MarshalKind::UInt16, V::UInt16(v)) => slot(arena, *v, expected),
        (MarshalKind::UInt32, V::UInt32(v)) => slot(arena, *v, expected),
        (MarshalKind::UInt64, V::UInt64(v)) => slot(arena, *v, expected),
        (MarshalKind::Float32, V::Float32(v)) => slot(arena, *v, expected),
        (MarshalKind::Float64, V::Float64(v)) => slot(arena, *v, expected),
        (MarshalKind::String, V::String(s)) => slot(arena, s.clone(), expected),
        (MarshalKind::Vec3, V::Vec3(v)) => slot(arena, Vector3::from(*v), expected),
        (MarshalKind::Quat, V::Quat(q)) => slot(arena, Quaternion::from(*q), expected),
        (MarshalKind::OpaqueHandle(_) | MarshalKind::Unknown, V::OpaqueHandle { handle, .. }) => {
            NativeArgument::from_handle(*handle, expected.type_id)
        }
        (MarshalKind::Unknown, _) => {
            return Err(MarshalError::MissingHandle {
                type_name: expected.type_name.clone(),
            })
        }
        (kind, value) => {
            return Err(MarshalError::KindMismatch {
                expected: kind.clone(),
                found: value.kind(),
            })
        }
    };
    Ok(arg)
}

/// Convert a native result back into a [`MarshalledValue`].
///
/// A null slot is a valid outcome and yields `Void`.
///
/// # Safety
/// A non-null `result` must address initialized storage of the native type
/// that `expected.kind` maps to (see [`allocate_return_slot`]), or carry an
/// object address when it is a pointer slot.
pub unsafe fn marshal_from_native(
    result: &NativeArgument,
    expected: &ParameterDescriptor,
) -> MarshalledValue {
    use MarshalledValue as V;

    if result.is_null() && !result.traits().is_pointer() {
        return V::Void;
    }

    match &expected.kind {
        MarshalKind::Void => V::Void,
        MarshalKind::Bool => V::Bool(result.read().unwrap_or_default()),
        MarshalKind::Int8 => V::Int8(result.read().unwrap_or_default()),
        MarshalKind::Int16 => V::Int16(result.read().unwrap_or_default()),
        MarshalKind::Int32 => V::Int32(result.read().unwrap_or_default()),
        MarshalKind::Int64 => V::Int64(result.read().unwrap_or_default()),
        MarshalKind::UInt8 => V::UInt8(result.read().unwrap_or_default()),
        MarshalKind::UInt16 => V::UInt16(result.read().unwrap_or_default()),
        MarshalKind::UInt32 => V::UInt32(result.read().unwrap_or_default()),
        MarshalKind::UInt64 => V::UInt64(result.read().unwrap_or_default()),
        MarshalKind::Float32 => V::Float32(result.read().unwrap_or_default()),
        MarshalKind::Float64 => V::Float64(result.read().unwrap_or_default()),
        MarshalKind::String => V::String(result.read().unwrap_or_default()),
        MarshalKind::Vec3 => V::Vec3(result.read::<Vector3>().unwrap_or_default().to_array()),
        MarshalKind::Quat => V::Quat(result.read::<Quaternion>().unwrap_or_default().to_array()),
        MarshalKind::OpaqueHandle(name) => V::opaque(result.handle(), name.clone()),
        MarshalKind::Unknown => V::opaque(result.handle(), expected.type_name.clone()),
    }
}

/// Pre-allocate the result slot for `expected`.
///
/// Returns `None` for `Void` and for kinds with no native storage
/// (`Unknown`); such calls run without a result slot.
pub fn allocate_return_slot(
    expected: &ParameterDescriptor,
    arena: &mut ScratchArena,
) -> Option<NativeArgument> {
    let ptr: *mut c_void = match &expected.kind {
        MarshalKind::Void | MarshalKind::Unknown => return None,
        MarshalKind::Bool => arena.alloc(false).cast(),
        MarshalKind::Int8 => arena.alloc(0i8).cast(),
        MarshalKind::Int16 => arena.alloc(0i16).cast(),
        MarshalKind::Int32 => arena.alloc(0i32).cast(),
        MarshalKind::Int64 => arena.alloc(0i64).cast(),
        MarshalKind::UInt8 => arena.alloc(0u8).cast(),
        MarshalKind::UInt16 => arena.alloc(0u16).cast(),
        MarshalKind::UInt32 => arena.alloc(0u32).cast(),
        MarshalKind::UInt64 => arena.alloc(0u64).cast(),
        MarshalKind::Float32 => arena.alloc(0f32).cast(),
        MarshalKind::Float64 => arena.alloc(0f64).cast(),
        MarshalKind::String => arena.alloc(String::new()).cast(),
        MarshalKind::Vec3 => arena.alloc(Vector3::default()).cast(),
        MarshalKind::Quat => arena.alloc(Quaternion::IDENTITY).cast(),
        MarshalKind::OpaqueHandle(_) => arena.alloc(Handle::null()).cast(),
    };
    Some(NativeArgument::from_storage(ptr, expected.type_id, ParamTraits::NONE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynbind_sdk::{builtin, TypeId};

    fn param(kind: MarshalKind, type_id: TypeId) -> ParameterDescriptor {
        ParameterDescriptor::new("p", "p", type_id, kind)
    }

    #[test]
    fn test_scalar_through_arena() {
        let mut arena = ScratchArena::new();
        let expected = param(MarshalKind::Int32, builtin::S32);
        let arg = marshal_to_native(&MarshalledValue::Int32(-7), &expected, &mut arena).unwrap();

        assert_eq!(arena.len(), 1);
        assert_eq!(arg.type_id(), builtin::S32);
        assert_eq!(unsafe { arg.read::<i32>() }, Some(-7));
        assert_eq!(unsafe { marshal_from_native(&arg, &expected) }, MarshalledValue::Int32(-7));
    }

    #[test]
    fn test_every_kind_round_trips() {
        use MarshalledValue as V;

        let cases = [
            (V::Bool(true), MarshalKind::Bool, builtin::BOOL),
            (V::Int8(i8::MIN), MarshalKind::Int8, builtin::S8),
            (V::Int16(i16::MAX), MarshalKind::Int16, builtin::S16),
            (V::Int32(i32::MIN), MarshalKind::Int32, builtin::INT),
            (V::Int64(i64::MIN), MarshalKind::Int64, builtin::S64),
            (V::UInt8(u8::MAX), MarshalKind::UInt8, builtin::U8),
            (V::UInt16(u16::MAX), MarshalKind::UInt16, builtin::U16),
            (V::UInt32(u32::MAX), MarshalKind::UInt32, builtin::UINT),
            (V::UInt64(u64::MAX), MarshalKind::UInt64, builtin::U64),
            (V::Float32(f32::MIN_POSITIVE), MarshalKind::Float32, builtin::F32),
            (V::Float64(f64::MAX), MarshalKind::Float64, builtin::F64),
            (V::String(String::new()), MarshalKind::String, builtin::STRING),
            (V::String("héllo\0world".into()), MarshalKind::String, builtin::CSTR),
            (V::Vec3([1.5, -2.0, 0.25]), MarshalKind::Vec3, builtin::VECTOR3),
            (V::Quat([0.0, 0.0, 0.7071, 0.7071]), MarshalKind::Quat, builtin::QUATERNION),
        ];

        for (value, kind, type_id) in cases {
            let mut arena = ScratchArena::new();
            let expected = param(kind, type_id);
            let arg = marshal_to_native(&value, &expected, &mut arena).unwrap();
            let back = unsafe { marshal_from_native(&arg, &expected) };
            assert_eq!(back, value, "round trip of {:?}", expected.kind);
        }
    }

    #[test]
    fn test_float_bits_round_trip() {
        let mut arena = ScratchArena::new();
        let single = param(MarshalKind::Float32, builtin::F32);
        let double = param(MarshalKind::Float64, builtin::F64);

        for bits in [f32::NAN.to_bits(), (-0.0f32).to_bits(), f32::INFINITY.to_bits()] {
            let arg = marshal_to_native(&MarshalledValue::Float32(f32::from_bits(bits)), &single, &mut arena).unwrap();
            match unsafe { marshal_from_native(&arg, &single) } {
                MarshalledValue::Float32(v) => assert_eq!(v.to_bits(), bits),
                other => panic!("expected Float32, got {:?}", other),
            }
        }

        let arg = marshal_to_native(&MarshalledValue::Float64(-0.0), &double, &mut arena).unwrap();
        match unsafe { marshal_from_native(&arg, &double) } {
            MarshalledValue::Float64(v) => assert!(v == 0.0 && v.is_sign_negative()),
            other => panic!("expected Float64, got {:?}", other),
        }
    }

    #[test]
    fn test_string_is_owned_by_arena() {
        let mut arena = ScratchArena::new();
        let expected = param(MarshalKind::String, builtin::STRING);
        let value = MarshalledValue::from("hello");
        let arg = marshal_to_native(&value, &expected, &mut arena).unwrap();
        drop(value);
        assert_eq!(unsafe { arg.read::<String>() }.as_deref(), Some("hello"));
    }

    #[test]
    fn test_handle_passed_by_pointer() {
        let mut arena = ScratchArena::new();
        let mut target = 5u32;
        let handle = Handle::from_ptr(&mut target as *mut u32 as *mut c_void);
        let class = TypeId::from_name("Thing");
        let expected = param(MarshalKind::OpaqueHandle("Thing".into()), class);

        let arg = marshal_to_native(&MarshalledValue::opaque(handle, "Thing"), &expected, &mut arena).unwrap();
        assert!(arena.is_empty());
        assert!(arg.traits().is_pointer());
        assert_eq!(unsafe { arg.handle() }, handle);
        assert_eq!(
            unsafe { marshal_from_native(&arg, &expected) },
            MarshalledValue::opaque(handle, "Thing")
        );
    }

    #[test]
    fn test_mismatches() {
        let mut arena = ScratchArena::new();
        let expected = param(MarshalKind::Float32, builtin::F32);
        let err = marshal_to_native(&MarshalledValue::Float64(1.0), &expected, &mut arena).unwrap_err();
        assert_eq!(
            err,
            MarshalError::KindMismatch {
                expected: MarshalKind::Float32,
                found: MarshalKind::Float64,
            }
        );

        let unknown = ParameterDescriptor::new("blob", "Blob", TypeId::from_name("Blob"), MarshalKind::Unknown);
        let err = marshal_to_native(&MarshalledValue::Int32(1), &unknown, &mut arena).unwrap_err();
        assert!(matches!(err, MarshalError::MissingHandle { ref type_name } if type_name == "Blob"));

        let handle = MarshalledValue::opaque(Handle::null(), "Thing");
        let err = marshal_to_native(&handle, &expected, &mut arena).unwrap_err();
        assert!(matches!(err, MarshalError::KindMismatch { .. }));
        assert!(arena.is_empty());
    }

    #[test]
    fn test_return_slots() {
        let mut arena = ScratchArena::new();
        assert!(allocate_return_slot(&ParameterDescriptor::void(), &mut arena).is_none());
        let unknown = param(MarshalKind::Unknown, TypeId::from_name("Blob"));
        assert!(allocate_return_slot(&unknown, &mut arena).is_none());
        assert!(arena.is_empty());

        let quat = param(MarshalKind::Quat, builtin::QUATERNION);
        let slot = allocate_return_slot(&quat, &mut arena).unwrap();
        assert_eq!(
            unsafe { marshal_from_native(&slot, &quat) },
            MarshalledValue::Quat([0.0, 0.0, 0.0, 1.0])
        );

        let object = param(MarshalKind::OpaqueHandle("Thing".into()), TypeId::from_name("Thing"));
        let slot = allocate_return_slot(&object, &mut arena).unwrap();
        assert!(!slot.traits().is_pointer());
        assert_eq!(
            unsafe { marshal_from_native(&slot, &object) },
            MarshalledValue::opaque(Handle::null(), "Thing")
        );
    }

    #[test]
    fn test_null_result_is_void() {
        let expected = param(MarshalKind::Int64, builtin::S64);
        let empty = NativeArgument::null(builtin::S64);
        assert_eq!(unsafe { marshal_from_native(&empty, &expected) }, MarshalledValue::Void);
    }
}
