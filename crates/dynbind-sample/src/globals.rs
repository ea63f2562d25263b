//! Free functions and free properties

use std::sync::Arc;

use dynbind_sdk::{builtin, native_fn, read_arg, NativeError, NativeRegistry, RegistryMethod, RegistryProperty};

use crate::{GlobalState, VERSION};

pub(crate) fn register(registry: &mut NativeRegistry, globals: &Arc<GlobalState>) {
    registry.register_method(
        "Add",
        RegistryMethod::new()
            .named_arg("a", builtin::S32)
            .named_arg("b", builtin::S32)
            .returns(builtin::S32)
            .bind(native_fn(|args, ret| unsafe {
                let a: i32 = read_arg(args, 0)?;
                let b: i32 = read_arg(args, 1)?;
                ret.write(a.wrapping_add(b))
            })),
    );
    registry.register_method(
        "Add",
        RegistryMethod::new()
            .named_arg("a", builtin::F32)
            .named_arg("b", builtin::F32)
            .returns(builtin::F32)
            .bind(native_fn(|args, ret| unsafe {
                let a: f32 = read_arg(args, 0)?;
                let b: f32 = read_arg(args, 1)?;
                ret.write(a + b)
            })),
    );
    registry.register_method(
        "GetVersion",
        RegistryMethod::new()
            .returns(builtin::STRING)
            .bind(native_fn(|_, ret| unsafe { ret.write(VERSION.to_string()) })),
    );
    registry.register_method(
        "Fail",
        RegistryMethod::new().bind(native_fn(|_, _| Err(NativeError::from("always fails")))),
    );

    let scale_get = Arc::clone(globals);
    let scale_set = Arc::clone(globals);
    registry.register_property(
        "TimeScale",
        RegistryProperty::new()
            .getter(
                RegistryMethod::new()
                    .returns(builtin::F32)
                    .bind(native_fn(move |_, ret| unsafe { ret.write(*scale_get.time_scale.lock()) })),
            )
            .setter(
                RegistryMethod::new()
                    .named_arg("value", builtin::F32)
                    .bind(native_fn(move |args, _| unsafe {
                        let value: f32 = read_arg(args, 0)?;
                        if !value.is_finite() || value < 0.0 {
                            return Err(NativeError::AbiError(format!("invalid time scale {}", value)));
                        }
                        *scale_set.time_scale.lock() = value;
                        Ok(())
                    })),
            ),
    );

    let build = Arc::clone(globals);
    registry.register_property(
        "BuildId",
        RegistryProperty::new().getter(
            RegistryMethod::new()
                .returns(builtin::U64)
                .bind(native_fn(move |_, ret| unsafe { ret.write(build.build_id) })),
        ),
    );
}
