use dynbind_sdk::{builtin, native_fn, read_arg, Attributes, NativeRegistry, RegistryClass, RegistryMethod, Vector3};

use crate::ids;

pub(crate) fn register(registry: &mut NativeRegistry) {
    let attributes = Attributes::new()
        .category("Math")
        .description("Static math helpers")
        .module("Math");

    let class = RegistryClass::new(ids::MATH)
        .with_attributes(attributes)
        .method(
            "CreateZero",
            RegistryMethod::new()
                .returns(builtin::VECTOR3)
                .bind(native_fn(|_, ret| unsafe { ret.write(Vector3::default()) })),
        )
        .method(
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
        )
        .method(
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
        )
        .method(
            "Lerp",
            RegistryMethod::new()
                .named_arg("from", builtin::F64)
                .named_arg("to", builtin::F64)
                .named_arg("t", builtin::F64)
                .returns(builtin::F64)
                .bind(native_fn(|args, ret| unsafe {
                    let from: f64 = read_arg(args, 0)?;
                    let to: f64 = read_arg(args, 1)?;
                    let t: f64 = read_arg(args, 2)?;
                    ret.write(from + (to - from) * t)
                })),
        )
        .method(
            "Length",
            RegistryMethod::new()
                .named_arg("v", builtin::VECTOR3)
                .returns(builtin::F32)
                .bind(native_fn(|args, ret| unsafe {
                    let v: Vector3 = read_arg(args, 0)?;
                    ret.write((v.x * v.x + v.y * v.y + v.z * v.z).sqrt())
                })),
        )
        .method(
            "Divide",
            RegistryMethod::new()
                .named_arg("a", builtin::S64)
                .named_arg("b", builtin::S64)
                .returns(builtin::S64)
                .bind(native_fn(|args, ret| unsafe {
                    let a: i64 = read_arg(args, 0)?;
                    let b: i64 = read_arg(args, 1)?;
                    let q = a.checked_div(b).ok_or("division by zero")?;
                    ret.write(q)
                })),
        )
        .method(
            "Identity",
            RegistryMethod::new()
                .returns(builtin::QUATERNION)
                .bind(native_fn(|_, ret| unsafe {
                    ret.write(dynbind_sdk::Quaternion::IDENTITY)
                })),
        );

    registry.register_class("Math", class);
}
