//! `Widget` and its derived `Button`

use dynbind_sdk::{
    builtin, native_fn, object_arg, read_arg, AbiResult, Attributes, ClassLifecycle, Handle,
    NativeArgument, NativeRegistry, ParamTraits, RegistryClass, RegistryMethod, RegistryParameter,
    RegistryProperty, TypeId, Vector3,
};

use crate::ids;

/// Native object behind the `Widget` class
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
    /// Display name
    pub name: String,
    /// World position
    pub position: Vector3,
    /// Press count (only `Button` uses it)
    pub presses: u32,
}

impl Default for Widget {
    fn default() -> Self {
        Widget {
            width: 1,
            height: 1,
            name: "widget".to_string(),
            position: Vector3::default(),
            presses: 0,
        }
    }
}

/// Receiver of a member call on a `Widget` or a class sharing its layout
unsafe fn this<'a>(args: &[NativeArgument], class: TypeId) -> AbiResult<&'a mut Widget> {
    if let Some(receiver) = args.first() {
        receiver.expect_type(class)?;
    }
    object_arg(args, 0)
}

fn widget_methods(class: RegistryClass, owner: TypeId) -> RegistryClass {
    class
        .method(
            "Resize",
            RegistryMethod::member(owner)
                .named_arg("width", builtin::S32)
                .named_arg("height", builtin::S32)
                .bind(native_fn(move |args, _| unsafe {
                    let widget = this(args, owner)?;
                    widget.width = read_arg(args, 1)?;
                    widget.height = read_arg(args, 2)?;
                    Ok(())
                })),
        )
        .method(
            "Resize",
            RegistryMethod::member(owner)
                .named_arg("size", builtin::S32)
                .bind(native_fn(move |args, _| unsafe {
                    let widget = this(args, owner)?;
                    let size: i32 = read_arg(args, 1)?;
                    widget.width = size;
                    widget.height = size;
                    Ok(())
                })),
        )
        .method(
            "Area",
            RegistryMethod::member(owner)
                .constant()
                .returns(builtin::S32)
                .bind(native_fn(move |args, ret| unsafe {
                    let widget = this(args, owner)?;
                    ret.write(widget.width * widget.height)
                })),
        )
        .method(
            "Clone",
            RegistryMethod::member(owner)
                .constant()
                .returns_param(RegistryParameter::new(owner).with_traits(ParamTraits::POINTER))
                .bind(native_fn(move |args, ret| unsafe {
                    let widget = this(args, owner)?;
                    ret.write_handle(Handle::from_box(Box::new(widget.clone())))
                })),
        )
        .method(
            "MoveTo",
            RegistryMethod::member(owner)
                .named_arg("position", builtin::VECTOR3)
                .bind(native_fn(move |args, _| unsafe {
                    let widget = this(args, owner)?;
                    widget.position = read_arg(args, 1)?;
                    Ok(())
                })),
        )
        .method(
            "Attach",
            RegistryMethod::member(owner)
                .param(RegistryParameter::named("blob", ids::NATIVE_BLOB).with_traits(ParamTraits::POINTER))
                .returns(builtin::BOOL)
                .bind(native_fn(move |args, ret| unsafe {
                    this(args, owner)?;
                    let blob = args.get(1).map(|a| a.handle()).unwrap_or_default();
                    ret.write(!blob.is_null())
                })),
        )
        .property(
            "Width",
            RegistryProperty::new()
                .getter(
                    RegistryMethod::member(owner)
                        .returns(builtin::S32)
                        .bind(native_fn(move |args, ret| unsafe { ret.write(this(args, owner)?.width) })),
                )
                .setter(
                    RegistryMethod::member(owner)
                        .named_arg("value", builtin::S32)
                        .bind(native_fn(move |args, _| unsafe {
                            this(args, owner)?.width = read_arg(args, 1)?;
                            Ok(())
                        })),
                ),
        )
        .property(
            "Name",
            RegistryProperty::new()
                .getter(
                    RegistryMethod::member(owner)
                        .returns(builtin::STRING)
                        .bind(native_fn(move |args, ret| unsafe {
                            ret.write(this(args, owner)?.name.clone())
                        })),
                )
                .setter(
                    RegistryMethod::member(owner)
                        .named_arg("value", builtin::STRING)
                        .bind(native_fn(move |args, _| unsafe {
                            this(args, owner)?.name = read_arg(args, 1)?;
                            Ok(())
                        })),
                ),
        )
        .property(
            "Position",
            RegistryProperty::new().getter(
                RegistryMethod::member(owner)
                    .returns(builtin::VECTOR3)
                    .bind(native_fn(move |args, ret| unsafe { ret.write(this(args, owner)?.position) })),
            ),
        )
        .property(
            "Payload",
            RegistryProperty::new().getter(
                RegistryMethod::member(owner)
                    .returns(ids::NATIVE_BLOB)
                    .bind(native_fn(|_, _| Ok(()))),
            ),
        )
}

fn constructor(owner: TypeId) -> RegistryMethod {
    RegistryMethod::new()
        .named_arg("width", builtin::S32)
        .named_arg("height", builtin::S32)
        .returns_param(RegistryParameter::new(owner).with_traits(ParamTraits::POINTER))
        .bind(native_fn(|args, ret| unsafe {
            let widget = Widget {
                width: read_arg(args, 0)?,
                height: read_arg(args, 1)?,
                ..Widget::default()
            };
            ret.write_handle(Handle::from_box(Box::new(widget)))
        }))
}

fn named_constructor(owner: TypeId) -> RegistryMethod {
    RegistryMethod::new()
        .named_arg("name", builtin::STRING)
        .returns_param(RegistryParameter::new(owner).with_traits(ParamTraits::POINTER))
        .bind(native_fn(|args, ret| unsafe {
            let widget = Widget {
                name: read_arg(args, 0)?,
                ..Widget::default()
            };
            ret.write_handle(Handle::from_box(Box::new(widget)))
        }))
}

pub(crate) fn register(registry: &mut NativeRegistry) {
    let widget = RegistryClass::new(ids::WIDGET)
        .with_attributes(
            Attributes::new()
                .category("UI")
                .description("Rectangular UI element")
                .module("Core"),
        )
        .lifecycle(ClassLifecycle::boxed::<Widget>())
        .constructor(Some(constructor(ids::WIDGET)))
        .constructor(None)
        .constructor(Some(named_constructor(ids::WIDGET)));
    registry.register_class("Widget", widget_methods(widget, ids::WIDGET));

    let button = RegistryClass::new(ids::BUTTON)
        .base(ids::WIDGET)
        .with_attributes(Attributes::new().category("UI/Controls").module("Core"))
        .lifecycle(ClassLifecycle::boxed::<Widget>())
        .method(
            "Press",
            RegistryMethod::member(ids::BUTTON)
                .returns(builtin::U32)
                .bind(native_fn(|args, ret| unsafe {
                    let button = this(args, ids::BUTTON)?;
                    button.presses += 1;
                    ret.write(button.presses)
                })),
        );
    registry.register_class("Button", widget_methods(button, ids::BUTTON));
}
