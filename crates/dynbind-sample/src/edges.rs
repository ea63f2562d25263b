//! Entries that exercise visibility, binding and base-resolution edges

use dynbind_sdk::{
    builtin, native_fn, Attributes, ExcludeFlags, NativeRegistry, RegistryClass, RegistryMethod,
    ScopeFlags, TypeId,
};

use crate::ids;

fn echo_method() -> RegistryMethod {
    RegistryMethod::new()
        .returns(builtin::BOOL)
        .bind(native_fn(|_, ret| unsafe { ret.write(true) }))
}

pub(crate) fn register(registry: &mut NativeRegistry) {
    registry.register_class(
        "HiddenInternal",
        RegistryClass::new(ids::HIDDEN)
            .with_attributes(Attributes::new().exclude(ExcludeFlags::LIST).module("Core"))
            .method("Poke", echo_method()),
    );

    registry.register_class(
        "LauncherOnly",
        RegistryClass::new(ids::LAUNCHER_ONLY)
            .with_attributes(Attributes::new().scope(ScopeFlags::LAUNCHER))
            .method("Launch", echo_method()),
    );

    // Unbound: a declared method with no callable and an empty constructor slot
    registry.register_class(
        "Unbound",
        RegistryClass::new(ids::UNBOUND)
            .with_attributes(Attributes::new().category("Diagnostics").module("Core"))
            .method("Ping", RegistryMethod::new().returns(builtin::S32))
            .method(
                "Hidden",
                echo_method().with_attributes(Attributes::new().exclude(ExcludeFlags::DOCUMENTATION)),
            )
            .constructor(None),
    );

    registry.register_class(
        "Legacy",
        RegistryClass::new(ids::LEGACY)
            .with_attributes(
                Attributes::new()
                    .category("Legacy")
                    .description("Superseded by Widget")
                    .deprecated(Some("Use Widget instead"))
                    .module("LegacyModule"),
            )
            .method("Echo", echo_method()),
    );

    // Declared before its base
    registry.register_class(
        "EarlyDerived",
        RegistryClass::new(ids::EARLY_DERIVED)
            .base(ids::LATE_BASE)
            .base(TypeId::from_name("NeverRegistered"))
            .with_attributes(Attributes::new().module("Core"))
            .method(
                "Partner",
                RegistryMethod::new().returns(ids::LATE_BASE).bind(native_fn(|_, _| Ok(()))),
            ),
    );
    registry.register_class(
        "LateBase",
        RegistryClass::new(ids::LATE_BASE).with_attributes(Attributes::new().module("Core")),
    );

    // No module attribute
    registry.register_class(
        "Orphan",
        RegistryClass::new(TypeId::from_name("Orphan")).method("Echo", echo_method()),
    );
}
