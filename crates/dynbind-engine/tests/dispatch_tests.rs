//! Dispatcher Tests
//!
//! Drives every dispatcher verb against the sample model:
//! - Static, instance and free function calls with overloads
//! - Instance creation and destruction
//! - Class and free property access
//! - Event broadcast and addressed delivery
//! - Failure classification for each error kind
//!
//! # Running Tests
//! ```bash
//! cargo test -p dynbind-engine --test dispatch_tests
//! ```

use std::sync::Arc;

use dynbind_engine::{
    DispatchErrorKind, DispatchOptions, DispatchResult, Dispatcher, MarshalledValue, OverloadPolicy,
    Reflector,
};
use dynbind_sample::SampleModel;
use dynbind_sdk::{Handle, Vector3};

struct Fixture {
    model: SampleModel,
    dispatcher: Dispatcher,
}

impl Fixture {
    fn new() -> Self {
        Self::with_options(DispatchOptions::default())
    }

    fn with_options(options: DispatchOptions) -> Self {
        let model = SampleModel::new();
        let reflector = Arc::new(Reflector::new());
        reflector.build(Some(&model.registry)).unwrap();
        Fixture {
            model,
            dispatcher: Dispatcher::with_options(reflector, options),
        }
    }

    fn create(&self, class: &str, args: &[MarshalledValue]) -> Handle {
        let result = self.dispatcher.create_instance(class, args);
        assert!(result.success, "{}", result.error_message);
        result.return_value.as_handle().unwrap()
    }
}

fn int(v: i32) -> MarshalledValue {
    MarshalledValue::Int32(v)
}

fn assert_failed(result: &DispatchResult, kind: DispatchErrorKind) {
    assert!(!result.success, "expected {:?} failure", kind);
    assert_eq!(result.error_kind, Some(kind), "{}", result.error_message);
    assert_eq!(result.return_value, MarshalledValue::Void);
    assert!(!result.error_message.is_empty());
}

// ===== Initialization Tests =====

#[test]
fn test_uninitialized_dispatcher() {
    let dispatcher = Dispatcher::new(Arc::new(Reflector::new()));
    assert!(!dispatcher.is_initialized());

    let result = dispatcher.invoke_static("Math", "CreateZero", &[]);
    assert_failed(&result, DispatchErrorKind::Uninitialized);
    assert_eq!(result.error_message, "Dispatcher not initialized");

    assert_failed(
        &dispatcher.get_global_property("TimeScale"),
        DispatchErrorKind::Uninitialized,
    );
    assert_failed(
        &dispatcher.broadcast_event("TransformBus", "Ping", &[]),
        DispatchErrorKind::Uninitialized,
    );
}

#[test]
fn test_cleared_catalog_uninitializes() {
    let fixture = Fixture::new();
    fixture.dispatcher.reflector().clear();
    assert_failed(
        &fixture.dispatcher.invoke_global("GetVersion", &[]),
        DispatchErrorKind::Uninitialized,
    );
}

// ===== Static Method Tests =====

#[test]
fn test_static_create_zero() {
    let fixture = Fixture::new();
    let result = fixture.dispatcher.invoke_static("Math", "CreateZero", &[]);
    assert!(result.success);
    assert!(result.error_message.is_empty());
    assert_eq!(result.return_value, MarshalledValue::Vec3([0.0, 0.0, 0.0]));
}

#[test]
fn test_static_scalars() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;

    assert_eq!(d.invoke_static("Math", "Add", &[int(2), int(3)]).return_value, int(5));
    assert_eq!(
        d.invoke_static(
            "Math",
            "Lerp",
            &[
                MarshalledValue::Float64(0.0),
                MarshalledValue::Float64(10.0),
                MarshalledValue::Float64(0.25)
            ]
        )
        .return_value,
        MarshalledValue::Float64(2.5)
    );
    assert_eq!(
        d.invoke_static("Math", "Length", &[MarshalledValue::Vec3([3.0, 4.0, 0.0])])
            .return_value,
        MarshalledValue::Float32(5.0)
    );
    assert_eq!(
        d.invoke_static("Math", "Identity", &[]).return_value,
        MarshalledValue::Quat([0.0, 0.0, 0.0, 1.0])
    );
}

#[test]
fn test_arity_only_picks_first_overload() {
    let fixture = Fixture::new();
    let args = [MarshalledValue::Float32(1.5), MarshalledValue::Float32(2.0)];
    let result = fixture.dispatcher.invoke_static("Math", "Add", &args);

    // The int overload is chosen and its first argument fails to marshal
    assert_failed(&result, DispatchErrorKind::MarshalFailure);
    assert_eq!(result.error_index, Some(0));
    assert!(result.error_message.starts_with("Failed to marshal argument 0"));
}

#[test]
fn test_arity_then_kind_policy() {
    let fixture = Fixture::with_options(DispatchOptions {
        overload_policy: OverloadPolicy::ArityThenKind,
    });
    let args = [MarshalledValue::Float32(1.5), MarshalledValue::Float32(2.0)];
    assert_eq!(
        fixture.dispatcher.invoke_static("Math", "Add", &args).return_value,
        MarshalledValue::Float32(3.5)
    );
    assert_eq!(
        fixture.dispatcher.invoke_static("Math", "Add", &[int(1), int(1)]).return_value,
        int(2)
    );
}

#[test]
fn test_static_arity_mismatch() {
    let fixture = Fixture::new();
    let result = fixture
        .dispatcher
        .invoke_static("Math", "Add", &[int(1), int(2), int(3)]);
    assert_failed(&result, DispatchErrorKind::ArityMismatch);
    assert!(result.error_message.starts_with("Static method not found: Math.Add"));
}

#[test]
fn test_static_not_found() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;

    let result = d.invoke_static("Math", "Nope", &[]);
    assert_failed(&result, DispatchErrorKind::NotFound);
    assert_eq!(result.error_message, "Static method not found: Math.Nope");

    let result = d.invoke_static("Nope", "CreateZero", &[]);
    assert_failed(&result, DispatchErrorKind::NotFound);
    assert_eq!(result.error_message, "Class not found: Nope");

    // Instance methods are not visible to static calls
    assert_failed(
        &d.invoke_static("Widget", "Area", &[]),
        DispatchErrorKind::NotFound,
    );
    // Hidden classes are not in the catalog
    assert_failed(
        &d.invoke_static("HiddenInternal", "Poke", &[]),
        DispatchErrorKind::NotFound,
    );
}

#[test]
fn test_invocation_failure() {
    let fixture = Fixture::new();
    let args = [MarshalledValue::Int64(1), MarshalledValue::Int64(0)];
    let result = fixture.dispatcher.invoke_static("Math", "Divide", &args);
    assert_failed(&result, DispatchErrorKind::InvocationFailure);
    assert_eq!(result.error_message, "Method invocation failed: Math.Divide");
}

#[test]
fn test_unbound_method() {
    let fixture = Fixture::new();
    let result = fixture.dispatcher.invoke_static("Unbound", "Ping", &[]);
    assert_failed(&result, DispatchErrorKind::NoBinding);
}

#[test]
fn test_deprecated_class_callable() {
    let fixture = Fixture::new();
    let result = fixture.dispatcher.invoke_static("Legacy", "Echo", &[]);
    assert_eq!(result.return_value, MarshalledValue::Bool(true));
}

// ===== Instance Tests =====

#[test]
fn test_default_construction() {
    let fixture = Fixture::new();
    let widget = fixture.create("Widget", &[]);
    let d = &fixture.dispatcher;

    assert_eq!(d.invoke_instance("Widget", "Area", widget, &[]).return_value, int(1));
    assert_eq!(
        d.get_property("Widget", "Name", widget).return_value,
        MarshalledValue::String("widget".to_string())
    );
    assert!(d.destroy_instance("Widget", widget).success);
}

#[test]
fn test_resize_and_area() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;
    let widget = fixture.create("Widget", &[int(4), int(5)]);

    assert_eq!(d.invoke_instance("Widget", "Area", widget, &[]).return_value, int(20));

    let result = d.invoke_instance("Widget", "Resize", widget, &[int(3), int(7)]);
    assert!(result.success);
    assert_eq!(result.return_value, MarshalledValue::Void);
    assert_eq!(d.invoke_instance("Widget", "Area", widget, &[]).return_value, int(21));

    // One-argument overload
    d.invoke_instance("Widget", "Resize", widget, &[int(6)]);
    assert_eq!(d.invoke_instance("Widget", "Area", widget, &[]).return_value, int(36));

    let result = d.invoke_instance("Widget", "Resize", widget, &[int(1), int(2), int(3)]);
    assert_failed(&result, DispatchErrorKind::ArityMismatch);
    assert!(result.error_message.starts_with("Instance method not found: Widget.Resize"));

    assert!(d.destroy_instance("Widget", widget).success);
}

#[test]
fn test_named_constructor() {
    let fixture = Fixture::new();
    let widget = fixture.create("Widget", &[MarshalledValue::from("panel")]);
    assert_eq!(
        fixture.dispatcher.get_property("Widget", "Name", widget).return_value,
        MarshalledValue::String("panel".to_string())
    );
    fixture.dispatcher.destroy_instance("Widget", widget);
}

#[test]
fn test_handle_return_and_argument() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;
    let widget = fixture.create("Widget", &[int(2), int(3)]);

    let clone = d.invoke_instance("Widget", "Clone", widget, &[]).return_value;
    match &clone {
        MarshalledValue::OpaqueHandle { handle, type_name } => {
            assert!(!handle.is_null());
            assert_ne!(*handle, widget);
            assert_eq!(type_name, "Widget");
        }
        other => panic!("expected handle, got {:?}", other),
    }
    let clone = clone.as_handle().unwrap();
    assert_eq!(d.invoke_instance("Widget", "Area", clone, &[]).return_value, int(6));

    // A handle passes into a slot of an unregistered type
    let attached = d.invoke_instance(
        "Widget",
        "Attach",
        widget,
        &[MarshalledValue::opaque(clone, "NativeBlob")],
    );
    assert_eq!(attached.return_value, MarshalledValue::Bool(true));

    let result = d.invoke_instance("Widget", "Attach", widget, &[int(1)]);
    assert_failed(&result, DispatchErrorKind::MarshalFailure);
    assert_eq!(result.error_index, Some(0));

    assert!(d.destroy_instance("Widget", clone).success);
    assert!(d.destroy_instance("Widget", widget).success);
}

#[test]
fn test_null_instance() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;

    let result = d.invoke_instance("Widget", "Area", Handle::null(), &[]);
    assert_failed(&result, DispatchErrorKind::MarshalFailure);
    assert_eq!(result.error_message, "Instance handle is null");
    assert_eq!(result.error_index, None);

    assert_failed(
        &d.get_property("Widget", "Width", Handle::null()),
        DispatchErrorKind::MarshalFailure,
    );
    assert_failed(
        &d.destroy_instance("Widget", Handle::null()),
        DispatchErrorKind::MarshalFailure,
    );
}

#[test]
fn test_derived_class() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;
    let button = fixture.create("Button", &[]);

    assert_eq!(
        d.invoke_instance("Button", "Press", button, &[]).return_value,
        MarshalledValue::UInt32(1)
    );
    assert_eq!(
        d.invoke_instance("Button", "Press", button, &[]).return_value,
        MarshalledValue::UInt32(2)
    );
    d.invoke_instance("Button", "Resize", button, &[int(5)]);
    assert_eq!(d.invoke_instance("Button", "Area", button, &[]).return_value, int(25));
    assert!(d.destroy_instance("Button", button).success);
}

// ===== Lifecycle Tests =====

#[test]
fn test_create_destroy_leaves_catalog_unchanged() {
    let fixture = Fixture::new();
    let before = fixture.dispatcher.reflector().catalog().unwrap();

    let widget = fixture.create("Widget", &[int(1), int(1)]);
    assert!(fixture.dispatcher.destroy_instance("Widget", widget).success);

    let after = fixture.dispatcher.reflector().catalog().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(before.class_names(), after.class_names());
}

#[test]
fn test_create_failures() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;

    let result = d.create_instance("Widget", &[int(1), int(2), int(3)]);
    assert_failed(&result, DispatchErrorKind::ArityMismatch);
    assert!(result.error_message.contains("no constructor takes 3 arguments"));

    assert_failed(&d.create_instance("Unbound", &[]), DispatchErrorKind::NoBinding);
    assert_failed(&d.create_instance("Nope", &[]), DispatchErrorKind::NotFound);

    let result = d.create_instance("Widget", &[int(1), MarshalledValue::Bool(true)]);
    assert_failed(&result, DispatchErrorKind::MarshalFailure);
    assert_eq!(result.error_index, Some(1));
}

#[test]
fn test_destroy_without_hooks() {
    let fixture = Fixture::new();
    let mut dummy = 0u8;
    let handle = Handle::from_ptr(&mut dummy as *mut u8 as *mut std::ffi::c_void);
    assert_failed(
        &fixture.dispatcher.destroy_instance("Unbound", handle),
        DispatchErrorKind::NoBinding,
    );
}

// ===== Property Tests =====

#[test]
fn test_instance_properties() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;
    let widget = fixture.create("Widget", &[int(4), int(2)]);

    assert_eq!(d.get_property("Widget", "Width", widget).return_value, int(4));
    let result = d.set_property("Widget", "Width", widget, &int(9));
    assert!(result.success);
    assert_eq!(result.return_value, MarshalledValue::Void);
    assert_eq!(d.get_property("Widget", "Width", widget).return_value, int(9));
    assert_eq!(d.invoke_instance("Widget", "Area", widget, &[]).return_value, int(18));

    d.invoke_instance(
        "Widget",
        "MoveTo",
        widget,
        &[MarshalledValue::from(Vector3::new(1.0, 2.0, 3.0))],
    );
    assert_eq!(
        d.get_property("Widget", "Position", widget).return_value,
        MarshalledValue::Vec3([1.0, 2.0, 3.0])
    );

    d.destroy_instance("Widget", widget);
}

#[test]
fn test_property_failures() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;
    let widget = fixture.create("Widget", &[]);

    assert_failed(
        &d.set_property("Widget", "Position", widget, &MarshalledValue::Vec3([0.0; 3])),
        DispatchErrorKind::NoBinding,
    );
    assert_failed(
        &d.get_property("Widget", "Payload", widget),
        DispatchErrorKind::MarshalFailure,
    );
    assert_failed(
        &d.set_property("Widget", "Width", widget, &MarshalledValue::Float32(1.0)),
        DispatchErrorKind::MarshalFailure,
    );
    let result = d.get_property("Widget", "Depth", widget);
    assert_failed(&result, DispatchErrorKind::NotFound);
    assert_eq!(result.error_message, "Property not found: Widget.Depth");

    d.destroy_instance("Widget", widget);
}

// ===== Global Tests =====

#[test]
fn test_global_functions() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;

    assert_eq!(d.invoke_global("Add", &[int(40), int(2)]).return_value, int(42));
    assert_eq!(
        d.invoke_global("GetVersion", &[]).return_value,
        MarshalledValue::String(dynbind_sample::VERSION.to_string())
    );
    assert_failed(&d.invoke_global("Fail", &[]), DispatchErrorKind::InvocationFailure);

    let result = d.invoke_global("Missing", &[]);
    assert_failed(&result, DispatchErrorKind::NotFound);
    assert_eq!(result.error_message, "Global method not found: Missing");
    assert_failed(&d.invoke_global("Add", &[int(1)]), DispatchErrorKind::ArityMismatch);
}

#[test]
fn test_global_properties() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;

    assert_eq!(
        d.get_global_property("TimeScale").return_value,
        MarshalledValue::Float32(1.0)
    );
    assert!(d.set_global_property("TimeScale", &MarshalledValue::Float32(2.5)).success);
    assert_eq!(*fixture.model.globals.time_scale.lock(), 2.5);
    assert_eq!(
        d.get_global_property("TimeScale").return_value,
        MarshalledValue::Float32(2.5)
    );

    // Setter rejects the value
    assert_failed(
        &d.set_global_property("TimeScale", &MarshalledValue::Float32(-1.0)),
        DispatchErrorKind::InvocationFailure,
    );
    assert_eq!(*fixture.model.globals.time_scale.lock(), 2.5);

    assert_eq!(
        d.get_global_property("BuildId").return_value,
        MarshalledValue::UInt64(fixture.model.globals.build_id)
    );
    assert_failed(
        &d.set_global_property("BuildId", &MarshalledValue::UInt64(1)),
        DispatchErrorKind::NoBinding,
    );
    assert_failed(&d.get_global_property("Gravity"), DispatchErrorKind::NotFound);
}

// ===== Event Tests =====

#[test]
fn test_broadcast_event() {
    let fixture = Fixture::new();
    let result = fixture.dispatcher.broadcast_event(
        "TransformBus",
        "OnMoved",
        &[MarshalledValue::Vec3([1.0, 0.0, 0.0])],
    );
    assert!(result.success, "{}", result.error_message);

    let delivered = fixture.model.events.last().unwrap();
    assert_eq!(delivered.event, "OnMoved");
    assert_eq!(delivered.address, None);
    assert_eq!(delivered.position, Some(Vector3::new(1.0, 0.0, 0.0)));
}

#[test]
fn test_addressed_event() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;

    let result = d.send_event(
        "TransformBus",
        "OnMoved",
        &MarshalledValue::UInt64(42),
        &[MarshalledValue::Vec3([0.0, 2.0, 0.0])],
    );
    assert!(result.success, "{}", result.error_message);
    assert_eq!(fixture.model.events.last().unwrap().address, Some(42));

    assert!(d
        .send_event("TransformBus", "Reset", &MarshalledValue::UInt64(7), &[])
        .success);
    assert_eq!(fixture.model.events.len(), 2);
}

#[test]
fn test_event_return_value() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;
    assert_eq!(d.broadcast_event("TransformBus", "Ping", &[]).return_value, int(1));
    assert_eq!(d.broadcast_event("TransformBus", "Ping", &[]).return_value, int(2));
}

#[test]
fn test_event_failures() {
    let fixture = Fixture::new();
    let d = &fixture.dispatcher;

    assert_failed(
        &d.broadcast_event("TransformBus", "Reset", &[]),
        DispatchErrorKind::NotImplemented,
    );
    assert_failed(
        &d.send_event("TransformBus", "Ping", &MarshalledValue::UInt64(1), &[]),
        DispatchErrorKind::NotImplemented,
    );
    assert_failed(
        &d.broadcast_event("TransformBus", "Unbound", &[]),
        DispatchErrorKind::NoBinding,
    );
    assert_failed(
        &d.broadcast_event("TransformBus", "OnMoved", &[]),
        DispatchErrorKind::ArityMismatch,
    );
    assert_failed(
        &d.send_event("TransformBus", "Reset", &int(7), &[]),
        DispatchErrorKind::MarshalFailure,
    );
    assert_failed(
        &d.broadcast_event("TransformBus", "Teleport", &[]),
        DispatchErrorKind::NotFound,
    );
    assert_failed(&d.broadcast_event("Nope", "Ping", &[]), DispatchErrorKind::NotFound);

    assert!(fixture.model.events.is_empty());
}
