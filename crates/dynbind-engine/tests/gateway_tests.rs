//! Boundary Gateway Tests
//!
//! Exercises the JSON surface: name queries, argument decoding, and the
//! encoded results of each verb.
//!
//! # Running Tests
//! ```bash
//! cargo test -p dynbind-engine --test gateway_tests
//! ```

use std::sync::Arc;

use dynbind_engine::gateway::{parse_args, parse_value};
use dynbind_engine::{BoundaryGateway, DispatchErrorKind, DispatchResult, Dispatcher, MarshalledValue, Reflector};
use dynbind_sample::SampleModel;

fn sample_dispatcher() -> (SampleModel, Dispatcher) {
    let model = SampleModel::new();
    let reflector = Arc::new(Reflector::new());
    reflector.build(Some(&model.registry)).unwrap();
    (model, Dispatcher::new(reflector))
}

fn decode(json: &str) -> DispatchResult {
    serde_json::from_str(json).unwrap()
}

// ===== Query Tests =====

#[test]
fn test_queries_before_build() {
    let dispatcher = Dispatcher::new(Arc::new(Reflector::new()));
    let gateway = BoundaryGateway::new(&dispatcher);
    assert_eq!(gateway.class_names(), "[]");
    assert_eq!(gateway.channel_names(), "[]");
    assert_eq!(gateway.method_names("Math"), "[]");
    assert!(!gateway.class_exists("Math"));

    let result = decode(&gateway.invoke_static("Math", "CreateZero", "[]"));
    assert_eq!(result.error_kind, Some(DispatchErrorKind::Uninitialized));
}

#[test]
fn test_uninitialized_wins_over_bad_json() {
    let dispatcher = Dispatcher::new(Arc::new(Reflector::new()));
    let gateway = BoundaryGateway::new(&dispatcher);
    let bad = "[{\"kind\":";

    let responses = [
        gateway.invoke_static("Math", "CreateZero", bad),
        gateway.invoke_instance("Widget", "Resize", 1, bad),
        gateway.invoke_global("Add", bad),
        gateway.set_property("Widget", "Width", 1, bad),
        gateway.set_global_property("TimeScale", bad),
        gateway.broadcast_event("TransformBus", "OnMoved", bad),
        gateway.send_event("TransformBus", "OnMoved", bad, bad),
    ];
    for json in &responses {
        let result = decode(json);
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(DispatchErrorKind::Uninitialized));
        assert_eq!(result.error_index, None);
    }
    assert_eq!(gateway.create_instance("Widget", bad), 0);
}

#[test]
fn test_name_queries() {
    let (_model, dispatcher) = sample_dispatcher();
    let gateway = BoundaryGateway::new(&dispatcher);

    let classes: Vec<String> = serde_json::from_str(&gateway.class_names()).unwrap();
    assert!(classes.contains(&"Widget".to_string()));
    assert_eq!(
        gateway.method_names("Math"),
        r#"["CreateZero","Add","Lerp","Length","Divide","Identity"]"#
    );
    assert_eq!(
        gateway.property_names("Widget"),
        r#"["Width","Name","Position","Payload"]"#
    );
    assert_eq!(gateway.channel_names(), r#"["TransformBus"]"#);
    assert_eq!(gateway.event_names("TransformBus"), r#"["OnMoved","Reset","Ping","Unbound"]"#);
    assert_eq!(gateway.method_names("Nope"), "[]");

    assert!(gateway.class_exists("Math"));
    assert!(gateway.method_exists("Widget", "Resize"));
    assert!(!gateway.method_exists("Widget", "Explode"));
}

// ===== Decoding Tests =====

#[test]
fn test_parse_args() {
    assert!(parse_args("").unwrap().is_empty());
    assert!(parse_args("  ").unwrap().is_empty());
    assert_eq!(
        parse_args(r#"[{"kind":"Int32","value":2},{"kind":"String","value":"x"}]"#).unwrap(),
        vec![MarshalledValue::Int32(2), MarshalledValue::String("x".to_string())]
    );

    let err = parse_args(r#"[{"kind":"Int32","value":2},{"kind":"Mystery"}]"#).unwrap_err();
    assert_eq!(err.kind(), DispatchErrorKind::MarshalFailure);
    assert_eq!(err.failing_index(), Some(1));

    let err = parse_args("not json").unwrap_err();
    assert_eq!(err.kind(), DispatchErrorKind::MarshalFailure);
    assert_eq!(err.failing_index(), None);
}

#[test]
fn test_parse_value() {
    assert_eq!(parse_value(r#"{"kind":"Void"}"#).unwrap(), MarshalledValue::Void);
    assert_eq!(
        parse_value(r#"{"kind":"Vec3","value":[1.0,2.0,3.0]}"#).unwrap(),
        MarshalledValue::Vec3([1.0, 2.0, 3.0])
    );
    assert!(parse_value("{}").is_err());
}

// ===== Invocation Tests =====

#[test]
fn test_invoke_static_json() {
    let (_model, dispatcher) = sample_dispatcher();
    let gateway = BoundaryGateway::new(&dispatcher);

    let json = gateway.invoke_static(
        "Math",
        "Add",
        r#"[{"kind":"Int32","value":2},{"kind":"Int32","value":3}]"#,
    );
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["error_message"], "");
    assert_eq!(value["return_value"]["kind"], "Int32");
    assert_eq!(value["return_value"]["value"], 5);
    assert!(value.get("error_kind").is_none());
}

#[test]
fn test_malformed_args_reported() {
    let (_model, dispatcher) = sample_dispatcher();
    let gateway = BoundaryGateway::new(&dispatcher);

    let result = decode(&gateway.invoke_global("Add", r#"[{"kind":"Int32","value":"two"}]"#));
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(DispatchErrorKind::MarshalFailure));
    assert_eq!(result.error_index, Some(0));
}

#[test]
fn test_instance_lifecycle_json() {
    let (_model, dispatcher) = sample_dispatcher();
    let gateway = BoundaryGateway::new(&dispatcher);

    let widget = gateway.create_instance(
        "Widget",
        r#"[{"kind":"Int32","value":3},{"kind":"Int32","value":4}]"#,
    );
    assert_ne!(widget, 0);

    let result = decode(&gateway.invoke_instance("Widget", "Area", widget, "[]"));
    assert_eq!(result.return_value, MarshalledValue::Int32(12));

    let result = decode(&gateway.set_property("Widget", "Width", widget, r#"{"kind":"Int32","value":5}"#));
    assert!(result.success);
    let result = decode(&gateway.get_property("Widget", "Width", widget));
    assert_eq!(result.return_value, MarshalledValue::Int32(5));

    assert!(gateway.destroy_instance("Widget", widget));
    assert!(!gateway.destroy_instance("Widget", 0));
    assert_eq!(gateway.create_instance("Unbound", ""), 0);
}

#[test]
fn test_handle_serialized_as_address() {
    let (_model, dispatcher) = sample_dispatcher();
    let gateway = BoundaryGateway::new(&dispatcher);
    let widget = gateway.create_instance("Widget", "");

    let json = gateway.invoke_instance("Widget", "Clone", widget, "");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["return_value"]["kind"], "OpaqueHandle");
    assert_eq!(value["return_value"]["value"]["type_name"], "Widget");
    let clone = value["return_value"]["value"]["handle"].as_u64().unwrap();
    assert_ne!(clone, 0);
    assert_ne!(clone, widget);

    assert!(gateway.destroy_instance("Widget", clone));
    assert!(gateway.destroy_instance("Widget", widget));
}

#[test]
fn test_globals_json() {
    let (model, dispatcher) = sample_dispatcher();
    let gateway = BoundaryGateway::new(&dispatcher);

    let result = decode(&gateway.get_global_property("BuildId"));
    assert_eq!(result.return_value, MarshalledValue::UInt64(model.globals.build_id));

    let result = decode(&gateway.set_global_property("TimeScale", r#"{"kind":"Float32","value":0.5}"#));
    assert!(result.success);
    assert_eq!(*model.globals.time_scale.lock(), 0.5);

    let result = decode(&gateway.set_global_property("TimeScale", "oops"));
    assert_eq!(result.error_kind, Some(DispatchErrorKind::MarshalFailure));
}

#[test]
fn test_events_json() {
    let (model, dispatcher) = sample_dispatcher();
    let gateway = BoundaryGateway::new(&dispatcher);

    let result = decode(&gateway.send_event(
        "TransformBus",
        "OnMoved",
        r#"{"kind":"UInt64","value":9}"#,
        r#"[{"kind":"Vec3","value":[0.0,0.0,1.0]}]"#,
    ));
    assert!(result.success, "{}", result.error_message);
    assert_eq!(model.events.last().unwrap().address, Some(9));

    let result = decode(&gateway.broadcast_event("TransformBus", "Ping", ""));
    assert_eq!(result.return_value, MarshalledValue::Int32(2));

    let result = decode(&gateway.broadcast_event("TransformBus", "Reset", "[]"));
    assert_eq!(result.error_kind, Some(DispatchErrorKind::NotImplemented));
}
