//! Boundary gateway
//!
//! String and JSON verbs for a foreign runtime bridge. The gateway borrows a
//! [`Dispatcher`] for its whole lifetime; nothing here is global.
//!
//! Values use the [`MarshalledValue`] JSON encoding
//! (`{"kind": "Int32", "value": 3}`), argument lists are JSON arrays of them,
//! and invocation verbs answer with a serialized [`DispatchResult`].

use dynbind_sdk::Handle;
use serde::Serialize;

use crate::dispatch::{DispatchError, DispatchResult, Dispatcher};
use crate::marshal::{MarshalError, MarshalledValue};

const EMPTY_ARRAY: &str = "[]";

/// JSON/string facade over a borrowed dispatcher
#[derive(Debug, Clone, Copy)]
pub struct BoundaryGateway<'d> {
    dispatcher: &'d Dispatcher,
}

impl<'d> BoundaryGateway<'d> {
    /// Wrap `dispatcher`
    pub fn new(dispatcher: &'d Dispatcher) -> Self {
        BoundaryGateway { dispatcher }
    }

    /// The wrapped dispatcher
    pub fn dispatcher(&self) -> &'d Dispatcher {
        self.dispatcher
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Sorted class names as a JSON array
    pub fn class_names(&self) -> String {
        match self.dispatcher.reflector().catalog() {
            Some(catalog) => to_json(&catalog.class_names()),
            None => EMPTY_ARRAY.to_string(),
        }
    }

    /// Method names of `class_name` as a JSON array
    pub fn method_names(&self, class_name: &str) -> String {
        let catalog = self.dispatcher.reflector().catalog();
        match catalog.as_deref().and_then(|c| c.get_class(class_name)) {
            Some(class) => to_json(&class.method_names()),
            None => EMPTY_ARRAY.to_string(),
        }
    }

    /// Property names of `class_name` as a JSON array
    pub fn property_names(&self, class_name: &str) -> String {
        let catalog = self.dispatcher.reflector().catalog();
        match catalog.as_deref().and_then(|c| c.get_class(class_name)) {
            Some(class) => to_json(&class.property_names()),
            None => EMPTY_ARRAY.to_string(),
        }
    }

    /// Sorted channel names as a JSON array
    pub fn channel_names(&self) -> String {
        match self.dispatcher.reflector().catalog() {
            Some(catalog) => to_json(&catalog.channel_names()),
            None => EMPTY_ARRAY.to_string(),
        }
    }

    /// Event names of `channel_name` as a JSON array
    pub fn event_names(&self, channel_name: &str) -> String {
        let catalog = self.dispatcher.reflector().catalog();
        match catalog.as_deref().and_then(|c| c.get_channel(channel_name)) {
            Some(channel) => to_json(&channel.event_names()),
            None => EMPTY_ARRAY.to_string(),
        }
    }

    /// Check for a class
    pub fn class_exists(&self, class_name: &str) -> bool {
        self.dispatcher
            .reflector()
            .catalog()
            .map(|c| c.has_class(class_name))
            .unwrap_or(false)
    }

    /// Check for a method on a class
    pub fn method_exists(&self, class_name: &str, method_name: &str) -> bool {
        self.dispatcher
            .reflector()
            .catalog()
            .map(|c| c.has_method(class_name, method_name))
            .unwrap_or(false)
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    // An unbuilt catalog is reported before any JSON is looked at.
    fn ready(&self) -> Result<(), DispatchError> {
        if self.dispatcher.is_initialized() {
            Ok(())
        } else {
            Err(DispatchError::Uninitialized)
        }
    }

    fn args(&self, json: &str) -> Result<Vec<MarshalledValue>, DispatchError> {
        self.ready()?;
        parse_args(json)
    }

    fn value(&self, json: &str) -> Result<MarshalledValue, DispatchError> {
        self.ready()?;
        parse_value(json)
    }

    /// Call a static method with JSON-encoded arguments
    pub fn invoke_static(&self, class_name: &str, method_name: &str, args_json: &str) -> String {
        respond(self.args(args_json).map(|args| {
            self.dispatcher.invoke_static(class_name, method_name, &args)
        }))
    }

    /// Call an instance method with JSON-encoded arguments
    pub fn invoke_instance(&self, class_name: &str, method_name: &str, instance: u64, args_json: &str) -> String {
        respond(self.args(args_json).map(|args| {
            self.dispatcher
                .invoke_instance(class_name, method_name, Handle::from_addr(instance), &args)
        }))
    }

    /// Call a free function with JSON-encoded arguments
    pub fn invoke_global(&self, method_name: &str, args_json: &str) -> String {
        respond(self.args(args_json).map(|args| self.dispatcher.invoke_global(method_name, &args)))
    }

    /// Read a class property (`instance` 0 for static accessors)
    pub fn get_property(&self, class_name: &str, property_name: &str, instance: u64) -> String {
        respond(Ok(self
            .dispatcher
            .get_property(class_name, property_name, Handle::from_addr(instance))))
    }

    /// Write a class property from a JSON-encoded value
    pub fn set_property(&self, class_name: &str, property_name: &str, instance: u64, value_json: &str) -> String {
        respond(self.value(value_json).map(|value| {
            self.dispatcher
                .set_property(class_name, property_name, Handle::from_addr(instance), &value)
        }))
    }

    /// Read a free property
    pub fn get_global_property(&self, property_name: &str) -> String {
        respond(Ok(self.dispatcher.get_global_property(property_name)))
    }

    /// Write a free property from a JSON-encoded value
    pub fn set_global_property(&self, property_name: &str, value_json: &str) -> String {
        respond(self.value(value_json).map(|value| self.dispatcher.set_global_property(property_name, &value)))
    }

    /// Broadcast an event with JSON-encoded arguments
    pub fn broadcast_event(&self, channel: &str, event: &str, args_json: &str) -> String {
        respond(self.args(args_json).map(|args| self.dispatcher.broadcast_event(channel, event, &args)))
    }

    /// Send an addressed event with a JSON-encoded address and arguments
    pub fn send_event(&self, channel: &str, event: &str, address_json: &str, args_json: &str) -> String {
        respond(self.value(address_json).and_then(|address| {
            parse_args(args_json).map(|args| self.dispatcher.send_event(channel, event, &address, &args))
        }))
    }

    /// Create an instance; returns its address, or 0 on failure
    pub fn create_instance(&self, class_name: &str, args_json: &str) -> u64 {
        let result = match self.args(args_json) {
            Ok(args) => self.dispatcher.create_instance(class_name, &args),
            Err(error) => DispatchResult::error(&error),
        };
        if !result.success {
            log::debug!("create_instance({}) failed: {}", class_name, result.error_message);
        }
        result.return_value.as_handle().map(Handle::addr).unwrap_or(0)
    }

    /// Destroy an instance created by [`BoundaryGateway::create_instance`]
    pub fn destroy_instance(&self, class_name: &str, instance: u64) -> bool {
        self.dispatcher
            .destroy_instance(class_name, Handle::from_addr(instance))
            .success
    }
}

/// Decode a JSON argument array. Empty input is an empty list.
///
/// Elements are decoded one by one so a bad element reports its index.
pub fn parse_args(json: &str) -> Result<Vec<MarshalledValue>, DispatchError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| DispatchError::Value(MarshalError::Malformed(e.to_string())))?;
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|e| DispatchError::Argument {
                index,
                source: MarshalError::Malformed(e.to_string()),
            })
        })
        .collect()
}

/// Decode one JSON value
pub fn parse_value(json: &str) -> Result<MarshalledValue, DispatchError> {
    serde_json::from_str(json).map_err(|e| DispatchError::Value(MarshalError::Malformed(e.to_string())))
}

fn respond(outcome: Result<DispatchResult, DispatchError>) -> String {
    let result = outcome.unwrap_or_else(|error| DispatchResult::error(&error));
    to_json(&result)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Failed to encode gateway response: {}", e);
        r#"{"success":false,"error_message":"response encoding failed","return_value":{"kind":"Void"}}"#
            .to_string()
    })
}
