//! `TransformBus` channel and the log its handlers append to

use std::sync::Arc;

use dynbind_sdk::{
    builtin, native_fn, read_arg, Attributes, NativeRegistry, RegistryChannel, RegistryEvent,
    RegistryMethod, RegistryParameter, Vector3,
};
use parking_lot::Mutex;

use crate::ids;

/// One delivery observed by a bus handler
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredEvent {
    /// Event name
    pub event: String,
    /// Entity address; `None` for broadcasts
    pub address: Option<u64>,
    /// Position carried by `OnMoved`
    pub position: Option<Vector3>,
}

/// Shared, append-only record of bus deliveries
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<DeliveredEvent>>>,
}

impl EventLog {
    fn record(&self, event: &str, address: Option<u64>, position: Option<Vector3>) -> usize {
        log::debug!("TransformBus.{} delivered (address {:?})", event, address);
        let mut entries = self.entries.lock();
        entries.push(DeliveredEvent {
            event: event.to_string(),
            address,
            position,
        });
        entries.len()
    }

    /// Snapshot of all deliveries so far
    pub fn entries(&self) -> Vec<DeliveredEvent> {
        self.entries.lock().clone()
    }

    /// Number of deliveries so far
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check whether nothing was delivered
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Most recent delivery
    pub fn last(&self) -> Option<DeliveredEvent> {
        self.entries.lock().last().cloned()
    }

    /// Forget all deliveries
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

pub(crate) fn register(registry: &mut NativeRegistry, events: &EventLog) {
    let on_moved = {
        let broadcast_log = events.clone();
        let addressed_log = events.clone();
        RegistryEvent::new()
            .broadcast(
                RegistryMethod::new()
                    .named_arg("position", builtin::VECTOR3)
                    .bind(native_fn(move |args, _| unsafe {
                        let position: Vector3 = read_arg(args, 0)?;
                        broadcast_log.record("OnMoved", None, Some(position));
                        Ok(())
                    })),
            )
            .addressed(
                RegistryMethod::new()
                    .named_arg("entity_id", builtin::U64)
                    .named_arg("position", builtin::VECTOR3)
                    .bind(native_fn(move |args, _| unsafe {
                        let address: u64 = read_arg(args, 0)?;
                        let position: Vector3 = read_arg(args, 1)?;
                        addressed_log.record("OnMoved", Some(address), Some(position));
                        Ok(())
                    })),
            )
    };

    let reset = {
        let sink = events.clone();
        RegistryEvent::new().addressed(
            RegistryMethod::new()
                .named_arg("entity_id", builtin::U64)
                .bind(native_fn(move |args, _| unsafe {
                    let address: u64 = read_arg(args, 0)?;
                    sink.record("Reset", Some(address), None);
                    Ok(())
                })),
        )
    };

    let ping = {
        let sink = events.clone();
        RegistryEvent::new().broadcast(
            RegistryMethod::new()
                .returns(builtin::S32)
                .bind(native_fn(move |_, ret| unsafe {
                    let count = sink.record("Ping", None, None);
                    ret.write(count as i32)
                })),
        )
    };

    let channel = RegistryChannel::new(ids::TRANSFORM_BUS)
        .with_attributes(
            Attributes::new()
                .category("Components")
                .description("Entity transform notifications")
                .module("Core"),
        )
        .address(RegistryParameter::named("entity_id", builtin::U64))
        .event("OnMoved", on_moved)
        .event("Reset", reset)
        .event("Ping", ping)
        .event("Unbound", RegistryEvent::new().broadcast(RegistryMethod::new()));

    registry.register_channel("TransformBus", channel);
}
