//! Sample native object model
//!
//! A small model registered into a [`NativeRegistry`]:
//!
//! - `Math`: static helpers (`CreateZero`, `Add` overloads, `Lerp`)
//! - `Widget`: constructible object with methods and properties
//! - `Button`: derives from `Widget`
//! - `TransformBus`: channel with broadcast and addressed events
//! - free functions (`Add`, `GetVersion`, `Fail`) and properties (`TimeScale`, `BuildId`)
//! - entries exercising the edges of reflection: hidden, scoped, unbound,
//!   deprecated, declared before their base
//!
//! Used by the CLI and by integration tests.

mod bus;
mod edges;
mod globals;
mod math;
mod widget;

use std::sync::Arc;

use dynbind_sdk::NativeRegistry;
use parking_lot::Mutex;

pub use bus::{DeliveredEvent, EventLog};
pub use widget::Widget;

/// Type ids of the sample types
pub mod ids {
    use dynbind_sdk::TypeId;

    /// `Math`
    pub const MATH: TypeId = TypeId::from_name("Math");
    /// `Widget`
    pub const WIDGET: TypeId = TypeId::from_name("Widget");
    /// `Button`
    pub const BUTTON: TypeId = TypeId::from_name("Button");
    /// `TransformBus`
    pub const TRANSFORM_BUS: TypeId = TypeId::from_name("TransformBus");
    /// Never registered; classifies as `Unknown`
    pub const NATIVE_BLOB: TypeId = TypeId::from_name("NativeBlob");
    /// `HiddenInternal`
    pub const HIDDEN: TypeId = TypeId::from_name("HiddenInternal");
    /// `LauncherOnly`
    pub const LAUNCHER_ONLY: TypeId = TypeId::from_name("LauncherOnly");
    /// `Unbound`
    pub const UNBOUND: TypeId = TypeId::from_name("Unbound");
    /// `Legacy`
    pub const LEGACY: TypeId = TypeId::from_name("Legacy");
    /// `EarlyDerived`
    pub const EARLY_DERIVED: TypeId = TypeId::from_name("EarlyDerived");
    /// `LateBase`
    pub const LATE_BASE: TypeId = TypeId::from_name("LateBase");
}

/// Version string reported by `GetVersion`
pub const VERSION: &str = "1.4.2";

/// Shared state behind the sample's free properties
#[derive(Debug)]
pub struct GlobalState {
    /// Backing store of `TimeScale`
    pub time_scale: Mutex<f32>,
    /// Value of `BuildId`
    pub build_id: u64,
}

impl Default for GlobalState {
    fn default() -> Self {
        GlobalState {
            time_scale: Mutex::new(1.0),
            build_id: 20240611,
        }
    }
}

/// The registered model plus handles on its observable state
pub struct SampleModel {
    /// Reflection registry
    pub registry: NativeRegistry,
    /// Every event delivered through `TransformBus`
    pub events: EventLog,
    /// Free property state
    pub globals: Arc<GlobalState>,
}

impl SampleModel {
    /// Register the full model
    pub fn new() -> Self {
        let events = EventLog::default();
        let globals = Arc::new(GlobalState::default());

        let mut registry = NativeRegistry::new();
        math::register(&mut registry);
        widget::register(&mut registry);
        edges::register(&mut registry);
        bus::register(&mut registry, &events);
        globals::register(&mut registry, &globals);

        log::debug!(
            "Sample model registered: {} classes, {} channels",
            registry.class_count(),
            registry.channel_count()
        );

        SampleModel {
            registry,
            events,
            globals,
        }
    }
}

impl Default for SampleModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of the sample model, without its state handles
pub fn sample_registry() -> NativeRegistry {
    SampleModel::new().registry
}
