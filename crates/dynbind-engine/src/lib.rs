//! dynbind engine
//!
//! Runtime discovery and invocation of a native object model through
//! reflection metadata alone:
//!
//! - [`marshal`]: the closed [`MarshalKind`] vocabulary, the [`MarshalledValue`]
//!   tagged union, and conversion to and from the native call representation
//! - [`catalog`]: the [`Reflector`] that walks a [`NativeRegistry`] and
//!   publishes an immutable [`TypeCatalog`]
//! - [`dispatch`]: the [`Dispatcher`] that resolves, marshals and invokes calls
//! - [`gateway`]: string/JSON verbs for a foreign runtime bridge
//! - [`export`]: JSON export of a built catalog
//! - [`config`]: TOML-backed engine configuration
//!
//! [`NativeRegistry`]: dynbind_sdk::NativeRegistry

#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod export;
pub mod gateway;
pub mod marshal;

pub use catalog::{
    BuildError, BuildOptions, ChannelDescriptor, ClassDescriptor, EventDescriptor,
    MethodDescriptor, ParameterDescriptor, PropertyDescriptor, Reflector, TypeCatalog,
};
pub use config::{ConfigError, EngineConfig};
pub use dispatch::{
    DispatchError, DispatchErrorKind, DispatchOptions, DispatchResult, Dispatcher, OverloadPolicy,
};
pub use export::{CatalogExporter, ExportConfig, ExportError, ExportSummary};
pub use gateway::BoundaryGateway;
pub use marshal::{MarshalError, MarshalKind, MarshalledValue, ScratchArena};
