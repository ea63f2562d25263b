//! Type catalog
//!
//! The [`Reflector`] walks a [`NativeRegistry`](dynbind_sdk::NativeRegistry)
//! once, applies the visibility predicate, classifies every slot and
//! publishes the result as an immutable [`TypeCatalog`] snapshot.

mod builder;
mod classifier;
mod descriptor;
mod store;

pub use builder::Reflector;
pub use classifier::{type_name, ClassNames, Classifier};
pub use descriptor::{
    Binding, ChannelDescriptor, ClassDescriptor, Documentation, EventDescriptor,
    MethodDescriptor, ParameterDescriptor, PropertyDescriptor,
};
pub use store::{category_matches, TypeCatalog, UNKNOWN_MODULE};

use serde::{Deserialize, Serialize};

/// Catalog build options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Run a second pass after the registry walk that resolves base classes
    /// and `Unknown` slots against the complete class map
    pub resolve_forward_references: bool,
}

/// Catalog build errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// No registry was supplied
    #[error("Native registry is null; catalog cleared")]
    NullRegistry,
}
