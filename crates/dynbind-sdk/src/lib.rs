//! Dynbind SDK - native side of the dynamic binding boundary
//!
//! This crate holds everything a native object model needs to describe itself
//! to the dynbind engine without depending on the engine:
//!
//! - [`TypeId`] stable type identifiers and the [`builtin`] well-known ids
//! - [`Handle`] opaque object references
//! - [`NativeArgument`] the call representation handed to native callables
//! - [`NativeRegistry`] the reflection tables the catalog builder walks
//!
//! # Example
//!
//! ```ignore
//! use dynbind_sdk::{builtin, native_fn, read_arg, NativeRegistry, RegistryClass, RegistryMethod, TypeId};
//!
//! let mut registry = NativeRegistry::new();
//! registry.register_class(
//!     "Math",
//!     RegistryClass::new(TypeId::from_name("Math")).method(
//!         "Twice",
//!         RegistryMethod::new()
//!             .arg(builtin::S32)
//!             .returns(builtin::S32)
//!             .bind(native_fn(|args, ret| {
//!                 let value: i32 = unsafe { read_arg(args, 0)? };
//!                 unsafe { ret.write(value * 2) }
//!             })),
//!     ),
//! );
//! ```

#![warn(missing_docs)]

#[macro_use]
mod flags;

pub mod argument;
pub mod error;
pub mod handle;
pub mod math;
pub mod registry;
pub mod type_id;

pub use argument::{
    native_fn, object_arg, read_arg, NativeArgument, NativeCallFn, ParamTraits, ReturnSlot,
};
pub use error::{AbiResult, NativeError};
pub use handle::Handle;
pub use math::{Quaternion, Vector3};
pub use registry::{
    AllocateFn, Attributes, ClassLifecycle, ConstructFn, ExcludeFlags, NamedTable, NativeRegistry,
    RegistryChannel, RegistryClass, RegistryEvent, RegistryMethod, RegistryParameter,
    RegistryProperty, ReleaseFn, ScopeFlags,
};
pub use type_id::{builtin, TypeId};
