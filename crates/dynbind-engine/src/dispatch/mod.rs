//! Generic dispatch
//!
//! The [`Dispatcher`] resolves named calls against the published catalog,
//! marshals arguments into a per-call arena, invokes the native callable and
//! marshals the result back. Every verb returns a [`DispatchResult`].

mod dispatcher;
mod events;
mod resolve;
mod result;

pub use dispatcher::Dispatcher;
pub use resolve::{resolve_overload, OverloadPolicy, Resolution};
pub use result::{CallFlavor, DispatchError, DispatchErrorKind, DispatchResult};

use serde::{Deserialize, Serialize};

/// Dispatcher options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchOptions {
    /// Overload selection policy
    pub overload_policy: OverloadPolicy,
}
