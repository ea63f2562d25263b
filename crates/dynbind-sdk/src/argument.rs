//! Native call representation
//!
//! A native callable receives its arguments as a slice of [`NativeArgument`]s
//! and an optional result slot. Each argument is a type-tagged pointer:
//!
//! - by value: the pointer addresses storage holding a `T` owned by the caller
//! - by pointer ([`ParamTraits::POINTER`]): the pointer *is* the object address
//!
//! The call reports only success or failure. Richer errors stay on the native
//! side; [`native_fn`] folds an [`AbiResult`] into that convention.

use std::ffi::c_void;
use std::fmt;
use std::sync::Arc;

use crate::{AbiResult, Handle, NativeError, TypeId};

bit_flags! {
    /// Qualifiers on a parameter or result slot
    pub struct ParamTraits: u8 {
        /// Passed by pointer
        const POINTER = 0b001;
        /// Passed by reference
        const REFERENCE = 0b010;
        /// Const-qualified
        const CONST = 0b100;
    }
}

impl ParamTraits {
    /// Pointer qualifier set
    pub const fn is_pointer(self) -> bool {
        self.contains(Self::POINTER)
    }

    /// Reference qualifier set
    pub const fn is_reference(self) -> bool {
        self.contains(Self::REFERENCE)
    }

    /// Const qualifier set
    pub const fn is_const(self) -> bool {
        self.contains(Self::CONST)
    }
}

// ============================================================================
// Native Argument
// ============================================================================

/// One slot of a native call.
#[derive(Clone, Copy)]
pub struct NativeArgument {
    value: *mut c_void,
    type_id: TypeId,
    traits: ParamTraits,
}

// Slots only live for the duration of one call on the calling thread.
unsafe impl Send for NativeArgument {}
unsafe impl Sync for NativeArgument {}

impl NativeArgument {
    /// Slot backed by caller-owned storage holding a `T`
    pub fn from_storage<T>(storage: *mut T, type_id: TypeId, traits: ParamTraits) -> Self {
        NativeArgument {
            value: storage as *mut c_void,
            type_id,
            traits,
        }
    }

    /// Slot passing an object by pointer
    pub fn from_handle(handle: Handle, type_id: TypeId) -> Self {
        NativeArgument {
            value: handle.as_ptr(),
            type_id,
            traits: ParamTraits::POINTER,
        }
    }

    /// Slot with no storage
    pub fn null(type_id: TypeId) -> Self {
        NativeArgument {
            value: std::ptr::null_mut(),
            type_id,
            traits: ParamTraits::NONE,
        }
    }

    /// Declared type of the slot
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Qualifiers of the slot
    pub fn traits(&self) -> ParamTraits {
        self.traits
    }

    /// Raw value pointer
    pub fn value_ptr(&self) -> *mut c_void {
        self.value
    }

    /// Check whether the slot has no storage
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// The object handle carried by this slot.
    ///
    /// Pointer slots carry the address directly; by-value slots are read as a
    /// stored [`Handle`].
    ///
    /// # Safety
    /// A by-value slot must address an initialized `Handle`.
    pub unsafe fn handle(&self) -> Handle {
        if self.traits.is_pointer() {
            Handle::from_ptr(self.value)
        } else {
            self.read::<Handle>().unwrap_or_default()
        }
    }

    /// Copy the value out of by-value storage.
    ///
    /// # Safety
    /// The slot must address an initialized `T`.
    pub unsafe fn read<T: Clone>(&self) -> Option<T> {
        (self.value as *const T).as_ref().cloned()
    }

    /// Borrow by-value storage.
    ///
    /// # Safety
    /// The slot must address an initialized `T` that outlives `'a`.
    pub unsafe fn get<'a, T>(&self) -> Option<&'a T> {
        (self.value as *const T).as_ref()
    }

    /// Overwrite by-value storage, dropping the previous value.
    ///
    /// # Safety
    /// The slot must address an initialized `T`.
    pub unsafe fn write<T>(&self, value: T) -> bool {
        match (self.value as *mut T).as_mut() {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Fail unless the slot carries `expected`
    pub fn expect_type(&self, expected: TypeId) -> AbiResult<()> {
        if self.type_id == expected {
            Ok(())
        } else {
            Err(NativeError::TypeMismatch {
                expected,
                got: self.type_id,
            })
        }
    }
}

impl fmt::Debug for NativeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeArgument")
            .field("value", &self.value)
            .field("type_id", &self.type_id)
            .field("traits", &self.traits)
            .finish()
    }
}

/// Read argument `index` by value.
///
/// # Safety
/// The slot must address an initialized `T`.
pub unsafe fn read_arg<T: Clone>(args: &[NativeArgument], index: usize) -> AbiResult<T> {
    let slot = args.get(index).ok_or(NativeError::ArgumentCount {
        expected: index + 1,
        got: args.len(),
    })?;
    slot.read::<T>().ok_or(NativeError::NullArgument(index))
}

/// Borrow the object passed by pointer in argument `index`.
///
/// # Safety
/// The slot must carry a live `T` with no other outstanding borrows.
pub unsafe fn object_arg<'a, T>(args: &[NativeArgument], index: usize) -> AbiResult<&'a mut T> {
    let slot = args.get(index).ok_or(NativeError::ArgumentCount {
        expected: index + 1,
        got: args.len(),
    })?;
    slot.handle().as_mut::<T>().ok_or(NativeError::NullHandle)
}

// ============================================================================
// Return Slot
// ============================================================================

/// Result slot handed to callables built with [`native_fn`]
#[derive(Debug, Clone, Copy)]
pub struct ReturnSlot<'a>(Option<&'a NativeArgument>);

impl<'a> ReturnSlot<'a> {
    /// Wrap the optional slot supplied by the caller
    pub fn new(slot: Option<&'a NativeArgument>) -> Self {
        ReturnSlot(slot)
    }

    /// Check whether the caller supplied storage
    pub fn is_present(&self) -> bool {
        self.0.map(|slot| !slot.is_null()).unwrap_or(false)
    }

    /// Store the result.
    ///
    /// # Safety
    /// The slot must address an initialized `T`.
    pub unsafe fn write<T>(&self, value: T) -> AbiResult<()> {
        match self.0 {
            Some(slot) if slot.write(value) => Ok(()),
            _ => Err(NativeError::MissingReturnSlot),
        }
    }

    /// Store an object handle as the result.
    ///
    /// # Safety
    /// The slot must address an initialized `Handle`.
    pub unsafe fn write_handle(&self, handle: Handle) -> AbiResult<()> {
        self.write(handle)
    }
}

// ============================================================================
// Native Callable
// ============================================================================

/// Native callable: arguments, optional result slot, success flag.
pub type NativeCallFn =
    Arc<dyn Fn(&[NativeArgument], Option<&NativeArgument>) -> bool + Send + Sync>;

/// Build a [`NativeCallFn`] from a closure that reports errors as [`AbiResult`].
pub fn native_fn<F>(f: F) -> NativeCallFn
where
    F: Fn(&[NativeArgument], ReturnSlot<'_>) -> AbiResult<()> + Send + Sync + 'static,
{
    Arc::new(move |args, ret| f(args, ReturnSlot::new(ret)).is_ok())
}
