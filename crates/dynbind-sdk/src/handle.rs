//! Opaque object handles

use std::ffi::c_void;
use std::fmt;

/// Opaque reference to a native object.
///
/// A handle is only an address. The engine never reads through it; identity
/// is the only thing preserved across the boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Handle(*mut c_void);

// Handles are plain addresses; ownership stays with whoever created the object.
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}

impl Handle {
    /// The null handle
    pub const fn null() -> Self {
        Handle(std::ptr::null_mut())
    }

    /// Wrap a raw pointer
    pub const fn from_ptr(ptr: *mut c_void) -> Self {
        Handle(ptr)
    }

    /// Raw pointer
    pub const fn as_ptr(self) -> *mut c_void {
        self.0
    }

    /// Rebuild from an integer address (as carried through JSON)
    pub fn from_addr(addr: u64) -> Self {
        Handle(addr as usize as *mut c_void)
    }

    /// Integer address
    pub fn addr(self) -> u64 {
        self.0 as usize as u64
    }

    /// Check for the null handle
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    /// Move a value to the heap and hand out its address.
    ///
    /// The object leaks unless it is reclaimed with [`Handle::into_box`].
    pub fn from_box<T>(value: Box<T>) -> Self {
        Handle(Box::into_raw(value) as *mut c_void)
    }

    /// Reclaim an object created by [`Handle::from_box`].
    ///
    /// # Safety
    /// The handle must come from `Handle::from_box::<T>` and not have been
    /// reclaimed already.
    pub unsafe fn into_box<T>(self) -> Option<Box<T>> {
        if self.is_null() {
            None
        } else {
            Some(Box::from_raw(self.0 as *mut T))
        }
    }

    /// Borrow the object behind the handle.
    ///
    /// # Safety
    /// The handle must point to a live, initialized `T`.
    pub unsafe fn as_ref<'a, T>(self) -> Option<&'a T> {
        (self.0 as *const T).as_ref()
    }

    /// Mutably borrow the object behind the handle.
    ///
    /// # Safety
    /// The handle must point to a live, initialized `T` with no other
    /// outstanding borrows.
    pub unsafe fn as_mut<'a, T>(self) -> Option<&'a mut T> {
        (self.0 as *mut T).as_mut()
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:#x})", self.addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        let h = Handle::null();
        assert!(h.is_null());
        assert_eq!(h.addr(), 0);
        assert_eq!(Handle::default(), h);
    }

    #[test]
    fn test_box_round_trip() {
        let h = Handle::from_box(Box::new(41u32));
        assert!(!h.is_null());
        unsafe {
            *h.as_mut::<u32>().unwrap() += 1;
            assert_eq!(*h.as_ref::<u32>().unwrap(), 42);
            let b = h.into_box::<u32>().unwrap();
            assert_eq!(*b, 42);
        }
    }

    #[test]
    fn test_addr_round_trip() {
        let h = Handle::from_box(Box::new(7u8));
        let same = Handle::from_addr(h.addr());
        assert_eq!(h, same);
        unsafe {
            drop(h.into_box::<u8>());
        }
    }
}
