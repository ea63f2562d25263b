use std::any::Any;

/// Backing storage for the native arguments of one dispatch.
///
/// Every cell is heap-allocated, so addresses handed to the native side stay
/// valid until the arena is dropped, on success and error paths alike.
#[derive(Default)]
pub struct ScratchArena {
    cells: Vec<Box<dyn Any>>,
}

impl ScratchArena {
    /// Empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty arena with room for `capacity` cells
    pub fn with_capacity(capacity: usize) -> Self {
        ScratchArena {
            cells: Vec::with_capacity(capacity),
        }
    }

    /// Move `value` into a new cell and return its stable address
    pub fn alloc<T: 'static>(&mut self, value: T) -> *mut T {
        let mut cell = Box::new(value);
        let ptr: *mut T = &mut *cell;
        self.cells.push(cell);
        ptr
    }

    /// Number of live cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if no cell is live
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl std::fmt::Debug for ScratchArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchArena").field("cells", &self.cells.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_are_stable() {
        let mut arena = ScratchArena::new();
        let first = arena.alloc(String::from("first"));
        for i in 0..64 {
            arena.alloc(i);
        }
        assert_eq!(arena.len(), 65);
        assert_eq!(unsafe { &*first }, "first");
    }

    #[test]
    fn test_drop_releases_cells() {
        use std::rc::Rc;

        let shared = Rc::new(());
        {
            let mut arena = ScratchArena::with_capacity(2);
            arena.alloc(Rc::clone(&shared));
            arena.alloc(Rc::clone(&shared));
            assert_eq!(Rc::strong_count(&shared), 3);
        }
        assert_eq!(Rc::strong_count(&shared), 1);
    }
}
