use std::cell::Cell;

use bumpalo::Bump;

/// Scratch memory that lives for one frame.
///
/// The arena is sized once. Running out of space is a programming error and
/// panics instead of growing.
#[derive(Debug)]
pub struct FrameArena {
    bump: Bump,
    capacity: usize,
    used: Cell<usize>,
}

impl FrameArena {
    pub fn new(capacity: usize) -> Self {
        let bump = Bump::with_capacity(capacity);
        bump.set_allocation_limit(Some(bump.allocated_bytes()));

        tracing::debug!(capacity, "frame arena created");

        Self {
            bump,
            capacity,
            used: Cell::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes handed out since the last [`reset`](Self::reset).
    pub fn allocated_bytes(&self) -> usize {
        self.used.get()
    }

    pub fn alloc_slice<T: Copy>(&self, len: usize, fill: T) -> &mut [T] {
        let bytes = len * size_of::<T>();

        match self.bump.try_alloc_slice_fill_copy(len, fill) {
            Ok(slice) => {
                self.used.set(self.used.get() + bytes);
                slice
            }
            Err(_) => panic!(
                "frame arena exhausted: requested {bytes} bytes with {} of {} in use",
                self.used.get(),
                self.capacity
            ),
        }
    }

    /// Frees everything allocated this frame.
    pub fn reset(&mut self) {
        self.bump.reset();
        self.used.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_filled() {
        let arena = FrameArena::new(1024);
        let slice = arena.alloc_slice(4, 7u32);

        assert_eq!(slice, &[7, 7, 7, 7]);
        assert_eq!(arena.allocated_bytes(), 16);
    }

    #[test]
    fn reset_reclaims_space() {
        let mut arena = FrameArena::new(256);

        for _ in 0..16 {
            arena.alloc_slice(48, 0u8);
            arena.reset();
        }

        assert_eq!(arena.allocated_bytes(), 0);
    }

    #[test]
    #[should_panic(expected = "frame arena exhausted")]
    fn exhaustion_panics() {
        let arena = FrameArena::new(64);
        arena.alloc_slice(1 << 20, 0u8);
    }
}
