use std::ops::{Deref, DerefMut};

/// Returned when pushing into a full [`FixedVec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{container} is full (capacity {capacity})")]
pub struct CapacityError {
    pub container: &'static str,
    pub capacity: usize,
}

/// A vector whose storage is reserved once and never grows.
#[derive(Debug, Clone)]
pub struct FixedVec<T> {
    name: &'static str,
    items: Vec<T>,
    capacity: usize,
}

impl<T> FixedVec<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn push(&mut self, value: T) -> Result<&mut T, CapacityError> {
        if self.is_full() {
            return Err(CapacityError {
                container: self.name,
                capacity: self.capacity,
            });
        }

        let index = self.items.len();
        self.items.push(value);

        Ok(&mut self.items[index])
    }

    /// Removes `index` by moving the last element into its slot.
    pub fn swap_remove(&mut self, index: usize) -> T {
        assert!(
            index < self.items.len(),
            "{}: swap_remove index {index} out of bounds (len {})",
            self.name,
            self.items.len()
        );

        self.items.swap_remove(index)
    }

    /// Swap-removes every element matching `pred` and returns how many were removed.
    ///
    /// An element moved into a freed slot is checked before the scan advances.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        let mut index = 0;

        while index < self.items.len() {
            if pred(&self.items[index]) {
                self.items.swap_remove(index);
                removed += 1;
            } else {
                index += 1;
            }
        }

        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Deref for FixedVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> DerefMut for FixedVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_fails_loudly_when_full() {
        let mut vec = FixedVec::new("numbers", 2);

        assert!(vec.push(1).is_ok());
        assert!(vec.push(2).is_ok());

        let err = vec.push(3).unwrap_err();
        assert_eq!(err.capacity, 2);
        assert_eq!(err.to_string(), "numbers is full (capacity 2)");
        assert_eq!(&*vec, &[1, 2]);
    }

    #[test]
    fn storage_is_never_reallocated() {
        let mut vec = FixedVec::new("numbers", 8);
        let ptr = vec.as_ptr();

        for n in 0..8 {
            vec.push(n).unwrap();
        }

        assert_eq!(vec.as_ptr(), ptr);
    }

    #[test]
    fn swap_remove_moves_last_into_slot() {
        let mut vec = FixedVec::new("letters", 3);
        vec.push('a').unwrap();
        vec.push('b').unwrap();
        vec.push('c').unwrap();

        assert_eq!(vec.swap_remove(0), 'a');
        assert_eq!(&*vec, &['c', 'b']);
    }

    #[test]
    fn remove_where_rechecks_swapped_elements() {
        let mut vec = FixedVec::new("numbers", 5);
        for n in [1, 2, 3, 4, 4] {
            vec.push(n).unwrap();
        }

        let removed = vec.remove_where(|n| *n % 2 == 0);

        assert_eq!(removed, 3);
        let mut rest = vec.to_vec();
        rest.sort();
        assert_eq!(rest, vec![1, 3]);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut vec = FixedVec::new("numbers", 1);
        vec.push(1).unwrap();
        vec.clear();

        assert!(vec.is_empty());
        assert!(vec.push(2).is_ok());
    }
}
