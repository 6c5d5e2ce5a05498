use std::ops::{Index, IndexMut};

const MIN_CAPACITY: usize = 4;

/// Contiguous growable store addressed by position.
///
/// Growth doubles the capacity (never below what the request needs), so
/// appends are amortised O(1); mid-buffer insert and erase shift the tail.
#[derive(Debug, Clone)]
pub struct Buffer<T> {
    data: Vec<T>,
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Buffer<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity.max(MIN_CAPACITY)),
        }
    }

    /// Reuses the allocation of a released vector.
    pub fn from_vec(mut data: Vec<T>) -> Self {
        data.clear();
        Self { data }
    }

    /// Gives the backing memory back, emptied, for pooling.
    pub fn release(mut self) -> Vec<T> {
        self.data.clear();
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.data.last()
    }

    /// Appends one element and returns its position.
    pub fn push(&mut self, value: T) -> usize {
        self.reserve_for(1);
        self.data.push(value);
        self.data.len() - 1
    }

    pub fn insert(&mut self, at: usize, value: T) {
        assert!(at <= self.data.len(), "insert position {at} out of range");
        self.reserve_for(1);
        self.data.insert(at, value);
    }

    /// Removes `count` elements starting at `at`, shifting the tail left.
    pub fn erase(&mut self, at: usize, count: usize) {
        let end = at
            .checked_add(count)
            .filter(|end| *end <= self.data.len())
            .unwrap_or_else(|| panic!("erase range {at}+{count} out of range"));
        self.data.drain(at..end);
    }

    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    fn reserve_for(&mut self, additional: usize) {
        let needed = self.data.len() + additional;
        let capacity = self.data.capacity();
        if needed > capacity {
            let target = needed.max(capacity * 2).max(MIN_CAPACITY);
            self.data.reserve_exact(target - self.data.len());
        }
    }
}

impl<T: Clone> Buffer<T> {
    /// Appends `count` copies of `fill` and returns the new tail.
    pub fn push_many(&mut self, count: usize, fill: T) -> &mut [T] {
        let start = self.data.len();
        self.reserve_for(count);
        self.data.extend(std::iter::repeat_n(fill, count));
        &mut self.data[start..]
    }

    /// Opens a gap of `count` copies of `fill` at `at` and returns it.
    pub fn insert_many(&mut self, at: usize, count: usize, fill: T) -> &mut [T] {
        assert!(at <= self.data.len(), "insert position {at} out of range");
        self.reserve_for(count);
        self.data.splice(at..at, std::iter::repeat_n(fill, count));
        &mut self.data[at..at + count]
    }

    pub fn extend_from_slice(&mut self, values: &[T]) {
        self.reserve_for(values.len());
        self.data.extend_from_slice(values);
    }
}

impl<T> Index<usize> for Buffer<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for Buffer<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}
