//! Many independently growable lists packed into one buffer.
//!
//! Each row is a `(start, len)` window into the shared data buffer. The
//! space between a row's start and the next row's start is its capacity.
//! When a row outgrows that, a gap of `max(capacity * 2, needed) - capacity`
//! default elements is inserted right after it and every later row's start
//! moves by the same delta. Gaps keep `T::default()` values.

use super::buffer::Buffer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Row {
    start: usize,
    len: usize,
}

#[derive(Debug, Clone)]
pub struct RowArena<T> {
    rows: Buffer<Row>,
    data: Buffer<T>,
}

impl<T> Default for RowArena<T> {
    fn default() -> Self {
        Self {
            rows: Buffer::new(),
            data: Buffer::new(),
        }
    }
}

/// Released backing memory of a [`RowArena`].
#[derive(Debug)]
pub struct RowParts<T> {
    rows: Vec<Row>,
    data: Vec<T>,
}

impl<T> Default for RowParts<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            data: Vec::new(),
        }
    }
}

impl<T: Copy + Default> RowArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(rows: usize) -> Self {
        Self {
            rows: Buffer::with_capacity(rows),
            data: Buffer::with_capacity(rows * 4),
        }
    }

    pub fn from_parts(parts: RowParts<T>) -> Self {
        Self {
            rows: Buffer::from_vec(parts.rows),
            data: Buffer::from_vec(parts.data),
        }
    }

    pub fn into_parts(self) -> RowParts<T> {
        RowParts {
            rows: self.rows.release(),
            data: self.data.release(),
        }
    }

    #[inline]
    pub fn rows_count(&self) -> usize {
        self.rows.len()
    }

    /// Total elements in the backing buffer, gaps included.
    #[inline]
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[T] {
        let Row { start, len } = self.rows[row];
        &self.data.as_slice()[start..start + len]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let Row { start, len } = self.rows[row];
        &mut self.data.as_mut_slice()[start..start + len]
    }

    pub fn capacity(&self, row: usize) -> usize {
        let start = self.rows[row].start;
        let end = match self.rows.get(row + 1) {
            Some(next) => next.start,
            None => self.data.len(),
        };
        end - start
    }

    /// Reserves a new empty row at the end and returns its index.
    pub fn push_row(&mut self, capacity: usize) -> usize {
        let start = self.data.len();
        self.data.push_many(capacity, T::default());
        self.rows.push(Row { start, len: 0 })
    }

    pub fn push_row_from(&mut self, values: &[T]) -> usize {
        let row = self.push_row(values.len());
        self.push_slice(row, values);
        row
    }

    /// Reserves a new empty row so that it becomes row `at`; rows at and
    /// after `at` move one index up.
    pub fn insert_row(&mut self, at: usize, capacity: usize) {
        let count = self.rows.len();
        assert!(at <= count, "row {at} out of range");
        if at == count {
            self.push_row(capacity);
            return;
        }

        let start = self.rows[at].start;
        self.data.insert_many(start, capacity, T::default());
        for row in &mut self.rows.as_mut_slice()[at..] {
            row.start += capacity;
        }
        self.rows.insert(at, Row { start, len: 0 });
    }

    pub fn insert_row_from(&mut self, at: usize, values: &[T]) {
        self.insert_row(at, values.len());
        self.push_slice(at, values);
    }

    /// Grows `row` by `count` default elements and returns them.
    pub fn push(&mut self, row: usize, count: usize) -> &mut [T] {
        self.extend_row(row, count);
        let Row { start, len } = self.rows[row];
        &mut self.data.as_mut_slice()[start + len - count..start + len]
    }

    pub fn push_slice(&mut self, row: usize, values: &[T]) {
        self.push(row, values.len()).copy_from_slice(values);
    }

    /// Opens `count` slots at position `index` inside `row`.
    pub fn insert(&mut self, row: usize, index: usize, count: usize) -> &mut [T] {
        let old_len = self.rows[row].len;
        assert!(index <= old_len, "position {index} out of row bounds");
        self.extend_row(row, count);

        let start = self.rows[row].start;
        let data = self.data.as_mut_slice();
        data.copy_within(start + index..start + old_len, start + index + count);
        let gap = &mut data[start + index..start + index + count];
        gap.fill(T::default());
        gap
    }

    /// Drops trailing rows so that only `rows` remain, together with the
    /// data they owned.
    pub fn truncate_rows(&mut self, rows: usize) {
        if rows >= self.rows.len() {
            return;
        }
        let data_len = self.rows[rows].start;
        self.rows.truncate(rows);
        self.data.truncate(data_len);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.data.clear();
    }

    fn extend_row(&mut self, row: usize, count: usize) {
        let capacity = self.capacity(row);
        let needed = self.rows[row].len + count;

        if needed > capacity {
            let delta = (capacity * 2).max(needed) - capacity;
            let at = self.rows[row].start + capacity;
            self.data.insert_many(at, delta, T::default());
            for later in &mut self.rows.as_mut_slice()[row + 1..] {
                later.start += delta;
            }
        }

        self.rows[row].len = needed;
    }
}
