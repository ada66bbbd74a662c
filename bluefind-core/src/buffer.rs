//! Fixed-Size Circular Buffer for Sensor Histories
//!
//! ## Overview
//!
//! A ring buffer with compile-time capacity. When full, a push overwrites the
//! oldest element, so the buffer always holds the most recent `N` values in
//! chronological order. No heap allocation.
//!
//! Used for the raw-heading window of the heading smoother, where only the
//! last few readings matter and insertion order is arrival order.
//!
//! ### Memory Layout
//!
//! ```text
//! CircularBuffer<f32, 5> after 7 pushes (values 0..7):
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  5  │  6  │  2  │  3  │  4  │  ← physical slots
//! └─────┴─────┴─────┴─────┴─────┘
//!              ↑
//!              write_pos = 2 (also the oldest element)
//!
//! Logical view (iter): [2, 3, 4, 5, 6]
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use bluefind_core::buffer::CircularBuffer;
//!
//! let mut headings: CircularBuffer<f32, 3> = CircularBuffer::new();
//! headings.push(10.0);
//! headings.push(20.0);
//! headings.push(30.0);
//! assert_eq!(headings.push(40.0), Some(10.0));
//!
//! let values: Vec<f32> = headings.iter().copied().collect();
//! assert_eq!(values, vec![20.0, 30.0, 40.0]);
//! ```

/// Fixed-size circular buffer
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
/// - Iteration yields elements oldest to newest
///
/// ## Thread Safety
///
/// Not synchronized. Owners that share state publish copies instead.
#[derive(Clone, Debug)]
pub struct CircularBuffer<T: Copy, const N: usize> {
    /// Storage; `None` marks slots never written
    data: [Option<T>; N],

    /// Index where the next write will occur
    write_pos: usize,

    /// Current number of valid elements
    len: usize,
}

impl<T: Copy, const N: usize> CircularBuffer<T, N> {
    /// Creates a new empty buffer
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Appends a value, returning the element it displaced when full
    pub fn push(&mut self, value: T) -> Option<T> {
        let displaced = if self.is_full() {
            self.data[self.write_pos]
        } else {
            None
        };

        self.data[self.write_pos] = Some(value);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }

        displaced
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Capacity `N`
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The most recent element
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };
        self.data[idx].as_ref()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> CircularBufferIter<'_, T, N> {
        CircularBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Drop all elements
    pub fn clear(&mut self) {
        self.data = [None; N];
        self.write_pos = 0;
        self.len = 0;
    }

    /// Element by logical index (0 = oldest, len-1 = newest)
    ///
    /// While filling, logical and physical indices match. Once full, the
    /// oldest element sits at `write_pos`.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };

        self.data[actual_index].as_ref()
    }
}

/// Iterator over circular buffer contents, oldest first
pub struct CircularBufferIter<'a, T: Copy, const N: usize> {
    buffer: &'a CircularBuffer<T, N>,
    index: usize,
}

impl<'a, T: Copy, const N: usize> Iterator for CircularBufferIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a, T: Copy, const N: usize> ExactSizeIterator for CircularBufferIter<'a, T, N> {}

impl<T: Copy, const N: usize> Default for CircularBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
