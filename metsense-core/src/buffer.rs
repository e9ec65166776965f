//! Fixed-Capacity Circular Buffer for Streaming History
//!
//! ## Overview
//!
//! A ring buffer that keeps the most recent `capacity` items and silently
//! overwrites the oldest one when full. Two parts of the pipeline need exactly
//! this shape of history:
//!
//! - the online monitor keeps the last `window_size` accelerometer samples
//! - the majority voter keeps the last N window-level class decisions
//!
//! Both sizes come from a trained model or a config file, so capacity is a
//! runtime value fixed at construction rather than a const generic. Storage is
//! allocated once in `with_capacity` and never grows.
//!
//! ### Memory Layout
//!
//! ```text
//! CircularBuffer with capacity 5, after 7 pushes (A..G):
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  F  │  G  │  C  │  D  │  E  │  ← physical slots
//! └─────┴─────┴─────┴─────┴─────┘
//!              ↑
//!              └── write_pos = 2 (also the oldest item once full)
//!
//! Logical view (oldest → newest): C D E F G
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use metsense_core::buffer::CircularBuffer;
//!
//! let mut history = CircularBuffer::with_capacity(3);
//! for class in [0u8, 0, 3, 0] {
//!     history.push(class);
//! }
//!
//! let kept: Vec<u8> = history.iter().copied().collect();
//! assert_eq!(kept, vec![0, 3, 0]);
//! assert_eq!(history.last(), Some(&0));
//! ```

use alloc::vec::Vec;

/// Ring buffer holding the most recent `capacity` items
///
/// ## Internal Invariants
///
/// - `data.len() <= capacity`
/// - `write_pos < capacity`
/// - iteration yields items oldest to newest
///
/// ## Thread Safety
///
/// Not synchronized. Each monitor or voter owns its own buffer.
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    /// Slots; grows up to `capacity` then is overwritten in place
    data: Vec<T>,

    /// Maximum number of items retained
    capacity: usize,

    /// Slot the next push writes once the buffer is full
    write_pos: usize,
}

impl<T> CircularBuffer<T> {
    /// Creates an empty buffer retaining at most `capacity` items
    ///
    /// A capacity of 0 is raised to 1 so `push` always has a slot.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            write_pos: 0,
        }
    }

    /// Adds an item, overwriting the oldest when full
    pub fn push(&mut self, item: T) {
        if self.data.len() < self.capacity {
            self.data.push(item);
        } else {
            self.data[self.write_pos] = item;
        }
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Maximum number of stored items
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    /// Most recent item
    pub fn last(&self) -> Option<&T> {
        if self.data.is_empty() {
            return None;
        }
        self.get(self.data.len() - 1)
    }

    /// Item by logical index (0 = oldest, len-1 = newest)
    ///
    /// Once full, the oldest item sits at `write_pos`:
    ///
    /// ```text
    /// Physical:  [D, E, A, B, C]  (write_pos = 2)
    /// Logical:   [A, B, C, D, E]
    /// logical[i] = physical[(write_pos + i) % capacity]
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.data.len() {
            return None;
        }

        let physical = if self.is_full() {
            (self.write_pos + index) % self.capacity
        } else {
            index
        };

        self.data.get(physical)
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> CircularBufferIter<'_, T> {
        CircularBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Drop all items, keeping the allocation
    pub fn clear(&mut self) {
        self.data.clear();
        self.write_pos = 0;
    }
}

/// Iterator over circular buffer contents, oldest first
pub struct CircularBufferIter<'a, T> {
    buffer: &'a CircularBuffer<T>,
    index: usize,
}

impl<'a, T> Iterator for CircularBufferIter<'a, T> {
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

impl<'a, T> ExactSizeIterator for CircularBufferIter<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_empty_buffer() {
        let buffer: CircularBuffer<u8> = CircularBuffer::with_capacity(5);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert!(buffer.last().is_none());
        assert_eq!(buffer.capacity(), 5);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut buffer = CircularBuffer::with_capacity(0);
        buffer.push(7u8);
        buffer.push(9u8);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.last(), Some(&9));
    }

    #[test]
    fn test_circular_overwrite() {
        let mut buffer = CircularBuffer::with_capacity(3);

        for i in 0..5 {
            buffer.push(i as f32);
        }

        assert_eq!(buffer.len(), 3);
        assert!(buffer.is_full());

        // 0 and 1 were overwritten
        let values: Vec<f32> = buffer.iter().copied().collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
        assert_eq!(buffer.last(), Some(&4.0));
    }

    #[test]
    fn test_iterator_order_before_wrap() {
        let mut buffer = CircularBuffer::with_capacity(4);
        for i in 0..3u64 {
            buffer.push(i);
        }

        let items: Vec<u64> = buffer.iter().copied().collect();
        assert_eq!(items, vec![0, 1, 2]);
        assert_eq!(buffer.iter().len(), 3);
    }

    #[test]
    fn test_clear_resets_positions() {
        let mut buffer = CircularBuffer::with_capacity(2);
        buffer.push(1u8);
        buffer.push(2u8);
        buffer.push(3u8);
        buffer.clear();
        assert!(buffer.is_empty());

        buffer.push(4u8);
        let items: Vec<u8> = buffer.iter().copied().collect();
        assert_eq!(items, vec![4]);
    }
}
