//! Bounded rolling history of magnitude values for the chart.
//!
//! Appends happen once per sample, so eviction drops at most one value per
//! append. Storage is allocated once at capacity and reused across resets.

use std::collections::VecDeque;

use crate::config::HISTORY_CAPACITY;

/// Oldest-first FIFO of magnitudes with a fixed capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    values: VecDeque<f32>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Buffer with the standard chart capacity.
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Buffer holding at most `capacity` values (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a value, evicting the oldest one when over capacity.
    pub fn append(&mut self, value: f32) {
        self.values.push_back(value);
        if self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Values oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    /// Copy of the values, oldest first.
    pub fn to_vec(&self) -> Vec<f32> {
        self.values.iter().copied().collect()
    }

    /// Most recently appended value.
    pub fn latest(&self) -> Option<f32> {
        self.values.back().copied()
    }

    /// `(min, max)` over the buffer, `None` when empty.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        min_max(self.iter())
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// `(min, max)` of a sequence, `None` when empty.
pub(crate) fn min_max(values: impl IntoIterator<Item = f32>) -> Option<(f32, f32)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = HistoryBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 200);
        assert_eq!(buffer.latest(), None);
        assert_eq!(buffer.min_max(), None);
    }

    #[test]
    fn test_append_keeps_last_capacity_values_in_order() {
        let mut buffer = HistoryBuffer::new();
        for i in 0..250 {
            buffer.append(i as f32);
        }

        assert_eq!(buffer.len(), 200);
        let expected: Vec<f32> = (50..250).map(|i| i as f32).collect();
        assert_eq!(buffer.to_vec(), expected);
        assert_eq!(buffer.latest(), Some(249.0));
    }

    #[test]
    fn test_append_below_capacity_keeps_everything() {
        let mut buffer = HistoryBuffer::with_capacity(5);
        buffer.append(1.0);
        buffer.append(2.0);
        assert_eq!(buffer.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_clear() {
        let mut buffer = HistoryBuffer::new();
        for i in 0..10 {
            buffer.append(i as f32);
        }
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 200);

        buffer.append(3.0);
        assert_eq!(buffer.to_vec(), vec![3.0]);
    }

    #[test]
    fn test_min_max() {
        let mut buffer = HistoryBuffer::new();
        for v in [9.8, 12.1, 8.7, 10.0] {
            buffer.append(v);
        }
        assert_eq!(buffer.min_max(), Some((8.7, 12.1)));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut buffer = HistoryBuffer::with_capacity(0);
        buffer.append(1.0);
        buffer.append(2.0);
        assert_eq!(buffer.to_vec(), vec![2.0]);
    }
}
