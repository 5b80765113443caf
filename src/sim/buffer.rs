//! Fixed-capacity, drop-oldest sequence.

use std::collections::vec_deque;
use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// A bounded sequence that evicts its oldest element once full.
///
/// "Oldest" depends on which end the caller pushes to: [`push_back`] treats
/// the front as oldest (chronological buffers such as line history), while
/// [`push_front`] treats the back as oldest (newest-first buffers such as the
/// event log).
///
/// [`push_back`]: BoundedBuffer::push_back
/// [`push_front`]: BoundedBuffer::push_front
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    /// Create an empty buffer holding at most `capacity` items.
    ///
    /// A capacity of zero is raised to one so the most recent item is always
    /// retained.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append at the back, evicting from the front when full.
    pub fn push_back(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Prepend at the front, evicting from the back when full.
    pub fn push_front(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_back();
        }
        self.items.push_front(item);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: Clone> BoundedBuffer<T> {
    /// Copy the contents out in buffer order.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a BoundedBuffer<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for BoundedBuffer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_back_evicts_oldest_from_front() {
        let mut buf = BoundedBuffer::new(3);
        for i in 0..5 {
            buf.push_back(i);
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.to_vec(), vec![2, 3, 4]);
        assert_eq!(buf.back(), Some(&4));
    }

    #[test]
    fn push_front_evicts_oldest_from_back() {
        let mut buf = BoundedBuffer::new(3);
        for i in 0..5 {
            buf.push_front(i);
        }
        assert_eq!(buf.to_vec(), vec![4, 3, 2]);
        assert_eq!(buf.front(), Some(&4));
    }

    #[test]
    fn zero_capacity_keeps_latest_item() {
        let mut buf = BoundedBuffer::new(0);
        buf.push_back("a");
        buf.push_back("b");
        assert_eq!(buf.capacity(), 1);
        assert_eq!(buf.to_vec(), vec!["b"]);
    }

    #[test]
    fn serializes_as_sequence() {
        let mut buf = BoundedBuffer::new(2);
        buf.push_back(1.5);
        buf.push_back(2.5);
        assert_eq!(serde_json::to_string(&buf).unwrap(), "[1.5,2.5]");
    }
}
