//! Bounded FIFO queues connecting the simulation to its collaborators.
//!
//! Overflow is a hard error rather than a silent drop or a block: a full
//! queue means the consumer has stalled, and the simulation surfaces that
//! immediately instead of hiding it.

use std::collections::VecDeque;

use thiserror::Error;

/// Capacity used for the input and draw channels unless a driver asks for
/// something else.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Error raised when a push would exceed the queue's fixed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is full at capacity {capacity}")]
pub struct QueueOverflow {
    /// Fixed capacity of the queue that rejected the push.
    pub capacity: usize,
}

/// Fixed-capacity FIFO queue with fail-loud overflow.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an element, failing if the queue is already full.
    pub fn push(&mut self, item: T) -> Result<(), QueueOverflow> {
        if self.items.len() >= self.capacity {
            return Err(QueueOverflow {
                capacity: self.capacity,
            });
        }
        self.items.push_back(item);
        Ok(())
    }

    /// Removes and returns the oldest element, if any.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Number of queued elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue currently holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for BoundedQueue<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundedQueue, QueueOverflow, DEFAULT_QUEUE_CAPACITY};

    #[test]
    fn preserves_fifo_order() {
        let mut queue = BoundedQueue::with_capacity(4);
        queue.push('a').expect("push");
        queue.push('b').expect("push");
        queue.push('c').expect("push");
        assert_eq!(queue.pop(), Some('a'));
        assert_eq!(queue.pop(), Some('b'));
        assert_eq!(queue.pop(), Some('c'));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn push_beyond_capacity_fails() {
        let mut queue = BoundedQueue::with_capacity(2);
        queue.push(1).expect("push");
        queue.push(2).expect("push");
        assert_eq!(queue.push(3), Err(QueueOverflow { capacity: 2 }));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn pop_frees_a_slot() {
        let mut queue = BoundedQueue::with_capacity(1);
        queue.push(10).expect("push");
        assert_eq!(queue.pop(), Some(10));
        queue.push(11).expect("push after pop");
        assert_eq!(queue.pop(), Some(11));
    }

    #[test]
    fn default_queue_uses_the_standard_capacity() {
        let mut queue = BoundedQueue::default();
        for n in 0..DEFAULT_QUEUE_CAPACITY {
            queue.push(n).expect("push within capacity");
        }
        assert!(queue.push(usize::MAX).is_err());
    }
}
