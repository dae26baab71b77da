//! `Spsc<T>`: a bounded single-producer/single-consumer ring paired with a
//! [`Notifier`](super::Notifier).
//!
//! Grounded on `examples/original_source/x/cpp/queue/spsc.h`: capacity is
//! rounded up to the next power of two (distinguishing full from empty needs
//! no separate counter once backed by `crossbeam_queue::ArrayQueue`, which
//! already reserves that bookkeeping internally), `push` signals the notifier
//! after a successful enqueue, and `pop` loops `try_pop` against a `wait` on
//! the notifier rather than spinning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_queue::ArrayQueue;

use super::notifier::{self, Notifier};

fn next_power_of_two(n: usize) -> usize {
    n.next_power_of_two().max(1)
}

/// A bounded SPSC ring over `T`, shared between exactly one producer and one
/// consumer (enforced by convention, not the type system).
pub struct Spsc<T> {
    queue: ArrayQueue<T>,
    notifier: Arc<dyn Notifier>,
    closed: AtomicBool,
}

impl<T> Spsc<T> {
    /// Creates a ring with room for at least `capacity` items, using the
    /// platform-default notifier (see [`notifier::create`]).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_notifier(capacity, notifier::create())
    }

    /// Creates a ring with an explicit notifier, for tests that want to
    /// observe or drive wakeups directly.
    #[must_use]
    pub fn with_notifier(capacity: usize, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            queue: ArrayQueue::new(next_power_of_two(capacity)),
            notifier,
            closed: AtomicBool::new(false),
        }
    }

    /// Non-blocking enqueue. Returns the rejected value on a full or closed
    /// ring.
    pub fn try_push(&self, value: T) -> Result<(), T> {
        if self.closed.load(Ordering::Acquire) {
            return Err(value);
        }
        self.queue.push(value)
    }

    /// Enqueues `value`, signalling the notifier on success so a blocked
    /// consumer wakes.
    pub fn push(&self, value: T) -> Result<(), T> {
        self.try_push(value).inspect(|()| self.notifier.signal())
    }

    /// Non-blocking dequeue.
    pub fn try_pop(&self) -> Option<T> {
        self.queue.pop()
    }

    /// Dequeues the next item, blocking on the notifier between `try_pop`
    /// attempts until one arrives, `timeout` elapses (returns `None`), or the
    /// ring is closed and drained (returns `None`).
    pub fn pop(&self, timeout: Duration) -> Option<T> {
        loop {
            if let Some(v) = self.try_pop() {
                return Some(v);
            }
            if self.closed.load(Ordering::Acquire) && self.queue.is_empty() {
                return None;
            }
            if !self.notifier.wait(timeout) {
                return self.try_pop();
            }
        }
    }

    /// Marks the ring closed: further `push`/`try_push` calls fail, and `pop`
    /// returns `None` once drained. Wakes any blocked consumer.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notifier.signal();
    }

    /// True once [`Self::close`] has been called.
    #[must_use]
    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Current number of enqueued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if no items are enqueued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The ring's fixed capacity (a power of two).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let q: Spsc<u32> = Spsc::new(5);
        assert_eq!(q.capacity(), 8);
    }

    #[test]
    fn push_then_try_pop_round_trips() {
        let q = Spsc::new(4);
        q.push(42).unwrap();
        assert_eq!(q.try_pop(), Some(42));
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn try_push_fails_when_full() {
        let q = Spsc::new(1);
        q.try_push(1).unwrap();
        assert_eq!(q.try_push(2), Err(2));
    }

    #[test]
    fn closed_ring_rejects_push_but_drains_existing() {
        let q = Spsc::new(4);
        q.push(1).unwrap();
        q.close();
        assert!(q.closed());
        assert_eq!(q.try_push(2), Err(2));
        assert_eq!(q.pop(Duration::from_millis(10)), Some(1));
        assert_eq!(q.pop(Duration::from_millis(10)), None);
    }

    #[test]
    fn pop_times_out_on_empty_open_ring() {
        let q: Spsc<u32> = Spsc::new(4);
        assert_eq!(q.pop(Duration::from_millis(5)), None);
    }
}
