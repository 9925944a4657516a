//! Time-ordered queue of discrete events.
//!
//! Events with equal timestamps come out in the order they were scheduled.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use super::types::IntersectionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Ask the intersection's signal policy for a new green road
    SignalReevaluation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
    pub intersection: IntersectionId,
}

/// Heap entry ordered by `(time, sequence)` only
#[derive(Debug)]
struct QueuedEvent {
    key: (OrderedFloat<f64>, u64),
    event: Event,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<QueuedEvent>>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, time: f64, kind: EventKind, intersection: IntersectionId) {
        let key = (OrderedFloat(time), self.next_sequence);
        self.next_sequence += 1;
        self.heap.push(Reverse(QueuedEvent {
            key,
            event: Event {
                time,
                kind,
                intersection,
            },
        }));
    }

    /// Remove and return the earliest event if it is due at `now`
    pub fn pop_due(&mut self, now: f64) -> Option<Event> {
        if self.next_time()? > now {
            return None;
        }
        self.heap.pop().map(|Reverse(queued)| queued.event)
    }

    /// Timestamp of the earliest pending event
    pub fn next_time(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(queued)| queued.event.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
