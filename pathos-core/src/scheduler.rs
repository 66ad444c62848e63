//! Logical timer for deferred work (delayed reactions).
//!
//! Entries are keyed by an arbitrary key (typically `(actor, purpose)`) and
//! fire once simulated time reaches their due time. The scheduler is
//! advanced once per simulation step; nothing runs on a real thread. Entries
//! due at the same time fire in scheduling order.

use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Entry<K, T> {
    due: OrderedFloat<f64>,
    seq: u64,
    key: K,
    task: T,
}

impl<K, T> PartialEq for Entry<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<K, T> Eq for Entry<K, T> {}

impl<K, T> PartialOrd for Entry<K, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K, T> Ord for Entry<K, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// A min-ordered queue of keyed tasks.
#[derive(Debug)]
pub struct Scheduler<K, T> {
    queue: BinaryHeap<Reverse<Entry<K, T>>>,
    next_seq: u64,
}

impl<K, T> Scheduler<K, T> {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `task` under `key` to fire at simulated time `due`.
    pub fn schedule(&mut self, key: K, due: f64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            due: OrderedFloat(due),
            seq,
            key,
            task,
        }));
    }

    /// Drop every entry whose key matches. Returns how many were dropped.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|Reverse(entry)| !predicate(&entry.key));
        before - self.queue.len()
    }

    /// Remove and return every entry due at or before `now`, in firing order.
    pub fn drain_due(&mut self, now: f64) -> Vec<(K, T)> {
        let mut due = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|Reverse(entry)| entry.due.into_inner() <= now)
        {
            if let Some(Reverse(entry)) = self.queue.pop() {
                due.push((entry.key, entry.task));
            }
        }
        due
    }

    /// Due time of the earliest entry.
    #[must_use]
    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|Reverse(entry)| entry.due.into_inner())
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<K, T> Default for Scheduler<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Slack added before flooring so that `n` steps of exactly one interval
/// count as `n` whole intervals despite `f32` widening.
const INTERVAL_SLACK: f64 = 1e-6;

/// Turns variable step lengths into whole fixed intervals, carrying the
/// remainder to the next step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntervalClock {
    elapsed: f64,
}

impl IntervalClock {
    /// Create a clock with nothing accumulated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `dt` seconds and return how many whole `interval`s are due.
    /// Non-finite or negative `dt` and non-positive `interval` count nothing.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance(&mut self, dt: f32, interval: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 || !interval.is_finite() || interval <= 0.0 {
            return 0;
        }
        let interval = f64::from(interval);
        self.elapsed += f64::from(dt);
        let whole = (self.elapsed / interval + INTERVAL_SLACK).floor();
        self.elapsed = (self.elapsed - whole * interval).max(0.0);
        whole.min(f64::from(u32::MAX)) as u32
    }

    /// Seconds carried toward the next interval.
    #[must_use]
    pub fn carried(&self) -> f64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_clock_carries_the_remainder() {
        let mut clock = IntervalClock::new();
        assert_eq!(clock.advance(0.1, 0.2), 0);
        assert_eq!(clock.advance(0.1, 0.2), 1);
        assert_eq!(clock.advance(0.5, 0.2), 2);
        assert!((clock.carried() - 0.1).abs() < 1e-6);
        for _ in 0..10 {
            assert_eq!(clock.advance(0.2, 0.2), 1);
        }
    }

    #[test]
    fn interval_clock_handles_huge_and_invalid_steps() {
        let mut clock = IntervalClock::new();
        assert_eq!(clock.advance(1.0e7, 0.5), 20_000_000);
        assert_eq!(clock.advance(f32::NAN, 0.2), 0);
        assert_eq!(clock.advance(f32::INFINITY, 0.2), 0);
        assert_eq!(clock.advance(-1.0, 0.2), 0);
        assert_eq!(clock.advance(1.0, 0.0), 0);
        assert!(clock.carried() < 0.5);
    }

    #[test]
    fn fires_in_due_then_schedule_order() {
        let mut s = Scheduler::new();
        s.schedule("late", 2.0, 3);
        s.schedule("early", 1.0, 1);
        s.schedule("early-too", 1.0, 2);

        assert!(s.drain_due(0.5).is_empty());
        let fired: Vec<_> = s.drain_due(1.0).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec![1, 2]);
        assert_eq!(s.next_due(), Some(2.0));
        assert_eq!(s.drain_due(5.0), vec![("late", 3)]);
        assert!(s.is_empty());
    }

    #[test]
    fn cancel_drops_matching_keys() {
        let mut s = Scheduler::new();
        s.schedule((1, "react"), 1.0, ());
        s.schedule((2, "react"), 1.0, ());
        s.schedule((1, "react"), 2.0, ());

        assert_eq!(s.cancel_where(|(actor, _)| *actor == 1), 2);
        assert_eq!(s.len(), 1);
        assert_eq!(s.drain_due(3.0), vec![((2, "react"), ())]);
    }
}
