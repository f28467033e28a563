#![forbid(unsafe_code)]

//! Virtual clock with an ordered set of pending wake-ups.
//!
//! The tour engine is cooperative: nothing happens between explicit
//! continuation points. A [`Timeline`] holds those continuation points as
//! `(deadline, payload)` pairs and hands them back strictly in deadline
//! order; ties go to whichever was scheduled first.
//!
//! # Invariants
//!
//! 1. `now()` never moves backwards.
//! 2. [`pop_due`](Timeline::pop_due) returns wake-ups in `(deadline, seq)`
//!    order and advances `now()` to the returned deadline.
//! 3. A wake-up scheduled with a zero delay from inside a dispatch is due at
//!    the current instant and is returned by the same drain loop.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled wake-up, usable for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId {
    deadline: Duration,
    seq: u64,
}

impl TimerId {
    /// When the wake-up is due, measured from the timeline's origin.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Ordered pending wake-ups over a virtual clock.
#[derive(Debug, Clone)]
pub struct Timeline<W> {
    now: Duration,
    next_seq: u64,
    pending: BTreeMap<TimerId, W>,
}

impl<W> Default for Timeline<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Timeline<W> {
    /// An empty timeline at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending wake-ups.
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedule `wake` to fire `after` from now.
    pub fn schedule(&mut self, after: Duration, wake: W) -> TimerId {
        let id = TimerId {
            deadline: self.now.saturating_add(after),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.insert(id, wake);
        id
    }

    /// Cancel a pending wake-up, returning its payload if it had not fired.
    pub fn cancel(&mut self, id: TimerId) -> Option<W> {
        self.pending.remove(&id)
    }

    /// Drop every pending wake-up for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&W) -> bool) {
        self.pending.retain(|_, wake| keep(wake));
    }

    /// Deadline of the earliest pending wake-up.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(TimerId::deadline)
    }

    /// Iterate pending payloads in firing order.
    pub fn iter(&self) -> impl Iterator<Item = (&TimerId, &W)> {
        self.pending.iter()
    }

    /// Pop the earliest wake-up due at or before `limit`.
    ///
    /// On success the clock moves to that wake-up's deadline (or stays put if
    /// the deadline is already in the past).
    pub fn pop_due(&mut self, limit: Duration) -> Option<(Duration, W)> {
        let first = *self.pending.keys().next()?;
        if first.deadline > limit {
            return None;
        }
        let wake = self.pending.remove(&first)?;
        self.now = self.now.max(first.deadline);
        Some((self.now, wake))
    }

    /// Move the clock forward to `t` without firing anything.
    pub fn advance_to(&mut self, t: Duration) {
        self.now = self.now.max(t);
    }
}
