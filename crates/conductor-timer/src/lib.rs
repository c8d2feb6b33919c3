//! One-shot deadline timers for an actor's `select!` loop.
//!
//! A [`TimerQueue`] holds payloads that become due at a given instant.
//! The owner polls [`TimerQueue::next_due`] next to its mailbox, so a
//! fired timer is handled on the same task, one event at a time, like
//! any other message:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = mailbox.recv() => { /* handle command */ }
//!         timer = timers.next_due() => { /* handle timer */ }
//!     }
//! }
//! ```
//!
//! With nothing scheduled, `next_due` pends forever and `select!` simply
//! keeps serving the other branches.
//!
//! Timers are never cancelled implicitly. Payloads should carry enough
//! identity for the handler to recognise a timer that no longer applies.
//! [`TimerQueue::cancel_where`] exists to drop timers for state that is
//! gone for good.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::trace;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

struct Entry<T> {
    deadline: Instant,
    /// Scheduling order.
    seq: u64,
    payload: T,
}

// Min-heap on (deadline, seq): earliest first, ties in scheduling order.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// Pending one-shot timers, earliest first.
pub struct TimerQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedules `payload` to become due `after` from now.
    pub fn schedule(&mut self, after: Duration, payload: T) {
        self.schedule_at(Instant::now() + after, payload);
    }

    /// Schedules `payload` to become due at `deadline`.
    pub fn schedule_at(&mut self, deadline: Instant, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            deadline,
            seq,
            payload,
        });
        trace!(seq, pending = self.heap.len(), "timer scheduled");
    }

    /// Waits for the earliest timer and returns its payload.
    ///
    /// Pends forever while the queue is empty. Cancel-safe: if the
    /// future is dropped before it resolves, nothing is removed.
    pub async fn next_due(&mut self) -> T {
        let Some(deadline) = self.next_deadline() else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(deadline).await;

        match self.heap.pop() {
            Some(entry) => {
                trace!(seq = entry.seq, "timer fired");
                entry.payload
            }
            // `&mut self` is held across the sleep, so the entry seen above
            // is still there.
            None => std::future::pending().await,
        }
    }

    /// Removes and returns the earliest payload if it is due at `now`.
    /// Lets the owner drain timers that came due together with the one
    /// `next_due` just returned.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        if self.heap.peek()?.deadline <= now {
            self.heap.pop().map(|e| e.payload)
        } else {
            None
        }
    }

    /// Drops every pending timer whose payload matches `pred`. Returns
    /// how many were dropped.
    pub fn cancel_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.heap.len();
        self.heap.retain(|e| !pred(&e.payload));
        let dropped = before - self.heap.len();
        if dropped > 0 {
            trace!(dropped, "timers cancelled");
        }
        dropped
    }

    /// When the earliest timer is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|e| e.deadline)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
