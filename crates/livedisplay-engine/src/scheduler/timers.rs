//! Deferred ticks, ordered by deadline then by scheduling order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Task {
    /// Next sweep step or the quick-mode paint of a row
    TransitionStep { row: usize, generation: u64 },
    /// Try to start the row's queued messages
    RetryMessage { row: usize },
    /// Apply the latest resize request
    ResizeDebounce { generation: u64 },
    /// Page advance check loop
    Check,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    at: i64,
    seq: u64,
    task: Task,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    seq: u64,
}

impl TimerQueue {
    pub(crate) fn schedule(&mut self, at: i64, task: Task) {
        self.seq += 1;
        self.heap.push(Reverse(Scheduled {
            at,
            seq: self.seq,
            task,
        }));
    }

    pub(crate) fn next_deadline(&self) -> Option<i64> {
        self.heap.peek().map(|Reverse(scheduled)| scheduled.at)
    }

    /// Earliest task due at or before `now`, with its deadline
    pub(crate) fn pop_due(&mut self, now: i64) -> Option<(i64, Task)> {
        if self.next_deadline()? > now {
            return None;
        }
        self.heap
            .pop()
            .map(|Reverse(scheduled)| (scheduled.at, scheduled.task))
    }
}
