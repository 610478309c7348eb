use crate::chat::{MessageId, MessageStatus};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Advance { id: MessageId, status: MessageStatus },
    Reply { prompt: String },
}

#[derive(Debug)]
struct Entry {
    due: Duration,
    seq: u64,
    action: Action,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Pending delayed actions, keyed by due time on the session clock.
///
/// Actions due at the same instant come out in the order they went in.
#[derive(Debug, Default)]
pub struct Schedule {
    queue: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due: Duration, action: Action) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry { due, seq, action }));
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, Action)> {
        if self.next_due()? > now {
            return None;
        }
        self.queue
            .pop()
            .map(|Reverse(entry)| (entry.due, entry.action))
    }
}
