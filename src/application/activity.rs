//! # Activity Log
//!
//! Bounded, in-memory history of what the relay did. Oldest entries are evicted first.
//! `append` is the only mutator; `list` and `stats` are computed from the current buffer.

use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::domain::types::{ActivityStats, LogCategory, LogEntry};

pub struct ActivityLog {
    capacity: usize,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl ActivityLog {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn append(&self, entry: LogEntry) {
        let mut entries = self.entries.lock().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Most recent first.
    pub async fn list(&self) -> Vec<LogEntry> {
        let entries = self.entries.lock().await;
        entries.iter().rev().cloned().collect()
    }

    pub async fn stats(&self) -> ActivityStats {
        let entries = self.entries.lock().await;
        let count = |category: LogCategory| entries.iter().filter(|e| e.category == category).count();
        ActivityStats {
            total: count(LogCategory::Inbound),
            successes: count(LogCategory::Outcome),
            errors: count(LogCategory::Error),
        }
    }
}
