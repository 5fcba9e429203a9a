// Query history: fixed-capacity FIFO of executed query strings.

use std::collections::VecDeque;

use crate::error::SessionError;

pub const DEFAULT_CAPACITY: usize = 50;

/// Executed queries in insertion order, addressable by 1-based index for
/// replay. Pure FIFO: no deduplication, oldest evicted past capacity.
#[derive(Debug)]
pub struct HistoryRing {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl HistoryRing {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, query: &str) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(query.to_string());
    }

    /// 1-based lookup, matching the `!N` replay syntax.
    pub fn get(&self, index: usize) -> Result<&str, SessionError> {
        if index < 1 || index > self.entries.len() {
            return Err(SessionError::HistoryRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(&self.entries[index - 1])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }
}
