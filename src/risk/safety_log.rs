use std::collections::VecDeque;

use crate::models::SafetyWarning;

/// Ordered safety warning log
///
/// Keeps at most `capacity` entries, evicting the oldest first.
#[derive(Debug, Clone)]
pub struct SafetyLog {
    entries: VecDeque<SafetyWarning>,
    capacity: usize,
    total: u64,
}

impl SafetyLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    /// Append a warning and return a copy of it
    pub fn push(&mut self, message: impl Into<String>) -> SafetyWarning {
        let warning = SafetyWarning::new(message);
        self.entries.push_back(warning.clone());
        self.total += 1;

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }

        warning
    }

    pub fn last(&self) -> Option<&SafetyWarning> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of warnings ever pushed, including evicted ones
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Warnings pushed after the log's `total()` was `mark`, oldest first
    pub fn added_since(&self, mark: u64) -> Vec<SafetyWarning> {
        let added = self.total.saturating_sub(mark) as usize;
        let skip = self.entries.len().saturating_sub(added);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<SafetyWarning> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut log = SafetyLog::new(10);
        log.push("first");
        log.push("second");

        let messages: Vec<_> = log.snapshot().into_iter().map(|w| w.message).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(log.last().unwrap().message, "second");
    }

    #[test]
    fn test_oldest_entries_are_evicted() {
        let mut log = SafetyLog::new(2);
        log.push("a");
        log.push("b");
        log.push("c");

        assert_eq!(log.len(), 2);
        assert_eq!(log.snapshot()[0].message, "b");
    }

    #[test]
    fn test_added_since_mark() {
        let mut log = SafetyLog::new(3);
        log.push("old");
        let mark = log.total();
        log.push("new 1");
        log.push("new 2");

        let added: Vec<_> = log.added_since(mark).into_iter().map(|w| w.message).collect();
        assert_eq!(added, vec!["new 1", "new 2"]);
        assert!(log.added_since(log.total()).is_empty());
    }

    #[test]
    fn test_zero_capacity_still_keeps_latest() {
        let mut log = SafetyLog::new(0);
        assert!(log.is_empty());
        log.push("only");
        assert_eq!(log.len(), 1);
    }
}
