use serde::Serialize;
use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub action: u64,
    pub message: String,
}

/// Bounded tail of the battle log for display; older lines fall off the front.
#[derive(Clone, Debug)]
pub struct BattleLog {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

impl BattleLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_newest_entries() {
        let mut log = BattleLog::new(3);
        for action in 1..=5 {
            log.push(LogEntry {
                action,
                message: format!("line {action}"),
            });
        }
        let actions: Vec<u64> = log.entries().map(|e| e.action).collect();
        assert_eq!(actions, vec![3, 4, 5]);
        assert_eq!(log.last().map(|e| e.action), Some(5));
    }

    #[test]
    fn zero_capacity_still_keeps_the_latest_line() {
        let mut log = BattleLog::new(0);
        log.push(LogEntry {
            action: 1,
            message: "a".to_string(),
        });
        log.push(LogEntry {
            action: 2,
            message: "b".to_string(),
        });
        assert_eq!(log.len(), 1);
        assert_eq!(log.capacity(), 1);
    }
}
