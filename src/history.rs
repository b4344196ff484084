use std::num::NonZeroUsize;

/// Default number of lines kept by [`History`].
pub const HISTORY_SIZE: usize = 10;

/// One line returned by [`History::list_recent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry<'a> {
    /// 1-based position of the line among everything ever recorded.
    pub number: usize,
    /// The line exactly as it was typed.
    pub line: &'a str,
}

/// Fixed-capacity circular log of input lines.
///
/// Slot `i % capacity` holds the most recent line whose 0-based sequence number
/// is congruent to `i`. Older lines are overwritten once the log is full.
#[derive(Debug, Clone)]
pub struct History {
    slots: Vec<String>,
    total: usize,
}

impl History {
    /// Create an empty log holding at most `capacity` lines.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: vec![String::new(); capacity.get()],
            total: 0,
        }
    }

    /// Append `line`, overwriting the oldest entry when full. Empty lines are ignored.
    pub fn record(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        let index = self.total % self.slots.len();
        line.clone_into(&mut self.slots[index]);
        self.total += 1;
    }

    /// The retained lines, oldest first, with their original sequence numbers.
    pub fn list_recent(&self) -> impl Iterator<Item = HistoryEntry<'_>> {
        let start = self.total.saturating_sub(self.slots.len());
        (start..self.total).map(|i| HistoryEntry {
            number: i + 1,
            line: &self.slots[i % self.slots.len()],
        })
    }

    /// Number of lines currently retained.
    pub fn len(&self) -> usize {
        self.total.min(self.slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of lines recorded since startup, including overwritten ones.
    pub fn total_recorded(&self) -> usize {
        self.total
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(HISTORY_SIZE).unwrap_or(NonZeroUsize::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(history: &History) -> Vec<(usize, String)> {
        history
            .list_recent()
            .map(|entry| (entry.number, entry.line.to_string()))
            .collect()
    }

    #[test]
    fn test_partial_history_is_listed_oldest_first() {
        let mut history = History::default();
        history.record("ls");
        history.record("calc 1 + 2");
        history.record("time");

        assert_eq!(
            collect(&history),
            vec![
                (1, "ls".to_string()),
                (2, "calc 1 + 2".to_string()),
                (3, "time".to_string()),
            ]
        );
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_wraparound_keeps_last_n_with_original_numbers() {
        let mut history = History::default();
        let n = history.capacity();
        for i in 1..=n + 3 {
            history.record(&format!("cmd{i}"));
        }

        let listed = collect(&history);
        assert_eq!(listed.len(), n);
        assert_eq!(listed.first(), Some(&(4, "cmd4".to_string())));
        assert_eq!(listed.last(), Some(&(n + 3, format!("cmd{}", n + 3))));
        let numbers: Vec<usize> = listed.iter().map(|(number, _)| *number).collect();
        assert_eq!(numbers, (4..=n + 3).collect::<Vec<_>>());
        assert_eq!(history.total_recorded(), n + 3);
    }

    #[test]
    fn test_empty_lines_are_not_recorded() {
        let mut history = History::default();
        history.record("");
        assert!(history.is_empty());
        assert_eq!(history.list_recent().count(), 0);

        history.record("help");
        history.record("");
        assert_eq!(collect(&history), vec![(1, "help".to_string())]);
    }

    #[test]
    fn test_capacity_of_one() {
        let mut history = History::new(NonZeroUsize::MIN);
        history.record("a");
        history.record("b");
        assert_eq!(collect(&history), vec![(2, "b".to_string())]);
    }
}
