// Append-only history of probe results for one probe class.
// Full history is kept for the process lifetime; readers only ever see the recent window.

use crate::models::ProbeResult;

#[derive(Debug, Default, Clone)]
pub struct HistoryStore {
    entries: Vec<ProbeResult>,
    successes: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends in arrival order, which is chronological order for a single writer.
    pub fn append(&mut self, result: ProbeResult) {
        if result.success() {
            self.successes += 1;
        }
        self.entries.push(result);
    }

    /// Up to `n` most recent entries, oldest of the window first.
    pub fn latest(&self, n: usize) -> &[ProbeResult] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn last(&self) -> Option<&ProbeResult> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.successes
    }

    /// Percentage of successful entries; 0.0 for an empty store.
    pub fn success_rate(&self) -> f64 {
        percentage(self.successes as u64, self.entries.len() as u64)
    }
}

/// `100 * part / whole`, or 0.0 when `whole` is zero.
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
