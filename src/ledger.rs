use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;

/// A scoring model a ledger can accumulate: a scalar score or a point vector.
pub trait Score: Copy + Default + PartialEq + Debug + Serialize + DeserializeOwned {
    /// `None` if any component overflows.
    fn checked_add(self, rhs: Self) -> Option<Self>;

    fn saturating_add(self, rhs: Self) -> Self;
}

impl Score for i64 {
    fn checked_add(self, rhs: i64) -> Option<i64> {
        i64::checked_add(self, rhs)
    }

    fn saturating_add(self, rhs: i64) -> i64 {
        i64::saturating_add(self, rhs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "P: Score")]
pub struct ProgressEntry<P> {
    pub scenario_id: String,
    pub choice_id: String,
    pub is_correct: bool,
    pub points: P,
    pub completed_at: DateTime<Utc>,
}

impl<P: Score> ProgressEntry<P> {
    pub fn new(scenario_id: &str, choice_id: &str, is_correct: bool, points: P) -> Self {
        ProgressEntry {
            scenario_id: scenario_id.to_string(),
            choice_id: choice_id.to_string(),
            is_correct,
            points,
            completed_at: Utc::now(),
        }
    }
}

/// Append-only record of completed scenarios, at most one entry per scenario
/// id, with a running total of the points awarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger<P> {
    entries: Vec<ProgressEntry<P>>,
    total: P,
}

impl<P: Score> Default for Ledger<P> {
    fn default() -> Self {
        Ledger {
            entries: Vec::new(),
            total: P::default(),
        }
    }
}

impl<P: Score> Ledger<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from saved entries, keeping the first entry per
    /// scenario and recomputing the total. Returns `None` if the total
    /// overflows, which no sequence of real choices can produce.
    pub fn from_entries(entries: Vec<ProgressEntry<P>>) -> Option<Self> {
        let mut seen = HashSet::new();
        let mut ledger: Ledger<P> = Ledger::new();
        for entry in entries {
            if seen.insert(entry.scenario_id.clone()) {
                ledger.total = ledger.total.checked_add(entry.points)?;
                ledger.entries.push(entry);
            }
        }
        Some(ledger)
    }

    /// Returns false, leaving the ledger untouched, if the scenario is
    /// already recorded.
    pub fn record(&mut self, entry: ProgressEntry<P>) -> bool {
        if self.has_completed(&entry.scenario_id) {
            return false;
        }
        self.total = self.total.saturating_add(entry.points);
        self.entries.push(entry);
        true
    }

    pub fn has_completed(&self, scenario_id: &str) -> bool {
        self.entries.iter().any(|e| e.scenario_id == scenario_id)
    }

    pub fn entries(&self) -> &[ProgressEntry<P>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_correct).count()
    }

    pub fn all_correct(&self) -> bool {
        self.entries.iter().all(|e| e.is_correct)
    }

    pub fn total(&self) -> P {
        self.total
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.total = P::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_scenario_is_ignored() {
        let mut ledger = Ledger::<i64>::new();
        assert!(ledger.record(ProgressEntry::new("student-1", "nird", true, 10)));
        let first = ledger.entries().to_vec();

        assert!(!ledger.record(ProgressEntry::new("student-1", "gafam", false, -40)));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total(), 10);
        assert_eq!(ledger.entries(), first.as_slice());
    }

    #[test]
    fn counts_and_correctness() {
        let mut ledger = Ledger::<i64>::new();
        assert!(ledger.is_empty());
        assert!(ledger.all_correct());

        ledger.record(ProgressEntry::new("a", "x", true, 5));
        ledger.record(ProgressEntry::new("b", "y", false, 0));

        assert_eq!(ledger.correct_count(), 1);
        assert!(!ledger.all_correct());
        assert!(ledger.has_completed("b"));
        assert!(!ledger.has_completed("c"));
    }

    #[test]
    fn from_entries_drops_duplicates_and_recomputes_total() {
        let entries = vec![
            ProgressEntry::new("a", "x", true, 5),
            ProgressEntry::new("a", "z", false, 100),
            ProgressEntry::new("b", "y", true, 7),
        ];
        let ledger = Ledger::from_entries(entries).unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total(), 12);
        assert_eq!(ledger.entries()[0].choice_id, "x");
    }

    #[test]
    fn from_entries_rejects_an_overflowing_total() {
        let entries = vec![
            ProgressEntry::new("a", "x", true, i64::MAX),
            ProgressEntry::new("b", "y", true, i64::MAX),
        ];
        assert!(Ledger::from_entries(entries).is_none());

        let entries = vec![
            ProgressEntry::new("a", "x", true, i64::MIN),
            ProgressEntry::new("b", "y", true, -1),
        ];
        assert!(Ledger::from_entries(entries).is_none());
    }

    #[test]
    fn record_saturates_instead_of_wrapping() {
        let mut ledger = Ledger::<i64>::new();
        ledger.record(ProgressEntry::new("a", "x", true, i64::MAX));
        ledger.record(ProgressEntry::new("b", "y", true, 10));

        assert_eq!(ledger.total(), i64::MAX);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn clear_returns_to_empty() {
        let mut ledger = Ledger::<i64>::new();
        ledger.record(ProgressEntry::new("a", "x", true, 5));
        ledger.clear();
        assert_eq!(ledger, Ledger::new());
    }
}
