use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::ledger::{Ledger, ProgressEntry, Score};

/// Village challenge points. Each axis can go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Points {
    #[serde(default)]
    pub money: i64,
    #[serde(default)]
    pub protection: i64,
    #[serde(default)]
    pub environment: i64,
}

/// Applied for any Big Tech choice, whatever the scenario offers.
pub const BIG_TECH_PENALTY: Points = Points::new(-50, -30, -20);

impl Points {
    pub const ZERO: Points = Points::new(0, 0, 0);

    pub const fn new(money: i64, protection: i64, environment: i64) -> Self {
        Points {
            money,
            protection,
            environment,
        }
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "money {:+} / protection {:+} / environment {:+}",
            self.money, self.protection, self.environment
        )
    }
}

impl Score for Points {
    fn checked_add(self, rhs: Points) -> Option<Points> {
        Some(Points::new(
            self.money.checked_add(rhs.money)?,
            self.protection.checked_add(rhs.protection)?,
            self.environment.checked_add(rhs.environment)?,
        ))
    }

    fn saturating_add(self, rhs: Points) -> Points {
        Points::new(
            self.money.saturating_add(rhs.money),
            self.protection.saturating_add(rhs.protection),
            self.environment.saturating_add(rhs.environment),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentScenarioSnapshot {
    pub entries: Vec<ProgressEntry<Points>>,
    pub points: Points,
}

/// Single-track store for the village challenge, scored on three axes.
#[derive(Debug, Default)]
pub struct StudentScenarioStore {
    ledger: Ledger<Points>,
}

impl StudentScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if the saved entries cannot come from real choices.
    pub fn from_snapshot(snapshot: StudentScenarioSnapshot) -> Option<Self> {
        Some(StudentScenarioStore {
            ledger: Ledger::from_entries(snapshot.entries)?,
        })
    }

    pub fn snapshot(&self) -> StudentScenarioSnapshot {
        StudentScenarioSnapshot {
            entries: self.ledger.entries().to_vec(),
            points: self.ledger.total(),
        }
    }

    /// Records a choice. `reward` only applies to the alternative choice; a
    /// Big Tech choice always costs [`BIG_TECH_PENALTY`]. Returns false if the
    /// scenario was already completed.
    pub fn complete_student_scenario(
        &mut self,
        scenario_id: &str,
        choice_id: &str,
        is_alternative: bool,
        reward: Points,
    ) -> bool {
        let applied = if is_alternative {
            reward
        } else {
            BIG_TECH_PENALTY
        };
        let entry = ProgressEntry::new(scenario_id, choice_id, is_alternative, applied);
        if !self.ledger.record(entry) {
            debug!(scenario = scenario_id, "village challenge already completed");
            return false;
        }
        info!(
            scenario = scenario_id,
            choice = choice_id,
            is_alternative,
            points = %applied,
            "village challenge completed"
        );
        true
    }

    pub fn points(&self) -> Points {
        self.ledger.total()
    }

    pub fn has_completed(&self, scenario_id: &str) -> bool {
        self.ledger.has_completed(scenario_id)
    }

    pub fn completed_count(&self) -> usize {
        self.ledger.len()
    }

    pub fn alternative_count(&self) -> usize {
        self.ledger.correct_count()
    }

    pub fn entries(&self) -> &[ProgressEntry<Points>] {
        self.ledger.entries()
    }

    pub fn reset_progress(&mut self) {
        self.ledger.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_choice_on_same_scenario_is_ignored() {
        let mut store = StudentScenarioStore::new();

        assert!(store.complete_student_scenario("s1", "B", true, Points::new(100, 100, 100)));
        assert!(!store.complete_student_scenario("s1", "A", false, Points::new(-50, -30, -20)));

        assert_eq!(store.points(), Points::new(100, 100, 100));
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].choice_id, "B");
    }

    #[test]
    fn big_tech_choice_costs_the_flat_penalty() {
        let mut store = StudentScenarioStore::new();

        store.complete_student_scenario("s1", "A", false, Points::new(80, 40, 10));
        store.complete_student_scenario("s2", "A", false, Points::ZERO);

        assert_eq!(store.points(), Points::new(-100, -60, -40));
        assert_eq!(store.alternative_count(), 0);
    }

    #[test]
    fn axes_accumulate_independently() {
        let mut store = StudentScenarioStore::new();

        store.complete_student_scenario("s1", "B", true, Points::new(100, 0, 30));
        store.complete_student_scenario("s2", "A", false, Points::new(10, 10, 10));
        store.complete_student_scenario("s3", "B", true, Points::new(0, 60, 0));

        assert_eq!(store.points(), Points::new(50, 30, 10));
        assert_eq!(store.completed_count(), 3);
        assert_eq!(store.alternative_count(), 2);
        assert!(store.has_completed("s2"));
    }

    #[test]
    fn reset_zeroes_every_axis() {
        let mut store = StudentScenarioStore::new();
        store.complete_student_scenario("s1", "B", true, Points::new(100, 100, 100));

        store.reset_progress();

        assert_eq!(store.points(), Points::ZERO);
        assert!(store.entries().is_empty());
        assert_eq!(store.snapshot(), StudentScenarioSnapshot::default());
    }

    #[test]
    fn snapshot_points_are_recomputed_on_restore() {
        let mut store = StudentScenarioStore::new();
        store.complete_student_scenario("s1", "B", true, Points::new(10, 20, 30));

        let mut snapshot = store.snapshot();
        snapshot.points = Points::new(999, 999, 999);
        let restored = StudentScenarioStore::from_snapshot(snapshot).unwrap();

        assert_eq!(restored.points(), Points::new(10, 20, 30));
    }

    #[test]
    fn overflowing_axis_rejects_the_snapshot() {
        let mut store = StudentScenarioStore::new();
        store.complete_student_scenario("s1", "B", true, Points::new(0, i64::MAX, 0));
        store.complete_student_scenario("s2", "B", true, Points::new(0, 1, 0));

        // live play saturates
        assert_eq!(store.points().protection, i64::MAX);
        assert!(StudentScenarioStore::from_snapshot(store.snapshot()).is_none());
    }

    #[test]
    fn points_display_shows_signs() {
        assert_eq!(
            BIG_TECH_PENALTY.to_string(),
            "money -50 / protection -30 / environment -20"
        );
    }
}
