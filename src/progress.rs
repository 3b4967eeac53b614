//! Scenario progress for the student and parent paths.
//!
//! Each track has a one-time teaser and a ledger of completed scenarios with a
//! scalar score. Finishing a track unlocks its badge through whatever
//! [`BadgeUnlocker`] the caller hands in.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::achievements::BadgeUnlocker;
use crate::badges::BadgeId;
use crate::ledger::{Ledger, ProgressEntry};

/// Entries a track needs before its completion badge is considered.
pub const TRACK_COMPLETION_THRESHOLD: usize = 3;

/// The only correct choice id on the student track.
pub const STUDENT_CORRECT_CHOICE: &str = "nird";

/// Parent track choices ending with this suffix are the free-software ones.
pub const PARENT_CORRECT_SUFFIX: &str = "_libre";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Student,
    Parent,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Student, Track::Parent];

    pub const fn as_str(self) -> &'static str {
        match self {
            Track::Student => "student",
            Track::Parent => "parent",
        }
    }

    pub const fn scenario_prefix(self) -> &'static str {
        match self {
            Track::Student => "student-",
            Track::Parent => "parent-",
        }
    }

    /// Track owning a scenario id, by prefix. Admin scenarios (`admin-`) and
    /// village challenges have no track here.
    pub fn from_scenario_id(scenario_id: &str) -> Option<Track> {
        Track::ALL
            .into_iter()
            .find(|t| scenario_id.starts_with(t.scenario_prefix()))
    }

    /// The two tracks were written separately and keep their own id schemes.
    pub fn is_correct_choice(self, choice_id: &str) -> bool {
        match self {
            Track::Student => choice_id == STUDENT_CORRECT_CHOICE,
            Track::Parent => choice_id.ends_with(PARENT_CORRECT_SUFFIX),
        }
    }

    pub const fn completion_badge(self) -> BadgeId {
        match self {
            Track::Student => BadgeId::StudentResistant,
            Track::Parent => BadgeId::ParentAlly,
        }
    }

    fn is_complete(self, ledger: &Ledger<i64>) -> bool {
        if ledger.len() < TRACK_COMPLETION_THRESHOLD {
            return false;
        }
        match self {
            Track::Student => ledger.all_correct(),
            Track::Parent => true,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
struct TrackProgress {
    teaser_completed: bool,
    ledger: Ledger<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub teaser_completed: bool,
    pub entries: Vec<ProgressEntry<i64>>,
    pub score: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProgressSnapshot {
    pub student: TrackSnapshot,
    pub parent: TrackSnapshot,
}

#[derive(Debug, Default)]
pub struct ScenarioProgressStore {
    student: TrackProgress,
    parent: TrackProgress,
}

impl ScenarioProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if the saved entries cannot come from real choices.
    pub fn from_snapshot(snapshot: ScenarioProgressSnapshot) -> Option<Self> {
        fn restore(saved: TrackSnapshot) -> Option<TrackProgress> {
            Some(TrackProgress {
                teaser_completed: saved.teaser_completed,
                ledger: Ledger::from_entries(saved.entries)?,
            })
        }
        Some(ScenarioProgressStore {
            student: restore(snapshot.student)?,
            parent: restore(snapshot.parent)?,
        })
    }

    pub fn snapshot(&self) -> ScenarioProgressSnapshot {
        fn save(track: &TrackProgress) -> TrackSnapshot {
            TrackSnapshot {
                teaser_completed: track.teaser_completed,
                entries: track.ledger.entries().to_vec(),
                score: track.ledger.total(),
            }
        }
        ScenarioProgressSnapshot {
            student: save(&self.student),
            parent: save(&self.parent),
        }
    }

    fn track(&self, track: Track) -> &TrackProgress {
        match track {
            Track::Student => &self.student,
            Track::Parent => &self.parent,
        }
    }

    fn track_mut(&mut self, track: Track) -> &mut TrackProgress {
        match track {
            Track::Student => &mut self.student,
            Track::Parent => &mut self.parent,
        }
    }

    /// Returns false if this track's teaser was already answered.
    pub fn complete_teaser(
        &mut self,
        track: Track,
        choice_id: &str,
        is_correct: bool,
        badges: &mut impl BadgeUnlocker,
    ) -> bool {
        let progress = self.track_mut(track);
        if progress.teaser_completed {
            debug!(%track, "teaser already completed");
            return false;
        }
        progress.teaser_completed = true;
        info!(%track, choice = choice_id, is_correct, "teaser completed");

        badges.unlock_badge(BadgeId::Explorer);
        true
    }

    /// Returns false if `scenario_id` is already recorded on this track.
    pub fn complete_scenario(
        &mut self,
        track: Track,
        scenario_id: &str,
        choice_id: &str,
        is_correct: bool,
        points: i64,
        badges: &mut impl BadgeUnlocker,
    ) -> bool {
        let progress = self.track_mut(track);
        let entry = ProgressEntry::new(scenario_id, choice_id, is_correct, points);
        if !progress.ledger.record(entry) {
            debug!(%track, scenario = scenario_id, "scenario already completed");
            return false;
        }
        info!(
            %track,
            scenario = scenario_id,
            choice = choice_id,
            is_correct,
            points,
            score = progress.ledger.total(),
            "scenario completed"
        );

        if track.is_complete(&progress.ledger) {
            badges.unlock_badge(track.completion_badge());
        }
        true
    }

    pub fn has_completed(&self, scenario_id: &str) -> bool {
        Track::ALL
            .into_iter()
            .any(|t| self.track(t).ledger.has_completed(scenario_id))
    }

    pub fn completion_count(&self, track: Track) -> usize {
        self.track(track).ledger.len()
    }

    pub fn score(&self, track: Track) -> i64 {
        self.track(track).ledger.total()
    }

    pub fn teaser_completed(&self, track: Track) -> bool {
        self.track(track).teaser_completed
    }

    pub fn entries(&self, track: Track) -> &[ProgressEntry<i64>] {
        self.track(track).ledger.entries()
    }

    pub fn reset(&mut self) {
        *self = ScenarioProgressStore::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::AchievementStore;

    #[test]
    fn correctness_conventions_stay_per_track() {
        assert!(Track::Student.is_correct_choice("nird"));
        assert!(!Track::Student.is_correct_choice("linux_libre"));
        assert!(!Track::Student.is_correct_choice("nird_bis"));

        assert!(Track::Parent.is_correct_choice("ent_libre"));
        assert!(!Track::Parent.is_correct_choice("nird"));
        assert!(!Track::Parent.is_correct_choice("libre_cloud"));
    }

    #[test]
    fn scenario_prefixes_pick_the_track() {
        assert_eq!(Track::from_scenario_id("student-cloud"), Some(Track::Student));
        assert_eq!(Track::from_scenario_id("parent-ent"), Some(Track::Parent));
        assert_eq!(Track::from_scenario_id("admin-budget"), None);
        assert_eq!(Track::from_scenario_id("challenge-1"), None);
    }

    #[test]
    fn teaser_unlocks_explorer_once() {
        let mut badges = AchievementStore::new();
        let mut store = ScenarioProgressStore::new();

        assert!(store.complete_teaser(Track::Parent, "ent_libre", true, &mut badges));
        assert!(!store.complete_teaser(Track::Parent, "gafam", false, &mut badges));
        assert!(store.complete_teaser(Track::Student, "nird", true, &mut badges));

        assert!(store.teaser_completed(Track::Parent));
        assert!(badges.has_badge(BadgeId::Explorer));
        assert_eq!(badges.total_xp(), 100);
    }

    #[test]
    fn repeated_completion_keeps_first_entry_and_score() {
        let mut badges = AchievementStore::new();
        let mut store = ScenarioProgressStore::new();

        store.complete_scenario(Track::Student, "student-1", "nird", true, 30, &mut badges);
        let first = store.entries(Track::Student).to_vec();

        assert!(!store.complete_scenario(
            Track::Student,
            "student-1",
            "gafam",
            false,
            -99,
            &mut badges
        ));
        assert_eq!(store.entries(Track::Student), first.as_slice());
        assert_eq!(store.score(Track::Student), 30);
    }

    #[test]
    fn tracks_are_recorded_independently() {
        let mut badges = AchievementStore::new();
        let mut store = ScenarioProgressStore::new();

        store.complete_scenario(Track::Student, "shared", "nird", true, 10, &mut badges);
        assert!(store.complete_scenario(Track::Parent, "shared", "x_libre", true, 5, &mut badges));

        assert_eq!(store.completion_count(Track::Student), 1);
        assert_eq!(store.completion_count(Track::Parent), 1);
        assert!(store.has_completed("shared"));
        assert!(!store.has_completed("other"));
    }

    #[test]
    fn student_badge_needs_three_correct_choices() {
        let mut badges = AchievementStore::new();
        let mut store = ScenarioProgressStore::new();

        store.complete_scenario(Track::Student, "student-1", "nird", true, 10, &mut badges);
        store.complete_scenario(Track::Student, "student-2", "nird", true, 10, &mut badges);
        assert!(!badges.has_badge(BadgeId::StudentResistant));

        store.complete_scenario(Track::Student, "student-3", "nird", true, 10, &mut badges);
        assert!(badges.has_badge(BadgeId::StudentResistant));
    }

    #[test]
    fn one_wrong_student_choice_blocks_the_badge() {
        let mut badges = AchievementStore::new();
        let mut store = ScenarioProgressStore::new();

        store.complete_scenario(Track::Student, "student-1", "gafam", false, 0, &mut badges);
        store.complete_scenario(Track::Student, "student-2", "nird", true, 10, &mut badges);
        store.complete_scenario(Track::Student, "student-3", "nird", true, 10, &mut badges);
        store.complete_scenario(Track::Student, "student-4", "nird", true, 10, &mut badges);

        assert!(!badges.has_badge(BadgeId::StudentResistant));
    }

    #[test]
    fn parent_badge_ignores_correctness() {
        let mut badges = AchievementStore::new();
        let mut store = ScenarioProgressStore::new();

        for id in ["parent-1", "parent-2", "parent-3"] {
            store.complete_scenario(Track::Parent, id, "big_tech", false, 0, &mut badges);
        }

        assert!(badges.has_badge(BadgeId::ParentAlly));
        assert_eq!(badges.total_xp(), 150);
    }

    #[test]
    fn snapshot_round_trip_keeps_state() {
        let mut badges = AchievementStore::new();
        let mut store = ScenarioProgressStore::new();
        store.complete_teaser(Track::Student, "nird", true, &mut badges);
        store.complete_scenario(Track::Student, "student-1", "nird", true, 25, &mut badges);

        let restored = ScenarioProgressStore::from_snapshot(store.snapshot()).unwrap();

        assert_eq!(restored.snapshot(), store.snapshot());
        assert_eq!(restored.score(Track::Student), 25);
        assert!(restored.teaser_completed(Track::Student));
        assert!(!restored.teaser_completed(Track::Parent));
    }

    #[test]
    fn reset_returns_to_fresh_state() {
        let mut badges = AchievementStore::new();
        let mut store = ScenarioProgressStore::new();
        store.complete_teaser(Track::Parent, "ent_libre", true, &mut badges);
        store.complete_scenario(Track::Parent, "parent-1", "ent_libre", true, 20, &mut badges);

        store.reset();

        assert_eq!(store.snapshot(), ScenarioProgressSnapshot::default());
    }
}
