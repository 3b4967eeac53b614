//! One player's progress: the three stores plus the storage they are saved to.
//!
//! Store operations are pure state transitions. The session injects the
//! achievement store where a transition can unlock badges and writes every
//! touched store back to storage afterwards.

use std::path::Path;
use tracing::{info, warn};

use crate::achievements::{AchievementState, AchievementStore, BadgeUnlocker};
use crate::badges::BadgeId;
use crate::progress::{ScenarioProgressSnapshot, ScenarioProgressStore, Track};
use crate::storage::{FileStorage, Persistence};
use crate::student::{Points, StudentScenarioSnapshot, StudentScenarioStore};

pub const ACHIEVEMENTS_KEY: &str = "nird-achievements";
pub const SCENARIO_PROGRESS_KEY: &str = "nird-scenario-progress";
pub const STUDENT_SCENARIOS_KEY: &str = "nird-student-scenarios";

pub struct Session {
    achievements: AchievementStore,
    progress: ScenarioProgressStore,
    student: StudentScenarioStore,
    persistence: Persistence,
}

impl Session {
    pub fn new(persistence: Persistence) -> Self {
        let achievements = persistence
            .load::<AchievementState>(ACHIEVEMENTS_KEY)
            .map(AchievementStore::from_state)
            .unwrap_or_default();
        let progress = persistence
            .load::<ScenarioProgressSnapshot>(SCENARIO_PROGRESS_KEY)
            .and_then(|saved| {
                let restored = ScenarioProgressStore::from_snapshot(saved);
                if restored.is_none() {
                    warn!(key = SCENARIO_PROGRESS_KEY, "saved scores overflow, starting fresh");
                }
                restored
            })
            .unwrap_or_default();
        let student = persistence
            .load::<StudentScenarioSnapshot>(STUDENT_SCENARIOS_KEY)
            .and_then(|saved| {
                let restored = StudentScenarioStore::from_snapshot(saved);
                if restored.is_none() {
                    warn!(key = STUDENT_SCENARIOS_KEY, "saved points overflow, starting fresh");
                }
                restored
            })
            .unwrap_or_default();

        info!(
            badges = achievements.unlocked_badges().len(),
            xp = achievements.total_xp(),
            "progress loaded"
        );

        Session {
            achievements,
            progress,
            student,
            persistence,
        }
    }

    /// Opens saved progress in `data_dir`. If the directory is unusable the
    /// session still works, it just forgets everything on exit.
    pub fn open(data_dir: &Path) -> Self {
        match FileStorage::open(data_dir) {
            Ok(storage) => Session::new(Persistence::new(storage)),
            Err(e) => {
                warn!(
                    dir = %data_dir.display(),
                    error = %e,
                    "cannot open save directory, keeping progress in memory"
                );
                Session::new(Persistence::in_memory())
            }
        }
    }

    pub fn in_memory() -> Self {
        Session::new(Persistence::in_memory())
    }

    pub fn achievements(&self) -> &AchievementStore {
        &self.achievements
    }

    pub fn progress(&self) -> &ScenarioProgressStore {
        &self.progress
    }

    pub fn student(&self) -> &StudentScenarioStore {
        &self.student
    }

    pub fn is_persistent(&self) -> bool {
        !self.persistence.is_degraded()
    }

    pub fn begin_adventure(&mut self) -> Vec<BadgeId> {
        self.unlock_badge(BadgeId::FirstSteps)
    }

    pub fn unlock_badge(&mut self, id: BadgeId) -> Vec<BadgeId> {
        let unlocked = self.achievements.unlock_badge(id);
        if !unlocked.is_empty() {
            self.save_achievements();
        }
        unlocked
    }

    pub fn clear_recent_badge(&mut self) {
        self.achievements.clear_recent_badge();
    }

    pub fn complete_teaser(&mut self, track: Track, choice_id: &str, is_correct: bool) -> bool {
        let recorded =
            self.progress
                .complete_teaser(track, choice_id, is_correct, &mut self.achievements);
        if recorded {
            self.save_progress();
            self.save_achievements();
        }
        recorded
    }

    pub fn complete_scenario(
        &mut self,
        track: Track,
        scenario_id: &str,
        choice_id: &str,
        is_correct: bool,
        points: i64,
    ) -> bool {
        let recorded = self.progress.complete_scenario(
            track,
            scenario_id,
            choice_id,
            is_correct,
            points,
            &mut self.achievements,
        );
        if recorded {
            self.save_progress();
            self.save_achievements();
        }
        recorded
    }

    pub fn complete_student_scenario(
        &mut self,
        scenario_id: &str,
        choice_id: &str,
        is_alternative: bool,
        reward: Points,
    ) -> bool {
        let recorded = self
            .student
            .complete_student_scenario(scenario_id, choice_id, is_alternative, reward);
        if recorded {
            self.save_student();
        }
        recorded
    }

    /// A perfect quiz earns `quiz_master`. Returns the badges this unlocked.
    pub fn complete_quiz(&mut self, correct: usize, total: usize) -> Vec<BadgeId> {
        info!(correct, total, "quiz finished");
        if total == 0 || correct < total {
            return Vec::new();
        }
        self.unlock_badge(BadgeId::QuizMaster)
    }

    /// Clears every store and the saved snapshots.
    pub fn reset(&mut self) {
        self.achievements.reset();
        self.progress.reset();
        self.student.reset_progress();

        for key in [ACHIEVEMENTS_KEY, SCENARIO_PROGRESS_KEY, STUDENT_SCENARIOS_KEY] {
            self.persistence.remove(key);
        }
        info!("progress reset");
    }

    fn save_achievements(&mut self) {
        self.persistence
            .save(ACHIEVEMENTS_KEY, self.achievements.state());
    }

    fn save_progress(&mut self) {
        self.persistence
            .save(SCENARIO_PROGRESS_KEY, &self.progress.snapshot());
    }

    fn save_student(&mut self) {
        self.persistence
            .save(STUDENT_SCENARIOS_KEY, &self.student.snapshot());
    }
}
