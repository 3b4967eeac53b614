use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::badges::{BadgeId, VILLAGE_HERO_REQUIREMENTS};

/// Something that can hand out badges. Progress stores receive one of these
/// instead of reaching for a global achievement store.
pub trait BadgeUnlocker {
    /// Returns the badges newly unlocked by this call, empty if `id` was
    /// already unlocked.
    fn unlock_badge(&mut self, id: BadgeId) -> Vec<BadgeId>;
}

/// The durable part of the achievement store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementState {
    pub unlocked_badges: BTreeSet<BadgeId>,
    pub total_xp: u32,
}

#[derive(Debug, Default)]
pub struct AchievementStore {
    state: AchievementState,
    // transient, never persisted
    recent_badge: Option<BadgeId>,
}

impl AchievementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from saved state. XP is recomputed from the catalog
    /// and a capstone whose requirements are missing is dropped.
    pub fn from_state(saved: AchievementState) -> Self {
        let mut unlocked = saved.unlocked_badges;

        if unlocked.contains(&BadgeId::VillageHero) && !requirements_met(&unlocked) {
            warn!("saved progress holds village_hero without its requirements, dropping it");
            unlocked.remove(&BadgeId::VillageHero);
        }

        let total_xp = xp_of(&unlocked);
        if total_xp != saved.total_xp {
            warn!(
                saved = saved.total_xp,
                recomputed = total_xp,
                "saved XP total disagrees with unlocked badges"
            );
        }

        let mut store = AchievementStore {
            state: AchievementState {
                unlocked_badges: unlocked,
                total_xp,
            },
            recent_badge: None,
        };
        store.check_capstone();
        store.recent_badge = None;
        store
    }

    pub fn state(&self) -> &AchievementState {
        &self.state
    }

    pub fn has_badge(&self, id: BadgeId) -> bool {
        self.state.unlocked_badges.contains(&id)
    }

    pub fn unlocked_badges(&self) -> &BTreeSet<BadgeId> {
        &self.state.unlocked_badges
    }

    pub fn total_xp(&self) -> u32 {
        self.state.total_xp
    }

    pub fn recent_badge(&self) -> Option<BadgeId> {
        self.recent_badge
    }

    pub fn clear_recent_badge(&mut self) {
        self.recent_badge = None;
    }

    /// How many capstone requirements are unlocked, out of how many.
    pub fn capstone_progress(&self) -> (usize, usize) {
        let have = VILLAGE_HERO_REQUIREMENTS
            .iter()
            .filter(|id| self.has_badge(**id))
            .count();
        (have, VILLAGE_HERO_REQUIREMENTS.len())
    }

    pub fn reset(&mut self) {
        self.state = AchievementState::default();
        self.recent_badge = None;
    }

    fn insert(&mut self, id: BadgeId) -> bool {
        if !self.state.unlocked_badges.insert(id) {
            return false;
        }
        let badge = id.badge();
        self.state.total_xp += badge.xp;
        self.recent_badge = Some(id);
        info!(badge = %id, xp = badge.xp, total_xp = self.state.total_xp, "badge unlocked");
        true
    }

    fn check_capstone(&mut self) -> Option<BadgeId> {
        if self.has_badge(BadgeId::VillageHero) || !requirements_met(&self.state.unlocked_badges) {
            return None;
        }
        self.insert(BadgeId::VillageHero).then_some(BadgeId::VillageHero)
    }
}

impl BadgeUnlocker for AchievementStore {
    fn unlock_badge(&mut self, id: BadgeId) -> Vec<BadgeId> {
        if !self.insert(id) {
            debug!(badge = %id, "badge already unlocked");
            return Vec::new();
        }

        let mut unlocked = vec![id];
        unlocked.extend(self.check_capstone());
        unlocked
    }
}

fn requirements_met(unlocked: &BTreeSet<BadgeId>) -> bool {
    VILLAGE_HERO_REQUIREMENTS.iter().all(|id| unlocked.contains(id))
}

fn xp_of(unlocked: &BTreeSet<BadgeId>) -> u32 {
    unlocked.iter().map(|id| id.badge().xp).sum()
}
