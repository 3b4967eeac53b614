use serde::{Deserialize, Serialize};
use std::fmt;

/// Every badge the village can award. The set is closed: content files and
/// saved progress can only refer to these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    FirstSteps,
    Explorer,
    QuizMaster,
    StudentResistant,
    ParentAlly,
    VillageHero,
}

impl BadgeId {
    pub const ALL: [BadgeId; 6] = [
        BadgeId::FirstSteps,
        BadgeId::Explorer,
        BadgeId::QuizMaster,
        BadgeId::StudentResistant,
        BadgeId::ParentAlly,
        BadgeId::VillageHero,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BadgeId::FirstSteps => "first_steps",
            BadgeId::Explorer => "explorer",
            BadgeId::QuizMaster => "quiz_master",
            BadgeId::StudentResistant => "student_resistant",
            BadgeId::ParentAlly => "parent_ally",
            BadgeId::VillageHero => "village_hero",
        }
    }

    /// Unknown identifiers are a lookup miss, not an error.
    pub fn parse(key: &str) -> Option<BadgeId> {
        BadgeId::ALL.into_iter().find(|id| id.as_str() == key)
    }

    pub fn badge(self) -> &'static Badge {
        // BADGES is declared in discriminant order, see `catalog_is_in_discriminant_order`
        &BADGES[self as usize]
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub id: BadgeId,
    pub title: &'static str,
    pub description: &'static str,
    pub xp: u32,
    pub icon: &'static str,
}

pub const BADGES: &[Badge] = &[
    Badge {
        id: BadgeId::FirstSteps,
        title: "First Steps",
        description: "Walk through the village gates and join the resistance",
        xp: 50,
        icon: "🌱",
    },
    Badge {
        id: BadgeId::Explorer,
        title: "Explorer",
        description: "Answer the opening question of a path",
        xp: 100,
        icon: "🧭",
    },
    Badge {
        id: BadgeId::QuizMaster,
        title: "Quiz Master",
        description: "Get every answer right in the NIRD quiz",
        xp: 200,
        icon: "🎓",
    },
    Badge {
        id: BadgeId::StudentResistant,
        title: "Student Resistant",
        description: "Finish the student path with only free-software choices",
        xp: 150,
        icon: "🛡",
    },
    Badge {
        id: BadgeId::ParentAlly,
        title: "Parent Ally",
        description: "Finish the parent path",
        xp: 150,
        icon: "🤝",
    },
    Badge {
        id: BadgeId::VillageHero,
        title: "Village Hero",
        description: "Earn every other badge and free the village",
        xp: 500,
        icon: "🏰",
    },
];

/// Badges that must all be unlocked before `village_hero` is granted.
pub const VILLAGE_HERO_REQUIREMENTS: &[BadgeId] = &[
    BadgeId::FirstSteps,
    BadgeId::Explorer,
    BadgeId::QuizMaster,
    BadgeId::StudentResistant,
    BadgeId::ParentAlly,
];

pub fn all() -> &'static [Badge] {
    BADGES
}

pub fn find(key: &str) -> Option<&'static Badge> {
    BadgeId::parse(key).map(BadgeId::badge)
}
