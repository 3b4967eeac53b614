//! Progress and achievement tracking for Village NIRD, a story game about a
//! school village resisting Big Tech with free software.

pub mod achievements;
pub mod badges;
pub mod config;
pub mod content;
pub mod ledger;
pub mod progress;
pub mod session;
pub mod storage;
pub mod student;

pub use achievements::{AchievementStore, BadgeUnlocker};
pub use badges::{Badge, BadgeId};
pub use progress::{ScenarioProgressStore, Track};
pub use session::Session;
pub use student::{Points, StudentScenarioStore};
