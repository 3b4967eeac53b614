pub mod loader;
pub mod types;

pub use loader::{load_content, load_quiz, load_scenarios, load_track, load_village};
pub use types::{Choice, Content, Question, Quiz, Scenario, Teaser, TrackContent};
