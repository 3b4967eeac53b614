use serde::Deserialize;

use crate::student::Points;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub meta: ScenarioMeta,
    pub narrative: Narrative,
    #[serde(rename = "choice")]
    pub choices: Vec<Choice>,
    // village challenges only
    #[serde(default)]
    pub reward: Option<Points>,
}

impl Scenario {
    pub fn reward(&self) -> Points {
        self.reward.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct ScenarioMeta {
    pub id: String,
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub pillar: Option<String>, // inclusion, responsibility or sustainability
}

#[derive(Debug, Deserialize)]
pub struct Narrative {
    pub intro: String,
    pub success: String,
    pub failure: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Choice {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub big_tech: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Teaser {
    pub id: String,
    pub question: String,
    #[serde(rename = "choice")]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Quiz {
    pub title: String,
    #[serde(rename = "question")]
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.answer
    }
}

#[derive(Debug)]
pub struct TrackContent {
    pub teaser: Teaser,
    pub scenarios: Vec<Scenario>,
}

/// Everything the village has to offer, loaded once at startup.
#[derive(Debug)]
pub struct Content {
    pub student: TrackContent,
    pub parent: TrackContent,
    pub village: Vec<Scenario>,
    pub quiz: Quiz,
}
