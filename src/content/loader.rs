use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

use super::types::{Content, Quiz, Scenario, Teaser, TrackContent};
use crate::progress::Track;

/// Village challenge ids all start with this.
pub const CHALLENGE_PREFIX: &str = "challenge-";

fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value = toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let scenario: Scenario = load_toml(path)?;
    if scenario.choices.is_empty() {
        bail!("{} has no choices", path.display());
    }
    Ok(scenario)
}

/// Loads every `scenario_*.toml` in `dir`, ordered by file name.
pub fn load_scenarios(dir: &Path) -> Result<Vec<Scenario>> {
    let pattern = dir.join("scenario_*.toml");
    let pattern = pattern.to_string_lossy();
    let mut paths: Vec<_> = glob::glob(&pattern)
        .with_context(|| format!("bad scenario pattern {pattern}"))?
        .filter_map(|p| p.ok())
        .collect();

    // Sort by filename so scenario_01, scenario_02, scenario_03 are in order
    paths.sort();

    let mut scenarios = Vec::new();
    for path in paths {
        debug!(path = %path.display(), "loading scenario");
        scenarios.push(load_scenario(&path)?);
    }
    Ok(scenarios)
}

pub fn load_teaser(path: &Path) -> Result<Teaser> {
    let teaser: Teaser = load_toml(path)?;
    if teaser.choices.is_empty() {
        bail!("{} has no choices", path.display());
    }
    Ok(teaser)
}

pub fn load_track(dir: &Path, track: Track) -> Result<TrackContent> {
    let teaser = load_teaser(&dir.join("teaser.toml"))?;
    let scenarios = load_scenarios(dir)?;

    for scenario in &scenarios {
        if Track::from_scenario_id(&scenario.meta.id) != Some(track) {
            bail!(
                "scenario `{}` in {} does not belong to the {} track",
                scenario.meta.id,
                dir.display(),
                track
            );
        }
    }
    Ok(TrackContent { teaser, scenarios })
}

pub fn load_village(dir: &Path) -> Result<Vec<Scenario>> {
    let scenarios = load_scenarios(dir)?;
    for scenario in &scenarios {
        if !scenario.meta.id.starts_with(CHALLENGE_PREFIX) {
            bail!("village challenge `{}` must start with `{CHALLENGE_PREFIX}`", scenario.meta.id);
        }
        if scenario.reward.is_none() {
            bail!("village challenge `{}` has no [reward]", scenario.meta.id);
        }
    }
    Ok(scenarios)
}

pub fn load_quiz(path: &Path) -> Result<Quiz> {
    let quiz: Quiz = load_toml(path)?;
    for (i, question) in quiz.questions.iter().enumerate() {
        if question.answer >= question.options.len() {
            bail!(
                "question {} in {} points at option {} of {}",
                i + 1,
                path.display(),
                question.answer,
                question.options.len()
            );
        }
    }
    Ok(quiz)
}

pub fn load_content(root: &Path) -> Result<Content> {
    Ok(Content {
        student: load_track(&root.join("student"), Track::Student)?,
        parent: load_track(&root.join("parent"), Track::Parent)?,
        village: load_village(&root.join("village"))?,
        quiz: load_quiz(&root.join("quiz.toml"))?,
    })
}
