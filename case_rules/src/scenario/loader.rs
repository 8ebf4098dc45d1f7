//! Scenario file parsing and validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::ScenarioConfig;

/// Errors raised while loading authored scenario content.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scenario TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported scenario file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid scenario '{scenario}': {reason}")]
    Validation { scenario: String, reason: String },

    #[error("Duplicate scenario id: {0}")]
    DuplicateScenario(String),
}

impl ScenarioError {
    fn validation(scenario: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            scenario: scenario.to_string(),
            reason: reason.into(),
        }
    }
}

impl ScenarioConfig {
    /// Parse and validate a scenario from TOML.
    pub fn from_toml_str(src: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a scenario from JSON.
    pub fn from_json_str(src: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_json::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a scenario file, choosing the format by extension.
    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        let src = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&src),
            Some("json") => Self::from_json_str(&src),
            _ => Err(ScenarioError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Check structural invariants of authored content.
    ///
    /// Problems that only make content inert (rules without effects, unknown
    /// condition kinds, crimes against unlisted suspects) are logged and
    /// accepted.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.id.trim().is_empty() {
            return Err(ScenarioError::validation(&self.id, "scenario id is empty"));
        }

        let mut crime_ids = HashSet::new();
        for crime in &self.crimes {
            if !crime_ids.insert(crime.id.as_str()) {
                return Err(ScenarioError::validation(
                    &self.id,
                    format!("duplicate crime id '{}'", crime.id),
                ));
            }
            if !self.suspects.contains(&crime.suspect_id) {
                tracing::warn!(
                    scenario = %self.id,
                    crime = %crime.id,
                    suspect = %crime.suspect_id,
                    "crime names a suspect who is not in the suspect list"
                );
            }
        }

        let mut fail_ids = HashSet::new();
        for fail in &self.fail_states {
            if !fail_ids.insert(fail.id.as_str()) {
                return Err(ScenarioError::validation(
                    &self.id,
                    format!("duplicate fail state id '{}'", fail.id),
                ));
            }
        }

        for (index, rule) in self.event_rules.iter().enumerate() {
            if !rule.has_effects() {
                tracing::warn!(
                    scenario = %self.id,
                    rule = index,
                    item = %rule.when_item,
                    "event rule has no effects"
                );
            }
        }

        let conditions = self
            .event_rules
            .iter()
            .filter_map(|rule| rule.when.as_ref())
            .chain(self.crimes.iter().map(|crime| &crime.unlock_when))
            .chain(self.fail_states.iter().map(|fail| &fail.when))
            .chain(self.unlock_when.iter());
        for condition in conditions {
            if condition.contains_unknown() {
                tracing::warn!(
                    scenario = %self.id,
                    condition = %condition,
                    "condition contains an unrecognised kind and will never hold"
                );
            }
        }

        Ok(())
    }
}
