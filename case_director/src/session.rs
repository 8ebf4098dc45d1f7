//! Game session - the context object every caller is handed explicitly.

use case_rules::{ActorId, Crime, FactStore, ScenarioConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::registry::{ScenarioInstanceId, ScenarioRegistry};

/// Unique identifier for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-scoped narrative state.
///
/// Facts live as long as the session; the active scenario can be swapped
/// any number of times underneath them.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    pub id: SessionId,

    /// Flags and counters. Gameplay code may mutate these directly between events.
    pub facts: FactStore,

    pub scenarios: ScenarioRegistry,
}

impl GameSession {
    /// Create a new session with no facts and no scenario.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session resuming from previously saved facts.
    pub fn with_facts(facts: FactStore) -> Self {
        Self {
            facts,
            ..Self::default()
        }
    }

    /// Replace the active scenario. Facts are kept.
    pub fn load_scenario(&mut self, config: impl Into<Arc<ScenarioConfig>>) -> ScenarioInstanceId {
        self.scenarios.load_scenario(config)
    }

    /// Get the active scenario configuration.
    pub fn active_config(&self) -> Option<&ScenarioConfig> {
        self.scenarios.active_config()
    }

    /// Get the crimes currently available against a suspect.
    ///
    /// Recomputed on every call. Empty when no scenario is loaded.
    pub fn available_crimes_for(&self, suspect: &ActorId) -> Vec<&Crime> {
        self.scenarios
            .active_config()
            .map(|config| config.available_crimes_for(suspect, &self.facts))
            .unwrap_or_default()
    }

    /// Check the active scenario's own unlock gate. False when none is loaded.
    pub fn is_scenario_unlocked(&self) -> bool {
        self.scenarios
            .active_config()
            .is_some_and(|config| config.is_unlocked(&self.facts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_rules::Condition;

    #[test]
    fn test_scenario_swap_preserves_facts() {
        let mut session = GameSession::new();
        session.load_scenario(ScenarioConfig::new("tutorial"));
        session.facts.set_flag("phoneTextRead", true);
        session.facts.increment_counter("whiskersCheeseCount", 3);
        let before = session.facts.clone();

        session.load_scenario(ScenarioConfig::new("introduction_city_murder"));

        assert_eq!(session.facts, before);
        assert_eq!(session.active_config().unwrap().id, "introduction_city_murder");
    }

    #[test]
    fn test_crimes_without_scenario() {
        let session = GameSession::new();
        assert!(session.available_crimes_for(&ActorId::from("cop2")).is_empty());
        assert!(!session.is_scenario_unlocked());
    }

    #[test]
    fn test_crimes_recomputed_each_call() {
        let mut session = GameSession::new();
        session.load_scenario(
            ScenarioConfig::new("introduction_city_murder")
                .with_suspect("rockerMouse")
                .with_crime(Crime {
                    id: "murder_city_main".to_string(),
                    label: "City Murder".to_string(),
                    suspect_id: ActorId::from("rockerMouse"),
                    unlock_when: Condition::flag("bodyInspected_city"),
                }),
        );
        let rocker = ActorId::from("rockerMouse");

        assert!(session.available_crimes_for(&rocker).is_empty());
        session.facts.set_flag("bodyInspected_city", true);
        assert_eq!(session.available_crimes_for(&rocker).len(), 1);
        session.facts.set_flag("bodyInspected_city", false);
        assert!(session.available_crimes_for(&rocker).is_empty());
    }

    #[test]
    fn test_resume_with_facts() {
        let mut facts = FactStore::new();
        facts.set_flag("tutorial_completed", true);

        let mut session = GameSession::with_facts(facts);
        session.load_scenario(
            ScenarioConfig::new("introduction_city_murder")
                .with_unlock_when(Condition::flag("tutorial_completed")),
        );

        assert!(session.is_scenario_unlocked());
    }
}
