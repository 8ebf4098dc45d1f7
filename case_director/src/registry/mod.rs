//! Scenario registry - the single active rule set and its fail-state latch.

use case_rules::{ScenarioConfig, TerminationSignal};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Identifies one load of a scenario into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioInstanceId(pub Uuid);

impl ScenarioInstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScenarioInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScenarioInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The loaded scenario plus the state owned by this load.
#[derive(Debug, Clone)]
pub struct ActiveScenario {
    instance: ScenarioInstanceId,
    config: Arc<ScenarioConfig>,
    fired: Option<TerminationSignal>,
}

impl ActiveScenario {
    pub fn instance(&self) -> ScenarioInstanceId {
        self.instance
    }

    pub fn config(&self) -> &Arc<ScenarioConfig> {
        &self.config
    }

    /// The signal this instance terminated with, if any.
    pub fn termination(&self) -> Option<&TerminationSignal> {
        self.fired.as_ref()
    }

    /// Check if a fail state has already fired for this instance.
    pub fn is_latched(&self) -> bool {
        self.fired.is_some()
    }

    pub(crate) fn latch(&mut self, signal: TerminationSignal) {
        self.fired = Some(signal);
    }
}

/// Holds at most one active scenario.
#[derive(Debug, Clone, Default)]
pub struct ScenarioRegistry {
    active: Option<ActiveScenario>,
}

impl ScenarioRegistry {
    /// Create a new registry with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active scenario.
    ///
    /// Unconditional: the previous rule set and its latch are dropped
    /// wholesale. Facts are untouched.
    pub fn load_scenario(&mut self, config: impl Into<Arc<ScenarioConfig>>) -> ScenarioInstanceId {
        let config = config.into();
        let instance = ScenarioInstanceId::new();

        match self.active_config() {
            Some(previous) => tracing::info!(
                from = %previous.id,
                to = %config.id,
                instance = %instance,
                "switching scenario"
            ),
            None => tracing::info!(to = %config.id, instance = %instance, "loading scenario"),
        }

        self.active = Some(ActiveScenario {
            instance,
            config,
            fired: None,
        });
        instance
    }

    /// Unload the active scenario, returning its configuration.
    pub fn clear(&mut self) -> Option<Arc<ScenarioConfig>> {
        let previous = self.active.take()?;
        tracing::info!(scenario = %previous.config.id, "scenario unloaded");
        Some(previous.config)
    }

    /// Get the active configuration.
    pub fn active_config(&self) -> Option<&ScenarioConfig> {
        self.active.as_ref().map(|active| active.config.as_ref())
    }

    /// Get the active scenario.
    pub fn active(&self) -> Option<&ActiveScenario> {
        self.active.as_ref()
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut ActiveScenario> {
        self.active.as_mut()
    }

    /// Check if a crime belongs to the active scenario.
    pub fn is_tracked(&self, crime_id: &str) -> bool {
        self.active_config()
            .is_some_and(|config| config.has_crime(crime_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_rules::{ActorId, Condition, Crime};

    fn tutorial() -> ScenarioConfig {
        ScenarioConfig::new("tutorial").with_suspect("cop2").with_crime(Crime {
            id: "violence".to_string(),
            label: "Assault".to_string(),
            suspect_id: ActorId::from("cop2"),
            unlock_when: Condition::counter_at_least("whiskersCheeseCount", 2),
        })
    }

    #[test]
    fn test_empty_registry() {
        let registry = ScenarioRegistry::new();
        assert!(registry.active_config().is_none());
        assert!(!registry.is_tracked("violence"));
    }

    #[test]
    fn test_load_replaces_wholesale() {
        let mut registry = ScenarioRegistry::new();
        registry.load_scenario(tutorial());
        assert!(registry.is_tracked("violence"));

        registry.load_scenario(ScenarioConfig::new("introduction_city_murder"));
        assert_eq!(registry.active_config().unwrap().id, "introduction_city_murder");
        assert!(!registry.is_tracked("violence"));
    }

    #[test]
    fn test_reload_starts_new_instance_with_clear_latch() {
        let config = Arc::new(tutorial());
        let mut registry = ScenarioRegistry::new();

        let first = registry.load_scenario(Arc::clone(&config));
        registry.active_mut().unwrap().latch(TerminationSignal {
            fail_state_id: "fired".to_string(),
            message: "You're fired".to_string(),
        });
        assert!(registry.active().unwrap().is_latched());

        let second = registry.load_scenario(config);
        assert_ne!(first, second);
        assert!(!registry.active().unwrap().is_latched());
        assert!(registry.active().unwrap().termination().is_none());
    }

    #[test]
    fn test_clear() {
        let mut registry = ScenarioRegistry::new();
        assert!(registry.clear().is_none());

        registry.load_scenario(tutorial());
        assert_eq!(registry.clear().unwrap().id, "tutorial");
        assert!(registry.active().is_none());
    }
}
