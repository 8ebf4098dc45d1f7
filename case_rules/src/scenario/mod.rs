//! Scenario configuration - the swappable rule set for one chapter of a case.

mod catalog;
mod loader;
mod scripts;

pub use catalog::*;
pub use loader::*;
pub use scripts::*;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::condition::Condition;
use crate::facts::FactStore;
use crate::spatial::ActorId;

/// Identifier of a usable item, e.g. `"blueCheese"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remaining state of an item after a use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Full,
    Half,
    /// Terminal: the item is used up.
    Empty,
}

/// A counter bump applied by an event rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDelta {
    pub id: String,
    pub by: i64,
}

/// Declarative mapping from an item use to flag and counter effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRule {
    pub when_item: ItemId,

    /// Flags to set to true.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_flags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_counters: Vec<CounterDelta>,

    /// Actor that must be in the witness set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_witness: Option<ActorId>,

    /// Extra guard, evaluated against the facts as they were before the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
}

impl EventRule {
    /// Create a rule triggered by an item with no effects yet.
    pub fn on_item(item: impl Into<String>) -> Self {
        Self {
            when_item: ItemId::new(item),
            set_flags: Vec::new(),
            add_counters: Vec::new(),
            require_witness: None,
            when: None,
        }
    }

    /// Add a flag to set.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.set_flags.push(flag.into());
        self
    }

    /// Add a counter bump.
    pub fn with_counter(mut self, id: impl Into<String>, by: i64) -> Self {
        self.add_counters.push(CounterDelta { id: id.into(), by });
        self
    }

    /// Require an actor to witness the event.
    pub fn with_witness(mut self, actor: impl Into<String>) -> Self {
        self.require_witness = Some(ActorId::new(actor));
        self
    }

    /// Set the guard condition.
    pub fn with_guard(mut self, condition: Condition) -> Self {
        self.when = Some(condition);
        self
    }

    /// Check if the rule has anything to apply.
    pub fn has_effects(&self) -> bool {
        !self.set_flags.is_empty() || !self.add_counters.is_empty()
    }

    /// Check the item, witness and guard requirements.
    pub fn applies(&self, item: &ItemId, witnesses: &HashSet<ActorId>, facts: &FactStore) -> bool {
        if &self.when_item != item {
            return false;
        }
        if let Some(required) = &self.require_witness {
            if !witnesses.contains(required) {
                return false;
            }
        }
        self.when.as_ref().map_or(true, |guard| guard.evaluate(facts))
    }
}

/// An accusation option, visible while its condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crime {
    pub id: String,
    pub label: String,
    pub suspect_id: ActorId,
    pub unlock_when: Condition,
}

impl Crime {
    /// Check if the crime is currently available.
    pub fn is_unlocked(&self, facts: &FactStore) -> bool {
        self.unlock_when.evaluate(facts)
    }
}

/// A terminal condition that ends the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailState {
    pub id: String,
    #[serde(default = "default_fail_message")]
    pub message: String,
    pub when: Condition,
}

fn default_fail_message() -> String {
    "Game Over".to_string()
}

impl FailState {
    /// Build the signal emitted when this fail state fires.
    pub fn signal(&self) -> TerminationSignal {
        TerminationSignal {
            fail_state_id: self.id.clone(),
            message: self.message.clone(),
        }
    }
}

/// Emitted once per scenario instance when a fail state fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationSignal {
    pub fail_state_id: String,
    pub message: String,
}

/// The complete rule set for one chapter.
///
/// Immutable while active. `suspects` is descriptive metadata used by
/// validation only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub id: String,

    #[serde(default)]
    pub suspects: Vec<ActorId>,

    #[serde(default)]
    pub event_rules: Vec<EventRule>,

    #[serde(default)]
    pub crimes: Vec<Crime>,

    #[serde(default)]
    pub fail_states: Vec<FailState>,

    /// Gate for the scenario itself. None = always unlocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_when: Option<Condition>,

    /// Item -> depletion flag, for items not following `<item>Depleted`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub depletion_flags: HashMap<ItemId, String>,

    /// Witness barks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<Reaction>,

    /// Scripted triggers run before the event rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub escalations: Vec<ProximityEscalation>,

    /// Flag pairs kept consistent after the event rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repairs: Vec<FlagRepair>,
}

impl ScenarioConfig {
    /// Create an empty scenario.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            suspects: Vec::new(),
            event_rules: Vec::new(),
            crimes: Vec::new(),
            fail_states: Vec::new(),
            unlock_when: None,
            depletion_flags: HashMap::new(),
            reactions: Vec::new(),
            escalations: Vec::new(),
            repairs: Vec::new(),
        }
    }

    pub fn with_suspect(mut self, suspect: impl Into<String>) -> Self {
        self.suspects.push(ActorId::new(suspect));
        self
    }

    pub fn with_rule(mut self, rule: EventRule) -> Self {
        self.event_rules.push(rule);
        self
    }

    pub fn with_crime(mut self, crime: Crime) -> Self {
        self.crimes.push(crime);
        self
    }

    pub fn with_fail_state(mut self, fail_state: FailState) -> Self {
        self.fail_states.push(fail_state);
        self
    }

    pub fn with_unlock_when(mut self, condition: Condition) -> Self {
        self.unlock_when = Some(condition);
        self
    }

    pub fn with_depletion_flag(mut self, item: impl Into<String>, flag: impl Into<String>) -> Self {
        self.depletion_flags.insert(ItemId::new(item), flag.into());
        self
    }

    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reactions.push(reaction);
        self
    }

    pub fn with_escalation(mut self, escalation: ProximityEscalation) -> Self {
        self.escalations.push(escalation);
        self
    }

    pub fn with_repair(mut self, repair: FlagRepair) -> Self {
        self.repairs.push(repair);
        self
    }

    /// Name of the flag set when `item` is used up.
    pub fn depletion_flag(&self, item: &ItemId, suffix: &str) -> String {
        self.depletion_flags
            .get(item)
            .cloned()
            .unwrap_or_else(|| format!("{}{}", item, suffix))
    }

    /// Check if a crime id belongs to this scenario.
    pub fn has_crime(&self, crime_id: &str) -> bool {
        self.crimes.iter().any(|crime| crime.id == crime_id)
    }

    /// Get the crimes against `suspect` whose conditions currently hold.
    pub fn available_crimes_for(&self, suspect: &ActorId, facts: &FactStore) -> Vec<&Crime> {
        self.crimes
            .iter()
            .filter(|crime| &crime.suspect_id == suspect && crime.is_unlocked(facts))
            .collect()
    }

    /// Get the first fail state whose condition holds, in list order.
    pub fn first_failed(&self, facts: &FactStore) -> Option<&FailState> {
        self.fail_states.iter().find(|fail| fail.when.evaluate(facts))
    }

    /// Check the scenario-level gate.
    pub fn is_unlocked(&self, facts: &FactStore) -> bool {
        self.unlock_when
            .as_ref()
            .map_or(true, |condition| condition.evaluate(facts))
    }

    /// Get the barks of witnesses reacting to an item.
    pub fn reactions_for<'a>(
        &'a self,
        item: &'a ItemId,
        witnesses: &'a HashSet<ActorId>,
    ) -> impl Iterator<Item = &'a Reaction> + 'a {
        self.reactions
            .iter()
            .filter(move |reaction| &reaction.item == item && witnesses.contains(&reaction.actor))
    }
}
