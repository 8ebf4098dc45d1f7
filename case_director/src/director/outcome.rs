//! Event outcome - what a single pipeline pass did.

use case_rules::{ActorId, Reaction, TerminationSignal};
use serde::Serialize;
use std::collections::HashSet;

/// A witness reaction for the presentation layer to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bark {
    pub actor: ActorId,
    pub line: String,
}

impl From<&Reaction> for Bark {
    fn from(reaction: &Reaction) -> Self {
        Self {
            actor: reaction.actor.clone(),
            line: reaction.line.clone(),
        }
    }
}

/// The result of processing one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventOutcome {
    /// None = no scenario was active and nothing ran.
    pub scenario_id: Option<String>,

    pub witnesses: HashSet<ActorId>,

    pub barks: Vec<Bark>,

    /// Flags newly set during this event, in order.
    pub flags_set: Vec<String>,

    /// Counter id and value after each increment, in order.
    pub counters_changed: Vec<(String, i64)>,

    /// Indexes of the event rules that applied.
    pub rules_fired: Vec<usize>,

    pub hooks_invoked: Vec<String>,

    /// Set at most once per scenario instance.
    pub termination: Option<TerminationSignal>,
}

impl EventOutcome {
    pub(crate) fn for_scenario(scenario_id: &str) -> Self {
        Self {
            scenario_id: Some(scenario_id.to_string()),
            ..Self::default()
        }
    }

    /// Check if the event changed no facts and fired nothing.
    pub fn is_noop(&self) -> bool {
        self.flags_set.is_empty()
            && self.counters_changed.is_empty()
            && self.hooks_invoked.is_empty()
            && self.termination.is_none()
    }

    /// Check if the event ended the scenario.
    pub fn is_terminal(&self) -> bool {
        self.termination.is_some()
    }

    /// Check if a flag was newly set by this event.
    pub fn newly_set(&self, id: &str) -> bool {
        self.flags_set.iter().any(|flag| flag == id)
    }
}
