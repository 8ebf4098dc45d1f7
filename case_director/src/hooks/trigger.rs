//! Pre-rule triggers - scripted checks that run before the event rules.

use case_rules::{find_actor, Actor, ActorId, FactStore, ProximityEscalation};
use serde_json::json;
use std::collections::HashSet;

use super::{HookContext, HookRegistry};
use crate::director::EventOutcome;
use crate::events::ItemUsedEvent;

/// Everything a trigger may read or change while an event is processed.
///
/// Fact mutations made through the context are recorded in the event
/// outcome, and hooks are invoked immediately.
pub struct TriggerContext<'a> {
    pub scenario_id: &'a str,
    pub event: &'a ItemUsedEvent,
    pub witnesses: &'a HashSet<ActorId>,
    pub roster: &'a [Actor],
    facts: &'a mut FactStore,
    hooks: &'a HookRegistry,
    outcome: &'a mut EventOutcome,
}

impl<'a> TriggerContext<'a> {
    pub(crate) fn new(
        scenario_id: &'a str,
        event: &'a ItemUsedEvent,
        witnesses: &'a HashSet<ActorId>,
        roster: &'a [Actor],
        facts: &'a mut FactStore,
        hooks: &'a HookRegistry,
        outcome: &'a mut EventOutcome,
    ) -> Self {
        Self {
            scenario_id,
            event,
            witnesses,
            roster,
            facts,
            hooks,
            outcome,
        }
    }

    /// Read the current facts, including changes made earlier in this event.
    pub fn facts(&self) -> &FactStore {
        self.facts
    }

    /// Set a flag unless it is already set. Returns whether it was newly set.
    pub fn set_flag_once(&mut self, id: &str) -> bool {
        let newly_set = self.facts.set_flag_once(id);
        if newly_set {
            tracing::debug!(flag = %id, "flag set");
            self.outcome.flags_set.push(id.to_string());
        }
        newly_set
    }

    /// Bump a counter and return its new value.
    pub fn increment_counter(&mut self, id: &str, by: i64) -> i64 {
        let value = self.facts.increment_counter(id, by);
        tracing::debug!(counter = %id, by, value, "counter incremented");
        self.outcome.counters_changed.push((id.to_string(), value));
        value
    }

    /// Invoke a reaction hook, fire-and-forget.
    pub fn invoke_hook(&mut self, hook_id: &str, details: serde_json::Value) {
        let context = HookContext {
            hook_id: hook_id.to_string(),
            scenario_id: self.scenario_id.to_string(),
            item_id: self.event.item_id.clone(),
            origin: self.event.origin,
            actor: self.event.actor.clone(),
            details,
        };
        self.hooks.invoke(&context);
        self.outcome.hooks_invoked.push(hook_id.to_string());
    }

    pub(crate) fn record_rule(&mut self, index: usize) {
        self.outcome.rules_fired.push(index);
    }
}

/// Scenario-specific behaviour run before the generic event rules.
pub trait PreRuleHook: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    fn apply(&self, cx: &mut TriggerContext<'_>);
}

impl PreRuleHook for ProximityEscalation {
    fn name(&self) -> &str {
        &self.id
    }

    fn apply(&self, cx: &mut TriggerContext<'_>) {
        if cx.event.item_id != self.item {
            return;
        }
        if self.outcome.is_some() && cx.event.outcome != self.outcome {
            return;
        }
        let Some(origin) = cx.event.origin else {
            return;
        };
        let Some(actor) = find_actor(cx.roster, &self.actor) else {
            tracing::debug!(
                escalation = %self.id,
                actor = %self.actor,
                "escalation actor not on roster"
            );
            return;
        };

        let distance = actor.position.distance_to(origin);
        if distance > self.within {
            tracing::debug!(escalation = %self.id, distance, "too far for escalation");
            return;
        }
        if let Some(cooldown) = &self.cooldown_flag {
            if cx.facts().get_flag(cooldown) {
                return;
            }
        }

        let count = cx.increment_counter(&self.counter, 1);
        if count < self.threshold || !cx.set_flag_once(&self.triggered_flag) {
            return;
        }

        tracing::info!(escalation = %self.id, actor = %self.actor, count, "escalation triggered");
        for flag in &self.set_flags {
            cx.set_flag_once(flag);
        }
        if let Some(cooldown) = &self.cooldown_flag {
            cx.set_flag_once(cooldown);
        }
        if let Some(hook) = &self.hook {
            cx.invoke_hook(
                hook,
                json!({
                    "escalation": self.id,
                    "actor": self.actor,
                    "count": count,
                    "distance": distance,
                }),
            );
        }
    }
}
