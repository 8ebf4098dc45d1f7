//! Case Director - applies the active scenario's rules to item-use events.
//!
//! Every event runs through the same pipeline, synchronously and to
//! completion:
//! 1. **Guard**: No active scenario means nothing happens
//! 2. **Witnesses**: Actors whose sensory range covers the event origin, and their barks
//! 3. **Triggers**: Scripted escalations and registered pre-rule plugins
//! 4. **Depletion**: An exhausted item raises its depletion flag once
//! 5. **Rules**: Matching event rules in declaration order, guards read the pre-event facts
//! 6. **Repairs**: Derived flags brought in line with the flags they follow
//! 7. **Fail states**: First holding fail state ends the scenario, once per instance

mod outcome;

pub use outcome::*;

use case_rules::{
    witnesses_of, Actor, ActorId, FlagRepair, Point, TerminationSignal, DEFAULT_SENSORY_RADIUS,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::events::ItemUsedEvent;
use crate::hooks::{HookRegistry, PreRuleHook, TriggerContext};
use crate::session::GameSession;

/// Tuning for the director.
#[derive(Debug, Clone)]
pub struct DirectorConfig {
    /// Sensory radius for actors without their own.
    pub default_sensory_radius: f64,

    /// Appended to an item id to name its depletion flag.
    pub depletion_suffix: String,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            default_sensory_radius: DEFAULT_SENSORY_RADIUS,
            depletion_suffix: "Depleted".to_string(),
        }
    }
}

/// Runs the rule pipeline for a scene.
///
/// The director owns the scene's witness roster, the reaction hook handles
/// and any code plugins; the narrative state itself lives in the
/// [`GameSession`] passed to each call.
pub struct CaseDirector {
    config: DirectorConfig,
    roster: Vec<Actor>,
    hooks: HookRegistry,
    plugins: HashMap<String, Vec<Box<dyn PreRuleHook>>>,
}

impl CaseDirector {
    /// Create a new director with the given configuration.
    pub fn new(config: DirectorConfig) -> Self {
        Self {
            config,
            roster: Vec::new(),
            hooks: HookRegistry::new(),
            plugins: HashMap::new(),
        }
    }

    /// Create a director with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(DirectorConfig::default())
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Replace the witness roster, e.g. when a scene loads.
    pub fn set_roster(&mut self, roster: Vec<Actor>) {
        self.roster = roster;
    }

    pub fn roster(&self) -> &[Actor] {
        &self.roster
    }

    /// Update an actor's position. Returns false if it is not on the roster.
    pub fn move_actor(&mut self, id: &ActorId, position: Point) -> bool {
        match self.roster.iter_mut().find(|actor| &actor.id == id) {
            Some(actor) => {
                actor.position = position;
                true
            }
            None => false,
        }
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    /// Register a code plugin that runs before the event rules while the
    /// scenario with `scenario_id` is active.
    pub fn register_pre_rule_hook(
        &mut self,
        scenario_id: impl Into<String>,
        hook: Box<dyn PreRuleHook>,
    ) {
        self.plugins.entry(scenario_id.into()).or_default().push(hook);
    }

    /// Get the actors who perceive an event at `origin`.
    pub fn witnesses_of(&self, origin: Option<Point>) -> HashSet<ActorId> {
        origin
            .map(|origin| witnesses_of(origin, &self.roster, self.config.default_sensory_radius))
            .unwrap_or_default()
    }

    /// Process one item-use event against the session.
    ///
    /// Never fails: unknown items, an empty rule set or a missing scenario
    /// simply produce an outcome where nothing happened.
    pub fn handle_item_used(
        &self,
        session: &mut GameSession,
        event: &ItemUsedEvent,
    ) -> EventOutcome {
        // Step 1: Guard
        let Some(active) = session.scenarios.active() else {
            tracing::debug!(item = %event.item_id, "no active scenario, item use ignored");
            return EventOutcome::default();
        };
        let config = Arc::clone(active.config());

        let span = tracing::debug_span!(
            "item_used",
            session = %session.id,
            scenario = %config.id,
            item = %event.item_id
        );
        let _enter = span.enter();

        let mut outcome = EventOutcome::for_scenario(&config.id);
        // Rule guards are evaluated against the facts as they were before this event
        let pre_event = session.facts.clone();

        // Step 2: Witnesses
        let witnesses = self.witnesses_of(event.origin);
        tracing::debug!(witnesses = ?witnesses, "witnesses computed");
        outcome.barks = config
            .reactions_for(&event.item_id, &witnesses)
            .map(Bark::from)
            .collect();

        {
            let mut cx = TriggerContext::new(
                &config.id,
                event,
                &witnesses,
                &self.roster,
                &mut session.facts,
                &self.hooks,
                &mut outcome,
            );

            // Step 3: Pre-rule triggers
            for escalation in &config.escalations {
                escalation.apply(&mut cx);
            }
            for plugin in self.plugins.get(&config.id).into_iter().flatten() {
                tracing::debug!(plugin = plugin.name(), "running pre-rule plugin");
                plugin.apply(&mut cx);
            }

            // Step 4: Depletion defaults
            if event.depletes_item() {
                let flag = config.depletion_flag(&event.item_id, &self.config.depletion_suffix);
                cx.set_flag_once(&flag);
            }

            // Step 5: Generic rules
            for (index, rule) in config.event_rules.iter().enumerate() {
                if !rule.applies(&event.item_id, &witnesses, &pre_event) {
                    continue;
                }
                tracing::debug!(rule = index, "event rule applied");
                cx.record_rule(index);
                for flag in &rule.set_flags {
                    cx.set_flag_once(flag);
                }
                for delta in &rule.add_counters {
                    cx.increment_counter(&delta.id, delta.by);
                }
            }

            // Step 6: Consistency repairs
            for repair in &config.repairs {
                apply_repair(repair, &mut cx);
            }
        }
        outcome.witnesses = witnesses;

        // Step 7: Fail states
        outcome.termination = check_fail_states(session);
        outcome
    }
}

fn apply_repair(repair: &FlagRepair, cx: &mut TriggerContext<'_>) {
    if !cx.facts().get_flag(&repair.when_flag) || !cx.set_flag_once(&repair.ensure_flag) {
        return;
    }
    tracing::info!(
        when = %repair.when_flag,
        ensured = %repair.ensure_flag,
        "derived flag repaired"
    );
    if let Some(hook) = &repair.hook {
        cx.invoke_hook(
            hook,
            json!({
                "when_flag": repair.when_flag,
                "ensure_flag": repair.ensure_flag,
            }),
        );
    }
}

fn check_fail_states(session: &mut GameSession) -> Option<TerminationSignal> {
    let active = session.scenarios.active_mut()?;
    if active.is_latched() {
        return None;
    }

    let signal = active.config().first_failed(&session.facts)?.signal();
    tracing::info!(
        fail_state = %signal.fail_state_id,
        instance = %active.instance(),
        "fail state fired"
    );
    active.latch(signal.clone());
    Some(signal)
}

impl std::fmt::Debug for CaseDirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plugins: HashMap<&str, Vec<&str>> = self
            .plugins
            .iter()
            .map(|(scenario, hooks)| {
                (scenario.as_str(), hooks.iter().map(|hook| hook.name()).collect())
            })
            .collect();
        f.debug_struct("CaseDirector")
            .field("config", &self.config)
            .field("roster", &self.roster)
            .field("hooks", &self.hooks)
            .field("plugins", &plugins)
            .finish()
    }
}
