//! Fact store - the flags and counters every condition is evaluated against.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Session-wide narrative facts.
///
/// Absent flags read as `false` and absent counters read as `0`. The store
/// outlives scenario swaps: loading a new chapter never clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactStore {
    #[serde(default)]
    flags: HashMap<String, bool>,

    #[serde(default)]
    counters: HashMap<String, i64>,
}

impl FactStore {
    /// Create a new empty fact store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a flag value.
    pub fn get_flag(&self, id: &str) -> bool {
        self.flags.get(id).copied().unwrap_or(false)
    }

    /// Set a flag value.
    pub fn set_flag(&mut self, id: impl Into<String>, value: bool) {
        self.flags.insert(id.into(), value);
    }

    /// Set a flag to `true` unless it already is.
    ///
    /// Returns `true` only when this call changed the flag, so callers can
    /// tie one-shot side effects to the return value.
    pub fn set_flag_once(&mut self, id: &str) -> bool {
        if self.get_flag(id) {
            return false;
        }
        self.flags.insert(id.to_string(), true);
        true
    }

    /// Get a counter value.
    pub fn get_counter(&self, id: &str) -> i64 {
        self.counters.get(id).copied().unwrap_or(0)
    }

    /// Add `by` to a counter (creating it at 0) and return the new value.
    pub fn increment_counter(&mut self, id: impl Into<String>, by: i64) -> i64 {
        let counter = self.counters.entry(id.into()).or_insert(0);
        *counter = counter.saturating_add(by);
        *counter
    }

    /// Iterate over all stored flags.
    pub fn flags(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(id, value)| (id.as_str(), *value))
    }

    /// Iterate over all stored counters.
    pub fn counters(&self) -> impl Iterator<Item = (&str, i64)> {
        self.counters.iter().map(|(id, value)| (id.as_str(), *value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let facts = FactStore::new();
        assert!(!facts.get_flag("anything"));
        assert_eq!(facts.get_counter("anything"), 0);
    }

    #[test]
    fn test_set_flag_is_idempotent() {
        let mut facts = FactStore::new();
        facts.set_flag("other", true);
        facts.increment_counter("tally", 3);

        facts.set_flag("usedCoke", true);
        let snapshot = facts.clone();
        facts.set_flag("usedCoke", true);

        assert!(facts.get_flag("usedCoke"));
        assert_eq!(facts, snapshot);
    }

    #[test]
    fn test_set_flag_once() {
        let mut facts = FactStore::new();

        assert!(facts.set_flag_once("cokeDepleted"));
        assert!(!facts.set_flag_once("cokeDepleted"));
        assert!(facts.get_flag("cokeDepleted"));

        // A flag cleared externally can be newly set again
        facts.set_flag("cokeDepleted", false);
        assert!(facts.set_flag_once("cokeDepleted"));
    }

    #[test]
    fn test_increment_counter_returns_new_value() {
        let mut facts = FactStore::new();
        assert_eq!(facts.increment_counter("whiskersCheeseCount", 1), 1);
        assert_eq!(facts.increment_counter("whiskersCheeseCount", 1), 2);
        assert_eq!(facts.increment_counter("whiskersCheeseCount", -5), -3);
    }

    #[test]
    fn test_increments_are_independent_of_interleaving() {
        let mut first = FactStore::new();
        first.increment_counter("a", 4);
        first.increment_counter("b", 10);
        first.increment_counter("a", 7);

        let mut second = FactStore::new();
        second.increment_counter("a", 7);
        second.increment_counter("a", 4);
        second.increment_counter("b", 10);

        assert_eq!(first.get_counter("a"), 11);
        assert_eq!(first, second);
    }

    #[test]
    fn test_counter_saturates_instead_of_overflowing() {
        let mut facts = FactStore::new();
        facts.increment_counter("huge", i64::MAX);
        assert_eq!(facts.increment_counter("huge", 1), i64::MAX);
    }

    #[test]
    fn test_serde_snapshot() {
        let mut facts = FactStore::new();
        facts.set_flag("phoneTextRead", true);
        facts.increment_counter("tutorial_step", 2);

        let json = serde_json::to_string(&facts).unwrap();
        let restored: FactStore = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, facts);
        assert_eq!(restored.flags().count(), 1);
        assert_eq!(restored.counters().collect::<Vec<_>>(), vec![("tutorial_step", 2)]);
    }
}
