//! Condition language - tagged predicates evaluated against the fact store.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::facts::FactStore;

/// A predicate over flags and counters.
///
/// Conditions are authored as static scenario content and never built into
/// cyclic graphs, so plain recursive evaluation is enough. In TOML or JSON
/// they are tagged on `kind`:
///
/// ```toml
/// when = { kind = "all", of = [
///     { kind = "flag", id = "cheeseMarkedIllegal" },
///     { kind = "counter_at_least", id = "whiskersCheeseCount", count = 2 },
/// ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// True when the flag equals `value`. Without a value, true when the flag is set.
    Flag {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<bool>,
    },

    /// True when the counter is at least `count`.
    CounterAtLeast { id: String, count: i64 },

    /// True when every child is true. Empty is true.
    All {
        #[serde(default)]
        of: Vec<Condition>,
    },

    /// True when at least one child is true. Empty is false.
    Any {
        #[serde(default)]
        of: Vec<Condition>,
    },

    /// A `kind` this build does not recognise. Always false.
    #[serde(other)]
    Unknown,
}

impl Condition {
    /// Create a condition that checks a flag is set.
    pub fn flag(id: impl Into<String>) -> Self {
        Condition::Flag {
            id: id.into(),
            value: None,
        }
    }

    /// Create a condition that checks a flag has an exact value.
    pub fn flag_is(id: impl Into<String>, value: bool) -> Self {
        Condition::Flag {
            id: id.into(),
            value: Some(value),
        }
    }

    /// Create a counter threshold condition.
    pub fn counter_at_least(id: impl Into<String>, count: i64) -> Self {
        Condition::CounterAtLeast {
            id: id.into(),
            count,
        }
    }

    /// Create a conjunction.
    pub fn all(of: impl IntoIterator<Item = Condition>) -> Self {
        Condition::All {
            of: of.into_iter().collect(),
        }
    }

    /// Create a disjunction.
    pub fn any(of: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Any {
            of: of.into_iter().collect(),
        }
    }

    /// Evaluate the condition against the current facts.
    ///
    /// Never fails and never mutates. `all` and `any` stop at the first
    /// child that decides the result.
    pub fn evaluate(&self, facts: &FactStore) -> bool {
        match self {
            Condition::Flag { id, value } => {
                let current = facts.get_flag(id);
                match value {
                    Some(expected) => current == *expected,
                    None => current,
                }
            }
            Condition::CounterAtLeast { id, count } => facts.get_counter(id) >= *count,
            Condition::All { of } => of.iter().all(|child| child.evaluate(facts)),
            Condition::Any { of } => of.iter().any(|child| child.evaluate(facts)),
            Condition::Unknown => {
                tracing::debug!("unrecognised condition kind evaluated as false");
                false
            }
        }
    }

    /// Check whether an unrecognised tag appears anywhere in the tree.
    pub fn contains_unknown(&self) -> bool {
        match self {
            Condition::Unknown => true,
            Condition::All { of } | Condition::Any { of } => {
                of.iter().any(Condition::contains_unknown)
            }
            _ => false,
        }
    }

    fn is_group(&self) -> bool {
        matches!(self, Condition::All { of } | Condition::Any { of } if of.len() > 1)
    }
}

/// Evaluate `condition` against `facts`.
pub fn evaluate(condition: &Condition, facts: &FactStore) -> bool {
    condition.evaluate(facts)
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Flag { id, value } => write!(f, "{}={}", id, value.unwrap_or(true)),
            Condition::CounterAtLeast { id, count } => write!(f, "{}>={}", id, count),
            Condition::All { of } if of.is_empty() => f.write_str("true"),
            Condition::Any { of } if of.is_empty() => f.write_str("false"),
            Condition::All { of } => write_joined(f, of, " & "),
            Condition::Any { of } => write_joined(f, of, " | "),
            Condition::Unknown => f.write_str("?"),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    children: &[Condition],
    separator: &str,
) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        if child.is_group() {
            write!(f, "({})", child)?;
        } else {
            write!(f, "{}", child)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts_with(flags: &[(&str, bool)], counters: &[(&str, i64)]) -> FactStore {
        let mut facts = FactStore::new();
        for (id, value) in flags {
            facts.set_flag(*id, *value);
        }
        for (id, by) in counters {
            facts.increment_counter(*id, *by);
        }
        facts
    }

    #[test]
    fn test_empty_groups() {
        let facts = FactStore::new();
        assert!(Condition::all([]).evaluate(&facts));
        assert!(!Condition::any([]).evaluate(&facts));
    }

    #[test]
    fn test_flag_default_is_truthy_check() {
        let mut facts = FactStore::new();
        let cond = Condition::flag("usedCoke");
        assert!(!cond.evaluate(&facts));

        facts.set_flag("usedCoke", true);
        assert!(cond.evaluate(&facts));
    }

    #[test]
    fn test_flag_explicit_value() {
        let facts = facts_with(&[("phoneTextRead", true)], &[]);

        assert!(Condition::flag_is("phoneTextRead", true).evaluate(&facts));
        assert!(!Condition::flag_is("phoneTextRead", false).evaluate(&facts));
        // Absent flags read as false
        assert!(Condition::flag_is("neverSeen", false).evaluate(&facts));
    }

    #[test]
    fn test_counter_at_least() {
        let facts = facts_with(&[], &[("whiskersCheeseCount", 2)]);

        assert!(Condition::counter_at_least("whiskersCheeseCount", 2).evaluate(&facts));
        assert!(!Condition::counter_at_least("whiskersCheeseCount", 3).evaluate(&facts));
        assert!(Condition::counter_at_least("missing", 0).evaluate(&facts));
        assert!(!Condition::counter_at_least("missing", 1).evaluate(&facts));
    }

    #[test]
    fn test_groups_match_boolean_operators() {
        let cases = [(false, false), (false, true), (true, false), (true, true)];
        for (a, b) in cases {
            let facts = facts_with(&[("a", a), ("b", b)], &[]);
            let pair = [Condition::flag("a"), Condition::flag("b")];

            assert_eq!(Condition::all(pair.clone()).evaluate(&facts), a && b);
            assert_eq!(Condition::any(pair).evaluate(&facts), a || b);
        }
    }

    #[test]
    fn test_deep_nesting() {
        let facts = facts_with(&[("leaf", true)], &[]);

        let mut cond = Condition::flag("leaf");
        for depth in 0..64 {
            cond = if depth % 2 == 0 {
                Condition::all([cond])
            } else {
                Condition::any([Condition::flag("missing"), cond])
            };
        }

        assert!(cond.evaluate(&facts));
    }

    #[test]
    fn test_unknown_kind_is_false() {
        let facts = FactStore::new();
        assert!(!Condition::Unknown.evaluate(&facts));
        assert!(!Condition::all([Condition::Unknown]).evaluate(&facts));
        assert!(Condition::any([Condition::Unknown, Condition::all([])]).evaluate(&facts));
    }

    #[test]
    fn test_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            when: Condition,
        }

        let src = r#"
            when = { kind = "all", of = [
                { kind = "flag", id = "cheeseMarkedIllegal", value = true },
                { kind = "counter_at_least", id = "whiskersCheeseCount", count = 2 },
            ] }
        "#;
        let parsed: Wrapper = toml::from_str(src).unwrap();

        assert_eq!(
            parsed.when,
            Condition::all([
                Condition::flag_is("cheeseMarkedIllegal", true),
                Condition::counter_at_least("whiskersCheeseCount", 2),
            ])
        );
    }

    #[test]
    fn test_unrecognised_kind_deserializes_to_unknown() {
        let parsed: Condition =
            serde_json::from_str(r#"{ "kind": "moonPhase", "phase": "full" }"#).unwrap();
        assert_eq!(parsed, Condition::Unknown);

        let nested: Condition = serde_json::from_str(
            r#"{ "kind": "any", "of": [ { "kind": "flag", "id": "x" }, { "kind": "nope" } ] }"#,
        )
        .unwrap();
        assert!(nested.contains_unknown());
    }

    #[test]
    fn test_display() {
        let cond = Condition::all([
            Condition::flag("usedCoke"),
            Condition::any([
                Condition::flag_is("phoneTextRead", false),
                Condition::counter_at_least("calls", 3),
            ]),
        ]);

        assert_eq!(
            cond.to_string(),
            "usedCoke=true & (phoneTextRead=false | calls>=3)"
        );
        assert_eq!(Condition::all([]).to_string(), "true");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_unknown_kind_warns_at_load_not_per_evaluation() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let facts = FactStore::new();
        tracing::subscriber::with_default(subscriber, || {
            for _ in 0..3 {
                assert!(!Condition::Unknown.evaluate(&facts));
            }
            assert!(logs.text().is_empty());

            let src = r#"
                id = "lenient"

                [[event_rules]]
                when_item = "coke"
                set_flags = ["usedCoke"]
                when = { kind = "tarotCard" }
            "#;
            crate::ScenarioConfig::from_toml_str(src).unwrap();
        });

        assert_eq!(logs.text().matches("unrecognised kind").count(), 1);
    }
}
