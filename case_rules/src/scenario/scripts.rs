//! Scripted behaviour authored as data: witness barks, proximity
//! escalations and flag repairs.

use serde::{Deserialize, Serialize};

use super::{ItemId, OutcomeStatus};
use crate::spatial::ActorId;

/// A line an actor barks when it witnesses an item being used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub actor: ActorId,
    pub item: ItemId,
    pub line: String,
}

impl Reaction {
    pub fn new(actor: impl Into<String>, item: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            actor: ActorId::new(actor),
            item: ItemId::new(item),
            line: line.into(),
        }
    }
}

/// Repeated use of an item close to one actor, escalating once a
/// threshold is reached.
///
/// Each qualifying use bumps `counter`. The first time the counter reaches
/// `threshold`, `triggered_flag` latches, `set_flags` are raised, the
/// cooldown flag (if any) is set and `hook` is invoked. Uses while the
/// cooldown flag is set are ignored; clearing it is up to the presentation
/// layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityEscalation {
    pub id: String,
    pub item: ItemId,

    /// Required outcome of the use. None = any outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeStatus>,

    pub actor: ActorId,

    /// Maximum distance between the event origin and the actor.
    pub within: f64,

    pub counter: String,
    pub threshold: i64,

    /// One-shot latch; once set the escalation never fires again.
    pub triggered_flag: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_flags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_flag: Option<String>,

    /// Reaction hook invoked when the escalation fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
}

/// Keeps a derived flag consistent with a flag that may be raised through
/// several code paths.
///
/// After the event rules run, if `when_flag` is set but `ensure_flag` is
/// not, `ensure_flag` is set and `hook` is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRepair {
    pub when_flag: String,
    pub ensure_flag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
}
