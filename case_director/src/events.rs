//! Inbound events from the item and interaction subsystem.

use case_rules::{ActorId, ItemId, OutcomeStatus, Point};
use serde::{Deserialize, Serialize};

/// The player used an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUsedEvent {
    pub item_id: ItemId,

    /// Where the item was used. None = no witnesses.
    #[serde(default)]
    pub origin: Option<Point>,

    /// State of the item after the use.
    #[serde(default)]
    pub outcome: Option<OutcomeStatus>,

    /// Who used the item, if known.
    #[serde(default)]
    pub actor: Option<ActorId>,
}

impl ItemUsedEvent {
    /// Create an event for an item with no position or outcome.
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: ItemId::new(item_id),
            origin: None,
            outcome: None,
            actor: None,
        }
    }

    /// Set where the item was used.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.origin = Some(Point::new(x, y));
        self
    }

    /// Set the item's state after the use.
    pub fn with_outcome(mut self, outcome: OutcomeStatus) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Set who used the item.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(ActorId::new(actor));
        self
    }

    /// Check if this use exhausted the item.
    pub fn depletes_item(&self) -> bool {
        self.outcome == Some(OutcomeStatus::Empty)
    }
}
