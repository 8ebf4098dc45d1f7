//! Spatial actors and witness detection.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sensory radius used for actors without their own, in world units.
pub const DEFAULT_SENSORY_RADIUS: f64 = 200.0;

/// Identifier of an actor (NPC) in the scene, e.g. `"cop2"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A point in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An actor that can witness events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub position: Point,
    /// None = use the detector's default radius.
    #[serde(default)]
    pub sensory_radius: Option<f64>,
}

impl Actor {
    /// Create an actor at a position with the default radius.
    pub fn new(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: ActorId::new(id),
            position,
            sensory_radius: None,
        }
    }

    /// Set a custom sensory radius.
    pub fn with_sensory_radius(mut self, radius: f64) -> Self {
        self.sensory_radius = Some(radius);
        self
    }

    /// Check if a point is within this actor's sensory range (inclusive).
    pub fn perceives(&self, origin: Point, default_radius: f64) -> bool {
        let radius = self.sensory_radius.unwrap_or(default_radius);
        self.position.distance_to(origin) <= radius
    }
}

/// Get the ids of every actor whose sensory range covers `origin`.
///
/// Computed fresh on every call; nothing about past proximity is remembered.
pub fn witnesses_of(origin: Point, actors: &[Actor], default_radius: f64) -> HashSet<ActorId> {
    actors
        .iter()
        .filter(|actor| actor.perceives(origin, default_radius))
        .map(|actor| actor.id.clone())
        .collect()
}

/// Find an actor on a roster by id.
pub fn find_actor<'a>(actors: &'a [Actor], id: &ActorId) -> Option<&'a Actor> {
    actors.iter().find(|actor| &actor.id == id)
}
