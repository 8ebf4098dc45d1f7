//! # Case Rules
//!
//! The "Case Book" crate - contains the condition language, the fact store,
//! the scenario schema and spatial witness detection.
//! This crate is pure data and pure evaluation; it never drives the game loop.

pub mod condition;
pub mod facts;
pub mod scenario;
pub mod spatial;

pub use condition::*;
pub use facts::*;
pub use scenario::*;
pub use spatial::*;
