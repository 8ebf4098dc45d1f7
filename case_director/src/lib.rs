//! # Case Director
//!
//! The rule engine of the investigation game. This crate consumes item-use
//! events, applies the active scenario's rules from `case_rules` to the
//! session's facts, and reports when a scenario has failed.
//!
//! ## Core Components
//!
//! - **events**: Inbound item-use events
//! - **session**: The game session context (facts + scenario registry)
//! - **registry**: Holds the single active scenario and its fail-state latch
//! - **hooks**: Scripted reaction hooks and pre-rule triggers
//! - **director**: The rule application pipeline
//!
//! ## Design Philosophy
//!
//! - **Content is data**: Scenarios are authored configuration; the engine knows no game content
//! - **Event-Driven**: The director reacts to events, it does not run the game loop
//! - **Never fatal**: Missing scenarios, unknown items and failing hooks degrade to
//!   "nothing happens"

pub mod director;
pub mod events;
pub mod hooks;
pub mod registry;
pub mod session;

pub use director::*;
pub use events::*;
pub use hooks::*;
pub use registry::*;
pub use session::*;
