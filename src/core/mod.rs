//! Core data model of the engine.
//!
//! This module holds the graph a machine runs on:
//! - `Identifier` naming the entity a machine drives
//! - `State` and `StateKind`, with optional entry/exit callbacks
//! - `StateMatcher` for exact and wildcard transition endpoints
//! - `Transition` and the `Graph` that orders them
//! - the resolver that lists candidate transitions for a selector
//! - immutable transition history
//!
//! Nothing here touches storage; guards and actions are only referenced.

mod graph;
mod history;
mod identifier;
mod matcher;
mod resolver;
mod state;
mod transition;

pub use graph::Graph;
pub use history::{StateHistory, TransitionRecord};
pub use identifier::Identifier;
pub use matcher::StateMatcher;
pub use resolver::{resolve, Candidate, Selector};
pub use state::{State, StateCallback, StateKind};
pub use transition::{default_transition_name, Transition};
