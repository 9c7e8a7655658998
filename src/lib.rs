//! Switchyard: a finite state machine engine for domain entities
//!
//! Switchyard keeps transition logic apart from the domain objects it
//! governs. A [`Graph`](core::Graph) of states and transitions is defined
//! once; a [`StateMachine`](machine::StateMachine) then drives one entity,
//! named by an [`Identifier`](core::Identifier), through it. The current
//! state lives behind a [`PersistenceAdapter`](persistence::PersistenceAdapter),
//! so the engine itself holds nothing between calls.
//!
//! # Core Concepts
//!
//! - **States and transitions**: exact state names, or wildcard endpoints
//!   written as `regex:/<pattern>/` and `not-regex:/<pattern>/`
//! - **Guards**: side-effect-free predicates gating a transition
//! - **Actions**: side effects run when a transition fires; faults are
//!   wrapped and propagated, never swallowed
//! - **Entity builder**: lazily builds and caches the domain object guards
//!   and actions operate on
//! - **Persistence adapters**: read and write the current state per
//!   identifier
//!
//! Candidate transitions are tried in registration order and the first one
//! whose guard passes wins. A rejected transition is not an error: the
//! orchestration calls return `Ok(false)`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use switchyard::builder::{GraphBuilder, TransitionBuilder};
//! use switchyard::context::Context;
//! use switchyard::core::Identifier;
//! use switchyard::effects::BoxError;
//! use switchyard::machine::StateMachine;
//! use switchyard::persistence::MemoryAdapter;
//!
//! struct Order {
//!     items: usize,
//! }
//!
//! let graph = GraphBuilder::new()
//!     .initial("basket")
//!     .final_state("complete")
//!     .transition(
//!         TransitionBuilder::new()
//!             .from("basket")
//!             .to("complete")
//!             .on("Checkout")
//!             .when(|order: &Order| order.items > 0),
//!     )?
//!     .build()?;
//!
//! let context = Context::new(
//!     Identifier::new("42", "order"),
//!     |_: &Identifier| -> Result<Order, BoxError> { Ok(Order { items: 3 }) },
//!     Arc::new(MemoryAdapter::new()),
//! );
//! let mut machine = StateMachine::new(Arc::new(graph), context);
//!
//! assert!(machine.handle("Checkout")?);
//! assert_eq!(machine.current_state()?, "complete");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod checkpoint;
pub mod context;
pub mod core;
pub mod effects;
pub mod error;
pub mod machine;
pub mod persistence;

// Re-export commonly used types
pub use crate::core::{
    Graph, Identifier, State, StateHistory, StateKind, Transition, TransitionRecord,
};
pub use error::{EngineError, Result};
pub use machine::StateMachine;
