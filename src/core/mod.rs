//! Core state tree types and transition planning.
//!
//! This module contains the building blocks the manager drives:
//! - State tree nodes with listeners and per-manager path caches
//! - Pure transition planning (context matching, initial-state descent)
//! - Context values, callback types and the error taxonomy
//! - Immutable transition history

mod context;
mod error;
mod handler;
mod history;
mod plan;
mod state;

pub use context::Context;
pub use error::StateError;
pub use handler::{ActionHandler, Listener, ListenerId, UnhandledHandler};
pub use history::{StateHistory, StateTransition};
pub use plan::{ResolvedPath, TransitionPlan};
pub use state::{NodeId, StateNode, DEFAULT_INITIAL_STATE};

pub(crate) use state::NodeDefinition;
