//! The imperative shell around the state tree.
//!
//! A [`StateManager`] owns the active-state pointer for one tree, runs
//! enter/exit/setup listeners in order as it moves between states, and routes
//! events from the active state up through its ancestors.
//!
//! Everything runs synchronously on the caller's thread. Listeners and
//! actions receive `&mut StateManager` and may transition or send events
//! reentrantly; nested calls complete before the outer call resumes.

mod config;
mod dispatch;
mod machine;

pub use config::{ManagerConfig, DEFAULT_TRANSITION_EVENT};
pub use machine::{ManagerId, StateManager, ENTER_EVENT, EXIT_EVENT};
