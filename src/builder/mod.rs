//! Builder API for ergonomic state tree construction.
//!
//! This module provides fluent builders and macros for defining state trees
//! and the managers that drive them. Definitions are validated as a whole
//! before a tree is built.

pub mod error;
pub mod macros;
pub mod manager;
pub mod state;
mod validation;

pub use error::BuildError;
pub use manager::StateManagerBuilder;
pub use state::StateBuilder;

use crate::core::{Context, StateError};
use crate::manager::StateManager;

/// Create an action that transitions to `path`, forwarding the contexts the
/// event was sent with.
///
/// # Example
///
/// ```
/// use statetree::builder::{transition_to, StateBuilder};
/// use statetree::manager::StateManager;
///
/// let mut manager = StateManager::builder()
///     .states(
///         StateBuilder::new()
///             .child("start", StateBuilder::new().action("finish", transition_to("done")))
///             .child("done", StateBuilder::new()),
///     )
///     .build()
///     .unwrap();
///
/// manager.send("finish", &[]).unwrap();
/// assert_eq!(manager.current_path(), Some("done"));
/// ```
pub fn transition_to(
    path: impl Into<String>,
) -> impl Fn(&mut StateManager, &[Context]) -> Result<Option<Context>, StateError> + Send + Sync + 'static
{
    let path = path.into();
    move |manager: &mut StateManager, contexts: &[Context]| {
        manager.transition_to(&path, contexts)?;
        Ok(None)
    }
}
