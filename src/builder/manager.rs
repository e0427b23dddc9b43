//! Builder for constructing state managers.

use crate::builder::state::StateBuilder;
use crate::core::{StateError, StateNode};
use crate::manager::{ManagerConfig, StateManager};
use std::sync::Arc;

enum TreeSource {
    Definition(StateBuilder),
    Built(Arc<StateNode>),
}

/// Builder for constructing a [`StateManager`] with a fluent API.
///
/// Either a definition ([`states`](Self::states)) or an already built tree
/// ([`tree`](Self::tree)) is required; a tree may be shared between managers.
///
/// # Example
///
/// ```rust
/// use statetree::builder::StateBuilder;
/// use statetree::manager::StateManager;
///
/// let tree = StateBuilder::new()
///     .child("start", StateBuilder::new())
///     .child("other", StateBuilder::new())
///     .build()
///     .unwrap();
///
/// let first = StateManager::builder().tree(tree.clone()).build().unwrap();
/// let second = StateManager::builder()
///     .tree(tree)
///     .initial_state("other")
///     .build()
///     .unwrap();
///
/// assert_eq!(first.current_path(), Some("start"));
/// assert_eq!(second.current_path(), Some("other"));
/// ```
#[derive(Default)]
pub struct StateManagerBuilder {
    source: Option<TreeSource>,
    config: ManagerConfig,
}

impl StateManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tree from `definition` when the manager is built.
    pub fn states(mut self, definition: StateBuilder) -> Self {
        self.source = Some(TreeSource::Definition(definition));
        self
    }

    /// Drive an existing tree.
    pub fn tree(mut self, root: Arc<StateNode>) -> Self {
        self.source = Some(TreeSource::Built(root));
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn initial_state(mut self, path: impl Into<String>) -> Self {
        self.config.initial_state = Some(path.into());
        self
    }

    pub fn transition_event(mut self, event: impl Into<String>) -> Self {
        self.config.transition_event = event.into();
        self
    }

    pub fn error_on_unhandled_event(mut self, enabled: bool) -> Self {
        self.config.error_on_unhandled_event = enabled;
        self
    }

    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = Some(limit);
        self
    }

    /// Build the manager and enter its initial state.
    ///
    /// Without a definition or tree the manager drives an empty root.
    pub fn build(self) -> Result<StateManager, StateError> {
        let root = match self.source {
            Some(TreeSource::Definition(definition)) => definition.build()?,
            Some(TreeSource::Built(root)) => root,
            None => StateBuilder::new().build()?,
        };
        StateManager::new(root, self.config)
    }
}
