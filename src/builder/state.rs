//! Fluent builder for state tree definitions.

use crate::builder::error::BuildError;
use crate::builder::validation::validate_tree;
use crate::core::{
    ActionHandler, Context, Listener, NodeDefinition, StateError, StateNode, UnhandledHandler,
};
use crate::manager::{StateManager, ENTER_EVENT, EXIT_EVENT};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Definition of a state and, recursively, its children.
///
/// The builder used as the argument to [`StateBuilder::build`] describes the
/// synthetic root; its children are the top-level states.
///
/// # Example
///
/// ```rust
/// use statetree::builder::StateBuilder;
///
/// let root = StateBuilder::new()
///     .child(
///         "loaded",
///         StateBuilder::new()
///             .initial_state("empty")
///             .child("empty", StateBuilder::new())
///             .child("full", StateBuilder::new()),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(root.child("loaded").unwrap().initial_state(), "empty");
/// ```
#[derive(Clone, Default)]
pub struct StateBuilder {
    pub(crate) children: Vec<(String, StateBuilder)>,
    pub(crate) initial_state: Option<String>,
    pub(crate) requires_context: bool,
    pub(crate) actions: HashMap<String, ActionHandler>,
    pub(crate) unhandled: Option<UnhandledHandler>,
    pub(crate) listeners: Vec<(String, Listener)>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child state. A child with the same name is replaced.
    pub fn child(mut self, name: impl Into<String>, state: StateBuilder) -> Self {
        let name = name.into();
        match self.children.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = state,
            None => self.children.push((name, state)),
        }
        self
    }

    /// Child entered when this state is the target of a transition.
    /// Defaults to `start`.
    pub fn initial_state(mut self, name: impl Into<String>) -> Self {
        self.initial_state = Some(name.into());
        self
    }

    /// Mark the state as consuming one context when entered.
    pub fn requires_context(mut self) -> Self {
        self.requires_context = true;
        self
    }

    /// Register the action run when `event` is sent while this state or one
    /// of its descendants is active.
    pub fn action<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut StateManager, &[Context]) -> Result<Option<Context>, StateError>
            + Send
            + Sync
            + 'static,
    {
        self.actions.insert(event.into(), Arc::new(handler));
        self
    }

    /// Register the fallback run for events no action handles.
    pub fn unhandled_event<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut StateManager, &str, &[Context]) -> Result<Option<Context>, StateError>
            + Send
            + Sync
            + 'static,
    {
        self.unhandled = Some(Arc::new(handler));
        self
    }

    /// Register a listener for `event`.
    pub fn on<F>(mut self, event: impl Into<String>, listener: F) -> Self
    where
        F: Fn(&mut StateManager, &[Context]) -> Result<(), StateError> + Send + Sync + 'static,
    {
        self.listeners.push((event.into(), Arc::new(listener)));
        self
    }

    pub fn on_enter<F>(self, listener: F) -> Self
    where
        F: Fn(&mut StateManager, &[Context]) -> Result<(), StateError> + Send + Sync + 'static,
    {
        self.on(ENTER_EVENT, listener)
    }

    pub fn on_exit<F>(self, listener: F) -> Self
    where
        F: Fn(&mut StateManager, &[Context]) -> Result<(), StateError> + Send + Sync + 'static,
    {
        self.on(EXIT_EVENT, listener)
    }

    /// Compose another definition fragment into this one.
    ///
    /// Children, actions, the initial state and the unhandled-event handler
    /// from `other` take precedence. Listeners from both are kept, this
    /// builder's first. The state requires a context if either does.
    pub fn merge(mut self, other: StateBuilder) -> Self {
        for (name, child) in other.children {
            self = self.child(name, child);
        }
        if other.initial_state.is_some() {
            self.initial_state = other.initial_state;
        }
        self.requires_context |= other.requires_context;
        self.actions.extend(other.actions);
        if other.unhandled.is_some() {
            self.unhandled = other.unhandled;
        }
        self.listeners.extend(other.listeners);
        self
    }

    /// Check the whole definition, accumulating every problem found.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<BuildError>> {
        validate_tree(self)
    }

    /// Validate the definition and build the tree, returning its root.
    pub fn build(self) -> Result<Arc<StateNode>, StateError> {
        match self.validate() {
            Validation::Success(()) => Ok(StateNode::build_tree(self.into_definition())),
            Validation::Failure(errors) => Err(StateError::InvalidDefinition(
                errors.iter().cloned().collect(),
            )),
        }
    }

    pub(crate) fn into_definition(self) -> NodeDefinition {
        NodeDefinition {
            requires_context: self.requires_context,
            initial_state: self.initial_state,
            actions: self.actions,
            unhandled: self.unhandled,
            listeners: self.listeners,
            children: self
                .children
                .into_iter()
                .map(|(name, child)| (name, child.into_definition()))
                .collect(),
        }
    }
}

impl fmt::Debug for StateBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<&str> = self.children.iter().map(|(name, _)| name.as_str()).collect();
        let actions: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        f.debug_struct("StateBuilder")
            .field("children", &children)
            .field("initial_state", &self.initial_state)
            .field("requires_context", &self.requires_context)
            .field("actions", &actions)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
