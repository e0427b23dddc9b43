//! State manager that resolves paths and executes transitions.

use crate::builder::StateManagerBuilder;
use crate::core::{
    Context, NodeId, ResolvedPath, StateError, StateHistory, StateNode, StateTransition,
    TransitionPlan,
};
use crate::manager::config::ManagerConfig;
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace};
use uuid::Uuid;

/// Event notified on each state as it is entered.
pub const ENTER_EVENT: &str = "enter";

/// Event notified on each state as it is exited.
pub const EXIT_EVENT: &str = "exit";

/// Identity of a manager, used to key per-node path caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ManagerId(Uuid);

impl ManagerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Tracks the single active state of a state tree and moves between states
/// by path.
///
/// # Example
///
/// ```rust
/// use statetree::builder::StateBuilder;
/// use statetree::manager::StateManager;
///
/// let mut robot = StateManager::builder()
///     .initial_state("poweredDown")
///     .states(
///         StateBuilder::new()
///             .child(
///                 "poweredDown",
///                 StateBuilder::new()
///                     .child("charging", StateBuilder::new())
///                     .child("charged", StateBuilder::new()),
///             )
///             .child(
///                 "poweredUp",
///                 StateBuilder::new()
///                     .child("mobile", StateBuilder::new())
///                     .child("stationary", StateBuilder::new()),
///             ),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(robot.current_path(), Some("poweredDown"));
///
/// robot.transition_to("poweredUp", &[]).unwrap();
/// robot.transition_to("mobile", &[]).unwrap();
/// assert_eq!(robot.current_path(), Some("poweredUp.mobile"));
///
/// robot.transition_to("poweredDown.charging", &[]).unwrap();
/// assert_eq!(robot.current_path(), Some("poweredDown.charging"));
/// ```
pub struct StateManager {
    id: ManagerId,
    root: Arc<StateNode>,
    current_state: Option<Arc<StateNode>>,
    config: ManagerConfig,
    contexts: HashMap<NodeId, Context>,
    history: StateHistory,
}

impl StateManager {
    /// Create a manager over `root` and enter its initial state.
    ///
    /// The initial state is `config.initial_state` when set, otherwise the
    /// root's own initial state (`start` unless declared) if that child
    /// exists. Failing to enter it is
    /// reported as [`StateError::InitialStateUnresolved`].
    pub fn new(root: Arc<StateNode>, config: ManagerConfig) -> Result<Self, StateError> {
        let mut manager = Self::detached(root, config);
        manager.enter_initial_state()?;
        Ok(manager)
    }

    pub fn builder() -> StateManagerBuilder {
        StateManagerBuilder::new()
    }

    /// Create a manager without entering any state.
    pub(crate) fn detached(root: Arc<StateNode>, config: ManagerConfig) -> Self {
        Self {
            id: ManagerId::new(),
            root,
            current_state: None,
            config,
            contexts: HashMap::new(),
            history: StateHistory::new(),
        }
    }

    fn enter_initial_state(&mut self) -> Result<(), StateError> {
        let initial = match &self.config.initial_state {
            Some(path) => Some(path.clone()),
            None => {
                let name = self.root.initial_state();
                self.root.child(name).map(|_| name.to_string())
            }
        };
        let Some(path) = initial else {
            return Ok(());
        };

        self.transition_to(&path, &[])
            .map_err(|source| StateError::InitialStateUnresolved {
                path: path.clone(),
                source: Box::new(source),
            })?;

        if self.current_state.is_none() {
            return Err(StateError::InitialStateUnresolved {
                source: Box::new(StateError::UnknownPath { path: path.clone() }),
                path,
            });
        }
        Ok(())
    }

    pub fn id(&self) -> ManagerId {
        self.id
    }

    pub fn root(&self) -> &Arc<StateNode> {
        &self.root
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The active state; `None` until the first successful transition.
    pub fn current_state(&self) -> Option<&Arc<StateNode>> {
        self.current_state.as_ref()
    }

    /// Dotted path of the active state.
    pub fn current_path(&self) -> Option<&str> {
        self.current_state.as_deref().map(StateNode::path)
    }

    pub fn is_active(&self) -> bool {
        self.current_state.is_some()
    }

    /// Context `state` was entered with by this manager, if it is still active.
    pub fn context_of(&self, state: &StateNode) -> Option<&Context> {
        self.contexts.get(&state.id())
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub(crate) fn restore_history(&mut self, history: StateHistory) {
        self.history = history;
    }

    /// Look up a state by absolute path.
    pub fn state_by_path(&self, path: &str) -> Option<Arc<StateNode>> {
        self.root.descendant(path)
    }

    /// Look up `path` below `from`, then below each of its ancestors in turn.
    pub fn find_state_by_path(&self, from: &Arc<StateNode>, path: &str) -> Option<Arc<StateNode>> {
        let mut state = Some(Arc::clone(from));
        while let Some(candidate) = state {
            if let Some(found) = candidate.descendant(path) {
                return Some(found);
            }
            state = candidate.parent();
        }
        None
    }

    /// Transition to the state at `path`, relative to the active state or
    /// any of its ancestors.
    ///
    /// Exits run leaf to root, enters root to leaf, then the active state is
    /// updated and the configured transition event is broadcast to every
    /// entered state. An empty path is a no-op. An unresolvable path leaves
    /// the active state untouched and fails with [`StateError::UnknownPath`].
    ///
    /// Listeners may call back into the manager; a nested transition runs to
    /// completion before the outer one resumes.
    pub fn transition_to(&mut self, path: &str, contexts: &[Context]) -> Result<(), StateError> {
        if path.is_empty() {
            return Ok(());
        }

        let current = self
            .current_state
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.root));
        let resolved = self.resolve_path(&current, path)?;
        let plan = TransitionPlan::new(resolved).normalize(path, contexts, |state| {
            self.contexts.get(&state.id()).cloned()
        })?;

        let from = self.current_path().map(str::to_string);
        self.enter_state(&plan)?;
        if !plan.exit_states.is_empty() || !plan.enter_states.is_empty() {
            self.record_transition(from, &plan);
        }
        self.trigger_transition_event(&plan)
    }

    /// Find the pivot between `current` and `path`, searching `current`
    /// first and then each ancestor up to the root.
    fn resolve_path(
        &self,
        current: &Arc<StateNode>,
        path: &str,
    ) -> Result<ResolvedPath, StateError> {
        if let Some(cached) = current.cached_path(self.id, path) {
            trace!(manager = %self.id, from = current.path(), path, "using cached resolution");
            return Ok(cached);
        }

        let mut exit_states: Vec<Arc<StateNode>> = Vec::new();
        let mut resolve_state = Arc::clone(current);
        let enter_states = loop {
            if let Some(states) = resolve_state.states_in_path(path) {
                break states;
            }
            exit_states.insert(0, Arc::clone(&resolve_state));
            // The walk ends at the root, which has already been searched.
            resolve_state = resolve_state.parent().ok_or_else(|| StateError::UnknownPath {
                path: path.to_string(),
            })?;
        };

        let mut resolved = ResolvedPath {
            exit_states,
            enter_states,
            resolve_state,
        };
        resolved.strip_common_prefix();
        trace!(
            manager = %self.id,
            from = current.path(),
            path,
            pivot = resolved.resolve_state.path(),
            "resolved transition path"
        );

        current.cache_path(self.id, path, &resolved);
        Ok(resolved)
    }

    fn enter_state(&mut self, plan: &TransitionPlan) -> Result<(), StateError> {
        for state in plan.exit_states.iter().rev() {
            self.log_state("Exiting", state);
            state.notify(EXIT_EVENT, self, &[])?;
            self.contexts.remove(&state.id());
        }

        for (index, state) in plan.enter_states.iter().enumerate() {
            self.log_state("Entering", state);
            match plan.context_for(index) {
                Some(context) => self.contexts.insert(state.id(), context.clone()),
                None => self.contexts.remove(&state.id()),
            };
            state.notify(ENTER_EVENT, self, &[])?;
        }

        self.current_state = Some(Arc::clone(&plan.final_state));
        Ok(())
    }

    fn trigger_transition_event(&mut self, plan: &TransitionPlan) -> Result<(), StateError> {
        let event = self.config.transition_event.clone();
        for (index, state) in plan.enter_states.iter().enumerate() {
            let args: Vec<Context> = plan.context_for(index).cloned().into_iter().collect();
            state.notify(&event, self, &args)?;
        }
        Ok(())
    }

    fn record_transition(&mut self, from: Option<String>, plan: &TransitionPlan) {
        let to = plan.final_state.path().to_string();
        debug!(
            manager = %self.id,
            from = from.as_deref().unwrap_or(""),
            to = to.as_str(),
            exited = plan.exit_states.len(),
            entered = plan.enter_states.len(),
            "transition complete"
        );

        let history = std::mem::take(&mut self.history).record(StateTransition {
            from,
            to,
            timestamp: Utc::now(),
        });
        self.history = match self.config.history_limit {
            Some(limit) => history.retain_last(limit),
            None => history,
        };
    }

    fn log_state(&self, action: &str, state: &StateNode) {
        if self.config.enable_logging {
            info!(manager = %self.id, state = state.path(), "STATEMANAGER: {action} {}", state.path());
        } else {
            trace!(manager = %self.id, state = state.path(), "{action} state");
        }
    }

    pub(crate) fn logging_enabled(&self) -> bool {
        self.config.enable_logging
    }
}

impl Drop for StateManager {
    fn drop(&mut self) {
        self.root.forget_manager(self.id);
    }
}

impl fmt::Debug for StateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateManager")
            .field("id", &self.id)
            .field("current_path", &self.current_path())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
