//! Transition planning.
//!
//! Pivot resolution produces a [`ResolvedPath`]: the raw lists of states to
//! exit and enter around a common ancestor. A [`TransitionPlan`] normalizes
//! those lists for one concrete `transition_to` call. Everything here is pure:
//! no callbacks run and no manager state changes.

use crate::core::state::StateNode;
use crate::core::{Context, StateError};
use std::sync::Arc;

/// Raw exit/enter lists computed for a (current state, path) pair.
///
/// Both lists are ordered outermost first. `resolve_state` is the pivot: the
/// deepest ancestor shared by the old and new location.
#[derive(Clone, Debug)]
pub struct ResolvedPath {
    pub exit_states: Vec<Arc<StateNode>>,
    pub enter_states: Vec<Arc<StateNode>>,
    pub resolve_state: Arc<StateNode>,
}

impl ResolvedPath {
    /// Move states that appear at the head of both lists into the pivot.
    pub(crate) fn strip_common_prefix(&mut self) {
        while leading_states_match(&self.enter_states, &self.exit_states) {
            self.resolve_state = self.enter_states.remove(0);
            self.exit_states.remove(0);
        }
    }
}

fn leading_states_match(enter: &[Arc<StateNode>], exit: &[Arc<StateNode>]) -> bool {
    match (enter.first(), exit.first()) {
        (Some(entering), Some(exiting)) => Arc::ptr_eq(entering, exiting),
        _ => false,
    }
}

/// Normalized plan for a single transition.
///
/// `exit_states` run leaf to root (reverse order), `enter_states` run root to
/// leaf. When contexts were supplied, `contexts` is aligned positionally with
/// `enter_states`; `None` inside it marks a state entered without a context.
#[derive(Clone, Debug)]
pub struct TransitionPlan {
    pub exit_states: Vec<Arc<StateNode>>,
    pub enter_states: Vec<Arc<StateNode>>,
    pub resolve_state: Arc<StateNode>,
    pub contexts: Option<Vec<Option<Context>>>,
    pub final_state: Arc<StateNode>,
}

impl TransitionPlan {
    /// Start a plan from raw resolution inputs.
    pub fn new(raw: ResolvedPath) -> Self {
        let final_state = raw
            .enter_states
            .last()
            .cloned()
            .unwrap_or_else(|| Arc::clone(&raw.resolve_state));

        Self {
            exit_states: raw.exit_states,
            enter_states: raw.enter_states,
            resolve_state: raw.resolve_state,
            contexts: None,
            final_state,
        }
    }

    /// Apply context matching, initial-state descent and the unchanged-state
    /// trim, in that order.
    ///
    /// `entered_with` reports the context a state currently holds for the
    /// driving manager; it decides whether a shared leading state really
    /// changes.
    pub fn normalize<F>(
        mut self,
        path: &str,
        contexts: &[Context],
        entered_with: F,
    ) -> Result<Self, StateError>
    where
        F: Fn(&StateNode) -> Option<Context>,
    {
        if !contexts.is_empty() {
            self.match_contexts(path, contexts)?;
        }
        self.add_initial_states();
        self.remove_unchanged_states(entered_with);
        Ok(self)
    }

    /// Context to hand to the entered state at `index`, if any.
    pub fn context_for(&self, index: usize) -> Option<&Context> {
        self.contexts
            .as_ref()
            .and_then(|contexts| contexts.get(index))
            .and_then(Option::as_ref)
    }

    /// Assign contexts to enter states from the leaf backwards, widening the
    /// plan to ancestors while contexts remain.
    fn match_contexts(&mut self, path: &str, contexts: &[Context]) -> Result<(), StateError> {
        let mut remaining: Vec<Context> = contexts.to_vec();
        let mut matched: Vec<Option<Context>> = Vec::new();
        let mut unvisited = self.enter_states.len();

        while !remaining.is_empty() {
            let state = if unvisited > 0 {
                unvisited -= 1;
                Arc::clone(&self.enter_states[unvisited])
            } else {
                let state = match self.enter_states.first() {
                    Some(outermost) => {
                        outermost.parent().ok_or_else(|| StateError::ContextOverflow {
                            path: path.to_string(),
                            supplied: contexts.len(),
                            unmatched: remaining.len(),
                        })?
                    }
                    // Re-entering the current state: the pivot is that state.
                    None => Arc::clone(&self.resolve_state),
                };
                self.enter_states.insert(0, Arc::clone(&state));
                self.exit_states.insert(0, Arc::clone(&state));
                state
            };

            let context = if state.requires_context() {
                remaining.pop()
            } else {
                None
            };
            matched.push(context);
        }

        matched.extend(std::iter::repeat_with(|| None).take(unvisited));
        matched.reverse();
        self.contexts = Some(matched);
        Ok(())
    }

    /// Descend through declared (or `start`) initial states to a leaf.
    fn add_initial_states(&mut self) {
        loop {
            let next = self
                .final_state
                .child(self.final_state.initial_state())
                .cloned();
            let Some(next) = next else {
                break;
            };

            self.enter_states.push(Arc::clone(&next));
            if let Some(contexts) = self.contexts.as_mut() {
                contexts.push(None);
            }
            self.final_state = next;
        }
    }

    /// Drop leading states that would be exited and immediately re-entered
    /// without their context changing.
    fn remove_unchanged_states<F>(&mut self, entered_with: F)
    where
        F: Fn(&StateNode) -> Option<Context>,
    {
        while leading_states_match(&self.enter_states, &self.exit_states) {
            let changed = match self.contexts.as_ref().and_then(|c| c.first()) {
                Some(Some(context)) => {
                    entered_with(&self.enter_states[0]).as_ref() != Some(context)
                }
                _ => false,
            };
            if changed {
                break;
            }

            self.resolve_state = self.enter_states.remove(0);
            self.exit_states.remove(0);
            if let Some(contexts) = self.contexts.as_mut() {
                contexts.remove(0);
            }
        }
    }
}
