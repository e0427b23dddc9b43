//! Event dispatch: actions bubble from the active state up to the root.

use crate::core::{Context, StateError, StateNode};
use crate::manager::machine::StateManager;
use std::iter;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// `state` followed by each of its ancestors, ending at the root.
fn lineage(state: &Arc<StateNode>) -> impl Iterator<Item = Arc<StateNode>> {
    iter::successors(Some(Arc::clone(state)), |state| state.parent())
}

impl StateManager {
    /// Send an event to the active state.
    ///
    /// The action named `event` is looked up on the active state and then on
    /// each ancestor; the first one found runs with this manager and
    /// `contexts`, and its result is returned. Sibling branches are never
    /// searched. When no state in the chain handles the event, the same walk
    /// looks for an unhandled-event handler, which receives the event name.
    /// Failing that, the call fails with [`StateError::UnhandledEvent`] unless
    /// `error_on_unhandled_event` is disabled, in which case it returns
    /// `Ok(None)`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statetree::builder::{transition_to, StateBuilder};
    /// use statetree::manager::StateManager;
    ///
    /// let mut robot = StateManager::builder()
    ///     .initial_state("poweredDown.charging")
    ///     .states(
    ///         StateBuilder::new()
    ///             .child(
    ///                 "poweredDown",
    ///                 StateBuilder::new()
    ///                     .child(
    ///                         "charging",
    ///                         StateBuilder::new().action("chargeComplete", transition_to("charged")),
    ///                     )
    ///                     .child(
    ///                         "charged",
    ///                         StateBuilder::new().action("boot", transition_to("poweredUp")),
    ///                     ),
    ///             )
    ///             .child("poweredUp", StateBuilder::new()),
    ///     )
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(robot.send("boot", &[]).is_err());
    /// assert_eq!(robot.current_path(), Some("poweredDown.charging"));
    ///
    /// robot.send("chargeComplete", &[]).unwrap();
    /// robot.send("boot", &[]).unwrap();
    /// assert_eq!(robot.current_path(), Some("poweredUp"));
    /// ```
    pub fn send(&mut self, event: &str, contexts: &[Context]) -> Result<Option<Context>, StateError> {
        let current = self
            .current_state()
            .cloned()
            .ok_or_else(|| StateError::NoCurrentState {
                event: event.to_string(),
            })?;

        let action = lineage(&current).find_map(|state| state.action(event).map(|a| (state, a)));
        if let Some((owner, action)) = action {
            self.log_dispatch(event, &owner, false);
            return action(self, contexts);
        }

        let fallback =
            lineage(&current).find_map(|state| state.unhandled_handler().map(|h| (state, h)));
        if let Some((owner, handler)) = fallback {
            self.log_dispatch(event, &owner, true);
            return handler(self, event, contexts);
        }

        if self.config().error_on_unhandled_event {
            return Err(StateError::UnhandledEvent {
                event: event.to_string(),
                path: current.path().to_string(),
            });
        }

        warn!(
            manager = %self.id(),
            event,
            state = current.path(),
            "ignoring unhandled event"
        );
        Ok(None)
    }

    fn log_dispatch(&self, event: &str, state: &StateNode, unhandled: bool) {
        match (self.logging_enabled(), unhandled) {
            (true, false) => info!(
                manager = %self.id(),
                "STATEMANAGER: Sending event '{event}' to state {}",
                state.path()
            ),
            (true, true) => info!(
                manager = %self.id(),
                "STATEMANAGER: Unhandled event '{event}' being sent to state {}",
                state.path()
            ),
            (false, _) => debug!(
                manager = %self.id(),
                event,
                state = state.path(),
                unhandled,
                "dispatching event"
            ),
        }
    }
}
