//! Callback types attached to states.

use crate::core::{Context, StateError};
use crate::manager::StateManager;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Listener notified when a state is entered, exited, set up, or triggered
/// with a named event. Receives the manager driving the notification.
pub type Listener =
    Arc<dyn Fn(&mut StateManager, &[Context]) -> Result<(), StateError> + Send + Sync>;

/// Named action invoked by `StateManager::send`.
pub type ActionHandler = Arc<
    dyn Fn(&mut StateManager, &[Context]) -> Result<Option<Context>, StateError> + Send + Sync,
>;

/// Fallback invoked with the original event name when no action in the
/// active state's ancestor chain handles an event.
pub type UnhandledHandler = Arc<
    dyn Fn(&mut StateManager, &str, &[Context]) -> Result<Option<Context>, StateError>
        + Send
        + Sync,
>;

/// Handle returned when a listener is registered, used to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_ids_are_unique() {
        let first = ListenerId::next();
        let second = ListenerId::next();
        assert_ne!(first, second);
    }
}
