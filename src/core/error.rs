//! Errors raised while transitioning between states and dispatching events.

use crate::builder::BuildError;
use thiserror::Error;

/// Errors that can occur when driving a state manager.
///
/// All failures are local and synchronous: they are returned to the caller
/// of `transition_to`/`send` and never retried internally.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Could not find state for path: \"{path}\"")]
    UnknownPath { path: String },

    #[error("Cannot match all contexts to states for path \"{path}\" ({unmatched} of {supplied} left over)")]
    ContextOverflow {
        path: String,
        supplied: usize,
        unmatched: usize,
    },

    #[error("Cannot send event \"{event}\" while no state is active")]
    NoCurrentState { event: String },

    #[error("Could not respond to event {event} in state {path}")]
    UnhandledEvent { event: String, path: String },

    #[error("Failed to transition to initial state \"{path}\"")]
    InitialStateUnresolved {
        path: String,
        source: Box<StateError>,
    },

    #[error("Invalid state definition: {}", join_errors(.0))]
    InvalidDefinition(Vec<BuildError>),

    #[error("Handler failed: {0}")]
    Handler(String),
}

impl StateError {
    /// Build a handler failure from any displayable reason.
    pub fn handler(reason: impl std::fmt::Display) -> Self {
        Self::Handler(reason.to_string())
    }
}

fn join_errors(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn unknown_path_names_the_path() {
        let err = StateError::UnknownPath {
            path: "nonexistentState".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Could not find state for path: \"nonexistentState\""
        );
    }

    #[test]
    fn initial_state_failure_keeps_its_cause() {
        let err = StateError::InitialStateUnresolved {
            path: "foo".to_string(),
            source: Box::new(StateError::UnknownPath {
                path: "foo".to_string(),
            }),
        };

        let cause = err.source().map(ToString::to_string);
        assert_eq!(
            cause.as_deref(),
            Some("Could not find state for path: \"foo\"")
        );
    }

    #[test]
    fn invalid_definition_lists_every_problem() {
        let err = StateError::InvalidDefinition(vec![
            BuildError::EmptyStateName {
                parent: "root".to_string(),
            },
            BuildError::InvalidStateName {
                name: "a.b".to_string(),
            },
        ]);

        let message = err.to_string();
        assert!(message.contains("root"));
        assert!(message.contains("a.b"));
    }
}
