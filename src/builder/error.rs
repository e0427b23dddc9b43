//! Build errors for state tree definitions.

use thiserror::Error;

/// Problems found while validating a state tree definition.
///
/// Validation accumulates every problem in the tree rather than stopping at
/// the first; see [`StateBuilder::validate`](crate::builder::StateBuilder::validate).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("State under \"{parent}\" has an empty name")]
    EmptyStateName { parent: String },

    #[error("State name \"{name}\" must not contain '.'")]
    InvalidStateName { name: String },

    #[error("Initial state \"{initial}\" of \"{state}\" is not one of its children")]
    UnknownInitialState { state: String, initial: String },
}
