//! Manager configuration.

use serde::{Deserialize, Serialize};

/// Default name of the event broadcast to every newly entered state.
pub const DEFAULT_TRANSITION_EVENT: &str = "setup";

/// Settings controlling how a [`StateManager`](crate::manager::StateManager)
/// starts up, dispatches events and logs.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use statetree::manager::ManagerConfig;
///
/// let config = ManagerConfig::from_json(r#"{ "initial_state": "poweredDown" }"#).unwrap();
/// assert_eq!(config.initial_state.as_deref(), Some("poweredDown"));
/// assert_eq!(config.transition_event, "setup");
/// assert!(config.error_on_unhandled_event);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Path entered on construction. When unset, the root's initial state
    /// (`start` by default) is entered if it exists.
    pub initial_state: Option<String>,

    /// Event broadcast to each entered state after a transition completes.
    pub transition_event: String,

    /// Fail `send` when no state in the active chain handles an event.
    pub error_on_unhandled_event: bool,

    /// Emit enter/send messages at `info` level instead of `trace`.
    pub enable_logging: bool,

    /// Maximum number of transitions kept in the history.
    pub history_limit: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            initial_state: None,
            transition_event: DEFAULT_TRANSITION_EVENT.to_string(),
            error_on_unhandled_event: true,
            enable_logging: false,
            history_limit: None,
        }
    }
}

impl ManagerConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
