//! Transition history tracking.
//!
//! Keeps an ordered journal of the paths a manager moved between.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single completed transition.
///
/// # Example
///
/// ```rust
/// use statetree::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: Some("poweredDown".to_string()),
///     to: "poweredUp.mobile".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to, "poweredUp.mobile");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Path active before the transition; `None` for the first one
    pub from: Option<String>,
    /// Path active after the transition
    pub to: String,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of transitions.
///
/// `record` consumes the history and returns the extended one.
///
/// # Example
///
/// ```rust
/// use statetree::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: None,
///         to: "start".to_string(),
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: Some("start".to_string()),
///         to: "loaded".to_string(),
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.get_path(), vec!["start", "loaded"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Append a transition, returning the extended history.
    pub fn record(mut self, transition: StateTransition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Keep only the `limit` most recent transitions.
    pub fn retain_last(mut self, limit: usize) -> Self {
        let excess = self.transitions.len().saturating_sub(limit);
        self.transitions.drain(..excess);
        self
    }

    /// Paths visited, in order: the starting path (if there was one), then
    /// the target of each transition.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(from) = self.transitions.first().and_then(|t| t.from.as_deref()) {
            path.push(from);
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
