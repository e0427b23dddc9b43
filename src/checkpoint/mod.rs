//! Checkpoint and resume functionality for state managers.
//!
//! A checkpoint captures the active path and transition history of a
//! manager so that it can be rebuilt over the same tree later, for example
//! after a process restart. Listeners, actions and contexts are not captured.

use crate::core::{StateHistory, StateNode};
use crate::manager::{ManagerConfig, StateManager};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Path of the active state, if any
    pub current_path: Option<String>,

    /// Complete transition history
    pub history: StateHistory,
}

impl Checkpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version == CHECKPOINT_VERSION {
            Ok(())
        } else {
            Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            })
        }
    }
}

impl StateManager {
    /// Snapshot the active path and history.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            current_path: self.current_path().map(str::to_string),
            history: self.history().clone(),
        }
    }

    /// Rebuild a manager over `root` from a checkpoint.
    ///
    /// The configured initial state is skipped; the manager transitions
    /// straight to the checkpointed path, running the usual enter and
    /// transition-event listeners, and then takes over the saved history.
    pub fn resume(
        root: Arc<StateNode>,
        config: ManagerConfig,
        checkpoint: &Checkpoint,
    ) -> Result<Self, CheckpointError> {
        checkpoint.check_version()?;

        let mut manager = Self::detached(root, config);
        if let Some(path) = &checkpoint.current_path {
            manager
                .transition_to(path, &[])
                .map_err(|source| CheckpointError::ResumeFailed {
                    path: path.clone(),
                    source,
                })?;
        }
        manager.restore_history(checkpoint.history.clone());

        debug!(
            manager = %manager.id(),
            checkpoint = %checkpoint.id,
            path = checkpoint.current_path.as_deref().unwrap_or(""),
            "resumed from checkpoint"
        );
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateBuilder;

    fn tree() -> Arc<StateNode> {
        StateBuilder::new()
            .child("start", StateBuilder::new())
            .child(
                "loaded",
                StateBuilder::new()
                    .child("empty", StateBuilder::new())
                    .child("full", StateBuilder::new()),
            )
            .build()
            .unwrap()
    }

    fn walked() -> StateManager {
        let mut manager = StateManager::new(tree(), ManagerConfig::default()).unwrap();
        manager.transition_to("loaded.full", &[]).unwrap();
        manager
    }

    #[test]
    fn checkpoint_captures_path_and_history() {
        let checkpoint = walked().checkpoint();

        assert_eq!(checkpoint.version, CHECKPOINT_VERSION);
        assert_eq!(checkpoint.current_path.as_deref(), Some("loaded.full"));
        assert_eq!(checkpoint.history.get_path(), vec!["start", "loaded.full"]);
    }

    #[test]
    fn json_and_binary_preserve_checkpoint() {
        let checkpoint = walked().checkpoint();

        let from_json = Checkpoint::from_json(&checkpoint.to_json().unwrap()).unwrap();
        let from_binary = Checkpoint::from_binary(&checkpoint.to_binary().unwrap()).unwrap();

        assert_eq!(from_json, checkpoint);
        assert_eq!(from_binary, checkpoint);
    }

    #[test]
    fn resume_skips_initial_state_and_keeps_history() {
        let checkpoint = walked().checkpoint();

        let resumed = StateManager::resume(tree(), ManagerConfig::default(), &checkpoint).unwrap();

        assert_eq!(resumed.current_path(), Some("loaded.full"));
        assert_eq!(resumed.history(), &checkpoint.history);
    }

    #[test]
    fn resume_on_incompatible_tree_fails() {
        let checkpoint = walked().checkpoint();
        let other = StateBuilder::new()
            .child("start", StateBuilder::new())
            .build()
            .unwrap();

        let result = StateManager::resume(other, ManagerConfig::default(), &checkpoint);

        assert!(matches!(
            result,
            Err(CheckpointError::ResumeFailed { ref path, .. }) if path == "loaded.full"
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut checkpoint = walked().checkpoint();
        checkpoint.version = CHECKPOINT_VERSION + 1;

        let json = checkpoint.to_json().unwrap();
        assert!(matches!(
            Checkpoint::from_json(&json),
            Err(CheckpointError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }
}
