//! Statetree: hierarchical state machines addressed by dotted paths
//!
//! States form a tree. Exactly one state is active per [`StateManager`], and
//! all of its ancestors are implicitly active with it. Transitions name a
//! target path relative to the active state or any of its ancestors; the
//! manager exits and enters only the states between the active state and the
//! target, descends through initial states to a leaf, and routes events from
//! the active state up through its ancestors.
//!
//! The crate separates a pure core from an imperative shell:
//!
//! - [`core`]: tree nodes, transition planning, contexts, errors, history
//! - [`manager`]: the `StateManager` that executes plans and dispatches events
//! - [`builder`]: fluent definitions, validation and the `state_tree!` macro
//! - [`checkpoint`]: capture and resume of a manager's active path
//!
//! # Example
//!
//! ```rust
//! use statetree::builder::{transition_to, StateBuilder};
//! use statetree::{Context, StateManager};
//!
//! let mut blog = StateManager::builder()
//!     .initial_state("index")
//!     .states(
//!         StateBuilder::new()
//!             .child(
//!                 "index",
//!                 StateBuilder::new().action("showPost", transition_to("post")),
//!             )
//!             .child(
//!                 "post",
//!                 StateBuilder::new()
//!                     .requires_context()
//!                     .child("start", StateBuilder::new()),
//!             ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let post = Context::new("hello-world");
//! blog.send("showPost", &[post.clone()]).unwrap();
//!
//! assert_eq!(blog.current_path(), Some("post.start"));
//! let post_state = blog.state_by_path("post").unwrap();
//! assert_eq!(blog.context_of(&post_state), Some(&post));
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod manager;

// Re-export commonly used types
pub use builder::{BuildError, StateBuilder, StateManagerBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use crate::core::{Context, StateError, StateHistory, StateNode, StateTransition};
pub use manager::{ManagerConfig, StateManager};
