//! State tree nodes.
//!
//! A [`StateNode`] is an addressable point in a hierarchical state tree. The
//! tree is built once from a [`StateBuilder`](crate::builder::StateBuilder)
//! definition and never restructured afterwards: names, parent links and
//! children are fixed, only listeners and the path cache change at runtime.

use crate::core::handler::{ActionHandler, Listener, ListenerId, UnhandledHandler};
use crate::core::plan::ResolvedPath;
use crate::core::{Context, StateError};
use crate::manager::{ManagerId, StateManager};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// Name of the child a state descends into when it declares no initial state.
pub const DEFAULT_INITIAL_STATE: &str = "start";

/// Stable identity of a node, unique for the lifetime of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Flattened definition consumed when building a tree.
pub(crate) struct NodeDefinition {
    pub(crate) requires_context: bool,
    pub(crate) initial_state: Option<String>,
    pub(crate) actions: HashMap<String, ActionHandler>,
    pub(crate) unhandled: Option<UnhandledHandler>,
    pub(crate) listeners: Vec<(String, Listener)>,
    pub(crate) children: Vec<(String, NodeDefinition)>,
}

type CacheKey = (ManagerId, String);

/// Cached resolution holding weak references so that a node's cache never
/// keeps its own tree alive.
struct CachedPath {
    exit_states: Vec<Weak<StateNode>>,
    enter_states: Vec<Weak<StateNode>>,
    resolve_state: Weak<StateNode>,
}

impl CachedPath {
    fn capture(resolved: &ResolvedPath) -> Self {
        Self {
            exit_states: resolved.exit_states.iter().map(Arc::downgrade).collect(),
            enter_states: resolved.enter_states.iter().map(Arc::downgrade).collect(),
            resolve_state: Arc::downgrade(&resolved.resolve_state),
        }
    }

    fn restore(&self) -> Option<ResolvedPath> {
        let upgrade = |nodes: &[Weak<StateNode>]| {
            nodes
                .iter()
                .map(Weak::upgrade)
                .collect::<Option<Vec<_>>>()
        };

        Some(ResolvedPath {
            exit_states: upgrade(&self.exit_states)?,
            enter_states: upgrade(&self.enter_states)?,
            resolve_state: self.resolve_state.upgrade()?,
        })
    }
}

/// A named state in a hierarchical state tree.
///
/// Nodes are shared as `Arc<StateNode>`; a built tree may back any number of
/// [`StateManager`]s at once.
///
/// # Example
///
/// ```rust
/// use statetree::builder::StateBuilder;
///
/// let root = StateBuilder::new()
///     .child(
///         "poweredDown",
///         StateBuilder::new()
///             .child("charging", StateBuilder::new())
///             .child("charged", StateBuilder::new()),
///     )
///     .build()
///     .unwrap();
///
/// let charging = root.descendant("poweredDown.charging").unwrap();
/// assert_eq!(charging.name(), Some("charging"));
/// assert_eq!(charging.path(), "poweredDown.charging");
/// assert!(charging.is_leaf());
/// assert!(!root.child("poweredDown").unwrap().is_leaf());
/// ```
pub struct StateNode {
    id: NodeId,
    name: Option<String>,
    path: String,
    parent: Weak<StateNode>,
    children: HashMap<String, Arc<StateNode>>,
    requires_context: bool,
    initial_state: Option<String>,
    actions: HashMap<String, ActionHandler>,
    unhandled: Option<UnhandledHandler>,
    listeners: RwLock<HashMap<String, Vec<(ListenerId, Listener)>>>,
    path_cache: RwLock<HashMap<CacheKey, CachedPath>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl StateNode {
    /// Build a tree whose synthetic root carries `definition`.
    pub(crate) fn build_tree(definition: NodeDefinition) -> Arc<Self> {
        Self::build(definition, None, String::new(), Weak::new())
    }

    fn build(
        definition: NodeDefinition,
        name: Option<String>,
        path: String,
        parent: Weak<StateNode>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| {
            let children = definition
                .children
                .into_iter()
                .map(|(child_name, child)| {
                    let child_path = if path.is_empty() {
                        child_name.clone()
                    } else {
                        format!("{path}.{child_name}")
                    };
                    let node = Self::build(child, Some(child_name.clone()), child_path, me.clone());
                    (child_name, node)
                })
                .collect();

            let mut listeners: HashMap<String, Vec<(ListenerId, Listener)>> = HashMap::new();
            for (event, listener) in definition.listeners {
                listeners
                    .entry(event)
                    .or_default()
                    .push((ListenerId::next(), listener));
            }

            StateNode {
                id: NodeId::next(),
                name,
                path,
                parent,
                children,
                requires_context: definition.requires_context,
                initial_state: definition.initial_state,
                actions: definition.actions,
                unhandled: definition.unhandled,
                listeners: RwLock::new(listeners),
                path_cache: RwLock::new(HashMap::new()),
            }
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Name of this state in its parent's children; `None` for a tree root.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Dot-joined names from the root to this node. Empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<Arc<StateNode>> {
        self.parent.upgrade()
    }

    pub fn is_root(&self) -> bool {
        self.name.is_none()
    }

    /// Look up an immediate child by name.
    pub fn child(&self, name: &str) -> Option<&Arc<StateNode>> {
        self.children.get(name)
    }

    /// Immediate children, in no particular order.
    pub fn child_states(&self) -> Vec<Arc<StateNode>> {
        self.children.values().cloned().collect()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether entering this state consumes a context value.
    pub fn requires_context(&self) -> bool {
        self.requires_context
    }

    /// Child this state descends into when it becomes a transition target.
    pub fn initial_state(&self) -> &str {
        self.initial_state
            .as_deref()
            .unwrap_or(DEFAULT_INITIAL_STATE)
    }

    /// Follow a dotted path of child names starting below this node.
    pub fn descendant(&self, path: &str) -> Option<Arc<StateNode>> {
        self.states_in_path(path)
            .and_then(|mut states| states.pop())
    }

    /// Every state along `path` below this node, outermost first.
    ///
    /// Returns `None` when the path is empty or any segment is missing.
    pub fn states_in_path(&self, path: &str) -> Option<Vec<Arc<StateNode>>> {
        if path.is_empty() {
            return None;
        }

        let mut states: Vec<Arc<StateNode>> = Vec::new();
        for part in path.split('.') {
            let next = match states.last() {
                Some(state) => state.child(part).cloned(),
                None => self.child(part).cloned(),
            };
            states.push(next?);
        }
        Some(states)
    }

    /// Action registered under `name`, if any.
    pub fn action(&self, name: &str) -> Option<ActionHandler> {
        self.actions.get(name).cloned()
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn unhandled_handler(&self) -> Option<UnhandledHandler> {
        self.unhandled.clone()
    }

    /// Register a listener for `event` (`"enter"`, `"exit"`, the manager's
    /// transition event, or any name passed to [`StateNode::notify`]).
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&mut StateManager, &[Context]) -> Result<(), StateError> + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        write(&self.listeners)
            .entry(event.into())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a previously registered listener. Returns whether it existed.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = write(&self.listeners);
        let mut removed = false;
        for registered in listeners.values_mut() {
            let before = registered.len();
            registered.retain(|(listener_id, _)| *listener_id != id);
            removed |= registered.len() != before;
        }
        listeners.retain(|_, registered| !registered.is_empty());
        removed
    }

    pub fn listener_count(&self, event: &str) -> usize {
        read(&self.listeners).get(event).map_or(0, Vec::len)
    }

    /// Invoke every listener registered for `event`, in registration order.
    ///
    /// Listeners run without any lock held, so they may register listeners
    /// or drive further transitions. The first failing listener stops the
    /// notification and its error is returned.
    pub fn notify(
        &self,
        event: &str,
        manager: &mut StateManager,
        args: &[Context],
    ) -> Result<(), StateError> {
        let listeners: Vec<Listener> = read(&self.listeners)
            .get(event)
            .map(|registered| registered.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        for listener in listeners {
            listener(manager, args)?;
        }
        Ok(())
    }

    pub(crate) fn cached_path(&self, manager: ManagerId, path: &str) -> Option<ResolvedPath> {
        read(&self.path_cache)
            .get(&(manager, path.to_string()))
            .and_then(CachedPath::restore)
    }

    pub(crate) fn cache_path(&self, manager: ManagerId, path: &str, resolved: &ResolvedPath) {
        write(&self.path_cache).insert((manager, path.to_string()), CachedPath::capture(resolved));
    }

    pub fn cached_path_count(&self) -> usize {
        read(&self.path_cache).len()
    }

    /// Drop every cached resolution held in this subtree, for all managers.
    pub fn clear_path_cache(&self) {
        write(&self.path_cache).clear();
        for child in self.children.values() {
            child.clear_path_cache();
        }
    }

    /// Drop cached resolutions made for `manager` in this whole subtree.
    pub(crate) fn forget_manager(&self, manager: ManagerId) {
        write(&self.path_cache).retain(|(owner, _), _| *owner != manager);
        for child in self.children.values() {
            child.forget_manager(manager);
        }
    }
}

impl fmt::Debug for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut children: Vec<&str> = self.children.keys().map(String::as_str).collect();
        children.sort_unstable();

        f.debug_struct("StateNode")
            .field("path", &self.path)
            .field("children", &children)
            .field("requires_context", &self.requires_context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateBuilder;

    fn tree() -> Arc<StateNode> {
        StateBuilder::new()
            .child(
                "first",
                StateBuilder::new()
                    .child("insideFirst", StateBuilder::new())
                    .child(
                        "otherInsideFirst",
                        StateBuilder::new().child("definitelyInside", StateBuilder::new()),
                    ),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn children_point_back_to_their_parent() {
        let root = tree();
        let first = root.child("first").unwrap();
        let inside = first.child("insideFirst").unwrap();

        assert!(Arc::ptr_eq(&inside.parent().unwrap(), first));
        assert!(Arc::ptr_eq(&first.parent().unwrap(), &root));
        assert!(root.parent().is_none());
        assert_eq!(first.child_states().len(), 2);
    }

    #[test]
    fn is_leaf_reflects_children() {
        let root = tree();
        let first = root.child("first").unwrap();

        assert!(!first.is_leaf());
        assert!(first.child("insideFirst").unwrap().is_leaf());
        assert!(!first.child("otherInsideFirst").unwrap().is_leaf());
        assert!(root
            .descendant("first.otherInsideFirst.definitelyInside")
            .unwrap()
            .is_leaf());
    }

    #[test]
    fn paths_are_dot_joined_from_the_root() {
        let root = tree();

        assert_eq!(root.path(), "");
        assert!(root.is_root());
        assert_eq!(
            root.descendant("first.otherInsideFirst.definitelyInside")
                .unwrap()
                .path(),
            "first.otherInsideFirst.definitelyInside"
        );
    }

    #[test]
    fn states_in_path_lists_every_segment() {
        let root = tree();
        let states = root.states_in_path("first.otherInsideFirst").unwrap();
        let names: Vec<_> = states.iter().filter_map(|s| s.name()).collect();

        assert_eq!(names, vec!["first", "otherInsideFirst"]);
        assert!(root.states_in_path("first.missing").is_none());
        assert!(root.states_in_path("").is_none());
        assert!(root.states_in_path("first..insideFirst").is_none());
    }

    #[test]
    fn initial_state_defaults_to_start() {
        let root = StateBuilder::new()
            .child("plain", StateBuilder::new())
            .child(
                "custom",
                StateBuilder::new()
                    .initial_state("begin")
                    .child("begin", StateBuilder::new()),
            )
            .build()
            .unwrap();

        assert_eq!(root.child("plain").unwrap().initial_state(), "start");
        assert_eq!(root.child("custom").unwrap().initial_state(), "begin");
    }

    #[test]
    fn listeners_can_be_removed() {
        let root = tree();
        let id = root.on("enter", |_, _| Ok(()));
        root.on("enter", |_, _| Ok(()));

        assert_eq!(root.listener_count("enter"), 2);
        assert!(root.off(id));
        assert!(!root.off(id));
        assert_eq!(root.listener_count("enter"), 1);
        assert_eq!(root.listener_count("exit"), 0);
    }
}
