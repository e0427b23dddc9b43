//! Tests for state nodes: tree structure, listeners and transition actions.

use statetree::builder::{transition_to, StateBuilder};
use statetree::manager::StateManager;
use statetree::{Context, StateNode};
use std::sync::{Arc, Mutex};

fn nested() -> Arc<StateNode> {
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
        .child("second", StateBuilder::new())
        .build()
        .unwrap()
}

#[test]
fn children_know_their_parent() {
    let root = nested();
    let first = root.child("first").unwrap();

    for child in first.child_states() {
        assert!(Arc::ptr_eq(&child.parent().unwrap(), first));
    }
    assert_eq!(root.child_states().len(), 2);
}

#[test]
fn manager_reports_dotted_paths() {
    let mut manager = StateManager::builder().tree(nested()).build().unwrap();

    manager.transition_to("first", &[]).unwrap();
    assert_eq!(manager.current_path(), Some("first"));

    manager.transition_to("first.insideFirst", &[]).unwrap();
    assert_eq!(manager.current_path(), Some("first.insideFirst"));

    manager.transition_to("otherInsideFirst.definitelyInside", &[]).unwrap();
    assert_eq!(
        manager.current_path(),
        Some("first.otherInsideFirst.definitelyInside")
    );
}

#[test]
fn leaf_flags_follow_children() {
    let root = nested();

    assert!(!root.descendant("first").unwrap().is_leaf());
    assert!(root.descendant("first.insideFirst").unwrap().is_leaf());
    assert!(!root.descendant("first.otherInsideFirst").unwrap().is_leaf());
    assert!(root
        .descendant("first.otherInsideFirst.definitelyInside")
        .unwrap()
        .is_leaf());
}

#[test]
fn find_state_by_path_walks_up_from_a_state() {
    let manager = StateManager::builder().tree(nested()).build().unwrap();
    let deep = manager
        .state_by_path("first.otherInsideFirst.definitelyInside")
        .unwrap();

    let found = manager.find_state_by_path(&deep, "insideFirst").unwrap();
    assert_eq!(found.path(), "first.insideFirst");

    let found = manager.find_state_by_path(&deep, "second").unwrap();
    assert_eq!(found.path(), "second");
}

#[test]
fn listeners_added_after_build_fire_and_can_be_removed() {
    let root = nested();
    let second = Arc::clone(root.child("second").unwrap());
    let seen = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&seen);
    let id = second.on("enter", move |_, _| {
        *counter.lock().unwrap() += 1;
        Ok(())
    });
    let mut manager = StateManager::builder().tree(root).build().unwrap();

    manager.transition_to("second", &[]).unwrap();
    assert_eq!(*seen.lock().unwrap(), 1);

    assert!(second.off(id));
    manager.transition_to("first", &[]).unwrap();
    manager.transition_to("second", &[]).unwrap();
    assert_eq!(*seen.lock().unwrap(), 1);
}

#[test]
fn clearing_the_path_cache_keeps_transitions_working() {
    let root = nested();
    let mut manager = StateManager::builder().tree(Arc::clone(&root)).build().unwrap();
    manager.transition_to("first", &[]).unwrap();
    manager.transition_to("second", &[]).unwrap();
    let first = root.child("first").unwrap();
    assert_eq!(first.cached_path_count(), 1);

    root.clear_path_cache();
    assert_eq!(first.cached_path_count(), 0);

    manager.transition_to("first", &[]).unwrap();
    manager.transition_to("second", &[]).unwrap();
    assert_eq!(manager.current_path(), Some("second"));
}

mod transition_actions {
    use super::*;

    type Received = Arc<Mutex<Vec<Context>>>;

    fn target(received: &Received) -> StateBuilder {
        let received = Arc::clone(received);
        StateBuilder::new().requires_context().child(
            "detail",
            StateBuilder::new().requires_context().on("setup", move |_, args| {
                received.lock().unwrap().extend(args.iter().cloned());
                Ok(())
            }),
        )
    }

    fn manager(received: &Received) -> StateManager {
        StateManager::builder()
            .initial_state("source")
            .states(
                StateBuilder::new()
                    .child(
                        "source",
                        StateBuilder::new().action("go", transition_to("targetState.detail")),
                    )
                    .child("targetState", target(received)),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn forwards_no_contexts_when_none_are_sent() {
        let received = Received::default();
        let mut manager = manager(&received);

        manager.send("go", &[]).unwrap();

        assert_eq!(manager.current_path(), Some("targetState.detail"));
        assert!(received.lock().unwrap().is_empty());
    }

    #[test]
    fn forwards_multiple_contexts_without_mutating_them() {
        let received = Received::default();
        let mut manager = manager(&received);
        let outer = Context::new("context1");
        let inner = Context::new("context2");
        let sent = vec![outer.clone(), inner.clone()];

        manager.send("go", &sent).unwrap();

        assert_eq!(sent, vec![outer.clone(), inner.clone()]);
        let target = manager.state_by_path("targetState").unwrap();
        assert_eq!(manager.context_of(&target), Some(&outer));
        assert_eq!(*received.lock().unwrap(), vec![inner]);
    }
}
