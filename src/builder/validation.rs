//! Definition checks run before a tree is built.
//!
//! Every check produces a `Validation` and the results are combined with
//! `Validation::all_vec`, so one pass reports every problem in the tree.

use crate::builder::error::BuildError;
use crate::builder::state::StateBuilder;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<BuildError>>;

const ROOT_LABEL: &str = "<root>";

/// Validate `root` and everything below it.
pub(crate) fn validate_tree(root: &StateBuilder) -> Check {
    let mut checks = Vec::new();
    collect_checks(root, "", &mut checks);
    Validation::all_vec(checks).map(|_| ())
}

fn collect_checks(state: &StateBuilder, path: &str, checks: &mut Vec<Check>) {
    checks.push(check_initial_state(state, path));

    for (name, child) in &state.children {
        checks.push(check_name(name, path));
        let child_path = if path.is_empty() {
            name.clone()
        } else {
            format!("{path}.{name}")
        };
        collect_checks(child, &child_path, checks);
    }
}

fn label(path: &str) -> String {
    if path.is_empty() {
        ROOT_LABEL.to_string()
    } else {
        path.to_string()
    }
}

fn check_name(name: &str, parent: &str) -> Check {
    if name.is_empty() {
        Validation::fail(BuildError::EmptyStateName {
            parent: label(parent),
        })
    } else if name.contains('.') {
        Validation::fail(BuildError::InvalidStateName {
            name: name.to_string(),
        })
    } else {
        Validation::success(())
    }
}

/// An explicit initial state must name one of the state's own children.
fn check_initial_state(state: &StateBuilder, path: &str) -> Check {
    match &state.initial_state {
        Some(initial) if !state.children.iter().any(|(name, _)| name == initial) => {
            Validation::fail(BuildError::UnknownInitialState {
                state: label(path),
                initial: initial.clone(),
            })
        }
        _ => Validation::success(()),
    }
}
