//! Macros for ergonomic state tree construction.

/// Build a [`StateBuilder`](crate::builder::StateBuilder) from
/// `name => state` pairs.
///
/// Each value is any expression producing a `StateBuilder`, including a
/// nested `state_tree!`. The result is an ordinary builder, so further
/// options can be chained onto it.
///
/// # Example
///
/// ```
/// use statetree::builder::StateBuilder;
/// use statetree::state_tree;
///
/// let root = state_tree! {
///     "poweredDown" => state_tree! {
///         "charging" => StateBuilder::new(),
///         "charged" => StateBuilder::new(),
///     }
///     .initial_state("charging"),
///     "poweredUp" => StateBuilder::new(),
/// }
/// .build()
/// .unwrap();
///
/// assert!(root.descendant("poweredDown.charged").is_some());
/// ```
#[macro_export]
macro_rules! state_tree {
    () => {
        $crate::builder::StateBuilder::new()
    };
    (
        $( $name:expr => $state:expr ),+ $(,)?
    ) => {
        $crate::builder::StateBuilder::new()
            $( .child($name, $state) )+
    };
}

#[cfg(test)]
mod tests {
    use crate::builder::StateBuilder;

    #[test]
    fn state_tree_macro_adds_children() {
        let root = state_tree! {
            "a" => state_tree! {
                "inner" => StateBuilder::new(),
            },
            "b" => StateBuilder::new().requires_context(),
        }
        .build()
        .unwrap();

        assert!(root.descendant("a.inner").is_some());
        assert!(root.child("b").unwrap().requires_context());
        assert_eq!(root.child_states().len(), 2);
    }

    #[test]
    fn state_tree_macro_supports_empty_trees() {
        let root = state_tree! {}.build().unwrap();
        assert!(root.is_leaf());
    }
}
