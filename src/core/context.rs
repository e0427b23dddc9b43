//! Opaque context values carried into states on entry.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A value associated with a state when it is entered.
///
/// Contexts are type-erased and cheap to clone. Two contexts are equal when
/// they share the same allocation, so re-entering a state with a clone of the
/// context it already holds counts as "unchanged", while a freshly created
/// context (even one holding an equal value) counts as a change.
///
/// # Example
///
/// ```rust
/// use statetree::core::Context;
///
/// let post = Context::new(42u32);
/// let same = post.clone();
/// let other = Context::new(42u32);
///
/// assert_eq!(post, same);
/// assert_ne!(post, other);
/// assert_eq!(post.downcast_ref::<u32>(), Some(&42));
/// ```
#[derive(Clone)]
pub struct Context(Arc<dyn Any + Send + Sync>);

impl Context {
    /// Wrap a value as a context.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the wrapped value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Check whether the wrapped value has type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Post {
        id: u64,
    }

    #[test]
    fn clones_compare_equal() {
        let context = Context::new(Post { id: 1 });
        assert_eq!(context, context.clone());
    }

    #[test]
    fn equal_values_in_distinct_contexts_differ() {
        let first = Context::new(Post { id: 1 });
        let second = Context::new(Post { id: 1 });
        assert_ne!(first, second);
    }

    #[test]
    fn downcast_recovers_value() {
        let context = Context::new(Post { id: 7 });

        assert!(context.is::<Post>());
        assert_eq!(context.downcast_ref::<Post>(), Some(&Post { id: 7 }));
        assert!(context.downcast_ref::<String>().is_none());
    }
}
