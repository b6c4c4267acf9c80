use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

/// A type-erased registry entry that remembers what was stored in it.
///
/// Cloning only bumps the reference count, so an entry can be copied out of
/// the map under the lock and inspected after the lock is released.
#[derive(Clone, Debug)]
pub(crate) struct AnyValue {
    type_id: TypeId,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl AnyValue {
    /// Create a new AnyValue from a value of any type that implements Any, Send, and Sync
    pub(crate) fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// Name of the type the entry was stored as
    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check if the contained value is of type T
    pub(crate) fn is_type<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Get a shared handle to the contained value if it is of type T
    pub(crate) fn downcast_arc<T: Any + Send + Sync>(self) -> Option<Arc<T>> {
        self.value.downcast::<T>().ok()
    }
}
