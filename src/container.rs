use crate::any_value::AnyValue;
use crate::error::{ContainerError, NotFoundReason};
use crate::key::TypeKey;
use parking_lot::Mutex;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A thread-safe registry holding at most one value per [`TypeKey`].
///
/// Values are registered under the key of their own type with [`add`](Self::add),
/// or under the key of a caller-chosen surrogate type with
/// [`add_as`](Self::add_as). Retrieval names the stored type and, for the `_as`
/// variants, the surrogate again; a runtime type test guards every lookup.
///
/// Cloning a `Container` yields a second handle onto the same registry.
///
/// # Examples
///
/// ```
/// use sovran_registry::Container;
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// struct French;
///
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// impl Greeter for French {
///     fn greet(&self) -> String { "bonjour".into() }
/// }
///
/// let c = Container::new();
/// c.add_as::<Arc<dyn Greeter>, English>(Arc::new(English));
/// c.add_as::<Arc<dyn Greeter>, French>(Arc::new(French));
///
/// assert_eq!(c.get_as::<Arc<dyn Greeter>, English>().greet(), "hello");
/// assert_eq!(c.get_as::<Arc<dyn Greeter>, French>().greet(), "bonjour");
/// assert_eq!(c.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct Container {
    entries: Arc<Mutex<HashMap<TypeKey, AnyValue>>>,
}

impl Container {
    /// Creates a new, empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty container with room for at least `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::with_capacity(capacity))),
        }
    }

    /// Registers `value` under the key of its own type `T`.
    ///
    /// Whatever was stored under that key before is replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_registry::Container;
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct Port(u16);
    ///
    /// let c = Container::new();
    /// c.add(Port(80));
    /// c.add(Port(8080));
    ///
    /// assert_eq!(c.get::<Port>(), Port(8080));
    /// assert_eq!(c.len(), 1);
    /// ```
    pub fn add<T>(&self, value: T)
    where
        T: Any + Send + Sync,
    {
        self.insert(TypeKey::of::<T>(), AnyValue::new(value));
    }

    /// Registers `value`, stored as `T`, under the key of the surrogate type `O`.
    ///
    /// This lets several implementations of one capability coexist, each under
    /// its own surrogate. Retrieve them with [`get_as`](Self::get_as) and friends
    /// using the same pair of type parameters.
    pub fn add_as<T, O>(&self, value: T)
    where
        T: Any + Send + Sync,
        O: ?Sized,
    {
        self.insert(TypeKey::of::<O>(), AnyValue::new(value));
    }

    /// Returns a clone of the `T` stored under the key of `T`.
    ///
    /// # Panics
    ///
    /// Panics if nothing is stored under the key, or if the stored value is not
    /// a `T`. The message names the key. Use [`try_get`](Self::try_get) or
    /// [`resolve`](Self::resolve) to handle absence.
    #[track_caller]
    pub fn get<T>(&self) -> T
    where
        T: Any + Send + Sync + Clone,
    {
        match self.resolve::<T>() {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    /// Returns a clone of the `T` stored under the key of the surrogate `O`.
    ///
    /// # Panics
    ///
    /// Same conditions as [`get`](Self::get), checked against the key of `O`.
    #[track_caller]
    pub fn get_as<T, O>(&self) -> T
    where
        T: Any + Send + Sync + Clone,
        O: ?Sized,
    {
        match self.resolve_as::<T, O>() {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    /// Returns a clone of the `T` stored under the key of `T`, if there is one.
    ///
    /// ```
    /// use sovran_registry::Container;
    ///
    /// let c = Container::new();
    /// assert_eq!(c.try_get::<u32>(), None);
    ///
    /// c.add(7u32);
    /// assert_eq!(c.try_get::<u32>(), Some(7));
    /// ```
    pub fn try_get<T>(&self) -> Option<T>
    where
        T: Any + Send + Sync + Clone,
    {
        self.try_get_as::<T, T>()
    }

    /// Returns a clone of the `T` stored under the key of the surrogate `O`, if
    /// there is one.
    pub fn try_get_as<T, O>(&self) -> Option<T>
    where
        T: Any + Send + Sync + Clone,
        O: ?Sized,
    {
        self.fetch::<T>(TypeKey::of::<O>())
            .ok()
            .map(|value| T::clone(&*value))
    }

    /// Returns a shared handle to the `T` stored under the key of `T`.
    ///
    /// Unlike [`try_get`](Self::try_get) this does not need `T: Clone`.
    pub fn try_get_shared<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.try_get_shared_as::<T, T>()
    }

    /// Returns a shared handle to the `T` stored under the key of `O`.
    pub fn try_get_shared_as<T, O>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
        O: ?Sized,
    {
        self.fetch::<T>(TypeKey::of::<O>()).ok()
    }

    /// Returns a clone of the `T` stored under the key of `T`.
    ///
    /// This is the non-panicking form of [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NotFound`] if the key is absent or holds
    /// something other than a `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_registry::{Container, ContainerError, NotFoundReason};
    ///
    /// let c = Container::new();
    /// c.add(String::from("db://primary"));
    ///
    /// let url: String = c.resolve()?;
    /// assert_eq!(url, "db://primary");
    ///
    /// let err = c.resolve::<u64>().unwrap_err();
    /// assert_eq!(err.reason(), NotFoundReason::Missing);
    /// # Ok::<(), ContainerError>(())
    /// ```
    pub fn resolve<T>(&self) -> Result<T, ContainerError>
    where
        T: Any + Send + Sync + Clone,
    {
        self.resolve_as::<T, T>()
    }

    /// Returns a clone of the `T` stored under the key of the surrogate `O`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NotFound`] if the key of `O` is absent or holds
    /// something other than a `T`.
    pub fn resolve_as<T, O>(&self) -> Result<T, ContainerError>
    where
        T: Any + Send + Sync + Clone,
        O: ?Sized,
    {
        self.with_as::<T, O, _, _>(T::clone)
    }

    /// Runs `f` against the `T` stored under the key of `T`.
    ///
    /// The value is borrowed rather than cloned, so `T` need not be `Clone`.
    /// `f` runs after the container's lock has been released and may itself
    /// use the container.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NotFound`] under the same conditions as
    /// [`resolve`](Self::resolve).
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_registry::{Container, ContainerError};
    ///
    /// struct Pool {
    ///     size: usize,
    /// }
    ///
    /// let c = Container::new();
    /// c.add(Pool { size: 16 });
    ///
    /// let size = c.with(|pool: &Pool| pool.size)?;
    /// assert_eq!(size, 16);
    /// # Ok::<(), ContainerError>(())
    /// ```
    pub fn with<T, F, R>(&self, f: F) -> Result<R, ContainerError>
    where
        T: Any + Send + Sync,
        F: FnOnce(&T) -> R,
    {
        self.with_as::<T, T, F, R>(f)
    }

    /// Runs `f` against the `T` stored under the key of the surrogate `O`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NotFound`] under the same conditions as
    /// [`resolve_as`](Self::resolve_as).
    pub fn with_as<T, O, F, R>(&self, f: F) -> Result<R, ContainerError>
    where
        T: Any + Send + Sync,
        O: ?Sized,
        F: FnOnce(&T) -> R,
    {
        match self.fetch::<T>(TypeKey::of::<O>()) {
            Ok(value) => Ok(f(&*value)),
            Err(e) => {
                debug!(key = %e.key(), reason = %e.reason(), "lookup failed");
                Err(e)
            }
        }
    }

    /// Removes whatever is stored under the key of `T`.
    ///
    /// Returns `true` if an entry was removed. Removing an absent key is a
    /// no-op.
    pub fn remove<T>(&self) -> bool
    where
        T: ?Sized,
    {
        let key = TypeKey::of::<T>();
        let removed = self.entries.lock().remove(&key);
        match removed {
            Some(previous) => {
                trace!(%key, stored = previous.type_name(), "removed entry");
                true
            }
            None => false,
        }
    }

    /// Returns true if any value, of any type, is stored under the key of `K`
    pub fn contains<K>(&self) -> bool
    where
        K: ?Sized,
    {
        self.entries.lock().contains_key(&TypeKey::of::<K>())
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the container holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn insert(&self, key: TypeKey, value: AnyValue) {
        let stored = value.type_name();
        // the replaced value is dropped here, after the guard
        let previous = self.entries.lock().insert(key, value);
        match previous {
            Some(previous) => debug!(
                %key,
                previous = previous.type_name(),
                stored,
                "replaced entry"
            ),
            None => trace!(%key, stored, "added entry"),
        }
    }

    /// Looks `key` up and checks that the entry holds a `T`.
    ///
    /// Only the map access happens under the lock; the type test and anything
    /// the caller does with the result run after it is released.
    fn fetch<T>(&self, key: TypeKey) -> Result<Arc<T>, ContainerError>
    where
        T: Any + Send + Sync,
    {
        let entry = self.entries.lock().get(&key).cloned();
        let entry = entry.ok_or(ContainerError::not_found(key, NotFoundReason::Missing))?;

        let mismatch = NotFoundReason::TypeMismatch {
            stored: entry.type_name(),
            requested: type_name::<T>(),
        };
        if !entry.is_type::<T>() {
            return Err(ContainerError::not_found(key, mismatch));
        }
        entry
            .downcast_arc::<T>()
            .ok_or(ContainerError::not_found(key, mismatch))
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_key;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Tester: Send + Sync {
        fn foo(&self) -> &'static str;
    }

    #[derive(Clone, Debug, PartialEq)]
    struct TesterImpl;

    impl Tester for TesterImpl {
        fn foo(&self) -> &'static str {
            "impl"
        }
    }

    #[test]
    fn test_new_is_empty() {
        let c = Container::new();
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
        assert!(Container::with_capacity(8).is_empty());
    }

    #[test]
    fn test_add_stores_under_own_key() {
        let c = Container::new();
        c.add::<Arc<dyn Tester>>(Arc::new(TesterImpl));

        assert_eq!(c.len(), 1);
        assert!(c.contains::<dyn Tester>());
        assert!(!c.contains::<TesterImpl>());
    }

    #[test]
    fn test_add_as_stores_under_surrogate_key() {
        let c = Container::new();
        c.add_as::<Arc<dyn Tester>, TesterImpl>(Arc::new(TesterImpl));

        assert_eq!(c.len(), 1);
        assert!(c.contains::<TesterImpl>());
        assert!(c.try_get::<Arc<dyn Tester>>().is_none());

        let found = c.get_as::<Arc<dyn Tester>, TesterImpl>();
        assert_eq!(found.foo(), "impl");
    }

    #[test]
    fn test_fetch_reports_missing_and_mismatch() {
        let c = Container::new();
        let err = c.fetch::<TesterImpl>(type_key::<TesterImpl>()).unwrap_err();
        assert_eq!(err.reason(), NotFoundReason::Missing);

        c.add(TesterImpl);
        let err = c.fetch::<u8>(type_key::<TesterImpl>()).unwrap_err();
        assert_eq!(err.key(), type_key::<TesterImpl>());
        assert_eq!(
            err.reason(),
            NotFoundReason::TypeMismatch {
                stored: type_name::<TesterImpl>(),
                requested: "u8",
            }
        );
    }

    #[test]
    fn test_try_get_shared_does_not_copy() {
        struct Opaque(u32);

        let c = Container::new();
        c.add(Opaque(3));

        let first = c.try_get_shared::<Opaque>().unwrap();
        let second = c.try_get_shared::<Opaque>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.0, 3);
        assert!(c.try_get_shared::<u32>().is_none());
    }

    #[test]
    fn test_clones_share_entries() {
        let c = Container::new();
        let handle = c.clone();
        handle.add(5i64);

        assert_eq!(c.get::<i64>(), 5);
        assert!(c.remove::<i64>());
        assert!(handle.is_empty());
    }

    #[test]
    fn test_with_can_reenter_the_container() {
        let c = Container::new();
        c.add(TesterImpl);

        let len = c
            .with(|_: &TesterImpl| {
                c.add(1u8);
                c.len()
            })
            .unwrap();
        assert_eq!(len, 2);
    }

    #[test]
    fn test_replaced_value_drops_outside_lock() {
        struct Probe {
            c: Container,
            seen: Arc<AtomicUsize>,
        }

        impl Drop for Probe {
            fn drop(&mut self) {
                // deadlocks if the entries lock is still held
                self.seen.store(self.c.len(), Ordering::SeqCst);
            }
        }

        let c = Container::new();
        let seen = Arc::new(AtomicUsize::new(usize::MAX));
        c.add(Probe {
            c: c.clone(),
            seen: seen.clone(),
        });
        let last_seen = Arc::new(AtomicUsize::new(usize::MAX));
        c.add(Probe {
            c: c.clone(),
            seen: last_seen.clone(),
        });
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        assert!(c.remove::<Probe>());
        assert_eq!(last_seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_debug_shows_len_only() {
        let c = Container::new();
        c.add(1u8);
        assert_eq!(format!("{:?}", c), "Container { len: 1, .. }");
    }
}
