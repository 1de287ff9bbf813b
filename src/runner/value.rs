//! Dynamically typed payloads carried across suspension points.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A clonable, dynamically typed value.
///
/// Coroutines yield promises of arbitrary result types at each suspension
/// point, so the runner boundary is dynamically typed: resolved values
/// travel as `Value` and the coroutine downcasts to the type it expects.
///
/// `Value` is a thin wrapper over `Arc<dyn Any + Send + Sync>`, so cloning
/// is cheap and a single value can fan out to several continuations.
///
/// # Examples
///
/// ```rust
/// use resumable::runner::Value;
///
/// let value = Value::new(42_i32);
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert!(value.downcast_ref::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct Value(Arc<dyn Any + Send + Sync>);

impl Value {
    /// Wraps a concrete value.
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// The unit value, fed into a coroutine at its first resumption.
    #[must_use]
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Returns whether the wrapped value has type `T`.
    #[must_use]
    pub fn is<T: Send + Sync + 'static>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Borrows the wrapped value as `T`, if it has that type.
    #[must_use]
    pub fn downcast_ref<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Consumes this handle, recovering shared ownership of the wrapped
    /// value as `T`.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` unchanged when the wrapped value is not a `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resumable::runner::Value;
    ///
    /// let value = Value::new("chunk".to_string());
    /// let recovered = value.downcast::<String>().unwrap();
    /// assert_eq!(recovered.as_str(), "chunk");
    /// ```
    pub fn downcast<T: Send + Sync + 'static>(self) -> Result<Arc<T>, Self> {
        self.0.downcast::<T>().map_err(Self)
    }
}

impl PartialEq for Value {
    /// Identity comparison: two handles are equal when they share the
    /// same underlying allocation.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("<value>")
    }
}
