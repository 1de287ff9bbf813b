//! Error types for the promise and runner core.
//!
//! This module provides the error vocabulary shared by the whole crate:
//! [`Failure`], the error carried inside a failed promise and injected into
//! suspended coroutines, and [`AlreadySettledError`], returned when a caller
//! attempts to settle a promise twice.

use std::fmt;

/// The error carried by a failed promise.
///
/// A `Failure` is produced by the operation backing a promise (or by
/// cancellation) and travels through the suspend/resume protocol: when a
/// coroutine is waiting on a promise that fails, the failure is delivered
/// into the coroutine at its suspension point, where the coroutine may
/// absorb it or escalate it to its own caller.
///
/// `Failure` is `Clone` and `PartialEq` so that a single outcome can fan
/// out to every registered continuation and be asserted in tests.
///
/// # Examples
///
/// ```rust
/// use resumable::error::Failure;
///
/// let failure = Failure::error("connection reset");
/// assert_eq!(failure, Failure::Error("connection reset".to_string()));
/// assert_eq!(failure.to_string(), "connection reset");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// A failure signalled by the operation backing a promise, or raised
    /// by a coroutine step.
    Error(String),

    /// The promise was cancelled before it settled.
    ///
    /// Cancellation propagates into an awaiting coroutine exactly like any
    /// other failure.
    Cancelled,
}

impl Failure {
    /// Creates a [`Failure::Error`] from any message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resumable::error::Failure;
    ///
    /// let failure = Failure::error("timed out");
    /// assert_eq!(failure.to_string(), "timed out");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Returns whether this failure represents cancellation.
    #[inline]
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(message) => formatter.write_str(message),
            Self::Cancelled => formatter.write_str("promise was cancelled before it settled"),
        }
    }
}

impl std::error::Error for Failure {}

/// Returned when `resolve`, `fail`, or `cancel` is called on a promise
/// that has already settled.
///
/// A promise settles exactly once. Attempting to settle it again is a
/// programmer error and is reported explicitly rather than silently
/// ignored.
///
/// # Examples
///
/// ```rust
/// use resumable::error::AlreadySettledError;
///
/// let error = AlreadySettledError { operation: "resolve" };
/// assert_eq!(
///     error.to_string(),
///     "Promise::resolve: promise already settled. A promise settles exactly once."
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadySettledError {
    /// The name of the operation that observed the settled promise.
    pub operation: &'static str,
}

impl fmt::Display for AlreadySettledError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "Promise::{}: promise already settled. A promise settles exactly once.",
            self.operation
        )
    }
}

impl std::error::Error for AlreadySettledError {}
