//! Single-assignment promises with ordered continuations.
//!
//! A [`Promise<T>`] is a shared, observe-once container for a value that
//! becomes available later. It is created by whoever initiates an
//! asynchronous operation, settled exactly once by that operation's
//! completion point, and observed by any number of continuations.
//!
//! # State machine
//!
//! A promise is in exactly one of three states:
//!
//! - **Pending**: holds an ordered queue of continuations.
//! - **Resolved**: holds the final value.
//! - **Failed**: holds the final [`Failure`].
//!
//! The only legal transitions are `Pending → Resolved` and
//! `Pending → Failed`, each exactly once. Settling an already-settled
//! promise is a caller error and returns [`AlreadySettledError`] rather
//! than being silently ignored.
//!
//! # Continuation ordering
//!
//! Continuations registered while pending fire in registration order when
//! the promise settles. A continuation registered after settlement runs
//! immediately on the caller's thread with a clone of the stored outcome;
//! per-promise ordering is preserved because a settled promise has an
//! empty queue.
//!
//! # Unobserved failures
//!
//! If the last handle to a failed promise is dropped and the outcome was
//! never observed (no continuation, no [`Promise::peek`]), the failure is
//! routed to the process-wide reporter (see [`crate::report`]) so it never
//! disappears silently.
//!
//! # Examples
//!
//! ```rust
//! use resumable::promise::Promise;
//!
//! let promise: Promise<i32> = Promise::new();
//! let observed = Promise::new();
//! let sink = observed.clone();
//!
//! promise.on_settled(move |outcome| {
//!     let _ = sink.resolve(outcome.unwrap() * 2);
//! });
//!
//! promise.resolve(21).unwrap();
//! assert_eq!(observed.peek().unwrap().unwrap(), 42);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::error::{AlreadySettledError, Failure};
use crate::report::report_dropped_failure;

mod join;

pub use join::{join_all, join_keyed};

/// The outcome a settled promise delivers to its observers.
pub type Outcome<T> = Result<T, Failure>;

/// A continuation registered on a pending promise.
type Continuation<T> = Box<dyn FnOnce(Outcome<T>) + Send>;

/// Continuation queues are almost always short; two inline slots cover the
/// single-awaiter and awaiter-plus-derived cases without allocating.
type ContinuationQueue<T> = SmallVec<[Continuation<T>; 2]>;

/// Internal promise state.
enum State<T> {
    Pending(ContinuationQueue<T>),
    Resolved(T),
    Failed(Failure),
}

/// State plus the observation flag that outlives settlement.
struct Shared<T> {
    state: State<T>,
    observed: bool,
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        if let State::Failed(failure) = &self.state
            && !self.observed
        {
            report_dropped_failure(failure);
        }
    }
}

/// A single-assignment container for an eventual value or failure.
///
/// `Promise<T>` is a shared-ownership handle: the party that created it
/// typically keeps one clone to settle it and hands another to whoever
/// awaits the result. Cloning is cheap (an `Arc` bump) and every clone
/// refers to the same underlying cell.
///
/// # Type Parameters
///
/// * `T` - The resolved value type. `T: Clone` is required wherever an
///   outcome fans out to continuations, since each continuation receives
///   its own copy.
///
/// # Thread Safety
///
/// Promises may be settled from any thread; the internal state sits behind
/// a `parking_lot::Mutex`. Continuations are invoked outside the lock, on
/// the thread that settles the promise (or, for late registration, on the
/// registering thread).
///
/// # Examples
///
/// ```rust
/// use std::thread;
///
/// use resumable::promise::Promise;
///
/// let promise: Promise<&'static str> = Promise::new();
/// let producer = promise.clone();
///
/// let handle = thread::spawn(move || {
///     producer.resolve("done").unwrap();
/// });
/// handle.join().unwrap();
///
/// assert_eq!(promise.peek().unwrap().unwrap(), "done");
/// ```
pub struct Promise<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Promise<T> {
    /// Creates a new pending promise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resumable::promise::Promise;
    ///
    /// let promise: Promise<i32> = Promise::new();
    /// assert!(promise.is_pending());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: State::Pending(SmallVec::new()),
                observed: false,
            })),
        }
    }

    /// Returns whether the promise has settled (resolved or failed).
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self.shared.lock().state, State::Pending(_))
    }

    /// Returns whether the promise is still pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.is_settled()
    }
}

impl<T: Clone> Promise<T> {
    /// Settles the promise with the given outcome, draining continuations
    /// in registration order outside the lock.
    fn settle(
        &self,
        outcome: Outcome<T>,
        operation: &'static str,
    ) -> Result<(), AlreadySettledError> {
        let continuations = {
            let mut shared = self.shared.lock();
            if !matches!(shared.state, State::Pending(_)) {
                return Err(AlreadySettledError { operation });
            }
            let settled = match &outcome {
                Ok(value) => State::Resolved(value.clone()),
                Err(failure) => State::Failed(failure.clone()),
            };
            match std::mem::replace(&mut shared.state, settled) {
                State::Pending(queue) => queue,
                State::Resolved(_) | State::Failed(_) => unreachable!("state checked above"),
            }
        };

        for continuation in continuations {
            continuation(outcome.clone());
        }
        Ok(())
    }

    /// Resolves the promise with a value.
    ///
    /// All continuations registered so far fire in registration order with
    /// a clone of the value.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadySettledError`] if the promise has already settled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resumable::promise::Promise;
    ///
    /// let promise = Promise::new();
    /// assert!(promise.resolve(1).is_ok());
    /// assert!(promise.resolve(2).is_err());
    /// ```
    pub fn resolve(&self, value: T) -> Result<(), AlreadySettledError> {
        self.settle(Ok(value), "resolve")
    }

    /// Fails the promise with the given failure.
    ///
    /// Symmetric to [`Promise::resolve`]: continuations fire in
    /// registration order with a clone of the failure.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadySettledError`] if the promise has already settled.
    pub fn fail(&self, failure: Failure) -> Result<(), AlreadySettledError> {
        self.settle(Err(failure), "fail")
    }

    /// Cancels the promise, failing it with [`Failure::Cancelled`].
    ///
    /// Cancellation behaves exactly like any other failure: it is
    /// delivered to continuations and injected into an awaiting coroutine
    /// at its suspension point.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadySettledError`] if the promise has already settled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resumable::error::Failure;
    /// use resumable::promise::Promise;
    ///
    /// let promise: Promise<i32> = Promise::new();
    /// promise.cancel().unwrap();
    /// assert_eq!(promise.peek().unwrap(), Err(Failure::Cancelled));
    /// ```
    pub fn cancel(&self) -> Result<(), AlreadySettledError> {
        self.settle(Err(Failure::Cancelled), "cancel")
    }

    /// Registers a continuation to run when the promise settles.
    ///
    /// If the promise is still pending, the continuation is appended to
    /// the queue and will fire in registration order at settlement. If the
    /// promise has already settled, the continuation runs immediately on
    /// the calling thread with a clone of the stored outcome.
    ///
    /// Either way, the continuation fires exactly once, and registering it
    /// marks the promise as observed for diagnostic purposes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resumable::promise::Promise;
    ///
    /// let promise = Promise::new();
    /// promise.resolve(7).unwrap();
    ///
    /// // Late registration runs immediately.
    /// promise.on_settled(|outcome| assert_eq!(outcome, Ok(7)));
    /// ```
    pub fn on_settled<F>(&self, continuation: F)
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        let immediate = {
            let mut shared = self.shared.lock();
            shared.observed = true;
            match &mut shared.state {
                State::Pending(queue) => {
                    queue.push(Box::new(continuation));
                    None
                }
                State::Resolved(value) => Some((continuation, Ok(value.clone()))),
                State::Failed(failure) => Some((continuation, Err(failure.clone()))),
            }
        };

        if let Some((continuation, outcome)) = immediate {
            continuation(outcome);
        }
    }

    /// Returns a snapshot of the outcome if the promise has settled.
    ///
    /// Reading the outcome marks the promise as observed for diagnostic
    /// purposes. The promise itself is unaffected; `peek` may be called
    /// any number of times.
    #[must_use]
    pub fn peek(&self) -> Option<Outcome<T>> {
        let mut shared = self.shared.lock();
        match &shared.state {
            State::Pending(_) => None,
            State::Resolved(value) => {
                let outcome = Ok(value.clone());
                shared.observed = true;
                Some(outcome)
            }
            State::Failed(failure) => {
                let outcome = Err(failure.clone());
                shared.observed = true;
                Some(outcome)
            }
        }
    }
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Derives a promise that settles with `function` applied to the
    /// resolved value; failures pass through untouched.
    ///
    /// The derived promise is settled by this library when the source
    /// settles; settling it by hand beforehand forfeits the mapped
    /// outcome.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resumable::promise::Promise;
    ///
    /// let promise = Promise::new();
    /// let doubled = promise.fmap(|value: i32| value * 2);
    ///
    /// promise.resolve(21).unwrap();
    /// assert_eq!(doubled.peek().unwrap().unwrap(), 42);
    /// ```
    pub fn fmap<U, F>(&self, function: F) -> Promise<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let mapped = Promise::new();
        let target = mapped.clone();
        self.on_settled(move |outcome| {
            // Settling can only fail if the caller settled `mapped` by hand.
            let _ = match outcome {
                Ok(value) => target.resolve(function(value)),
                Err(failure) => target.fail(failure),
            };
        });
        mapped
    }
}

impl<T: fmt::Debug> fmt::Debug for Promise<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shared.lock().state {
            State::Pending(_) => formatter.write_str("<pending>"),
            State::Resolved(value) => write!(formatter, "Resolved({value:?})"),
            State::Failed(failure) => write!(formatter, "Failed({failure:?})"),
        }
    }
}
