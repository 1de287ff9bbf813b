//! The suspend/resume protocol between a coroutine and its runner.
//!
//! A coroutine is an explicit state machine: each call to
//! [`Coroutine::resume`] feeds in the outcome of the operation it was
//! waiting on and receives back the next [`Step`]: suspend on another
//! [`Target`], complete with a value, or fail. This replaces language-level
//! generator semantics with a plain re-entrant call.

use crate::error::Failure;
use crate::promise::{Outcome, Promise};

use super::value::Value;

/// What a runner feeds into a coroutine at each resumption: the resolved
/// value of the awaited target, or the failure injected at the suspension
/// point.
///
/// The very first resumption receives `Ok(Value::unit())`.
pub type Resume = Outcome<Value>;

/// What a coroutine may suspend on.
///
/// Sequences and keyed collections are awaited as one unit: the runner
/// folds them through the parallel combinator before suspending, and the
/// coroutine is resumed with a `Vec<Value>` or `HashMap<String, Value>`
/// respectively.
pub enum Target {
    /// A single promise.
    One(Promise<Value>),
    /// An ordered sequence of promises, resumed as `Vec<Value>` in input
    /// order once all have resolved.
    All(Vec<Promise<Value>>),
    /// A keyed collection of promises, resumed as
    /// `HashMap<String, Value>` once all have resolved.
    Keyed(Vec<(String, Promise<Value>)>),
}

/// The coroutine's answer to a resumption.
pub enum Step {
    /// Suspend until the target settles; its outcome arrives at the next
    /// [`Coroutine::resume`] call.
    Suspend(Target),
    /// The coroutine finished with a value; the runner resolves its outer
    /// promise with it.
    Complete(Value),
    /// The coroutine finished with a failure it did not absorb; the
    /// runner fails its outer promise with it.
    Fail(Failure),
}

impl Step {
    /// Shorthand for completing with a concrete value.
    #[must_use]
    pub fn complete<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Complete(Value::new(value))
    }

    /// Shorthand for suspending on a single promise.
    #[must_use]
    pub fn suspend_on(promise: Promise<Value>) -> Self {
        Self::Suspend(Target::One(promise))
    }
}

/// A suspend/resume-capable computation unit.
///
/// Implementors hold their own state between suspension points. The
/// contract with the runner:
///
/// - `resume` is never called concurrently; the runner serializes
///   resumptions.
/// - `resume` must return promptly; it describes the next suspension
///   rather than waiting for anything itself.
/// - After returning [`Step::Complete`] or [`Step::Fail`], `resume` is
///   never called again.
///
/// An injected `Err` input is the failure of the awaited target. A
/// coroutine with error handling may absorb it and carry on; returning
/// [`Step::Fail`] escalates it to the outer promise.
///
/// Most units are more conveniently written as closures via [`from_fn`].
pub trait Coroutine: Send {
    /// Advances the computation with the outcome of the awaited target.
    fn resume(&mut self, input: Resume) -> Step;
}

/// A coroutine implemented by a closure over captured state.
///
/// Created by [`from_fn`].
pub struct FnCoroutine<F> {
    function: F,
}

impl<F> Coroutine for FnCoroutine<F>
where
    F: FnMut(Resume) -> Step + Send,
{
    fn resume(&mut self, input: Resume) -> Step {
        (self.function)(input)
    }
}

/// Wraps a closure into a [`Coroutine`].
///
/// The closure receives each resumption input and returns the next step;
/// captured state carries the computation across suspension points.
///
/// # Examples
///
/// A unit that awaits one promise and doubles its value:
///
/// ```rust
/// use resumable::runner::{Step, Value, from_fn, launch};
/// use resumable::promise::Promise;
///
/// let operation: Promise<Value> = Promise::new();
/// let handle = operation.clone();
///
/// let mut started = false;
/// let outer = launch(from_fn(move |input| {
///     if !started {
///         started = true;
///         return Step::suspend_on(handle.clone());
///     }
///     match input {
///         Ok(value) => {
///             let doubled = value.downcast_ref::<i32>().copied().unwrap() * 2;
///             Step::complete(doubled)
///         }
///         Err(failure) => Step::Fail(failure),
///     }
/// }));
///
/// operation.resolve(Value::new(5)).unwrap();
/// let result = outer.peek().unwrap().unwrap();
/// assert_eq!(result.downcast_ref::<i32>(), Some(&10));
/// ```
pub fn from_fn<F>(function: F) -> FnCoroutine<F>
where
    F: FnMut(Resume) -> Step + Send,
{
    FnCoroutine { function }
}
