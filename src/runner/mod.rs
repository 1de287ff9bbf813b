//! The coroutine runner: drives one suspendable computation to completion.
//!
//! [`launch`] starts a [`Coroutine`] and immediately returns its outer
//! promise, the promise representing the computation's eventual final
//! result. From then on the runner is purely reactive: it suspends the
//! unit on whatever target it yields, registers itself as the target's
//! continuation, and is re-entered when that target settles. It never
//! polls and never blocks a thread.
//!
//! # Control flow
//!
//! 1. The unit is resumed with the previous outcome (initially
//!    `Ok(Value::unit())`).
//! 2. If it suspends on a target, collections are folded through the
//!    parallel combinator; an already-settled target short-circuits the
//!    suspension and the loop continues immediately with its outcome.
//! 3. If it completes or fails, the outer promise settles accordingly and
//!    the runner is finished.
//!
//! A failure of the awaited target (including aggregate failures and
//! cancellation) is injected *into* the unit as `Err` at its suspension
//! point. Only a failure the unit escalates via [`Step::Fail`] reaches the
//! outer promise.
//!
//! # Examples
//!
//! ```rust
//! use resumable::promise::Promise;
//! use resumable::runner::{Step, Value, from_fn, launch};
//!
//! let chunk: Promise<Value> = Promise::new();
//! let handle = chunk.clone();
//!
//! let mut started = false;
//! let outer = launch(from_fn(move |input| {
//!     if !started {
//!         started = true;
//!         return Step::suspend_on(handle.clone());
//!     }
//!     match input {
//!         Ok(value) => Step::Complete(value),
//!         Err(failure) => Step::Fail(failure),
//!     }
//! }));
//!
//! chunk.resolve(Value::new("payload")).unwrap();
//! let result = outer.peek().unwrap().unwrap();
//! assert_eq!(result.downcast_ref::<&str>(), Some(&"payload"));
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::promise::{Promise, join_all, join_keyed};

mod coroutine;
mod value;

pub use coroutine::{Coroutine, FnCoroutine, Resume, Step, Target, from_fn};
pub use value::Value;

/// Runner lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunnerState {
    /// Constructed; the unit has not been resumed yet.
    Started,
    /// Inside a `resume` call.
    Running,
    /// Waiting for the registered target to settle.
    Suspended,
    /// The outer promise has settled; the unit is never resumed again.
    Finished,
}

/// The unit plus its lifecycle state, serialized behind one lock.
struct Inner {
    unit: Box<dyn Coroutine>,
    state: RunnerState,
}

/// Drives a single coroutine, re-entered only through continuations.
struct Runner {
    inner: Mutex<Inner>,
    outer: Promise<Value>,
}

impl Runner {
    /// Advances the unit with one resumption input, looping while targets
    /// settle synchronously.
    fn advance(self: &Arc<Self>, mut input: Resume) {
        loop {
            let step = {
                let mut inner = self.inner.lock();
                if inner.state == RunnerState::Finished {
                    return;
                }
                inner.state = RunnerState::Running;
                inner.unit.resume(input)
            };

            match step {
                Step::Complete(value) => {
                    self.finish();
                    let _ = self.outer.resolve(value);
                    return;
                }
                Step::Fail(failure) => {
                    self.finish();
                    let _ = self.outer.fail(failure);
                    return;
                }
                Step::Suspend(target) => {
                    let awaited = fold_target(target);

                    // A target that is already settled resumes the unit
                    // in place, without a round trip through a
                    // continuation. Long runs of ready targets stay on
                    // this loop instead of recursing.
                    if let Some(outcome) = awaited.peek() {
                        input = outcome;
                        continue;
                    }

                    self.inner.lock().state = RunnerState::Suspended;
                    let this = Arc::clone(self);
                    awaited.on_settled(move |outcome| this.advance(outcome));
                    return;
                }
            }
        }
    }

    fn finish(&self) {
        self.inner.lock().state = RunnerState::Finished;
    }
}

/// Reduces a suspension target to a single promise, folding collections
/// through the parallel combinator.
fn fold_target(target: Target) -> Promise<Value> {
    match target {
        Target::One(promise) => promise,
        Target::All(promises) => join_all(promises).fmap(Value::new),
        Target::Keyed(pairs) => join_keyed(pairs).fmap(Value::new),
    }
}

/// Launches a coroutine and returns the promise of its final result.
///
/// The returned promise resolves with the value the unit completes with,
/// or fails with the failure it escalates. It is handed back before the
/// unit runs its first step, so callers can attach continuations first if
/// they resume the unit from another thread.
///
/// A launched unit whose outer promise ultimately fails and is never
/// observed triggers the dropped-failure diagnostic when the promise is
/// released (see [`crate::report`]), so starting a coroutine and ignoring
/// its outcome does not swallow its errors.
///
/// # Examples
///
/// A unit that never suspends completes synchronously:
///
/// ```rust
/// use resumable::runner::{Resume, Step, from_fn, launch};
///
/// let outer = launch(from_fn(|_input: Resume| Step::complete(27_i32)));
/// let result = outer.peek().unwrap().unwrap();
/// assert_eq!(result.downcast_ref::<i32>(), Some(&27));
/// ```
pub fn launch<C>(unit: C) -> Promise<Value>
where
    C: Coroutine + 'static,
{
    let runner = Arc::new(Runner {
        inner: Mutex::new(Inner {
            unit: Box::new(unit),
            state: RunnerState::Started,
        }),
        outer: Promise::new(),
    });
    let outer = runner.outer.clone();
    runner.advance(Ok(Value::unit()));
    outer
}
