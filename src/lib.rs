//! # resumable
//!
//! A minimal coroutine scheduler and promise-resolution runtime:
//! sequential-looking computations suspend on pending operations and resume
//! correctly when those operations complete, including parallel awaiting of
//! several operations and error propagation through suspension points.
//!
//! ## Overview
//!
//! Two components, the second built on the first:
//!
//! - **[`Promise<T>`](promise::Promise)**: a single-assignment container for
//!   a result that becomes available later. Continuations attach before or
//!   after settlement and fire exactly once, in registration order.
//! - **[`launch`](runner::launch) / [`Coroutine`](runner::Coroutine)**: a
//!   runner that drives a suspendable computation unit, feeding it the
//!   outcome of each promise it yields and exposing its final result as a
//!   promise itself. Ordered sequences and keyed collections of promises
//!   can be awaited as one unit via the [`join_all`](promise::join_all) and
//!   [`join_keyed`](promise::join_keyed) combinators.
//!
//! The core is cooperative and never blocks a thread: genuinely blocking
//! work belongs to external pools that hand back promises. Completions may
//! arrive from any thread.
//!
//! ## Example
//!
//! ```rust
//! use resumable::prelude::*;
//!
//! // An external operation that will complete later.
//! let fetch: Promise<Value> = Promise::new();
//! let handle = fetch.clone();
//!
//! // A computation that awaits the operation and doubles the result.
//! let mut started = false;
//! let outer = launch(from_fn(move |input| {
//!     if !started {
//!         started = true;
//!         return Step::suspend_on(handle.clone());
//!     }
//!     match input {
//!         Ok(value) => {
//!             let number = value.downcast_ref::<i32>().copied().unwrap();
//!             Step::complete(number * 2)
//!         }
//!         Err(failure) => Step::Fail(failure),
//!     }
//! }));
//!
//! fetch.resolve(Value::new(5)).unwrap();
//! let result = outer.peek().unwrap().unwrap();
//! assert_eq!(result.downcast_ref::<i32>(), Some(&10));
//! ```
//!
//! ## Unobserved failures
//!
//! Starting a computation and never observing its outcome is a documented
//! hazard: its failures would vanish. Here they don't: a failed promise
//! dropped without observers is routed to a process-wide reporter (see
//! [`report`]), which logs through `tracing` by default.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the types and functions most callers need.
///
/// # Usage
///
/// ```rust
/// use resumable::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{AlreadySettledError, Failure};
    pub use crate::promise::{Outcome, Promise, join_all, join_keyed};
    pub use crate::report::set_dropped_failure_reporter;
    pub use crate::runner::{Coroutine, Resume, Step, Target, Value, from_fn, launch};
}

pub mod error;
pub mod promise;
pub mod report;
pub mod runner;
