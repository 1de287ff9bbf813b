//! Parallel combinators over collections of promises.
//!
//! [`join_all`] awaits an ordered sequence of promises as one unit, and
//! [`join_keyed`] does the same for a keyed collection. Both produce an
//! aggregate promise that:
//!
//! - resolves with every value, preserving input order / keys, once all
//!   members have resolved;
//! - fails immediately with the first failure by completion time, without
//!   waiting for the remaining members;
//! - keeps observing the remaining members after a failure, so that a
//!   second failure is routed to the dropped-failure reporter instead of
//!   vanishing.
//!
//! Members may settle concurrently from any number of threads; the shared
//! completion state sits behind a mutex.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Failure;
use crate::report::report_dropped_failure;

use super::{Outcome, Promise};

/// Shared completion state for one aggregate.
struct JoinState<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
    settled: bool,
}

impl<T> JoinState<T> {
    fn new(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self {
            slots,
            remaining: len,
            settled: false,
        }
    }

    /// Records one member outcome. Returns the full slot vector when this
    /// was the last member and no failure preceded it, and reports
    /// failures that arrive after the aggregate has already settled.
    fn record(&mut self, index: usize, outcome: Outcome<T>) -> JoinProgress<T> {
        self.remaining -= 1;
        match outcome {
            Ok(value) => {
                self.slots[index] = Some(value);
                if self.remaining == 0 && !self.settled {
                    self.settled = true;
                    let values = self
                        .slots
                        .iter_mut()
                        .map(|slot| slot.take().expect("join: every slot recorded"))
                        .collect();
                    JoinProgress::Complete(values)
                } else {
                    JoinProgress::Recorded
                }
            }
            Err(failure) => {
                if self.settled {
                    JoinProgress::LateFailure(failure)
                } else {
                    self.settled = true;
                    JoinProgress::FirstFailure(failure)
                }
            }
        }
    }
}

/// What a recorded member outcome means for the aggregate.
enum JoinProgress<T> {
    Recorded,
    Complete(Vec<T>),
    FirstFailure(Failure),
    LateFailure(Failure),
}

/// Awaits an ordered sequence of promises as a single aggregate promise.
///
/// The aggregate resolves to the vector of resolved values in input order
/// once every member has resolved. If any member fails, the aggregate
/// fails immediately with that failure; members that settle afterwards are
/// still recorded, and any later failure among them is routed to the
/// dropped-failure reporter.
///
/// An empty sequence resolves immediately to an empty vector.
///
/// # Examples
///
/// ```rust
/// use resumable::promise::{Promise, join_all};
///
/// let first = Promise::new();
/// let second = Promise::new();
/// let both = join_all(vec![first.clone(), second.clone()]);
///
/// // Completion order does not affect result order.
/// second.resolve(2).unwrap();
/// assert!(both.is_pending());
/// first.resolve(1).unwrap();
///
/// assert_eq!(both.peek().unwrap().unwrap(), vec![1, 2]);
/// ```
#[must_use]
pub fn join_all<T>(promises: Vec<Promise<T>>) -> Promise<Vec<T>>
where
    T: Clone + Send + 'static,
{
    let aggregate = Promise::new();
    if promises.is_empty() {
        let _ = aggregate.resolve(Vec::new());
        return aggregate;
    }

    let state = Arc::new(Mutex::new(JoinState::new(promises.len())));
    for (index, promise) in promises.iter().enumerate() {
        let state = Arc::clone(&state);
        let handle = aggregate.clone();
        promise.on_settled(move |outcome| {
            let progress = state.lock().record(index, outcome);
            match progress {
                JoinProgress::Recorded => {}
                JoinProgress::Complete(values) => {
                    let _ = handle.resolve(values);
                }
                JoinProgress::FirstFailure(failure) => {
                    let _ = handle.fail(failure);
                }
                JoinProgress::LateFailure(failure) => report_dropped_failure(&failure),
            }
        });
    }
    aggregate
}

/// Awaits a keyed collection of promises as a single aggregate promise.
///
/// The aggregate resolves to a map from each key to its resolved value
/// once every member has resolved. Failure semantics are identical to
/// [`join_all`]. Pairs are processed in input order; if the same key
/// appears twice, the later pair wins.
///
/// An empty collection resolves immediately to an empty map.
///
/// # Examples
///
/// ```rust
/// use resumable::promise::{Promise, join_keyed};
///
/// let alpha = Promise::new();
/// let beta = Promise::new();
/// let merged = join_keyed(vec![
///     ("a".to_string(), alpha.clone()),
///     ("b".to_string(), beta.clone()),
/// ]);
///
/// alpha.resolve(1).unwrap();
/// beta.resolve(2).unwrap();
///
/// let map = merged.peek().unwrap().unwrap();
/// assert_eq!(map["a"], 1);
/// assert_eq!(map["b"], 2);
/// ```
#[must_use]
pub fn join_keyed<T>(pairs: Vec<(String, Promise<T>)>) -> Promise<HashMap<String, T>>
where
    T: Clone + Send + 'static,
{
    let (keys, promises): (Vec<String>, Vec<Promise<T>>) = pairs.into_iter().unzip();
    join_all(promises).fmap(move |values| keys.into_iter().zip(values).collect())
}
