//! Integration tests for the Promise type.
//!
//! Covers the settle-once contract, continuation ordering for early and
//! late registration, cancellation, cross-thread settlement, and fmap
//! derivation.

use resumable::error::{AlreadySettledError, Failure};
use resumable::promise::{Outcome, Promise};
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;

// =============================================================================
// Settle-Once Contract
// =============================================================================

#[rstest]
fn exactly_the_first_settlement_succeeds() {
    let promise = Promise::new();

    assert!(promise.resolve(1).is_ok());
    assert_eq!(
        promise.resolve(2),
        Err(AlreadySettledError {
            operation: "resolve"
        })
    );
    assert_eq!(
        promise.fail(Failure::error("late")),
        Err(AlreadySettledError { operation: "fail" })
    );
    assert_eq!(
        promise.cancel(),
        Err(AlreadySettledError {
            operation: "cancel"
        })
    );

    // The stored outcome is the first one.
    assert_eq!(promise.peek(), Some(Ok(1)));
}

#[rstest]
fn first_failure_wins_over_later_resolution() {
    let promise = Promise::new();
    promise.fail(Failure::error("boom")).unwrap();
    assert!(promise.resolve(1).is_err());
    assert_eq!(promise.peek(), Some(Err(Failure::error("boom"))));
}

#[rstest]
fn continuations_observe_exactly_one_outcome() {
    let promise = Promise::new();
    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&outcomes);

    promise.on_settled(move |outcome| sink.lock().push(outcome));

    promise.resolve(1).unwrap();
    let _ = promise.resolve(2);

    assert_eq!(*outcomes.lock(), vec![Ok(1)]);
}

// =============================================================================
// Continuation Ordering
// =============================================================================

#[rstest]
fn continuations_registered_before_and_after_settlement_fire_in_order() {
    let promise = Promise::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for label in ["early-1", "early-2"] {
        let order = Arc::clone(&order);
        promise.on_settled(move |_outcome: Outcome<i32>| order.lock().push(label));
    }

    promise.resolve(0).unwrap();

    for label in ["late-1", "late-2"] {
        let order = Arc::clone(&order);
        promise.on_settled(move |_outcome: Outcome<i32>| order.lock().push(label));
    }

    assert_eq!(
        *order.lock(),
        vec!["early-1", "early-2", "late-1", "late-2"]
    );
}

#[rstest]
fn every_continuation_fires_exactly_once() {
    let promise = Promise::new();
    let fired = Arc::new(AtomicUsize::new(0));

    for _ in 0..5 {
        let sink = Arc::clone(&fired);
        promise.on_settled(move |_outcome: Outcome<i32>| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
    }
    promise.resolve(1).unwrap();

    let sink = Arc::clone(&fired);
    promise.on_settled(move |_outcome| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(fired.load(Ordering::SeqCst), 6);
}

// =============================================================================
// Cancellation
// =============================================================================

#[rstest]
fn cancellation_fails_the_promise_with_cancelled() {
    let promise: Promise<i32> = Promise::new();
    promise.cancel().unwrap();

    let outcome = promise.peek().unwrap();
    assert_eq!(outcome, Err(Failure::Cancelled));
    assert!(outcome.unwrap_err().is_cancelled());
}

// =============================================================================
// Cross-Thread Settlement
// =============================================================================

#[rstest]
fn continuation_fires_when_settled_from_another_thread() {
    let promise: Promise<String> = Promise::new();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    promise.on_settled(move |outcome| *sink.lock() = Some(outcome));

    let producer = promise.clone();
    thread::spawn(move || producer.resolve("from a worker".to_string()))
        .join()
        .unwrap()
        .unwrap();

    assert_eq!(*seen.lock(), Some(Ok("from a worker".to_string())));
}

#[rstest]
fn racing_settlers_produce_exactly_one_outcome() {
    for _ in 0..32 {
        let promise: Promise<usize> = Promise::new();
        let wins = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|value| {
                let producer = promise.clone();
                let wins = Arc::clone(&wins);
                thread::spawn(move || {
                    if producer.resolve(value).is_ok() {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
    }
}

// =============================================================================
// fmap
// =============================================================================

#[rstest]
fn fmap_chains_compose() {
    let promise = Promise::new();
    let derived = promise.fmap(|value: i32| value + 1).fmap(|value| value * 2);

    promise.resolve(20).unwrap();
    assert_eq!(derived.peek(), Some(Ok(42)));
}

#[rstest]
fn fmap_propagates_cancellation() {
    let promise: Promise<i32> = Promise::new();
    let derived = promise.fmap(|value| value + 1);

    promise.cancel().unwrap();
    assert_eq!(derived.peek(), Some(Err(Failure::Cancelled)));
}
