//! Integration tests for the dropped-failure diagnostic.
//!
//! The reporter is process-wide state, so these tests live in their own
//! test binary: a single collecting reporter is installed once, and each
//! test asserts on failures with messages unique to it.

use resumable::error::Failure;
use resumable::promise::{Promise, join_all};
use resumable::report::set_dropped_failure_reporter;
use resumable::runner::{Resume, Step, from_fn, launch};
use rstest::rstest;
use std::sync::{Arc, LazyLock, Once};

use parking_lot::Mutex;

/// Every failure the installed reporter has seen.
static COLLECTED: LazyLock<Arc<Mutex<Vec<Failure>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

static INSTALL: Once = Once::new();

/// Installs the collecting reporter (once per process).
fn install_collector() {
    INSTALL.call_once(|| {
        let sink = Arc::clone(&COLLECTED);
        set_dropped_failure_reporter(move |failure| {
            sink.lock().push(failure.clone());
        });
    });
}

/// Number of collected failures carrying the given message.
fn reported_count(message: &str) -> usize {
    COLLECTED
        .lock()
        .iter()
        .filter(|failure| matches!(failure, Failure::Error(m) if m == message))
        .count()
}

#[rstest]
fn unobserved_failed_promise_reports_exactly_once() {
    install_collector();

    let promise: Promise<i32> = Promise::new();
    promise.fail(Failure::error("unobserved-plain")).unwrap();
    drop(promise);

    assert_eq!(reported_count("unobserved-plain"), 1);
}

#[rstest]
fn launched_unit_that_fails_unawaited_reports_exactly_once() {
    install_collector();

    let outer = launch(from_fn(|_input: Resume| {
        Step::Fail(Failure::error("unawaited-launch"))
    }));
    // The caller never attaches a continuation and never reads the
    // outcome: the misuse pattern under test.
    drop(outer);

    assert_eq!(reported_count("unawaited-launch"), 1);
}

#[rstest]
fn observed_failure_is_not_reported() {
    install_collector();

    let promise: Promise<i32> = Promise::new();
    promise.on_settled(|_outcome| {});
    promise.fail(Failure::error("observed-failure")).unwrap();
    drop(promise);

    assert_eq!(reported_count("observed-failure"), 0);
}

#[rstest]
fn peeked_failure_is_not_reported() {
    install_collector();

    let promise: Promise<i32> = Promise::new();
    promise.fail(Failure::error("peeked-failure")).unwrap();
    let _ = promise.peek();
    drop(promise);

    assert_eq!(reported_count("peeked-failure"), 0);
}

#[rstest]
fn aggregate_failure_after_settlement_reaches_the_reporter() {
    install_collector();

    let first: Promise<i32> = Promise::new();
    let second: Promise<i32> = Promise::new();
    let aggregate = join_all(vec![first.clone(), second.clone()]);

    first.fail(Failure::error("agg-first")).unwrap();
    assert_eq!(aggregate.peek(), Some(Err(Failure::error("agg-first"))));

    // The aggregate already settled, so this failure can no longer be
    // delivered to the awaiter; it must go to the reporter instead.
    second.fail(Failure::error("agg-second")).unwrap();
    assert_eq!(reported_count("agg-second"), 1);

    // The members carry continuations, so dropping them adds nothing.
    drop(first);
    drop(second);
    assert_eq!(reported_count("agg-second"), 1);
    assert_eq!(reported_count("agg-first"), 0);
}
