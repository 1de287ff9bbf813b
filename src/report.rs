//! Process-wide reporting of failures nobody observed.
//!
//! A promise that fails and is never observed (no continuation attached,
//! outcome never read) would otherwise vanish silently. This is the
//! documented hazard of starting a coroutine without ever awaiting its
//! result. To keep such failures detectable, the crate routes them through
//! a process-wide reporter when the last handle to the promise is dropped.
//!
//! The default reporter emits a `tracing` error event. Applications and
//! tests can install their own sink with [`set_dropped_failure_reporter`].
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use resumable::promise::Promise;
//! use resumable::report::set_dropped_failure_reporter;
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let sink = Arc::clone(&seen);
//! set_dropped_failure_reporter(move |_failure| {
//!     sink.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! let promise: Promise<i32> = Promise::new();
//! promise.fail(resumable::error::Failure::error("lost")).unwrap();
//! drop(promise);
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

use std::sync::LazyLock;

use parking_lot::RwLock;

use crate::error::Failure;

/// The installed reporter function.
type Reporter = Box<dyn Fn(&Failure) + Send + Sync>;

/// Global reporter, initialized lazily with the `tracing` default.
///
/// The reporter has static lifetime and is never dropped; installing a new
/// reporter replaces the previous one for the whole process.
static REPORTER: LazyLock<RwLock<Reporter>> = LazyLock::new(|| {
    RwLock::new(Box::new(|failure: &Failure| {
        tracing::error!(%failure, "promise failure was never observed");
    }))
});

/// Installs a process-wide reporter for unobserved promise failures.
///
/// The reporter is invoked with each failure that would otherwise be
/// dropped silently: a failed promise whose last handle is released
/// without the outcome ever being observed, or an aggregate member that
/// fails after the aggregate has already settled.
///
/// The previous reporter is replaced. The default reporter logs through
/// `tracing::error!`.
pub fn set_dropped_failure_reporter<F>(reporter: F)
where
    F: Fn(&Failure) + Send + Sync + 'static,
{
    *REPORTER.write() = Box::new(reporter);
}

/// Routes an unobserved failure to the installed reporter.
pub(crate) fn report_dropped_failure(failure: &Failure) {
    (REPORTER.read())(failure);
}
