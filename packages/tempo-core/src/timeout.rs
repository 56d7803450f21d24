use crate::clock::{Clock, SystemClock};
use crate::future::Future;
use crate::outcome::Outcome;
use crate::Error;

/// Deadline used by [`with_default_timeout`].
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Rejects with [`Error::Timeout`] if `future` is still pending `timeout_ms`
/// after this call, measured on the platform clock.
pub fn with_timeout<I, O, E>(future: Future<I, O, E>, timeout_ms: u64) -> Future<I, O, E>
where
    I: 'static,
    O: Clone + 'static,
    E: From<Error> + Clone + 'static,
{
    with_timeout_on(SystemClock, future, timeout_ms)
}

pub fn with_default_timeout<I, O, E>(future: Future<I, O, E>) -> Future<I, O, E>
where
    I: 'static,
    O: Clone + 'static,
    E: From<Error> + Clone + 'static,
{
    with_timeout(future, DEFAULT_TIMEOUT_MS)
}

/// [`with_timeout`] against an explicit clock.
///
/// The deadline is checked against the inner future's cached state before it
/// is polled again: a future that settled on an earlier poll keeps its
/// outcome, while one still pending at the deadline is rejected without a
/// final poll.
pub fn with_timeout_on<C, I, O, E>(
    clock: C,
    future: Future<I, O, E>,
    timeout_ms: u64,
) -> Future<I, O, E>
where
    C: Clock + Clone + 'static,
    I: 'static,
    O: Clone + 'static,
    E: From<Error> + Clone + 'static,
{
    let deadline = clock.now_ms().saturating_add(timeout_ms);
    let mut inner = future;

    Future::new(move |input: I| {
        if clock.now_ms() >= deadline && inner.result().is_pending() {
            tracing::debug!(deadline, "future timed out");
            return Outcome::Rejected(E::from(Error::Timeout));
        }

        inner.poll(input).clone()
    })
}

/// Resolves once `timeout_ms` have passed on the platform clock.
pub fn after_delay<I, E>(timeout_ms: u64) -> Future<I, (), E>
where
    I: 'static,
    E: 'static,
{
    after_delay_on(SystemClock, timeout_ms)
}

pub fn after_delay_on<C, I, E>(clock: C, timeout_ms: u64) -> Future<I, (), E>
where
    C: Clock + Clone + 'static,
    I: 'static,
    E: 'static,
{
    let deadline = clock.now_ms().saturating_add(timeout_ms);

    Future::new(move |_: I| {
        if clock.now_ms() >= deadline {
            Outcome::Resolved(())
        } else {
            Outcome::Pending
        }
    })
}
