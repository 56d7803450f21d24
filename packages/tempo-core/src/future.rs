//! Poll-driven computations that settle once and chain into pipelines.
//!
//! A [`Future`] wraps a poll function `I -> Outcome<O, E>` and remembers the
//! first settled outcome it produces. Polling is cheap and non-blocking: a
//! pending future is simply polled again on a later turn of the host loop.
//!
//! ```
//! use tempo_core::{Future, Outcome};
//!
//! let mut pipeline = Future::<(), i32>::resolve(3)
//!     .map(|x| x * 2)
//!     .map(|x| x + 1);
//!
//! assert_eq!(pipeline.poll(()), &Outcome::Resolved(7));
//! ```

use crate::outcome::Outcome;
use crate::Error;

/// A clonable poll function.
///
/// Futures are values: cloning one clones the state captured by its poll
/// function, so every poll function must be `Clone`. Closures whose captures
/// are all `Clone` (counters behind `Rc`, other futures, plain data) qualify
/// automatically.
pub trait PollFn<I, O, E>: FnMut(I) -> Outcome<O, E> {
    fn clone_box(&self) -> Box<dyn PollFn<I, O, E>>;
}

impl<I, O, E, F> PollFn<I, O, E> for F
where
    F: FnMut(I) -> Outcome<O, E> + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn PollFn<I, O, E>> {
        Box::new(self.clone())
    }
}

impl<I, O, E> Clone for Box<dyn PollFn<I, O, E>> {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}

/// A deferred computation from `I` to `O` that may fail with `E`.
///
/// Settle-once: after [`poll`](Future::poll) first returns a resolved or
/// rejected outcome, the poll function is never invoked again and every
/// later poll returns the cached outcome, whatever the input.
pub struct Future<I, O, E = Error> {
    poll_fn: Box<dyn PollFn<I, O, E>>,
    result: Outcome<O, E>,
}

impl<I, O, E> Clone for Future<I, O, E>
where
    O: Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            poll_fn: self.poll_fn.clone(),
            result: self.result.clone(),
        }
    }
}

impl<I, O, E> std::fmt::Debug for Future<I, O, E>
where
    O: std::fmt::Debug,
    E: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Future")
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl<I, O, E> Future<I, O, E>
where
    I: 'static,
    O: 'static,
    E: 'static,
{
    pub fn new<F>(poll_fn: F) -> Self
    where
        F: FnMut(I) -> Outcome<O, E> + Clone + 'static,
    {
        Self {
            poll_fn: Box::new(poll_fn),
            result: Outcome::Pending,
        }
    }

    /// A future that is already resolved. Its input is ignored.
    pub fn resolve(value: O) -> Self {
        Self::settled(Outcome::Resolved(value))
    }

    /// A future that is already rejected. Its input is ignored.
    pub fn reject(error: E) -> Self {
        Self::settled(Outcome::Rejected(error))
    }

    fn settled(result: Outcome<O, E>) -> Self {
        Self {
            poll_fn: Box::new(|_: I| Outcome::<O, E>::Pending),
            result,
        }
    }

    /// Drives the computation one step.
    pub fn poll(&mut self, input: I) -> &Outcome<O, E> {
        if self.result.is_pending() {
            self.result = (self.poll_fn)(input);
            if self.result.is_settled() {
                tracing::trace!(state = ?self.result.state(), "future settled");
            }
        }
        &self.result
    }

    /// The cached outcome, without polling.
    pub fn result(&self) -> &Outcome<O, E> {
        &self.result
    }

    pub fn is_settled(&self) -> bool {
        self.result.is_settled()
    }

    pub fn into_result(self) -> Outcome<O, E> {
        self.result
    }
}

impl<O, E> Future<(), O, E>
where
    O: 'static,
    E: 'static,
{
    /// Builds an input-less future from a zero-argument poll function.
    pub fn from_fn<F>(mut poll_fn: F) -> Self
    where
        F: FnMut() -> Outcome<O, E> + Clone + 'static,
    {
        Self::new(move |()| poll_fn())
    }
}

impl<I, O, E> Future<I, O, E>
where
    I: 'static,
    O: Clone + 'static,
    E: Clone + 'static,
{
    /// Runs `next` with this future's resolved value.
    ///
    /// The composed future is pending while `self` is pending. If `self`
    /// rejects, the error is converted with `G::from` and `next` is never
    /// polled, so none of its side effects happen.
    pub fn and_then<N, G>(self, next: Future<O, N, G>) -> Future<I, N, G>
    where
        N: Clone + 'static,
        G: From<E> + Clone + 'static,
    {
        let mut upstream = self;
        let mut next = next;

        Future::new(move |input: I| match upstream.poll(input) {
            Outcome::Pending => Outcome::Pending,
            Outcome::Rejected(error) => Outcome::Rejected(G::from(error.clone())),
            Outcome::Resolved(value) => next.poll(value.clone()).clone(),
        })
    }

    /// Value to value.
    pub fn map<N, F>(self, mut f: F) -> Future<I, N, E>
    where
        N: Clone + 'static,
        F: FnMut(O) -> N + Clone + 'static,
    {
        self.and_then(Future::new(move |value: O| Outcome::Resolved(f(value))))
    }

    /// Value to nothing.
    pub fn consume<F>(self, mut f: F) -> Future<I, (), E>
    where
        F: FnMut(O) + Clone + 'static,
    {
        self.and_then(Future::new(move |value: O| {
            f(value);
            Outcome::Resolved(())
        }))
    }
}

impl<I, E> Future<I, (), E>
where
    I: 'static,
    E: Clone + 'static,
{
    /// Nothing to value.
    pub fn produce<N, F>(self, mut f: F) -> Future<I, N, E>
    where
        N: Clone + 'static,
        F: FnMut() -> N + Clone + 'static,
    {
        self.and_then(Future::from_fn(move || Outcome::Resolved(f())))
    }

    /// Nothing to nothing.
    pub fn then_run<F>(self, mut f: F) -> Future<I, (), E>
    where
        F: FnMut() + Clone + 'static,
    {
        self.and_then(Future::from_fn(move || {
            f();
            Outcome::Resolved(())
        }))
    }
}
