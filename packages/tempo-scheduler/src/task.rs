use tempo_core::{Future, Outcome, State};

/// A type-erased, poll-once unit of work.
///
/// Futures of any `I`, `O` and `E` are wrapped into the same `Task` type so
/// that one queue can hold all of them. Each call to [`step`](Task::step)
/// polls the wrapped future once; when it rejects, the failure callback runs
/// exactly once before the rejected state is reported.
pub struct Task {
    step: Box<dyn FnMut() -> State>,
}

impl Task {
    pub fn new<I, O, E, F>(future: Future<I, O, E>, input: I, on_error: F) -> Self
    where
        I: Clone + 'static,
        O: 'static,
        E: Clone + 'static,
        F: FnOnce(E) + 'static,
    {
        let mut future = future;
        let mut on_error = Some(on_error);

        Self {
            step: Box::new(move || {
                let outcome = future.poll(input.clone());
                if let Outcome::Rejected(error) = outcome {
                    if let Some(on_error) = on_error.take() {
                        on_error(error.clone());
                    }
                }
                outcome.state()
            }),
        }
    }

    pub fn step(&mut self) -> State {
        (self.step)()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}
