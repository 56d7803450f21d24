use crate::Scheduler;
use crate::queue::TaskQueue;

/// In-process host run loop.
///
/// Each [`tick`](LocalScheduler::tick) is one turn of the loop: it runs the
/// callbacks scheduled before the turn began. Callbacks scheduled during the
/// turn run on the next one. Embedded targets call `tick` from their main
/// loop; tests call it by hand to step time deterministically.
#[derive(Default)]
pub struct LocalScheduler {
    queue: TaskQueue,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self {
            queue: TaskQueue::new(),
        }
    }

    /// Runs one turn. Returns `true` if work is left for another turn.
    pub fn tick(&self) -> bool {
        let ran = self.queue.drain();
        tracing::trace!(ran, remaining = self.queue.len(), "scheduler turn");
        !self.queue.is_empty()
    }

    /// Runs turns until the queue is empty or `max_turns` have run.
    /// Returns the number of turns run.
    pub fn run_until_idle(&self, max_turns: usize) -> usize {
        let mut turns = 0;
        while turns < max_turns && !self.is_idle() {
            self.tick();
            turns += 1;
        }
        turns
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Callbacks waiting for a turn.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Scheduler for LocalScheduler {
    fn schedule(&self, task: Box<dyn FnOnce()>) {
        self.queue.push(task);
    }
}
