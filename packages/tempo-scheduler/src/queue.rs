use std::cell::RefCell;
use std::collections::VecDeque;

/// A FIFO queue of one-shot callbacks.
/// Single-threaded, so a RefCell<VecDeque> is enough.
#[derive(Default)]
pub struct TaskQueue {
    queue: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
        }
    }

    pub fn push(&self, task: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push_back(task);
    }

    pub fn pop(&self) -> Option<Box<dyn FnOnce()>> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Runs the tasks that were queued when the call started.
    ///
    /// Tasks pushed while draining wait for the next call, so a task that
    /// keeps rescheduling itself cannot starve the caller. The borrow is
    /// released before each task runs.
    pub fn drain(&self) -> usize {
        let batch = self.len();
        let mut ran = 0;
        while ran < batch {
            let Some(task) = self.pop() else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }
}
