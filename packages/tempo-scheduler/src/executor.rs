use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tempo_core::{Future, State};

use crate::Scheduler;
use crate::task::Task;

/// Cooperative FIFO driver for futures.
///
/// Every tick polls only the task at the head of the queue. A settled head is
/// popped (its failure callback runs first if it rejected) and, while tasks
/// remain, another tick is requested from the [`Scheduler`] so the host loop
/// gets control back between polls.
///
/// A head that never settles blocks every task queued after it. There is no
/// backpressure either: callers bound the queue themselves.
pub struct Executor {
    scheduler: Rc<dyn Scheduler>,
    tasks: RefCell<VecDeque<Task>>,
    tick_requested: Cell<bool>,
    this: Weak<Executor>,
}

impl Executor {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            scheduler,
            tasks: RefCell::new(VecDeque::new()),
            tick_requested: Cell::new(false),
            this: this.clone(),
        })
    }

    /// Queues `future` to be polled with `input` until it settles.
    /// A rejection is dropped silently; use [`execute_with`](Self::execute_with)
    /// to observe it.
    pub fn execute<I, O, E>(&self, future: Future<I, O, E>, input: I)
    where
        I: Clone + 'static,
        O: 'static,
        E: Clone + 'static,
    {
        self.execute_with(future, input, |_: E| {});
    }

    /// Queues `future` and calls `on_error` once if it rejects.
    pub fn execute_with<I, O, E, F>(&self, future: Future<I, O, E>, input: I, on_error: F)
    where
        I: Clone + 'static,
        O: 'static,
        E: Clone + 'static,
        F: FnOnce(E) + 'static,
    {
        self.submit(Task::new(future, input, on_error));
    }

    pub fn spawn<O, E>(&self, future: Future<(), O, E>)
    where
        O: 'static,
        E: Clone + 'static,
    {
        self.execute(future, ());
    }

    pub fn spawn_with<O, E, F>(&self, future: Future<(), O, E>, on_error: F)
    where
        O: 'static,
        E: Clone + 'static,
        F: FnOnce(E) + 'static,
    {
        self.execute_with(future, (), on_error);
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    fn submit(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
        tracing::trace!(queued = self.len(), "task submitted");
        self.request_tick();
    }

    // At most one tick request is outstanding at a time.
    fn request_tick(&self) {
        if self.tick_requested.replace(true) {
            return;
        }

        let this = self.this.clone();
        self.scheduler.schedule(Box::new(move || {
            if let Some(executor) = this.upgrade() {
                executor.tick();
            }
        }));
    }

    fn tick(&self) {
        self.tick_requested.set(false);

        // The head is taken out while it runs so that it can submit new tasks.
        let Some(mut head) = self.tasks.borrow_mut().pop_front() else {
            return;
        };

        let state = head.step();
        if state == State::Pending {
            self.tasks.borrow_mut().push_front(head);
        } else {
            tracing::debug!(?state, remaining = self.len(), "task finished");
        }

        if !self.is_empty() {
            self.request_tick();
        }
    }
}
