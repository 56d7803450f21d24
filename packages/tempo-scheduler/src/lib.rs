pub mod executor;
pub mod queue;
pub mod scheduler;
pub mod task;
pub mod timer;

use std::rc::Rc;

/// The platform scheduling primitive.
///
/// Implementations run each submitted callback once, on a later turn of the
/// host run loop, in submission order. The executor and the timer use it to
/// re-yield to the host instead of spinning.
pub trait Scheduler {
    fn schedule(&self, task: Box<dyn FnOnce()>);
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, task: Box<dyn FnOnce()>) {
        (**self).schedule(task);
    }
}

pub use executor::Executor;
pub use queue::TaskQueue;
pub use scheduler::LocalScheduler;
pub use task::Task;
pub use timer::{Timer, TimerId};
