//! One-shot timeouts and periodic intervals against an injected clock.
//!
//! The timer does nothing on its own: either the host calls
//! [`Timer::tick`] from its loop, or [`Timer::attach_to_loop`] makes every
//! tick reschedule the next one through the [`Scheduler`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tempo_core::{Clock, SystemClock};

use crate::Scheduler;

/// Handle returned by the `set_*` methods. Unique per [`Timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

struct TimeoutEntry {
    id: TimerId,
    // Tick generation the entry was created in.
    born: u64,
    fire_at: u64,
    callback: Box<dyn FnOnce()>,
}

struct IntervalEntry {
    born: u64,
    next_fire: u64,
    period: u64,
    // Taken out while the callback runs.
    callback: Option<Box<dyn FnMut() -> ControlFlow<()>>>,
}

#[derive(Default)]
struct Entries {
    next_id: u64,
    // Bumped at the start of every tick. Entries born in the running
    // generation wait for the next tick.
    generation: u64,
    // Sorted by `fire_at`; equal times keep insertion order.
    timeouts: VecDeque<TimeoutEntry>,
    intervals: FxHashMap<TimerId, IntervalEntry>,
}

impl Entries {
    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn start_tick(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

pub struct Timer {
    clock: Rc<dyn Clock>,
    scheduler: Rc<dyn Scheduler>,
    entries: RefCell<Entries>,
    attached: Cell<bool>,
    tick_requested: Cell<bool>,
    this: Weak<Timer>,
}

impl Timer {
    pub fn new(clock: impl Clock + 'static, scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            clock: Rc::new(clock),
            scheduler,
            entries: RefCell::new(Entries::default()),
            attached: Cell::new(false),
            tick_requested: Cell::new(false),
            this: this.clone(),
        })
    }

    /// A timer on the platform clock.
    pub fn with_system_clock(scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
        Self::new(SystemClock, scheduler)
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Runs `callback` once, `delay_ms` from now.
    pub fn set_timeout(&self, callback: impl FnOnce() + 'static, delay_ms: u64) -> TimerId {
        let fire_at = self.clock.now_ms().saturating_add(delay_ms);
        let mut entries = self.entries.borrow_mut();
        let id = entries.allocate_id();

        let at = entries.timeouts.partition_point(|t| t.fire_at <= fire_at);
        let born = entries.generation;
        entries.timeouts.insert(
            at,
            TimeoutEntry {
                id,
                born,
                fire_at,
                callback: Box::new(callback),
            },
        );

        tracing::trace!(id = id.0, fire_at, "timeout set");
        id
    }

    /// Runs `callback` on the next tick.
    pub fn set_immediate(&self, callback: impl FnOnce() + 'static) -> TimerId {
        self.set_timeout(callback, 0)
    }

    /// Runs `callback` every `period_ms` until the interval is cleared.
    pub fn set_interval(&self, mut callback: impl FnMut() + 'static, period_ms: u64) -> TimerId {
        self.set_interval_with(
            move || {
                callback();
                ControlFlow::Continue(())
            },
            period_ms,
        )
    }

    /// Runs `callback` every `period_ms` until it returns `Break` or the
    /// interval is cleared.
    pub fn set_interval_with(
        &self,
        callback: impl FnMut() -> ControlFlow<()> + 'static,
        period_ms: u64,
    ) -> TimerId {
        let next_fire = self.clock.now_ms().saturating_add(period_ms);
        let mut entries = self.entries.borrow_mut();
        let id = entries.allocate_id();
        let born = entries.generation;

        entries.intervals.insert(
            id,
            IntervalEntry {
                born,
                next_fire,
                period: period_ms,
                callback: Some(Box::new(callback)),
            },
        );

        tracing::trace!(id = id.0, period_ms, "interval set");
        id
    }

    /// Polls `condition` every `period_ms` until it returns `Break`.
    ///
    /// If it has not done so `timeout_ms` from now, `on_timeout` runs once and
    /// the interval is removed. This is the building block for "retry until it
    /// works or give up" loops.
    pub fn set_interval_until(
        &self,
        mut condition: impl FnMut() -> ControlFlow<()> + 'static,
        period_ms: u64,
        on_timeout: impl FnOnce() + 'static,
        timeout_ms: u64,
    ) -> TimerId {
        let clock = self.clock.clone();
        let deadline = clock.now_ms().saturating_add(timeout_ms);
        let mut on_timeout = Some(on_timeout);

        self.set_interval_with(
            move || {
                let flow = condition();
                if flow.is_continue() && deadline <= clock.now_ms() {
                    if let Some(on_timeout) = on_timeout.take() {
                        tracing::debug!(deadline, "interval gave up");
                        on_timeout();
                    }
                    return ControlFlow::Break(());
                }
                flow
            },
            period_ms,
        )
    }

    /// Runs `callback` on every tick.
    pub fn set_on_loop(&self, callback: impl FnMut() + 'static) -> TimerId {
        self.set_interval(callback, 0)
    }

    /// [`set_interval_until`](Self::set_interval_until) checked on every tick.
    pub fn set_on_loop_until(
        &self,
        condition: impl FnMut() -> ControlFlow<()> + 'static,
        on_timeout: impl FnOnce() + 'static,
        timeout_ms: u64,
    ) -> TimerId {
        self.set_interval_until(condition, 0, on_timeout, timeout_ms)
    }

    /// Unknown or already fired ids are ignored.
    pub fn clear_timeout(&self, id: TimerId) {
        let mut entries = self.entries.borrow_mut();
        if let Some(at) = entries.timeouts.iter().position(|t| t.id == id) {
            entries.timeouts.remove(at);
        }
    }

    /// Unknown or already stopped ids are ignored. Safe to call from inside
    /// the interval's own callback.
    pub fn clear_interval(&self, id: TimerId) {
        self.entries.borrow_mut().intervals.remove(&id);
    }

    pub fn pending_timeouts(&self) -> usize {
        self.entries.borrow().timeouts.len()
    }

    pub fn pending_intervals(&self) -> usize {
        self.entries.borrow().intervals.len()
    }

    /// Fires everything that is due.
    ///
    /// Entries created by callbacks during this tick are left for the next
    /// one. No borrow of the timer is held while a callback runs.
    pub fn tick(&self) {
        let now = self.clock.now_ms();
        let current = self.entries.borrow_mut().start_tick();

        self.fire_timeouts(now, current);
        self.fire_intervals(now, current);

        if self.attached.get() {
            self.request_tick();
        }
    }

    fn fire_timeouts(&self, now: u64, current: u64) {
        loop {
            let entry = {
                let mut entries = self.entries.borrow_mut();
                let due = entries
                    .timeouts
                    .iter()
                    .take_while(|t| t.fire_at <= now)
                    .position(|t| t.born != current);
                due.and_then(|at| entries.timeouts.remove(at))
            };

            let Some(entry) = entry else {
                break;
            };

            tracing::debug!(id = entry.id.0, fire_at = entry.fire_at, now, "timeout fired");
            (entry.callback)();
        }
    }

    fn fire_intervals(&self, now: u64, current: u64) {
        let mut due: SmallVec<[TimerId; 8]> = self
            .entries
            .borrow()
            .intervals
            .iter()
            .filter(|(_, entry)| entry.born != current && entry.next_fire <= now)
            .map(|(id, _)| *id)
            .collect();
        due.sort_unstable();

        for id in due {
            let callback = self
                .entries
                .borrow_mut()
                .intervals
                .get_mut(&id)
                .and_then(|entry| entry.callback.take());

            // Cleared by an earlier callback in this tick.
            let Some(mut callback) = callback else {
                continue;
            };

            let flow = callback();

            let mut entries = self.entries.borrow_mut();
            match flow {
                ControlFlow::Break(()) => {
                    tracing::debug!(id = id.0, "interval stopped");
                    entries.intervals.remove(&id);
                }
                ControlFlow::Continue(()) => {
                    if let Some(entry) = entries.intervals.get_mut(&id) {
                        entry.next_fire = self.clock.now_ms().saturating_add(entry.period);
                        entry.callback = Some(callback);
                    }
                }
            }
        }
    }

    /// Makes the timer drive itself: every tick schedules the next one.
    pub fn attach_to_loop(&self) {
        self.attached.set(true);
        self.request_tick();
    }

    /// Stops self-driving. The host must call [`tick`](Self::tick) again.
    pub fn detach_from_loop(&self) {
        self.attached.set(false);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn request_tick(&self) {
        if self.tick_requested.replace(true) {
            return;
        }

        let this = self.this.clone();
        self.scheduler.schedule(Box::new(move || {
            let Some(timer) = this.upgrade() else {
                return;
            };
            timer.tick_requested.set(false);
            if timer.attached.get() {
                timer.tick();
            }
        }));
    }
}
