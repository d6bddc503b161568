//! Cooperative tasks: [`TaskHandle`], [`TaskSlot`], [`Tick`], [`Scheduler`].
//!
//! Everything here is single-threaded. A task is plain state advanced by
//! whoever owns its slot, once per scheduler tick. A slot holds at most one
//! live task; starting a new one cancels the previous task before the new
//! one exists.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// TaskHandle (cancellation token)
// ---------------------------------------------------------------------------

/// Lifecycle of a task.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Finished,
    Cancelled,
}

/// Shared view of a task's status, doubling as its cancellation token.
///
/// Clones observe the same task.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    status: Rc<Cell<TaskStatus>>,
}

impl TaskHandle {
    fn new() -> Self {
        Self {
            status: Rc::new(Cell::new(TaskStatus::Running)),
        }
    }

    #[inline]
    pub fn status(&self) -> TaskStatus {
        self.status.get()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.status() == TaskStatus::Running
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status() == TaskStatus::Cancelled
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.status() == TaskStatus::Finished
    }

    /// Request cancellation. No effect once the task has finished.
    #[inline]
    pub fn cancel(&self) {
        if self.is_running() {
            self.status.set(TaskStatus::Cancelled);
        }
    }

    #[inline]
    fn finish(&self) {
        if self.is_running() {
            self.status.set(TaskStatus::Finished);
        }
    }
}

// ---------------------------------------------------------------------------
// Step / TaskSlot
// ---------------------------------------------------------------------------

/// Result of advancing a task by one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step<R> {
    /// The task suspended and wants to be resumed next tick.
    Yield,
    /// The task completed with a result.
    Done(R),
}

/// Holder for at most one live task of type `T`.
pub struct TaskSlot<T> {
    current: Option<(TaskHandle, T)>,
}

impl<T> TaskSlot<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Cancel the current task (if any), then install `task`.
    pub fn start(&mut self, task: T) -> TaskHandle {
        self.cancel();
        let handle = TaskHandle::new();
        self.current = Some((handle.clone(), task));
        handle
    }

    /// Stop and discard the current task. Returns `true` if one was running.
    pub fn cancel(&mut self) -> bool {
        match self.current.take() {
            Some((handle, _)) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Advance the current task with `step`. When it reports
    /// [`Step::Done`], the task is removed, marked finished, and the result
    /// is returned.
    pub fn advance<R>(&mut self, step: impl FnOnce(&mut T) -> Step<R>) -> Option<R> {
        let (_, task) = self.current.as_mut()?;
        match step(task) {
            Step::Yield => None,
            Step::Done(result) => {
                if let Some((handle, _)) = self.current.take() {
                    handle.finish();
                }
                Some(result)
            }
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn task(&self) -> Option<&T> {
        self.current.as_ref().map(|(_, t)| t)
    }
}

impl<T> Default for TaskSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for TaskSlot<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<T> fmt::Debug for TaskSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSlot")
            .field("status", &self.current.as_ref().map(|(h, _)| h.status()))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tick / Scheduler
// ---------------------------------------------------------------------------

/// Whether `dt` is a usable tick length: positive and finite.
#[inline]
pub fn is_valid_dt(dt: f32) -> bool {
    dt.is_finite() && dt > 0.0
}

/// Something advanced once per scheduler tick.
pub trait Tick {
    /// Advance by `dt` units of time.
    fn tick(&mut self, dt: f32);
}

/// Drives registered [`Tick`] participants in registration order.
#[derive(Default)]
pub struct Scheduler {
    participants: Vec<Rc<RefCell<dyn Tick>>>,
    ticks: u64,
    elapsed: f64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant. It is ticked after all earlier participants.
    pub fn add(&mut self, participant: Rc<RefCell<dyn Tick>>) {
        self.participants.push(participant);
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Total simulated time.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Run one tick of `dt` over every participant. A `dt` that is not
    /// positive and finite is skipped without counting as a tick.
    pub fn tick(&mut self, dt: f32) {
        if !is_valid_dt(dt) {
            log::warn!("tick {}: invalid dt {dt}, skipped", self.ticks);
            return;
        }
        for participant in &self.participants {
            match participant.try_borrow_mut() {
                Ok(mut p) => p.tick(dt),
                Err(_) => log::warn!("tick {}: participant already borrowed, skipped", self.ticks),
            }
        }
        self.ticks += 1;
        self.elapsed += f64::from(dt);
    }

    /// Run `n` ticks of `dt`.
    pub fn run(&mut self, dt: f32, n: usize) {
        for _ in 0..n {
            self.tick(dt);
        }
    }

    /// Tick until `done` returns `true` or `max_ticks` is reached.
    /// Returns the number of ticks run.
    pub fn run_until(&mut self, dt: f32, max_ticks: usize, mut done: impl FnMut() -> bool) -> usize {
        let mut n = 0;
        while n < max_ticks && !done() {
            self.tick(dt);
            n += 1;
        }
        n
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("participants", &self.participants.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_cancels_previous() {
        let mut slot = TaskSlot::new();
        let first = slot.start(1u32);
        assert!(first.is_running());

        let second = slot.start(2u32);
        assert!(first.is_cancelled());
        assert!(second.is_running());
        assert_eq!(slot.task(), Some(&2));
    }

    #[test]
    fn advance_until_done() {
        let mut slot = TaskSlot::new();
        let handle = slot.start(0u32);

        for _ in 0..2 {
            let r = slot.advance(|n| {
                *n += 1;
                if *n == 3 { Step::Done(*n) } else { Step::Yield }
            });
            assert_eq!(r, None);
        }
        let r = slot.advance(|n| {
            *n += 1;
            if *n == 3 { Step::Done(*n) } else { Step::Yield }
        });
        assert_eq!(r, Some(3));
        assert!(handle.is_finished());
        assert!(!slot.is_running());
        assert_eq!(slot.advance(|_| Step::Done(0)), None);
    }

    #[test]
    fn cancel_after_finish_is_noop() {
        let mut slot = TaskSlot::new();
        let handle = slot.start(());
        slot.advance(|_| Step::Done(()));
        handle.cancel();
        assert!(handle.is_finished());
        assert!(!slot.cancel());
    }

    #[test]
    fn dropping_slot_cancels_task() {
        let handle = {
            let mut slot = TaskSlot::new();
            slot.start(())
        };
        assert!(handle.is_cancelled());
    }

    struct Counter {
        tag: u8,
        log: Rc<RefCell<Vec<u8>>>,
    }

    impl Tick for Counter {
        fn tick(&mut self, _dt: f32) {
            self.log.borrow_mut().push(self.tag);
        }
    }

    #[test]
    fn scheduler_ticks_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sched = Scheduler::new();
        for tag in [1, 2] {
            sched.add(Rc::new(RefCell::new(Counter {
                tag,
                log: Rc::clone(&log),
            })));
        }
        sched.run(0.5, 2);
        assert_eq!(*log.borrow(), vec![1, 2, 1, 2]);
        assert_eq!(sched.ticks(), 2);
        assert!((sched.elapsed() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scheduler_skips_bad_dt() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sched = Scheduler::new();
        sched.add(Rc::new(RefCell::new(Counter {
            tag: 1,
            log: Rc::clone(&log),
        })));
        for dt in [-0.1, 0.0, f32::NAN, f32::INFINITY] {
            sched.tick(dt);
        }
        assert!(log.borrow().is_empty());
        assert_eq!(sched.ticks(), 0);
        assert_eq!(sched.elapsed(), 0.0);

        sched.tick(0.25);
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn run_until_stops_early() {
        let mut sched = Scheduler::new();
        let calls = Cell::new(0);
        let n = sched.run_until(0.1, 100, || {
            calls.set(calls.get() + 1);
            calls.get() > 3
        });
        assert_eq!(n, 3);
        assert_eq!(sched.ticks(), 3);
    }
}
