//! One-shot timers behind a small scheduling trait.
//!
//! [`VirtualClock`] is the deterministic implementation: time only moves when
//! [`advance`](VirtualClock::advance) is called, and due tasks run in
//! `(due time, scheduling order)` order.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

/// Deferred work run once by a [`Scheduler`].
pub type Task = Box<dyn FnOnce()>;

/// Identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Runs tasks after a delay on the host's event loop.
pub trait Scheduler {
    /// Run `task` once after `delay_ms`. Negative or NaN delays count as zero.
    fn schedule(&self, delay_ms: f64, task: Task) -> TimerId;

    /// Drop a task that has not run yet. Returns `false` if it already ran or
    /// was already cancelled.
    fn cancel(&self, timer: TimerId) -> bool;
}

struct Pending {
    id: TimerId,
    due_ms: f64,
    task: Task,
}

#[derive(Default)]
struct ClockState {
    now_ms: f64,
    next_id: u64,
    queue: Vec<Pending>,
}

impl ClockState {
    /// Remove the earliest task due at or before `limit_ms`.
    fn pop_due(&mut self, limit_ms: f64) -> Option<Pending> {
        // ids grow with scheduling order, so they break ties between equal due times
        let index = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= limit_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(index, _)| index)?;
        Some(self.queue.swap_remove(index))
    }
}

/// Manually driven clock implementing [`Scheduler`].
///
/// Clones share the same timeline.
#[derive(Clone, Default)]
pub struct VirtualClock {
    state: Rc<RefCell<ClockState>>,
}

impl fmt::Debug for VirtualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("VirtualClock")
            .field("now_ms", &state.now_ms)
            .field("pending", &state.queue.len())
            .finish()
    }
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.state.borrow().now_ms
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Move time forward by `delta_ms`, running every task that falls due.
    ///
    /// Tasks scheduled by running tasks also run if they fall due before the
    /// end of the window. Returns how many tasks ran.
    pub fn advance(&self, delta_ms: f64) -> usize {
        let target = self.now_ms() + delta_ms.max(0.0);
        let mut ran = 0;

        loop {
            // the borrow must end before the task runs: tasks may schedule more work
            let next = self.state.borrow_mut().pop_due(target);
            let Some(pending) = next else { break };

            self.state.borrow_mut().now_ms = pending.due_ms;
            trace!(timer = pending.id.0, at_ms = pending.due_ms, "timer fired");
            (pending.task)();
            ran += 1;
        }

        self.state.borrow_mut().now_ms = target;
        ran
    }

    /// Advance to the last pending task, running everything.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let last_due = {
                let state = self.state.borrow();
                state
                    .queue
                    .iter()
                    .map(|p| p.due_ms)
                    .fold(None, |acc: Option<f64>, due| Some(acc.map_or(due, |a| a.max(due))))
                    .map(|due| due - state.now_ms)
            };
            match last_due {
                Some(delta) => ran += self.advance(delta),
                None => return ran,
            }
        }
    }
}

impl Scheduler for VirtualClock {
    fn schedule(&self, delay_ms: f64, task: Task) -> TimerId {
        let mut state = self.state.borrow_mut();
        let delay = if delay_ms.is_nan() { 0.0 } else { delay_ms.max(0.0) };
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let due_ms = state.now_ms + delay;
        trace!(timer = id.0, due_ms, "timer scheduled");
        state.queue.push(Pending { id, due_ms, task });
        id
    }

    fn cancel(&self, timer: TimerId) -> bool {
        let mut state = self.state.borrow_mut();
        match state.queue.iter().position(|p| p.id == timer) {
            Some(index) => {
                state.queue.swap_remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Rc<RefCell<Vec<(&'static str, f64)>>>;

    fn recorder() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn push(clock: &VirtualClock, log: &Log, label: &'static str) -> Task {
        let clock = clock.clone();
        let log = Rc::clone(log);
        Box::new(move || log.borrow_mut().push((label, clock.now_ms())))
    }

    #[test]
    fn test_tasks_run_in_due_order() {
        let clock = VirtualClock::new();
        let log = recorder();
        clock.schedule(200.0, push(&clock, &log, "c"));
        clock.schedule(0.0, push(&clock, &log, "a"));
        clock.schedule(100.0, push(&clock, &log, "b"));

        assert_eq!(clock.advance(150.0), 2);
        assert_eq!(clock.now_ms(), 150.0);
        assert_eq!(clock.advance(50.0), 1);
        assert_eq!(*log.borrow(), vec![("a", 0.0), ("b", 100.0), ("c", 200.0)]);
    }

    #[test]
    fn test_equal_due_times_keep_scheduling_order() {
        let clock = VirtualClock::new();
        let log = recorder();
        for label in ["first", "second", "third"] {
            clock.schedule(10.0, push(&clock, &log, label));
        }
        clock.advance(10.0);
        let labels: Vec<_> = log.borrow().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_cancel() {
        let clock = VirtualClock::new();
        let log = recorder();
        let id = clock.schedule(10.0, push(&clock, &log, "never"));
        assert!(clock.cancel(id));
        assert!(!clock.cancel(id));
        assert_eq!(clock.advance(100.0), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_nested_scheduling_within_window() {
        let clock = VirtualClock::new();
        let log = recorder();
        let inner_clock = clock.clone();
        let inner_log = Rc::clone(&log);
        clock.schedule(
            10.0,
            Box::new(move || {
                let task = push(&inner_clock, &inner_log, "nested");
                inner_clock.schedule(5.0, task);
            }),
        );

        assert_eq!(clock.advance(20.0), 2);
        assert_eq!(*log.borrow(), vec![("nested", 15.0)]);
    }

    #[test]
    fn test_negative_and_nan_delays_run_immediately() {
        let clock = VirtualClock::new();
        let log = recorder();
        clock.schedule(-50.0, push(&clock, &log, "neg"));
        clock.schedule(f64::NAN, push(&clock, &log, "nan"));
        assert_eq!(clock.advance(0.0), 2);
    }

    #[test]
    fn test_run_until_idle() {
        let clock = VirtualClock::new();
        let log = recorder();
        clock.schedule(30.0, push(&clock, &log, "a"));
        clock.schedule(500.0, push(&clock, &log, "b"));
        assert_eq!(clock.run_until_idle(), 2);
        assert_eq!(clock.now_ms(), 500.0);
        assert_eq!(clock.pending(), 0);
    }
}
