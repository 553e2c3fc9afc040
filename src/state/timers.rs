//! Timer Queue - Cancellable one-shot timers on the UI thread
//!
//! Timers never fire on their own. The host's event loop moves the clock
//! forward with [`TimerQueue::advance`] (typically once per frame with the
//! elapsed wall time), and every task that has come due runs right there,
//! on the UI thread.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use spark_infinite_loading::state::TimerQueue;
//!
//! let timers = TimerQueue::new();
//! let handle = timers.set_timeout(Duration::from_millis(100), || println!("fired"));
//!
//! timers.advance(Duration::from_millis(50));  // nothing yet
//! timers.clear_timeout(handle);               // cancelled, never fires
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

// =============================================================================
// TYPES
// =============================================================================

/// Identifies a scheduled task for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

type Task = Box<dyn FnOnce()>;

struct TimerState {
    now: Duration,
    /// Keyed by (due time, scheduling sequence) so ties fire in order.
    tasks: BTreeMap<(Duration, u64), Task>,
    due_by_id: HashMap<u64, Duration>,
    next_id: u64,
}

impl TimerState {
    fn new() -> Self {
        Self {
            now: Duration::ZERO,
            tasks: BTreeMap::new(),
            due_by_id: HashMap::new(),
            next_id: 0,
        }
    }

    /// Remove the earliest task due at or before `target`.
    fn pop_due(&mut self, target: Duration) -> Option<(Duration, Task)> {
        let key = *self.tasks.keys().next()?;
        if key.0 > target {
            return None;
        }
        let task = self.tasks.remove(&key)?;
        self.due_by_id.remove(&key.1);
        Some((key.0, task))
    }
}

// =============================================================================
// TIMER QUEUE
// =============================================================================

/// Single-threaded timer queue on a virtual clock.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct TimerQueue {
    state: Rc<RefCell<TimerState>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(TimerState::new())),
        }
    }

    /// Current clock time (total time advanced so far).
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Schedule `task` to run once `delay` has elapsed.
    ///
    /// A zero delay runs on the next [`advance`](Self::advance) or
    /// [`run_due`](Self::run_due), never synchronously. Nothing scheduled
    /// here runs until the host pumps the queue.
    pub fn set_timeout<F>(&self, delay: Duration, task: F) -> TimerHandle
    where
        F: FnOnce() + 'static,
    {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;

        let due = state.now + delay;
        state.tasks.insert((due, id), Box::new(task));
        state.due_by_id.insert(id, due);
        TimerHandle(id)
    }

    /// Cancel a scheduled task.
    ///
    /// Returns `false` if it already ran or was already cancelled.
    pub fn clear_timeout(&self, handle: TimerHandle) -> bool {
        let mut state = self.state.borrow_mut();
        match state.due_by_id.remove(&handle.0) {
            Some(due) => state.tasks.remove(&(due, handle.0)).is_some(),
            None => false,
        }
    }

    /// Whether a task is still waiting to run.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.state.borrow().due_by_id.contains_key(&handle.0)
    }

    /// Move the clock forward and run every task that comes due.
    ///
    /// Tasks run in due order. A task scheduled by another task runs in the
    /// same call if it falls due before the new time.
    /// Returns the number of tasks run.
    pub fn advance(&self, elapsed: Duration) -> usize {
        let target = self.now() + elapsed;
        let mut ran = 0;

        loop {
            // Borrow released before the task runs: tasks schedule and cancel
            let next = self.state.borrow_mut().pop_due(target);
            let Some((due, task)) = next else {
                break;
            };
            self.state.borrow_mut().now = due;
            task();
            ran += 1;
        }

        self.state.borrow_mut().now = target;
        ran
    }

    /// Run tasks already due without moving the clock.
    pub fn run_due(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// Time until the next task is due, if any.
    pub fn next_due(&self) -> Option<Duration> {
        let state = self.state.borrow();
        state
            .tasks
            .keys()
            .next()
            .map(|(due, _)| due.saturating_sub(state.now))
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TimerQueue")
            .field("now", &state.now)
            .field("pending", &state.tasks.len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
