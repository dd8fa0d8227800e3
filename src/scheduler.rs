//! Cooperative periodic-task scheduler.
//!
//! The main loop calls [`Scheduler::tick`] with a monotonic millisecond
//! timestamp.  Every task that is due is reported to a
//! [`SchedulerDelegate`], which runs it to completion before the next
//! task is considered.  Nothing here blocks, preempts or cancels.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  main loop ──tick(now_ms)──▶ Scheduler                   │
//! │                                 │                        │
//! │                     due tasks, registration order        │
//! │                                 ▼                        │
//! │                       SchedulerDelegate                  │
//! │                 (Filter → filter_tick, Diagnostics →     │
//! │                  report_diagnostics)                     │
//! └──────────────────────────────────────────────────────────┘
//! ```

use log::info;

use crate::app::ports::{SchedulerDelegate, TaskId, TaskScheduler};
use crate::error::SchedulerError;

/// Maximum number of registered tasks (stack-allocated).
const MAX_TASKS: usize = 4;

/// Internal bookkeeping for a registered task.
#[derive(Debug, Clone)]
struct TaskEntry {
    task: TaskId,
    period_ms: u32,
    /// Absolute time at which the task next fires.
    next_due_ms: u64,
    /// Number of times the task has fired.
    runs: u64,
}

/// The scheduler engine.
///
/// Decoupled from what the tasks do: when one fires it invokes the
/// [`SchedulerDelegate`] callback.  This keeps the scheduler independently
/// testable.
pub struct Scheduler {
    tasks: [Option<TaskEntry>; MAX_TASKS],
    /// Time of the most recent `tick`.  Registration delays count from here.
    now_ms: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: [None, None, None, None],
            now_ms: 0,
        }
    }

    /// Run every task that is due at `now_ms`.
    ///
    /// A task fires at most once per call.  If the loop fell behind by more
    /// than one period the task catches up on the following calls, one run
    /// each, keeping its original phase.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        self.now_ms = now_ms;
        for entry in self.tasks.iter_mut().flatten() {
            if now_ms >= entry.next_due_ms {
                entry.next_due_ms += u64::from(entry.period_ms);
                entry.runs += 1;
                delegate.on_task_due(entry.task);
            }
        }
    }

    /// Number of registered tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.iter().flatten().count()
    }

    /// How many times `task` has fired so far.
    pub fn runs(&self, task: TaskId) -> u64 {
        self.tasks
            .iter()
            .flatten()
            .filter(|e| e.task == task)
            .map(|e| e.runs)
            .sum()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScheduler for Scheduler {
    /// Add a task.  Its first run is `initial_delay_ms` after the most
    /// recent tick (or time zero).
    fn register(
        &mut self,
        task: TaskId,
        initial_delay_ms: u32,
        period_ms: u32,
    ) -> Result<(), SchedulerError> {
        if period_ms == 0 {
            return Err(SchedulerError::ZeroPeriod);
        }
        let now_ms = self.now_ms;
        let (i, slot) = self
            .tasks
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or(SchedulerError::Full)?;

        info!(
            "Scheduler: {:?} at slot {} (delay {}ms, every {}ms)",
            task, i, initial_delay_ms, period_ms
        );
        *slot = Some(TaskEntry {
            task,
            period_ms,
            next_due_ms: now_ms + u64::from(initial_delay_ms),
            runs: 0,
        });
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
