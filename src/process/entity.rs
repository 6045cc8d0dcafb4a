/*!
 * Process Entity
 * Mutable execution state of one schedulable unit
 */

use super::types::{ProcessSnapshot, ProcessState};
use crate::core::types::{Priority, ProcessId, Tick};
use std::fmt;

/// A simulated process
///
/// Identity fields are fixed at construction. Execution state only moves
/// through [`Process::execute_tick`], [`Process::wait_tick`] and
/// [`Process::reset`]; once terminated, ticks leave it untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    id: ProcessId,
    color: u32,
    priority: Priority,
    start_time: Tick,
    duration: u64,

    run_time: u64,
    wait_time: u64,
    state: ProcessState,
    finish_time: Option<Tick>,
}

impl Process {
    /// Create a process in the NEW state
    pub fn new(id: impl Into<ProcessId>, start_time: Tick, duration: u64, priority: Priority) -> Self {
        Self {
            id: id.into(),
            color: 0,
            priority,
            start_time,
            duration,
            run_time: 0,
            wait_time: 0,
            state: ProcessState::New,
            finish_time: None,
        }
    }

    /// Attach a display color (ignored by the scheduling core)
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Arrival tick
    pub fn start_time(&self) -> Tick {
        self.start_time
    }

    /// Total ticks of work required
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn run_time(&self) -> u64 {
        self.run_time
    }

    pub fn wait_time(&self) -> u64 {
        self.wait_time
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Time at which the last unit of work finished (end of the completing tick)
    pub fn finish_time(&self) -> Option<Tick> {
        self.finish_time
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.run_time == self.duration
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    /// Work left, floored at zero
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.duration.saturating_sub(self.run_time)
    }

    #[inline]
    pub fn has_arrived(&self, now: Tick) -> bool {
        self.start_time <= now
    }

    /// Arrived and not terminated
    #[inline]
    pub fn is_eligible(&self, now: Tick) -> bool {
        self.has_arrived(now) && !self.is_terminated() && !self.is_completed()
    }

    /// Run one tick of work at time `now`. Returns true if this tick completed the process.
    pub fn execute_tick(&mut self, now: Tick) -> bool {
        if self.is_terminated() || self.is_completed() {
            return false;
        }

        self.run_time += 1;
        if self.run_time >= self.duration {
            self.run_time = self.duration;
            self.state = ProcessState::Terminated;
            self.finish_time = Some(now + 1);
            true
        } else {
            self.state = ProcessState::Running;
            false
        }
    }

    /// Spend one tick ready but not running
    pub fn wait_tick(&mut self) {
        if self.is_terminated() {
            return;
        }
        self.wait_time += 1;
        self.state = ProcessState::Waiting;
    }

    /// Mark an arrived process as ready before its first decision
    pub fn admit(&mut self) {
        if self.state == ProcessState::New {
            self.state = ProcessState::Ready;
        }
    }

    /// Restore the NEW state with zeroed counters
    pub fn reset(&mut self) {
        self.run_time = 0;
        self.wait_time = 0;
        self.state = ProcessState::New;
        self.finish_time = None;
    }

    /// Structured view of every field
    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            id: self.id.clone(),
            color: self.color,
            priority: self.priority,
            start_time: self.start_time,
            duration: self.duration,
            run_time: self.run_time,
            wait_time: self.wait_time,
            remaining: self.remaining(),
            state: self.state,
            completed: self.is_completed(),
            finish_time: self.finish_time,
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Process {} [start={}, duration={}, priority={}, state={}]",
            self.id, self.start_time, self.duration, self.priority, self.state
        )
    }
}
