/*!
 * Controller State
 * Per-tick orchestration: switch decision, selection, execution pass,
 * quantum accounting, timeline update, completion check
 */

use super::types::{ContextSwitch, Phase, TickRecord};
use crate::core::types::{ProcessId, Quantum, Tick};
use crate::process::Process;
use crate::scheduler::Scheduler;
use crate::timeline::{StateTag, Timeline};
use tracing::{debug, info, trace, warn};

/// What a tick produced, handed back to the clock listener
#[derive(Debug, Default)]
pub(super) struct TickOutcome {
    pub record: Option<TickRecord>,
    pub just_finished: bool,
}

/// Scheduler answer located in the list it was given
enum Pick {
    Nothing,
    At(usize),
    Foreign(ProcessId),
}

pub(super) struct ControllerState {
    scheduler: Box<dyn Scheduler>,
    quantum: Quantum,
    pub(super) processes: Vec<Process>,
    /// Tick of each process's last quantum preemption, parallel to `processes`
    preempted_at: Vec<Option<Tick>>,
    current: Option<usize>,
    quantum_used: u64,
    pub(super) timeline: Timeline,
    pub(super) switches: Vec<ContextSwitch>,
    pub(super) phase: Phase,
    pub(super) finish_time: Option<Tick>,
    pub(super) last_record: Option<TickRecord>,
    pub(super) idle_ticks: u64,
    pub(super) contract_violations: u64,
}

impl ControllerState {
    pub(super) fn new(scheduler: Box<dyn Scheduler>, quantum: Quantum, processes: Vec<Process>) -> Self {
        Self {
            scheduler,
            quantum,
            preempted_at: vec![None; processes.len()],
            processes,
            current: None,
            quantum_used: 0,
            timeline: Timeline::new(),
            switches: Vec::new(),
            phase: Phase::Idle,
            finish_time: None,
            last_record: None,
            idle_ticks: 0,
            contract_violations: 0,
        }
    }

    pub(super) fn scheduler_name(&self) -> &'static str {
        self.scheduler.name()
    }

    pub(super) fn quantum(&self) -> Quantum {
        self.quantum
    }

    #[inline]
    pub(super) fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub(super) fn current_process(&self) -> Option<&Process> {
        self.current.map(|idx| &self.processes[idx])
    }

    /// Run one tick at time `now`
    pub(super) fn on_tick(&mut self, now: Tick) -> TickOutcome {
        if self.is_finished() {
            return TickOutcome::default();
        }

        for process in self.processes.iter_mut().filter(|p| p.has_arrived(now)) {
            process.admit();
        }

        // Switch decision
        let previous = self.current;
        let current_done = previous.map_or(true, |idx| self.processes[idx].is_terminated());
        let quantum_expired = !current_done && self.quantum_used >= self.quantum;

        let mut switched = false;
        if current_done || quantum_expired {
            self.phase = Phase::Switching;
            let preempted = if quantum_expired { previous } else { None };
            let selected = self.select(now, preempted);
            self.quantum_used = 0;

            if selected != previous {
                switched = true;
                let switch = ContextSwitch {
                    time: now,
                    from: previous.map(|idx| self.processes[idx].id().to_string()),
                    to: selected.map(|idx| self.processes[idx].id().to_string()),
                };
                debug!(time = now, switch = %switch, "Context switch");
                self.switches.push(switch);
            }
            self.current = selected;
        }

        // Execution pass over every arrived, non-terminated process
        let selected = self.current;
        let mut completed = false;
        for (idx, process) in self.processes.iter_mut().enumerate() {
            if !process.has_arrived(now) || process.is_terminated() {
                continue;
            }

            if Some(idx) == selected {
                completed = process.execute_tick(now);
                self.timeline.record(process.id(), now, now + 1, StateTag::Running);
                if completed {
                    self.timeline
                        .record(process.id(), now, now + 1, StateTag::Terminated);
                    info!(time = now, process = process.id(), wait_time = process.wait_time(), "Process terminated");
                }
            } else {
                process.wait_tick();
                self.timeline.record(process.id(), now, now + 1, StateTag::Waiting);
            }
        }

        // Quantum accounting
        let record = match selected {
            Some(idx) => {
                self.quantum_used += 1;
                self.phase = Phase::Running;
                let process = &self.processes[idx];
                TickRecord {
                    time: now,
                    process_id: Some(process.id().to_string()),
                    run_time: process.run_time(),
                    duration: process.duration(),
                    quantum_progress: self.quantum_used,
                    quantum: self.quantum,
                    switched,
                    completed,
                }
            }
            None => {
                self.idle_ticks += 1;
                self.phase = Phase::Idle;
                TickRecord {
                    time: now,
                    process_id: None,
                    run_time: 0,
                    duration: 0,
                    quantum_progress: 0,
                    quantum: self.quantum,
                    switched,
                    completed: false,
                }
            }
        };
        trace!(time = now, process = record.label(), run_time = record.run_time, quantum = record.quantum_progress, "Tick");

        // Completion check
        let just_finished = self.processes.iter().all(Process::is_completed);
        if just_finished {
            self.phase = Phase::Finished;
            self.finish_time = Some(now + 1);
            info!(time = now + 1, switches = self.switches.len(), "All processes completed");
        }

        self.last_record = Some(record.clone());
        TickOutcome {
            record: Some(record),
            just_finished,
        }
    }

    /// Ask the scheduler for the next process.
    ///
    /// On quantum expiry the scheduler only sees the eligible processes whose
    /// last preemption is the oldest (never preempted counts as oldest), plus
    /// everything ineligible. Every eligible process therefore gets a quantum
    /// before any of them gets a second one.
    fn select(&mut self, now: Tick, preempted: Option<usize>) -> Option<usize> {
        let pick = match preempted {
            Some(idx) => {
                self.preempted_at[idx] = Some(now);
                self.pick_in_rotation(now)
            }
            None => self.pick(&self.processes, now),
        };

        let idx = match pick {
            Pick::Nothing => return None,
            Pick::At(idx) => idx,
            Pick::Foreign(id) => {
                self.contract_violations += 1;
                warn!(
                    time = now,
                    process = %id,
                    scheduler = self.scheduler.name(),
                    "Scheduler selected a process outside the process list; idling this tick"
                );
                return None;
            }
        };

        let process = &self.processes[idx];
        if !process.is_eligible(now) {
            self.contract_violations += 1;
            warn!(
                time = now,
                process = process.id(),
                start_time = process.start_time(),
                state = %process.state(),
                scheduler = self.scheduler.name(),
                "Scheduler selected an ineligible process; idling this tick"
            );
            return None;
        }
        Some(idx)
    }

    fn pick_in_rotation(&self, now: Tick) -> Pick {
        let eligible = |idx: usize| self.processes[idx].is_eligible(now);
        let oldest = (0..self.processes.len())
            .filter(|&idx| eligible(idx))
            .map(|idx| self.preempted_at[idx])
            .min();
        let withheld = |idx: usize| eligible(idx) && oldest.map_or(false, |o| self.preempted_at[idx] > o);

        if !(0..self.processes.len()).any(withheld) {
            return self.pick(&self.processes, now);
        }

        let order: Vec<usize> = (0..self.processes.len()).filter(|&idx| !withheld(idx)).collect();
        let pool: Vec<Process> = order.iter().map(|&idx| self.processes[idx].clone()).collect();
        match self.pick(&pool, now) {
            Pick::At(pos) => Pick::At(order[pos]),
            other => other,
        }
    }

    /// Locate the scheduler's choice within `pool` by address
    fn pick(&self, pool: &[Process], now: Tick) -> Pick {
        match self.scheduler.next_process(pool, now) {
            None => Pick::Nothing,
            Some(chosen) => match pool.iter().position(|p| std::ptr::eq(p, chosen)) {
                Some(pos) => Pick::At(pos),
                None => Pick::Foreign(chosen.id().to_string()),
            },
        }
    }

    pub(super) fn reset(&mut self) {
        for process in &mut self.processes {
            process.reset();
        }
        self.preempted_at.fill(None);
        self.current = None;
        self.quantum_used = 0;
        self.timeline.clear();
        self.switches.clear();
        self.phase = Phase::Idle;
        self.finish_time = None;
        self.last_record = None;
        self.idle_ticks = 0;
        self.contract_violations = 0;
    }
}
