/*!
 * Simulation Controller
 * Subscribes to clock ticks and drives scheduling, execution and the timeline
 */

mod state;
pub mod types;

pub use types::{ContextSwitch, Phase, TickRecord};

use crate::clock::{Clock, ListenerId, ListenerRegistry};
use crate::config::SchedulerConfig;
use crate::core::types::{Quantum, SimResult, Tick};
use crate::process::{Process, ProcessSnapshot};
use crate::report::SimulationReport;
use crate::scheduler::{Policy, Scheduler};
use crate::timeline::Timeline;
use flume::{Receiver, Sender};
use parking_lot::Mutex;
use state::ControllerState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Orchestrates one simulation run
///
/// Owns the scheduler and the timeline; shares the clock with its creator.
/// The tick handler runs on whichever thread ticks the clock, so automatic
/// and manual driving must not overlap.
pub struct Controller {
    clock: Clock,
    algorithm_name: String,
    policy: Option<Policy>,
    state: Arc<Mutex<ControllerState>>,
    records: Arc<ListenerRegistry<TickRecord>>,
    finished_rx: Receiver<Tick>,
    listener_id: ListenerId,
}

impl Controller {
    /// Build a controller for `config` and subscribe it to `clock`.
    ///
    /// An unknown algorithm name falls back to FIFO with a warning.
    pub fn new(clock: Clock, config: SchedulerConfig) -> Self {
        let policy = match Policy::from_name(&config.algorithm_name) {
            Some(policy) => policy,
            None => {
                warn!(
                    algorithm = %config.algorithm_name,
                    "Unknown scheduling algorithm, falling back to FIFO"
                );
                Policy::Fifo
            }
        };
        Self::build(clock, config, policy.build(), Some(policy))
    }

    /// Build a controller around a caller-supplied strategy
    pub fn with_scheduler(clock: Clock, config: SchedulerConfig, scheduler: Box<dyn Scheduler>) -> Self {
        Self::build(clock, config, scheduler, None)
    }

    fn build(
        clock: Clock,
        config: SchedulerConfig,
        scheduler: Box<dyn Scheduler>,
        policy: Option<Policy>,
    ) -> Self {
        let quantum = if config.quantum == 0 {
            warn!("Quantum of 0 is not allowed, using 1");
            1
        } else {
            config.quantum
        };

        info!(
            scheduler = scheduler.name(),
            quantum,
            processes = config.processes.len(),
            "Controller initialized"
        );

        let state = Arc::new(Mutex::new(ControllerState::new(
            scheduler,
            quantum,
            config.processes,
        )));
        let records = Arc::new(ListenerRegistry::new());
        let (finished_tx, finished_rx) = flume::bounded(1);

        let listener_id = clock.add_listener(Self::tick_handler(
            Arc::clone(&state),
            Arc::clone(&records),
            clock.downgrade(),
            finished_tx,
        ));

        Self {
            clock,
            algorithm_name: config.algorithm_name,
            policy,
            state,
            records,
            finished_rx,
            listener_id,
        }
    }

    fn tick_handler(
        state: Arc<Mutex<ControllerState>>,
        records: Arc<ListenerRegistry<TickRecord>>,
        clock: crate::clock::WeakClock,
        finished_tx: Sender<Tick>,
    ) -> impl Fn(Tick) + Send + Sync + 'static {
        move |now| {
            // Release the state lock before calling out
            let outcome = state.lock().on_tick(now);

            if let Some(record) = outcome.record {
                records.notify(&record);
            }

            if outcome.just_finished {
                let _ = finished_tx.try_send(now + 1);
                if let Some(clock) = clock.upgrade() {
                    clock.stop();
                }
            }
        }
    }

    /// Start automatic ticking
    pub fn start(&self) {
        info!(scheduler = self.scheduler_name(), "Simulation starting");
        self.clock.start();
    }

    /// Stop automatic ticking
    pub fn stop(&self) {
        self.clock.stop();
        info!(time = self.current_time(), "Simulation stopped");
    }

    /// One manual tick; returns the time it executed
    pub fn step(&self) -> Tick {
        self.clock.tick()
    }

    /// Tick manually until finished or `max_ticks` ticks have run.
    /// Returns the clock time afterwards.
    pub fn run_to_completion(&self, max_ticks: u64) -> Tick {
        let mut ticks = 0;
        while !self.is_finished() && ticks < max_ticks {
            self.clock.tick();
            ticks += 1;
        }
        if !self.is_finished() {
            warn!(max_ticks, "Tick limit reached before all processes completed");
        }
        self.current_time()
    }

    /// Block until the simulation finishes or `timeout` elapses (for automatic mode)
    pub fn wait_finished(&self, timeout: Duration) -> bool {
        if self.is_finished() {
            return true;
        }
        self.finished_rx.recv_timeout(timeout).is_ok() || self.is_finished()
    }

    /// Restore every process, the timeline and the clock to their initial state.
    /// The clock must be stopped.
    pub fn reset(&self) -> SimResult<()> {
        self.clock.reset()?;
        self.state.lock().reset();
        while self.finished_rx.try_recv().is_ok() {}
        info!("Simulation reset");
        Ok(())
    }

    /// Subscribe to per-tick records
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&TickRecord) + Send + Sync + 'static,
    {
        self.records.add(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.records.remove(id)
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn current_time(&self) -> Tick {
        self.clock.current_time()
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().is_finished()
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    /// Time at which the last process completed
    pub fn finish_time(&self) -> Option<Tick> {
        self.state.lock().finish_time
    }

    pub fn scheduler_name(&self) -> &'static str {
        self.state.lock().scheduler_name()
    }

    /// Resolved policy; `None` for a caller-supplied strategy
    pub fn policy(&self) -> Option<Policy> {
        self.policy
    }

    /// Algorithm name as configured, before resolution
    pub fn algorithm_name(&self) -> &str {
        &self.algorithm_name
    }

    pub fn quantum(&self) -> Quantum {
        self.state.lock().quantum()
    }

    /// Copy of the recorded timeline
    pub fn timeline(&self) -> Timeline {
        self.state.lock().timeline.clone()
    }

    pub fn processes(&self) -> Vec<Process> {
        self.state.lock().processes.clone()
    }

    pub fn snapshots(&self) -> Vec<ProcessSnapshot> {
        self.state
            .lock()
            .processes
            .iter()
            .map(Process::snapshot)
            .collect()
    }

    /// Process selected by the most recent decision
    pub fn current_process(&self) -> Option<Process> {
        self.state.lock().current_process().cloned()
    }

    pub fn context_switches(&self) -> Vec<ContextSwitch> {
        self.state.lock().switches.clone()
    }

    pub fn last_record(&self) -> Option<TickRecord> {
        self.state.lock().last_record.clone()
    }

    pub fn idle_ticks(&self) -> u64 {
        self.state.lock().idle_ticks
    }

    /// Selections rejected because the scheduler picked an ineligible process
    pub fn contract_violations(&self) -> u64 {
        self.state.lock().contract_violations
    }

    /// End-of-run statistics for the current state
    pub fn report(&self) -> SimulationReport {
        let state = self.state.lock();
        SimulationReport::build(
            state.scheduler_name(),
            state.quantum(),
            self.clock.current_time(),
            state.is_finished(),
            &state.processes,
            state.switches.len(),
            state.idle_ticks,
            state.timeline.dropped(),
        )
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.clock.remove_listener(self.listener_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use pretty_assertions::assert_eq;

    fn config(name: &str, quantum: Quantum, processes: Vec<Process>) -> SchedulerConfig {
        let mut config = SchedulerConfig::new(name, quantum);
        config.processes = processes;
        config
    }

    #[test]
    fn test_unknown_algorithm_falls_back_to_fifo() {
        crate::monitoring::init_test_tracing();
        let controller = Controller::new(Clock::new(), config("lottery", 1, vec![]));
        assert_eq!(controller.policy(), Some(Policy::Fifo));
        assert_eq!(controller.scheduler_name(), "FIFO");
        assert_eq!(controller.algorithm_name(), "lottery");
    }

    #[test]
    fn test_zero_quantum_clamped() {
        let controller = Controller::new(Clock::new(), config("fifo", 0, vec![]));
        assert_eq!(controller.quantum(), 1);
    }

    #[test]
    fn test_drop_unsubscribes_from_clock() {
        let clock = Clock::new();
        let controller = Controller::new(clock.clone(), config("fifo", 1, vec![]));
        assert_eq!(clock.listener_count(), 1);
        drop(controller);
        assert_eq!(clock.listener_count(), 0);
    }

    #[test]
    fn test_records_published_to_subscribers() {
        let clock = Clock::new();
        let controller = Controller::new(
            clock,
            config("fifo", 2, vec![Process::new("P1", 1, 1, 0)]),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        controller.subscribe(move |r| sink.lock().push(r.label().to_string()));

        controller.run_to_completion(10);
        assert_eq!(*seen.lock(), vec!["idle", "P1"]);
        assert_eq!(controller.current_time(), 2);
    }
}
