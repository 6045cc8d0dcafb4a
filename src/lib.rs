/*!
 * Scheduling Simulator Library
 * Tick-driven CPU scheduling: clock, strategies, controller and timeline
 */

pub mod clock;
pub mod config;
pub mod controller;
pub mod core;
pub mod monitoring;
pub mod process;
pub mod report;
pub mod scheduler;
pub mod timeline;

// Re-exports
pub use clock::{Clock, ListenerId, ListenerRegistry, WeakClock};
pub use config::{ProcessSpec, SchedulerConfig};
pub use controller::{ContextSwitch, Controller, Phase, TickRecord};
pub use crate::core::errors::{ConfigError, SimError};
pub use crate::core::types::{Priority, ProcessId, Quantum, SimResult, Tick};
pub use monitoring::init_tracing;
pub use process::{Process, ProcessSnapshot, ProcessState};
pub use report::{ProcessReport, SimulationReport};
pub use scheduler::{Fifo, Policy, PriorityScheduler, Scheduler, ShortestRemainingTime};
pub use timeline::{StateTag, Timeline, TimelineEvent};
