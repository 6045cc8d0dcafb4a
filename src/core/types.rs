/*!
 * Core Types
 * Common types used across the simulator
 */

/// Logical time, counted in ticks since the clock was last reset
pub type Tick = u64;

/// Process identifier as given by the configuration
pub type ProcessId = String;

/// Priority level (higher is more urgent)
pub type Priority = i32;

/// Consecutive ticks a process may hold the CPU before a re-scheduling decision
pub type Quantum = u64;

/// Common result type for simulator operations
pub type SimResult<T> = Result<T, super::errors::SimError>;

/// Default tick cadence for automatic clock mode
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Upper bound for joining the background ticker on stop
pub const CLOCK_JOIN_TIMEOUT_MS: u64 = 200;

/// Label used in logs and tick records when no process holds the CPU
pub const IDLE_LABEL: &str = "idle";
