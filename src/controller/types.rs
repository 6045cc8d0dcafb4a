/*!
 * Controller Types
 * Per-tick records and the context switch log
 */

use crate::core::serde::is_none;
use crate::core::types::{ProcessId, Quantum, Tick, IDLE_LABEL};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conceptual controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No process selected
    Idle,
    /// A scheduling decision is in progress
    Switching,
    /// A process holds the CPU
    Running,
    /// Every process completed
    Finished,
}

/// Observable outcome of one tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TickRecord {
    pub time: Tick,
    /// Process that ran this tick, `None` when idle
    #[serde(skip_serializing_if = "is_none")]
    pub process_id: Option<ProcessId>,
    pub run_time: u64,
    pub duration: u64,
    /// Ticks used of the current quantum, including this one
    pub quantum_progress: u64,
    pub quantum: Quantum,
    /// A scheduling decision changed the selected process this tick
    pub switched: bool,
    /// The running process finished its work this tick
    pub completed: bool,
}

impl TickRecord {
    /// Selected process id, or "idle"
    pub fn label(&self) -> &str {
        self.process_id.as_deref().unwrap_or(IDLE_LABEL)
    }

    pub fn is_idle(&self) -> bool {
        self.process_id.is_none()
    }
}

impl fmt::Display for TickRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.process_id {
            Some(id) => write!(
                f,
                "[t={}] Running {} (runtime={}/{}, quantum={}/{})",
                self.time, id, self.run_time, self.duration, self.quantum_progress, self.quantum
            ),
            None => write!(f, "[t={}] CPU idle", self.time),
        }
    }
}

/// A scheduling decision that changed the selected process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextSwitch {
    pub time: Tick,
    pub from: Option<ProcessId>,
    pub to: Option<ProcessId>,
}

impl fmt::Display for ContextSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[t={}] {} -> {}",
            self.time,
            self.from.as_deref().unwrap_or(IDLE_LABEL),
            self.to.as_deref().unwrap_or(IDLE_LABEL)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_display() {
        let record = TickRecord {
            time: 3,
            process_id: Some("P2".into()),
            run_time: 1,
            duration: 2,
            quantum_progress: 1,
            quantum: 4,
            switched: true,
            completed: false,
        };
        assert_eq!(record.to_string(), "[t=3] Running P2 (runtime=1/2, quantum=1/4)");
        assert_eq!(record.label(), "P2");
    }

    #[test]
    fn test_idle_record() {
        let record = TickRecord {
            time: 0,
            process_id: None,
            run_time: 0,
            duration: 0,
            quantum_progress: 0,
            quantum: 1,
            switched: false,
            completed: false,
        };
        assert!(record.is_idle());
        assert_eq!(record.label(), "idle");
        assert_eq!(record.to_string(), "[t=0] CPU idle");
    }

    #[test]
    fn test_switch_display() {
        let switch = ContextSwitch {
            time: 5,
            from: None,
            to: Some("P1".into()),
        };
        assert_eq!(switch.to_string(), "[t=5] idle -> P1");
    }
}
