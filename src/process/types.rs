/*!
 * Process Types
 * Common types for process state and reporting
 */

use crate::core::serde::is_none;
use crate::core::types::{Priority, ProcessId, Tick};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Created by the configuration, not yet touched by a tick
    New,
    /// Arrived and waiting for its first scheduling decision
    Ready,
    /// Executed during the most recent tick
    Running,
    /// Arrived but not selected during the most recent tick
    Waiting,
    /// All work done; no further mutation
    Terminated,
}

impl ProcessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessState::New => "NEW",
            ProcessState::Ready => "READY",
            ProcessState::Running => "RUNNING",
            ProcessState::Waiting => "WAITING",
            ProcessState::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a process with a fixed set of fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessSnapshot {
    pub id: ProcessId,
    pub color: u32,
    pub priority: Priority,
    pub start_time: Tick,
    pub duration: u64,
    pub run_time: u64,
    pub wait_time: u64,
    pub remaining: u64,
    pub state: ProcessState,
    pub completed: bool,
    #[serde(skip_serializing_if = "is_none")]
    pub finish_time: Option<Tick>,
}

impl ProcessSnapshot {
    /// Field names in display order
    pub const KEYS: [&'static str; 11] = [
        "id",
        "color",
        "priority",
        "start_time",
        "duration",
        "run_time",
        "wait_time",
        "remaining",
        "state",
        "completed",
        "finish_time",
    ];

    /// Key-value pairs in the order of [`ProcessSnapshot::KEYS`]
    pub fn entries(&self) -> [(&'static str, String); 11] {
        let finish = self
            .finish_time
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        [
            ("id", self.id.clone()),
            ("color", self.color.to_string()),
            ("priority", self.priority.to_string()),
            ("start_time", self.start_time.to_string()),
            ("duration", self.duration.to_string()),
            ("run_time", self.run_time.to_string()),
            ("wait_time", self.wait_time.to_string()),
            ("remaining", self.remaining.to_string()),
            ("state", self.state.to_string()),
            ("completed", self.completed.to_string()),
            ("finish_time", finish),
        ]
    }
}

impl fmt::Display for ProcessSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_labels() {
        assert_eq!(ProcessState::New.to_string(), "NEW");
        assert_eq!(ProcessState::Terminated.as_str(), "TERMINATED");
    }

    #[test]
    fn test_state_serde_snake_case() {
        let json = serde_json::to_string(&ProcessState::Waiting).unwrap();
        assert_eq!(json, "\"waiting\"");
    }
}
