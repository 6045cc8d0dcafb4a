/*!
 * Scheduler Types
 * Policy names and their resolution to strategies
 */

use super::fifo::Fifo;
use super::priority::PriorityScheduler;
use super::srt::ShortestRemainingTime;
use super::traits::Scheduler;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Scheduling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy {
    /// Earliest arrival first
    #[default]
    Fifo,
    /// Highest priority first
    Priority,
    /// Least remaining work first
    ShortestRemainingTime,
}

impl Policy {
    pub const ALL: [Policy; 3] = [Policy::Fifo, Policy::Priority, Policy::ShortestRemainingTime];

    /// Resolve an algorithm name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "FIFO" | "FCFS" => Some(Self::Fifo),
            "PRIORITY" | "PRIOP" | "PRIO" => Some(Self::Priority),
            "SRTF" | "SRT" | "SHORTEST_REMAINING_TIME" => Some(Self::ShortestRemainingTime),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Priority => "PRIORITY",
            Self::ShortestRemainingTime => "SRTF",
        }
    }

    /// Build the stateless strategy for this policy
    pub fn build(self) -> Box<dyn Scheduler> {
        match self {
            Self::Fifo => Box::new(Fifo),
            Self::Priority => Box::new(PriorityScheduler),
            Self::ShortestRemainingTime => Box::new(ShortestRemainingTime),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            format!("Invalid policy '{}'. Valid: FIFO, PRIORITY, SRTF", s)
        })
    }
}

impl Serialize for Policy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
