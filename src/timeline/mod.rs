/*!
 * Timeline Recorder
 * Gantt-style intervals of process state, merged on insertion
 */

use crate::core::types::{ProcessId, Tick};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// State recorded for an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateTag {
    Running,
    Waiting,
    Terminated,
}

impl StateTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateTag::Running => "running",
            StateTag::Waiting => "waiting",
            StateTag::Terminated => "terminated",
        }
    }
}

impl fmt::Display for StateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open interval `[start, end)` during which a process held a state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimelineEvent {
    pub process_id: ProcessId,
    pub start: Tick,
    pub end: Tick,
    pub state: StateTag,
}

impl TimelineEvent {
    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}-{} {} (dur: {})",
            self.process_id,
            self.start,
            self.end,
            self.state,
            self.len()
        )
    }
}

/// Accumulates timeline events
///
/// For one process and state, stored intervals never overlap: an interval
/// starting exactly where the last one with the same key ended extends it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Timeline {
    events: Vec<TimelineEvent>,
    #[serde(skip)]
    last_index: HashMap<(ProcessId, StateTag), usize>,
    dropped: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `[start, end)` for `process_id` in `state`.
    ///
    /// Returns false (and counts the call) when the interval is empty or inverted.
    pub fn record(&mut self, process_id: &str, start: Tick, end: Tick, state: StateTag) -> bool {
        if end <= start {
            self.dropped += 1;
            debug!(process = process_id, start, end, state = %state, "Dropped invalid timeline interval");
            return false;
        }

        let key = (process_id.to_string(), state);
        if let Some(&idx) = self.last_index.get(&key) {
            let last = &mut self.events[idx];
            if last.end == start {
                last.end = end;
                return true;
            }
        }

        self.events.push(TimelineEvent {
            process_id: key.0.clone(),
            start,
            end,
            state,
        });
        self.last_index.insert(key, self.events.len() - 1);
        true
    }

    /// All events in non-decreasing start order
    pub fn events(&self) -> Vec<TimelineEvent> {
        let mut events = self.events.clone();
        // Stable: same-start events keep insertion order
        events.sort_by_key(|e| e.start);
        events
    }

    /// Events of one process in non-decreasing start order
    pub fn events_for(&self, process_id: &str) -> Vec<TimelineEvent> {
        let mut events: Vec<_> = self
            .events
            .iter()
            .filter(|e| e.process_id == process_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }

    /// Number of intervals rejected as empty or inverted
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.last_index.clear();
        self.dropped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ev(id: &str, start: Tick, end: Tick, state: StateTag) -> TimelineEvent {
        TimelineEvent {
            process_id: id.to_string(),
            start,
            end,
            state,
        }
    }

    #[test]
    fn test_contiguous_intervals_merge() {
        let mut tl = Timeline::new();
        assert!(tl.record("P1", 0, 1, StateTag::Running));
        assert!(tl.record("P1", 1, 3, StateTag::Running));
        assert_eq!(tl.events(), vec![ev("P1", 0, 3, StateTag::Running)]);
    }

    #[test]
    fn test_gap_keeps_separate_events() {
        let mut tl = Timeline::new();
        tl.record("P1", 0, 2, StateTag::Running);
        tl.record("P1", 3, 4, StateTag::Running);
        assert_eq!(tl.len(), 2);
    }

    #[test]
    fn test_merge_ignores_other_keys_in_between() {
        let mut tl = Timeline::new();
        tl.record("P1", 0, 1, StateTag::Running);
        tl.record("P2", 0, 1, StateTag::Waiting);
        tl.record("P1", 1, 2, StateTag::Running);
        tl.record("P1", 1, 2, StateTag::Waiting);

        assert_eq!(
            tl.events(),
            vec![
                ev("P1", 0, 2, StateTag::Running),
                ev("P2", 0, 1, StateTag::Waiting),
                ev("P1", 1, 2, StateTag::Waiting),
            ]
        );
    }

    #[test]
    fn test_invalid_intervals_are_counted() {
        let mut tl = Timeline::new();
        assert!(!tl.record("P1", 3, 3, StateTag::Running));
        assert!(!tl.record("P1", 4, 2, StateTag::Running));
        assert!(tl.is_empty());
        assert_eq!(tl.dropped(), 2);
    }

    #[test]
    fn test_events_sorted_by_start() {
        let mut tl = Timeline::new();
        tl.record("P2", 5, 6, StateTag::Running);
        tl.record("P1", 0, 2, StateTag::Running);
        let starts: Vec<_> = tl.events().iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![0, 5]);
    }

    #[test]
    fn test_clear() {
        let mut tl = Timeline::new();
        tl.record("P1", 0, 1, StateTag::Running);
        tl.record("P1", 1, 1, StateTag::Running);
        tl.clear();
        assert!(tl.is_empty());
        assert_eq!(tl.dropped(), 0);

        // No stale merge target after clearing
        tl.record("P1", 1, 2, StateTag::Running);
        assert_eq!(tl.events(), vec![ev("P1", 1, 2, StateTag::Running)]);
    }

    #[test]
    fn test_serializes_for_renderers() {
        let mut tl = Timeline::new();
        tl.record("P1", 0, 2, StateTag::Terminated);
        let json = serde_json::to_value(&tl).unwrap();
        assert_eq!(json["events"][0]["state"], "terminated");
        assert_eq!(json["events"][0]["end"], 2);
    }
}
