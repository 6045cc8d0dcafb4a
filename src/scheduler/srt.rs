/*!
 * Shortest Remaining Time Scheduler
 */

use super::traits::{eligible, Scheduler};
use crate::core::types::Tick;
use crate::process::Process;
use std::cmp::Ordering;

/// Picks the eligible process with the least remaining work,
/// ties by smallest start time, then smallest id
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestRemainingTime;

impl ShortestRemainingTime {
    #[inline]
    fn order(a: &Process, b: &Process) -> Ordering {
        a.remaining()
            .cmp(&b.remaining())
            .then_with(|| a.start_time().cmp(&b.start_time()))
            .then_with(|| a.id().cmp(b.id()))
    }
}

impl Scheduler for ShortestRemainingTime {
    fn next_process<'a>(&self, processes: &'a [Process], now: Tick) -> Option<&'a Process> {
        eligible(processes, now).min_by(|a, b| Self::order(a, b))
    }

    fn name(&self) -> &'static str {
        "SRTF"
    }
}
