/*!
 * Scheduler Traits
 * Interface shared by every selection strategy
 */

use crate::core::types::Tick;
use crate::process::Process;

/// Selection strategy over the process set
///
/// Implementations are pure: the same inputs always yield the same answer,
/// with no state carried between calls. They must never pick a process that
/// has not arrived (`start_time > now`) or that is terminated. `None` means
/// the CPU idles this tick.
pub trait Scheduler: Send + Sync {
    /// Pick the process to run during tick `now`
    fn next_process<'a>(&self, processes: &'a [Process], now: Tick) -> Option<&'a Process>;

    /// Display name of the strategy
    fn name(&self) -> &'static str;
}

/// Processes a scheduler may choose from at `now`
#[inline]
pub fn eligible<'a>(processes: &'a [Process], now: Tick) -> impl Iterator<Item = &'a Process> + 'a {
    processes.iter().filter(move |p| p.is_eligible(now))
}
