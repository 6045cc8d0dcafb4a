/*!
 * Scheduler Module
 * Pure selection strategies over the process set
 */

mod fifo;
mod priority;
mod srt;
pub mod traits;
pub mod types;

// Re-export public API
pub use fifo::Fifo;
pub use priority::PriorityScheduler;
pub use srt::ShortestRemainingTime;
pub use traits::{eligible, Scheduler};
pub use types::Policy;
