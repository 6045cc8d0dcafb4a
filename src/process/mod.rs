/*!
 * Process Module
 * Schedulable units and their execution state
 */

mod entity;
pub mod types;

pub use entity::Process;
pub use types::{ProcessSnapshot, ProcessState};
