/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Configuration is empty")]
    #[diagnostic(
        code(config::empty),
        help("The first line must be ALGORITHM;QUANTUM, e.g. FIFO;2")
    )]
    Empty,

    #[error("Invalid header on line {line}: expected ALGORITHM;QUANTUM")]
    #[diagnostic(
        code(config::invalid_header),
        help("Write the algorithm name and the quantum separated by ';'")
    )]
    InvalidHeader { line: usize },

    #[error("Invalid process on line {line}: {reason}")]
    #[diagnostic(
        code(config::invalid_process),
        help("Each process line is id;color;start;duration;priority")
    )]
    InvalidProcess { line: usize, reason: String },

    #[error("Invalid {field} on line {line}: {value:?} is not a number")]
    #[diagnostic(code(config::invalid_number), help("Use base-10 integers"))]
    InvalidNumber {
        line: usize,
        field: String,
        value: String,
    },

    #[error("Duplicate process id: {0}")]
    #[diagnostic(
        code(config::duplicate_process),
        help("Process ids must be unique within one configuration")
    )]
    DuplicateProcess(String),

    #[error("Quantum must be positive, got {0}")]
    #[diagnostic(code(config::invalid_quantum))]
    InvalidQuantum(u64),

    #[error("Process {id} has zero duration")]
    #[diagnostic(
        code(config::invalid_duration),
        help("Every process needs at least one tick of work")
    )]
    InvalidDuration { id: String },

    #[error("I/O error: {0}")]
    #[diagnostic(code(config::io))]
    Io(String),

    #[error("JSON error: {0}")]
    #[diagnostic(code(config::json))]
    Json(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

/// Simulation errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SimError {
    #[error("Clock is running")]
    #[diagnostic(
        code(sim::clock_running),
        help("Stop the clock before resetting it")
    )]
    ClockRunning,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}
