/*!
 * Simulation Configuration
 * Algorithm, quantum and process list, loadable from text or JSON
 */

use crate::core::errors::ConfigError;
use crate::core::types::{Priority, ProcessId, Quantum, Tick};
use crate::process::Process;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Input to a simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Requested strategy, resolved by the controller
    pub algorithm_name: String,
    pub quantum: Quantum,
    pub processes: Vec<Process>,
}

/// One process as it appears in a JSON configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessSpec {
    pub id: ProcessId,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub start_time: Tick,
    pub duration: u64,
    #[serde(default)]
    pub priority: Priority,
}

impl From<ProcessSpec> for Process {
    fn from(spec: ProcessSpec) -> Self {
        Process::new(spec.id, spec.start_time, spec.duration, spec.priority).with_color(spec.color)
    }
}

impl From<&Process> for ProcessSpec {
    fn from(process: &Process) -> Self {
        Self {
            id: process.id().to_string(),
            color: process.color(),
            start_time: process.start_time(),
            duration: process.duration(),
            priority: process.priority(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct ConfigFile {
    algorithm: String,
    quantum: Quantum,
    #[serde(default)]
    processes: Vec<ProcessSpec>,
}

impl SchedulerConfig {
    pub fn new(algorithm_name: impl Into<String>, quantum: Quantum) -> Self {
        Self {
            algorithm_name: algorithm_name.into(),
            quantum,
            processes: Vec::new(),
        }
    }

    pub fn with_process(mut self, process: Process) -> Self {
        self.processes.push(process);
        self
    }

    /// Parse the text format:
    ///
    /// ```text
    /// PRIORITY;2
    /// t01;0;0;4;2
    /// t02;1;1;3;5;
    /// ```
    ///
    /// The header is `ALGORITHM;QUANTUM`; each further non-blank line is
    /// `id;color;start;duration;priority`.
    pub fn parse_str(input: &str) -> ConfigResult<Self> {
        let mut lines = input.lines().enumerate().map(|(idx, line)| (idx + 1, line.trim()));

        let (header_line, header) = match lines.next() {
            Some((n, line)) if !line.is_empty() => (n, line),
            _ => return Err(ConfigError::Empty),
        };

        let mut parts = header.split(';').map(str::trim);
        let algorithm = match parts.next() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ConfigError::InvalidHeader { line: header_line }),
        };
        let quantum = match parts.next() {
            Some(value) => parse_field(header_line, "quantum", value)?,
            None => return Err(ConfigError::InvalidHeader { line: header_line }),
        };

        let mut config = Self::new(algorithm, quantum);
        for (line_no, line) in lines.filter(|(_, line)| !line.is_empty()) {
            config.processes.push(parse_process(line_no, line)?);
        }

        config.validate()?;
        debug!(
            algorithm = %config.algorithm_name,
            quantum = config.quantum,
            processes = config.processes.len(),
            "Parsed configuration"
        );
        Ok(config)
    }

    /// Parse a JSON configuration
    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        let file: ConfigFile = serde_json::from_str(input)?;
        let config = Self {
            algorithm_name: file.algorithm,
            quantum: file.quantum,
            processes: file.processes.into_iter().map(Process::from).collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize to the JSON configuration format
    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        let file = ConfigFile {
            algorithm: self.algorithm_name.clone(),
            quantum: self.quantum,
            processes: self.processes.iter().map(ProcessSpec::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Load from disk. Files ending in `.json`, or whose content starts with
    /// `{`, are read as JSON; everything else as the text format.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
            || content.trim_start().starts_with('{');

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::parse_str(&content)
        }
    }

    /// Check the guarantees the controller relies on
    pub fn validate(&self) -> ConfigResult<()> {
        if self.quantum == 0 {
            return Err(ConfigError::InvalidQuantum(self.quantum));
        }

        let mut seen = HashSet::with_capacity(self.processes.len());
        for process in &self.processes {
            if process.id().is_empty() {
                return Err(ConfigError::InvalidProcess {
                    line: 0,
                    reason: "empty process id".to_string(),
                });
            }
            if process.duration() == 0 {
                return Err(ConfigError::InvalidDuration {
                    id: process.id().to_string(),
                });
            }
            if !seen.insert(process.id()) {
                return Err(ConfigError::DuplicateProcess(process.id().to_string()));
            }
        }
        Ok(())
    }
}

impl FromStr for SchedulerConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

fn parse_process(line_no: usize, line: &str) -> ConfigResult<Process> {
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    // A trailing ';' yields one empty field
    let fields = match fields.split_last() {
        Some((last, rest)) if last.is_empty() => rest,
        _ => &fields[..],
    };

    if fields.len() < 5 {
        return Err(ConfigError::InvalidProcess {
            line: line_no,
            reason: format!("expected 5 fields, found {}", fields.len()),
        });
    }

    let id = fields[0];
    if id.is_empty() {
        return Err(ConfigError::InvalidProcess {
            line: line_no,
            reason: "empty process id".to_string(),
        });
    }

    let color: u32 = parse_field(line_no, "color", fields[1])?;
    let start: Tick = parse_field(line_no, "start", fields[2])?;
    let duration: u64 = parse_field(line_no, "duration", fields[3])?;
    let priority: Priority = parse_field(line_no, "priority", fields[4])?;

    Ok(Process::new(id, start, duration, priority).with_color(color))
}

fn parse_field<T: FromStr>(line: usize, field: &str, value: &str) -> ConfigResult<T> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        line,
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_text_format() {
        let config = SchedulerConfig::parse_str("PRIOP;5\nt01;0;0;4;2;\n\n t02 ; 3 ; 1 ; 2 ; 7 \n").unwrap();
        assert_eq!(config.algorithm_name, "PRIOP");
        assert_eq!(config.quantum, 5);
        assert_eq!(config.processes.len(), 2);

        let p = &config.processes[1];
        assert_eq!(p.id(), "t02");
        assert_eq!(p.color(), 3);
        assert_eq!(p.start_time(), 1);
        assert_eq!(p.duration(), 2);
        assert_eq!(p.priority(), 7);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(SchedulerConfig::parse_str(""), Err(ConfigError::Empty));
        assert_eq!(SchedulerConfig::parse_str("   \nP1;0;0;1;0"), Err(ConfigError::Empty));
    }

    #[test]
    fn test_header_without_quantum() {
        assert_eq!(
            SchedulerConfig::parse_str("FIFO"),
            Err(ConfigError::InvalidHeader { line: 1 })
        );
    }

    #[test]
    fn test_short_process_line() {
        let err = SchedulerConfig::parse_str("FIFO;1\nP1;0;0;3").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProcess { line: 2, .. }));
    }

    #[test]
    fn test_bad_number_reports_field() {
        let err = SchedulerConfig::parse_str("FIFO;1\nP1;0;-1;3;0").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                line: 2,
                field: "start".to_string(),
                value: "-1".to_string(),
            }
        );
    }

    #[test]
    fn test_validation() {
        let dup = SchedulerConfig::new("FIFO", 1)
            .with_process(Process::new("P1", 0, 1, 0))
            .with_process(Process::new("P1", 2, 1, 0));
        assert_eq!(dup.validate(), Err(ConfigError::DuplicateProcess("P1".into())));

        let zero = SchedulerConfig::new("FIFO", 1).with_process(Process::new("P1", 0, 0, 0));
        assert_eq!(zero.validate(), Err(ConfigError::InvalidDuration { id: "P1".into() }));

        assert_eq!(
            SchedulerConfig::new("FIFO", 0).validate(),
            Err(ConfigError::InvalidQuantum(0))
        );
    }

    #[test]
    fn test_json_defaults() {
        let config = SchedulerConfig::from_json_str(
            r#"{"algorithm": "srtf", "quantum": 3, "processes": [{"id": "A", "duration": 2}]}"#,
        )
        .unwrap();
        assert_eq!(config.algorithm_name, "srtf");
        assert_eq!(config.processes[0].start_time(), 0);
        assert_eq!(config.processes[0].priority(), 0);
    }

    #[test]
    fn test_json_output_reloads() {
        let config = SchedulerConfig::new("PRIORITY", 2)
            .with_process(Process::new("P1", 1, 3, 4).with_color(9));
        let json = config.to_json_pretty().unwrap();
        assert_eq!(SchedulerConfig::from_json_str(&json).unwrap(), config);
    }
}
