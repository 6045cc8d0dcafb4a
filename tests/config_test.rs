/*!
 * Config Tests
 * Loading configurations from disk in both formats
 */

use pretty_assertions::assert_eq;
use sched_sim::{Clock, ConfigError, Controller, Policy, SchedulerConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_text_file() {
    let file = write_temp(".txt", "PRIOP;5\nt01;0;0;4;2;\nt02;1;2;3;8;\n");
    let config = SchedulerConfig::from_file(file.path()).unwrap();

    assert_eq!(config.algorithm_name, "PRIOP");
    assert_eq!(config.quantum, 5);
    let ids: Vec<&str> = config.processes.iter().map(|p| p.id()).collect();
    assert_eq!(ids, vec!["t01", "t02"]);
    assert_eq!(Policy::from_name(&config.algorithm_name), Some(Policy::Priority));
}

#[test]
fn test_load_json_file() {
    let file = write_temp(
        ".json",
        r#"{
            "algorithm": "SRTF",
            "quantum": 2,
            "processes": [
                {"id": "A", "color": 4, "start_time": 0, "duration": 3, "priority": 1},
                {"id": "B", "start_time": 1, "duration": 1}
            ]
        }"#,
    );
    let config = SchedulerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.quantum, 2);
    assert_eq!(config.processes[0].color(), 4);
    assert_eq!(config.processes[1].start_time(), 1);
}

#[test]
fn test_json_detected_by_content() {
    let file = write_temp(".cfg", r#"{"algorithm": "FIFO", "quantum": 1}"#);
    let config = SchedulerConfig::from_file(file.path()).unwrap();
    assert!(config.processes.is_empty());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SchedulerConfig::from_file(dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_malformed_json_is_json_error() {
    let file = write_temp(".json", "{\"algorithm\": ");
    let err = SchedulerConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_duplicate_ids_rejected_from_file() {
    let file = write_temp(".txt", "FIFO;1\nP1;0;0;1;0\nP1;0;3;1;0\n");
    assert_eq!(
        SchedulerConfig::from_file(file.path()),
        Err(ConfigError::DuplicateProcess("P1".to_string()))
    );
}

#[test]
fn test_zero_quantum_rejected() {
    let file = write_temp(".txt", "FIFO;0\nP1;0;0;1;0\n");
    assert_eq!(
        SchedulerConfig::from_file(file.path()),
        Err(ConfigError::InvalidQuantum(0))
    );
}

#[test]
fn test_loaded_config_runs() {
    let file = write_temp(".txt", "FIFO;100\nP1;0;0;3;0\nP2;0;1;2;0\n");
    let config = SchedulerConfig::from_file(file.path()).unwrap();
    let sim = Controller::new(Clock::new(), config);

    assert_eq!(sim.run_to_completion(50), 5);
    assert!(sim.is_finished());
}

#[test]
fn test_error_serializes_with_tag() {
    let err = ConfigError::InvalidDuration { id: "P9".to_string() };
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["error_type"], "invalid_duration");
    assert_eq!(json["details"]["id"], "P9");
}
