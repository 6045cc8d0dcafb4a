/*!
 * Simulation Report
 * End-of-run statistics per process and for the whole run
 */

use crate::core::serde::{is_none, is_zero_u64};
use crate::core::types::{ProcessId, Quantum, Tick};
use crate::process::{Process, ProcessState};
use serde::Serialize;
use std::fmt;

/// Statistics for one process
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessReport {
    pub id: ProcessId,
    pub start_time: Tick,
    pub duration: u64,
    pub run_time: u64,
    pub wait_time: u64,
    pub state: ProcessState,
    #[serde(skip_serializing_if = "is_none")]
    pub finish_time: Option<Tick>,
    /// `finish_time - start_time`, once finished
    #[serde(skip_serializing_if = "is_none")]
    pub turnaround: Option<u64>,
}

impl From<&Process> for ProcessReport {
    fn from(p: &Process) -> Self {
        Self {
            id: p.id().to_string(),
            start_time: p.start_time(),
            duration: p.duration(),
            run_time: p.run_time(),
            wait_time: p.wait_time(),
            state: p.state(),
            finish_time: p.finish_time(),
            turnaround: p.finish_time().map(|f| f.saturating_sub(p.start_time())),
        }
    }
}

/// Run-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationReport {
    pub scheduler: String,
    pub quantum: Quantum,
    pub final_time: Tick,
    pub finished: bool,
    pub processes: Vec<ProcessReport>,
    pub completed: usize,
    pub context_switches: usize,
    pub idle_ticks: u64,
    /// Timeline intervals rejected as empty or inverted
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub dropped_intervals: u64,
    pub total_run_time: u64,
    pub total_wait_time: u64,
    pub average_wait_time: f64,
    /// Mean over completed processes only
    pub average_turnaround: f64,
    /// Fraction of processes completed, 0.0..=1.0
    pub completion_rate: f64,
    /// Completed processes per tick; `None` before the first tick
    #[serde(skip_serializing_if = "is_none")]
    pub throughput: Option<f64>,
    /// Fraction of elapsed ticks spent running a process
    pub cpu_utilization: f64,
}

impl SimulationReport {
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        scheduler: &str,
        quantum: Quantum,
        final_time: Tick,
        finished: bool,
        processes: &[Process],
        context_switches: usize,
        idle_ticks: u64,
        dropped_intervals: u64,
    ) -> Self {
        let reports: Vec<ProcessReport> = processes.iter().map(ProcessReport::from).collect();

        let total_run_time: u64 = reports.iter().map(|r| r.run_time).sum();
        let total_wait_time: u64 = reports.iter().map(|r| r.wait_time).sum();
        let turnarounds: Vec<u64> = reports.iter().filter_map(|r| r.turnaround).collect();
        let completed = turnarounds.len();

        Self {
            scheduler: scheduler.to_string(),
            quantum,
            final_time,
            finished,
            completed,
            context_switches,
            idle_ticks,
            dropped_intervals,
            total_run_time,
            total_wait_time,
            average_wait_time: mean(total_wait_time, reports.len()),
            average_turnaround: mean(turnarounds.iter().sum(), completed),
            completion_rate: ratio(completed as u64, reports.len() as u64).unwrap_or(1.0),
            throughput: ratio(completed as u64, final_time),
            cpu_utilization: ratio(total_run_time, final_time).unwrap_or(0.0),
            processes: reports,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn mean(total: u64, count: usize) -> f64 {
    ratio(total, count as u64).unwrap_or(0.0)
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scheduler {} (quantum {}) {} at t={}",
            self.scheduler,
            self.quantum,
            if self.finished { "finished" } else { "stopped" },
            self.final_time
        )?;
        writeln!(
            f,
            "{:<12} {:>6} {:>9} {:>6} {:>6} {:>7} {:>11}",
            "PROCESS", "START", "DURATION", "RUN", "WAIT", "FINISH", "TURNAROUND"
        )?;
        for p in &self.processes {
            writeln!(
                f,
                "{:<12} {:>6} {:>9} {:>6} {:>6} {:>7} {:>11}",
                p.id,
                p.start_time,
                p.duration,
                p.run_time,
                p.wait_time,
                p.finish_time.map_or_else(|| "-".to_string(), |t| t.to_string()),
                p.turnaround.map_or_else(|| "-".to_string(), |t| t.to_string()),
            )?;
        }
        writeln!(
            f,
            "completed {}/{} ({:.0}%), context switches {}, idle ticks {}",
            self.completed,
            self.processes.len(),
            self.completion_rate * 100.0,
            self.context_switches,
            self.idle_ticks
        )?;
        writeln!(
            f,
            "avg wait {:.2}, avg turnaround {:.2}, cpu utilization {:.1}%",
            self.average_wait_time,
            self.average_turnaround,
            self.cpu_utilization * 100.0
        )?;
        match self.throughput {
            Some(t) => write!(f, "throughput {:.3} processes/tick", t),
            None => write!(f, "throughput n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn finished(id: &str, start: Tick, duration: u64, waits: u64) -> Process {
        let mut p = Process::new(id, start, duration, 0);
        p.admit();
        let mut now = start;
        for _ in 0..waits {
            p.wait_tick();
            now += 1;
        }
        for _ in 0..duration {
            p.execute_tick(now);
            now += 1;
        }
        p
    }

    #[test]
    fn test_statistics() {
        // P1 runs [0,3), P2 waits [1,3) then runs [3,5)
        let processes = vec![finished("P1", 0, 3, 0), finished("P2", 1, 2, 2)];
        let report = SimulationReport::build("FIFO", 100, 5, true, &processes, 2, 0, 0);

        assert_eq!(report.completed, 2);
        assert_eq!(report.total_run_time, 5);
        assert_eq!(report.total_wait_time, 2);
        assert_eq!(report.average_wait_time, 1.0);
        assert_eq!(report.processes[1].turnaround, Some(4));
        assert_eq!(report.average_turnaround, 3.5);
        assert_eq!(report.completion_rate, 1.0);
        assert_eq!(report.throughput, Some(0.4));
        assert_eq!(report.cpu_utilization, 1.0);
    }

    #[test]
    fn test_before_first_tick() {
        let processes = vec![Process::new("P1", 0, 2, 0)];
        let report = SimulationReport::build("FIFO", 1, 0, false, &processes, 0, 0, 0);
        assert_eq!(report.throughput, None);
        assert_eq!(report.completion_rate, 0.0);
        assert_eq!(report.average_turnaround, 0.0);
        assert_eq!(report.processes[0].turnaround, None);
        assert!(report.to_string().contains("throughput n/a"));
    }

    #[test]
    fn test_json_skips_unfinished_fields() {
        let processes = vec![Process::new("P1", 0, 2, 0)];
        let report = SimulationReport::build("SRTF", 1, 0, false, &processes, 0, 0, 0);
        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["processes"][0]["state"], "new");
        assert!(json["processes"][0].get("finish_time").is_none());
        assert!(json.get("throughput").is_none());
    }
}
