/*!
 * Tick Benchmarks
 *
 * Full manual runs per policy, and raw selection cost over large process sets
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sched_sim::{Clock, Controller, Policy, Process, SchedulerConfig};

fn workload(count: usize) -> Vec<Process> {
    (0..count)
        .map(|i| {
            Process::new(
                format!("P{:04}", i),
                (i as u64 * 7) % 50,
                1 + (i as u64 * 13) % 9,
                (i as i32 * 31) % 10,
            )
        })
        .collect()
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");

    for policy in Policy::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(policy), &policy, |b, policy| {
            b.iter(|| {
                let config = workload(64)
                    .into_iter()
                    .fold(SchedulerConfig::new(policy.as_str(), 4), |cfg, p| cfg.with_process(p));
                let sim = Controller::new(Clock::new(), config);
                black_box(sim.run_to_completion(100_000))
            });
        });
    }

    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_process");

    for size in [16usize, 256, 4096] {
        let processes = workload(size);
        for policy in Policy::ALL {
            let scheduler = policy.build();
            group.bench_with_input(
                BenchmarkId::new(policy.as_str(), size),
                &processes,
                |b, processes| b.iter(|| black_box(scheduler.next_process(processes, black_box(25)))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_full_run, bench_selection);
criterion_main!(benches);
