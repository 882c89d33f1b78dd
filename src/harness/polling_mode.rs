// Polling strategy: no interrupts. One calibration pass discovers how many
// background tasks fit in a pulse cycle; every later interval runs exactly
// that many, then spins for the pulse and answers it.

use crate::board::Bench;
use crate::harness::background::BackgroundTasks;
use crate::harness::metrics::PulseMetrics;

/// Count background calls across the high half then the low half of one
/// pulse cycle, answer the pulse, and back off by one for the polling
/// overhead. The workload's cost is fixed, so under identical generator
/// timing the count comes out the same every run.
pub fn characterize_background_tasks(bench: &dyn Bench, bg: &mut BackgroundTasks) -> u32 {
    bg.run(bench);
    let mut count: u32 = 1;
    while bench.egm_busy() && bench.stimulus_level() {
        bg.run(bench);
        count += 1;
    }
    while bench.egm_busy() && !bench.stimulus_level() {
        bg.run(bench);
        count += 1;
    }
    bench.respond();
    count.saturating_sub(1)
}

pub fn run(bench: &dyn Bench, bg: &mut BackgroundTasks, period: u32) -> PulseMetrics {
    bench.egm_set_enabled(false);
    let pulse_width = period / 2;
    bench.egm_set_period(period);
    bench.egm_set_pulse_width(pulse_width);
    bench.egm_set_enabled(true);

    // first pulse start
    while bench.egm_busy() && !bench.stimulus_level() {}
    bench.respond();

    let batch = characterize_background_tasks(bench, bg);

    while bench.egm_busy() {
        for _ in 0..batch {
            bg.run(bench);
        }
        while bench.egm_busy() && !bench.stimulus_level() {}
        bench.respond();
    }

    let metrics = super::read_back(bench, bg, period, pulse_width);
    bench.egm_set_enabled(false);
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBench, SimBenchSetup};

    fn calibrated_count(period: u32) -> u32 {
        let bench = SimBench::new(SimBenchSetup {
            pulses_per_run: 8,
            ..SimBenchSetup::default()
        });
        bench.egm_set_period(period);
        bench.egm_set_pulse_width(period / 2);
        bench.egm_set_enabled(true);
        while bench.egm_busy() && !bench.stimulus_level() {}
        bench.respond();
        let mut bg = BackgroundTasks::new();
        characterize_background_tasks(&bench, &mut bg)
    }

    #[test]
    fn characterization_is_stable_under_identical_timing() {
        let first = calibrated_count(200);
        let second = calibrated_count(200);
        assert_eq!(first, second);
    }

    #[test]
    fn longer_periods_fit_more_tasks() {
        assert!(calibrated_count(400) > calibrated_count(100));
    }

    #[test]
    fn polling_run_reports_the_requested_period() {
        let bench = SimBench::new(SimBenchSetup {
            pulses_per_run: 8,
            ..SimBenchSetup::default()
        });
        let mut bg = BackgroundTasks::new();
        let metrics = run(&bench, &mut bg, 120);
        assert_eq!(metrics.period, 120);
        assert_eq!(metrics.pulse_width, 60);
        assert!(metrics.bg_task_calls_run > 0);
        assert!(!bench.egm_busy());
    }
}
