// Interrupt-driven strategy: the foreground loop just grinds background
// tasks while a per-pulse handler acknowledges the generator.

use crate::board::Bench;
use crate::harness::background::{BackgroundTasks, LED_TASK};
use crate::harness::metrics::PulseMetrics;

/// LED bit flashed by the pulse handler.
pub const LED_IRQ: u32 = 1 << 2;

/// Runs in interrupt context, once per generator pulse: flash the
/// indicator, emit the response pulse, clear the request.
pub fn pulse_handler(bench: &dyn Bench) {
    let lit = (bench.led_read() | LED_IRQ) & !LED_TASK;
    bench.led_write(lit);
    bench.respond();
    bench.led_write(lit ^ LED_IRQ);
    bench.stimulus_ack();
}

pub fn run(bench: &dyn Bench, bg: &mut BackgroundTasks, period: u32) -> PulseMetrics {
    bench.egm_set_enabled(false);
    let pulse_width = period / 2;
    bench.egm_set_period(period);
    bench.egm_set_pulse_width(pulse_width);
    bench.egm_set_enabled(true);

    while bench.egm_busy() {
        bg.run(bench);
    }

    let metrics = super::read_back(bench, bg, period, pulse_width);
    bench.egm_set_enabled(false);
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBench, SimBenchSetup};

    #[test]
    fn ample_period_answers_every_pulse() {
        let bench = SimBench::new(SimBenchSetup {
            pulses_per_run: 8,
            ..SimBenchSetup::default()
        });
        bench.set_pulse_handler(Box::new(pulse_handler));
        bench.stimulus_enable_irq();
        let mut bg = BackgroundTasks::new();
        let metrics = run(&bench, &mut bg, 100);
        assert_eq!(metrics.period, 100);
        assert_eq!(metrics.pulse_width, 50);
        assert_eq!(metrics.missed_pulses, 0);
        assert!(metrics.average_latency > 0);
        assert!(metrics.bg_task_calls_run > 0);
        assert_eq!(metrics.bg_task_calls_run, bg.calls_run);
    }

    #[test]
    fn tiny_period_misses_pulses() {
        let bench = SimBench::new(SimBenchSetup {
            pulses_per_run: 8,
            ..SimBenchSetup::default()
        });
        bench.set_pulse_handler(Box::new(pulse_handler));
        bench.stimulus_enable_irq();
        let mut bg = BackgroundTasks::new();
        let metrics = run(&bench, &mut bg, 2);
        assert!(metrics.missed_pulses > 0);
    }

    #[test]
    fn handler_restores_indicator_led() {
        let bench = SimBench::new(SimBenchSetup::default());
        pulse_handler(&bench);
        assert_eq!(bench.led_read() & LED_IRQ, 0);
    }
}
