// Latency bench driver: pick a strategy off the mode switch, wait for the
// start button, then sweep the generator period and print one CSV row per
// run.

pub mod background;
pub mod interrupt_mode;
pub mod metrics;
pub mod polling_mode;

use std::io::Write;

use crate::board::Bench;
use crate::config::Config;

use background::BackgroundTasks;
use metrics::PulseMetrics;

/// LED bit blinked once per sweep iteration.
pub const LED_SWEEP: u32 = 1 << 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Interrupt,
    Polling,
}

impl Strategy {
    /// Switch bit 0 selects the strategy, read once at program start.
    pub fn from_switches(switches: u32) -> Self {
        if switches & 1 != 0 {
            Strategy::Polling
        } else {
            Strategy::Interrupt
        }
    }
}

/// Inclusive period sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepPlan {
    pub start: u32,
    pub end: u32,
    pub step: u32,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self { start: 2, end: 5000, step: 2 }
    }
}

impl From<&Config> for SweepPlan {
    fn from(config: &Config) -> Self {
        Self {
            start: config.sweep_start,
            end: config.sweep_end,
            step: config.sweep_step.max(1),
        }
    }
}

impl SweepPlan {
    pub fn periods(self) -> impl Iterator<Item = u32> {
        (self.start..=self.end).step_by(self.step as usize)
    }
}

/// Collect the generator's read-back registers alongside the run's own
/// counters into one result row.
pub fn read_back(
    bench: &dyn Bench,
    bg: &BackgroundTasks,
    period: u32,
    pulse_width: u32,
) -> PulseMetrics {
    PulseMetrics {
        period,
        pulse_width,
        bg_task_calls_run: bg.calls_run,
        average_latency: bench.egm_average_latency(),
        missed_pulses: bench.egm_missed_pulses(),
        multiple_pulses: bench.egm_multiple_pulses(),
    }
}

pub fn run_sweep(bench: &dyn Bench, plan: &SweepPlan, out: &mut dyn Write) -> anyhow::Result<()> {
    let strategy = Strategy::from_switches(bench.switches());
    match strategy {
        Strategy::Interrupt => {
            bench.set_pulse_handler(Box::new(interrupt_mode::pulse_handler));
            bench.stimulus_enable_irq();
            writeln!(out, "Interrupt method selected.")?;
        }
        Strategy::Polling => {
            writeln!(out, "Polling method selected.")?;
        }
    }
    writeln!(out, "{}", PulseMetrics::CSV_HEADER)?;
    writeln!(out, "Press PB0 to start.")?;
    while bench.buttons() & 1 != 0 {} // start button is active-low

    let mut bg = BackgroundTasks::new();
    for period in plan.periods() {
        bg.reset();
        bench.led_write(bench.led_read() | LED_SWEEP);
        bench.led_write(bench.led_read() ^ LED_SWEEP);
        let metrics = match strategy {
            Strategy::Interrupt => interrupt_mode::run(bench, &mut bg, period),
            Strategy::Polling => polling_mode::run(bench, &mut bg, period),
        };
        writeln!(out, "{}", metrics.csv_line())?;
    }
    Ok(())
}
