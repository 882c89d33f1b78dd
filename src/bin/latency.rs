// Latency bench: sweeps the pulse generator across the configured period
// range and prints one CSV row per run. Strategy (interrupt vs polling)
// comes from the settings file standing in for switch SW0.

use std::io::Write;
use std::path::PathBuf;

use pulsedeck::config;
use pulsedeck::harness::{self, SweepPlan};
use pulsedeck::sim::{SimBench, SimBenchSetup};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let config = config::load(&dir).unwrap_or_default();

    let bench = SimBench::new(SimBenchSetup {
        pulses_per_run: config.pulses_per_run,
        switches: if config.harness_polling { 1 } else { 0 },
        start_button_held: true,
    });

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    harness::run_sweep(&bench, &SweepPlan::from(&config), &mut out)?;
    out.flush()?;
    Ok(())
}
