// The bench's console contract: banner, header, start prompt, then one
// six-field CSV row per period with pulse width pinned at period/2.

use pulsedeck::harness::{SweepPlan, run_sweep};
use pulsedeck::sim::{SimBench, SimBenchSetup};

fn sweep_lines(switches: u32) -> Vec<String> {
    let bench = SimBench::new(SimBenchSetup {
        pulses_per_run: 4,
        switches,
        start_button_held: true,
    });
    let mut out = Vec::new();
    run_sweep(&bench, &SweepPlan { start: 2, end: 10, step: 2 }, &mut out).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

fn check_rows(lines: &[String]) {
    assert_eq!(
        lines[1],
        "Period, Pulse_Width, BG_Tasks Run, Latency, Missed, Multiple"
    );
    assert_eq!(lines[2], "Press PB0 to start.");
    let rows = &lines[3..];
    assert_eq!(rows.len(), 5, "one row per swept period");
    for (row, period) in rows.iter().zip([2u32, 4, 6, 8, 10]) {
        let fields: Vec<u32> = row.split(',').map(|f| f.parse().unwrap()).collect();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0], period);
        assert_eq!(fields[1], period / 2);
    }
}

#[test]
fn polling_sweep_emits_one_row_per_period() {
    let lines = sweep_lines(1);
    assert_eq!(lines[0], "Polling method selected.");
    check_rows(&lines);
}

#[test]
fn interrupt_sweep_emits_one_row_per_period() {
    let lines = sweep_lines(0);
    assert_eq!(lines[0], "Interrupt method selected.");
    check_rows(&lines);
}

#[test]
fn sweeps_are_deterministic() {
    assert_eq!(sweep_lines(0), sweep_lines(0));
    assert_eq!(sweep_lines(1), sweep_lines(1));
}

#[test]
fn background_work_scales_with_the_period() {
    let bench = SimBench::new(SimBenchSetup {
        pulses_per_run: 4,
        switches: 0,
        start_button_held: true,
    });
    let mut out = Vec::new();
    run_sweep(&bench, &SweepPlan { start: 100, end: 400, step: 300 }, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let rows: Vec<Vec<u32>> = text
        .lines()
        .skip(3)
        .map(|row| row.split(',').map(|f| f.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows.len(), 2);
    // a longer pulse train leaves room for more background calls
    assert!(rows[1][2] > rows[0][2]);
}
