// Per-run counters, reset at the top of every sweep iteration and printed
// as one six-column CSV row.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PulseMetrics {
    pub period: u32,
    pub pulse_width: u32,
    pub bg_task_calls_run: u32,
    pub average_latency: u32,
    pub missed_pulses: u32,
    pub multiple_pulses: u32,
}

impl PulseMetrics {
    pub const CSV_HEADER: &'static str =
        "Period, Pulse_Width, BG_Tasks Run, Latency, Missed, Multiple";

    pub fn csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.period,
            self.pulse_width,
            self.bg_task_calls_run,
            self.average_latency,
            self.missed_pulses,
            self.multiple_pulses,
        )
    }
}
