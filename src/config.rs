// Settings file standing in for the board's DIP switches, plus the
// hosted-only tunables. Lives next to the media as
// <dir>/.pulsedeck/config.json; missing or unreadable files fall back to
// defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const PULSEDECK_DIR: &str = ".pulsedeck";
const CONFIG_FILE: &str = "config.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Low 2 bits pick the playback policy (00 normal, 01 half, 10 double,
    /// 11 mono), read once per track start.
    pub mode_switches: u8,
    /// Bench strategy switch: false = interrupt-driven, true = polling.
    pub harness_polling: bool,
    /// Debounce timer period in milliseconds.
    pub debounce_ms: u64,
    /// Depth of each hosted audio FIFO half, in samples.
    pub fifo_depth: usize,
    /// Period sweep bounds for the latency bench, inclusive.
    pub sweep_start: u32,
    pub sweep_end: u32,
    pub sweep_step: u32,
    /// Pulses the simulated generator emits per enabled run.
    pub pulses_per_run: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode_switches: 0,
            harness_polling: false,
            debounce_ms: 30,
            fifo_depth: 1024,
            sweep_start: 2,
            sweep_end: 5000,
            sweep_step: 2,
            pulses_per_run: 16,
        }
    }
}

fn config_file_path(dir: &Path) -> PathBuf {
    dir.join(PULSEDECK_DIR).join(CONFIG_FILE)
}

pub fn load(dir: &Path) -> Option<Config> {
    let path = config_file_path(dir);
    let data = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data).ok()
}

// Write the settings back out, creating .pulsedeck/ if needed.
pub fn save(dir: &Path, config: &Config) -> anyhow::Result<()> {
    let path = config_file_path(dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
