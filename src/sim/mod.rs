// Deterministic stand-ins for the board: a virtual-clock bench for the
// latency harness and scripted doubles for the deck's peripherals.

mod bench;
mod player;

pub use bench::{SimBench, SimBenchSetup};
pub use player::{CaptureLcd, CaptureSink, FixedSwitches, ManualTimer, ScriptedButtons};
