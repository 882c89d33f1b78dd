// Scripted doubles for the deck's peripherals. Used by the unit and
// integration tests to drive the handlers deterministically; no timing,
// no threads, every read comes off a script.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::board::{AudioChannel, AudioSink, ButtonInput, DebounceTimer, ModeSwitches, TextDisplay};
use crate::shared::BUTTON_IDLE;

/// Button register whose reads come from a fixed script; once the script
/// is exhausted the register reads idle.
pub struct ScriptedButtons {
    reads: Mutex<VecDeque<u8>>,
    acks: AtomicU32,
}

impl ScriptedButtons {
    pub fn new(reads: &[u8]) -> Self {
        Self {
            reads: Mutex::new(reads.iter().copied().collect()),
            acks: AtomicU32::new(0),
        }
    }

    pub fn acks(&self) -> u32 {
        self.acks.load(Ordering::Relaxed)
    }
}

impl ButtonInput for ScriptedButtons {
    fn read(&self) -> u8 {
        self.reads.lock().unwrap().pop_front().unwrap_or(BUTTON_IDLE)
    }

    fn enable_irq(&self) {}

    fn ack_irq(&self) {
        self.acks.fetch_add(1, Ordering::Relaxed);
    }
}

/// Timer that only records arm/stop calls; tests invoke the tick handler
/// themselves.
#[derive(Default)]
pub struct ManualTimer {
    started: AtomicBool,
    starts: AtomicU32,
    stops: AtomicU32,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::Relaxed)
    }

    pub fn stops(&self) -> u32 {
        self.stops.load(Ordering::Relaxed)
    }
}

impl DebounceTimer for ManualTimer {
    fn start(&self) {
        self.started.store(true, Ordering::Relaxed);
        self.starts.fetch_add(1, Ordering::Relaxed);
    }

    fn stop(&self) {
        self.started.store(false, Ordering::Relaxed);
        self.stops.fetch_add(1, Ordering::Relaxed);
    }

    fn ack(&self) {}
}

/// Mode switches pinned to a constant value.
pub struct FixedSwitches(pub u8);

impl ModeSwitches for FixedSwitches {
    fn read(&self) -> u8 {
        self.0
    }
}

type WriteHook = Box<dyn Fn(AudioChannel, usize) + Send + Sync>;

/// Audio sink with unbounded space that records every sample per channel.
/// An optional hook observes each write (with the channel's running write
/// count) so tests can flip transport flags mid-stream.
#[derive(Default)]
pub struct CaptureSink {
    left: Mutex<Vec<u16>>,
    right: Mutex<Vec<u16>>,
    hook: Mutex<Option<WriteHook>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_write_hook(&self, hook: WriteHook) {
        *self.hook.lock().unwrap() = Some(hook);
    }

    pub fn channel(&self, channel: AudioChannel) -> Vec<u16> {
        match channel {
            AudioChannel::Left => self.left.lock().unwrap().clone(),
            AudioChannel::Right => self.right.lock().unwrap().clone(),
        }
    }
}

impl AudioSink for CaptureSink {
    fn wait_space(&self, _channel: AudioChannel) {}

    fn write(&self, channel: AudioChannel, sample: u16) {
        let written = {
            let mut samples = match channel {
                AudioChannel::Left => self.left.lock().unwrap(),
                AudioChannel::Right => self.right.lock().unwrap(),
            };
            samples.push(sample);
            samples.len()
        };
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook(channel, written);
        }
    }
}

/// Text display that counts clears and keeps the lines written since the
/// last clear.
#[derive(Default)]
pub struct CaptureLcd {
    clears: AtomicU32,
    lines: Mutex<Vec<String>>,
}

impl CaptureLcd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clears(&self) -> u32 {
        self.clears.load(Ordering::Relaxed)
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl TextDisplay for CaptureLcd {
    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
        self.lines.lock().unwrap().clear();
    }

    fn write_line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
