// Deterministic bench for the latency harness: a virtual clock that
// advances one tick per register access, driving a modeled pulse
// generator. Interrupts are delivered at access boundaries, never nested.
// Identical setup always produces identical tick sequences, so
// characterization runs are exactly repeatable.

use std::cell::{Cell, RefCell};

use crate::board::Bench;

type PulseHandler = Box<dyn FnMut(&dyn Bench)>;

#[derive(Clone, Copy, Debug)]
pub struct SimBenchSetup {
    /// Length of the pulse train emitted per enable.
    pub pulses_per_run: u32,
    pub switches: u32,
    /// Whether the start button reads as held (active-low bit 0).
    pub start_button_held: bool,
}

impl Default for SimBenchSetup {
    fn default() -> Self {
        Self {
            pulses_per_run: 16,
            switches: 0,
            start_button_held: true,
        }
    }
}

pub struct SimBench {
    setup: SimBenchSetup,
    clock: Cell<u64>,
    leds: Cell<u32>,
    irq_enabled: Cell<bool>,
    irq_pending: Cell<bool>,
    in_irq: Cell<bool>,
    handler: RefCell<Option<PulseHandler>>,
    egm: RefCell<EgmModel>,
}

impl SimBench {
    pub fn new(setup: SimBenchSetup) -> Self {
        Self {
            setup,
            clock: Cell::new(0),
            leds: Cell::new(0),
            irq_enabled: Cell::new(false),
            irq_pending: Cell::new(false),
            in_irq: Cell::new(false),
            handler: RefCell::new(None),
            egm: RefCell::new(EgmModel::new(setup.pulses_per_run as u64)),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.clock.get()
    }

    /// One register access: advance the clock, move the generator model
    /// forward, and deliver any pending pulse interrupt.
    fn touch(&self) -> u64 {
        let now = self.clock.get() + 1;
        self.clock.set(now);
        let edge = self.egm.borrow_mut().advance_to(now);
        if edge && self.irq_enabled.get() {
            self.irq_pending.set(true);
        }
        self.maybe_dispatch();
        now
    }

    fn maybe_dispatch(&self) {
        if !self.irq_pending.get() || self.in_irq.get() {
            return;
        }
        // take the handler out so its own register accesses can re-borrow
        let taken = self.handler.borrow_mut().take();
        if let Some(mut handler) = taken {
            self.in_irq.set(true);
            handler(self);
            self.in_irq.set(false);
            *self.handler.borrow_mut() = Some(handler);
        }
    }
}

impl Bench for SimBench {
    fn led_read(&self) -> u32 {
        self.touch();
        self.leds.get()
    }

    fn led_write(&self, value: u32) {
        self.touch();
        self.leds.set(value);
    }

    fn switches(&self) -> u32 {
        self.touch();
        self.setup.switches
    }

    fn buttons(&self) -> u32 {
        self.touch();
        if self.setup.start_button_held { 0b1110 } else { 0b1111 }
    }

    fn egm_set_enabled(&self, enabled: bool) {
        let now = self.touch();
        self.egm.borrow_mut().set_enabled(enabled, now);
    }

    fn egm_set_period(&self, period: u32) {
        self.touch();
        self.egm.borrow_mut().period = period.max(1) as u64;
    }

    fn egm_set_pulse_width(&self, width: u32) {
        self.touch();
        self.egm.borrow_mut().width = width as u64;
    }

    fn egm_busy(&self) -> bool {
        self.touch();
        self.egm.borrow().is_busy()
    }

    fn egm_average_latency(&self) -> u32 {
        self.touch();
        self.egm.borrow().average_latency()
    }

    fn egm_missed_pulses(&self) -> u32 {
        self.touch();
        self.egm.borrow().missed
    }

    fn egm_multiple_pulses(&self) -> u32 {
        self.touch();
        self.egm.borrow().multiple
    }

    fn stimulus_level(&self) -> bool {
        let now = self.touch();
        self.egm.borrow().level(now)
    }

    fn stimulus_enable_irq(&self) {
        self.touch();
        self.irq_enabled.set(true);
    }

    fn stimulus_ack(&self) {
        self.touch();
        self.irq_pending.set(false);
    }

    fn respond(&self) {
        let now = self.touch(); // response line high
        self.egm.borrow_mut().respond(now);
        self.touch(); // response line low
    }

    fn set_pulse_handler(&self, handler: PulseHandler) {
        *self.handler.borrow_mut() = Some(handler);
    }
}

/// Pulse generator model. Pulse `k` starts at `t0 + k*period` and holds
/// its line high for `width` ticks; the train is `pulses_per_run` long.
/// Each pulse is scored on its rising edge's successor: no response in
/// its interval counts as missed, more than one as multiple, and the
/// first response's delay feeds the latency average.
struct EgmModel {
    enabled: bool,
    period: u64,
    width: u64,
    pulses_per_run: u64,
    t0: u64,
    cursor: u64,
    finished: bool,
    current_pulse: Option<u64>,
    responses_in_pulse: u32,
    latency_sum: u64,
    latency_count: u64,
    missed: u32,
    multiple: u32,
}

impl EgmModel {
    fn new(pulses_per_run: u64) -> Self {
        Self {
            enabled: false,
            period: 1,
            width: 0,
            pulses_per_run,
            t0: 0,
            cursor: 0,
            finished: false,
            current_pulse: None,
            responses_in_pulse: 0,
            latency_sum: 0,
            latency_count: 0,
            missed: 0,
            multiple: 0,
        }
    }

    fn set_enabled(&mut self, enabled: bool, now: u64) {
        if enabled && !self.enabled {
            self.t0 = now + 1;
            self.cursor = now;
            self.finished = false;
            self.current_pulse = None;
            self.responses_in_pulse = 0;
            self.latency_sum = 0;
            self.latency_count = 0;
            self.missed = 0;
            self.multiple = 0;
        }
        self.enabled = enabled;
    }

    /// Walk the rising edges crossed since the last access. Returns true
    /// if at least one edge fired.
    fn advance_to(&mut self, now: u64) -> bool {
        if !self.enabled || self.finished {
            self.cursor = now;
            return false;
        }
        let mut edge = false;
        let mut k = if self.cursor < self.t0 {
            0
        } else {
            (self.cursor - self.t0) / self.period + 1
        };
        while k < self.pulses_per_run {
            let at = self.t0 + k * self.period;
            if at > now {
                break;
            }
            self.finalize_current();
            self.current_pulse = Some(at);
            self.responses_in_pulse = 0;
            edge = true;
            k += 1;
        }
        if now >= self.t0 + self.pulses_per_run * self.period {
            self.finalize_current();
            self.finished = true;
        }
        self.cursor = now;
        edge
    }

    fn finalize_current(&mut self) {
        if self.current_pulse.take().is_some() {
            if self.responses_in_pulse == 0 {
                self.missed += 1;
            } else if self.responses_in_pulse > 1 {
                self.multiple += 1;
            }
        }
    }

    fn respond(&mut self, now: u64) {
        if !self.enabled {
            return;
        }
        if let Some(start) = self.current_pulse {
            self.responses_in_pulse += 1;
            if self.responses_in_pulse == 1 {
                self.latency_sum += now - start;
                self.latency_count += 1;
            }
        }
        // a response with no pulse outstanding (before the train, or after
        // it finished) is not attributable and is dropped
    }

    fn is_busy(&self) -> bool {
        self.enabled && !self.finished
    }

    fn level(&self, now: u64) -> bool {
        if !self.enabled || self.finished || now < self.t0 {
            return false;
        }
        let elapsed = now - self.t0;
        elapsed / self.period < self.pulses_per_run && elapsed % self.period < self.width
    }

    fn average_latency(&self) -> u32 {
        if self.latency_count == 0 {
            0
        } else {
            (self.latency_sum / self.latency_count) as u32
        }
    }
}
