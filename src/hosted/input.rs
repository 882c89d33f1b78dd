// Terminal keys standing in for the push buttons. Keys 1-4 map onto the
// active-low bits 3..0 (previous, stop, play/pause, next); press pulls a
// bit low, release lets it back up, and both edges raise the button IRQ
// like the edge-capture register they emulate.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::board::{ButtonInput, IrqLine};
use crate::shared::BUTTON_IDLE;

pub struct KeyButtons {
    register: AtomicU8,
    /// Last press/repeat per button, for terminals that never send
    /// release events.
    last_touch: Mutex<[Option<Instant>; 4]>,
    irq_tx: Sender<IrqLine>,
}

impl KeyButtons {
    pub fn new(irq_tx: Sender<IrqLine>) -> Self {
        Self {
            register: AtomicU8::new(BUTTON_IDLE),
            last_touch: Mutex::new([None; 4]),
            irq_tx,
        }
    }

    /// Feed one terminal key event. Returns false if the key is not a
    /// button key.
    pub fn handle_key(&self, key: &KeyEvent) -> bool {
        let bit = match key.code {
            KeyCode::Char('1') => 3,
            KeyCode::Char('2') => 2,
            KeyCode::Char('3') => 1,
            KeyCode::Char('4') => 0,
            _ => return false,
        };
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.last_touch.lock().unwrap()[bit] = Some(Instant::now());
                if key.kind == KeyEventKind::Press {
                    self.set_bit(bit, false);
                }
            }
            KeyEventKind::Release => {
                self.last_touch.lock().unwrap()[bit] = None;
                self.set_bit(bit, true);
            }
        }
        true
    }

    /// Release any button whose key has gone quiet. Terminals without
    /// keyboard enhancement report presses and repeats but never a
    /// release; without this the register would latch low forever.
    pub fn expire_held(&self, timeout: Duration) {
        let mut last_touch = self.last_touch.lock().unwrap();
        for (bit, touched) in last_touch.iter_mut().enumerate() {
            if let Some(at) = *touched {
                if at.elapsed() > timeout {
                    *touched = None;
                    self.set_bit(bit, true);
                }
            }
        }
    }

    fn set_bit(&self, bit: usize, high: bool) {
        let mask = 1u8 << bit;
        let old = self.register.load(Ordering::Relaxed);
        let new = if high { old | mask } else { old & !mask };
        if new != old {
            self.register.store(new, Ordering::Relaxed);
            let _ = self.irq_tx.try_send(IrqLine::ButtonEdge);
        }
    }
}

impl ButtonInput for KeyButtons {
    fn read(&self) -> u8 {
        self.register.load(Ordering::Relaxed)
    }

    // edge capture lives in the IRQ channel; nothing to mask or clear here
    fn enable_irq(&self) {}

    fn ack_irq(&self) {}
}
