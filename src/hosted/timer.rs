// The debounce interval timer as a thread: while armed it delivers a tick
// per period onto the IRQ channel; stopping it just drops the flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};

use crate::board::{DebounceTimer, IrqLine};

pub struct TickTimer {
    armed: Arc<AtomicBool>,
}

impl TickTimer {
    pub fn spawn(period: Duration, irq_tx: Sender<IrqLine>) -> Self {
        let armed = Arc::new(AtomicBool::new(false));
        let flag = armed.clone();
        let _ = thread::spawn(move || {
            loop {
                if flag.load(Ordering::Relaxed) {
                    thread::sleep(period);
                    // re-check: a stop() during the sleep cancels the tick
                    if flag.load(Ordering::Relaxed) {
                        match irq_tx.try_send(IrqLine::TimerTick) {
                            // a full queue already has a tick waiting
                            Ok(()) | Err(TrySendError::Full(_)) => {}
                            Err(TrySendError::Disconnected(_)) => return,
                        }
                    }
                } else {
                    thread::sleep(Duration::from_millis(2));
                }
            }
        });
        Self { armed }
    }
}

impl DebounceTimer for TickTimer {
    fn start(&self) {
        self.armed.store(true, Ordering::Relaxed);
    }

    fn stop(&self) {
        self.armed.store(false, Ordering::Relaxed);
    }

    fn ack(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armed_timer_ticks_until_stopped() {
        let (tx, rx) = crossbeam_channel::bounded(16);
        let timer = TickTimer::spawn(Duration::from_millis(5), tx);
        timer.start();
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(500)),
            Ok(IrqLine::TimerTick)
        );
        timer.stop();
        // drain anything in flight, then expect silence
        while rx.try_recv().is_ok() {}
        std::thread::sleep(Duration::from_millis(30));
        assert!(rx.try_recv().is_err());
    }
}
