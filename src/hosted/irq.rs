// Interrupt runtime for the deck: devices push line events onto one
// bounded channel and a single dispatch thread runs the registered
// handlers, so no two handlers ever overlap. One queue, one thread,
// handler order within a line event is registration order.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::board::IrqLine;

type Handler = Box<dyn FnMut() + Send>;

pub struct IrqRuntime {
    tx: Sender<IrqLine>,
    rx: Receiver<IrqLine>,
    handlers: Vec<(IrqLine, Handler)>,
}

impl IrqRuntime {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self {
            tx,
            rx,
            handlers: Vec::new(),
        }
    }

    /// A clone of this sender is what a device raises its line with.
    pub fn sender(&self) -> Sender<IrqLine> {
        self.tx.clone()
    }

    pub fn register(&mut self, line: IrqLine, handler: Handler) {
        self.handlers.push((line, handler));
    }

    /// Consume the runtime into its dispatch thread. The thread drains
    /// until every device sender is gone.
    pub fn spawn(self) -> JoinHandle<()> {
        let IrqRuntime { tx, rx, mut handlers } = self;
        drop(tx); // only device clones keep the channel open
        std::thread::spawn(move || {
            for line in rx {
                for (registered, handler) in handlers.iter_mut() {
                    if *registered == line {
                        handler();
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn events_reach_only_their_line() {
        let mut runtime = IrqRuntime::new(8);
        let ticks = Arc::new(AtomicU32::new(0));
        let edges = Arc::new(AtomicU32::new(0));
        let (t, e) = (ticks.clone(), edges.clone());
        runtime.register(IrqLine::TimerTick, Box::new(move || {
            t.fetch_add(1, Ordering::Relaxed);
        }));
        runtime.register(IrqLine::ButtonEdge, Box::new(move || {
            e.fetch_add(1, Ordering::Relaxed);
        }));
        let sender = runtime.sender();
        let handle = runtime.spawn();
        sender.send(IrqLine::TimerTick).unwrap();
        sender.send(IrqLine::TimerTick).unwrap();
        sender.send(IrqLine::ButtonEdge).unwrap();
        drop(sender);
        handle.join().unwrap();
        assert_eq!(ticks.load(Ordering::Relaxed), 2);
        assert_eq!(edges.load(Ordering::Relaxed), 1);
    }
}
