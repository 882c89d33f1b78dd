// Panel writer. Callable from handler context, so it must never block:
// the busy guard is lossy by design, dropping a write that races an
// in-flight one instead of queueing it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::board::TextDisplay;
use crate::player::catalog::Catalog;
use crate::shared::PlayMode;

pub struct DisplayWriter {
    device: Arc<dyn TextDisplay>,
    busy: AtomicBool,
}

impl DisplayWriter {
    pub fn new(device: Arc<dyn TextDisplay>) -> Self {
        Self {
            device,
            busy: AtomicBool::new(false),
        }
    }

    /// Render the 1-indexed track number, its name, and the mode string.
    pub fn write(&self, catalog: &Catalog, index: usize, mode: PlayMode) {
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return; // another writer holds the device; drop this update
        }
        self.device.clear();
        let name = catalog.get(index).map(|t| t.name.as_str()).unwrap_or("");
        self.device.write_line(&format!("{} - {}", index + 1, name));
        self.device.write_line(mode.label());
        self.busy.store(false, Ordering::Release);
    }
}
