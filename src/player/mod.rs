// Deck wiring: the two interrupt handlers (button edge, debounce tick) and
// the foreground playback loop, all sharing one transport record.

pub mod catalog;
pub mod debounce;
pub mod display;
pub mod fsdiag;
pub mod playback;
pub mod transport;

use std::sync::Arc;

use crate::board::{AudioSink, ButtonInput, DebounceTimer, ModeSwitches};
use crate::shared::{BUTTON_IDLE, PlayMode};

use catalog::Catalog;
use debounce::DebounceStep;
use display::DisplayWriter;
use transport::SharedTransport;

pub struct DeckDevices {
    pub buttons: Arc<dyn ButtonInput>,
    pub timer: Arc<dyn DebounceTimer>,
    pub switches: Arc<dyn ModeSwitches>,
    pub audio: Arc<dyn AudioSink>,
}

pub struct Deck {
    shared: Arc<SharedTransport>,
    catalog: Arc<Catalog>,
    display: Arc<DisplayWriter>,
    buttons: Arc<dyn ButtonInput>,
    timer: Arc<dyn DebounceTimer>,
    switches: Arc<dyn ModeSwitches>,
    audio: Arc<dyn AudioSink>,
}

impl Deck {
    pub fn new(catalog: Catalog, display: DisplayWriter, devices: DeckDevices) -> Self {
        Self {
            shared: Arc::new(SharedTransport::new()),
            catalog: Arc::new(catalog),
            display: Arc::new(display),
            buttons: devices.buttons,
            timer: devices.timer,
            switches: devices.switches,
            audio: devices.audio,
        }
    }

    pub fn shared(&self) -> &Arc<SharedTransport> {
        &self.shared
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Enable the button line and show track 1, stopped. Run once before
    /// handlers are live.
    pub fn startup(&self) {
        self.buttons.enable_irq();
        self.buttons.ack_irq();
        self.display.write(&self.catalog, 0, PlayMode::Stopped);
    }

    /// Button-edge handler: capture only. Arms the debounce timer and
    /// clears its own request; the tick handler decides what to do.
    pub fn on_button_edge(&self) {
        self.timer.start();
        self.buttons.ack_irq();
    }

    /// Debounce tick handler: arm on the first stable read, dispatch when
    /// the same code survives into the next tick.
    pub fn on_timer_tick(&self) {
        let fresh = self.buttons.read();
        let pending = self.shared.with(|t| t.pending);
        match debounce::step(pending, fresh) {
            DebounceStep::Dispatch(action) => {
                let update = self.shared.with(|t| {
                    t.pending = BUTTON_IDLE;
                    t.apply(action, self.catalog.len())
                });
                if let Some((index, mode)) = update {
                    self.display.write(&self.catalog, index, mode);
                }
                self.timer.stop();
            }
            DebounceStep::Armed(code) => {
                self.shared.with(|t| t.pending = code);
            }
            DebounceStep::Idle => {
                self.shared.with(|t| t.pending = BUTTON_IDLE);
                self.timer.stop();
            }
        }
        self.timer.ack();
        self.buttons.ack_irq();
    }

    /// Foreground loop: wait for play, stream the current track, then sort
    /// out whether the track ended on its own or was switched away from.
    pub fn run(&self) -> anyhow::Result<()> {
        loop {
            self.shared.wait_for_play();
            let index = self.shared.with(|t| t.cur_index);
            playback::play_track(
                &self.catalog,
                index,
                self.switches.as_ref(),
                self.audio.as_ref(),
                &self.shared,
                &self.display,
            )?;
            let update = self.shared.with(|t| {
                if !t.track_change {
                    // natural end of track
                    t.stopped = true;
                    t.playing = false;
                    Some((t.cur_index, PlayMode::Stopped))
                } else {
                    if !t.playing {
                        t.stopped = true;
                    }
                    t.track_change = false;
                    None
                }
            });
            if let Some((index, mode)) = update {
                self.display.write(&self.catalog, index, mode);
            }
        }
    }
}
