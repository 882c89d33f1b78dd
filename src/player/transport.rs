// Transport state shared between the timer handler and the playback loop.
// The whole record sits behind one mutex, and a condvar wakes the playback
// loop out of its pause/stopped waits instead of letting it spin.

use std::sync::{Condvar, Mutex, MutexGuard};

use crate::shared::{BUTTON_IDLE, ButtonAction, PlayMode};

/// What the handler must render after a transition: `(track index, mode)`.
/// `None` means the transition was a no-op and the panel is left alone.
pub type DisplayUpdate = Option<(usize, PlayMode)>;

#[derive(Clone, Debug)]
pub struct Transport {
    pub playing: bool,
    pub stopped: bool,
    pub play_mode: PlayMode,
    /// Tells the streaming loop to abandon the current track mid-buffer.
    pub terminate: bool,
    /// Set by prev/next so the foreground loop restarts instead of stopping.
    pub track_change: bool,
    /// Debounce latch: the last button code read by the timer handler.
    pub pending: u8,
    pub cur_index: usize,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            playing: false,
            stopped: true,
            play_mode: PlayMode::Normal,
            terminate: false,
            track_change: false,
            pending: BUTTON_IDLE,
            cur_index: 0,
        }
    }
}

impl Transport {
    pub fn apply(&mut self, action: ButtonAction, num_tracks: usize) -> DisplayUpdate {
        match action {
            ButtonAction::PreviousTrack => self.previous_track(num_tracks),
            ButtonAction::Stop => self.toggle_stop(),
            ButtonAction::PlayPause => self.toggle_play_pause(),
            ButtonAction::NextTrack => self.next_track(num_tracks),
        }
    }

    pub fn previous_track(&mut self, num_tracks: usize) -> DisplayUpdate {
        if num_tracks == 0 {
            return None;
        }
        self.terminate = true;
        self.cur_index = if self.cur_index > 0 {
            self.cur_index - 1
        } else {
            num_tracks - 1
        };
        self.track_change = true;
        Some((self.cur_index, self.audible_mode()))
    }

    pub fn next_track(&mut self, num_tracks: usize) -> DisplayUpdate {
        if num_tracks == 0 {
            return None;
        }
        self.terminate = true;
        self.cur_index = (self.cur_index + 1) % num_tracks;
        self.track_change = true;
        Some((self.cur_index, self.audible_mode()))
    }

    /// Idempotent: pressing stop while already stopped changes nothing and
    /// triggers no display refresh.
    pub fn toggle_stop(&mut self) -> DisplayUpdate {
        if self.stopped {
            return None;
        }
        self.stopped = true;
        self.terminate = true;
        self.playing = false;
        Some((self.cur_index, PlayMode::Stopped))
    }

    pub fn toggle_play_pause(&mut self) -> DisplayUpdate {
        self.stopped = false;
        self.playing = !self.playing;
        let mode = if self.playing {
            self.play_mode
        } else {
            PlayMode::Paused
        };
        Some((self.cur_index, mode))
    }

    fn audible_mode(&self) -> PlayMode {
        if self.playing {
            self.play_mode
        } else {
            PlayMode::Stopped
        }
    }
}

/// Outcome of waiting at a chunk boundary while paused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauseWait {
    Resumed,
    Terminated,
}

pub struct SharedTransport {
    inner: Mutex<Transport>,
    cond: Condvar,
}

impl Default for SharedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedTransport {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Transport::default()),
            cond: Condvar::new(),
        }
    }

    /// Run `f` under the lock and wake any waiter. Lock poisoning is fatal:
    /// a handler that panicked mid-transition leaves no state worth saving.
    pub fn with<R>(&self, f: impl FnOnce(&mut Transport) -> R) -> R {
        let result = f(&mut self.inner.lock().unwrap());
        self.cond.notify_all();
        result
    }

    pub fn snapshot(&self) -> Transport {
        self.inner.lock().unwrap().clone()
    }

    pub fn lock(&self) -> MutexGuard<'_, Transport> {
        self.inner.lock().unwrap()
    }

    /// Consume a pending terminate request, if any. Checked once per
    /// sample-stride iteration by the streaming loop.
    pub fn take_terminate(&self) -> bool {
        self.with(|t| {
            if t.terminate {
                t.terminate = false;
                true
            } else {
                false
            }
        })
    }

    /// Block until the deck is playing.
    pub fn wait_for_play(&self) {
        let mut guard = self.inner.lock().unwrap();
        while !guard.playing {
            guard = self.cond.wait(guard).unwrap();
        }
    }

    /// Chunk-boundary wait: returns immediately while playing, otherwise
    /// blocks until resume or terminate. A terminate observed here is
    /// consumed, same as in the stride loop.
    pub fn pause_or_terminate(&self) -> PauseWait {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if guard.terminate {
                guard.terminate = false;
                return PauseWait::Terminated;
            }
            if guard.playing {
                return PauseWait::Resumed;
            }
            guard = self.cond.wait(guard).unwrap();
        }
    }
}
