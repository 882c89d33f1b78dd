// Types shared between the deck's interrupt handlers, the playback loop,
// and the front panel.

/// Hard capacity of the track catalog.
pub const MAX_TRACKS: usize = 20;

/// Bytes streamed from disk per chunk.
pub const CHUNK_SIZE: usize = 1000;

/// Button register value with nothing held (active-low nibble).
pub const BUTTON_IDLE: u8 = 0b1111;

/// What the deck is doing right now, as shown on the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayMode {
    Stopped,
    Paused,
    Normal,
    HalfSpeed,
    DoubleSpeed,
    Mono,
}

impl PlayMode {
    pub fn label(self) -> &'static str {
        match self {
            PlayMode::Stopped => "STOPPED",
            PlayMode::Paused => "PAUSED",
            PlayMode::Normal => "PBACK-NORM SPD",
            PlayMode::HalfSpeed => "PBACK-HALF SPD",
            PlayMode::DoubleSpeed => "PBACK-DBL SPD",
            PlayMode::Mono => "PBACK-MONO",
        }
    }
}

/// The four transport actions, one per push button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    PreviousTrack,
    Stop,
    PlayPause,
    NextTrack,
}

impl ButtonAction {
    /// Decode a button register read. Only the four single-button-held
    /// patterns count; anything else (idle, chords, bounce garbage) is None.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0b0111 => Some(ButtonAction::PreviousTrack),
            0b1011 => Some(ButtonAction::Stop),
            0b1101 => Some(ButtonAction::PlayPause),
            0b1110 => Some(ButtonAction::NextTrack),
            _ => None,
        }
    }
}
