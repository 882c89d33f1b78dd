// Two-phase button debounce. A button edge only arms the timer; the timer
// handler does the real work. The first tick latches whatever the button
// register reads; the next tick dispatches only if the same single-button
// code is still being read. One transient read can never dispatch.

use crate::shared::{BUTTON_IDLE, ButtonAction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceStep {
    /// Latch this code and keep the timer running for the confirm tick.
    Armed(u8),
    /// Same code seen across two consecutive ticks: act on it.
    Dispatch(ButtonAction),
    /// Register settled back to idle; end the debounce session.
    Idle,
}

/// One timer tick of the state machine. `pending` is the previously
/// latched code, `fresh` the register read taken this tick.
pub fn step(pending: u8, fresh: u8) -> DebounceStep {
    if let Some(action) = ButtonAction::from_code(pending) {
        if fresh == pending {
            return DebounceStep::Dispatch(action);
        }
    }
    if fresh == BUTTON_IDLE {
        DebounceStep::Idle
    } else {
        DebounceStep::Armed(fresh)
    }
}
