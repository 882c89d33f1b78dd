// Real-device backends for the deck binary.

pub mod audio;
pub mod input;
pub mod irq;
pub mod lcd;
pub mod timer;

pub use audio::{HostedAudio, probe_sample_rate, start_audio};
pub use input::KeyButtons;
pub use irq::IrqRuntime;
pub use lcd::LcdModel;
pub use timer::TickTimer;
