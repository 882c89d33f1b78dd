// The streaming loop: pull fixed-size chunks off disk, walk them at the
// stride the mode switch selected, and push decoded stereo samples into
// the per-channel FIFOs.

use std::fs::File;
use std::io::Read;

use crate::board::{AudioChannel, AudioSink, ModeSwitches};
use crate::player::catalog::Catalog;
use crate::player::display::DisplayWriter;
use crate::player::fsdiag;
use crate::player::transport::{PauseWait, SharedTransport};
use crate::shared::{CHUNK_SIZE, PlayMode};

/// Speed/channel policy, fixed for the duration of one track. The stride
/// is in bytes over interleaved 16-bit stereo frames: 4 is real-time,
/// 2 revisits each frame twice (half speed), 8 skips every other frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeedPolicy {
    pub stride: usize,
    pub mono: bool,
    pub mode: PlayMode,
}

impl SpeedPolicy {
    pub fn from_switches(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self { stride: 4, mono: false, mode: PlayMode::Normal },
            0b01 => Self { stride: 2, mono: false, mode: PlayMode::HalfSpeed },
            0b10 => Self { stride: 8, mono: false, mode: PlayMode::DoubleSpeed },
            _ => Self { stride: 4, mono: true, mode: PlayMode::Mono },
        }
    }
}

/// Stream one track until it runs out, or until a terminate request is
/// observed (checked once per stride iteration and once per pause wait).
/// Media errors are reported and swallowed; the deck plays on.
pub fn play_track(
    catalog: &Catalog,
    index: usize,
    switches: &dyn ModeSwitches,
    audio: &dyn AudioSink,
    shared: &SharedTransport,
    display: &DisplayWriter,
) -> anyhow::Result<()> {
    let policy = SpeedPolicy::from_switches(switches.read());
    shared.with(|t| t.play_mode = policy.mode);
    display.write(catalog, index, policy.mode);

    let (path, size_bytes) = match (catalog.path_of(index), catalog.get(index)) {
        (Some(path), Some(track)) => (path, track.size_bytes),
        _ => return Ok(()), // index raced past a rescan; nothing to play
    };
    let mut file = match File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            fsdiag::report("open", &err);
            return Ok(());
        }
    };

    let mut buf = [0u8; CHUNK_SIZE];
    let mut remaining = size_bytes;
    while remaining > 0 {
        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        let count = match file.read(&mut buf[..want]) {
            Ok(count) => count,
            Err(err) => {
                fsdiag::report("read", &err);
                return Ok(());
            }
        };
        if count == 0 {
            break; // file shorter than the catalog said
        }

        let mut i = 0;
        while i < count {
            // Off-4-byte stride positions round down by 2 to stay
            // sample-aligned (the half-speed revisit rule).
            let ind = if i % 4 == 0 { i } else { i - 2 };
            if ind + 4 > count {
                break; // partial tail, no whole frame left
            }
            let left = u16::from_le_bytes([buf[ind], buf[ind + 1]]);
            let right = u16::from_le_bytes([buf[ind + 2], buf[ind + 3]]);
            audio.wait_space(AudioChannel::Left);
            audio.wait_space(AudioChannel::Right);
            audio.write(AudioChannel::Right, if policy.mono { left } else { right });
            audio.write(AudioChannel::Left, left);
            if shared.take_terminate() {
                return Ok(());
            }
            i += policy.stride;
        }

        remaining -= count as u64;
        if shared.pause_or_terminate() == PauseWait::Terminated {
            return Ok(());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::AudioChannel;
    use crate::sim::{CaptureLcd, CaptureSink, FixedSwitches};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn media_dir(tag: &str, frames: &[(u16, u16)]) -> PathBuf {
        static N: AtomicU32 = AtomicU32::new(0);
        let dir = std::env::temp_dir().join(format!(
            "pulsedeck-playback-{}-{}-{}",
            tag,
            std::process::id(),
            N.fetch_add(1, Ordering::Relaxed),
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let mut bytes = Vec::with_capacity(frames.len() * 4);
        for &(l, r) in frames {
            bytes.extend_from_slice(&l.to_le_bytes());
            bytes.extend_from_slice(&r.to_le_bytes());
        }
        std::fs::write(dir.join("T.WAV"), bytes).unwrap();
        dir
    }

    fn playing_shared() -> Arc<SharedTransport> {
        let shared = Arc::new(SharedTransport::new());
        shared.with(|t| {
            t.playing = true;
            t.stopped = false;
        });
        shared
    }

    fn run(dir: &PathBuf, switches: u8, shared: &SharedTransport) -> Arc<CaptureSink> {
        let catalog = Catalog::scan(dir).unwrap();
        let sink = Arc::new(CaptureSink::new());
        let display = DisplayWriter::new(Arc::new(CaptureLcd::new()));
        play_track(
            &catalog,
            0,
            &FixedSwitches(switches),
            sink.as_ref(),
            shared,
            &display,
        )
        .unwrap();
        sink
    }

    fn frames(n: u16) -> Vec<(u16, u16)> {
        (0..n).map(|i| (i, 1000 + i)).collect()
    }

    #[test]
    fn normal_speed_emits_every_frame() {
        let dir = media_dir("normal", &frames(8));
        let sink = run(&dir, 0b00, &playing_shared());
        assert_eq!(sink.channel(AudioChannel::Left), (0..8).collect::<Vec<u16>>());
        assert_eq!(
            sink.channel(AudioChannel::Right),
            (1000..1008).collect::<Vec<u16>>()
        );
    }

    #[test]
    fn half_speed_emits_each_frame_twice() {
        let dir = media_dir("half", &frames(4));
        let sink = run(&dir, 0b01, &playing_shared());
        // stride 2 with round-down lands on each frame twice
        assert_eq!(sink.channel(AudioChannel::Left), vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn double_speed_skips_every_other_frame() {
        let dir = media_dir("double", &frames(8));
        let sink = run(&dir, 0b10, &playing_shared());
        assert_eq!(sink.channel(AudioChannel::Left), vec![0, 2, 4, 6]);
    }

    #[test]
    fn double_speed_rounds_up_on_odd_counts() {
        // 5 frames are 20 bytes; stride 8 lands on 0, 8, 16, emitting 3 samples
        let dir = media_dir("double-odd", &frames(5));
        let sink = run(&dir, 0b10, &playing_shared());
        assert_eq!(sink.channel(AudioChannel::Left), vec![0, 2, 4]);
    }

    #[test]
    fn mono_feeds_left_sample_to_right_channel() {
        let dir = media_dir("mono", &frames(4));
        let sink = run(&dir, 0b11, &playing_shared());
        assert_eq!(
            sink.channel(AudioChannel::Left),
            sink.channel(AudioChannel::Right)
        );
    }

    #[test]
    fn terminate_mid_chunk_stops_within_one_stride() {
        let dir = media_dir("terminate", &frames(400)); // spans two chunks
        let catalog = Catalog::scan(&dir).unwrap();
        let shared = playing_shared();
        let sink = Arc::new(CaptureSink::new());
        let hooked = shared.clone();
        sink.set_write_hook(Box::new(move |channel, written| {
            if channel == AudioChannel::Left && written == 10 {
                hooked.with(|t| t.terminate = true);
            }
        }));
        let display = DisplayWriter::new(Arc::new(CaptureLcd::new()));
        play_track(
            &catalog,
            0,
            &FixedSwitches(0b00),
            sink.as_ref(),
            &shared,
            &display,
        )
        .unwrap();
        // the write that tripped the hook is the last one
        assert_eq!(sink.channel(AudioChannel::Left).len(), 10);
        assert!(!shared.snapshot().terminate, "terminate must be consumed");
    }

    #[test]
    fn terminate_while_paused_exits() {
        let dir = media_dir("paused", &frames(300)); // bigger than one chunk
        let catalog = Catalog::scan(&dir).unwrap();
        let shared = playing_shared();
        let sink = Arc::new(CaptureSink::new());
        // pause at the end of the first chunk (250 frames), then terminate
        // from another thread while the engine sits in the pause wait
        let hooked = shared.clone();
        sink.set_write_hook(Box::new(move |channel, written| {
            if channel == AudioChannel::Left && written == 250 {
                hooked.with(|t| t.playing = false);
                let delayed = hooked.clone();
                std::thread::spawn(move || {
                    std::thread::sleep(std::time::Duration::from_millis(20));
                    delayed.with(|t| t.terminate = true);
                });
            }
        }));
        let display = DisplayWriter::new(Arc::new(CaptureLcd::new()));
        play_track(
            &catalog,
            0,
            &FixedSwitches(0b00),
            sink.as_ref(),
            &shared,
            &display,
        )
        .unwrap();
        assert_eq!(sink.channel(AudioChannel::Left).len(), 250);
        assert!(!shared.snapshot().terminate);
    }

    #[test]
    fn missing_file_reports_and_returns_clean() {
        let dir = media_dir("missing", &frames(4));
        let catalog = Catalog::scan(&dir).unwrap();
        std::fs::remove_file(dir.join("T.WAV")).unwrap();
        let shared = playing_shared();
        let sink = Arc::new(CaptureSink::new());
        let display = DisplayWriter::new(Arc::new(CaptureLcd::new()));
        let result = play_track(
            &catalog,
            0,
            &FixedSwitches(0b00),
            sink.as_ref(),
            &shared,
            &display,
        );
        assert!(result.is_ok());
        assert!(sink.channel(AudioChannel::Left).is_empty());
    }

    #[test]
    fn policy_table_matches_switches() {
        assert_eq!(
            SpeedPolicy::from_switches(0b00),
            SpeedPolicy { stride: 4, mono: false, mode: PlayMode::Normal }
        );
        assert_eq!(SpeedPolicy::from_switches(0b01).stride, 2);
        assert_eq!(SpeedPolicy::from_switches(0b10).stride, 8);
        let mono = SpeedPolicy::from_switches(0b11);
        assert!(mono.mono);
        assert_eq!(mono.stride, 4);
        // only the low two bits matter
        assert_eq!(SpeedPolicy::from_switches(0b0100).mode, PlayMode::Normal);
    }
}
