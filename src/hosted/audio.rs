// Hosted audio device: two bounded sample channels stand in for the
// codec's per-channel FIFOs, drained by a cpal output stream.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::board::{AudioChannel, AudioSink};
use crate::player::catalog::Catalog;

const DEFAULT_RATE: u32 = 44_100;

/// The writable FIFO halves. Cheap to share with the playback thread; the
/// stream itself stays with whoever owns HostedAudio.
pub struct CpalFifo {
    left_tx: Sender<u16>,
    right_tx: Sender<u16>,
}

impl CpalFifo {
    fn sender(&self, channel: AudioChannel) -> &Sender<u16> {
        match channel {
            AudioChannel::Left => &self.left_tx,
            AudioChannel::Right => &self.right_tx,
        }
    }
}

impl AudioSink for CpalFifo {
    fn wait_space(&self, channel: AudioChannel) {
        let tx = self.sender(channel);
        while tx.is_full() {
            std::thread::sleep(Duration::from_micros(200));
        }
    }

    fn write(&self, channel: AudioChannel, sample: u16) {
        let _ = self.sender(channel).try_send(sample);
    }
}

pub struct HostedAudio {
    pub fifo: Arc<CpalFifo>,
    _output_stream: cpal::Stream,
}

/// Read the stream rate off the first track's WAV header; anything odd
/// falls back to 44.1 kHz.
pub fn probe_sample_rate(catalog: &Catalog) -> u32 {
    let Some(path) = catalog.path_of(0) else {
        return DEFAULT_RATE;
    };
    match hound::WavReader::open(&path) {
        Ok(reader) => reader.spec().sample_rate,
        Err(_) => DEFAULT_RATE,
    }
}

pub fn start_audio(sample_rate: u32, fifo_depth: usize) -> anyhow::Result<HostedAudio> {
    let (left_tx, left_rx) = crossbeam_channel::bounded::<u16>(fifo_depth.max(1));
    let (right_tx, right_rx) = crossbeam_channel::bounded::<u16>(fifo_depth.max(1));

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("could not open audio device")?;
    let supported = device
        .default_output_config()
        .context("no default output config")?;
    let channels = supported.channels() as usize;

    match supported.sample_format() {
        cpal::SampleFormat::F32 => {
            let mut config: cpal::StreamConfig = supported.into();
            config.sample_rate = sample_rate;

            let err_fn = |err| eprintln!("audio output stream error: {err}");
            let stream = device.build_output_stream(
                &config,
                move |data: &mut [f32], _info| {
                    fill_block(data, channels, &left_rx, &right_rx);
                },
                err_fn,
                None,
            )?;
            stream.play().context("failed to play output stream")?;

            Ok(HostedAudio {
                fifo: Arc::new(CpalFifo { left_tx, right_tx }),
                _output_stream: stream,
            })
        }
        _ => anyhow::bail!("unsupported sample format (only f32 supported for now)"),
    }
}

fn fill_block(data: &mut [f32], channels: usize, left_rx: &Receiver<u16>, right_rx: &Receiver<u16>) {
    for frame in data.chunks_mut(channels) {
        // an empty FIFO plays silence, it does not stall the callback
        let left = left_rx.try_recv().map(to_f32).unwrap_or(0.0);
        let right = right_rx.try_recv().map(to_f32).unwrap_or(0.0);
        frame[0] = left;
        if frame.len() > 1 {
            frame[1] = right;
        }
        for extra in frame.iter_mut().skip(2) {
            *extra = 0.0;
        }
    }
}

/// Register samples are the raw two's-complement 16-bit codec words.
fn to_f32(sample: u16) -> f32 {
    (sample as i16) as f32 / 32768.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_conversion_is_signed() {
        assert_eq!(to_f32(0), 0.0);
        assert!((to_f32(0x8000) + 1.0).abs() < 1e-6); // i16::MIN
        assert!(to_f32(0x7FFF) > 0.99);
    }

    #[test]
    fn fifo_write_then_drain() {
        let (left_tx, left_rx) = crossbeam_channel::bounded::<u16>(4);
        let (right_tx, right_rx) = crossbeam_channel::bounded::<u16>(4);
        let fifo = CpalFifo { left_tx, right_tx };
        fifo.wait_space(AudioChannel::Left);
        fifo.write(AudioChannel::Left, 7);
        fifo.write(AudioChannel::Right, 9);
        let mut block = [1.0f32; 4]; // two stereo frames
        fill_block(&mut block, 2, &left_rx, &right_rx);
        assert!((block[0] - to_f32(7)).abs() < 1e-6);
        assert!((block[1] - to_f32(9)).abs() < 1e-6);
        assert_eq!(block[2], 0.0); // fifo empty: silence
        assert_eq!(block[3], 0.0);
    }

    #[test]
    fn probe_falls_back_without_a_readable_header() {
        let dir = std::env::temp_dir().join(format!("pulsedeck-probe-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("RAW.WAV"), [0u8; 16]).unwrap(); // not a real header
        let catalog = Catalog::scan(&dir).unwrap();
        assert_eq!(probe_sample_rate(&catalog), DEFAULT_RATE);
        assert_eq!(probe_sample_rate(&Catalog::default()), DEFAULT_RATE);
    }

    #[test]
    fn probe_reads_a_real_wav_header() {
        let dir = std::env::temp_dir().join(format!("pulsedeck-probe-real-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(dir.join("T.WAV"), spec).unwrap();
        for i in 0..8i16 {
            writer.write_sample(i).unwrap();
            writer.write_sample(-i).unwrap();
        }
        writer.finalize().unwrap();
        let catalog = Catalog::scan(&dir).unwrap();
        assert_eq!(probe_sample_rate(&catalog), 22_050);
    }
}
