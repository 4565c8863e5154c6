//! Microphone capture stream
//!
//! The CPAL callback pushes first-channel samples into a lock-free ring
//! buffer and pokes a bounded ready channel. [`CaptureStream::read`] waits
//! on that channel with a timeout, then drains whatever the ring holds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig, SupportedStreamConfigRange};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use super::device::{find_input_device, input_device_names, probe_devices};
use super::error::{AudioError, AudioResult};
use crate::config::CaptureConfig;
use crate::control::AudioSource;
use crate::types::{AudioFrame, CAPTURE_CHANNELS, SAMPLE_RATE};

/// Ring capacity in samples, one second of audio
const RING_CAPACITY: usize = SAMPLE_RATE as usize;

/// Open the requested device, or the first device that opens
///
/// With `requested` set only that device is tried. Otherwise every
/// enumerated device is probed in order. On failure the error carries the
/// full device list for the caller to show.
pub fn open_input(
    requested: Option<&str>,
    config: &CaptureConfig,
) -> AudioResult<(String, CaptureStream)> {
    let available = input_device_names();
    let candidates = match requested {
        Some(name) => vec![name.to_string()],
        None => available.clone(),
    };

    probe_devices(&candidates, |name| open_capture(name, config)).ok_or_else(|| {
        AudioError::DeviceUnavailable {
            requested: requested.map(str::to_string),
            available,
        }
    })
}

/// Open `name` for 8kHz capture and start the stream
pub fn open_capture(name: &str, config: &CaptureConfig) -> AudioResult<CaptureStream> {
    CaptureStream::open(name, config)
}

/// Live capture from one input device
pub struct CaptureStream {
    name: String,
    /// `None` once closed
    stream: Option<Stream>,
    receiver: SampleReceiver,
}

impl CaptureStream {
    pub fn open(name: &str, config: &CaptureConfig) -> AudioResult<Self> {
        let device = find_input_device(name)?;
        let (stream_config, sample_format) = get_input_config(&device)?;

        let (producer, consumer) = rtrb::RingBuffer::<i16>::new(RING_CAPACITY);
        let (ready_tx, ready_rx) = channel::bounded(1);
        let writer = CallbackWriter::new(producer, ready_tx, stream_config.channels);
        let receiver = SampleReceiver::new(
            consumer,
            ready_rx,
            Duration::from_millis(config.read_timeout_ms),
            writer.overruns(),
        );

        let stream = build_input_stream(&device, &stream_config, sample_format, writer, name)?;
        stream
            .play()
            .map_err(|e| AudioError::StreamPlayError(e.to_string()))?;

        log::info!(
            "Capturing from '{}': {}Hz, {} channel(s), {:?}",
            name,
            stream_config.sample_rate.0,
            stream_config.channels,
            sample_format
        );

        Ok(Self {
            name: name.to_string(),
            stream: Some(stream),
            receiver,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AudioSource for CaptureStream {
    fn read(&mut self, frame: &mut AudioFrame) {
        if self.stream.is_none() {
            frame.clear();
            return;
        }
        self.receiver.read(frame);
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            log::info!("Capture from '{}' closed", self.name);
        }
    }
}

/// Pick a capture configuration at the fixed sample rate
///
/// Mono i16 is preferred; otherwise any channel count in i16, then f32.
fn get_input_config(device: &cpal::Device) -> AudioResult<(StreamConfig, SampleFormat)> {
    let supported: Vec<_> = device
        .supported_input_configs()
        .map_err(|e| AudioError::ConfigError(e.to_string()))?
        .collect();

    let best = select_config(&supported).ok_or_else(|| {
        AudioError::UnsupportedFormat(format!("no i16 or f32 capture at {}Hz", SAMPLE_RATE))
    })?;

    let sample_format = best.sample_format();
    let stream_config = best
        .clone()
        .with_sample_rate(cpal::SampleRate(SAMPLE_RATE))
        .config();
    Ok((stream_config, sample_format))
}

fn select_config(supported: &[SupportedStreamConfigRange]) -> Option<&SupportedStreamConfigRange> {
    let rate_ok = |c: &&SupportedStreamConfigRange| {
        SAMPLE_RATE >= c.min_sample_rate().0 && SAMPLE_RATE <= c.max_sample_rate().0
    };
    let format_is = |format: SampleFormat| move |c: &&SupportedStreamConfigRange| c.sample_format() == format;

    supported
        .iter()
        .filter(rate_ok)
        .filter(format_is(SampleFormat::I16))
        .find(|c| c.channels() == CAPTURE_CHANNELS)
        .or_else(|| supported.iter().filter(rate_ok).find(format_is(SampleFormat::I16)))
        .or_else(|| supported.iter().filter(rate_ok).find(format_is(SampleFormat::F32)))
}

fn build_input_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    mut writer: CallbackWriter,
    name: &str,
) -> AudioResult<Stream> {
    let error_name = name.to_string();
    let err_fn = move |err: cpal::StreamError| {
        log::error!("Capture stream error on '{}': {}", error_name, err);
    };

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _info: &cpal::InputCallbackInfo| {
                writer.write(data.iter().copied());
            },
            err_fn,
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                writer.write(data.iter().map(|&s| f32_to_i16(s)));
            },
            err_fn,
            None,
        ),
        other => {
            return Err(AudioError::UnsupportedFormat(format!("{:?}", other)));
        }
    };

    stream.map_err(|e| AudioError::StreamBuildError(e.to_string()))
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Audio-thread half: never blocks, never allocates
struct CallbackWriter {
    producer: rtrb::Producer<i16>,
    ready: Sender<()>,
    /// Interleaved channel count, only the first channel is kept
    channels: usize,
    overruns: Arc<AtomicUsize>,
}

impl CallbackWriter {
    fn new(producer: rtrb::Producer<i16>, ready: Sender<()>, channels: u16) -> Self {
        Self {
            producer,
            ready,
            channels: channels.max(1) as usize,
            overruns: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn overruns(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.overruns)
    }

    fn write(&mut self, samples: impl Iterator<Item = i16>) {
        let mut dropped = 0;
        for sample in samples.step_by(self.channels) {
            if self.producer.push(sample).is_err() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            self.overruns.fetch_add(dropped, Ordering::Relaxed);
        }
        // Full means a wakeup is already pending
        let _ = self.ready.try_send(());
    }
}

/// Loop-thread half
struct SampleReceiver {
    consumer: rtrb::Consumer<i16>,
    ready: Receiver<()>,
    read_timeout: Duration,
    overruns: Arc<AtomicUsize>,
}

impl SampleReceiver {
    fn new(
        consumer: rtrb::Consumer<i16>,
        ready: Receiver<()>,
        read_timeout: Duration,
        overruns: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            consumer,
            ready,
            read_timeout,
            overruns,
        }
    }

    fn read(&mut self, frame: &mut AudioFrame) {
        frame.clear();
        match self.ready.recv_timeout(self.read_timeout) {
            Ok(()) => {}
            Err(RecvTimeoutError::Timeout) => {
                log::trace!("No audio within {:?}", self.read_timeout);
            }
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("Capture callback gone");
            }
        }

        let available = self.consumer.slots();
        if let Ok(chunk) = self.consumer.read_chunk(available) {
            let (first, second) = chunk.as_slices();
            frame.extend_from_slice(first);
            frame.extend_from_slice(second);
            chunk.commit_all();
        }

        let dropped = self.overruns.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            log::debug!("Capture ring overran, {} samples dropped", dropped);
        }
    }
}
