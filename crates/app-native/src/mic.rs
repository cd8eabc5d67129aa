//! Microphone capture: cpal input stream -> Hann window -> forward FFT ->
//! byte-magnitude spectrum frames published over a bounded channel.
//!
//! Acquisition is an explicit background task: the stream runs on the audio
//! backend's callback thread, the outcome (ready / failed) is published in a
//! shared status slot, and dropping the handle cancels the stream. The
//! frame loop only ever reads the latest published state.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use app_core::SpectrumFrame;

const FFT_SIZE: usize = 2048;
const CHANNEL_CAPACITY: usize = 4;
const MAGNITUDE_GAIN: f32 = 8.0;

/// Published acquisition outcome.
#[derive(Clone, Debug)]
pub enum MicStatus {
    Pending,
    Ready,
    Failed(String),
}

/// Live capture handle. Dropping it stops the stream.
pub struct MicCapture {
    _stream: cpal::Stream,
    frames: Receiver<SpectrumFrame>,
    status: Arc<Mutex<MicStatus>>,
}

/// Accumulates mono samples and runs the FFT once per full window.
struct SpectrumFeeder {
    buffer: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    window: Vec<f32>,
    sample_rate: f32,
    channels: usize,
    sender: Sender<SpectrumFrame>,
}

impl SpectrumFeeder {
    fn new(sample_rate: f32, channels: usize, sender: Sender<SpectrumFrame>) -> Self {
        let window = (0..FFT_SIZE)
            .map(|i| {
                0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / FFT_SIZE as f32).cos())
            })
            .collect();
        Self {
            buffer: Vec::with_capacity(FFT_SIZE * 2),
            fft: FftPlanner::new().plan_fft_forward(FFT_SIZE),
            fft_buffer: vec![Complex::default(); FFT_SIZE],
            window,
            sample_rate,
            channels,
            sender,
        }
    }

    /// Mix interleaved input down to mono; process whenever a window fills.
    fn push(&mut self, samples: &[f32]) {
        for frame in samples.chunks(self.channels.max(1)) {
            let mono = frame.iter().sum::<f32>() / frame.len() as f32;
            self.buffer.push(mono);
        }
        while self.buffer.len() >= FFT_SIZE {
            self.process_window();
            self.buffer.drain(..FFT_SIZE);
        }
    }

    fn process_window(&mut self) {
        for (out, (&s, &w)) in self
            .fft_buffer
            .iter_mut()
            .zip(self.buffer[..FFT_SIZE].iter().zip(self.window.iter()))
        {
            *out = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.fft_buffer);

        let norm = 1.0 / FFT_SIZE as f32;
        let mut frame = SpectrumFrame::new(FFT_SIZE / 2, self.sample_rate);
        for (bin, out) in self.fft_buffer[..FFT_SIZE / 2]
            .iter()
            .zip(frame.bins.iter_mut())
        {
            // Square-root compression keeps quiet content visible, the way
            // a display analyser's byte output behaves.
            let mag = (bin.norm() * norm * MAGNITUDE_GAIN).sqrt().min(1.0);
            *out = (mag * 255.0) as u8;
        }
        // Drop the frame when the loop is behind; the next one supersedes it.
        let _ = self.sender.try_send(frame);
    }
}

impl MicCapture {
    /// Begin acquisition on the default input device.
    pub fn start() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("no default input device"))?;
        let config = device
            .default_input_config()
            .context("query default input config")?;
        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        log::info!(
            "microphone: {} Hz, {} channel(s), {:?}",
            sample_rate as u32,
            channels,
            config.sample_format()
        );

        let (sender, frames) = bounded(CHANNEL_CAPACITY);
        let status = Arc::new(Mutex::new(MicStatus::Pending));
        let feeder = Arc::new(Mutex::new(SpectrumFeeder::new(
            sample_rate,
            channels,
            sender,
        )));

        let err_status = Arc::clone(&status);
        let err_fn = move |err: cpal::StreamError| {
            log::error!("microphone stream error: {err}");
            if let Ok(mut s) = err_status.lock() {
                *s = MicStatus::Failed(err.to_string());
            }
        };

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream_f32(&device, &config.into(), feeder, err_fn)
            }
            cpal::SampleFormat::I16 => {
                build_stream_i16(&device, &config.into(), feeder, err_fn)
            }
            cpal::SampleFormat::U16 => {
                build_stream_u16(&device, &config.into(), feeder, err_fn)
            }
            other => return Err(anyhow!("unsupported input sample format {other:?}")),
        }
        .context("build input stream")?;
        stream.play().context("start input stream")?;

        if let Ok(mut s) = status.lock() {
            *s = MicStatus::Ready;
        }
        Ok(Self {
            _stream: stream,
            frames,
            status,
        })
    }

    pub fn frames(&self) -> &Receiver<SpectrumFrame> {
        &self.frames
    }

    pub fn status(&self) -> MicStatus {
        self.status
            .lock()
            .map(|s| s.clone())
            .unwrap_or(MicStatus::Pending)
    }
}

fn build_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    feeder: Arc<Mutex<SpectrumFeeder>>,
    err_fn: impl FnMut(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_input_stream(
        config,
        move |data: &[f32], _| {
            if let Ok(mut f) = feeder.lock() {
                f.push(data);
            }
        },
        err_fn,
        None,
    )
}

fn build_stream_i16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    feeder: Arc<Mutex<SpectrumFeeder>>,
    err_fn: impl FnMut(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_input_stream(
        config,
        move |data: &[i16], _| {
            let converted: Vec<f32> = data
                .iter()
                .map(|&s| s as f32 / i16::MAX as f32)
                .collect();
            if let Ok(mut f) = feeder.lock() {
                f.push(&converted);
            }
        },
        err_fn,
        None,
    )
}

fn build_stream_u16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    feeder: Arc<Mutex<SpectrumFeeder>>,
    err_fn: impl FnMut(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_input_stream(
        config,
        move |data: &[u16], _| {
            let converted: Vec<f32> = data
                .iter()
                .map(|&s| s as f32 / u16::MAX as f32 * 2.0 - 1.0)
                .collect();
            if let Ok(mut f) = feeder.lock() {
                f.push(&converted);
            }
        },
        err_fn,
        None,
    )
}
