//! Host-side spectrum backend: time-domain samples in, WebAudio-style
//! byte-frequency data out.

use crate::analyzer::SpectrumSource;
use crate::config::AnalyzerConfig;
use crate::constants::MAX_BYTE_MAGNITUDE;
use crate::error::VizError;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::{Arc, Mutex};

/// Read side of a live signal.
pub trait SampleTap {
    /// Overwrite `out` with the most recent `out.len()` mono samples in
    /// [-1, 1], zero-padded at the front when fewer are available. Leaving
    /// `out` as-is is allowed when the producer is busy.
    fn read_latest(&mut self, out: &mut [f32]);
}

/// Bounded mono sample history shared between an audio callback (writer) and
/// the frame loop (reader).
#[derive(Clone)]
pub struct SampleRing {
    inner: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, samples: &[f32]) {
        if let Ok(mut q) = self.inner.lock() {
            for &s in samples {
                if q.len() == self.capacity {
                    q.pop_front();
                }
                q.push_back(s);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SampleTap for SampleRing {
    fn read_latest(&mut self, out: &mut [f32]) {
        // try_lock: the frame loop never waits on the audio thread
        let Ok(q) = self.inner.try_lock() else {
            return;
        };
        let available = q.len().min(out.len());
        let pad = out.len() - available;
        out[..pad].fill(0.0);
        for (dst, src) in out[pad..].iter_mut().zip(q.iter().skip(q.len() - available)) {
            *dst = *src;
        }
    }
}

#[inline]
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    let x = index as f32 / size as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}

/// Blackman-windowed FFT with per-bin exponential smoothing and decibel to
/// byte mapping.
pub struct FftSpectrum {
    tap: Box<dyn SampleTap>,
    fft: Option<Arc<dyn Fft<f32>>>,
    window: Vec<f32>,
    samples: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    min_db: f32,
    max_db: f32,
    smoothing: f32,
}

impl FftSpectrum {
    pub fn new(tap: Box<dyn SampleTap>) -> Self {
        Self {
            tap,
            fft: None,
            window: Vec::new(),
            samples: Vec::new(),
            buffer: Vec::new(),
            smoothed: Vec::new(),
            min_db: 0.0,
            max_db: 0.0,
            smoothing: 0.0,
        }
    }
}

impl SpectrumSource for FftSpectrum {
    fn configure(&mut self, config: &AnalyzerConfig) -> Result<(), VizError> {
        config.validate()?;
        let n = config.fft_size;
        let mut planner = FftPlanner::new();
        self.fft = Some(planner.plan_fft_forward(n));
        self.window = (0..n).map(|i| blackman_window(i, n)).collect();
        self.samples = vec![0.0; n];
        self.buffer = vec![Complex::new(0.0, 0.0); n];
        self.smoothed = vec![0.0; config.bin_count()];
        self.min_db = config.min_decibels;
        self.max_db = config.max_decibels;
        self.smoothing = config.smoothing;
        Ok(())
    }

    fn read_bytes(&mut self, out: &mut [u8]) {
        let Some(fft) = &self.fft else {
            out.fill(0);
            return;
        };
        self.tap.read_latest(&mut self.samples);
        for ((dst, &s), &w) in self.buffer.iter_mut().zip(&self.samples).zip(&self.window) {
            *dst = Complex::new(s * w, 0.0);
        }
        fft.process(&mut self.buffer);

        let n = self.samples.len() as f32;
        let scale = MAX_BYTE_MAGNITUDE / (self.max_db - self.min_db);
        for (k, byte) in out.iter_mut().enumerate().take(self.smoothed.len()) {
            let magnitude = self.buffer[k].norm() / n;
            let prev = self.smoothed[k];
            let mut next = self.smoothing * prev + (1.0 - self.smoothing) * magnitude;
            if !next.is_finite() {
                next = 0.0;
            }
            self.smoothed[k] = next;
            let db = 20.0 * next.log10(); // -inf for silence, clamps to 0 below
            let scaled = (scale * (db - self.min_db)).clamp(0.0, MAX_BYTE_MAGNITUDE);
            *byte = if scaled.is_nan() { 0 } else { scaled as u8 };
        }
    }
}
