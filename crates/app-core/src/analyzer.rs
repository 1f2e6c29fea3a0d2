//! Frequency analyzer: owns the bound audio signal and hands out byte-scaled
//! magnitude snapshots once per frame.

use crate::config::AnalyzerConfig;
use crate::error::VizError;

/// Anything that can produce byte-scaled frequency magnitudes for a bound
/// signal. The web frontend wraps a WebAudio `AnalyserNode`; native and tests
/// use [`crate::FftSpectrum`].
pub trait SpectrumSource {
    /// Apply analysis parameters before the first read.
    fn configure(&mut self, config: &AnalyzerConfig) -> Result<(), VizError>;
    /// Fill `out` (exactly `config.bin_count()` long) with magnitudes in 0..=255.
    /// Must return without waiting on the audio producer.
    fn read_bytes(&mut self, out: &mut [u8]);
}

/// Magnitudes captured at one instant, lowest frequency first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioSnapshot {
    bins: Vec<u8>,
}

impl AudioSnapshot {
    pub fn from_bins(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    #[inline]
    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

pub struct FrequencyAnalyzer {
    config: AnalyzerConfig,
    source: Option<Box<dyn SpectrumSource>>,
    scratch: Vec<u8>,
}

impl FrequencyAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, VizError> {
        config.validate()?;
        let scratch = vec![0; config.bin_count()];
        Ok(Self {
            config,
            source: None,
            scratch,
        })
    }

    #[inline]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    /// Attach the live signal. A second bind while one is active is rejected
    /// and the existing binding is left untouched.
    pub fn bind(&mut self, mut source: Box<dyn SpectrumSource>) -> Result<(), VizError> {
        if self.source.is_some() {
            return Err(VizError::AlreadyBound);
        }
        source.configure(&self.config)?;
        self.scratch.fill(0);
        self.source = Some(source);
        log::info!(
            "[analyzer] source bound: fft={} bins={} range=[{:.0},{:.0}] dB smoothing={:.2}",
            self.config.fft_size,
            self.config.bin_count(),
            self.config.min_decibels,
            self.config.max_decibels,
            self.config.smoothing
        );
        Ok(())
    }

    /// Release the current source so a new one may be bound.
    pub fn unbind(&mut self) -> Option<Box<dyn SpectrumSource>> {
        let prev = self.source.take();
        if prev.is_some() {
            log::info!("[analyzer] source released");
        }
        prev
    }

    pub fn capture(&mut self) -> Result<AudioSnapshot, VizError> {
        let source = self.source.as_mut().ok_or(VizError::NotReady)?;
        source.read_bytes(&mut self.scratch);
        Ok(AudioSnapshot::from_bins(self.scratch.clone()))
    }
}
