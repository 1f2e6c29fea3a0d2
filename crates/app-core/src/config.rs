use crate::constants::*;
use crate::error::VizError;
use crate::shaders::ShaderKind;

/// Analysis window and dynamic-range mapping for the frequency analyzer.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzerConfig {
    /// Power-of-two FFT window; the snapshot carries `fft_size / 2` bins.
    pub fft_size: usize,
    pub min_decibels: f32,
    pub max_decibels: f32,
    /// Exponential damping between consecutive captures, 0 = none.
    pub smoothing: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            min_decibels: DEFAULT_MIN_DECIBELS,
            max_decibels: DEFAULT_MAX_DECIBELS,
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

impl AnalyzerConfig {
    #[inline]
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn validate(&self) -> Result<(), VizError> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(VizError::InvalidConfig(format!(
                "fft_size {} must be a power of two in {MIN_FFT_SIZE}..={MAX_FFT_SIZE}",
                self.fft_size
            )));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(VizError::InvalidConfig(format!(
                "min_decibels {} must be below max_decibels {}",
                self.min_decibels, self.max_decibels
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(VizError::InvalidConfig(format!(
                "smoothing {} must lie in [0, 1]",
                self.smoothing
            )));
        }
        Ok(())
    }
}

/// Scene construction knobs.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub particle_count: usize,
    /// Fixed seed for particle generation; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisualizerConfig {
    pub analyzer: AnalyzerConfig,
    pub scene: SceneConfig,
    pub initial_shader: ShaderKind,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            scene: SceneConfig::default(),
            initial_shader: ShaderKind::Ripple,
        }
    }
}
