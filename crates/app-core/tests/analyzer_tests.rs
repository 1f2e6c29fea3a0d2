// Host-side tests for the analyzer binding guard and the FFT spectrum backend.

use app_core::*;
use std::sync::{Arc, Mutex};

/// Fills every bin with a fixed value and records configuration calls.
struct ConstSource {
    value: u8,
    configured: Arc<Mutex<Vec<AnalyzerConfig>>>,
}

impl ConstSource {
    fn new(value: u8) -> (Self, Arc<Mutex<Vec<AnalyzerConfig>>>) {
        let configured = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                value,
                configured: configured.clone(),
            },
            configured,
        )
    }
}

impl SpectrumSource for ConstSource {
    fn configure(&mut self, config: &AnalyzerConfig) -> Result<(), VizError> {
        self.configured.lock().unwrap().push(config.clone());
        Ok(())
    }

    fn read_bytes(&mut self, out: &mut [u8]) {
        out.fill(self.value);
    }
}

/// Replays a fixed block of samples.
struct FixedTap(Vec<f32>);

impl SampleTap for FixedTap {
    fn read_latest(&mut self, out: &mut [f32]) {
        let n = out.len().min(self.0.len());
        out[..n].copy_from_slice(&self.0[..n]);
        out[n..].fill(0.0);
    }
}

fn sine(n: usize, bin: usize) -> Vec<f32> {
    (0..n)
        .map(|i| (std::f32::consts::TAU * bin as f32 * i as f32 / n as f32).sin())
        .collect()
}

#[test]
fn default_config_matches_reference_tuning() {
    let c = AnalyzerConfig::default();
    assert_eq!(c.fft_size, 256);
    assert_eq!(c.bin_count(), 128);
    assert_eq!(c.min_decibels, -70.0);
    assert_eq!(c.max_decibels, -10.0);
    assert!((c.smoothing - 0.53).abs() < 1e-6);
    assert!(c.validate().is_ok());
}

#[test]
fn invalid_configs_are_rejected() {
    let bad = [
        AnalyzerConfig {
            fft_size: 300,
            ..Default::default()
        },
        AnalyzerConfig {
            fft_size: 16,
            ..Default::default()
        },
        AnalyzerConfig {
            min_decibels: -10.0,
            max_decibels: -70.0,
            ..Default::default()
        },
        AnalyzerConfig {
            smoothing: 1.5,
            ..Default::default()
        },
    ];
    for c in bad {
        assert!(
            matches!(FrequencyAnalyzer::new(c.clone()), Err(VizError::InvalidConfig(_))),
            "accepted {c:?}"
        );
    }
}

#[test]
fn capture_without_source_is_not_ready() {
    let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
    assert!(!analyzer.is_bound());
    assert_eq!(analyzer.capture(), Err(VizError::NotReady));
}

#[test]
fn capture_returns_one_byte_per_bin() {
    let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
    let (src, configured) = ConstSource::new(77);
    analyzer.bind(Box::new(src)).unwrap();
    let snap = analyzer.capture().unwrap();
    assert_eq!(snap.len(), 128);
    assert!(snap.bins().iter().all(|&b| b == 77));
    assert_eq!(configured.lock().unwrap().len(), 1);
}

#[test]
fn double_bind_is_rejected_and_first_binding_survives() {
    let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
    let (first, _) = ConstSource::new(10);
    let (second, second_cfg) = ConstSource::new(200);
    analyzer.bind(Box::new(first)).unwrap();
    assert_eq!(analyzer.bind(Box::new(second)), Err(VizError::AlreadyBound));
    // the rejected source was never configured
    assert!(second_cfg.lock().unwrap().is_empty());
    let snap = analyzer.capture().unwrap();
    assert!(snap.bins().iter().all(|&b| b == 10));
}

#[test]
fn unbind_allows_a_new_source() {
    let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
    let (first, _) = ConstSource::new(1);
    let (second, _) = ConstSource::new(2);
    analyzer.bind(Box::new(first)).unwrap();
    assert!(analyzer.unbind().is_some());
    assert_eq!(analyzer.capture(), Err(VizError::NotReady));
    analyzer.bind(Box::new(second)).unwrap();
    assert!(analyzer.capture().unwrap().bins().iter().all(|&b| b == 2));
}

#[test]
fn fft_spectrum_reads_silence_as_zero() {
    let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
    analyzer
        .bind(Box::new(FftSpectrum::new(Box::new(FixedTap(vec![0.0; 256])))))
        .unwrap();
    for _ in 0..3 {
        let snap = analyzer.capture().unwrap();
        assert!(snap.bins().iter().all(|&b| b == 0));
        assert_eq!(reduce(&snap).overall, 0.0);
    }
}

#[test]
fn fft_spectrum_peaks_at_the_tone_bin() {
    let config = AnalyzerConfig {
        smoothing: 0.0,
        ..Default::default()
    };
    let mut analyzer = FrequencyAnalyzer::new(config).unwrap();
    analyzer
        .bind(Box::new(FftSpectrum::new(Box::new(FixedTap(sine(256, 16))))))
        .unwrap();
    let snap = analyzer.capture().unwrap();
    let (peak, &level) = snap
        .bins()
        .iter()
        .enumerate()
        .max_by_key(|(_, &b)| b)
        .unwrap();
    assert_eq!(peak, 16);
    assert!(level > 200, "peak level {level}");
    assert_eq!(snap.bins()[100], 0);
}

#[test]
fn smoothing_ramps_toward_a_new_tone() {
    let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
    analyzer
        .bind(Box::new(FftSpectrum::new(Box::new(FixedTap(sine(256, 8))))))
        .unwrap();
    let first = analyzer.capture().unwrap().bins()[8];
    let second = analyzer.capture().unwrap().bins()[8];
    let third = analyzer.capture().unwrap().bins()[8];
    assert!(first <= second && second <= third);
    assert!(third > 0);
}

#[test]
fn sample_ring_keeps_latest_and_pads_front() {
    let ring = SampleRing::new(4);
    ring.push(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(ring.len(), 4);

    let mut tap = ring.clone();
    let mut out = [9.0f32; 6];
    tap.read_latest(&mut out);
    assert_eq!(out, [0.0, 0.0, 3.0, 4.0, 5.0, 6.0]);

    let mut short = [0.0f32; 2];
    tap.read_latest(&mut short);
    assert_eq!(short, [5.0, 6.0]);
}
