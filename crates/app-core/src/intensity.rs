use crate::analyzer::AudioSnapshot;
use crate::constants::MAX_BYTE_MAGNITUDE;

/// Normalized loudness of one snapshot. All fields lie in \[0, 1\].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntensityVector {
    pub overall: f32,
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

/// Collapse a snapshot into overall and per-third band loudness.
///
/// Bands split at `n / 3` and `2n / 3`; a band with no bins reads as 0. The
/// bands are derived independently of `overall`.
pub fn reduce(snapshot: &AudioSnapshot) -> IntensityVector {
    let bins = snapshot.bins();
    let n = bins.len();
    let third = n / 3;
    let two_thirds = 2 * n / 3;
    IntensityVector {
        overall: mean_normalized(bins),
        low: mean_normalized(&bins[..third]),
        mid: mean_normalized(&bins[third..two_thirds]),
        high: mean_normalized(&bins[two_thirds..]),
    }
}

#[inline]
fn mean_normalized(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u64 = bins.iter().map(|&b| b as u64).sum();
    (sum as f32 / (bins.len() as f32 * MAX_BYTE_MAGNITUDE)).clamp(0.0, 1.0)
}
