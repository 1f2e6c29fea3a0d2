// Host-side tests for the snapshot → intensity reduction.

use app_core::*;

fn uniform_snapshot(len: usize, m: u8) -> AudioSnapshot {
    AudioSnapshot::from_bins(vec![m; len])
}

#[test]
fn uniform_magnitude_maps_to_its_normalized_value() {
    for m in [0u8, 1, 64, 128, 200, 255] {
        let v = reduce(&uniform_snapshot(128, m));
        let expected = m as f32 / 255.0;
        assert!((v.overall - expected).abs() < 1e-6, "m={m}: {}", v.overall);
        assert!((v.low - expected).abs() < 1e-6);
        assert!((v.mid - expected).abs() < 1e-6);
        assert!((v.high - expected).abs() < 1e-6);
    }
}

#[test]
fn overall_stays_in_unit_range_for_arbitrary_snapshots() {
    let mut seed = 0x2545_f491_u32;
    for len in [1usize, 2, 3, 7, 64, 128, 1024] {
        let bins: Vec<u8> = (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                (seed & 0xff) as u8
            })
            .collect();
        let v = reduce(&AudioSnapshot::from_bins(bins));
        for x in [v.overall, v.low, v.mid, v.high] {
            assert!((0.0..=1.0).contains(&x), "len={len} value={x}");
        }
    }
}

#[test]
fn empty_snapshot_reduces_to_silence() {
    let v = reduce(&AudioSnapshot::from_bins(Vec::new()));
    assert_eq!(v, IntensityVector::default());
}

#[test]
fn bands_split_into_thirds() {
    // 9 bins: [0,3) low, [3,6) mid, [6,9) high
    let bins = vec![255, 255, 255, 0, 0, 0, 51, 51, 51];
    let v = reduce(&AudioSnapshot::from_bins(bins));
    assert!((v.low - 1.0).abs() < 1e-6);
    assert!(v.mid.abs() < 1e-6);
    assert!((v.high - 0.2).abs() < 1e-6);
    assert!((v.overall - (765.0 + 153.0) / (9.0 * 255.0)).abs() < 1e-6);
}

#[test]
fn tiny_snapshots_leave_short_bands_empty() {
    // n = 2: n/3 = 0 and 2n/3 = 1, so low is empty and reads as zero
    let v = reduce(&AudioSnapshot::from_bins(vec![255, 255]));
    assert_eq!(v.low, 0.0);
    assert!((v.mid - 1.0).abs() < 1e-6);
    assert!((v.high - 1.0).abs() < 1e-6);
    assert!((v.overall - 1.0).abs() < 1e-6);
}
