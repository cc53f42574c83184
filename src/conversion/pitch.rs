//! Pitch-contour transforms applied between extraction and timbre
//! conversion.
//!
//! Order is fixed: proposed-pitch rescaling first, then the explicit
//! semitone shift, then autotune. The explicit shift always runs after any
//! rescaling; reversing that order changes the musical result.

use crate::defaults::CONTOUR_HOP_MS;

/// Per-frame fundamental frequency in Hz at a fixed hop.
///
/// A value of 0.0 marks an unvoiced frame; transforms skip those frames.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchContour {
    pub hz: Vec<f32>,
    pub hop_ms: u32,
}

impl PitchContour {
    pub fn new(hz: Vec<f32>) -> Self {
        Self {
            hz,
            hop_ms: CONTOUR_HOP_MS,
        }
    }

    /// Median frequency over voiced frames, None when fully unvoiced.
    pub fn voiced_median(&self) -> Option<f32> {
        let mut voiced: Vec<f32> = self.hz.iter().copied().filter(|&f| f > 0.0).collect();
        if voiced.is_empty() {
            return None;
        }
        voiced.sort_by(|a, b| a.total_cmp(b));
        let mid = voiced.len() / 2;
        if voiced.len() % 2 == 0 {
            Some((voiced[mid - 1] + voiced[mid]) / 2.0)
        } else {
            Some(voiced[mid])
        }
    }

    /// Rescale the contour so its voiced median lands on `target_hz`.
    ///
    /// Fully-unvoiced contours are left untouched; there is no median to
    /// anchor the rescale on.
    pub fn rescale_median_to(&mut self, target_hz: f32) {
        let Some(median) = self.voiced_median() else {
            return;
        };
        if median <= 0.0 {
            return;
        }
        let factor = target_hz / median;
        for f in self.hz.iter_mut().filter(|f| **f > 0.0) {
            *f *= factor;
        }
    }

    /// Apply an explicit pitch shift in semitones.
    ///
    /// A shift of 0 is an exact no-op (factor 1.0).
    pub fn shift_semitones(&mut self, semitones: i32) {
        if semitones == 0 {
            return;
        }
        let factor = 2.0_f32.powf(semitones as f32 / 12.0);
        for f in self.hz.iter_mut().filter(|f| **f > 0.0) {
            *f *= factor;
        }
    }

    /// Snap voiced frames toward the nearest equal-tempered pitch class.
    ///
    /// `strength` interpolates between the original frequency (0.0) and the
    /// fully snapped frequency (1.0).
    pub fn autotune(&mut self, strength: f32) {
        let strength = strength.clamp(0.0, 1.0);
        if strength == 0.0 {
            return;
        }
        for f in self.hz.iter_mut().filter(|f| **f > 0.0) {
            let snapped = nearest_pitch_class(*f);
            *f = *f * (1.0 - strength) + snapped * strength;
        }
    }
}

/// Frequency of the nearest equal-tempered semitone (A4 = 440 Hz).
fn nearest_pitch_class(hz: f32) -> f32 {
    let semitones_from_a4 = 12.0 * (hz / 440.0).log2();
    440.0 * 2.0_f32.powf(semitones_from_a4.round() / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour(hz: &[f32]) -> PitchContour {
        PitchContour::new(hz.to_vec())
    }

    #[test]
    fn voiced_median_skips_unvoiced_frames() {
        let c = contour(&[0.0, 100.0, 0.0, 200.0, 300.0]);
        assert_eq!(c.voiced_median(), Some(200.0));
    }

    #[test]
    fn voiced_median_even_count_averages() {
        let c = contour(&[100.0, 200.0]);
        assert_eq!(c.voiced_median(), Some(150.0));
    }

    #[test]
    fn voiced_median_none_for_unvoiced_contour() {
        let c = contour(&[0.0, 0.0]);
        assert_eq!(c.voiced_median(), None);
    }

    #[test]
    fn shift_zero_semitones_is_exact_noop() {
        let original = contour(&[110.0, 0.0, 220.5, 441.0]);
        let mut shifted = original.clone();
        shifted.shift_semitones(0);
        assert_eq!(shifted, original);
    }

    #[test]
    fn shift_twelve_semitones_doubles_frequency() {
        let mut c = contour(&[110.0, 0.0, 220.0]);
        c.shift_semitones(12);
        assert!((c.hz[0] - 220.0).abs() < 0.01);
        assert_eq!(c.hz[1], 0.0);
        assert!((c.hz[2] - 440.0).abs() < 0.01);
    }

    #[test]
    fn shift_negative_twelve_halves_frequency() {
        let mut c = contour(&[220.0]);
        c.shift_semitones(-12);
        assert!((c.hz[0] - 110.0).abs() < 0.01);
    }

    #[test]
    fn rescale_moves_median_to_target() {
        let mut c = contour(&[100.0, 200.0, 300.0]);
        c.rescale_median_to(155.0);
        assert!((c.voiced_median().unwrap() - 155.0).abs() < 0.01);
        // Relative intervals are preserved
        assert!((c.hz[2] / c.hz[0] - 3.0).abs() < 0.01);
    }

    #[test]
    fn rescale_to_current_median_changes_nothing() {
        let original = contour(&[100.0, 200.0, 300.0]);
        let mut c = original.clone();
        c.rescale_median_to(200.0);
        for (a, b) in c.hz.iter().zip(original.hz.iter()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn rescale_leaves_unvoiced_frames_at_zero() {
        let mut c = contour(&[0.0, 200.0, 0.0]);
        c.rescale_median_to(100.0);
        assert_eq!(c.hz[0], 0.0);
        assert_eq!(c.hz[2], 0.0);
        assert!((c.hz[1] - 100.0).abs() < 0.01);
    }

    #[test]
    fn rescale_of_unvoiced_contour_is_noop() {
        let mut c = contour(&[0.0, 0.0]);
        c.rescale_median_to(155.0);
        assert_eq!(c.hz, vec![0.0, 0.0]);
    }

    #[test]
    fn rescale_then_zero_shift_changes_pitch_iff_target_differs() {
        // Target differs from median → contour changes
        let mut changed = contour(&[100.0, 200.0, 300.0]);
        changed.rescale_median_to(155.0);
        changed.shift_semitones(0);
        assert!((changed.voiced_median().unwrap() - 155.0).abs() < 0.01);

        // Target equals median → contour unchanged
        let original = contour(&[100.0, 200.0, 300.0]);
        let mut unchanged = original.clone();
        unchanged.rescale_median_to(200.0);
        unchanged.shift_semitones(0);
        for (a, b) in unchanged.hz.iter().zip(original.hz.iter()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn autotune_full_strength_snaps_to_pitch_class() {
        // 446 Hz is closest to A4 = 440 Hz
        let mut c = contour(&[446.0]);
        c.autotune(1.0);
        assert!((c.hz[0] - 440.0).abs() < 0.01);
    }

    #[test]
    fn autotune_zero_strength_is_noop() {
        let original = contour(&[446.0, 0.0, 123.4]);
        let mut c = original.clone();
        c.autotune(0.0);
        assert_eq!(c, original);
    }

    #[test]
    fn autotune_half_strength_interpolates() {
        let mut c = contour(&[446.0]);
        c.autotune(0.5);
        assert!((c.hz[0] - 443.0).abs() < 0.1);
    }

    #[test]
    fn autotune_skips_unvoiced_frames() {
        let mut c = contour(&[0.0, 446.0]);
        c.autotune(1.0);
        assert_eq!(c.hz[0], 0.0);
    }

    #[test]
    fn nearest_pitch_class_is_fixed_point_on_grid() {
        for hz in [220.0_f32, 440.0, 880.0] {
            assert!((nearest_pitch_class(hz) - hz).abs() < 0.01);
        }
    }
}
