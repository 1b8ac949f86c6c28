//! Biquad coefficient design for the three EQ bands.
//!
//! The peak band is the RBJ cookbook peaking EQ. The cut bands are digital Butterworth cascades:
//! an order `2n` high/low-pass split into `n` RBJ sections sharing the corner frequency, each with
//! the Q of one conjugate pole pair. Everything is designed in `f64` so the cascades stay well
//! behaved down to 20 Hz at 192 kHz.

use crate::audio::chain_settings::{clamp_finite, ChainSettings, Slope};
use crate::audio::constants;
use std::f64::consts::PI;

/// Maximum number of biquad sections in a cut filter (48 dB/oct)
pub const MAX_CUT_STAGES: usize = 4;

/// Normalized biquad coefficients, `a0` is always 1.
///
/// Plain `Copy` data. A new set is designed whenever the parameters change and simply replaces the
/// old one, nothing is ever mutated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::identity()
    }
}

impl BiquadCoefficients {
    /// Pass-through coefficients, used as the placeholder for unused cut stages
    pub const fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a0: 1.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Divide everything by `a0`
    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        let a0_recip = 1.0 / a0;
        Self {
            b0: b0 * a0_recip,
            b1: b1 * a0_recip,
            b2: b2 * a0_recip,
            a0: 1.0,
            a1: a1 * a0_recip,
            a2: a2 * a0_recip,
        }
    }

    /// RBJ peaking EQ. `gain` is linear amplitude gain.
    pub fn peak(freq: f64, q: f64, gain: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let (sin_omega, cos_omega) = omega.sin_cos();
        let alpha = sin_omega / (2.0 * q);
        let a = gain.sqrt();

        Self::normalized(
            1.0 + alpha * a,
            -2.0 * cos_omega,
            1.0 - alpha * a,
            1.0 + alpha / a,
            -2.0 * cos_omega,
            1.0 - alpha / a,
        )
    }

    /// RBJ second order high-pass
    pub fn highpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let (sin_omega, cos_omega) = omega.sin_cos();
        let alpha = sin_omega / (2.0 * q);

        Self::normalized(
            (1.0 + cos_omega) / 2.0,
            -(1.0 + cos_omega),
            (1.0 + cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// RBJ second order low-pass
    pub fn lowpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let (sin_omega, cos_omega) = omega.sin_cos();
        let alpha = sin_omega / (2.0 * q);

        Self::normalized(
            (1.0 - cos_omega) / 2.0,
            1.0 - cos_omega,
            (1.0 - cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// Theoretical magnitude `|H(e^jw)|` at `freq`, evaluated on the unit circle
    pub fn magnitude_for_frequency(&self, freq: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * freq / sample_rate;
        let (sin_1, cos_1) = omega.sin_cos();
        let (sin_2, cos_2) = (2.0 * omega).sin_cos();

        let num_re = self.b0 + self.b1 * cos_1 + self.b2 * cos_2;
        let num_im = -(self.b1 * sin_1 + self.b2 * sin_2);
        let den_re = self.a0 + self.a1 * cos_1 + self.a2 * cos_2;
        let den_im = -(self.a1 * sin_1 + self.a2 * sin_2);

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt()
    }
}

/// A full cut filter design: always four slots, the first `active_stages` are used
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutCoefficients {
    pub stages: [BiquadCoefficients; MAX_CUT_STAGES],
    pub active_stages: usize,
}

/// Coefficients for every stage of a `MonoFilterChain`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainCoefficients {
    pub low_cut: CutCoefficients,
    pub peak: BiquadCoefficients,
    pub high_cut: CutCoefficients,
}

/// Designs coefficients from a `ChainSettings` snapshot. Never fails, out of range input is
/// clamped first.
pub struct FilterCoefficientBuilder;

impl FilterCoefficientBuilder {
    /// Design all three bands at once
    pub fn design(settings: &ChainSettings, sample_rate: f32) -> ChainCoefficients {
        ChainCoefficients {
            low_cut: Self::make_low_cut_filter(settings, sample_rate),
            peak: Self::make_peak_filter(settings, sample_rate),
            high_cut: Self::make_high_cut_filter(settings, sample_rate),
        }
    }

    pub fn make_peak_filter(settings: &ChainSettings, sample_rate: f32) -> BiquadCoefficients {
        let freq = clamp_frequency(settings.peak_freq, sample_rate);
        let q = clamp_finite(settings.peak_quality, constants::PEAK_Q_MIN, constants::PEAK_Q_MAX);
        let gain_db = clamp_finite(
            settings.peak_gain_db,
            constants::PEAK_GAIN_MIN_DB,
            constants::PEAK_GAIN_MAX_DB,
        );
        let gain = 10f64.powf(gain_db as f64 / 20.0);

        BiquadCoefficients::peak(freq, q as f64, gain, sample_rate as f64)
    }

    pub fn make_low_cut_filter(settings: &ChainSettings, sample_rate: f32) -> CutCoefficients {
        let freq = clamp_frequency(settings.low_cut_freq, sample_rate);
        butterworth_cascade(settings.low_cut_slope, |q| {
            BiquadCoefficients::highpass(freq, q, sample_rate as f64)
        })
    }

    pub fn make_high_cut_filter(settings: &ChainSettings, sample_rate: f32) -> CutCoefficients {
        let freq = clamp_frequency(settings.high_cut_freq, sample_rate);
        butterworth_cascade(settings.high_cut_slope, |q| {
            BiquadCoefficients::lowpass(freq, q, sample_rate as f64)
        })
    }
}

/// Clamp to `[20, min(20000, 0.49 * fs)]`
fn clamp_frequency(freq: f32, sample_rate: f32) -> f64 {
    let upper = constants::MAX_FREQUENCY.min(constants::NYQUIST_GUARD * sample_rate);
    // Only reachable with absurdly low sample rates, keep the range non-empty
    let upper = upper.max(constants::MIN_FREQUENCY);
    clamp_finite(freq, constants::MIN_FREQUENCY, upper) as f64
}

/// Q of the `section`th conjugate pole pair of an order `order` Butterworth filter
pub fn butterworth_section_q(order: usize, section: usize) -> f64 {
    let theta = PI * (2 * section + 1) as f64 / (2 * order) as f64;
    1.0 / (2.0 * theta.cos())
}

fn butterworth_cascade(slope: Slope, design_section: impl Fn(f64) -> BiquadCoefficients) -> CutCoefficients {
    let order = slope.order();
    let mut stages = [BiquadCoefficients::identity(); MAX_CUT_STAGES];
    for (section, stage) in stages.iter_mut().enumerate().take(slope.stages()) {
        *stage = design_section(butterworth_section_q(order, section));
    }

    CutCoefficients {
        stages,
        active_stages: slope.stages(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(gain: f64) -> f64 {
        20.0 * gain.log10()
    }

    fn cut_magnitude(cut: &CutCoefficients, freq: f64, sample_rate: f64) -> f64 {
        cut.stages[..cut.active_stages]
            .iter()
            .map(|stage| stage.magnitude_for_frequency(freq, sample_rate))
            .product()
    }

    #[test]
    fn butterworth_q_values() {
        assert!((butterworth_section_q(2, 0) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((butterworth_section_q(4, 0) - 0.541_196).abs() < 1e-5);
        assert!((butterworth_section_q(4, 1) - 1.306_563).abs() < 1e-5);
    }

    #[test]
    fn zero_gain_peak_is_unity() {
        let settings = ChainSettings {
            peak_gain_db: 0.0,
            ..ChainSettings::default()
        };
        let peak = FilterCoefficientBuilder::make_peak_filter(&settings, 48000.0);
        assert!((peak.b0 - 1.0).abs() < 1e-12);
        assert!((peak.b1 - peak.a1).abs() < 1e-12);
        assert!((peak.b2 - peak.a2).abs() < 1e-12);
        for freq in [20.0, 750.0, 19000.0] {
            assert!((peak.magnitude_for_frequency(freq, 48000.0) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn peak_hits_its_gain_at_center() {
        let settings = ChainSettings {
            peak_freq: 1000.0,
            peak_gain_db: 12.0,
            peak_quality: 1.0,
            ..ChainSettings::default()
        };
        let peak = FilterCoefficientBuilder::make_peak_filter(&settings, 96000.0);
        let center_db = db(peak.magnitude_for_frequency(1000.0, 96000.0));
        assert!((center_db - 12.0).abs() < 1e-6, "{center_db}");
    }

    #[test]
    fn unused_cut_slots_are_placeholders() {
        for slope in Slope::ALL {
            let settings = ChainSettings {
                low_cut_slope: slope,
                ..ChainSettings::default()
            };
            let cut = FilterCoefficientBuilder::make_low_cut_filter(&settings, 48000.0);
            assert_eq!(cut.active_stages, slope.stages());
            for stage in &cut.stages[cut.active_stages..] {
                assert_eq!(*stage, BiquadCoefficients::identity());
            }
            for stage in &cut.stages[..cut.active_stages] {
                assert_ne!(*stage, BiquadCoefficients::identity());
            }
        }
    }

    #[test]
    fn cut_corner_is_minus_three_db() {
        for slope in Slope::ALL {
            let settings = ChainSettings {
                low_cut_freq: 1000.0,
                low_cut_slope: slope,
                high_cut_freq: 1000.0,
                high_cut_slope: slope,
                ..ChainSettings::default()
            };
            let low_cut = FilterCoefficientBuilder::make_low_cut_filter(&settings, 48000.0);
            let high_cut = FilterCoefficientBuilder::make_high_cut_filter(&settings, 48000.0);
            let low_db = db(cut_magnitude(&low_cut, 1000.0, 48000.0));
            let high_db = db(cut_magnitude(&high_cut, 1000.0, 48000.0));
            assert!((low_db + 3.0103).abs() < 0.01, "{slope:?}: {low_db}");
            assert!((high_db + 3.0103).abs() < 0.01, "{slope:?}: {high_db}");
        }
    }

    #[test]
    fn low_cut_rolls_off_at_its_slope() {
        let sample_rate = 48000.0;
        let corner = 2000.0;
        for slope in Slope::ALL {
            let settings = ChainSettings {
                low_cut_freq: corner as f32,
                low_cut_slope: slope,
                ..ChainSettings::default()
            };
            let cut = FilterCoefficientBuilder::make_low_cut_filter(&settings, sample_rate as f32);
            // One decade, three decades below the corner
            let f_low = corner / 1000.0;
            let f_high = corner / 100.0;
            let rise_db = db(cut_magnitude(&cut, f_high, sample_rate)) - db(cut_magnitude(&cut, f_low, sample_rate));
            let per_octave = rise_db / (f_high / f_low).log2();
            let expected = slope.db_per_octave() as f64;
            assert!((per_octave - expected).abs() < 0.5, "{slope:?}: {per_octave} dB/oct");
        }
    }

    #[test]
    fn frequencies_are_clamped_below_nyquist() {
        let settings = ChainSettings {
            high_cut_freq: 30000.0,
            peak_freq: 30000.0,
            ..ChainSettings::default()
        };
        // 0.49 * 32 kHz is below the 20 kHz parameter ceiling
        let design = FilterCoefficientBuilder::design(&settings, 32000.0);
        let expected = FilterCoefficientBuilder::design(
            &ChainSettings {
                high_cut_freq: 0.49 * 32000.0,
                peak_freq: 0.49 * 32000.0,
                ..ChainSettings::default()
            },
            32000.0,
        );
        assert_eq!(design, expected);

        for stage in design.high_cut.stages.iter().chain([&design.peak]) {
            for value in [stage.b0, stage.b1, stage.b2, stage.a1, stage.a2] {
                assert!(value.is_finite());
            }
        }
    }

    #[test]
    fn redesign_is_deterministic() {
        let original = ChainSettings::default();
        let first = FilterCoefficientBuilder::design(&original, 44100.0);
        let changed = FilterCoefficientBuilder::design(
            &ChainSettings {
                peak_gain_db: 7.5,
                low_cut_slope: Slope::Slope36,
                ..original
            },
            44100.0,
        );
        assert_ne!(first, changed);
        assert_eq!(FilterCoefficientBuilder::design(&original, 44100.0), first);
    }
}
