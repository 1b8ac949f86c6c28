use crate::audio::constants;
use nih_plug::prelude::Enum;

/// Roll-off of a cut filter. Each step adds one more Butterworth biquad section.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slope {
    #[id = "12"]
    #[name = "12 dB/oct"]
    Slope12,
    #[id = "24"]
    #[name = "24 dB/oct"]
    Slope24,
    #[id = "36"]
    #[name = "36 dB/oct"]
    Slope36,
    #[id = "48"]
    #[name = "48 dB/oct"]
    Slope48,
}

impl Default for Slope {
    fn default() -> Self {
        Self::Slope12
    }
}

impl Slope {
    pub const ALL: [Slope; 4] = [Slope::Slope12, Slope::Slope24, Slope::Slope36, Slope::Slope48];

    /// Slope index 0..=3, the same encoding the parameter uses
    pub fn index(self) -> usize {
        match self {
            Self::Slope12 => 0,
            Self::Slope24 => 1,
            Self::Slope36 => 2,
            Self::Slope48 => 3,
        }
    }

    /// Out of range indices saturate at 48 dB/oct
    pub fn from_slope_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Number of active biquad sections in a cut filter
    pub fn stages(self) -> usize {
        self.index() + 1
    }

    /// Butterworth order of the cascade
    pub fn order(self) -> usize {
        2 * self.stages()
    }

    pub fn db_per_octave(self) -> u32 {
        12 * self.stages() as u32
    }

    pub fn from_db_per_octave(db_per_octave: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|slope| slope.db_per_octave() == db_per_octave)
    }
}

/// Plain snapshot of every parameter that shapes the filter chain.
///
/// Taken once per audio block (and once per GUI tick on the editor side). Compared by value to
/// decide whether coefficients need to be redesigned, so there is no need for any ordering between
/// the individual parameter reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    pub peak_freq: f32,
    pub peak_gain_db: f32,
    pub peak_quality: f32,
    pub low_cut_freq: f32,
    pub high_cut_freq: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
    pub low_cut_bypassed: bool,
    pub peak_bypassed: bool,
    pub high_cut_bypassed: bool,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            peak_freq: constants::DEFAULT_PEAK_FREQ,
            peak_gain_db: constants::DEFAULT_PEAK_GAIN_DB,
            peak_quality: constants::DEFAULT_PEAK_Q,
            low_cut_freq: constants::DEFAULT_LOW_CUT_FREQ,
            high_cut_freq: constants::DEFAULT_HIGH_CUT_FREQ,
            low_cut_slope: Slope::Slope12,
            high_cut_slope: Slope::Slope12,
            low_cut_bypassed: false,
            peak_bypassed: false,
            high_cut_bypassed: false,
        }
    }
}

impl ChainSettings {
    /// Everything bypassed, the chain becomes a bit-exact pass-through
    pub fn all_bypassed() -> Self {
        Self {
            low_cut_bypassed: true,
            peak_bypassed: true,
            high_cut_bypassed: true,
            ..Self::default()
        }
    }

    /// Clamp every field to its declared parameter range
    pub fn clamped(self) -> Self {
        Self {
            peak_freq: clamp_finite(self.peak_freq, constants::MIN_FREQUENCY, constants::MAX_FREQUENCY),
            peak_gain_db: clamp_finite(
                self.peak_gain_db,
                constants::PEAK_GAIN_MIN_DB,
                constants::PEAK_GAIN_MAX_DB,
            ),
            peak_quality: clamp_finite(self.peak_quality, constants::PEAK_Q_MIN, constants::PEAK_Q_MAX),
            low_cut_freq: clamp_finite(
                self.low_cut_freq,
                constants::MIN_FREQUENCY,
                constants::MAX_FREQUENCY,
            ),
            high_cut_freq: clamp_finite(
                self.high_cut_freq,
                constants::MIN_FREQUENCY,
                constants::MAX_FREQUENCY,
            ),
            ..self
        }
    }
}

/// `f32::clamp` that also maps NaN to the lower bound
pub(crate) fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_encodings_agree() {
        for (index, slope) in Slope::ALL.into_iter().enumerate() {
            assert_eq!(slope.index(), index);
            assert_eq!(Slope::from_slope_index(index), slope);
            assert_eq!(slope.stages(), index + 1);
            assert_eq!(slope.db_per_octave(), 12 * (index as u32 + 1));
            assert_eq!(Slope::from_db_per_octave(slope.db_per_octave()), Some(slope));
        }
        assert_eq!(Slope::from_slope_index(17), Slope::Slope48);
        assert_eq!(Slope::from_db_per_octave(18), None);
    }

    #[test]
    fn clamping_keeps_fields_in_range() {
        let wild = ChainSettings {
            peak_freq: 1.0e6,
            peak_gain_db: -90.0,
            peak_quality: f32::NAN,
            low_cut_freq: 0.0,
            high_cut_freq: 30000.0,
            ..ChainSettings::default()
        };
        let clamped = wild.clamped();
        assert_eq!(clamped.peak_freq, 20000.0);
        assert_eq!(clamped.peak_gain_db, -24.0);
        assert_eq!(clamped.peak_quality, 0.1);
        assert_eq!(clamped.low_cut_freq, 20.0);
        assert_eq!(clamped.high_cut_freq, 20000.0);
        assert_eq!(ChainSettings::default().clamped(), ChainSettings::default());
    }
}
