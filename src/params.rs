use nih_plug::prelude::*;
use nih_plug_egui::EguiState;
use std::sync::Arc;

use crate::audio::chain_settings::{ChainSettings, Slope};
use crate::audio::constants;
use crate::audio::parameter_bridge::{ChangeFlag, ParameterSource};
use crate::ui::UITheme;

#[derive(Params)]
pub struct EqParams {
    /// The editor state, saved together with the parameter state so the custom scaling can be
    /// restored.
    #[persist = "editor-state"]
    pub editor_state: Arc<EguiState>,

    /// The parameter's ID is used to identify the parameter in the wrapped plugin API. As long as
    /// these IDs remain constant, you can rename and reorder these fields as you wish.
    #[id = "lowcut_freq"]
    pub low_cut_freq: FloatParam,
    #[id = "highcut_freq"]
    pub high_cut_freq: FloatParam,
    #[id = "peak_freq"]
    pub peak_freq: FloatParam,
    #[id = "peak_gain"]
    pub peak_gain: FloatParam,
    #[id = "peak_quality"]
    pub peak_quality: FloatParam,

    #[id = "lowcut_slope"]
    pub low_cut_slope: EnumParam<Slope>,
    #[id = "highcut_slope"]
    pub high_cut_slope: EnumParam<Slope>,

    #[id = "lowcut_bypassed"]
    pub low_cut_bypassed: BoolParam,
    #[id = "peak_bypassed"]
    pub peak_bypassed: BoolParam,
    #[id = "highcut_bypassed"]
    pub high_cut_bypassed: BoolParam,

    #[id = "analyzer_enabled"]
    pub analyzer_enabled: BoolParam,
}

impl Default for EqParams {
    fn default() -> Self {
        Self::new(&ChangeFlag::new())
    }
}

impl EqParams {
    /// Every parameter raises `change_flag` when its value changes, the editor picks that up on its
    /// next tick.
    pub fn new(change_flag: &ChangeFlag) -> Self {
        Self {
            editor_state: EguiState::from_size(UITheme::EDITOR_WIDTH, UITheme::EDITOR_HEIGHT),

            low_cut_freq: frequency_param("LowCut Freq", constants::DEFAULT_LOW_CUT_FREQ, change_flag),
            high_cut_freq: frequency_param(
                "HighCut Freq",
                constants::DEFAULT_HIGH_CUT_FREQ,
                change_flag,
            ),
            peak_freq: frequency_param("Peak Freq", constants::DEFAULT_PEAK_FREQ, change_flag),

            // Stored in decibels, the filter design converts to linear gain
            peak_gain: FloatParam::new(
                "Peak Gain",
                constants::DEFAULT_PEAK_GAIN_DB,
                FloatRange::Linear {
                    min: constants::PEAK_GAIN_MIN_DB,
                    max: constants::PEAK_GAIN_MAX_DB,
                },
            )
            .with_step_size(0.5)
            .with_unit(" dB")
            .with_value_to_string(formatters::v2s_f32_rounded(1))
            .with_callback(float_callback(change_flag)),

            peak_quality: FloatParam::new(
                "Peak Quality",
                constants::DEFAULT_PEAK_Q,
                FloatRange::Linear {
                    min: constants::PEAK_Q_MIN,
                    max: constants::PEAK_Q_MAX,
                },
            )
            .with_step_size(0.05)
            .with_value_to_string(formatters::v2s_f32_rounded(2))
            .with_callback(float_callback(change_flag)),

            low_cut_slope: EnumParam::new("LowCut Slope", Slope::default())
                .with_callback(slope_callback(change_flag)),
            high_cut_slope: EnumParam::new("HighCut Slope", Slope::default())
                .with_callback(slope_callback(change_flag)),

            low_cut_bypassed: BoolParam::new("LowCut Bypassed", false)
                .with_callback(bool_callback(change_flag)),
            peak_bypassed: BoolParam::new("Peak Bypassed", false)
                .with_callback(bool_callback(change_flag)),
            high_cut_bypassed: BoolParam::new("HighCut Bypassed", false)
                .with_callback(bool_callback(change_flag)),

            analyzer_enabled: BoolParam::new("Analyzer Enabled", true)
                .with_callback(bool_callback(change_flag)),
        }
    }
}

/// 20 Hz to 20 kHz with the same skew as the other frequency controls
fn frequency_param(name: &str, default: f32, change_flag: &ChangeFlag) -> FloatParam {
    FloatParam::new(
        name,
        default,
        FloatRange::Skewed {
            min: constants::MIN_FREQUENCY,
            max: constants::MAX_FREQUENCY,
            factor: FloatRange::skew_factor(-2.0),
        },
    )
    .with_step_size(1.0)
    .with_value_to_string(formatters::v2s_f32_hz_then_khz(2))
    .with_string_to_value(formatters::s2v_f32_hz_then_khz())
    .with_callback(float_callback(change_flag))
}

fn float_callback(change_flag: &ChangeFlag) -> Arc<dyn Fn(f32) + Send + Sync> {
    let change_flag = change_flag.clone();
    Arc::new(move |_| change_flag.raise())
}

fn slope_callback(change_flag: &ChangeFlag) -> Arc<dyn Fn(Slope) + Send + Sync> {
    let change_flag = change_flag.clone();
    Arc::new(move |_| change_flag.raise())
}

fn bool_callback(change_flag: &ChangeFlag) -> Arc<dyn Fn(bool) + Send + Sync> {
    let change_flag = change_flag.clone();
    Arc::new(move |_| change_flag.raise())
}

/// Plain atomic loads, safe to call from the audio thread
impl ParameterSource for EqParams {
    fn chain_settings(&self) -> ChainSettings {
        ChainSettings {
            peak_freq: self.peak_freq.value(),
            peak_gain_db: self.peak_gain.value(),
            peak_quality: self.peak_quality.value(),
            low_cut_freq: self.low_cut_freq.value(),
            high_cut_freq: self.high_cut_freq.value(),
            low_cut_slope: self.low_cut_slope.value(),
            high_cut_slope: self.high_cut_slope.value(),
            low_cut_bypassed: self.low_cut_bypassed.value(),
            peak_bypassed: self.peak_bypassed.value(),
            high_cut_bypassed: self.high_cut_bypassed.value(),
        }
        .clamped()
    }

    fn analyzer_enabled(&self) -> bool {
        self.analyzer_enabled.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_parameter_table() {
        let params = EqParams::default();
        assert_eq!(params.chain_settings(), ChainSettings::default());
        assert!(params.analyzer_enabled());

        assert_eq!(params.low_cut_freq.name(), "LowCut Freq");
        assert_eq!(params.peak_quality.name(), "Peak Quality");
        assert_eq!(params.high_cut_slope.name(), "HighCut Slope");
        assert_eq!(params.analyzer_enabled.name(), "Analyzer Enabled");
    }

    #[test]
    fn exposes_all_eleven_parameters() {
        let params = EqParams::default();
        assert_eq!(params.param_map().len(), 11);
    }

    #[test]
    fn frequency_display_switches_to_khz() {
        let params = EqParams::default();
        let display = params
            .high_cut_freq
            .normalized_value_to_string(1.0, true);
        assert!(display.contains("kHz"), "{display}");
    }
}
