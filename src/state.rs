use nih_plug::nih_log;
use nih_plug::prelude::Enum;
use nih_plug::wrapper::state::{ParamValue, PluginState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::audio::chain_settings::{ChainSettings, Slope};
use crate::audio::parameter_bridge::ParameterSource;

/// State blob errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("State blob is empty")]
    Empty,

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Every parameter value, keyed by the parameter display names.
///
/// Unknown keys are ignored and missing keys keep their defaults, so blobs written by older or
/// newer versions still load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqState {
    #[serde(rename = "LowCut Freq")]
    pub low_cut_freq: f32,
    #[serde(rename = "HighCut Freq")]
    pub high_cut_freq: f32,
    #[serde(rename = "Peak Freq")]
    pub peak_freq: f32,
    #[serde(rename = "Peak Gain")]
    pub peak_gain_db: f32,
    #[serde(rename = "Peak Quality")]
    pub peak_quality: f32,
    #[serde(rename = "LowCut Slope", with = "slope_db_per_octave")]
    pub low_cut_slope: Slope,
    #[serde(rename = "HighCut Slope", with = "slope_db_per_octave")]
    pub high_cut_slope: Slope,
    #[serde(rename = "LowCut Bypassed")]
    pub low_cut_bypassed: bool,
    #[serde(rename = "Peak Bypassed")]
    pub peak_bypassed: bool,
    #[serde(rename = "HighCut Bypassed")]
    pub high_cut_bypassed: bool,
    #[serde(rename = "Analyzer Enabled")]
    pub analyzer_enabled: bool,
}

/// `EqParams` IDs, in the same order as the `EqState` fields
pub const PARAM_IDS: [&str; 11] = [
    "lowcut_freq",
    "highcut_freq",
    "peak_freq",
    "peak_gain",
    "peak_quality",
    "lowcut_slope",
    "highcut_slope",
    "lowcut_bypassed",
    "peak_bypassed",
    "highcut_bypassed",
    "analyzer_enabled",
];

impl Default for EqState {
    fn default() -> Self {
        Self::from_settings(&ChainSettings::default(), true)
    }
}

impl EqState {
    pub fn from_settings(settings: &ChainSettings, analyzer_enabled: bool) -> Self {
        Self {
            low_cut_freq: settings.low_cut_freq,
            high_cut_freq: settings.high_cut_freq,
            peak_freq: settings.peak_freq,
            peak_gain_db: settings.peak_gain_db,
            peak_quality: settings.peak_quality,
            low_cut_slope: settings.low_cut_slope,
            high_cut_slope: settings.high_cut_slope,
            low_cut_bypassed: settings.low_cut_bypassed,
            peak_bypassed: settings.peak_bypassed,
            high_cut_bypassed: settings.high_cut_bypassed,
            analyzer_enabled,
        }
    }

    /// Snapshot any parameter source
    pub fn capture<S: ParameterSource + ?Sized>(source: &S) -> Self {
        Self::from_settings(&source.chain_settings(), source.analyzer_enabled())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StateError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a blob, out of range values are clamped
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        if bytes.is_empty() {
            return Err(StateError::Empty);
        }

        let state: Self = serde_json::from_slice(bytes)?;
        Ok(state.clamped())
    }

    /// Replace the current values with the blob's. On error nothing changes.
    pub fn restore_from_bytes(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        *self = Self::from_bytes(bytes)?;
        Ok(())
    }

    /// The values as nih-plug stores them in the host's [`PluginState`], keyed by parameter ID
    pub fn param_values(&self) -> [(&'static str, ParamValue); 11] {
        [
            (PARAM_IDS[0], ParamValue::F32(self.low_cut_freq)),
            (PARAM_IDS[1], ParamValue::F32(self.high_cut_freq)),
            (PARAM_IDS[2], ParamValue::F32(self.peak_freq)),
            (PARAM_IDS[3], ParamValue::F32(self.peak_gain_db)),
            (PARAM_IDS[4], ParamValue::F32(self.peak_quality)),
            (PARAM_IDS[5], slope_value(self.low_cut_slope)),
            (PARAM_IDS[6], slope_value(self.high_cut_slope)),
            (PARAM_IDS[7], ParamValue::Bool(self.low_cut_bypassed)),
            (PARAM_IDS[8], ParamValue::Bool(self.peak_bypassed)),
            (PARAM_IDS[9], ParamValue::Bool(self.high_cut_bypassed)),
            (PARAM_IDS[10], ParamValue::Bool(self.analyzer_enabled)),
        ]
    }

    /// Read the parameter section of a host state. Missing or unreadable entries keep their
    /// defaults and everything is clamped.
    pub fn from_plugin_state(state: &PluginState) -> Self {
        let mut restored = Self::default();
        for (id, value) in &state.params {
            restored.apply_param(id, value);
        }

        restored.clamped()
    }

    /// Normalize a host state before nih-plug applies it to `EqParams`.
    ///
    /// Missing parameters are filled in with their defaults and values are clamped to their
    /// ranges. Unknown IDs are removed. Entries with an unreadable value are removed too, so the
    /// parameter keeps its current value instead of loading garbage.
    pub fn filter_plugin_state(state: &mut PluginState) {
        let mut scratch = Self::default();
        let rejected: Vec<String> = state
            .params
            .iter()
            .filter(|(id, value)| !scratch.apply_param(id, value))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &rejected {
            nih_log!("Ignoring saved value for '{}'", id);
        }

        let restored = Self::from_plugin_state(state);
        state.params = restored
            .param_values()
            .into_iter()
            .filter(|(id, _)| !rejected.iter().any(|rejected_id| rejected_id.as_str() == *id))
            .map(|(id, value)| (id.to_owned(), value))
            .collect::<BTreeMap<_, _>>();
    }

    /// Returns `false` for unknown IDs and values of the wrong type
    fn apply_param(&mut self, id: &str, value: &ParamValue) -> bool {
        match (id, value) {
            ("lowcut_freq", ParamValue::F32(freq)) if freq.is_finite() => self.low_cut_freq = *freq,
            ("highcut_freq", ParamValue::F32(freq)) if freq.is_finite() => self.high_cut_freq = *freq,
            ("peak_freq", ParamValue::F32(freq)) if freq.is_finite() => self.peak_freq = *freq,
            ("peak_gain", ParamValue::F32(gain)) if gain.is_finite() => self.peak_gain_db = *gain,
            ("peak_quality", ParamValue::F32(quality)) if quality.is_finite() => {
                self.peak_quality = *quality
            }
            ("lowcut_slope", value) => match read_slope(value) {
                Some(slope) => self.low_cut_slope = slope,
                None => return false,
            },
            ("highcut_slope", value) => match read_slope(value) {
                Some(slope) => self.high_cut_slope = slope,
                None => return false,
            },
            ("lowcut_bypassed", ParamValue::Bool(bypassed)) => self.low_cut_bypassed = *bypassed,
            ("peak_bypassed", ParamValue::Bool(bypassed)) => self.peak_bypassed = *bypassed,
            ("highcut_bypassed", ParamValue::Bool(bypassed)) => self.high_cut_bypassed = *bypassed,
            ("analyzer_enabled", ParamValue::Bool(enabled)) => self.analyzer_enabled = *enabled,
            _ => return false,
        }

        true
    }

    pub fn clamped(self) -> Self {
        Self::from_settings(&self.settings().clamped(), self.analyzer_enabled)
    }

    fn settings(&self) -> ChainSettings {
        ChainSettings {
            peak_freq: self.peak_freq,
            peak_gain_db: self.peak_gain_db,
            peak_quality: self.peak_quality,
            low_cut_freq: self.low_cut_freq,
            high_cut_freq: self.high_cut_freq,
            low_cut_slope: self.low_cut_slope,
            high_cut_slope: self.high_cut_slope,
            low_cut_bypassed: self.low_cut_bypassed,
            peak_bypassed: self.peak_bypassed,
            high_cut_bypassed: self.high_cut_bypassed,
        }
    }
}

impl ParameterSource for EqState {
    fn chain_settings(&self) -> ChainSettings {
        self.settings().clamped()
    }

    fn analyzer_enabled(&self) -> bool {
        self.analyzer_enabled
    }
}

/// nih-plug stores enum parameters by their variant ID when the enum has IDs
fn slope_value(slope: Slope) -> ParamValue {
    match Slope::ids().and_then(|ids| ids.get(slope.to_index())) {
        Some(id) => ParamValue::String((*id).to_owned()),
        None => ParamValue::I32(slope.to_index() as i32),
    }
}

/// Accepts variant IDs and plain indices, indices saturate. A JSON index may come back as a float.
fn read_slope(value: &ParamValue) -> Option<Slope> {
    match value {
        ParamValue::String(id) => Slope::ids()?
            .iter()
            .position(|known| known == id)
            .map(Slope::from_index),
        ParamValue::I32(index) => Some(Slope::from_slope_index((*index).max(0) as usize)),
        ParamValue::F32(index) if index.is_finite() && index.fract() == 0.0 => {
            Some(Slope::from_slope_index(index.max(0.0) as usize))
        }
        _ => None,
    }
}

/// Slopes are stored as their dB/oct value. Values in between round down to the next valid slope.
mod slope_db_per_octave {
    use super::Slope;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(slope: &Slope, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(slope.db_per_octave())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Slope, D::Error> {
        let db_per_octave = u32::deserialize(deserializer)?;
        Ok(Slope::from_db_per_octave(db_per_octave)
            .unwrap_or_else(|| Slope::from_slope_index((db_per_octave / 12).saturating_sub(1) as usize)))
    }
}
