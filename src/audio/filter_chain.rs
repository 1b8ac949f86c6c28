use crate::audio::chain_settings::ChainSettings;
use crate::audio::coefficients::{
    BiquadCoefficients, ChainCoefficients, CutCoefficients, FilterCoefficientBuilder, MAX_CUT_STAGES,
};

/// Named positions in a `MonoFilterChain`, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    LowCut,
    Peak,
    HighCut,
}

impl ChainPosition {
    fn index(self) -> usize {
        match self {
            Self::LowCut => 0,
            Self::Peak => 1,
            Self::HighCut => 2,
        }
    }
}

/// One biquad section in Transposed Direct Form II.
///
/// The state is kept in `f64` even though audio comes in as `f32`, low corner frequencies at high
/// sample rates put the poles very close to the unit circle.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadStage {
    coefficients: BiquadCoefficients,
    s1: f64,
    s2: f64,
}

impl BiquadStage {
    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coefficients
    }

    /// Swap in a new coefficient set, the sample memory is kept so there is no click
    pub fn set_coefficients(&mut self, coefficients: BiquadCoefficients) {
        self.coefficients = coefficients;
    }

    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let x = input as f64;
        let y = c.b0 * x + self.s1;
        self.s1 = c.b1 * x - c.a1 * y + self.s2;
        self.s2 = c.b2 * x - c.a2 * y;
        y as f32
    }

    pub fn process(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Four biquads in series with a bypass flag each.
///
/// Only prefix patterns are ever installed: the first `n` stages are active, the rest bypassed.
#[derive(Debug, Clone, Copy)]
pub struct CutFilter {
    stages: [BiquadStage; MAX_CUT_STAGES],
    bypassed: [bool; MAX_CUT_STAGES],
}

impl Default for CutFilter {
    fn default() -> Self {
        Self {
            stages: [BiquadStage::default(); MAX_CUT_STAGES],
            // Matches a fresh 12 dB/oct design
            bypassed: [false, true, true, true],
        }
    }
}

impl CutFilter {
    /// Install a cascade design. All four slots receive coefficients (placeholders for the unused
    /// ones) and the bypass flags follow the active stage count.
    pub fn update(&mut self, design: &CutCoefficients) {
        for (index, (stage, coefficients)) in self.stages.iter_mut().zip(design.stages.iter()).enumerate() {
            stage.set_coefficients(*coefficients);
            self.bypassed[index] = index >= design.active_stages;
        }
    }

    pub fn stage(&self, index: usize) -> &BiquadStage {
        &self.stages[index]
    }

    pub fn is_stage_bypassed(&self, index: usize) -> bool {
        self.bypassed[index]
    }

    pub fn active_stages(&self) -> impl Iterator<Item = &BiquadStage> {
        self.stages
            .iter()
            .zip(self.bypassed.iter())
            .filter(|(_, &bypassed)| !bypassed)
            .map(|(stage, _)| stage)
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    pub fn process(&mut self, block: &mut [f32]) {
        for (stage, &bypassed) in self.stages.iter_mut().zip(self.bypassed.iter()) {
            if !bypassed {
                stage.process(block);
            }
        }
    }
}

/// Low cut, peak and high cut for one channel.
///
/// The audio thread owns one of these per channel. The editor keeps its own copy that is only
/// used to evaluate the response curve and never sees audio.
#[derive(Debug, Clone, Default)]
pub struct MonoFilterChain {
    low_cut: CutFilter,
    peak: BiquadStage,
    high_cut: CutFilter,
    bypassed: [bool; 3],
}

impl MonoFilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Design coefficients for `settings` and install them together with the bypass flags
    pub fn update_from_settings(&mut self, settings: &ChainSettings, sample_rate: f32) {
        let coefficients = FilterCoefficientBuilder::design(settings, sample_rate);
        self.install(&coefficients, settings);
    }

    /// Install already designed coefficients. Used when both channels share one design.
    pub fn install(&mut self, coefficients: &ChainCoefficients, settings: &ChainSettings) {
        self.low_cut.update(&coefficients.low_cut);
        self.peak.set_coefficients(coefficients.peak);
        self.high_cut.update(&coefficients.high_cut);

        self.set_bypassed(ChainPosition::LowCut, settings.low_cut_bypassed);
        self.set_bypassed(ChainPosition::Peak, settings.peak_bypassed);
        self.set_bypassed(ChainPosition::HighCut, settings.high_cut_bypassed);
    }

    pub fn is_bypassed(&self, position: ChainPosition) -> bool {
        self.bypassed[position.index()]
    }

    pub fn set_bypassed(&mut self, position: ChainPosition, bypassed: bool) {
        self.bypassed[position.index()] = bypassed;
    }

    pub fn low_cut(&self) -> &CutFilter {
        &self.low_cut
    }

    pub fn peak(&self) -> &BiquadStage {
        &self.peak
    }

    pub fn high_cut(&self) -> &CutFilter {
        &self.high_cut
    }

    /// Clear the sample memory of every stage
    pub fn reset(&mut self) {
        self.low_cut.reset();
        self.peak.reset();
        self.high_cut.reset();
    }

    /// Filter a mono block in place: low cut, peak, high cut
    pub fn process(&mut self, block: &mut [f32]) {
        if !self.is_bypassed(ChainPosition::LowCut) {
            self.low_cut.process(block);
        }
        if !self.is_bypassed(ChainPosition::Peak) {
            self.peak.process(block);
        }
        if !self.is_bypassed(ChainPosition::HighCut) {
            self.high_cut.process(block);
        }
    }

    /// Product of the magnitudes of every stage that would process audio right now
    pub fn magnitude_for_frequency(&self, freq: f64, sample_rate: f64) -> f64 {
        let mut magnitude = 1.0;

        if !self.is_bypassed(ChainPosition::LowCut) {
            for stage in self.low_cut.active_stages() {
                magnitude *= stage.coefficients().magnitude_for_frequency(freq, sample_rate);
            }
        }
        if !self.is_bypassed(ChainPosition::Peak) {
            magnitude *= self.peak.coefficients().magnitude_for_frequency(freq, sample_rate);
        }
        if !self.is_bypassed(ChainPosition::HighCut) {
            for stage in self.high_cut.active_stages() {
                magnitude *= stage.coefficients().magnitude_for_frequency(freq, sample_rate);
            }
        }

        magnitude
    }
}
