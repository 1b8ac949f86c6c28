use crate::audio::constants;
use crate::audio::filter_chain::MonoFilterChain;
use crate::ui::grid_overlay::response_db_to_y;
use nih_plug::util;
use nih_plug_egui::egui::{pos2, Pos2, Rect};

/// Draws the theoretical magnitude response of a filter chain, one vertex per pixel column
#[derive(Debug, Default)]
pub struct ResponseCurveBuilder {
    magnitudes_db: Vec<f32>,
    path: Vec<Pos2>,
}

impl ResponseCurveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combined gain of the chain at `freq` in dB
    pub fn magnitude_db(chain: &MonoFilterChain, freq: f32, sample_rate: f32) -> f32 {
        let magnitude = chain.magnitude_for_frequency(freq as f64, sample_rate as f64);
        util::gain_to_db(magnitude as f32)
    }

    /// Evaluate the chain for every column of `area` and rebuild the path
    pub fn build(&mut self, chain: &MonoFilterChain, sample_rate: f32, area: Rect) -> &[Pos2] {
        let width = area.width().max(0.0) as usize;

        self.magnitudes_db.clear();
        self.magnitudes_db.extend((0..width).map(|x| {
            let freq = constants::log_position_to_freq(x as f32 / width as f32);
            Self::magnitude_db(chain, freq, sample_rate)
        }));

        self.path.clear();
        self.path.extend(
            self.magnitudes_db
                .iter()
                .enumerate()
                .map(|(x, &db)| pos2(area.left() + x as f32, response_db_to_y(db, area))),
        );

        &self.path
    }

    /// Column levels of the last build
    pub fn magnitudes_db(&self) -> &[f32] {
        &self.magnitudes_db
    }

    pub fn path(&self) -> &[Pos2] {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::chain_settings::ChainSettings;

    fn area() -> Rect {
        Rect::from_min_max(pos2(10.0, 0.0), pos2(410.0, 200.0))
    }

    #[test]
    fn flat_chain_draws_a_flat_line_through_zero_db() {
        let mut chain = MonoFilterChain::new();
        chain.update_from_settings(&ChainSettings::all_bypassed(), 48000.0);

        let mut builder = ResponseCurveBuilder::new();
        let path = builder.build(&chain, 48000.0, area());
        assert_eq!(path.len(), 400);
        assert_eq!(path[0].x, 10.0);
        assert!(path.iter().all(|point| point.y == 100.0));
    }

    #[test]
    fn peak_shows_up_at_its_column() {
        let mut chain = MonoFilterChain::new();
        chain.update_from_settings(
            &ChainSettings {
                peak_freq: 1000.0,
                peak_gain_db: 12.0,
                ..ChainSettings::default()
            },
            48000.0,
        );

        let mut builder = ResponseCurveBuilder::new();
        builder.build(&chain, 48000.0, area());
        let levels = builder.magnitudes_db();
        let (peak_column, peak_db) = levels
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (x, db)| if db > best.1 { (x, db) } else { best });

        let expected_column = constants::freq_to_log_position(1000.0) * 400.0;
        assert!((peak_column as f32 - expected_column).abs() <= 1.0);
        assert!((peak_db - 12.0).abs() < 0.1, "{peak_db}");
    }

    #[test]
    fn bypassed_chain_reads_zero_db() {
        let mut chain = MonoFilterChain::new();
        chain.update_from_settings(&ChainSettings::all_bypassed(), 48000.0);
        for freq in [20.0, 1000.0, 20000.0] {
            assert_eq!(ResponseCurveBuilder::magnitude_db(&chain, freq, 48000.0), 0.0);
        }
    }

    #[test]
    fn deep_cuts_are_floored() {
        let mut chain = MonoFilterChain::new();
        chain.update_from_settings(
            &ChainSettings {
                low_cut_freq: 20000.0,
                low_cut_slope: crate::audio::chain_settings::Slope::Slope48,
                ..ChainSettings::default()
            },
            48000.0,
        );
        let db = ResponseCurveBuilder::magnitude_db(&chain, 20.0, 48000.0);
        assert!(db.is_finite());
        assert!(db >= util::MINUS_INFINITY_DB);
    }
}
