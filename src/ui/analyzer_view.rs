use atomic_float::AtomicF32;
use nih_plug_egui::egui::{pos2, Pos2, Rect, Vec2};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::audio::constants::GUI_TICK_HZ;
use crate::audio::fft_analyzer::{FftAnalyzer, FftOrder};
use crate::audio::filter_chain::MonoFilterChain;
use crate::audio::parameter_bridge::{ChangeFlag, ParameterSource};
use crate::audio::sample_fifo::SampleFifoConsumer;
use crate::audio::stereo_processor::AnalyzerFeeds;
use crate::ui::grid_overlay::{GridCache, GridGeometry};
use crate::ui::response_curve::ResponseCurveBuilder;
use crate::ui::spectrum_path::{SpectrumPathBuilder, SpectrumPathOutput};
use crate::ui::UITheme;

/// Spectrum pipeline for one channel: sample FIFO -> FFT frames -> newest path
pub struct PathProducer {
    fifo: SampleFifoConsumer,
    analyzer: FftAnalyzer,
    path_builder: SpectrumPathBuilder,
    path_output: SpectrumPathOutput,
}

impl PathProducer {
    pub fn new(fifo: SampleFifoConsumer, order: FftOrder) -> Self {
        let (path_builder, path_output) = SpectrumPathBuilder::new();

        Self {
            fifo,
            analyzer: FftAnalyzer::new(order),
            path_builder,
            path_output,
        }
    }

    /// Drain the channel FIFO into the analyzer and every finished frame into a path
    pub fn process(&mut self, fft_bounds: Vec2, sample_rate: f32) {
        let analyzer = &mut self.analyzer;
        self.fifo.pull_all(|block| analyzer.process_block(block));

        let fft_size = self.analyzer.fft_size();
        let bin_width = self.analyzer.bin_width(sample_rate);
        let negative_infinity_db = self.analyzer.negative_infinity_db();
        while let Some(frame) = self.analyzer.pull_frame() {
            self.path_builder
                .generate_path(&frame, fft_bounds, fft_size, bin_width, negative_infinity_db);
        }
    }

    /// Most recent path, in analysis area coordinates
    pub fn path(&mut self) -> &[Pos2] {
        self.path_output.read()
    }

    pub fn change_order(&mut self, order: FftOrder) {
        self.analyzer.change_order(order);
    }

    pub fn order(&self) -> FftOrder {
        self.analyzer.order()
    }
}

/// What the editor draws for one tick. Everything is in screen coordinates.
#[derive(Debug, Default)]
pub struct AnalyzerFrame {
    pub render_area: Rect,
    pub analysis_area: Rect,
    pub response_curve: Vec<Pos2>,
    /// Empty when the analyzer is switched off
    pub left_spectrum: Vec<Pos2>,
    pub right_spectrum: Vec<Pos2>,
}

/// Response curve and spectrum display, independent of the toolkit that paints it.
///
/// [`update`](Self::update) runs the pull, sync and compose steps at most `GUI_TICK_HZ` times per
/// second. The view keeps its own [`MonoFilterChain`] that is only resynced when the parameter
/// change flag was raised (or the sample rate moved) and never processes audio.
pub struct AnalyzerView<S: ParameterSource> {
    source: Arc<S>,
    change_flag: ChangeFlag,
    sample_rate: Arc<AtomicF32>,

    response_chain: MonoFilterChain,
    synced_sample_rate: f32,
    response_builder: ResponseCurveBuilder,

    left_producer: PathProducer,
    right_producer: PathProducer,
    grid_cache: GridCache,

    tick_interval: Duration,
    last_tick: Option<Instant>,
    frame: AnalyzerFrame,
}

impl<S: ParameterSource> AnalyzerView<S> {
    pub fn new(
        source: Arc<S>,
        change_flag: ChangeFlag,
        sample_rate: Arc<AtomicF32>,
        feeds: AnalyzerFeeds,
    ) -> Self {
        Self {
            source,
            change_flag,
            sample_rate,
            response_chain: MonoFilterChain::new(),
            synced_sample_rate: 0.0,
            response_builder: ResponseCurveBuilder::new(),
            left_producer: PathProducer::new(feeds.left, FftOrder::default()),
            right_producer: PathProducer::new(feeds.right, FftOrder::default()),
            grid_cache: GridCache::default(),
            tick_interval: Duration::from_secs_f32(1.0 / GUI_TICK_HZ),
            last_tick: None,
            frame: AnalyzerFrame::default(),
        }
    }

    /// Inner area with room for the labels around it
    pub fn render_area(bounds: Rect) -> Rect {
        Rect::from_min_max(
            pos2(
                bounds.left() + UITheme::RENDER_MARGIN_SIDE,
                bounds.top() + UITheme::RENDER_MARGIN_TOP,
            ),
            pos2(
                bounds.right() - UITheme::RENDER_MARGIN_SIDE,
                bounds.bottom() - UITheme::RENDER_MARGIN_BOTTOM,
            ),
        )
    }

    /// Area the curves and the grid live in
    pub fn analysis_area(bounds: Rect) -> Rect {
        let render_area = Self::render_area(bounds);
        Rect::from_min_max(
            pos2(render_area.left(), render_area.top() + UITheme::ANALYSIS_INSET),
            pos2(render_area.right(), render_area.bottom() - UITheme::ANALYSIS_INSET),
        )
    }

    /// Run one tick if the clock says so. Returns whether the frame changed.
    pub fn update(&mut self, now: Instant, bounds: Rect) -> bool {
        if let Some(last_tick) = self.last_tick {
            if now.saturating_duration_since(last_tick) < self.tick_interval {
                return false;
            }
        }

        self.last_tick = Some(now);
        self.tick(bounds);
        true
    }

    /// Pull, sync and compose unconditionally
    pub fn tick(&mut self, bounds: Rect) {
        let render_area = Self::render_area(bounds);
        let analysis_area = Self::analysis_area(bounds);
        let sample_rate = self.sample_rate.load(Ordering::Relaxed);

        // Pull
        self.left_producer.process(analysis_area.size(), sample_rate);
        self.right_producer.process(analysis_area.size(), sample_rate);

        // Sync
        if self.change_flag.take() || sample_rate != self.synced_sample_rate {
            self.response_chain
                .update_from_settings(&self.source.chain_settings(), sample_rate);
            self.synced_sample_rate = sample_rate;
        }

        // Compose
        self.grid_cache.get(render_area, analysis_area);

        let frame = &mut self.frame;
        frame.render_area = render_area;
        frame.analysis_area = analysis_area;

        frame.response_curve.clear();
        frame.response_curve.extend_from_slice(self.response_builder.build(
            &self.response_chain,
            sample_rate,
            analysis_area,
        ));

        frame.left_spectrum.clear();
        frame.right_spectrum.clear();
        if self.source.analyzer_enabled() {
            let offset = analysis_area.min.to_vec2();
            frame
                .left_spectrum
                .extend(self.left_producer.path().iter().map(|&point| point + offset));
            frame
                .right_spectrum
                .extend(self.right_producer.path().iter().map(|&point| point + offset));
        }
    }

    pub fn frame(&self) -> &AnalyzerFrame {
        &self.frame
    }

    pub fn grid(&self) -> &GridGeometry {
        self.grid_cache.geometry()
    }

    pub fn grid_generation(&self) -> u64 {
        self.grid_cache.generation()
    }

    pub fn response_chain(&self) -> &MonoFilterChain {
        &self.response_chain
    }

    pub fn set_fft_order(&mut self, order: FftOrder) {
        self.left_producer.change_order(order);
        self.right_producer.change_order(order);
    }

    pub fn fft_order(&self) -> FftOrder {
        self.left_producer.order()
    }
}
