pub mod audio;
mod editor;
pub mod params;
pub mod state;
pub mod ui;

use atomic_float::AtomicF32;
use audio::parameter_bridge::ChangeFlag;
use audio::stereo_processor::{AnalyzerFeeds, StereoProcessor};
use editor::EditorInitFlags;
use nih_plug::prelude::*;
use nih_plug::wrapper::state::PluginState;
use params::EqParams;
use std::sync::{atomic::Ordering, Arc};

pub use audio::chain_settings::{ChainSettings, Slope};
pub use state::{EqState, StateError};

pub struct SimpleEq {
    params: Arc<EqParams>,
    /// Raised by every parameter callback, taken by the editor once per tick
    change_flag: ChangeFlag,

    processor: StereoProcessor,
    /// FIFO consumers handed to every editor instance
    analyzer_feeds: AnalyzerFeeds,

    /// Sample rate shared with the editor for the bin width and response curve
    sample_rate: Arc<AtomicF32>,
}

impl Default for SimpleEq {
    fn default() -> Self {
        let change_flag = ChangeFlag::new();
        let (processor, analyzer_feeds) = StereoProcessor::new();

        Self {
            params: Arc::new(EqParams::new(&change_flag)),
            change_flag,
            processor,
            analyzer_feeds,
            sample_rate: Arc::new(AtomicF32::new(44100.0)),
        }
    }
}

impl Plugin for SimpleEq {
    const NAME: &'static str = "Simple EQ";
    const VENDOR: &'static str = "Cmdv";
    const URL: &'static str = env!("CARGO_PKG_HOMEPAGE");
    const EMAIL: &'static str = "info@cmdv.me";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // The first audio IO layout is used as the default. The other layouts may be selected either
    // explicitly or automatically by the host or the user depending on the plugin API/backend.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),

            aux_input_ports: &[],
            aux_output_ports: &[],

            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    const MIDI_OUTPUT: MidiConfig = MidiConfig::None;

    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn filter_state(state: &mut PluginState) {
        // Clamping and defaults for presets and sessions saved by other versions
        EqState::filter_plugin_state(state);
    }

    fn editor(&mut self, _async_executor: AsyncExecutor<Self>) -> Option<Box<dyn Editor>> {
        nih_log!("Editor requested");

        // Make sure the new editor designs its response curve right away
        self.change_flag.raise();

        editor::create(EditorInitFlags {
            params: self.params.clone(),
            change_flag: self.change_flag.clone(),
            sample_rate: self.sample_rate.clone(),
            feeds: self.analyzer_feeds.clone(),
        })
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let num_input_channels = audio_io_layout
            .main_input_channels
            .map(NonZeroU32::get)
            .unwrap_or(0) as usize;

        nih_log!(
            "Plugin initialize called, sample_rate: {}, buffer_size: {}, inputs: {}",
            buffer_config.sample_rate,
            buffer_config.max_buffer_size,
            num_input_channels
        );

        // Allocates the FIFO blocks, `reset()` is called right after this
        self.processor.prepare(
            buffer_config.sample_rate,
            buffer_config.max_buffer_size as usize,
            num_input_channels,
        );
        self.sample_rate
            .store(buffer_config.sample_rate, Ordering::Relaxed);
        self.change_flag.raise();

        true
    }

    fn reset(&mut self) {
        // Called from the audio thread, must not allocate
        self.processor.reset();
    }

    fn deactivate(&mut self) {
        nih_log!("Plugin deactivated");
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        self.processor
            .process_block(buffer.as_slice(), self.params.as_ref());

        ProcessStatus::Normal
    }
}

impl ClapPlugin for SimpleEq {
    const CLAP_ID: &'static str = "me.cmdv.simple-eq";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Three band equalizer with a spectrum analyzer");
    const CLAP_MANUAL_URL: Option<&'static str> = Some(Self::URL);
    const CLAP_SUPPORT_URL: Option<&'static str> = None;

    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Equalizer,
        ClapFeature::Stereo,
        ClapFeature::Mono,
    ];
}

impl Vst3Plugin for SimpleEq {
    const VST3_CLASS_ID: [u8; 16] = *b"CmdvSimpleEqPlug";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Eq];
}

nih_export_clap!(SimpleEq);
nih_export_vst3!(SimpleEq);
