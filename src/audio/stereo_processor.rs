use crate::audio::coefficients::FilterCoefficientBuilder;
use crate::audio::constants::ANALYZER_MAX_BLOCK_SIZE;
use crate::audio::filter_chain::MonoFilterChain;
use crate::audio::parameter_bridge::{ParameterBridge, ParameterSource};
use crate::audio::sample_fifo::{ChannelSampleFifo, SampleFifoConsumer};
use nih_plug::nih_debug_assert;

/// Editor ends of the two channel FIFOs
#[derive(Clone)]
pub struct AnalyzerFeeds {
    pub left: SampleFifoConsumer,
    pub right: SampleFifoConsumer,
}

/// Runs the filter chain on both channels and feeds the analyzer.
///
/// Everything in `process_block` is real-time safe: coefficients are designed into fixed size
/// arrays and the FIFOs only move preallocated blocks around.
pub struct StereoProcessor {
    left_chain: MonoFilterChain,
    right_chain: MonoFilterChain,
    bridge: ParameterBridge,

    left_fifo: ChannelSampleFifo,
    right_fifo: ChannelSampleFifo,

    sample_rate: f32,
    num_input_channels: usize,
}

impl StereoProcessor {
    /// Returns (processor for the audio thread, FIFO consumers for the editor)
    pub fn new() -> (Self, AnalyzerFeeds) {
        let (left_fifo, left) = ChannelSampleFifo::new();
        let (right_fifo, right) = ChannelSampleFifo::new();

        (
            Self {
                left_chain: MonoFilterChain::new(),
                right_chain: MonoFilterChain::new(),
                bridge: ParameterBridge::new(),
                left_fifo,
                right_fifo,
                sample_rate: 44100.0,
                num_input_channels: 2,
            },
            AnalyzerFeeds { left, right },
        )
    }

    /// Get ready for playback. Allocates the FIFO blocks, so this is not real-time safe.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize, num_input_channels: usize) {
        nih_debug_assert!(sample_rate > 0.0);
        nih_debug_assert!(num_input_channels <= 2);

        self.sample_rate = sample_rate;
        self.num_input_channels = num_input_channels;
        let fifo_block_size = max_block_size.min(ANALYZER_MAX_BLOCK_SIZE);
        self.left_fifo.prepare(fifo_block_size);
        self.right_fifo.prepare(fifo_block_size);
        self.reset();
    }

    /// Clear the filter memory and redesign coefficients on the next block
    pub fn reset(&mut self) {
        self.left_chain.reset();
        self.right_chain.reset();
        self.bridge.force_rebuild();
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn left_chain(&self) -> &MonoFilterChain {
        &self.left_chain
    }

    pub fn right_chain(&self) -> &MonoFilterChain {
        &self.right_chain
    }

    /// Filter one host block in place and push the result to the analyzer FIFOs
    pub fn process_block<S: ParameterSource + ?Sized>(&mut self, channels: &mut [&mut [f32]], source: &S) {
        // Outputs without a matching input carry garbage from the host
        for channel in channels.iter_mut().skip(self.num_input_channels) {
            channel.fill(0.0);
        }

        if let Some(settings) = self.bridge.poll(source) {
            let coefficients = FilterCoefficientBuilder::design(&settings, self.sample_rate);
            self.left_chain.install(&coefficients, &settings);
            self.right_chain.install(&coefficients, &settings);
        }

        match channels {
            [left, right, ..] => {
                self.left_chain.process(&mut left[..]);
                self.right_chain.process(&mut right[..]);
                self.left_fifo.push(&left[..]);
                self.right_fifo.push(&right[..]);
            }
            [mono] => {
                self.left_chain.process(&mut mono[..]);
                // Both traces follow the single channel
                self.left_fifo.push(&mono[..]);
                self.right_fifo.push(&mono[..]);
            }
            [] => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::chain_settings::ChainSettings;
    use crate::audio::filter_chain::ChainPosition;

    #[test]
    fn installs_new_settings_on_both_channels() {
        let (mut processor, _feeds) = StereoProcessor::new();
        processor.prepare(48000.0, 64, 2);

        let mut left = [0.0f32; 64];
        let mut right = [0.0f32; 64];
        let settings = ChainSettings {
            peak_gain_db: 6.0,
            high_cut_bypassed: true,
            ..ChainSettings::default()
        };
        processor.process_block(&mut [&mut left[..], &mut right[..]], &settings);

        for chain in [processor.left_chain(), processor.right_chain()] {
            assert!(chain.is_bypassed(ChainPosition::HighCut));
            assert!(!chain.is_bypassed(ChainPosition::Peak));
        }
        assert_eq!(
            processor.left_chain().peak().coefficients(),
            processor.right_chain().peak().coefficients()
        );
    }

    #[test]
    fn unmatched_outputs_are_cleared() {
        let (mut processor, _feeds) = StereoProcessor::new();
        processor.prepare(48000.0, 32, 1);

        let mut first = [0.25f32; 32];
        let mut second = [0.5f32; 32];
        processor.process_block(&mut [&mut first[..], &mut second[..]], &ChainSettings::all_bypassed());

        assert!(first.iter().all(|&s| s == 0.25));
        assert!(second.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn mono_layout_feeds_both_fifos() {
        let (mut processor, feeds) = StereoProcessor::new();
        processor.prepare(48000.0, 16, 1);

        let mut mono = [0.5f32; 16];
        processor.process_block(&mut [&mut mono[..]], &ChainSettings::all_bypassed());

        assert_eq!(feeds.left.num_complete_blocks_available(), 1);
        assert_eq!(feeds.right.num_complete_blocks_available(), 1);
        assert!(feeds.right.pull_with(|block| assert_eq!(block, &[0.5f32; 16][..])));
    }

    #[test]
    fn large_host_buffers_still_fill_blocks_quickly() {
        let (mut processor, feeds) = StereoProcessor::new();
        processor.prepare(48000.0, 8192, 2);

        // The host announced 8192 but calls back with 64 samples at a time
        let mut left = [0.1f32; 64];
        let mut right = [0.1f32; 64];
        for _ in 0..ANALYZER_MAX_BLOCK_SIZE / 64 {
            processor.process_block(&mut [&mut left[..], &mut right[..]], &ChainSettings::all_bypassed());
        }
        assert_eq!(feeds.left.num_complete_blocks_available(), 1);
        assert!(feeds.left.pull_with(|block| assert_eq!(block.len(), ANALYZER_MAX_BLOCK_SIZE)));

        // A full sized callback is split into several blocks
        let mut left = vec![0.0f32; 8192];
        let mut right = vec![0.0f32; 8192];
        processor.process_block(&mut [&mut left[..], &mut right[..]], &ChainSettings::all_bypassed());
        assert_eq!(feeds.right.num_complete_blocks_available(), 1 + 8192 / ANALYZER_MAX_BLOCK_SIZE);
    }

    #[test]
    fn fifos_receive_processed_audio() {
        let (mut processor, feeds) = StereoProcessor::new();
        processor.prepare(48000.0, 8, 2);

        let mut left = [1.0f32; 8];
        let mut right = [0.0f32; 8];
        let settings = ChainSettings {
            peak_gain_db: 12.0,
            low_cut_bypassed: true,
            high_cut_bypassed: true,
            ..ChainSettings::default()
        };
        processor.process_block(&mut [&mut left[..], &mut right[..]], &settings);

        assert!(feeds.left.pull_with(|block| assert_eq!(block, &left[..])));
        assert!(feeds.right.pull_with(|block| assert!(block.iter().all(|&s| s == 0.0))));
    }
}
