use crossbeam_queue::ArrayQueue;
use nih_plug::{nih_log, util};
use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::audio::constants::{self, FFT_FRAME_FIFO_CAPACITY};

/// Analyzer FFT sizes, the discriminant is the power of two
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftOrder {
    Order2048 = 11,
    Order4096 = 12,
    Order8192 = 13,
}

impl Default for FftOrder {
    fn default() -> Self {
        Self::Order2048
    }
}

impl FftOrder {
    pub fn fft_size(self) -> usize {
        1 << (self as usize)
    }

    /// Number of bins in a frame (N/2, the Nyquist bin is dropped)
    pub fn num_bins(self) -> usize {
        self.fft_size() / 2
    }
}

/// One analyzer frame: `N/2` bin levels in dB, floored at the analyzer's negative infinity
pub type FftFrame = Vec<f32>;

/// Turns mono sample blocks into dB spectrum frames (editor thread only).
///
/// Keeps a sliding window of the last `N` samples. Every block shifts the window and produces one
/// frame, so the frame rate follows the block rate of the sample FIFO.
pub struct FftAnalyzer {
    order: FftOrder,
    planner: RealFftPlanner<f32>,
    fft: Arc<dyn RealToComplex<f32>>,

    /// Blackman-Harris, scaled to unity coherent gain
    window: Vec<f32>,
    /// Most recent `N` samples, oldest first
    sliding_buffer: Vec<f32>,
    /// Windowed copy handed to the FFT (realfft uses its input as scratch)
    time_domain_buffer: Vec<f32>,
    frequency_domain_buffer: Vec<Complex32>,
    fft_scratch: Vec<Complex32>,

    frames: ArrayQueue<FftFrame>,
    negative_infinity_db: f32,
}

impl FftAnalyzer {
    pub fn new(order: FftOrder) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(order.fft_size());

        let mut analyzer = Self {
            order,
            fft_scratch: fft.make_scratch_vec(),
            frequency_domain_buffer: fft.make_output_vec(),
            planner,
            fft,
            window: Vec::new(),
            sliding_buffer: Vec::new(),
            time_domain_buffer: Vec::new(),
            frames: ArrayQueue::new(FFT_FRAME_FIFO_CAPACITY),
            negative_infinity_db: constants::ANALYZER_NEGATIVE_INFINITY_DB,
        };
        analyzer.allocate_buffers();

        analyzer
    }

    /// Switch to another FFT size. Drops the sliding window and any queued frames.
    pub fn change_order(&mut self, order: FftOrder) {
        if order == self.order {
            return;
        }

        nih_log!("Changing analyzer FFT size to {}", order.fft_size());
        self.order = order;
        self.fft = self.planner.plan_fft_forward(order.fft_size());
        self.fft_scratch = self.fft.make_scratch_vec();
        self.frequency_domain_buffer = self.fft.make_output_vec();
        self.frames = ArrayQueue::new(FFT_FRAME_FIFO_CAPACITY);
        self.allocate_buffers();
    }

    fn allocate_buffers(&mut self) {
        let size = self.order.fft_size();

        let window: Vec<f32> = apodize::cosine_iter(0.35875, 0.48829, 0.14128, 0.01168, size)
            .map(|w| w as f32)
            .collect();
        let window_sum: f32 = window.iter().sum();
        let normalization = if window_sum > 0.0 { size as f32 / window_sum } else { 1.0 };
        self.window = window.into_iter().map(|w| w * normalization).collect();

        self.sliding_buffer = vec![0.0; size];
        self.time_domain_buffer = vec![0.0; size];
    }

    pub fn order(&self) -> FftOrder {
        self.order
    }

    pub fn fft_size(&self) -> usize {
        self.order.fft_size()
    }

    /// Frequency spacing between two bins
    pub fn bin_width(&self, sample_rate: f32) -> f32 {
        sample_rate / self.fft_size() as f32
    }

    pub fn negative_infinity_db(&self) -> f32 {
        self.negative_infinity_db
    }

    /// Slide `block` into the window and queue one new frame
    pub fn process_block(&mut self, block: &[f32]) {
        self.push_samples(block);
        self.produce_frame();
    }

    fn push_samples(&mut self, block: &[f32]) {
        let size = self.sliding_buffer.len();
        let block = if block.len() > size { &block[block.len() - size..] } else { block };
        let count = block.len();

        self.sliding_buffer.copy_within(count.., 0);
        self.sliding_buffer[size - count..].copy_from_slice(block);
    }

    fn produce_frame(&mut self) {
        for ((windowed, &sample), &w) in self
            .time_domain_buffer
            .iter_mut()
            .zip(self.sliding_buffer.iter())
            .zip(self.window.iter())
        {
            *windowed = sample * w;
        }

        // A failed transform only costs one frame
        if self
            .fft
            .process_with_scratch(
                &mut self.time_domain_buffer,
                &mut self.frequency_domain_buffer,
                &mut self.fft_scratch,
            )
            .is_err()
        {
            return;
        }

        let num_bins = self.order.num_bins();
        let scale = 1.0 / num_bins as f32;
        let frame: FftFrame = self.frequency_domain_buffer[..num_bins]
            .iter()
            .map(|bin| util::gain_to_db(bin.norm() * scale).max(self.negative_infinity_db))
            .collect();

        self.frames.force_push(frame);
    }

    pub fn num_available_frames(&self) -> usize {
        self.frames.len()
    }

    /// Oldest queued frame
    pub fn pull_frame(&self) -> Option<FftFrame> {
        self.frames.pop()
    }
}
