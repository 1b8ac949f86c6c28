#![allow(dead_code)]

use dasp::signal::{self, Signal};
use simple_eq::audio::parameter_bridge::ParameterSource;
use simple_eq::audio::stereo_processor::StereoProcessor;

/// Unit amplitude sinusoid
pub fn sine(freq: f64, sample_rate: f64, len: usize) -> Vec<f32> {
    signal::rate(sample_rate)
        .const_hz(freq)
        .sine()
        .take(len)
        .map(|sample| sample as f32)
        .collect()
}

/// Uniform white noise scaled to the given RMS
pub fn white_noise(rms_level: f64, seed: u64, len: usize) -> Vec<f32> {
    // Uniform in [-1, 1) has an RMS of 1/sqrt(3)
    let scale = rms_level * 3.0f64.sqrt();
    signal::noise(seed)
        .take(len)
        .map(|sample| (sample * scale) as f32)
        .collect()
}

pub fn rms(samples: &[f32]) -> f64 {
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}

pub fn gain_db(value: f64) -> f64 {
    20.0 * value.log10()
}

/// Run both channels through the processor in host sized blocks
pub fn run_stereo<S: ParameterSource + ?Sized>(
    processor: &mut StereoProcessor,
    source: &S,
    left: &[f32],
    right: &[f32],
    block_size: usize,
) -> (Vec<f32>, Vec<f32>) {
    let mut left_out = left.to_vec();
    let mut right_out = right.to_vec();

    let mut start = 0;
    while start < left_out.len() {
        let end = (start + block_size).min(left_out.len());
        let left_block = &mut left_out[start..end];
        let right_block = &mut right_out[start..end];
        processor.process_block(&mut [left_block, right_block], source);
        start = end;
    }

    (left_out, right_out)
}

/// A prepared stereo processor
pub fn processor(sample_rate: f32, block_size: usize) -> StereoProcessor {
    let (mut processor, _feeds) = StereoProcessor::new();
    processor.prepare(sample_rate, block_size, 2);
    processor
}
