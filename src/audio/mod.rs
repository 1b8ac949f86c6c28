pub mod chain_settings;
pub mod coefficients;
pub mod constants;
pub mod fft_analyzer;
pub mod filter_chain;
pub mod parameter_bridge;
pub mod sample_fifo;
pub mod stereo_processor;
