//! Audio processing constants and helper functions
//! Colors and layout live in `ui::style`

/// Frequency range constants (parameter range and display range are the same)
pub const MIN_FREQUENCY: f32 = 20.0;
pub const MAX_FREQUENCY: f32 = 20000.0;

/// Cut and peak frequencies are kept below this fraction of the sample rate
pub const NYQUIST_GUARD: f32 = 0.49;

/// Peak band ranges
pub const PEAK_GAIN_MIN_DB: f32 = -24.0;
pub const PEAK_GAIN_MAX_DB: f32 = 24.0;
pub const PEAK_Q_MIN: f32 = 0.1;
pub const PEAK_Q_MAX: f32 = 10.0;

/// Parameter defaults
pub const DEFAULT_LOW_CUT_FREQ: f32 = 20.0;
pub const DEFAULT_HIGH_CUT_FREQ: f32 = 20000.0;
pub const DEFAULT_PEAK_FREQ: f32 = 750.0;
pub const DEFAULT_PEAK_GAIN_DB: f32 = 0.0;
pub const DEFAULT_PEAK_Q: f32 = 1.0;

/// dB range of the response curve (maps to the full height of the render area)
pub const RESPONSE_MIN_DB: f32 = -24.0;
pub const RESPONSE_MAX_DB: f32 = 24.0;

/// Floor used when converting FFT bins to decibels
pub const ANALYZER_NEGATIVE_INFINITY_DB: f32 = -48.0;

/// Upper bound on the FIFO block size, whatever maximum buffer size the host announces
pub const ANALYZER_MAX_BLOCK_SIZE: usize = 512;

/// Number of mono blocks each channel FIFO holds before dropping the oldest
pub const SAMPLE_FIFO_CAPACITY: usize = 32;

/// Number of FFT frames queued between the analyzer and the path builder
pub const FFT_FRAME_FIFO_CAPACITY: usize = 32;

/// Every n-th FFT bin becomes a vertex of the spectrum path
pub const PATH_RESOLUTION: usize = 2;

/// Analyzer refresh rate
pub const GUI_TICK_HZ: f32 = 60.0;

// === HELPER FUNCTIONS ===

/// Convert frequency to logarithmic position (0.0 to 1.0), unclamped
pub fn freq_to_log_position(freq: f32) -> f32 {
    libm::log10f(freq / MIN_FREQUENCY) / libm::log10f(MAX_FREQUENCY / MIN_FREQUENCY)
}

/// Convert a logarithmic position (0.0 to 1.0) back to a frequency
pub fn log_position_to_freq(position: f32) -> f32 {
    MIN_FREQUENCY * libm::powf(MAX_FREQUENCY / MIN_FREQUENCY, position)
}

/// Linear remap of `value` from `[source_min, source_max]` to `[target_min, target_max]`
pub fn map_range(value: f32, source_min: f32, source_max: f32, target_min: f32, target_max: f32) -> f32 {
    target_min + (value - source_min) / (source_max - source_min) * (target_max - target_min)
}

/// Frequency grid lines (also the label positions)
pub const FREQUENCY_MARKERS: &[(f32, &str)] = &[
    (20.0, "20"),
    (50.0, "50"),
    (100.0, "100"),
    (200.0, "200"),
    (500.0, "500"),
    (1000.0, "1K"),
    (2000.0, "2K"),
    (5000.0, "5K"),
    (10000.0, "10K"),
    (20000.0, "20K"),
];

/// Gain grid lines for the response curve
pub const DB_MARKERS: &[(f32, &str)] = &[
    (-24.0, "-24"),
    (-12.0, "-12"),
    (0.0, "0"),
    (12.0, "+12"),
    (24.0, "+24"),
];
