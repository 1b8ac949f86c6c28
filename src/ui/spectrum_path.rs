use crate::audio::constants::{self, PATH_RESOLUTION};
use nih_plug_egui::egui::{pos2, Pos2, Vec2};
use triple_buffer::TripleBuffer;

/// Polyline in the local coordinates of the analysis area
pub type SpectrumPath = Vec<Pos2>;

/// Reading side of a [`SpectrumPathBuilder`], always sees the newest complete path
pub struct SpectrumPathOutput {
    output: triple_buffer::Output<SpectrumPath>,
}

impl SpectrumPathOutput {
    pub fn read(&mut self) -> &SpectrumPath {
        self.output.read()
    }

    /// Whether a path was published since the last read
    pub fn updated(&self) -> bool {
        self.output.updated()
    }
}

/// Turns FFT frames into log-frequency polylines
pub struct SpectrumPathBuilder {
    input: triple_buffer::Input<SpectrumPath>,
}

impl SpectrumPathBuilder {
    /// Returns (builder, newest path output)
    pub fn new() -> (Self, SpectrumPathOutput) {
        let (input, output) = TripleBuffer::new(&SpectrumPath::new()).split();

        (Self { input }, SpectrumPathOutput { output })
    }

    /// Build and publish the path for one frame.
    ///
    /// `bounds` is the size of the analysis area. Bin 0 starts the path at x = 0, after that every
    /// second bin becomes a vertex. Levels from `negative_infinity_db` to 0 dB span the full
    /// height, non-finite levels are left out.
    pub fn generate_path(
        &mut self,
        frame: &[f32],
        bounds: Vec2,
        fft_size: usize,
        bin_width: f32,
        negative_infinity_db: f32,
    ) {
        self.input
            .write(build_path(frame, bounds, fft_size, bin_width, negative_infinity_db));
    }
}

pub fn build_path(
    frame: &[f32],
    bounds: Vec2,
    fft_size: usize,
    bin_width: f32,
    negative_infinity_db: f32,
) -> SpectrumPath {
    let width = bounds.x.max(0.0);
    let height = bounds.y.max(0.0);
    let num_bins = (fft_size / 2).min(frame.len());

    let map_y = |db: f32| constants::map_range(db, negative_infinity_db, 0.0, height, 0.0);

    let mut path = SpectrumPath::with_capacity(3 * width as usize);
    if num_bins == 0 {
        return path;
    }

    let y = map_y(frame[0]);
    if y.is_finite() {
        path.push(pos2(0.0, y));
    }

    for bin in (1..num_bins).step_by(PATH_RESOLUTION) {
        let y = map_y(frame[bin]);
        if !y.is_finite() {
            continue;
        }

        let bin_freq = bin as f32 * bin_width;
        let x = (constants::freq_to_log_position(bin_freq) * width).floor();
        path.push(pos2(x.clamp(0.0, width), y));
    }

    path
}
