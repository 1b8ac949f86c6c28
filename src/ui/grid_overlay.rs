use crate::audio::constants;
use nih_plug_egui::egui::{pos2, Align2, Pos2, Rect};

/// Grid line data for the analyzer display
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub start: Pos2,
    pub end: Pos2,
    /// The 0 dB line is drawn in its own color
    pub emphasized: bool,
}

/// One text label around the grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridLabel {
    pub position: Pos2,
    pub anchor: Align2,
    pub text: String,
}

/// Everything static in the analyzer display. Only depends on the layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridGeometry {
    pub lines: Vec<GridLine>,
    pub labels: Vec<GridLabel>,
}

/// Map a response gain in dB to a y coordinate inside `area`
pub fn response_db_to_y(db: f32, area: Rect) -> f32 {
    constants::map_range(
        db,
        constants::RESPONSE_MIN_DB,
        constants::RESPONSE_MAX_DB,
        area.bottom(),
        area.top(),
    )
}

/// Map a frequency to an x coordinate inside `area`
pub fn frequency_to_x(freq: f32, area: Rect) -> f32 {
    area.left() + constants::freq_to_log_position(freq) * area.width()
}

/// Generate horizontal grid lines for dB levels
pub fn generate_db_grid_lines(analysis_area: Rect) -> Vec<GridLine> {
    constants::DB_MARKERS
        .iter()
        .map(|&(db, _)| {
            let y = response_db_to_y(db, analysis_area);
            GridLine {
                start: pos2(analysis_area.left(), y),
                end: pos2(analysis_area.right(), y),
                emphasized: db == 0.0,
            }
        })
        .collect()
}

/// Generate vertical grid lines at the frequency markers
pub fn generate_frequency_grid_lines(analysis_area: Rect) -> Vec<GridLine> {
    constants::FREQUENCY_MARKERS
        .iter()
        .map(|&(freq, _)| {
            let x = frequency_to_x(freq, analysis_area);
            GridLine {
                start: pos2(x, analysis_area.top()),
                end: pos2(x, analysis_area.bottom()),
                emphasized: false,
            }
        })
        .collect()
}

/// Labels: frequencies above the grid, response gain on the right and analyzer level on the left.
/// The analyzer scale is the response scale shifted down by its top value, so 0 dB sits on the
/// top line.
pub fn generate_labels(render_area: Rect, analysis_area: Rect) -> Vec<GridLabel> {
    let mut labels = Vec::with_capacity(constants::FREQUENCY_MARKERS.len() + 2 * constants::DB_MARKERS.len());

    for &(freq, text) in constants::FREQUENCY_MARKERS {
        labels.push(GridLabel {
            position: pos2(frequency_to_x(freq, analysis_area), render_area.top() - 1.0),
            anchor: Align2::CENTER_BOTTOM,
            text: text.to_owned(),
        });
    }

    for &(db, text) in constants::DB_MARKERS {
        let y = response_db_to_y(db, analysis_area);
        labels.push(GridLabel {
            position: pos2(render_area.right() + 1.0, y),
            anchor: Align2::LEFT_CENTER,
            text: text.to_owned(),
        });
        labels.push(GridLabel {
            position: pos2(render_area.left() - 1.0, y),
            anchor: Align2::RIGHT_CENTER,
            text: format!("{}", db - constants::RESPONSE_MAX_DB),
        });
    }

    labels
}

pub fn generate_grid(render_area: Rect, analysis_area: Rect) -> GridGeometry {
    let mut lines = generate_frequency_grid_lines(analysis_area);
    lines.extend(generate_db_grid_lines(analysis_area));

    GridGeometry {
        lines,
        labels: generate_labels(render_area, analysis_area),
    }
}

/// Keeps the grid until the layout changes
#[derive(Debug, Default)]
pub struct GridCache {
    layout: Option<(Rect, Rect)>,
    geometry: GridGeometry,
    generation: u64,
}

impl GridCache {
    pub fn get(&mut self, render_area: Rect, analysis_area: Rect) -> &GridGeometry {
        if self.layout != Some((render_area, analysis_area)) {
            self.geometry = generate_grid(render_area, analysis_area);
            self.layout = Some((render_area, analysis_area));
            self.generation += 1;
        }

        &self.geometry
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Number of times the grid was rebuilt
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
