pub mod analyzer_view;
pub mod grid_overlay;
pub mod response_curve;
pub mod spectrum_path;
pub mod style;

pub use analyzer_view::AnalyzerView;
pub use style::UITheme;
