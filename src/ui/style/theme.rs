use nih_plug_egui::egui::Color32;

/// colors and UI dimensions only
/// Audio-related constants are in audio::constants
pub struct UITheme;

impl UITheme {
    // === COLORS ===

    /// Background colors
    pub const BACKGROUND_MAIN: Color32 = Color32::BLACK;
    pub const BACKGROUND_CONTROLS: Color32 = Color32::from_rgb(0x14, 0x14, 0x1F);

    /// Grid and border colors
    pub const GRID_LINE: Color32 = Color32::from_rgb(0x69, 0x69, 0x69); // Dim grey
    pub const GRID_ZERO_DB: Color32 = Color32::from_rgb(0, 172, 1); // Green 0 dB line
    pub const RENDER_BORDER: Color32 = Color32::from_rgb(0xFF, 0xA5, 0x00); // Orange frame

    /// Curve colors
    pub const RESPONSE_CURVE: Color32 = Color32::WHITE;
    pub const SPECTRUM_LEFT: Color32 = Color32::from_rgb(135, 206, 235); // Sky blue
    pub const SPECTRUM_RIGHT: Color32 = Color32::from_rgb(0, 0, 255);

    /// Text and label colors
    pub const TEXT_LABEL: Color32 = Color32::from_rgb(0xD3, 0xD3, 0xD3);

    // === DIMENSIONS ===

    /// Editor window size
    pub const EDITOR_WIDTH: u32 = 600;
    pub const EDITOR_HEIGHT: u32 = 480;

    /// Share of the window height used by the analyzer
    pub const ANALYZER_HEIGHT_RATIO: f32 = 0.5;

    /// Render area margins inside the analyzer bounds (room for the labels)
    pub const RENDER_MARGIN_TOP: f32 = 12.0;
    pub const RENDER_MARGIN_BOTTOM: f32 = 2.0;
    pub const RENDER_MARGIN_SIDE: f32 = 20.0;

    /// Analysis area inset inside the render area (top and bottom)
    pub const ANALYSIS_INSET: f32 = 4.0;

    /// Strokes
    pub const GRID_LINE_WIDTH: f32 = 1.0;
    pub const RESPONSE_LINE_WIDTH: f32 = 2.0;
    pub const SPECTRUM_LINE_WIDTH: f32 = 1.0;
    pub const BORDER_WIDTH: f32 = 1.0;

    pub const LABEL_FONT_SIZE: f32 = 10.0;
}
