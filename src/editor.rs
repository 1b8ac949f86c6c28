use atomic_float::AtomicF32;
use nih_plug::prelude::*;
use nih_plug_egui::egui::{self, FontId, Painter, Sense, Shape, Stroke, Ui, Vec2};
use nih_plug_egui::{create_egui_editor, widgets};
use std::sync::Arc;
use std::time::Instant;

use crate::audio::parameter_bridge::ChangeFlag;
use crate::audio::stereo_processor::AnalyzerFeeds;
use crate::params::EqParams;
use crate::ui::{AnalyzerView, UITheme};

/// Data needed to create the editor
pub struct EditorInitFlags {
    pub params: Arc<EqParams>,
    pub change_flag: ChangeFlag,
    pub sample_rate: Arc<AtomicF32>,
    pub feeds: AnalyzerFeeds,
}

/// Lives as long as the editor window
pub struct PluginEditor {
    analyzer: AnalyzerView<EqParams>,
}

pub fn create(init_flags: EditorInitFlags) -> Option<Box<dyn Editor>> {
    let EditorInitFlags {
        params,
        change_flag,
        sample_rate,
        feeds,
    } = init_flags;

    let editor = PluginEditor {
        analyzer: AnalyzerView::new(params.clone(), change_flag, sample_rate, feeds),
    };

    create_egui_editor(
        params.editor_state.clone(),
        editor,
        |_, _| {},
        move |egui_ctx, setter, editor| {
            egui::CentralPanel::default().show(egui_ctx, |ui| {
                let analyzer_size = Vec2::new(
                    ui.available_width(),
                    ui.available_height() * UITheme::ANALYZER_HEIGHT_RATIO,
                );
                let (response, painter) = ui.allocate_painter(analyzer_size, Sense::hover());

                editor.analyzer.update(Instant::now(), response.rect);
                draw_analyzer(&painter, &editor.analyzer, response.rect);

                ui.separator();
                draw_controls(ui, setter, &params);
            });

            // The analyzer clock runs off the repaint rate
            egui_ctx.request_repaint();
        },
    )
}

fn draw_analyzer(painter: &Painter, analyzer: &AnalyzerView<EqParams>, bounds: egui::Rect) {
    let frame = analyzer.frame();
    painter.rect_filled(bounds, 0.0, UITheme::BACKGROUND_MAIN);

    let grid = analyzer.grid();
    for line in &grid.lines {
        let color = if line.emphasized {
            UITheme::GRID_ZERO_DB
        } else {
            UITheme::GRID_LINE
        };
        painter.line_segment([line.start, line.end], Stroke::new(UITheme::GRID_LINE_WIDTH, color));
    }
    for label in &grid.labels {
        painter.text(
            label.position,
            label.anchor,
            &label.text,
            FontId::proportional(UITheme::LABEL_FONT_SIZE),
            UITheme::TEXT_LABEL,
        );
    }

    // Curves may leave the render area (deep cuts, loud bins)
    let curves = painter.with_clip_rect(frame.render_area);
    draw_polyline(&curves, &frame.left_spectrum, UITheme::SPECTRUM_LINE_WIDTH, UITheme::SPECTRUM_LEFT);
    draw_polyline(&curves, &frame.right_spectrum, UITheme::SPECTRUM_LINE_WIDTH, UITheme::SPECTRUM_RIGHT);
    draw_polyline(&curves, &frame.response_curve, UITheme::RESPONSE_LINE_WIDTH, UITheme::RESPONSE_CURVE);

    let area = frame.render_area;
    painter.add(Shape::closed_line(
        vec![area.left_top(), area.right_top(), area.right_bottom(), area.left_bottom()],
        Stroke::new(UITheme::BORDER_WIDTH, UITheme::RENDER_BORDER),
    ));
}

fn draw_polyline(painter: &Painter, points: &[egui::Pos2], width: f32, color: egui::Color32) {
    if points.len() < 2 {
        return;
    }

    painter.add(Shape::line(points.to_vec(), Stroke::new(width, color)));
}

/// Three columns like the bands, the analyzer toggle underneath
fn draw_controls(ui: &mut Ui, setter: &ParamSetter, params: &EqParams) {
    ui.columns(3, |columns| {
        param_control(&mut columns[0], setter, &params.low_cut_freq);
        param_control(&mut columns[0], setter, &params.low_cut_slope);
        param_control(&mut columns[0], setter, &params.low_cut_bypassed);

        param_control(&mut columns[1], setter, &params.peak_freq);
        param_control(&mut columns[1], setter, &params.peak_gain);
        param_control(&mut columns[1], setter, &params.peak_quality);
        param_control(&mut columns[1], setter, &params.peak_bypassed);

        param_control(&mut columns[2], setter, &params.high_cut_freq);
        param_control(&mut columns[2], setter, &params.high_cut_slope);
        param_control(&mut columns[2], setter, &params.high_cut_bypassed);
    });

    ui.separator();
    param_control(ui, setter, &params.analyzer_enabled);
}

fn param_control<P: Param>(ui: &mut Ui, setter: &ParamSetter, param: &P) {
    ui.label(param.name());
    ui.add(widgets::ParamSlider::for_param(param, setter));
}
