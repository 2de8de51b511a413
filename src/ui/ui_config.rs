use eframe::egui::{Color32, Frame, Margin, Stroke};

pub use crate::ui::ui_text::UI_TEXT;

/// UI Colors for consistent theming
#[derive(Clone, Copy, Default)]
pub struct UiColors {
    pub label: Color32,
    pub heading: Color32,
    pub subsection_heading: Color32,
    pub central_panel: Color32,
    pub side_panel: Color32,
    pub profit: Color32,
    pub loss: Color32,
    pub pending: Color32,
    pub subdued: Color32,
}

/// Candle plot settings
#[derive(Clone, Copy, Default)]
pub struct ChartConfig {
    /// Candle body width as a share of the bar interval
    pub candle_width_pct: f64,
    pub candle_wick_width: f32,
    /// Bars shown when the view is fitted to the data
    pub fit_bars: usize,
    /// Empty bars left to the right of the last candle when fitting
    pub fit_right_margin_bars: usize,
    pub y_padding_pct: f64,
}

/// Main UI configuration struct that holds all UI-related settings
#[derive(Default, Clone, Copy)]
pub struct UiConfig {
    pub colors: UiColors,
    pub chart: ChartConfig,
}

/// Global UI configuration instance
pub static UI_CONFIG: UiConfig = UiConfig {
    colors: UiColors {
        label: Color32::GRAY,
        heading: Color32::from_rgb(0xf7, 0xc9, 0x48),
        subsection_heading: Color32::from_rgb(0xff, 0x98, 0x00),
        central_panel: Color32::from_rgb(0x13, 0x17, 0x22),
        side_panel: Color32::from_rgb(0x1e, 0x22, 0x2d),
        profit: Color32::from_rgb(0x26, 0xa6, 0x9a),
        loss: Color32::from_rgb(0xef, 0x53, 0x50),
        pending: Color32::from_rgb(0xf7, 0xc9, 0x48),
        subdued: Color32::from_gray(0x78),
    },
    chart: ChartConfig {
        candle_width_pct: 0.7,
        candle_wick_width: 1.0,
        fit_bars: 150,
        fit_right_margin_bars: 10,
        y_padding_pct: 0.05,
    },
};

impl UiConfig {
    /// Frame for Left/Right panels (Standard padding)
    pub fn side_panel_frame(&self, dark: bool) -> Frame {
        Frame {
            fill: if dark {
                self.colors.side_panel
            } else {
                Color32::from_gray(0xf0)
            },
            stroke: Stroke::NONE,
            inner_margin: Margin::same(8),
            ..Default::default()
        }
    }

    /// Frame for the top toolbars
    pub fn top_panel_frame(&self, dark: bool) -> Frame {
        self.side_panel_frame(dark)
    }

    /// Frame for Bottom Status bar (Tighter vertical padding)
    pub fn bottom_panel_frame(&self, dark: bool) -> Frame {
        Frame {
            inner_margin: Margin::symmetric(8, 4),
            ..self.side_panel_frame(dark)
        }
    }

    // Frame for the Plot area
    pub fn central_panel_frame(&self, dark: bool) -> Frame {
        Frame {
            fill: if dark {
                self.colors.central_panel
            } else {
                Color32::WHITE
            },
            stroke: Stroke::NONE,
            inner_margin: Margin {
                left: 0,
                right: 8,
                top: 0,
                bottom: 0,
            },
            ..Default::default()
        }
    }
}
