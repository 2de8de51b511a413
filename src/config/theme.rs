//! Overlay colours.
//!
//! The renderer never reads colours from global state: the shell owns an
//! [`OverlayTheme`] and passes it into every paint pass, swapping it when the
//! user toggles dark/light mode.

use eframe::egui::Color32;

use crate::models::DrawingKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTheme {
    // --- DRAWINGS ---
    pub horizontal: Color32,
    pub trendline: Color32,
    pub ray: Color32,
    pub rectangle: Color32,
    /// One colour per fib level (0 .. 1)
    pub fib_levels: [Color32; 7],
    pub fib_border: Color32,
    /// Alpha applied to fib band / rectangle fills
    pub fill_alpha: f32,

    // --- POSITIONS ---
    pub long: Color32,
    pub short: Color32,
    pub stop_loss: Color32,
    pub take_profit: Color32,
    pub pending: Color32,
    pub zone_alpha: f32,
    pub closed_entry: Color32,
    pub risk_reward: Color32,

    // --- WIDGETS ---
    pub handle_fill: Color32,
    pub label_text_solid: Color32,
    pub candle_up: Color32,
    pub candle_down: Color32,
}

impl OverlayTheme {
    pub const fn dark() -> Self {
        Self {
            horizontal: Color32::from_rgb(0xf7, 0xc9, 0x48),
            trendline: Color32::from_rgb(0x29, 0x62, 0xff),
            ray: Color32::from_rgb(0xe0, 0x40, 0xfb),
            rectangle: Color32::from_rgb(0x00, 0xbc, 0xd4),
            fib_levels: [
                Color32::from_rgb(0x78, 0x7b, 0x86),
                Color32::from_rgb(0xf4, 0x43, 0x36),
                Color32::from_rgb(0xff, 0x98, 0x00),
                Color32::from_rgb(0xff, 0xeb, 0x3b),
                Color32::from_rgb(0x4c, 0xaf, 0x50),
                Color32::from_rgb(0x21, 0x96, 0xf3),
                Color32::from_rgb(0x78, 0x7b, 0x86),
            ],
            fib_border: Color32::from_rgba_premultiplied(0x20, 0x21, 0x24, 0x44),
            fill_alpha: 0.09,
            long: Color32::from_rgb(0x26, 0xa6, 0x9a),
            short: Color32::from_rgb(0xef, 0x53, 0x50),
            stop_loss: Color32::from_rgb(0xef, 0x53, 0x50),
            take_profit: Color32::from_rgb(0x26, 0xa6, 0x9a),
            pending: Color32::from_rgb(0xf7, 0xc9, 0x48),
            zone_alpha: 0.08,
            closed_entry: Color32::from_gray(0x55),
            risk_reward: Color32::from_gray(0xaa),
            handle_fill: Color32::from_rgb(0x13, 0x17, 0x22),
            label_text_solid: Color32::WHITE,
            candle_up: Color32::from_rgb(0x26, 0xa6, 0x9a),
            candle_down: Color32::from_rgb(0xef, 0x53, 0x50),
        }
    }

    pub const fn light() -> Self {
        let dark = Self::dark();
        Self {
            handle_fill: Color32::WHITE,
            fib_border: Color32::from_rgba_premultiplied(0x40, 0x42, 0x48, 0x44),
            closed_entry: Color32::from_gray(0xb0),
            risk_reward: Color32::from_gray(0x60),
            ..dark
        }
    }

    /// Default stroke colour for a drawing that carries no explicit colour.
    pub fn drawing_color(&self, kind: DrawingKind) -> Color32 {
        match kind {
            DrawingKind::Horizontal => self.horizontal,
            DrawingKind::Trendline => self.trendline,
            DrawingKind::Ray => self.ray,
            DrawingKind::Fib => self.fib_levels[0],
            DrawingKind::Rectangle => self.rectangle,
        }
    }
}

impl Default for OverlayTheme {
    fn default() -> Self {
        Self::dark()
    }
}
