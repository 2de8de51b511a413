use eframe::egui::{Color32, Stroke};
use egui_plot::{HLine, Line, LineStyle, PlotPoints, PlotUi, Polygon, VLine};

use crate::{config::OverlayTheme, domain::Candle, ui::UI_CONFIG};

/// Context passed to every layer during rendering.
/// This prevents argument explosion.
pub struct LayerContext<'a> {
    /// Revealed candles only; hidden replay bars are never handed to a layer.
    pub candles: &'a [Candle],
    /// Bar interval in seconds, the plot's x unit.
    pub bar_seconds: f64,
    pub last_price: Option<f64>,
    /// Time of the last revealed bar while practising.
    pub cut_time: Option<i64>,
    pub theme: &'a OverlayTheme,
}

/// A standardized layer in the plot stack.
pub trait PlotLayer {
    fn render(&self, ui: &mut PlotUi, ctx: &LayerContext);
}

// ============================================================================
// 1. CANDLES
// ============================================================================
pub struct CandlestickLayer;

impl PlotLayer for CandlestickLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        // Only what the camera can see, plus one bar either side
        let bounds = plot_ui.plot_bounds();
        let view_min = *bounds.range_x().start() - ctx.bar_seconds;
        let view_max = *bounds.range_x().end() + ctx.bar_seconds;
        let start = ctx.candles.partition_point(|c| (c.time as f64) < view_min);
        let end = ctx.candles.partition_point(|c| (c.time as f64) <= view_max);

        let half_w = ctx.bar_seconds * UI_CONFIG.chart.candle_width_pct / 2.0;
        for candle in &ctx.candles[start..end.max(start)] {
            let color = if candle.close >= candle.open {
                ctx.theme.candle_up
            } else {
                ctx.theme.candle_down
            };
            let x = candle.time as f64;
            draw_wick_line(plot_ui, x, candle.high, candle.low, color);

            let (body_bot, body_top) = candle.body_range();
            // Doji check
            let body_top = if (body_top - body_bot).abs() < f64::EPSILON {
                body_bot * 1.0001
            } else {
                body_top
            };
            draw_body_rect(plot_ui, x, half_w, body_top, body_bot, color);
        }
    }
}

#[inline]
fn draw_wick_line(ui: &mut PlotUi, x: f64, top: f64, bottom: f64, color: Color32) {
    ui.line(
        Line::new("", PlotPoints::new(vec![[x, bottom], [x, top]]))
            .color(color)
            .width(UI_CONFIG.chart.candle_wick_width),
    );
}

#[inline]
fn draw_body_rect(ui: &mut PlotUi, x: f64, half_w: f64, top: f64, bottom: f64, color: Color32) {
    let pts = vec![
        [x - half_w, bottom],
        [x + half_w, bottom],
        [x + half_w, top],
        [x - half_w, top],
    ];
    ui.polygon(
        Polygon::new("", PlotPoints::new(pts))
            .fill_color(color)
            .stroke(Stroke::NONE),
    );
}

// ============================================================================
// 2. LAST PRICE
// ============================================================================
pub struct PriceLineLayer;

impl PlotLayer for PriceLineLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        let Some(price) = ctx.last_price else {
            return;
        };
        let up = ctx
            .candles
            .last()
            .is_none_or(|c| c.close >= c.open);
        let color = if up {
            ctx.theme.candle_up
        } else {
            ctx.theme.candle_down
        };
        plot_ui.hline(
            HLine::new("", price)
                .color(color.linear_multiply(0.6))
                .style(LineStyle::Dashed { length: 4.0 })
                .width(1.0),
        );
    }
}

// ============================================================================
// 3. REPLAY CUT
// ============================================================================
pub struct ReplayCutLayer;

impl PlotLayer for ReplayCutLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        let Some(cut) = ctx.cut_time else {
            return;
        };
        let x = cut as f64 + ctx.bar_seconds / 2.0;
        plot_ui.vline(
            VLine::new("", x)
                .color(ctx.theme.pending.linear_multiply(0.7))
                .style(LineStyle::Dashed { length: 8.0 })
                .width(1.5),
        );
    }
}
