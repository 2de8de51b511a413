use eframe::egui::{CursorIcon, Ui};
use egui_plot::{AxisHints, Plot};

use crate::{
    config::OverlayTheme,
    domain::Candle,
    engine::ChartSession,
    overlay::{CoordinateMapper, LinearMapper, OverlayView},
    ui::{CandlestickLayer, LayerContext, PlotLayer, PriceLineLayer, ReplayCutLayer, UI_CONFIG},
    utils::epoch_sec_to_string,
};

/// Candle plot plus the annotation overlay painted on top of it.
#[derive(Default)]
pub struct ChartView {
    overlay: OverlayView,
    /// Plot-to-screen mapping from the previous frame. Pointer-down is
    /// resolved against it before the plot runs, so a drag on a drawing can
    /// switch plot panning off in the same frame.
    last_mapper: Option<LinearMapper>,
    fit_pending: bool,
}

/// Helper to build the Time Axis
fn create_time_axis() -> AxisHints<'static> {
    AxisHints::new_x()
        .label("Time")
        .formatter(|mark, _range| epoch_sec_to_string(mark.value as i64))
}

/// X and Y ranges showing the newest `fit_bars` revealed candles.
fn fit_bounds(candles: &[Candle], bar_seconds: f64) -> Option<((f64, f64), (f64, f64))> {
    let last = candles.last()?;
    let window = &candles[candles.len().saturating_sub(UI_CONFIG.chart.fit_bars)..];
    let first = window.first()?;

    let x_min = first.time as f64 - bar_seconds;
    let x_max = last.time as f64 + bar_seconds * UI_CONFIG.chart.fit_right_margin_bars as f64;

    let lo = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let hi = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let pad = ((hi - lo) * UI_CONFIG.chart.y_padding_pct).max(hi.abs() * 0.001);
    Some(((x_min, x_max), (lo - pad, hi + pad)))
}

impl ChartView {
    /// Snap the view to the newest bars on the next frame.
    pub fn request_fit(&mut self) {
        self.fit_pending = true;
    }

    /// Forget the cached overlay and mapping, e.g. after a series switch.
    pub fn reset(&mut self) {
        self.overlay.clear();
        self.last_mapper = None;
        self.fit_pending = true;
    }

    /// Draw the chart and route pointer input into `session`. Returns an
    /// error message if a click was rejected.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        session: &mut ChartSession,
        candles: &[Candle],
        bar_seconds: f64,
        theme: &OverlayTheme,
    ) -> Option<String> {
        let visible = session.visible_candles(candles);

        // 1. Pointer-down against last frame's mapping
        let (pressed, released, pointer) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });
        if pressed
            && let (Some(mapper), Some(pos)) = (self.last_mapper, pointer)
            && mapper.viewport().contains(pos)
        {
            session.pointer_down(pos, &mapper);
        }
        let dragging = session.is_dragging();

        // 2. Candles
        let fit = if std::mem::take(&mut self.fit_pending) {
            fit_bounds(visible, bar_seconds)
        } else {
            None
        };
        let layer_ctx = LayerContext {
            candles: visible,
            bar_seconds,
            last_price: session.replay().last_price(candles),
            cut_time: session.replay().cut_time(),
            theme,
        };
        let plot = Plot::new("replay_chart")
            .custom_x_axes(vec![create_time_axis()])
            .show_x(false)
            .show_y(false)
            .allow_double_click_reset(false)
            .allow_drag(!dragging)
            .allow_zoom(!dragging)
            .allow_scroll(!dragging)
            .show(ui, |plot_ui| {
                if let Some(((x_min, x_max), (y_min, y_max))) = fit {
                    plot_ui.set_plot_bounds_x(x_min..=x_max);
                    plot_ui.set_plot_bounds_y(y_min..=y_max);
                }
                let layers: [&dyn PlotLayer; 3] =
                    [&CandlestickLayer, &PriceLineLayer, &ReplayCutLayer];
                for layer in layers {
                    layer.render(plot_ui, &layer_ctx);
                }
            });

        let mut mapper = LinearMapper::from_plot(&plot.transform);
        if let (Some(first), Some(last)) = (visible.first(), visible.last()) {
            mapper = mapper.with_time_limits(first.time, last.time);
        }
        let response = plot.response;

        // 3. Pointer routing
        let mut error = None;
        if session.is_dragging() {
            if let Some(pos) = pointer {
                session.pointer_move(pos, &mapper);
            }
            if released {
                session.pointer_up();
            }
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        } else {
            session.hover(response.hover_pos(), &mapper);
            if response.clicked()
                && let Some(pos) = response.interact_pointer_pos()
                && let Err(e) = session.click(pos, &mapper, candles)
            {
                log::warn!("Order rejected: {:#}", e);
                error = Some(format!("{:#}", e));
            }
            if response.hovered() {
                if session.active_tool().is_some() || session.scissors_armed() {
                    ui.ctx().set_cursor_icon(CursorIcon::Crosshair);
                } else if session.hovered().is_some() {
                    ui.ctx().set_cursor_icon(CursorIcon::Grab);
                }
            }
        }

        // 4. Overlay
        let painter = ui.painter_at(mapper.viewport());
        session
            .render_frame(&mut self.overlay, &mapper, theme, candles)
            .paint(&painter, theme);

        self.last_mapper = Some(mapper);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_bounds_covers_window() {
        let candles: Vec<Candle> = (0..200)
            .map(|i| Candle::new(i * 60, 100.0, 110.0, 90.0, 105.0, 1.0))
            .collect();
        let ((x_min, x_max), (y_min, y_max)) = match fit_bounds(&candles, 60.0) {
            Some(b) => b,
            None => panic!("expected bounds"),
        };
        assert_eq!(x_min, 50.0 * 60.0 - 60.0);
        assert_eq!(x_max, 199.0 * 60.0 + 600.0);
        assert!(y_min < 90.0 && y_max > 110.0);
        assert!(fit_bounds(&[], 60.0).is_none());
    }
}
