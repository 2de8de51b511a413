use anyhow::{Context as _, Result};
use eframe::egui::{
    Align, Button, CentralPanel, ComboBox, Context, FontId, Grid, Layout, RichText, ScrollArea,
    SidePanel, Slider, TextEdit, TopBottomPanel, Ui,
};
use strum::IntoEnumIterator;

use crate::{
    App,
    app::{AppState, ShellAction, StatusLine, parse_price},
    config::{REPLAY, Timeframe},
    data::{CandleSeries, close_change_pct},
    domain::{Candle, SeriesKey},
    engine::ToolKind,
    models::{PositionId, PositionSide},
    ui::{DirectionColor, UI_CONFIG, UI_TEXT, UiStyleExt, get_outcome_color},
    utils::{epoch_sec_to_date, epoch_sec_to_string},
};

fn fmt_level(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

impl App {
    pub(crate) fn render_top_panel(&mut self, ctx: &Context) {
        let frame = UI_CONFIG.top_panel_frame(self.dark_theme);

        TopBottomPanel::top("top_toolbar")
            .frame(frame)
            .min_height(30.0)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let current = self.series_key.clone();

                    // 1. SYMBOL
                    let mut symbol = current.symbol.clone();
                    ui.label(UI_TEXT.label_symbol.as_str());
                    ComboBox::from_id_salt("symbol_select")
                        .selected_text(symbol.as_str())
                        .show_ui(ui, |ui| {
                            for s in &self.symbols {
                                ui.selectable_value(&mut symbol, s.clone(), s.as_str());
                            }
                        });
                    if symbol != current.symbol {
                        self.actions.push(ShellAction::SwitchSeries(SeriesKey::new(
                            symbol,
                            current.timeframe,
                        )));
                    }

                    ui.separator();

                    // 2. TIMEFRAME
                    ui.label(UI_TEXT.label_timeframe.as_str());
                    for tf in Timeframe::iter() {
                        if ui
                            .selectable_label(tf == current.timeframe, tf.label())
                            .clicked()
                            && tf != current.timeframe
                        {
                            self.actions.push(ShellAction::SwitchSeries(SeriesKey::new(
                                current.symbol.clone(),
                                tf,
                            )));
                        }
                    }

                    ui.separator();

                    // 3. PRICE (revealed bars only)
                    if let Some(series) = &self.series {
                        let visible = self.session.visible_candles(series.candles());
                        if let Some(last) = visible.last() {
                            ui.label(RichText::new(format!("{:.2}", last.close)).strong());
                        }
                        if let Some(change) = close_change_pct(visible) {
                            ui.label(
                                RichText::new(format!("{:+.2}%", change))
                                    .small()
                                    .color(get_outcome_color(change)),
                            );
                        }
                    }
                    if self.session.replay().is_active() {
                        ui.label(
                            RichText::new(UI_TEXT.label_practice.as_str())
                                .small()
                                .strong()
                                .color(UI_CONFIG.colors.pending),
                        );
                    }
                    if self.is_fetching() {
                        ui.spinner();
                    }

                    // 4. THEME
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let label = if self.dark_theme {
                            &UI_TEXT.label_theme_light
                        } else {
                            &UI_TEXT.label_theme_dark
                        };
                        if ui.button(label.as_str()).clicked() {
                            self.dark_theme = !self.dark_theme;
                            self.session.request_render();
                        }
                    });
                });
            });
    }

    pub(crate) fn render_tool_bar(&mut self, ctx: &Context) {
        let frame = UI_CONFIG.top_panel_frame(self.dark_theme);

        TopBottomPanel::top("drawing_toolbar")
            .frame(frame)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let font = FontId::proportional(14.0);

                    // 1. TOOLS
                    let active = self.session.active_tool();
                    for tool in ToolKind::iter() {
                        let idle = tool
                            .side()
                            .map_or(UI_CONFIG.colors.label, |side| side.color());
                        let response = ui
                            .interactive_label(tool.label(), active == Some(tool), idle, font.clone())
                            .on_hover_text(tool.title());
                        if response.clicked() {
                            if active == Some(tool) {
                                self.session.cancel();
                            } else {
                                self.session.select_tool(tool);
                            }
                        }
                    }

                    ui.separator();

                    // 2. SCISSORS
                    if ui
                        .interactive_label(
                            UI_TEXT.icon_scissors.as_str(),
                            self.session.scissors_armed(),
                            UI_CONFIG.colors.label,
                            font.clone(),
                        )
                        .on_hover_text(UI_TEXT.tb_scissors.as_str())
                        .clicked()
                    {
                        self.session.toggle_scissors();
                    }

                    ui.separator();

                    // 3. HISTORY
                    if ui
                        .add_enabled(self.session.can_undo(), Button::new(UI_TEXT.icon_undo.as_str()))
                        .on_hover_text(UI_TEXT.tb_undo.as_str())
                        .clicked()
                    {
                        self.session.undo();
                    }
                    if ui
                        .add_enabled(self.session.can_redo(), Button::new(UI_TEXT.icon_redo.as_str()))
                        .on_hover_text(UI_TEXT.tb_redo.as_str())
                        .clicked()
                    {
                        self.session.redo();
                    }
                    if ui
                        .add_enabled(
                            self.session.selected().is_some(),
                            Button::new(UI_TEXT.icon_delete.as_str()),
                        )
                        .on_hover_text(UI_TEXT.tb_delete_selected.as_str())
                        .clicked()
                    {
                        self.session.delete_selected();
                    }

                    let has_drawings = !self.session.annotations().is_empty();
                    if ui
                        .add_enabled(has_drawings, Button::new(UI_TEXT.icon_close.as_str()))
                        .on_hover_text(UI_TEXT.tb_remove_last.as_str())
                        .clicked()
                    {
                        self.session.remove_last_drawing();
                    }
                    if ui
                        .add_enabled(has_drawings, Button::new(UI_TEXT.tb_clear_all.as_str()))
                        .clicked()
                    {
                        self.session.clear_drawings();
                    }

                    // 4. PROMPT
                    if let Some(prompt) = self.session.step_label() {
                        ui.separator();
                        ui.label(RichText::new(prompt).color(UI_CONFIG.colors.pending));
                        ui.label_subdued(UI_TEXT.tb_esc_hint.as_str());
                    }
                });
            });
    }

    pub(crate) fn render_replay_panel(&mut self, ctx: &Context) {
        let frame = UI_CONFIG.side_panel_frame(self.dark_theme);

        SidePanel::right("replay_panel")
            .min_width(230.0)
            .resizable(false)
            .frame(frame)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui| {
                    // Taken out for the duration so the session can be
                    // borrowed mutably alongside the candles.
                    let Some(series) = self.series.take() else {
                        ui.label_subdued(UI_TEXT.cp_loading.as_str());
                        return;
                    };

                    self.render_replay_section(ui, &series);
                    ui.separator();
                    self.render_order_form(ui, series.candles());
                    ui.separator();
                    self.render_positions(ui);
                    ui.separator();
                    self.render_stats(ui);
                    ui.separator();
                    self.render_trades(ui);

                    self.series = Some(series);
                });
            });
    }

    fn render_replay_section(&mut self, ui: &mut Ui, series: &CandleSeries) {
        let candles = series.candles();
        ui.heading(RichText::new(UI_TEXT.rp_heading.as_str()).color(UI_CONFIG.colors.heading));
        ui.add_space(4.0);

        if self.session.replay().is_active() {
            if let Some(label) = self.session.replay_label(candles) {
                ui.label(RichText::new(label).strong());
            }
            ui.label_subdued(format!(
                "{} {}",
                self.session.hidden_count(candles),
                UI_TEXT.rp_hidden_suffix
            ));

            let at_end = self.session.replay().is_at_end(candles);
            ui.horizontal(|ui| {
                ui.label(UI_TEXT.rp_step.as_str());
                for &n in REPLAY.step_presets {
                    if ui
                        .add_enabled(!at_end, Button::new(format!("+{}", n)))
                        .clicked()
                    {
                        let outcome = self.session.step_forward(n, candles);
                        if !outcome.closed.is_empty() {
                            self.status = StatusLine::info(format!(
                                "{} trade(s) closed",
                                outcome.closed.len()
                            ));
                        }
                    }
                }
            });
            if at_end {
                ui.label(
                    RichText::new(UI_TEXT.rp_end_of_data.as_str()).color(UI_CONFIG.colors.pending),
                );
            }
            if ui.button(UI_TEXT.rp_stop.as_str()).clicked() {
                self.session.stop_replay();
                self.chart.request_fit();
            }
        } else {
            ui.label_subdued(UI_TEXT.rp_inactive_hint.as_str());
            ui.add(
                Slider::new(
                    &mut self.start_pct,
                    REPLAY.min_start_pct..=REPLAY.max_start_pct,
                )
                .suffix("%")
                .text(UI_TEXT.rp_start_at.as_str()),
            );
            if ui.button(UI_TEXT.rp_start.as_str()).clicked()
                && self.session.start_replay(self.start_pct, candles)
            {
                self.chart.request_fit();
            }
        }

        ui.add_space(4.0);
        let has_orders =
            !self.session.positions().is_empty() || !self.session.trades().is_empty();
        if ui
            .add_enabled(has_orders, Button::new(UI_TEXT.rp_clear_orders.as_str()))
            .clicked()
        {
            self.actions.push(ShellAction::ClearOrders);
        }
        if series.has_older()
            && ui
                .add_enabled(!self.is_fetching(), Button::new(UI_TEXT.rp_load_older.as_str()))
                .clicked()
        {
            self.actions.push(ShellAction::LoadOlder);
        }
    }

    fn render_order_form(&mut self, ui: &mut Ui, candles: &[Candle]) {
        ui.label_subheader(UI_TEXT.of_heading.as_str());

        ui.horizontal(|ui| {
            for side in [PositionSide::Long, PositionSide::Short] {
                let text = format!("{} {}", side.arrow(), side);
                if ui
                    .interactive_label(
                        &text,
                        self.order_form.side == side,
                        side.color(),
                        FontId::proportional(13.0),
                    )
                    .clicked()
                {
                    self.order_form.side = side;
                }
            }
        });

        let entry_hint = self
            .session
            .replay()
            .last_price(candles)
            .map_or_else(|| UI_TEXT.of_entry_hint.clone(), |p| format!("{:.2}", p));
        Grid::new("order_form_grid")
            .num_columns(2)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                let fields = [
                    (&UI_TEXT.of_entry, &mut self.order_form.entry, entry_hint),
                    (&UI_TEXT.of_sl, &mut self.order_form.sl, String::new()),
                    (&UI_TEXT.of_tp, &mut self.order_form.tp, String::new()),
                ];
                for (label, value, hint) in fields {
                    ui.label(label.as_str());
                    ui.add(TextEdit::singleline(value).hint_text(hint).desired_width(110.0));
                    ui.end_row();
                }
            });

        if ui.button(UI_TEXT.of_place.as_str()).clicked() {
            match self.submit_order(candles) {
                Ok(_) => {
                    self.status = StatusLine::info(format!("{} order placed", self.order_form.side));
                    self.order_form.entry.clear();
                    self.order_form.sl.clear();
                    self.order_form.tp.clear();
                }
                Err(e) => {
                    log::warn!("Order rejected: {:#}", e);
                    self.status = StatusLine::error(format!("{:#}", e));
                }
            }
        }
    }

    /// A blank entry means "at the last revealed close".
    fn submit_order(&mut self, candles: &[Candle]) -> Result<PositionId> {
        let entry = match parse_price(&self.order_form.entry, &UI_TEXT.of_entry)? {
            Some(price) => price,
            None => self
                .session
                .replay()
                .last_price(candles)
                .context("No price to enter at")?,
        };
        let sl = parse_price(&self.order_form.sl, &UI_TEXT.of_sl)?;
        let tp = parse_price(&self.order_form.tp, &UI_TEXT.of_tp)?;
        self.session
            .place_order(self.order_form.side, entry, sl, tp, candles)
    }

    fn render_positions(&mut self, ui: &mut Ui) {
        ui.label_subheader(UI_TEXT.pos_heading.as_str());
        if self.session.positions().is_empty() {
            ui.label_subdued(UI_TEXT.pos_none.as_str());
            return;
        }

        let mut remove = None;
        for position in self.session.positions() {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("{} {}", position.side.arrow(), position.side))
                        .small()
                        .color(position.side.color()),
                );
                ui.label(RichText::new(format!("@ {:.2}", position.entry)).small());
                let (tag, color) = if position.is_pending() {
                    (&UI_TEXT.pos_pending, UI_CONFIG.colors.pending)
                } else {
                    (&UI_TEXT.pos_open, UI_CONFIG.colors.profit)
                };
                ui.label(RichText::new(tag.as_str()).small().color(color));
                if ui.small_button(UI_TEXT.icon_close.as_str()).clicked() {
                    remove = Some(position.id);
                }
            });
            ui.label_subdued(format!(
                "SL {} · TP {}",
                fmt_level(position.sl),
                fmt_level(position.tp)
            ));
        }
        if let Some(id) = remove {
            self.session.remove_position(id);
        }
    }

    fn render_stats(&self, ui: &mut Ui) {
        ui.label_subheader(UI_TEXT.stats_heading.as_str());
        let stats = self.session.stats();
        Grid::new("stats_grid")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                ui.label_subdued(UI_TEXT.stats_total.as_str());
                ui.label(stats.total.to_string());
                ui.end_row();

                ui.label_subdued(UI_TEXT.stats_wins.as_str());
                ui.label(RichText::new(stats.wins.to_string()).color(UI_CONFIG.colors.profit));
                ui.end_row();

                ui.label_subdued(UI_TEXT.stats_losses.as_str());
                ui.label(RichText::new(stats.losses.to_string()).color(UI_CONFIG.colors.loss));
                ui.end_row();

                ui.label_subdued(UI_TEXT.stats_win_rate.as_str());
                ui.label(format!("{:.1}%", stats.win_rate));
                ui.end_row();

                ui.label_subdued(UI_TEXT.stats_total_pnl.as_str());
                ui.label(
                    RichText::new(format!("{:+.2}%", stats.total_pnl))
                        .strong()
                        .color(get_outcome_color(stats.total_pnl)),
                );
                ui.end_row();
            });
    }

    fn render_trades(&self, ui: &mut Ui) {
        ui.label_subheader(UI_TEXT.trades_heading.as_str());
        if self.session.trades().is_empty() {
            ui.label_subdued(UI_TEXT.trades_none.as_str());
            return;
        }
        // Newest first
        for trade in self.session.trades().iter().rev() {
            let side = trade.position.side;
            ui.horizontal(|ui| {
                ui.label(RichText::new(side.arrow()).color(side.color()));
                ui.label(
                    RichText::new(format!("{:.2} → {:.2}", trade.position.entry, trade.exit_price))
                        .small(),
                );
                ui.label(
                    RichText::new(trade.exit_reason.to_string())
                        .small()
                        .color(get_outcome_color(trade.pnl)),
                );
                ui.label(
                    RichText::new(format!("{:+.2}%", trade.pnl))
                        .small()
                        .strong()
                        .color(get_outcome_color(trade.pnl)),
                );
            });
            ui.label_subdued(epoch_sec_to_string(trade.exit_time));
        }
    }

    pub(crate) fn render_status_panel(&mut self, ctx: &Context) {
        let frame = UI_CONFIG.bottom_panel_frame(self.dark_theme);

        TopBottomPanel::bottom("status_panel")
            .frame(frame)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    // 1. Series
                    ui.label(RichText::new(self.session.key().to_string()).small().strong());
                    if let Some(series) = &self.series
                        && let (Some(first), Some(last)) =
                            (series.candles().first(), series.candles().last())
                    {
                        ui.label_subdued(format!(
                            "{} → {} · {}/{}",
                            epoch_sec_to_date(first.time),
                            epoch_sec_to_date(last.time),
                            series.len(),
                            series.total_available()
                        ));
                    }

                    ui.separator();

                    // 2. Drawings
                    let annotations = self.session.annotations();
                    ui.metric(
                        UI_TEXT.sb_drawings.as_str(),
                        &annotations.len().to_string(),
                        UI_CONFIG.colors.label,
                    );
                    if let Some(drawing) = self.session.selected().and_then(|id| annotations.get(id)) {
                        ui.metric(
                            UI_TEXT.sb_selected.as_str(),
                            &format!("{:?}", drawing.kind()),
                            UI_CONFIG.colors.heading,
                        );
                    }

                    ui.separator();

                    // 3. Feedback
                    let (text, color) = if self.status.text.is_empty() {
                        (UI_TEXT.sb_ready.as_str(), UI_CONFIG.colors.subdued)
                    } else if self.status.is_error {
                        (self.status.text.as_str(), UI_CONFIG.colors.loss)
                    } else {
                        (self.status.text.as_str(), UI_CONFIG.colors.label)
                    };
                    ui.label(RichText::new(text).small().color(color));
                });
            });
    }

    pub(crate) fn render_central_panel(&mut self, ctx: &Context) {
        let frame = UI_CONFIG.central_panel_frame(self.dark_theme);
        let theme = self.theme();

        CentralPanel::default().frame(frame).show(ctx, |ui| {
            match (&self.state, &self.series) {
                (AppState::Failed(reason), _) => {
                    render_fullscreen_message(ui, &UI_TEXT.cp_failed, reason, true);
                }
                (AppState::Running, Some(series)) => {
                    let bar_seconds = series.key.timeframe.seconds() as f64;
                    if let Some(error) =
                        self.chart
                            .show(ui, &mut self.session, series.candles(), bar_seconds, &theme)
                    {
                        self.status = StatusLine::error(error);
                    }
                }
                (AppState::Running, None) => {
                    render_fullscreen_message(ui, &UI_TEXT.cp_no_data, "", false);
                }
                (AppState::Loading, _) => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(ui.available_height() * 0.4);
                        ui.spinner();
                        ui.heading(UI_TEXT.cp_loading.as_str());
                        ui.label_subdued(UI_TEXT.cp_loading_sub.as_str());
                    });
                }
            }
        });
    }
}

fn render_fullscreen_message(ui: &mut Ui, title: &str, subtitle: &str, is_error: bool) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.4);
        let color = if is_error {
            UI_CONFIG.colors.loss
        } else {
            UI_CONFIG.colors.label
        };
        ui.heading(RichText::new(title).color(color));
        if !subtitle.is_empty() {
            ui.label_subdued(subtitle);
        }
    });
}
