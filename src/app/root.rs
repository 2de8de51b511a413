use {
    anyhow::Result,
    eframe::{
        Frame, Storage,
        egui::{Context, Key, Modifiers, Visuals},
    },
    poll_promise::Promise,
    serde::{Deserialize, Serialize},
    std::{mem, sync::Arc},
};

use crate::{
    Cli,
    app::{AppState, FetchKind, OrderForm, PendingFetch, ShellAction, StatusLine},
    config::{DF, OverlayTheme, REPLAY},
    data::{
        CandleSeries, DemoSource, EframeStore, JsonFileSource, KeyValueStore, MarketDataSource,
        MemoryStore,
    },
    domain::SeriesKey,
    engine::ChartSession,
    ui::{ChartView, UI_CONFIG, UI_TEXT},
};

fn default_source() -> Arc<dyn MarketDataSource> {
    Arc::new(DemoSource)
}

#[derive(Deserialize, Serialize)]
#[serde(default)]
pub struct App {
    // Persisted across sessions.
    pub(crate) series_key: SeriesKey,
    pub(crate) dark_theme: bool,
    pub(crate) start_pct: u32,
    pub(crate) order_form: OrderForm,

    #[serde(skip)]
    pub(crate) session: ChartSession,
    #[serde(skip)]
    pub(crate) chart: ChartView,
    #[serde(skip)]
    pub(crate) series: Option<CandleSeries>,
    #[serde(skip)]
    pub(crate) symbols: Vec<String>,
    #[serde(skip, default = "default_source")]
    source: Arc<dyn MarketDataSource>,
    #[serde(skip)]
    pub(crate) state: AppState,
    #[serde(skip)]
    pub(crate) status: StatusLine,
    #[serde(skip)]
    pending_fetch: Option<PendingFetch>,
    #[serde(skip)]
    symbols_fetch: Option<Promise<Result<Vec<String>>>>,
    #[serde(skip)]
    pub(crate) actions: Vec<ShellAction>,
    /// Stands in for eframe storage when the integration has none.
    #[serde(skip)]
    fallback_store: MemoryStore,
    #[serde(skip)]
    storage_loaded: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            series_key: SeriesKey::default(),
            dark_theme: true,
            start_pct: REPLAY.default_start_pct,
            order_form: OrderForm::default(),
            session: ChartSession::default(),
            chart: ChartView::default(),
            series: None,
            symbols: Vec::new(),
            source: default_source(),
            state: AppState::default(),
            status: StatusLine::default(),
            pending_fetch: None,
            symbols_fetch: None,
            actions: Vec::new(),
            fallback_store: MemoryStore::new(),
            storage_loaded: false,
        }
    }
}

/// Run `f` against eframe's storage, or the in-memory fallback when the
/// integration has none.
fn with_store<R>(
    frame: &mut Frame,
    fallback: &mut MemoryStore,
    f: impl FnOnce(&mut dyn KeyValueStore) -> R,
) -> R {
    match frame.storage_mut() {
        Some(storage) => f(&mut EframeStore::new(storage)),
        None => f(fallback),
    }
}

impl App {
    pub(crate) fn new(cc: &eframe::CreationContext<'_>, args: Cli) -> Self {
        let mut app: App = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            Self::default()
        };

        app.source = match (&args.data_dir, args.demo) {
            (Some(dir), false) => Arc::new(JsonFileSource::new(dir.clone())),
            _ => default_source(),
        };
        if let Some(symbol) = args.symbol {
            app.series_key.symbol = symbol.to_uppercase();
        }
        if let Some(timeframe) = args.timeframe {
            app.series_key.timeframe = timeframe;
        }
        app.start_pct = app
            .start_pct
            .clamp(REPLAY.min_start_pct, REPLAY.max_start_pct);

        app.session = ChartSession::new(app.series_key.clone());
        app.symbols = vec![app.series_key.symbol.clone()];

        let source = Arc::clone(&app.source);
        app.symbols_fetch = Some(Promise::spawn_thread("symbols", move || {
            source.fetch_symbols()
        }));
        app.start_fetch(FetchKind::Replace);
        app
    }

    pub(crate) fn theme(&self) -> OverlayTheme {
        if self.dark_theme {
            OverlayTheme::dark()
        } else {
            OverlayTheme::light()
        }
    }

    pub(crate) fn is_fetching(&self) -> bool {
        self.pending_fetch.is_some()
    }

    fn start_fetch(&mut self, kind: FetchKind) {
        let key = self.session.key().clone();
        let before_time = match kind {
            FetchKind::Replace => None,
            FetchKind::Older => match self.series.as_ref().and_then(|s| s.oldest_time()) {
                Some(t) => Some(t),
                None => return,
            },
        };
        if kind == FetchKind::Replace {
            self.series = None;
            self.state = AppState::Loading;
        }
        if DF.log_data {
            log::info!("Fetching {:?} page for {} (before {:?})", kind, key, before_time);
        }

        let source = Arc::clone(&self.source);
        let (symbol, timeframe) = (key.symbol.clone(), key.timeframe);
        let promise = Promise::spawn_thread("ohlcv", move || {
            source.fetch_ohlcv(&symbol, timeframe, REPLAY.fetch_limit, before_time)
        });
        self.pending_fetch = Some(PendingFetch { key, kind, promise });
    }

    fn poll_symbols(&mut self) {
        let Some(promise) = self.symbols_fetch.take() else {
            return;
        };
        match promise.try_take() {
            Ok(Ok(mut symbols)) => {
                if !symbols.contains(&self.series_key.symbol) {
                    symbols.push(self.series_key.symbol.clone());
                }
                symbols.sort();
                self.symbols = symbols;
            }
            Ok(Err(e)) => {
                log::warn!("Symbol list unavailable: {:#}", e);
                self.status = StatusLine::error(format!("{:#}", e));
            }
            Err(promise) => self.symbols_fetch = Some(promise),
        }
    }

    fn poll_fetches(&mut self) {
        let Some(pending) = self.pending_fetch.take() else {
            return;
        };
        let result = match pending.promise.try_take() {
            Ok(result) => result,
            Err(promise) => {
                self.pending_fetch = Some(PendingFetch { promise, ..pending });
                return;
            }
        };

        // The user switched away while this was in flight
        if pending.key != *self.session.key() {
            if DF.log_data {
                log::info!("Dropping stale page for {}", pending.key);
            }
            return;
        }

        match (pending.kind, result) {
            (FetchKind::Replace, Ok(page)) => {
                let series = CandleSeries::new(pending.key, page);
                if series.is_empty() {
                    self.state = AppState::Failed(UI_TEXT.cp_no_data.clone());
                } else {
                    self.session.rebase(series.candles());
                    self.chart.reset();
                    self.status = StatusLine::info(format!("{} · {} candles", series.key, series.len()));
                    self.state = AppState::Running;
                }
                self.series = Some(series);
            }
            (FetchKind::Older, Ok(page)) => {
                if let Some(series) = &mut self.series {
                    let added = series.prepend_older(page);
                    self.session.rebase(series.candles());
                    self.session.request_render();
                    self.status = StatusLine::info(format!("Loaded {} older candles", added));
                }
            }
            (FetchKind::Replace, Err(e)) => {
                log::error!("Failed to load {}: {:#}", pending.key, e);
                self.state = AppState::Failed(format!("{:#}", e));
                self.status = StatusLine::error(format!("{:#}", e));
            }
            (FetchKind::Older, Err(e)) => {
                log::warn!("Failed to load older candles for {}: {:#}", pending.key, e);
                self.status = StatusLine::error(format!("{:#}", e));
            }
        }
    }

    /// Switch to another symbol or timeframe and fetch its candles.
    fn request_series(&mut self, key: SeriesKey, frame: &mut Frame) {
        if key == *self.session.key() {
            return;
        }
        with_store(frame, &mut self.fallback_store, |store| {
            self.session.switch_series(key.clone(), store)
        });
        self.series_key = key;
        self.start_fetch(FetchKind::Replace);
    }

    fn apply_actions(&mut self, frame: &mut Frame) {
        for action in mem::take(&mut self.actions) {
            match action {
                ShellAction::SwitchSeries(key) => self.request_series(key, frame),
                ShellAction::ClearOrders => {
                    with_store(frame, &mut self.fallback_store, |store| {
                        self.session.clear_all_orders(store)
                    });
                    self.status = StatusLine::info("Orders and trades cleared");
                }
                ShellAction::LoadOlder => self.start_fetch(FetchKind::Older),
            }
        }
    }

    pub(crate) fn handle_global_shortcuts(&mut self, ctx: &Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        // Shift+Cmd+Z must be consumed before Cmd+Z, which would also match it
        let (escape, delete, step, redo, undo) = ctx.input_mut(|i| {
            (
                i.consume_key(Modifiers::NONE, Key::Escape),
                i.consume_key(Modifiers::NONE, Key::Delete)
                    | i.consume_key(Modifiers::NONE, Key::Backspace),
                i.consume_key(Modifiers::NONE, Key::ArrowRight)
                    | i.consume_key(Modifiers::NONE, Key::Space),
                i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z)
                    | i.consume_key(Modifiers::COMMAND, Key::Y),
                i.consume_key(Modifiers::COMMAND, Key::Z),
            )
        });

        if escape {
            self.session.cancel();
        }
        if delete {
            self.session.delete_selected();
        }
        if redo {
            self.session.redo();
        }
        if undo {
            self.session.undo();
        }
        if step
            && self.session.replay().is_active()
            && let Some(series) = &self.series
        {
            let outcome = self.session.step_forward(1, series.candles());
            if !outcome.closed.is_empty() {
                self.status = StatusLine::info(format!("{} trade(s) closed", outcome.closed.len()));
            }
        }
    }
}

/// Sets up custom visuals for the entire application
fn setup_custom_visuals(ctx: &Context, dark: bool) {
    let mut visuals = if dark {
        let mut visuals = Visuals::dark();
        visuals.window_fill = UI_CONFIG.colors.central_panel;
        visuals.panel_fill = UI_CONFIG.colors.side_panel;
        visuals.widgets.noninteractive.fg_stroke.color = UI_CONFIG.colors.label;
        visuals.widgets.inactive.fg_stroke.color = UI_CONFIG.colors.label;
        visuals
    } else {
        Visuals::light()
    };
    visuals.widgets.hovered.fg_stroke.color = UI_CONFIG.colors.heading;
    visuals.widgets.active.fg_stroke.color = UI_CONFIG.colors.heading;
    ctx.set_visuals(visuals);
    ctx.style_mut(|s| s.interaction.selectable_labels = false);
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, frame: &mut Frame) {
        setup_custom_visuals(ctx, self.dark_theme);

        if !mem::replace(&mut self.storage_loaded, true) {
            with_store(frame, &mut self.fallback_store, |store| self.session.load(store));
            if let Some(series) = &self.series {
                self.session.rebase(series.candles());
            }
        }
        self.poll_symbols();
        self.poll_fetches();
        self.handle_global_shortcuts(ctx);

        self.render_top_panel(ctx);
        self.render_tool_bar(ctx);
        self.render_status_panel(ctx);
        self.render_replay_panel(ctx);
        self.render_central_panel(ctx);

        self.apply_actions(frame);
        with_store(frame, &mut self.fallback_store, |store| {
            self.session.sync_storage(store)
        });

        if self.pending_fetch.is_some()
            || self.symbols_fetch.is_some()
            || self.session.render_pending()
        {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn Storage) {
        self.session.sync_storage(&mut EframeStore::new(storage));
        if DF.log_persistence {
            log::info!("💾 SAVE [App]: {}", self.series_key);
        }
        eframe::set_value(storage, eframe::APP_KEY, self);
    }
}
