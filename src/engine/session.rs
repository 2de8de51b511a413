//! The mutable chart context the UI shell drives.
//!
//! Owns every piece of interactive state for the active series: drawings and
//! their history, the tool in progress, the replay cursor with its orders, the
//! drag session, selection and hover. Event handlers borrow it mutably; the
//! renderer reads it through [`ChartSession::render_frame`].

use anyhow::{Result, bail};
use eframe::egui::Pos2;

use crate::{
    config::{DF, INTERACTION, OverlayTheme},
    data::{DataKind, KeyValueStore, PersistGate, erase, load_json, save_json},
    domain::{Candle, ChartPoint, SeriesKey, nearest_candle_index},
    engine::{
        annotations::AnnotationStore,
        drag::DragController,
        replay::{ReplayEngine, StepOutcome},
        tools::{ToolInput, ToolKind, ToolOutcome},
    },
    models::{CompletedTrade, Drawing, DrawingId, Position, PositionId, PositionSide, ReplayStats},
    overlay::{
        CoordinateMapper, LinearMapper, OverlayContext, OverlayFrame, OverlayView, RenderScheduler,
        build_overlay, hit_test_drawing,
    },
};

#[derive(Debug, Default)]
pub struct ChartSession {
    key: SeriesKey,
    store: AnnotationStore,
    tools: ToolInput,
    replay: ReplayEngine,
    drag: DragController,
    selected: Option<DrawingId>,
    hovered: Option<DrawingId>,
    /// Last known pointer position in chart space, drives tool previews.
    cursor: Option<ChartPoint>,
    /// Next click cuts the series instead of drawing.
    scissors: bool,
    scheduler: RenderScheduler,
    gate: PersistGate,
    saved_drawings: Option<u64>,
    /// Orders revision and cut time as last written.
    saved_orders: Option<(u64, Option<i64>)>,
}

impl ChartSession {
    pub fn new(key: SeriesKey) -> Self {
        Self {
            key,
            ..Default::default()
        }
    }

    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn replay(&self) -> &ReplayEngine {
        &self.replay
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.tools.active()
    }

    pub fn scissors_armed(&self) -> bool {
        self.scissors
    }

    pub fn request_render(&mut self) {
        self.scheduler.request();
    }

    pub fn render_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    // ------------------------------------------------------------------
    // Tools and selection
    // ------------------------------------------------------------------

    pub fn select_tool(&mut self, tool: ToolKind) {
        self.scissors = false;
        self.tools.select(tool);
        self.scheduler.request();
    }

    /// Esc: drop the tool in progress, disarm scissors and deselect.
    pub fn cancel(&mut self) {
        self.scissors = false;
        self.tools.cancel();
        self.selected = None;
        self.scheduler.request();
    }

    pub fn toggle_scissors(&mut self) {
        self.tools.cancel();
        self.scissors = !self.scissors;
        self.scheduler.request();
    }

    /// Map `raw` onto the closest revealed candle time.
    fn snap(&self, raw: ChartPoint, candles: &[Candle]) -> ChartPoint {
        let visible = self.replay.visible_data(candles);
        match nearest_candle_index(visible, raw.time) {
            Some(idx) => ChartPoint::new(visible[idx].time, raw.price),
            None => raw,
        }
    }

    /// A plain click on the chart. Feeds the active tool, cuts the series when
    /// scissors are armed, and otherwise selects whatever drawing is under
    /// the pointer. Only a rejected order placement is an error.
    pub fn click(
        &mut self,
        pos: Pos2,
        mapper: &dyn CoordinateMapper,
        candles: &[Candle],
    ) -> Result<ToolOutcome> {
        let Some(raw) = mapper.point_at(pos) else {
            return Ok(ToolOutcome::Idle);
        };

        if self.scissors {
            self.scissors = false;
            let idx = candles.partition_point(|c| c.time < raw.time);
            if idx > 0 {
                self.cut_at(idx, candles);
            }
            self.scheduler.request();
            return Ok(ToolOutcome::Idle);
        }

        let point = self.snap(raw, candles);
        let outcome = self.tools.click(point);
        self.scheduler.request();
        match &outcome {
            ToolOutcome::Idle => {
                let selected = hit_test_drawing(
                    self.store.drawings(),
                    mapper,
                    pos,
                    INTERACTION.hit_threshold_px,
                );
                if selected != self.selected {
                    if DF.log_selection {
                        log::info!("Selection: {:?} -> {:?}", self.selected, selected);
                    }
                    self.selected = selected;
                }
            }
            ToolOutcome::Collected { .. } => {}
            ToolOutcome::Drawing(drawing) => {
                self.store.add(drawing.clone());
            }
            ToolOutcome::Placement(req) => {
                self.place_order(req.side, req.entry, Some(req.sl), Some(req.tp), candles)?;
            }
        }
        Ok(outcome)
    }

    /// Pointer moved without a button held, or left the chart (`None`).
    pub fn hover(&mut self, pos: Option<Pos2>, mapper: &dyn CoordinateMapper) {
        let cursor = pos.and_then(|p| mapper.point_at(p));
        if cursor != self.cursor && self.tools.step() > 0 {
            self.scheduler.request();
        }
        self.cursor = cursor;

        if self.drag.is_dragging() {
            return;
        }
        let hovered = match (pos, self.tools.active()) {
            (Some(p), None) => hit_test_drawing(
                self.store.drawings(),
                mapper,
                p,
                INTERACTION.hit_threshold_px,
            ),
            _ => None,
        };
        if hovered != self.hovered {
            self.hovered = hovered;
            self.scheduler.request();
        }
    }

    // ------------------------------------------------------------------
    // Drags
    // ------------------------------------------------------------------

    /// Returns true if a drag started. Drags never start while a tool is
    /// collecting clicks.
    pub fn pointer_down(&mut self, pos: Pos2, mapper: &dyn CoordinateMapper) -> bool {
        if self.tools.active().is_some() || self.scissors {
            return false;
        }
        if self
            .drag
            .pointer_down(pos, mapper, &self.store, &self.replay)
            .is_none()
        {
            return false;
        }
        if let Some(id) = self.drag.dragging_drawing() {
            self.selected = Some(id);
        }
        self.scheduler.request();
        true
    }

    pub fn pointer_move(&mut self, pos: Pos2, mapper: &dyn CoordinateMapper) -> bool {
        let changed = self
            .drag
            .pointer_move(pos, mapper, &mut self.store, &mut self.replay);
        if changed {
            self.scheduler.request();
        }
        changed
    }

    pub fn pointer_up(&mut self) -> bool {
        let ended = self.drag.pointer_up().is_some();
        if ended {
            self.scheduler.request();
        }
        ended
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    // ------------------------------------------------------------------
    // Drawing commands
    // ------------------------------------------------------------------

    fn after_drawings_changed(&mut self, changed: bool) -> bool {
        if changed {
            if self.selected.is_some_and(|id| self.store.get(id).is_none()) {
                self.selected = None;
            }
            if self.hovered.is_some_and(|id| self.store.get(id).is_none()) {
                self.hovered = None;
            }
            self.scheduler.request();
        }
        changed
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.store.undo();
        self.after_drawings_changed(changed)
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.store.redo();
        self.after_drawings_changed(changed)
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let changed = self.store.remove(id);
        self.after_drawings_changed(changed)
    }

    pub fn remove_last_drawing(&mut self) -> Option<Drawing> {
        let removed = self.store.remove_last();
        self.after_drawings_changed(removed.is_some());
        removed
    }

    pub fn clear_drawings(&mut self) -> bool {
        let changed = self.store.clear();
        self.after_drawings_changed(changed)
    }

    // ------------------------------------------------------------------
    // Replay and orders
    // ------------------------------------------------------------------

    pub fn start_replay(&mut self, percent: u32, candles: &[Candle]) -> bool {
        let started = self.replay.start_replay(percent, candles);
        self.scheduler.request();
        started
    }

    pub fn cut_at(&mut self, index: usize, candles: &[Candle]) -> bool {
        let cut = self.replay.cut_at(index, candles);
        self.scheduler.request();
        cut
    }

    pub fn step_forward(&mut self, n: usize, candles: &[Candle]) -> StepOutcome {
        let outcome = self.replay.step_forward(n, candles);
        if outcome.revealed > 0 {
            self.scheduler.request();
        }
        outcome
    }

    pub fn stop_replay(&mut self) {
        self.replay.stop_replay();
        self.scheduler.request();
    }

    /// Series data was replaced, e.g. after a timeframe switch.
    pub fn rebase(&mut self, candles: &[Candle]) -> bool {
        let moved = self.replay.rebase(candles);
        self.scheduler.request();
        moved
    }

    /// Open a pending order at the last revealed bar.
    pub fn place_order(
        &mut self,
        side: PositionSide,
        entry: f64,
        sl: Option<f64>,
        tp: Option<f64>,
        candles: &[Candle],
    ) -> Result<PositionId> {
        if !entry.is_finite() || entry <= 0.0 {
            bail!("Entry price must be a positive number, got {}", entry);
        }
        for (name, value) in [("Stop loss", sl), ("Take profit", tp)] {
            if let Some(v) = value
                && (!v.is_finite() || v <= 0.0)
            {
                bail!("{} must be a positive number, got {}", name, v);
            }
        }
        let id = self.replay.place_position(side, entry, sl, tp, candles);
        self.scheduler.request();
        Ok(id)
    }

    pub fn remove_position(&mut self, id: PositionId) -> bool {
        let removed = self.replay.remove_position(id);
        if removed {
            self.scheduler.request();
        }
        removed
    }

    /// Drop every order and trade for this symbol, in memory and in storage.
    pub fn clear_all_orders(&mut self, store: &mut dyn KeyValueStore) -> bool {
        let changed = self.replay.clear_all_orders();
        let symbol = self.key.symbol();
        erase(store, DataKind::Positions, symbol);
        erase(store, DataKind::Trades, symbol);
        self.saved_orders = Some((self.replay.revision(), self.replay.cut_time()));
        self.scheduler.request();
        changed
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Make `key` the active series. Drawings and orders are stored per
    /// symbol, so a timeframe change keeps them and only needs [`Self::rebase`]
    /// once the new candles arrive.
    pub fn switch_series(&mut self, key: SeriesKey, store: &mut dyn KeyValueStore) {
        if key.symbol() == self.key.symbol() {
            if DF.log_persistence {
                log::info!("Timeframe switch {} -> {}", self.key, key);
            }
            self.key = key;
            return;
        }

        self.drag.pointer_up();
        self.sync_storage(store);
        self.key = key;
        self.load(store);
    }

    /// Read this symbol's entries from `store`, replacing all state. A saved
    /// replay waits for [`Self::rebase`] before revealing anything.
    pub fn load(&mut self, store: &dyn KeyValueStore) {
        let symbol = self.key.symbol();
        let drawings: Vec<Drawing> = load_json(store, DataKind::Drawings, symbol);
        let positions: Vec<Position> = load_json(store, DataKind::Positions, symbol);
        let trades: Vec<CompletedTrade> = load_json(store, DataKind::Trades, symbol);
        let cut_time: Option<i64> = load_json(store, DataKind::Cut, symbol);
        if DF.log_persistence {
            log::info!(
                "{}: loaded {} drawings, {} positions, {} trades, cut {:?}",
                symbol,
                drawings.len(),
                positions.len(),
                trades.len(),
                cut_time
            );
        }

        self.tools.cancel();
        self.scissors = false;
        self.selected = None;
        self.hovered = None;
        self.store.load(drawings);
        self.replay.restore(positions, trades, cut_time);
        self.gate.arm();
        self.scheduler.request();
    }

    /// Write whatever changed since the last save. Skipped mid-drag and for
    /// the cycle right after a load.
    pub fn sync_storage(&mut self, store: &mut dyn KeyValueStore) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        let drawings_rev = self.store.revision();
        let orders_rev = (self.replay.revision(), self.replay.cut_time());
        if !self.gate.allow_save() {
            self.saved_drawings = Some(drawings_rev);
            self.saved_orders = Some(orders_rev);
            return false;
        }

        let symbol = self.key.symbol();
        let mut saved = false;
        if self.saved_drawings != Some(drawings_rev) {
            save_json(store, DataKind::Drawings, symbol, self.store.drawings());
            self.saved_drawings = Some(drawings_rev);
            saved = true;
        }
        if self.saved_orders != Some(orders_rev) {
            save_json(store, DataKind::Positions, symbol, self.replay.positions());
            save_json(store, DataKind::Trades, symbol, self.replay.trades());
            save_json(store, DataKind::Cut, symbol, &orders_rev.1);
            self.saved_orders = Some(orders_rev);
            saved = true;
        }
        saved
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------

    /// Prompt for the next click of the active tool.
    pub fn step_label(&self) -> Option<&'static str> {
        if self.scissors {
            return Some("Click a candle to cut the chart");
        }
        self.tools.prompt()
    }

    /// "Bar N / M" while practising.
    pub fn replay_label(&self, candles: &[Candle]) -> Option<String> {
        self.replay.step_label(candles)
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    pub fn stats(&self) -> ReplayStats {
        self.replay.stats()
    }

    pub fn positions(&self) -> &[Position] {
        self.replay.positions()
    }

    pub fn trades(&self) -> &[CompletedTrade] {
        self.replay.trades()
    }

    pub fn visible_candles<'a>(&self, candles: &'a [Candle]) -> &'a [Candle] {
        self.replay.visible_data(candles)
    }

    pub fn hidden_count(&self, candles: &[Candle]) -> usize {
        self.replay.hidden_count(candles)
    }

    pub fn selected(&self) -> Option<DrawingId> {
        self.selected
    }

    pub fn hovered(&self) -> Option<DrawingId> {
        self.hovered
    }

    /// Build the overlay for this frame, or reuse the cached one when nothing
    /// changed and the view did not move.
    pub fn render_frame<'v>(
        &mut self,
        view: &'v mut OverlayView,
        mapper: &LinearMapper,
        theme: &OverlayTheme,
        candles: &[Candle],
    ) -> &'v OverlayFrame {
        let preview = self.tools.preview(self.cursor);
        let ctx = OverlayContext {
            drawings: self.store.drawings(),
            positions: self.replay.positions(),
            mapper,
            theme,
            last_price: self.replay.last_price(candles),
            hovered: self.hovered,
            selected: self.selected,
            dragging_drawing: self.drag.dragging_drawing(),
            dragging_line: self.drag.dragging_line(),
            preview: preview.as_ref(),
        };
        view.frame(&mut self.scheduler, mapper.view_hash(), || build_overlay(&ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Timeframe,
        data::MemoryStore,
        models::{DrawingKind, DrawingShape},
    };
    use eframe::egui::{Rect, pos2};

    // 1 px per second, 5 px per price unit, price 100 at the bottom.
    fn mapper() -> LinearMapper {
        LinearMapper::new(
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1000.0, 500.0)),
            (0.0, 1000.0),
            (100.0, 200.0),
        )
    }

    fn candles() -> Vec<Candle> {
        (0..10)
            .map(|i| Candle::new(i * 100, 150.0, 151.0, 149.0, 150.0, 1.0))
            .collect()
    }

    fn btc() -> SeriesKey {
        SeriesKey::new("BTCUSDT", Timeframe::H1)
    }

    #[test]
    fn test_click_snaps_to_candle_time() -> Result<()> {
        let m = mapper();
        let data = candles();
        let mut session = ChartSession::new(btc());
        session.select_tool(ToolKind::Trendline);
        session.click(pos2(130.0, 250.0), &m, &data)?;
        session.click(pos2(370.0, 200.0), &m, &data)?;

        let drawing = &session.annotations().drawings()[0];
        assert_eq!(
            drawing.endpoints(),
            Some((ChartPoint::new(100, 150.0), ChartPoint::new(400, 160.0)))
        );
        assert_eq!(session.active_tool(), None);
        Ok(())
    }

    #[test]
    fn test_idle_click_selects_and_deletes() -> Result<()> {
        let m = mapper();
        let data = candles();
        let mut session = ChartSession::new(btc());
        session.select_tool(ToolKind::Horizontal);
        session.click(pos2(500.0, 250.0), &m, &data)?;
        let id = session.annotations().drawings()[0].id;

        session.click(pos2(800.0, 253.0), &m, &data)?;
        assert_eq!(session.selected(), Some(id));
        assert!(session.delete_selected());
        assert_eq!(session.selected(), None);
        assert!(session.annotations().is_empty());

        assert!(session.undo());
        session.click(pos2(800.0, 100.0), &m, &data)?;
        assert_eq!(session.selected(), None);
        Ok(())
    }

    #[test]
    fn test_cancel_clears_selection() -> Result<()> {
        let m = mapper();
        let data = candles();
        let mut session = ChartSession::new(btc());
        session.select_tool(ToolKind::Horizontal);
        session.click(pos2(500.0, 250.0), &m, &data)?;
        session.click(pos2(800.0, 250.0), &m, &data)?;
        assert!(session.selected().is_some());

        session.toggle_scissors();
        session.cancel();
        assert_eq!(session.selected(), None);
        assert!(!session.scissors_armed());
        assert_eq!(session.active_tool(), None);
        Ok(())
    }

    #[test]
    fn test_position_tool_places_pending_order() -> Result<()> {
        let m = mapper();
        let data = candles();
        let mut session = ChartSession::new(btc());
        session.start_replay(50, &data);
        session.select_tool(ToolKind::LongPosition);
        assert_eq!(session.step_label(), Some("Click entry price"));
        session.click(pos2(100.0, 250.0), &m, &data)?;
        session.click(pos2(100.0, 300.0), &m, &data)?;
        session.click(pos2(100.0, 150.0), &m, &data)?;

        let pos = &session.positions()[0];
        assert_eq!((pos.entry, pos.sl, pos.tp), (150.0, Some(140.0), Some(170.0)));
        assert!(pos.is_pending());
        assert_eq!(pos.entry_time, 400);
        Ok(())
    }

    #[test]
    fn test_place_order_validation() {
        let data = candles();
        let mut session = ChartSession::new(btc());
        assert!(session.place_order(PositionSide::Long, 0.0, None, None, &data).is_err());
        assert!(session.place_order(PositionSide::Long, f64::NAN, None, None, &data).is_err());
        assert!(session.place_order(PositionSide::Short, 100.0, Some(-1.0), None, &data).is_err());
        assert!(session.place_order(PositionSide::Short, 100.0, None, Some(f64::INFINITY), &data).is_err());
        assert!(session.positions().is_empty());
        assert!(session.place_order(PositionSide::Short, 100.0, Some(105.0), None, &data).is_ok());
    }

    #[test]
    fn test_scissors_cut_before_clicked_candle() -> Result<()> {
        let m = mapper();
        let data = candles();
        let mut session = ChartSession::new(btc());
        session.toggle_scissors();
        assert!(session.step_label().is_some());
        session.click(pos2(350.0, 250.0), &m, &data)?;
        assert!(!session.scissors_armed());
        assert_eq!(session.visible_candles(&data).len(), 4);
        assert_eq!(session.hidden_count(&data), 6);
        assert_eq!(session.replay_label(&data), Some("Bar 4 / 10".to_owned()));
        Ok(())
    }

    #[test]
    fn test_no_drag_while_tool_active() -> Result<()> {
        let m = mapper();
        let data = candles();
        let mut session = ChartSession::new(btc());
        session.select_tool(ToolKind::Horizontal);
        session.click(pos2(500.0, 250.0), &m, &data)?;

        session.select_tool(ToolKind::Fib);
        assert!(!session.pointer_down(pos2(500.0, 250.0), &m));
        session.cancel();
        assert!(session.pointer_down(pos2(500.0, 250.0), &m));
        assert!(session.pointer_move(pos2(500.0, 200.0), &m));
        assert!(session.pointer_up());
        assert_eq!(
            session.annotations().drawings()[0].shape,
            DrawingShape::Horizontal { price: 160.0 }
        );
        Ok(())
    }

    #[test]
    fn test_hover_tracks_drawing_under_pointer() -> Result<()> {
        let m = mapper();
        let data = candles();
        let mut session = ChartSession::new(btc());
        session.select_tool(ToolKind::Horizontal);
        session.click(pos2(500.0, 250.0), &m, &data)?;
        let id = session.annotations().drawings()[0].id;

        session.hover(Some(pos2(20.0, 248.0)), &m);
        assert_eq!(session.hovered(), Some(id));
        session.hover(None, &m);
        assert_eq!(session.hovered(), None);
        Ok(())
    }

    #[test]
    fn test_sync_and_switch_series() -> Result<()> {
        let m = mapper();
        let data = candles();
        let mut kv = MemoryStore::new();
        let mut session = ChartSession::new(btc());
        session.select_tool(ToolKind::Horizontal);
        session.click(pos2(500.0, 250.0), &m, &data)?;
        session.place_order(PositionSide::Long, 150.0, None, None, &data)?;
        assert!(session.sync_storage(&mut kv));
        assert!(!session.sync_storage(&mut kv));

        session.switch_series(SeriesKey::new("ETHUSDT", Timeframe::H1), &mut kv);
        assert!(session.annotations().is_empty());
        assert!(session.positions().is_empty());
        assert!(!session.can_undo());
        assert!(!session.sync_storage(&mut kv));

        session.switch_series(btc(), &mut kv);
        assert_eq!(session.annotations().len(), 1);
        assert_eq!(session.annotations().drawings()[0].kind(), DrawingKind::Horizontal);
        assert_eq!(session.positions().len(), 1);
        assert!(!session.replay().is_active());
        Ok(())
    }

    #[test]
    fn test_timeframe_switch_keeps_state() -> Result<()> {
        let m = mapper();
        let data = candles();
        let mut kv = MemoryStore::new();
        let mut session = ChartSession::new(btc());
        session.select_tool(ToolKind::Horizontal);
        session.click(pos2(500.0, 250.0), &m, &data)?;
        session.switch_series(SeriesKey::new("BTCUSDT", Timeframe::M15), &mut kv);
        assert_eq!(session.annotations().len(), 1);
        assert!(session.can_undo());
        Ok(())
    }

    #[test]
    fn test_restored_orders_trade_after_rebase() -> Result<()> {
        let mut data = candles();
        // Dips to 140 on the seventh bar
        data[6] = Candle::new(600, 150.0, 151.0, 140.0, 145.0, 1.0);
        let mut kv = MemoryStore::new();
        let mut session = ChartSession::new(btc());
        session.cut_at(5, &data);
        session.place_order(PositionSide::Long, 145.0, Some(100.0), Some(150.5), &data)?;
        assert!(session.sync_storage(&mut kv));
        assert!(kv.get(&DataKind::Cut.key("BTCUSDT")).is_some());

        let mut restored = ChartSession::new(btc());
        restored.load(&kv);
        assert!(restored.replay().is_active());
        assert_eq!(restored.replay().cut_time(), Some(400));
        assert!(restored.step_forward(1, &data).is_empty());

        assert!(restored.rebase(&data));
        assert_eq!(restored.visible_candles(&data).len(), 5);
        assert!(restored.step_forward(1, &data).filled.is_empty());
        assert_eq!(restored.step_forward(1, &data).filled.len(), 1);
        let closed = restored.step_forward(1, &data).closed;
        assert_eq!(closed.len(), 1);
        assert_eq!(restored.trades().len(), 1);
        assert!(restored.positions().is_empty());
        Ok(())
    }

    #[test]
    fn test_step_saves_cut_time() -> Result<()> {
        let data = candles();
        let mut kv = MemoryStore::new();
        let mut session = ChartSession::new(btc());
        session.cut_at(3, &data);
        assert!(session.sync_storage(&mut kv));
        session.step_forward(2, &data);
        assert!(session.sync_storage(&mut kv));

        let mut restored = ChartSession::new(btc());
        restored.load(&kv);
        restored.rebase(&data);
        assert_eq!(restored.visible_candles(&data).len(), 5);

        session.stop_replay();
        session.sync_storage(&mut kv);
        let mut stopped = ChartSession::new(btc());
        stopped.load(&kv);
        assert!(!stopped.replay().is_active());
        Ok(())
    }

    #[test]
    fn test_clear_all_orders_erases_storage() -> Result<()> {
        let data = candles();
        let mut kv = MemoryStore::new();
        let mut session = ChartSession::new(btc());
        session.place_order(PositionSide::Long, 150.0, None, None, &data)?;
        session.sync_storage(&mut kv);
        assert!(kv.get(&DataKind::Positions.key("BTCUSDT")).is_some());

        assert!(session.clear_all_orders(&mut kv));
        assert!(session.positions().is_empty());
        assert!(session.trades().is_empty());
        assert!(kv.get(&DataKind::Positions.key("BTCUSDT")).is_none());
        assert!(kv.get(&DataKind::Trades.key("BTCUSDT")).is_none());
        assert!(!session.sync_storage(&mut kv));
        Ok(())
    }

    #[test]
    fn test_render_frame_is_cached_until_requested() -> Result<()> {
        let m = mapper();
        let data = candles();
        let theme = OverlayTheme::dark();
        let mut view = OverlayView::default();
        let mut session = ChartSession::new(btc());
        session.select_tool(ToolKind::Horizontal);
        session.click(pos2(500.0, 250.0), &m, &data)?;

        assert!(!session.render_frame(&mut view, &m, &theme, &data).is_empty());
        session.render_frame(&mut view, &m, &theme, &data);
        assert_eq!((view.builds(), view.reuses()), (1, 1));

        session.undo();
        assert!(session.render_pending());
        assert!(session.render_frame(&mut view, &m, &theme, &data).is_empty());
        assert_eq!(view.builds(), 2);
        Ok(())
    }
}
