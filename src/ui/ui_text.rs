use std::sync::LazyLock;

pub const ICON_UNDO: &str = "⟲";
pub const ICON_REDO: &str = "⟳";
pub const ICON_DELETE: &str = "🗑";
pub const ICON_CLOSE: &str = "✕";
pub const ICON_SCISSORS: &str = "✂";
pub const ICON_PLAY: &str = "▶";
pub const ICON_STOP: &str = "■";
pub const ICON_SUN: &str = "☀";
pub const ICON_MOON: &str = "🌙";

pub struct UiText {
    // --- TOP BAR ---
    pub label_symbol: String,
    pub label_timeframe: String,
    pub label_theme_dark: String,
    pub label_theme_light: String,
    pub label_practice: String,

    // --- DRAWING TOOLBAR ---
    pub icon_undo: String,
    pub icon_redo: String,
    pub icon_delete: String,
    pub icon_scissors: String,
    pub tb_undo: String,
    pub tb_redo: String,
    pub tb_delete_selected: String,
    pub tb_remove_last: String,
    pub tb_clear_all: String,
    pub tb_scissors: String,
    pub tb_esc_hint: String,

    // --- REPLAY PANEL ---
    pub rp_heading: String,
    pub rp_start_at: String,
    pub rp_start: String,
    pub rp_stop: String,
    pub rp_step: String,
    pub rp_end_of_data: String,
    pub rp_clear_orders: String,
    pub rp_load_older: String,
    pub rp_hidden_suffix: String,
    pub rp_inactive_hint: String,

    // --- ORDER FORM ---
    pub of_heading: String,
    pub of_entry: String,
    pub of_sl: String,
    pub of_tp: String,
    pub of_place: String,
    pub of_entry_hint: String,

    // --- POSITIONS / TRADES ---
    pub pos_heading: String,
    pub pos_none: String,
    pub pos_pending: String,
    pub pos_open: String,
    pub icon_close: String,
    pub trades_heading: String,
    pub trades_none: String,

    // --- STATS ---
    pub stats_heading: String,
    pub stats_total: String,
    pub stats_wins: String,
    pub stats_losses: String,
    pub stats_win_rate: String,
    pub stats_total_pnl: String,

    // --- CENTRAL PANEL ---
    pub cp_loading: String,
    pub cp_loading_sub: String,
    pub cp_failed: String,
    pub cp_no_data: String,

    // --- STATUS BAR ---
    pub sb_drawings: String,
    pub sb_selected: String,
    pub sb_ready: String,
}

pub static UI_TEXT: LazyLock<UiText> = LazyLock::new(|| UiText {
    label_symbol: "Symbol".to_string(),
    label_timeframe: "TF:".to_string(),
    label_theme_dark: format!("{} Dark", ICON_MOON),
    label_theme_light: format!("{} Light", ICON_SUN),
    label_practice: "PRACTICE".to_string(),

    icon_undo: ICON_UNDO.to_string(),
    icon_redo: ICON_REDO.to_string(),
    icon_delete: ICON_DELETE.to_string(),
    icon_scissors: ICON_SCISSORS.to_string(),
    tb_undo: "Undo (Ctrl+Z)".to_string(),
    tb_redo: "Redo (Ctrl+Shift+Z)".to_string(),
    tb_delete_selected: "Delete selected drawing (Del)".to_string(),
    tb_remove_last: "Remove last drawing".to_string(),
    tb_clear_all: "Clear all drawings".to_string(),
    tb_scissors: "Cut the chart at a candle and start practising from there".to_string(),
    tb_esc_hint: "Esc to cancel".to_string(),

    rp_heading: "Replay".to_string(),
    rp_start_at: "Start at".to_string(),
    rp_start: format!("{} Start replay", ICON_PLAY),
    rp_stop: format!("{} Stop", ICON_STOP),
    rp_step: "Step".to_string(),
    rp_end_of_data: "End of data".to_string(),
    rp_clear_orders: "Clear orders & trades".to_string(),
    rp_load_older: "Load older candles".to_string(),
    rp_hidden_suffix: "bars hidden".to_string(),
    rp_inactive_hint: "Start a replay or use the scissors to hide the future.".to_string(),

    of_heading: "Quick order".to_string(),
    of_entry: "Entry".to_string(),
    of_sl: "SL".to_string(),
    of_tp: "TP".to_string(),
    of_place: "Place order".to_string(),
    of_entry_hint: "last close".to_string(),

    pos_heading: "Positions".to_string(),
    pos_none: "No open positions".to_string(),
    pos_pending: "PENDING".to_string(),
    pos_open: "OPEN".to_string(),
    icon_close: ICON_CLOSE.to_string(),
    trades_heading: "Completed trades".to_string(),
    trades_none: "No completed trades".to_string(),

    stats_heading: "Stats".to_string(),
    stats_total: "Trades".to_string(),
    stats_wins: "Wins".to_string(),
    stats_losses: "Losses".to_string(),
    stats_win_rate: "Win rate".to_string(),
    stats_total_pnl: "Total PnL".to_string(),

    cp_loading: "Loading data...".to_string(),
    cp_loading_sub: "Fetching candles".to_string(),
    cp_failed: "Could not load data".to_string(),
    cp_no_data: "No candles for this series".to_string(),

    sb_drawings: "Drawings".to_string(),
    sb_selected: "Selected".to_string(),
    sb_ready: "Ready".to_string(),
});
