//! Debugging feature flags.

#[allow(dead_code)]
pub struct LogFlags {
    /// Replay cursor movement, fills and SL/TP exits.
    pub log_replay: bool,

    /// Tool selection, click collection and completion.
    pub log_tools: bool,

    /// Drag session start/stop and the hit that started it.
    pub log_drag: bool,

    /// Key/value store loads, saves and suppressed saves.
    pub log_persistence: bool,

    /// Activate trace_time macro (for cool scope-level timing)
    pub log_performance: bool,

    /// Market data fetches and pagination.
    pub log_data: bool,

    /// Anything about the selected / hovered drawing
    pub log_selection: bool,
}

pub const DF: LogFlags = LogFlags {
    log_replay: true,
    log_tools: false,
    log_drag: false,
    log_persistence: false,
    log_performance: false,
    log_data: true,
    log_selection: false,
};
