//! File persistence and key/value storage configuration

/// Configuration for Application State Persistence
pub struct AppPersistenceConfig {
    /// Path for saving/loading application UI state
    pub state_path: &'static str,
}

/// Configuration for the per-symbol key/value entries
pub struct StoragePersistenceConfig {
    /// Prefix shared by every key this app writes
    pub key_prefix: &'static str,
    pub drawings_kind: &'static str,
    pub positions_kind: &'static str,
    pub trades_kind: &'static str,
    /// Replay cursor time, so restored orders can keep trading
    pub cut_kind: &'static str,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub app: AppPersistenceConfig,
    pub storage: StoragePersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    app: AppPersistenceConfig {
        state_path: ".replay_desk_state.json",
    },
    storage: StoragePersistenceConfig {
        key_prefix: "replay_desk",
        drawings_kind: "drawings",
        positions_kind: "positions",
        trades_kind: "trades",
        cut_kind: "cut",
    },
};

/// Build a storage key for one (kind x symbol) entry.
/// Example: "replay_desk.drawings.BTCUSDT"
pub fn storage_key(kind: &str, symbol: &str) -> String {
    format!("{}.{}.{}", PERSISTENCE.storage.key_prefix, kind, symbol)
}
