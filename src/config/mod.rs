//! Configuration module for the replay desk.

// Can all be private now because we have a public re-export.
mod debug;
mod demo;
mod interaction;
mod persistence;
mod replay;
mod theme;
mod types;

// Re-export commonly used items
pub use debug::DF;
pub use demo::DEMO;
pub use interaction::INTERACTION;
pub use persistence::{PERSISTENCE, storage_key};
pub use replay::REPLAY;
pub use theme::OverlayTheme;
pub use types::Timeframe;
