mod drawing;
mod position;
mod stats;

pub use {
    drawing::{
        Drawing, DrawingId, DrawingKind, DrawingPatch, DrawingShape, FIB_LEVELS, Handle,
        fib_level_price,
    },
    position::{CompletedTrade, ExitReason, Position, PositionField, PositionId, PositionSide},
    stats::ReplayStats,
};
