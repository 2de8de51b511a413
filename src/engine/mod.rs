mod annotations;
mod drag;
mod history;
mod replay;
mod session;
mod tools;

pub use {
    annotations::AnnotationStore,
    drag::{DragController, DragTarget},
    history::History,
    replay::{ReplayEngine, StepOutcome},
    session::ChartSession,
    tools::{PlacementRequest, PositionPreview, ToolInput, ToolKind, ToolOutcome, ToolPreview},
};
