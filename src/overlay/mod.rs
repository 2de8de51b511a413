//! Chart overlay: coordinate mapping, hit-testing and the paint pipeline.

mod frame;
mod geometry;
mod hit_test;
mod layers;
mod mapper;
mod scheduler;

pub use frame::{OverlayFrame, PillAlign, Primitive};
pub use geometry::{fib_band_span, point_to_segment_distance, ray_end};
pub use hit_test::{
    DrawingHit, PositionLineHit, drawing_distance, hit_test_drawing, hit_test_handle,
    hit_test_position_line,
};
pub use layers::{OverlayContext, OverlayLayer, build_overlay};
pub use mapper::{CoordinateMapper, LinearMapper};
pub use scheduler::{OverlayView, RenderScheduler, view_hash};
