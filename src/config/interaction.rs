//! Pointer interaction thresholds (all values in logical pixels)

pub struct InteractionConfig {
    /// Max distance from a drawing's geometry that still counts as a selection hit
    pub hit_threshold_px: f32,
    /// Capture radius around drawing endpoints. Larger than the body threshold
    /// so endpoints win when both are in range.
    pub handle_radius_px: f32,
    /// Max vertical distance from a position's SL/TP line
    pub position_line_threshold_px: f32,
    /// Radius of the drawn handle circle
    pub handle_draw_radius_px: f32,
    /// Radius of the small endpoint dot on unselected lines
    pub endpoint_dot_radius_px: f32,
    /// Below this horizontal extent a ray is treated as vertical
    pub ray_vertical_epsilon_px: f32,
    /// Oldest undo entries are dropped beyond this depth
    pub history_limit: usize,
}

pub const INTERACTION: InteractionConfig = InteractionConfig {
    hit_threshold_px: 7.0,
    handle_radius_px: 10.0,
    position_line_threshold_px: 10.0,
    handle_draw_radius_px: 6.0,
    endpoint_dot_radius_px: 4.0,
    ray_vertical_epsilon_px: 0.5,
    history_limit: 200,
};
