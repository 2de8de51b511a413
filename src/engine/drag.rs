//! Pointer drags on drawings and order lines.

use eframe::egui::Pos2;

use crate::{
    config::{DF, INTERACTION},
    domain::ChartPoint,
    engine::{annotations::AnnotationStore, replay::ReplayEngine},
    models::{Drawing, DrawingId, DrawingPatch, Handle},
    overlay::{CoordinateMapper, PositionLineHit, hit_test_handle, hit_test_position_line},
};

/// What the active drag is moving.
#[derive(Debug, Clone, PartialEq)]
pub enum DragTarget {
    PositionLine(PositionLineHit),
    Drawing {
        id: DrawingId,
        handle: Handle,
        /// The drawing as it was on pointer-down.
        original: Drawing,
        /// Domain point under the pointer on pointer-down.
        origin: ChartPoint,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct DragSession {
    target: DragTarget,
    /// The store is snapshotted on the first move that changes something, so
    /// a whole drag undoes as one step and a plain click records nothing.
    checkpointed: bool,
}

#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn target(&self) -> Option<&DragTarget> {
        self.session.as_ref().map(|s| &s.target)
    }

    pub fn dragging_drawing(&self) -> Option<DrawingId> {
        match self.target()? {
            DragTarget::Drawing { id, .. } => Some(*id),
            DragTarget::PositionLine(_) => None,
        }
    }

    pub fn dragging_line(&self) -> Option<PositionLineHit> {
        match self.target()? {
            DragTarget::PositionLine(hit) => Some(*hit),
            DragTarget::Drawing { .. } => None,
        }
    }

    /// Start a drag if the pointer is on an order line or a drawing. Order
    /// lines are checked first.
    pub fn pointer_down(
        &mut self,
        pos: Pos2,
        mapper: &dyn CoordinateMapper,
        store: &AnnotationStore,
        replay: &ReplayEngine,
    ) -> Option<&DragTarget> {
        self.session = None;

        let target = if let Some(hit) = hit_test_position_line(
            replay.positions(),
            mapper,
            pos.y,
            INTERACTION.position_line_threshold_px,
        ) {
            DragTarget::PositionLine(hit)
        } else {
            let hit = hit_test_handle(
                store.drawings(),
                mapper,
                pos,
                INTERACTION.handle_radius_px,
                INTERACTION.hit_threshold_px,
            )?;
            DragTarget::Drawing {
                id: hit.id,
                handle: hit.handle,
                original: store.get(hit.id)?.clone(),
                origin: mapper.point_at(pos)?,
            }
        };

        if DF.log_drag {
            log::info!("Drag start: {:?}", target);
        }
        self.session = Some(DragSession {
            target,
            checkpointed: false,
        });
        self.target()
    }

    /// Apply the pointer position to the drag target. Returns true if
    /// anything changed.
    pub fn pointer_move(
        &mut self,
        pos: Pos2,
        mapper: &dyn CoordinateMapper,
        store: &mut AnnotationStore,
        replay: &mut ReplayEngine,
    ) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        match &session.target {
            DragTarget::PositionLine(hit) => mapper
                .y_to_price(pos.y)
                .is_some_and(|price| replay.update_position(hit.id, hit.field, Some(price))),
            DragTarget::Drawing {
                handle,
                original,
                origin,
                ..
            } => {
                let Some(now) = mapper.point_at(pos) else {
                    return false;
                };
                let mut next = original.clone();
                match handle {
                    Handle::Body => next.translate(now.time - origin.time, now.price - origin.price),
                    Handle::P1 | Handle::P2 => {
                        next.apply(&DrawingPatch::endpoint(*handle, now));
                    }
                }

                if store.get(next.id) == Some(&next) {
                    return false;
                }
                if !session.checkpointed {
                    store.checkpoint();
                    session.checkpointed = true;
                }
                store.replace_live(next)
            }
        }
    }

    /// End the drag wherever the pointer is. Returns the finished target.
    pub fn pointer_up(&mut self) -> Option<DragTarget> {
        let session = self.session.take()?;
        if DF.log_drag {
            log::info!("Drag end (changed: {})", session.checkpointed);
        }
        Some(session.target)
    }
}
