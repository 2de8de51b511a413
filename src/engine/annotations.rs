//! Drawing collection with undo/redo.

use crate::{
    config::{DF, INTERACTION},
    models::{Drawing, DrawingId, DrawingPatch},
};

use super::history::History;

/// Ordered drawings for the active series, oldest first. The last element is
/// painted on top.
///
/// Every mutating call that actually changes something snapshots the previous
/// collection first. Calls that would change nothing are silent no-ops and do
/// not touch history.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    drawings: Vec<Drawing>,
    history: History<Vec<Drawing>>,
    revision: u64,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            drawings: Vec::new(),
            history: History::new(INTERACTION.history_limit),
            revision: 0,
        }
    }

    pub fn drawings(&self) -> &[Drawing] {
        &self.drawings
    }

    pub fn get(&self, id: DrawingId) -> Option<&Drawing> {
        self.drawings.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Bumped on every change, including undo/redo and live drag edits.
    /// Persistence compares it against the last saved value.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Snapshot the current collection without changing it. Used once at the
    /// start of a drag so the whole gesture undoes as one step.
    pub fn checkpoint(&mut self) {
        self.history.checkpoint(self.drawings.clone());
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn add(&mut self, drawing: Drawing) -> DrawingId {
        let id = drawing.id;
        self.checkpoint();
        self.drawings.push(drawing);
        self.touch();
        if DF.log_tools {
            log::info!("Added drawing {} ({:?})", id, self.drawings.last().map(Drawing::kind));
        }
        id
    }

    pub fn remove(&mut self, id: DrawingId) -> bool {
        let Some(idx) = self.drawings.iter().position(|d| d.id == id) else {
            return false;
        };
        self.checkpoint();
        self.drawings.remove(idx);
        self.touch();
        true
    }

    pub fn remove_last(&mut self) -> Option<Drawing> {
        if self.drawings.is_empty() {
            return None;
        }
        self.checkpoint();
        let removed = self.drawings.pop();
        self.touch();
        removed
    }

    /// Apply a partial change to one drawing, recording history.
    pub fn update(&mut self, id: DrawingId, patch: &DrawingPatch) -> bool {
        let Some(idx) = self.drawings.iter().position(|d| d.id == id) else {
            return false;
        };
        let mut next = self.drawings[idx].clone();
        if !next.apply(patch) {
            return false;
        }
        self.checkpoint();
        self.drawings[idx] = next;
        self.touch();
        true
    }

    /// Overwrite the drawing with the same id, without recording history.
    pub fn replace_live(&mut self, drawing: Drawing) -> bool {
        let Some(slot) = self.drawings.iter_mut().find(|d| d.id == drawing.id) else {
            return false;
        };
        if *slot == drawing {
            return false;
        }
        *slot = drawing;
        self.touch();
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.drawings.is_empty() {
            return false;
        }
        self.checkpoint();
        self.drawings.clear();
        self.touch();
        true
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.drawings);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.drawings);
        if changed {
            self.touch();
        }
        changed
    }

    /// Replace everything with another series' drawings. History belongs to
    /// the previous series and is discarded.
    pub fn load(&mut self, drawings: Vec<Drawing>) {
        self.drawings = drawings;
        self.history.reset();
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ChartPoint,
        models::{DrawingShape, Handle},
    };

    fn horizontal(price: f64) -> Drawing {
        Drawing::new(DrawingShape::Horizontal { price })
    }

    fn trend() -> Drawing {
        Drawing::new(DrawingShape::Trendline {
            p1: ChartPoint::new(0, 1.0),
            p2: ChartPoint::new(60, 2.0),
        })
    }

    #[test]
    fn test_add_and_undo_redo() {
        let mut store = AnnotationStore::new();
        let a = store.add(horizontal(1.0));
        let b = store.add(horizontal(2.0));
        assert_eq!(store.len(), 2);

        assert!(store.undo());
        assert!(store.get(b).is_none());
        assert!(store.undo());
        assert!(store.is_empty());
        assert!(!store.undo());

        assert!(store.redo());
        assert!(store.get(a).is_some());
        assert!(store.redo());
        assert_eq!(store.len(), 2);
        assert!(!store.redo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut store = AnnotationStore::new();
        store.add(horizontal(1.0));
        store.undo();
        assert!(store.can_redo());
        store.add(horizontal(3.0));
        assert!(!store.can_redo());
    }

    #[test]
    fn test_noop_mutations_skip_history() {
        let mut store = AnnotationStore::new();
        assert!(!store.remove(DrawingId::new()));
        assert!(store.remove_last().is_none());
        assert!(!store.clear());
        assert!(!store.can_undo());

        let id = store.add(horizontal(5.0));
        let before = store.revision();
        assert!(!store.update(id, &DrawingPatch::price(5.0)));
        assert_eq!(store.revision(), before);
        assert!(store.undo());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_update_endpoint() {
        let mut store = AnnotationStore::new();
        let id = store.add(trend());
        let moved = ChartPoint::new(120, 3.0);
        assert!(store.update(id, &DrawingPatch::endpoint(Handle::P2, moved)));
        assert_eq!(store.get(id).and_then(|d| d.endpoints()).map(|(_, p2)| p2), Some(moved));
        assert!(store.undo());
        assert_eq!(
            store.get(id).and_then(|d| d.endpoints()).map(|(_, p2)| p2),
            Some(ChartPoint::new(60, 2.0))
        );
    }

    #[test]
    fn test_live_edits_share_one_checkpoint() {
        let mut store = AnnotationStore::new();
        let id = store.add(horizontal(10.0));
        let original = store.drawings().to_vec();

        store.checkpoint();
        for price in [11.0, 12.0] {
            let mut next = store.get(id).cloned().expect("drawing exists");
            assert!(next.apply(&DrawingPatch::price(price)));
            assert!(store.replace_live(next));
        }
        assert_eq!(store.drawings()[0].shape, DrawingShape::Horizontal { price: 12.0 });
        assert!(store.undo());
        assert_eq!(store.drawings(), original.as_slice());
    }

    #[test]
    fn test_load_resets_history() {
        let mut store = AnnotationStore::new();
        store.add(horizontal(1.0));
        store.load(vec![trend()]);
        assert_eq!(store.len(), 1);
        assert!(!store.can_undo());
    }
}
