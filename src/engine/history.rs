//! Linear undo/redo over full snapshots.

use std::collections::VecDeque;

/// Undo/redo stacks of prior values. A new checkpoint clears the redo side,
/// so history never branches.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo: VecDeque<T>,
    redo: Vec<T>,
    limit: usize,
}

impl<T> History<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record `snapshot` as the state to return to on the next undo.
    pub fn checkpoint(&mut self, snapshot: T) {
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
        self.redo.clear();
    }

    /// Swap `current` with the most recent undo snapshot. False when there is
    /// nothing to undo, leaving `current` untouched.
    pub fn undo(&mut self, current: &mut T) -> bool {
        let Some(prev) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(std::mem::replace(current, prev));
        true
    }

    pub fn redo(&mut self, current: &mut T) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push_back(std::mem::replace(current, next));
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_swaps_values() {
        let mut h = History::new(10);
        let mut v = 1;
        h.checkpoint(v);
        v = 2;
        h.checkpoint(v);
        v = 3;

        assert!(h.undo(&mut v));
        assert_eq!(v, 2);
        assert!(h.undo(&mut v));
        assert_eq!(v, 1);
        assert!(!h.undo(&mut v));
        assert_eq!(v, 1);

        assert!(h.redo(&mut v));
        assert!(h.redo(&mut v));
        assert_eq!(v, 3);
        assert!(!h.redo(&mut v));
    }

    #[test]
    fn test_checkpoint_clears_redo() {
        let mut h = History::new(10);
        let mut v = "b";
        h.checkpoint("a");
        assert!(h.undo(&mut v));
        assert!(h.can_redo());
        h.checkpoint(v);
        assert!(!h.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut h = History::new(2);
        h.checkpoint(1);
        h.checkpoint(2);
        h.checkpoint(3);
        let mut v = 4;
        assert!(h.undo(&mut v));
        assert!(h.undo(&mut v));
        assert_eq!(v, 2);
        assert!(!h.undo(&mut v));
    }

    #[test]
    fn test_limit_holds_across_long_runs() {
        let mut h = History::new(3);
        for i in 0..1_000 {
            h.checkpoint(i);
        }
        let mut v = 1_000;
        let mut undone = Vec::new();
        while h.undo(&mut v) {
            undone.push(v);
        }
        assert_eq!(undone, vec![999, 998, 997]);
        while h.redo(&mut v) {}
        assert_eq!(v, 1_000);
        assert!(h.can_undo());
    }
}
