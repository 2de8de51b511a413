//! Render coalescing.
//!
//! State changes only raise a flag. The overlay is rebuilt at most once per
//! UI frame, reading whatever the state is by then.

use std::hash::{Hash, Hasher};

use crate::overlay::frame::OverlayFrame;

#[derive(Debug, Default)]
pub struct RenderScheduler {
    pending: bool,
    requests: u64,
}

impl RenderScheduler {
    pub fn request(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending flag. True at most once per batch of requests.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn total_requests(&self) -> u64 {
        self.requests
    }
}

/// Hash of the values that decide where things land on screen.
pub fn view_hash(rect: [f32; 4], time_range: (f64, f64), price_range: (f64, f64)) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for v in rect {
        v.to_bits().hash(&mut hasher);
    }
    time_range.0.to_bits().hash(&mut hasher);
    time_range.1.to_bits().hash(&mut hasher);
    price_range.0.to_bits().hash(&mut hasher);
    price_range.1.to_bits().hash(&mut hasher);
    hasher.finish()
}

/// Last built overlay frame, reused until a render is requested or the view
/// moves.
#[derive(Default)]
pub struct OverlayView {
    cache: Option<(u64, OverlayFrame)>,
    builds: usize,
    reuses: usize,
}

impl OverlayView {
    pub fn frame(
        &mut self,
        scheduler: &mut RenderScheduler,
        view_hash: u64,
        build: impl FnOnce() -> OverlayFrame,
    ) -> &OverlayFrame {
        let requested = scheduler.take();
        let stale = !matches!(&self.cache, Some((hash, _)) if *hash == view_hash);

        if requested || stale {
            self.builds += 1;
            self.cache = Some((view_hash, build()));
        } else {
            self.reuses += 1;
        }
        &self
            .cache
            .get_or_insert_with(|| (view_hash, OverlayFrame::new()))
            .1
    }

    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn reuses(&self) -> usize {
        self.reuses
    }

    pub fn clear(&mut self) {
        self.cache = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce() {
        let mut s = RenderScheduler::default();
        s.request();
        s.request();
        s.request();
        assert!(s.take());
        assert!(!s.take());
        assert_eq!(s.total_requests(), 3);
    }

    #[test]
    fn test_view_rebuilds_on_request_or_move() {
        let mut s = RenderScheduler::default();
        let mut view = OverlayView::default();
        let a = view_hash([0.0, 0.0, 100.0, 100.0], (0.0, 10.0), (1.0, 2.0));
        let b = view_hash([0.0, 0.0, 100.0, 100.0], (0.0, 20.0), (1.0, 2.0));

        view.frame(&mut s, a, OverlayFrame::new);
        view.frame(&mut s, a, OverlayFrame::new);
        assert_eq!((view.builds(), view.reuses()), (1, 1));

        s.request();
        s.request();
        view.frame(&mut s, a, OverlayFrame::new);
        view.frame(&mut s, a, OverlayFrame::new);
        assert_eq!((view.builds(), view.reuses()), (2, 2));

        view.frame(&mut s, b, OverlayFrame::new);
        assert_eq!(view.builds(), 3);
    }
}
