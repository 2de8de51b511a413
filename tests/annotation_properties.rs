use eframe::egui::{Rect, pos2};
use replay_desk::{
    domain::ChartPoint,
    engine::AnnotationStore,
    models::{Drawing, DrawingPatch, DrawingShape, fib_level_price},
    overlay::{LinearMapper, hit_test_drawing},
};

fn trendline(t1: i64, p1: f64, t2: i64, p2: f64) -> Drawing {
    Drawing::new(DrawingShape::Trendline {
        p1: ChartPoint::new(t1, p1),
        p2: ChartPoint::new(t2, p2),
    })
}

#[test]
fn test_k_undos_restore_then_k_redos_reapply() {
    let mut store = AnnotationStore::new();
    store.add(Drawing::new(DrawingShape::Horizontal { price: 120.0 }));
    let before = store.drawings().to_vec();

    // k = 4 mixed mutations
    let line = store.add(trendline(0, 100.0, 60, 110.0));
    let rect = store.add(Drawing::new(DrawingShape::Rectangle {
        p1: ChartPoint::new(0, 90.0),
        p2: ChartPoint::new(120, 95.0),
    }));
    assert!(store.update(line, &DrawingPatch::color(Some([255, 0, 0, 255]))));
    assert!(store.remove(rect));
    let after = store.drawings().to_vec();

    for _ in 0..4 {
        assert!(store.undo());
    }
    assert_eq!(store.drawings(), before.as_slice());

    for _ in 0..4 {
        assert!(store.redo());
    }
    assert_eq!(store.drawings(), after.as_slice());
    assert!(!store.can_redo());
}

#[test]
fn test_new_mutation_after_undo_drops_redo() {
    let mut store = AnnotationStore::new();
    store.add(trendline(0, 100.0, 60, 110.0));
    store.undo();
    assert!(store.can_redo());

    store.add(Drawing::new(DrawingShape::Horizontal { price: 130.0 }));
    assert!(!store.can_redo());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_horizontal_hit_within_threshold_only() {
    // 5 px per price unit, price 150 sits at y = 250
    let mapper = LinearMapper::new(
        Rect::from_min_max(pos2(0.0, 0.0), pos2(1000.0, 500.0)),
        (0.0, 1000.0),
        (100.0, 200.0),
    );
    let drawing = Drawing::new(DrawingShape::Horizontal { price: 150.0 });
    let id = drawing.id;
    let drawings = vec![drawing];
    let threshold = 7.0;

    assert_eq!(
        hit_test_drawing(&drawings, &mapper, pos2(400.0, 250.0), threshold),
        Some(id)
    );
    assert_eq!(
        hit_test_drawing(&drawings, &mapper, pos2(400.0, 250.0 + threshold), threshold),
        Some(id)
    );
    assert_eq!(
        hit_test_drawing(&drawings, &mapper, pos2(400.0, 250.0 + threshold + 1.0), threshold),
        None
    );
}

#[test]
fn test_fib_level_prices() {
    let fib = Drawing::new(DrawingShape::Fib {
        p1: ChartPoint::new(0, 100.0),
        p2: ChartPoint::new(60, 200.0),
    });
    let levels = match fib.fib_levels() {
        Some(levels) => levels,
        None => panic!("fib drawing has levels"),
    };
    let price_at = |level: f64| {
        levels
            .iter()
            .find(|(l, _)| (*l - level).abs() < 1e-9)
            .map(|(_, p)| *p)
    };

    assert_eq!(price_at(0.0), Some(200.0));
    assert!(price_at(0.236).is_some_and(|p| (p - 176.4).abs() < 1e-9));
    assert_eq!(price_at(0.5), Some(150.0));
    assert_eq!(price_at(1.0), Some(100.0));
    assert!((fib_level_price(100.0, 200.0, 0.618) - 138.2).abs() < 1e-9);
}
