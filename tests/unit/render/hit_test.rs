use super::*;
use crate::model::element::TextStyle;

// Without fonts the width is 0.55 * size * chars: "abcd" at 20px is 44 x 20.
fn label() -> TextElement {
    TextElement::new(
        "abcd",
        100.0,
        50.0,
        TextStyle {
            font_size: 20.0,
            ..TextStyle::default()
        },
    )
}

#[test]
fn bounds_are_centered_on_position() {
    let mut engine = TextEngine::new();
    let r = text_bounds(&mut engine, &label());
    assert!((r.x0 - 78.0).abs() < 1e-9);
    assert!((r.x1 - 122.0).abs() < 1e-9);
    assert_eq!((r.y0, r.y1), (40.0, 60.0));
}

#[test]
fn point_in_text() {
    let mut engine = TextEngine::new();
    let t = label();
    assert!(is_point_in_text(&mut engine, Point::new(100.0, 50.0), &t));
    assert!(is_point_in_text(&mut engine, Point::new(80.0, 41.0), &t));
    assert!(!is_point_in_text(&mut engine, Point::new(130.0, 50.0), &t));
    assert!(!is_point_in_text(&mut engine, Point::new(100.0, 61.0), &t));
}

#[test]
fn resize_handle_sits_on_bottom_right_corner() {
    let mut engine = TextEngine::new();
    let t = label();
    assert!(is_over_resize_handle(&mut engine, Point::new(122.0, 60.0), &t));
    assert!(is_over_resize_handle(&mut engine, Point::new(118.0, 56.0), &t));
    assert!(!is_over_resize_handle(&mut engine, Point::new(100.0, 50.0), &t));
    assert!(!is_over_resize_handle(&mut engine, Point::new(130.0, 60.0), &t));
}

#[test]
fn edges_count_as_inside() {
    let mut engine = TextEngine::new();
    let t = label();
    let b = text_bounds(&mut engine, &t);
    for corner in [
        Point::new(b.x0, b.y0),
        Point::new(b.x1, b.y0),
        Point::new(b.x0, b.y1),
        Point::new(b.x1, b.y1),
    ] {
        assert!(is_point_in_text(&mut engine, corner, &t), "{corner:?}");
    }
    assert!(!is_point_in_text(&mut engine, Point::new(b.x1 + 1e-6, b.y1), &t));

    let h = resize_handle_rect(&mut engine, &t, RESIZE_HANDLE_PX);
    assert!(is_over_resize_handle(&mut engine, Point::new(h.x1, h.y1), &t));
    assert!(is_over_resize_handle(&mut engine, Point::new(h.x1, h.y0), &t));
    assert!(!is_over_resize_handle(&mut engine, Point::new(h.x1, h.y1 + 1e-6), &t));
}
