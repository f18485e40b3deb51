use diagramkit_core::geometry::{Point, Rect};
use diagramkit_designer::Viewport;

#[test]
fn test_viewport_creation() {
    let vp = Viewport::new(1200.0, 800.0);
    assert_eq!(vp.zoom(), 1.0);
    assert_eq!(vp.pan_x(), 0.0);
    assert_eq!(vp.pan_y(), 0.0);
    assert!(!vp.is_autoscrolling());
}

#[test]
fn test_pixel_doc_round_trip_with_zoom_and_pan() {
    let mut vp = Viewport::new(1200.0, 800.0);
    vp.set_zoom(2.0);
    vp.set_pan(100.0, -50.0);

    let doc = vp.pixel_to_doc(300.0, 150.0);
    assert!((doc.x - 100.0).abs() < 1e-9);
    assert!((doc.y - 100.0).abs() < 1e-9);
    let (px, py) = vp.doc_to_pixel(doc);
    assert!((px - 300.0).abs() < 1e-9);
    assert!((py - 150.0).abs() < 1e-9);
}

#[test]
fn test_zoom_limits() {
    let mut vp = Viewport::new(1200.0, 800.0);
    vp.set_zoom(0.01);
    assert_eq!(vp.zoom(), 1.0);
    vp.set_zoom(100.0);
    assert_eq!(vp.zoom(), 1.0);
    vp.set_zoom(4.0);
    assert_eq!(vp.zoom(), 4.0);
}

#[test]
fn test_visible_doc_rect() {
    let mut vp = Viewport::new(1200.0, 800.0);
    vp.set_zoom(2.0);
    vp.set_pan(-200.0, -100.0);
    assert_eq!(vp.visible_doc_rect(), Rect::new(100.0, 50.0, 600.0, 400.0));
}

#[test]
fn test_center_on() {
    let mut vp = Viewport::new(1200.0, 800.0);
    vp.center_on(Point::new(100.0, 100.0));
    let (px, py) = vp.doc_to_pixel(Point::new(100.0, 100.0));
    assert!((px - 600.0).abs() < 1e-9);
    assert!((py - 400.0).abs() < 1e-9);
}

#[test]
fn test_autoscroll_pans_toward_nearby_edges() {
    let mut vp = Viewport::new(1200.0, 800.0);

    assert!(vp.autoscroll_toward(Point::new(5.0, 5.0), 16.0, 8.0));
    assert_eq!((vp.pan_x(), vp.pan_y()), (8.0, 8.0));

    assert!(vp.autoscroll_toward(Point::new(1190.0, 400.0), 16.0, 8.0));
    assert_eq!((vp.pan_x(), vp.pan_y()), (0.0, 8.0));
    assert!(vp.is_autoscrolling());
}

#[test]
fn test_autoscroll_stops_away_from_edges() {
    let mut vp = Viewport::new(1200.0, 800.0);
    vp.autoscroll_toward(Point::new(600.0, 795.0), 16.0, 8.0);
    assert!(vp.is_autoscrolling());

    assert!(!vp.autoscroll_toward(Point::new(600.0, 400.0), 16.0, 8.0));
    assert!(!vp.is_autoscrolling());
    assert_eq!(vp.pan_y(), -8.0);
}

#[test]
fn test_reset() {
    let mut vp = Viewport::new(1200.0, 800.0);
    vp.set_zoom(3.0);
    vp.pan_by(10.0, 20.0);
    vp.autoscroll_toward(Point::new(0.0, 0.0), 16.0, 8.0);
    vp.reset();
    assert_eq!(vp.zoom(), 1.0);
    assert_eq!(vp.pan_x(), 0.0);
    assert!(!vp.is_autoscrolling());
    assert_eq!(vp.to_string(), "Zoom: 1.00x | Pan: (0.0, 0.0)");
}
