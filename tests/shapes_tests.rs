use image::Rgba;
use paintcore::canvas::{RasterBuffer, WHITE};
use paintcore::error::EditError;
use paintcore::ops::shapes::{
    CompositeMode, DrawStyle, Shape, arrow_head, clamp_corner_radius, composite_pixel, draw_shape,
};
use pretty_assertions::assert_eq;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn white(w: u32, h: u32) -> RasterBuffer {
    RasterBuffer::new_filled(w, h, WHITE).unwrap()
}

fn red(width: f32) -> DrawStyle {
    DrawStyle::new(RED, width)
}

#[test]
fn horizontal_line_covers_its_row_only() {
    let mut buf = white(20, 10);
    let drew = draw_shape(&mut buf, &Shape::Line { from: (2.0, 5.0), to: (12.0, 5.0) }, &red(1.0)).unwrap();
    assert!(drew);
    assert_eq!(buf.pixel(7, 5), Some(RED));
    assert_eq!(buf.pixel(2, 5), Some(RED));
    assert_eq!(buf.pixel(7, 7), Some(WHITE));
    assert_eq!(buf.pixel(15, 5), Some(WHITE));
}

#[test]
fn outline_rect_leaves_interior() {
    let mut buf = white(12, 12);
    draw_shape(&mut buf, &Shape::Rectangle { from: (8.0, 8.0), to: (2.0, 2.0), filled: false }, &red(1.0)).unwrap();
    assert_eq!(buf.pixel(2, 5), Some(RED));
    assert_eq!(buf.pixel(8, 8), Some(RED));
    assert_eq!(buf.pixel(5, 5), Some(WHITE));
    assert_eq!(buf.pixel(10, 10), Some(WHITE));
}

#[test]
fn filled_rect_covers_interior() {
    let mut buf = white(12, 12);
    draw_shape(&mut buf, &Shape::Rectangle { from: (2.0, 2.0), to: (8.0, 8.0), filled: true }, &red(1.0)).unwrap();
    assert_eq!(buf.pixel(5, 5), Some(RED));
    assert_eq!(buf.pixel(11, 11), Some(WHITE));
}

#[test]
fn corner_radius_is_clamped_to_half_the_short_side() {
    assert_eq!(clamp_corner_radius(10.0, 4.0, 5.0), 2.0);
    assert_eq!(clamp_corner_radius(10.0, 20.0, 3.0), 3.0);
    assert_eq!(clamp_corner_radius(-10.0, 6.0, 50.0), 3.0);
    assert_eq!(clamp_corner_radius(10.0, 4.0, -1.0), 0.0);
}

#[test]
fn rounded_rect_with_huge_radius_still_draws() {
    let mut buf = white(20, 20);
    let shape = Shape::RoundedRect { from: (2.0, 2.0), to: (18.0, 10.0), radius: 1000.0, filled: true };
    assert!(draw_shape(&mut buf, &shape, &red(1.0)).unwrap());
    assert_eq!(buf.pixel(10, 6), Some(RED));
    // Corner is rounded away.
    assert_eq!(buf.pixel(2, 2), Some(WHITE));
}

#[test]
fn filled_oval_covers_centre_not_corners() {
    let mut buf = white(20, 20);
    draw_shape(&mut buf, &Shape::Oval { from: (0.0, 0.0), to: (18.0, 10.0), filled: true }, &red(1.0)).unwrap();
    assert_eq!(buf.pixel(9, 5), Some(RED));
    assert_eq!(buf.pixel(0, 0), Some(WHITE));
}

#[test]
fn zero_radius_oval_draws_nothing() {
    let mut buf = white(10, 10);
    let before = buf.clone();
    let drew = draw_shape(&mut buf, &Shape::Oval { from: (3.0, 3.0), to: (3.0, 8.0), filled: true }, &red(2.0)).unwrap();
    assert!(!drew);
    assert_eq!(buf, before);
}

#[test]
fn arrow_head_geometry() {
    let head = arrow_head((0.0, 0.0), (20.0, 0.0), 2.0);
    assert_eq!(head[0], (20.0, 0.0));
    for back in &head[1..] {
        let len = ((back.0 - 20.0).powi(2) + back.1.powi(2)).sqrt();
        assert!((len - 12.0).abs() < 1e-4, "head length {}", len);
        assert!((back.1.abs() - 6.0).abs() < 1e-4);
    }
}

#[test]
fn arrow_fills_its_head() {
    let mut buf = white(30, 20);
    draw_shape(&mut buf, &Shape::Arrow { from: (0.0, 10.0), to: (20.0, 10.0) }, &red(2.0)).unwrap();
    // Two pixels off the shaft, inside the head triangle.
    assert_eq!(buf.pixel(15, 12), Some(RED));
    // Same offset near the tail is outside both shaft and head.
    assert_eq!(buf.pixel(3, 12), Some(WHITE));
}

#[test]
fn empty_polygon_is_an_error_and_leaves_buffer() {
    let mut buf = white(8, 8);
    let before = buf.clone();
    let shape = Shape::Polygon { vertices: vec![], closed: true, filled: true };
    assert_eq!(draw_shape(&mut buf, &shape, &red(1.0)), Err(EditError::EmptyPolygon));
    assert_eq!(buf, before);
}

#[test]
fn single_vertex_polygon_is_a_no_op() {
    let mut buf = white(8, 8);
    let before = buf.clone();
    let shape = Shape::Polygon { vertices: vec![(3.0, 3.0)], closed: true, filled: true };
    assert_eq!(draw_shape(&mut buf, &shape, &red(1.0)), Ok(false));
    assert_eq!(buf, before);
}

#[test]
fn open_polygon_never_fills() {
    let vertices = vec![(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)];

    let mut closed = white(12, 12);
    draw_shape(&mut closed, &Shape::Polygon { vertices: vertices.clone(), closed: true, filled: true }, &red(1.0))
        .unwrap();
    assert_eq!(closed.pixel(3, 3), Some(RED));

    let mut open = white(12, 12);
    draw_shape(&mut open, &Shape::Polygon { vertices, closed: false, filled: true }, &red(1.0)).unwrap();
    assert_eq!(open.pixel(3, 3), Some(WHITE));
    assert_eq!(open.pixel(5, 0), Some(RED));
}

#[test]
fn invalid_style_or_points_are_rejected() {
    let mut buf = white(8, 8);
    let before = buf.clone();
    let line = Shape::Line { from: (0.0, 0.0), to: (5.0, 5.0) };
    assert!(matches!(draw_shape(&mut buf, &line, &red(0.0)), Err(EditError::InvalidGeometry(_))));
    assert!(matches!(
        draw_shape(&mut buf, &line, &red(1.0).with_opacity(1.5)),
        Err(EditError::InvalidGeometry(_))
    ));
    let nan = Shape::Line { from: (f32::NAN, 0.0), to: (5.0, 5.0) };
    assert!(matches!(draw_shape(&mut buf, &nan, &red(1.0)), Err(EditError::InvalidGeometry(_))));
    assert_eq!(buf, before);
}

#[test]
fn shapes_are_clipped_to_the_canvas() {
    let mut buf = white(10, 10);
    draw_shape(&mut buf, &Shape::Line { from: (-10.0, -10.0), to: (50.0, 50.0) }, &red(1.0)).unwrap();
    assert_eq!(buf.pixel(5, 5), Some(RED));
    assert_eq!(buf.pixel(0, 9), Some(WHITE));
}

#[test]
fn freehand_single_point_is_a_dot() {
    let mut buf = white(10, 10);
    draw_shape(&mut buf, &Shape::Freehand { points: vec![(5.0, 5.0)] }, &red(3.0)).unwrap();
    assert_eq!(buf.pixel(5, 5), Some(RED));
    assert_eq!(buf.pixel(6, 5), Some(RED));
    assert_eq!(buf.pixel(8, 5), Some(WHITE));
}

#[test]
fn eraser_clears_to_transparent() {
    let mut buf = RasterBuffer::new_filled(10, 10, RED).unwrap();
    let style = DrawStyle::new(Rgba([0, 0, 0, 255]), 1.0).with_composite(CompositeMode::Erase);
    draw_shape(&mut buf, &Shape::Rectangle { from: (2.0, 2.0), to: (6.0, 6.0), filled: true }, &style).unwrap();
    assert_eq!(buf.pixel(4, 4), Some(Rgba([0, 0, 0, 0])));
    assert_eq!(buf.pixel(8, 8), Some(RED));
}

#[test]
fn translucent_paint_blends_source_over() {
    let mut px = [255, 255, 255, 255];
    composite_pixel(&mut px, Rgba([0, 0, 0, 255]), 0.5, CompositeMode::Normal);
    assert_eq!(px, [128, 128, 128, 255]);

    let mut px = [10, 20, 30, 200];
    composite_pixel(&mut px, Rgba([0, 0, 0, 255]), 0.5, CompositeMode::Erase);
    assert_eq!(px, [10, 20, 30, 100]);

    let mut px = [10, 20, 30, 200];
    composite_pixel(&mut px, RED, 1.0, CompositeMode::Normal);
    assert_eq!(px, [255, 0, 0, 255]);
}
