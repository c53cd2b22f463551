use image::Rgba;
use paintcore::canvas::{RasterBuffer, Region, WHITE};
use paintcore::error::EditError;
use paintcore::ops::fill::{FillReport, flood_fill};
use pretty_assertions::assert_eq;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn white(w: u32, h: u32) -> RasterBuffer {
    RasterBuffer::new_filled(w, h, WHITE).unwrap()
}

fn count(buf: &RasterBuffer, color: Rgba<u8>) -> usize {
    buf.as_raw().chunks(4).filter(|px| *px == color.0).count()
}

#[test]
fn fills_whole_uniform_canvas() {
    let mut buf = white(4, 4);
    let report = flood_fill(&mut buf, (0, 0), BLACK).unwrap();
    assert_eq!(report, FillReport::Filled { pixels: 16, bounds: Region::new(0, 0, 4, 4) });
    assert_eq!(count(&buf, BLACK), 16);
}

#[test]
fn second_fill_with_same_color_is_unchanged() {
    let mut buf = white(6, 6);
    flood_fill(&mut buf, (2, 2), RED).unwrap();
    let after_first = buf.clone();
    assert_eq!(flood_fill(&mut buf, (2, 2), RED).unwrap(), FillReport::Unchanged);
    assert_eq!(buf, after_first);
}

#[test]
fn stops_at_a_wall() {
    let mut buf = white(5, 5);
    for y in 0..5 {
        buf.put_pixel(2, y, BLACK);
    }
    let report = flood_fill(&mut buf, (0, 0), RED).unwrap();
    assert_eq!(report.pixels(), 10);
    for y in 0..5 {
        assert_eq!(buf.pixel(1, y), Some(RED));
        assert_eq!(buf.pixel(2, y), Some(BLACK));
        assert_eq!(buf.pixel(3, y), Some(WHITE));
    }
}

#[test]
fn flows_around_a_partial_wall() {
    let mut buf = white(5, 5);
    for y in 0..4 {
        buf.put_pixel(2, y, BLACK);
    }
    let report = flood_fill(&mut buf, (0, 0), RED).unwrap();
    assert_eq!(report.pixels(), 21);
    assert_eq!(buf.pixel(4, 0), Some(RED));
    assert_eq!(count(&buf, WHITE), 0);
}

#[test]
fn diagonal_neighbours_are_not_connected() {
    let mut buf = white(3, 3);
    buf.put_pixel(1, 0, BLACK);
    buf.put_pixel(0, 1, BLACK);
    let report = flood_fill(&mut buf, (0, 0), RED).unwrap();
    assert_eq!(report, FillReport::Filled { pixels: 1, bounds: Region::new(0, 0, 1, 1) });
    assert_eq!(buf.pixel(1, 1), Some(WHITE));
}

#[test]
fn match_is_exact_including_alpha() {
    let mut buf = white(4, 1);
    buf.put_pixel(2, 0, Rgba([255, 255, 255, 254]));
    let report = flood_fill(&mut buf, (0, 0), RED).unwrap();
    assert_eq!(report.pixels(), 2);
    assert_eq!(buf.pixel(3, 0), Some(WHITE));
}

#[test]
fn seed_outside_is_an_error() {
    let mut buf = white(4, 4);
    let before = buf.clone();
    assert!(matches!(flood_fill(&mut buf, (-1, 0), RED), Err(EditError::OutOfBounds { .. })));
    assert!(matches!(flood_fill(&mut buf, (0, 4), RED), Err(EditError::OutOfBounds { .. })));
    assert_eq!(buf, before);
}

#[test]
fn large_region_does_not_recurse() {
    let mut buf = white(512, 512);
    let report = flood_fill(&mut buf, (511, 511), BLACK).unwrap();
    assert_eq!(report.pixels(), 512 * 512);
}
