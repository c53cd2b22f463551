use image::Rgba;
use paintcore::canvas::{MAX_CANVAS_DIM, RasterBuffer, Region, WHITE};
use paintcore::error::EditError;
use pretty_assertions::assert_eq;

// Every pixel encodes its own coordinates so misplaced copies show up.
fn pattern(width: u32, height: u32) -> RasterBuffer {
    let mut buf = RasterBuffer::new_filled(width, height, WHITE).unwrap();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            buf.put_pixel(x, y, Rgba([x as u8, y as u8, 7, 255]));
        }
    }
    buf
}

#[test]
fn new_buffer_is_filled() {
    let buf = RasterBuffer::new_filled(3, 2, Rgba([1, 2, 3, 4])).unwrap();
    assert_eq!((buf.width(), buf.height()), (3, 2));
    assert_eq!(buf.as_raw().len(), 3 * 2 * 4);
    assert!(buf.as_raw().chunks(4).all(|px| px == [1, 2, 3, 4]));
}

#[test]
fn zero_or_oversized_dimensions_are_rejected() {
    assert!(matches!(RasterBuffer::new_filled(0, 5, WHITE), Err(EditError::InvalidGeometry(_))));
    assert!(matches!(RasterBuffer::new_filled(5, 0, WHITE), Err(EditError::InvalidGeometry(_))));
    assert!(matches!(
        RasterBuffer::new_filled(MAX_CANVAS_DIM + 1, 1, WHITE),
        Err(EditError::InvalidGeometry(_))
    ));
}

#[test]
fn from_raw_checks_length() {
    assert!(RasterBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
    assert!(matches!(RasterBuffer::from_raw(2, 2, vec![0; 15]), Err(EditError::InvalidGeometry(_))));
}

#[test]
fn pixel_reads_outside_are_none() {
    let buf = pattern(4, 4);
    assert_eq!(buf.pixel(3, 2), Some(Rgba([3, 2, 7, 255])));
    assert_eq!(buf.pixel(4, 0), None);
    assert_eq!(buf.pixel(-1, 0), None);
}

#[test]
fn get_then_put_region_is_identity() {
    let original = pattern(8, 6);
    let region = original.get_region(2, 1, 3, 4).unwrap();
    assert_eq!((region.width(), region.height()), (3, 4));
    assert_eq!(region.pixel(0, 0), Some(Rgba([2, 1, 7, 255])));

    let mut copy = original.clone();
    copy.fill_rect(2, 1, 3, 4, Rgba([0, 0, 0, 0]));
    assert_ne!(copy, original);
    copy.put_region(&region, 2, 1);
    assert_eq!(copy, original);
}

#[test]
fn get_region_rejects_out_of_bounds_before_reading() {
    let buf = pattern(5, 5);
    assert_eq!(
        buf.get_region(3, 3, 3, 1).unwrap_err(),
        EditError::OutOfBounds { x: 3, y: 3, width: 3, height: 1, buffer_width: 5, buffer_height: 5 }
    );
    assert!(matches!(buf.get_region(-1, 0, 2, 2), Err(EditError::OutOfBounds { .. })));
    assert!(matches!(buf.get_region(0, 0, 0, 2), Err(EditError::InvalidGeometry(_))));
}

#[test]
fn put_region_clips_to_buffer() {
    let mut dst = RasterBuffer::new_filled(4, 4, WHITE).unwrap();
    let src = RasterBuffer::new_filled(3, 3, Rgba([9, 9, 9, 255])).unwrap();

    let written = dst.put_region(&src, -1, 2);
    assert_eq!(written, Some(Region::new(0, 2, 2, 2)));
    assert_eq!(dst.pixel(0, 2), Some(Rgba([9, 9, 9, 255])));
    assert_eq!(dst.pixel(1, 3), Some(Rgba([9, 9, 9, 255])));
    assert_eq!(dst.pixel(2, 2), Some(WHITE));
    assert_eq!(dst.pixel(0, 1), Some(WHITE));

    assert_eq!(dst.put_region(&src, 10, 10), None);
}

#[test]
fn resized_keeps_top_left_overlap() {
    let buf = pattern(4, 4);
    let bigger = buf.resized(6, 3, Rgba([1, 1, 1, 255])).unwrap();
    assert_eq!((bigger.width(), bigger.height()), (6, 3));
    assert_eq!(bigger.pixel(3, 2), Some(Rgba([3, 2, 7, 255])));
    assert_eq!(bigger.pixel(5, 0), Some(Rgba([1, 1, 1, 255])));
    assert!(buf.resized(0, 3, WHITE).is_err());
}

#[test]
fn region_geometry() {
    let r = Region::from_corners((5, 7), (2, 3));
    assert_eq!(r, Region::new(2, 3, 3, 4));
    assert!(r.contains(2, 3));
    assert!(!r.contains(5, 3));
    assert!(Region::from_corners((4, 4), (4, 9)).is_empty());

    let bounds = Region::new(0, 0, 4, 4);
    assert_eq!(Region::new(-2, 1, 4, 10).intersect(&bounds), Some(Region::new(0, 1, 2, 3)));
    assert_eq!(Region::new(4, 0, 2, 2).intersect(&bounds), None);
}
