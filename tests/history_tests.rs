use image::Rgba;
use paintcore::canvas::RasterBuffer;
use paintcore::components::history::{DEFAULT_MAX_UNDO_STEPS, HistoryManager};
use pretty_assertions::assert_eq;

// 2x2 buffer tagged with a single value so entries are easy to tell apart.
fn tagged(tag: u8) -> RasterBuffer {
    RasterBuffer::new_filled(2, 2, Rgba([tag, 0, 0, 255])).unwrap()
}

fn tag_of(buf: &RasterBuffer) -> u8 {
    buf.as_raw()[0]
}

#[test]
fn undo_right_after_reset_is_a_no_op() {
    let mut history = HistoryManager::default();
    history.reset(&tagged(0), "New Canvas");
    assert!(!history.can_undo());
    assert_eq!(history.undo_description(), None);
    assert!(history.undo().is_none());
    assert_eq!(history.undo_count(), 1);
}

#[test]
fn undo_then_redo() {
    let mut history = HistoryManager::new(10);
    history.reset(&tagged(0), "New Canvas");
    history.snapshot(&tagged(1), "Line");
    history.snapshot(&tagged(2), "Fill");

    assert_eq!(history.undo_description(), Some("Fill"));
    assert_eq!(history.undo().map(|b| tag_of(&b)), Some(1));
    assert_eq!(history.undo().map(|b| tag_of(&b)), Some(0));
    assert!(history.undo().is_none());

    assert_eq!(history.redo_description(), Some("Line"));
    assert_eq!(history.redo().map(|b| tag_of(&b)), Some(1));
    assert_eq!(history.redo().map(|b| tag_of(&b)), Some(2));
    assert!(history.redo().is_none());
}

#[test]
fn new_snapshot_clears_redo() {
    let mut history = HistoryManager::new(10);
    history.reset(&tagged(0), "New Canvas");
    history.snapshot(&tagged(1), "Line");
    history.undo();
    assert!(history.can_redo());

    history.snapshot(&tagged(5), "Oval");
    assert!(!history.can_redo());
    assert_eq!(history.redo_count(), 0);
    assert_eq!(history.current().map(tag_of), Some(5));
}

#[test]
fn cap_evicts_oldest_first() {
    let mut history = HistoryManager::new(3);
    history.reset(&tagged(0), "New Canvas");
    for tag in 1..=5 {
        history.snapshot(&tagged(tag), format!("Edit {}", tag));
    }
    assert_eq!(history.undo_count(), 3);
    assert_eq!(history.undo_history(), vec!["Edit 5", "Edit 4", "Edit 3"]);

    assert_eq!(history.undo().map(|b| tag_of(&b)), Some(4));
    assert_eq!(history.undo().map(|b| tag_of(&b)), Some(3));
    // Edit 3 is now the oldest retained state.
    assert!(history.undo().is_none());
}

#[test]
fn default_cap_is_twenty_five() {
    let mut history = HistoryManager::default();
    assert_eq!(history.max_history_size(), DEFAULT_MAX_UNDO_STEPS);
    history.reset(&tagged(0), "New Canvas");
    for tag in 1..=40 {
        history.snapshot(&tagged(tag), "Edit");
    }
    assert_eq!(history.undo_count(), 25);
}

#[test]
fn zero_cap_still_keeps_current_state() {
    let mut history = HistoryManager::new(0);
    history.reset(&tagged(0), "New Canvas");
    history.snapshot(&tagged(1), "Edit");
    assert_eq!(history.max_history_size(), 1);
    assert_eq!(history.current().map(tag_of), Some(1));
    assert!(!history.can_undo());
}

#[test]
fn memory_limit_evicts_but_keeps_newest() {
    // Each 2x2 snapshot is 16 bytes.
    let mut history = HistoryManager::new(10).with_memory_limit(40);
    history.reset(&tagged(0), "New Canvas");
    for tag in 1..=4 {
        history.snapshot(&tagged(tag), "Edit");
    }
    assert_eq!(history.undo_count(), 2);
    assert_eq!(history.memory_usage(), 32);

    let mut tiny = HistoryManager::new(10).with_memory_limit(1);
    tiny.reset(&tagged(0), "New Canvas");
    assert_eq!(tiny.undo_count(), 1);
}

#[test]
fn memory_usage_tracks_undo_and_redo() {
    let mut history = HistoryManager::new(10);
    history.reset(&tagged(0), "New Canvas");
    history.snapshot(&tagged(1), "Edit");
    assert_eq!(history.memory_usage(), 32);
    history.undo();
    assert_eq!(history.memory_usage(), 16);
    history.redo();
    assert_eq!(history.memory_usage(), 32);
    history.clear();
    assert_eq!(history.memory_usage(), 0);
    assert_eq!(history.undo_count(), 0);
}
