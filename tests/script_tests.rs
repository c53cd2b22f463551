use image::Rgba;
use paintcore::canvas::WHITE;
use paintcore::error::{EditError, Notice, Outcome};
use paintcore::ops::script::{ScriptError, run_script};
use paintcore::session::EditorSession;
use paintcore::settings::EditorSettings;
use pretty_assertions::assert_eq;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn create_session(width: u32, height: u32) -> EditorSession {
    EditorSession::new(EditorSettings { canvas_width: width, canvas_height: height, ..EditorSettings::default() })
        .unwrap()
}

#[test]
fn draws_with_pen_state() {
    let mut session = create_session(20, 20);
    let script = "\
# a red box and a blue dot
color red
width 1
rect 2 2 6 6 filled
color #0000ff
stroke 15 15
";
    let outcomes = run_script(&mut session, script).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(session.buffer().pixel(4, 4), Some(RED));
    assert_eq!(session.buffer().pixel(15, 15), Some(Rgba([0, 0, 255, 255])));
    assert_eq!(session.history().undo_count(), 3);
}

#[test]
fn select_move_commit() {
    let mut session = create_session(12, 12);
    let script = "\
fill 0 0 red
select 0 0 4 4
move 1 1 6 6
commit
";
    run_script(&mut session, script).unwrap();
    let buf = session.buffer();
    assert_eq!(buf.pixel(0, 0), Some(WHITE));
    assert_eq!(buf.pixel(5, 5), Some(RED));
    assert_eq!(buf.pixel(8, 8), Some(RED));
    assert_eq!(buf.pixel(9, 9), Some(RED));
    assert_eq!(session.history().undo_description(), Some("Place Selection"));
}

#[test]
fn notices_are_not_errors() {
    let mut session = create_session(8, 8);
    let outcomes = run_script(&mut session, "undo\ncrop-image\npaste\n").unwrap();
    assert_eq!(
        outcomes,
        vec![
            Outcome::Unchanged(Notice::NothingToUndo),
            Outcome::Unchanged(Notice::NothingToCrop),
            Outcome::Unchanged(Notice::NothingToPaste),
        ]
    );
}

#[test]
fn runtime_errors_report_their_line() {
    let mut session = create_session(8, 8);
    let err = run_script(&mut session, "color red\nfill 1 1\n\nfill 100 1\nclear\n").unwrap_err();
    assert_eq!(err.line(), 4);
    assert!(matches!(err, ScriptError::Edit { source: EditError::OutOfBounds { .. }, .. }));
    // Lines before the failure stay applied; the ones after never run.
    assert_eq!(session.buffer().pixel(1, 1), Some(RED));
}

#[test]
fn syntax_errors_run_nothing() {
    let mut session = create_session(8, 8);
    let err = run_script(&mut session, "fill 1 1 red\nrect 1 2\n").unwrap_err();
    assert!(matches!(err, ScriptError::Syntax { line: 2, .. }));
    assert_eq!(session.buffer().pixel(1, 1), Some(WHITE));
}

#[test]
fn canvas_lines() {
    let mut session = create_session(8, 8);
    run_script(&mut session, "new 30 10\nresize 15 5\n").unwrap();
    assert_eq!((session.buffer().width(), session.buffer().height()), (15, 5));
    run_script(&mut session, "undo\nundo").unwrap();
    assert_eq!((session.buffer().width(), session.buffer().height()), (8, 8));
}

#[test]
fn moving_to_the_coordinate_limit_does_not_overflow() {
    let mut session = create_session(8, 8);
    let outcomes = run_script(&mut session, "fill 0 0 red\nselectall\nmove 5 5 -2147483648 0\ncommit\n").unwrap();
    assert!(outcomes.iter().all(Outcome::is_applied));
    // The image was dropped far off-canvas, leaving the cleared background.
    assert!(session.buffer().as_raw().chunks(4).all(|px| px == WHITE.0));
    assert_eq!(session.selection().last_placed_rect().map(|r| r.x), Some(i32::MIN));
}

#[test]
fn text_line_reports_a_missing_font() {
    let settings = EditorSettings {
        canvas_width: 20,
        canvas_height: 20,
        font_path: Some(std::env::temp_dir().join("paintcore-no-such-font.ttf")),
        ..EditorSettings::default()
    };
    let mut session = EditorSession::new(settings).unwrap();
    let err = run_script(&mut session, "size 18\ntext 1 1 Hello\n").unwrap_err();
    assert_eq!(err.line(), 2);
    assert!(matches!(err, ScriptError::Edit { source: EditError::FontUnavailable(_), .. }));
    assert!(!session.history().can_undo());
}
