// ============================================================================
// COMMAND SCRIPTS: line-based batch language compiled to session commands
// ============================================================================
//
//   # red outline, then a filled yellow oval
//   color red
//   width 4
//   rect 10 10 120 80
//   color #ffd700
//   oval 30 20 90 60 filled
//   select 0 0 64 64
//   move 10 10 200 150
//   commit
//
// Coordinates are integers or decimals.  State lines (`color`, `swap`,
// `width`, `opacity`, `size`, `tool`) change the style used by every drawing
// line after them.  `swap` exchanges the primary color with the secondary,
// which starts out white.
//
//   size 24
//   text 12 8 Hello, World
//
// Everything after a keyword is matched case-insensitively except the
// message of a `text` line, which is kept as written.

use thiserror::Error;

use crate::command::Command;
use crate::components::colors::{ColorPair, parse_color};
use crate::components::tools::ToolKind;
use crate::error::{EditError, Outcome};
use crate::ops::shapes::{DrawStyle, Point, Shape};
use crate::session::EditorSession;
use crate::settings::EditorSettings;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: {source}")]
    Edit {
        line: usize,
        #[source]
        source: EditError,
    },
}

impl ScriptError {
    pub fn line(&self) -> usize {
        match self {
            ScriptError::Syntax { line, .. } | ScriptError::Edit { line, .. } => *line,
        }
    }
}

/// One parsed command with the 1-based line it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptStep {
    pub line: usize,
    pub command: Command,
}

/// Style state carried from line to line.
struct PenState {
    colors: ColorPair,
    width: f32,
    opacity: Option<f32>,
    font_size: f32,
    tool: ToolKind,
}

impl PenState {
    fn new(settings: &EditorSettings) -> Self {
        Self {
            colors: ColorPair::default(),
            width: settings.stroke_width,
            opacity: None,
            font_size: settings.font_size,
            tool: ToolKind::Pencil,
        }
    }

    fn style(&self, settings: &EditorSettings) -> DrawStyle {
        let style = self.tool.style(self.colors.primary, self.width, settings);
        match self.opacity {
            Some(o) => style.with_opacity(o),
            None => style,
        }
    }
}

/// Parse a whole script.  Nothing is executed; the first bad line aborts.
pub fn parse_script(source: &str, settings: &EditorSettings) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut pen = PenState::new(settings);
    let mut steps = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let text = strip_comment(raw).trim();
        if text.is_empty() {
            continue;
        }
        let (keyword, rest) = next_word(text);
        let keyword = keyword.to_ascii_lowercase();
        let lowered = rest.to_ascii_lowercase();
        let args: Vec<&str> = lowered.split_whitespace().collect();
        let err = |message: String| ScriptError::Syntax { line, message };

        let commands = parse_line(&keyword, &args, rest, &mut pen, settings).map_err(err)?;
        steps.extend(commands.into_iter().map(|command| ScriptStep { line, command }));
    }

    Ok(steps)
}

/// Parse and run a script against `session`.  Stops at the first failing
/// command; everything before it stays applied.
pub fn run_script(session: &mut EditorSession, source: &str) -> Result<Vec<Outcome>, ScriptError> {
    let steps = parse_script(source, session.settings())?;
    log::info!("script: {} commands", steps.len());

    let mut outcomes = Vec::with_capacity(steps.len());
    for step in steps {
        let outcome = session
            .apply(step.command)
            .map_err(|source| ScriptError::Edit { line: step.line, source })?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn parse_line(
    keyword: &str,
    args: &[&str],
    raw_args: &str,
    pen: &mut PenState,
    settings: &EditorSettings,
) -> Result<Vec<Command>, String> {
    let draw = |shape: Shape, pen: &PenState| vec![Command::Draw { shape, style: pen.style(settings) }];

    let cmds = match keyword {
        // ---- pen state ----
        "color" => {
            let [name] = exact::<1>(keyword, args)?;
            pen.colors.primary = parse_color(name).ok_or_else(|| format!("unknown color '{}'", name))?;
            Vec::new()
        }
        "swap" => {
            exact::<0>(keyword, args)?;
            pen.colors.swap();
            Vec::new()
        }
        "width" => {
            let [w] = exact::<1>(keyword, args)?;
            pen.width = number(w)?;
            Vec::new()
        }
        "opacity" => {
            let [o] = exact::<1>(keyword, args)?;
            pen.opacity = Some(number(o)?);
            Vec::new()
        }
        "size" => {
            let [size] = exact::<1>(keyword, args)?;
            pen.font_size = number(size)?;
            Vec::new()
        }
        "tool" => {
            let [name] = exact::<1>(keyword, args)?;
            pen.tool = ToolKind::from_name(name).ok_or_else(|| format!("unknown tool '{}'", name))?;
            pen.opacity = None;
            Vec::new()
        }

        // ---- drawing ----
        "line" => {
            let (from, to, _) = two_points(keyword, args, &[])?;
            draw(Shape::Line { from, to }, &*pen)
        }
        "arrow" => {
            let (from, to, _) = two_points(keyword, args, &[])?;
            draw(Shape::Arrow { from, to }, &*pen)
        }
        "rect" => {
            let (from, to, flags) = two_points(keyword, args, &["filled"])?;
            draw(Shape::Rectangle { from, to, filled: flags.contains(&"filled") }, &*pen)
        }
        "oval" => {
            let (from, to, flags) = two_points(keyword, args, &["filled"])?;
            draw(Shape::Oval { from, to, filled: flags.contains(&"filled") }, &*pen)
        }
        "rrect" => {
            let (nums, flags) = split_flags(args, &["filled"]);
            let radius = match nums.len() {
                4 => settings.corner_radius,
                5 => number(nums[4])?,
                _ => return Err(format!("'{}' takes x1 y1 x2 y2 [radius] [filled]", keyword)),
            };
            let pts = points(&nums[..4])?;
            draw(
                Shape::RoundedRect { from: pts[0], to: pts[1], radius, filled: flags.contains(&"filled") },
                &*pen,
            )
        }
        "polygon" => {
            let (nums, flags) = split_flags(args, &["open", "filled"]);
            let vertices = points(&nums)?;
            draw(
                Shape::Polygon {
                    vertices,
                    closed: !flags.contains(&"open"),
                    filled: flags.contains(&"filled"),
                },
                &*pen,
            )
        }
        "stroke" => {
            let points = points(args)?;
            draw(Shape::Freehand { points }, &*pen)
        }
        "fill" => {
            let (x, y, color) = match args {
                [x, y] => (integer(x)?, integer(y)?, pen.colors.primary),
                [x, y, c] => (
                    integer(x)?,
                    integer(y)?,
                    parse_color(c).ok_or_else(|| format!("unknown color '{}'", c))?,
                ),
                _ => return Err("'fill' takes x y [color]".to_string()),
            };
            vec![Command::Fill { x, y, color }]
        }
        "text" => {
            let (x, after) = next_word(raw_args);
            let (y, message) = next_word(after);
            if message.is_empty() {
                return Err("'text' takes x y message".to_string());
            }
            vec![Command::Text {
                at: (number(x)?, number(y)?),
                text: message.to_string(),
                size: pen.font_size,
                style: pen.style(settings),
            }]
        }
        "drag" => {
            let (from, to, _) = two_points(keyword, args, &[])?;
            drag_with_tool(pen, from, to, settings)?
        }

        // ---- selection ----
        // `select` drags a marquee; `move` grabs the floating image at the
        // first point and drops it at the second.
        "select" | "move" => {
            let [x1, y1, x2, y2] = ints::<4>(keyword, args)?;
            pointer_drag((x1, y1), (x2, y2))
        }
        "selectall" => no_args(keyword, args, Command::SelectAll)?,
        "commit" => no_args(keyword, args, Command::Commit)?,
        "cancel" => no_args(keyword, args, Command::Cancel)?,
        "crop-selection" => no_args(keyword, args, Command::CropToSelection)?,
        "crop-image" => no_args(keyword, args, Command::CropToImageSize)?,

        // ---- clipboard / history ----
        "copy" => no_args(keyword, args, Command::Copy)?,
        "paste" => no_args(keyword, args, Command::Paste)?,
        "undo" => no_args(keyword, args, Command::Undo)?,
        "redo" => no_args(keyword, args, Command::Redo)?,

        // ---- canvas ----
        "clear" => no_args(keyword, args, Command::Clear)?,
        "resize" => {
            let [w, h] = dims(keyword, args)?;
            vec![Command::Resize { width: w, height: h }]
        }
        "new" => {
            let [w, h] = dims(keyword, args)?;
            vec![Command::NewCanvas { width: w, height: h }]
        }

        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(cmds)
}

/// A two-point drag interpreted by the current tool.
fn drag_with_tool(
    pen: &PenState,
    from: Point,
    to: Point,
    settings: &EditorSettings,
) -> Result<Vec<Command>, String> {
    if let Some(shape) = pen.tool.drag_shape(from, to, settings) {
        return Ok(vec![Command::Draw { shape, style: pen.style(settings) }]);
    }
    let (x1, y1) = (from.0.round() as i32, from.1.round() as i32);
    let (x2, y2) = (to.0.round() as i32, to.1.round() as i32);
    Ok(match pen.tool {
        ToolKind::Text => return Err("the text tool places text with a 'text' line, not 'drag'".to_string()),
        ToolKind::Bucket => vec![Command::Fill { x: x2, y: y2, color: pen.colors.primary }],
        ToolKind::Select => pointer_drag((x1, y1), (x2, y2)),
        tool if tool.is_freehand() => vec![Command::Draw {
            shape: Shape::Freehand { points: vec![from, to] },
            style: pen.style(settings),
        }],
        // Polygon tool: a single open edge.
        _ => vec![Command::Draw {
            shape: Shape::Polygon { vertices: vec![from, to], closed: false, filled: false },
            style: pen.style(settings),
        }],
    })
}

fn pointer_drag(from: (i32, i32), to: (i32, i32)) -> Vec<Command> {
    vec![
        Command::PointerDown { x: from.0, y: from.1 },
        Command::PointerMove { x: to.0, y: to.1 },
        Command::PointerUp { x: to.0, y: to.1 },
    ]
}

/// First whitespace-separated word and the trimmed remainder.
fn next_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], text[i..].trim_start()),
        None => (text, ""),
    }
}

/// A `#` at the start of a line or followed by whitespace opens a comment.
/// `#ff0000` is a color, not a comment.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'#' {
            continue;
        }
        let at_start = line[..i].trim().is_empty();
        let before_space = bytes.get(i + 1).is_none_or(|n| n.is_ascii_whitespace());
        if at_start || before_space {
            return &line[..i];
        }
    }
    line
}

// ---- argument helpers ------------------------------------------------------

fn number(text: &str) -> Result<f32, String> {
    text.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("'{}' is not a number", text))
}

fn integer(text: &str) -> Result<i32, String> {
    text.parse::<i32>().map_err(|_| format!("'{}' is not an integer", text))
}

fn exact<'a, const N: usize>(keyword: &str, args: &[&'a str]) -> Result<[&'a str; N], String> {
    <[&str; N]>::try_from(args).map_err(|_| format!("'{}' takes {} argument(s), got {}", keyword, N, args.len()))
}

fn ints<const N: usize>(keyword: &str, args: &[&str]) -> Result<[i32; N], String> {
    let words = exact::<N>(keyword, args)?;
    let mut out = [0; N];
    for (slot, word) in out.iter_mut().zip(words) {
        *slot = integer(word)?;
    }
    Ok(out)
}

fn dims(keyword: &str, args: &[&str]) -> Result<[u32; 2], String> {
    let [w, h] = exact::<2>(keyword, args)?;
    let parse = |t: &str| t.parse::<u32>().map_err(|_| format!("'{}' is not a valid size", t));
    Ok([parse(w)?, parse(h)?])
}

fn no_args(keyword: &str, args: &[&str], command: Command) -> Result<Vec<Command>, String> {
    if !args.is_empty() {
        return Err(format!("'{}' takes no arguments", keyword));
    }
    Ok(vec![command])
}

/// Separate trailing keyword flags from numeric arguments.
fn split_flags<'a>(args: &[&'a str], known: &[&str]) -> (Vec<&'a str>, Vec<&'a str>) {
    args.iter().partition(|a| !known.contains(*a))
}

fn points(nums: &[&str]) -> Result<Vec<Point>, String> {
    if nums.len() % 2 != 0 {
        return Err(format!("odd number of coordinates ({})", nums.len()));
    }
    nums.chunks(2).map(|pair| Ok((number(pair[0])?, number(pair[1])?))).collect()
}

fn two_points<'a>(
    keyword: &str,
    args: &[&'a str],
    known_flags: &[&str],
) -> Result<(Point, Point, Vec<&'a str>), String> {
    let (nums, flags) = split_flags(args, known_flags);
    if nums.len() != 4 {
        return Err(format!("'{}' takes x1 y1 x2 y2", keyword));
    }
    let pts = points(&nums)?;
    Ok((pts[0], pts[1], flags))
}
