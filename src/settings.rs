//! Persistent editor preferences, stored as a plain `key=value` file.
//!
//! Location:
//!   Windows:  `%APPDATA%\paintcore\settings.cfg`
//!   Linux:    `$XDG_CONFIG_HOME/paintcore/settings.cfg` (or `~/.config/...`)
//!   macOS:    `~/Library/Application Support/paintcore/settings.cfg`

use std::path::{Path, PathBuf};

use image::Rgba;
use log::LevelFilter;

use crate::components::colors::{format_hex, parse_color};
use crate::components::history::DEFAULT_MAX_UNDO_STEPS;
use crate::ops::text::{MAX_FONT_SIZE, MIN_FONT_SIZE};

const APP_DIR: &str = "paintcore";
const FILE_NAME: &str = "settings.cfg";

#[derive(Clone, Debug, PartialEq)]
pub struct EditorSettings {
    pub max_undo_steps: usize,
    /// Evict old undo snapshots past this many bytes.  `None` (written as 0)
    /// means only the step count applies.
    pub max_history_bytes: Option<usize>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Fill used for new canvases, cleared areas and lifted selections.
    pub background: Rgba<u8>,
    pub stroke_width: f32,
    pub highlighter_opacity: f32,
    pub corner_radius: f32,
    pub font_size: f32,
    /// TrueType/OpenType file for text.  `None` picks a system font.
    pub font_path: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_undo_steps: DEFAULT_MAX_UNDO_STEPS,
            max_history_bytes: None,
            canvas_width: 800,
            canvas_height: 600,
            background: Rgba([255, 255, 255, 255]),
            stroke_width: 2.0,
            highlighter_opacity: 0.3,
            corner_radius: 10.0,
            font_size: 14.0,
            font_path: None,
            log_level: LevelFilter::Info,
        }
    }
}

impl EditorSettings {
    /// Platform config file path.  Creates the parent directory on demand.
    pub fn settings_path() -> Option<PathBuf> {
        let dir = config_dir()?.join(APP_DIR);
        let _ = std::fs::create_dir_all(&dir);
        Some(dir.join(FILE_NAME))
    }

    /// Load from the platform path, falling back to defaults.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Missing or unreadable files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Parse `key=value` lines.  Unknown keys are skipped; bad values keep
    /// their default.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            let ok = match key {
                "max_undo_steps" => set_parsed(&mut s.max_undo_steps, val, |v: &usize| *v >= 1),
                "max_history_bytes" => match val.parse::<usize>() {
                    Ok(bytes) => {
                        s.max_history_bytes = (bytes > 0).then_some(bytes);
                        true
                    }
                    Err(_) => false,
                },
                "canvas_width" => set_parsed(&mut s.canvas_width, val, |v: &u32| *v >= 1),
                "canvas_height" => set_parsed(&mut s.canvas_height, val, |v: &u32| *v >= 1),
                "stroke_width" => set_parsed(&mut s.stroke_width, val, |v: &f32| v.is_finite() && *v > 0.0),
                "highlighter_opacity" => {
                    set_parsed(&mut s.highlighter_opacity, val, |v: &f32| (0.0..=1.0).contains(v))
                }
                "corner_radius" => set_parsed(&mut s.corner_radius, val, |v: &f32| v.is_finite() && *v >= 0.0),
                "font_size" => set_parsed(&mut s.font_size, val, |v: &f32| {
                    (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(v)
                }),
                "font_path" => {
                    s.font_path = (!val.is_empty()).then(|| PathBuf::from(val));
                    true
                }
                "background" => match parse_color(val) {
                    Some(c) => {
                        s.background = c;
                        true
                    }
                    None => false,
                },
                "log_level" => set_parsed(&mut s.log_level, val, |_| true),
                _ => true,
            };
            if !ok {
                log::warn!("settings: ignoring invalid value '{}' for '{}'", val, key);
            }
        }
        s
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "max_undo_steps={}\n\
             max_history_bytes={}\n\
             canvas_width={}\n\
             canvas_height={}\n\
             background={}\n\
             stroke_width={}\n\
             highlighter_opacity={}\n\
             corner_radius={}\n\
             font_size={}\n\
             font_path={}\n\
             log_level={}\n",
            self.max_undo_steps,
            self.max_history_bytes.unwrap_or(0),
            self.canvas_width,
            self.canvas_height,
            format_hex(self.background),
            self.stroke_width,
            self.highlighter_opacity,
            self.corner_radius,
            self.font_size,
            self.font_path.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
            self.log_level.to_string().to_lowercase(),
        )
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_config_string())
    }

    /// Write to the platform path.  Returns where the file went.
    pub fn save(&self) -> std::io::Result<PathBuf> {
        let path = Self::settings_path()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no config directory"))?;
        self.save_to(&path)?;
        log::info!("settings: saved {}", path.display());
        Ok(path)
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, val: &str, valid: impl Fn(&T) -> bool) -> bool {
    match val.parse::<T>() {
        Ok(v) if valid(&v) => {
            *slot = v;
            true
        }
        _ => false,
    }
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        return std::env::var("APPDATA").ok().map(PathBuf::from);
    }
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library").join("Application Support"));
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg));
        }
        std::env::var("HOME").ok().map(|home| PathBuf::from(home).join(".config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_editor() {
        let s = EditorSettings::default();
        assert_eq!(s.max_undo_steps, 25);
        assert_eq!((s.canvas_width, s.canvas_height), (800, 600));
        assert_eq!(s.background, Rgba([255, 255, 255, 255]));
        assert!((s.highlighter_opacity - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn parse_reads_known_keys_and_skips_the_rest() {
        let s = EditorSettings::parse(
            "# comment\nmax_undo_steps = 10\nbackground=#000000\nunknown=1\ncanvas_width=320\nlog_level=debug\n",
        );
        assert_eq!(s.max_undo_steps, 10);
        assert_eq!(s.background, Rgba([0, 0, 0, 255]));
        assert_eq!(s.canvas_width, 320);
        assert_eq!(s.canvas_height, 600);
        assert_eq!(s.log_level, LevelFilter::Debug);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let s = EditorSettings::parse("max_undo_steps=0\nhighlighter_opacity=4\nstroke_width=abc\n");
        assert_eq!(s, EditorSettings::default());
    }

    #[test]
    fn config_string_parses_back() {
        let mut s = EditorSettings::default();
        s.max_undo_steps = 7;
        s.background = Rgba([10, 20, 30, 40]);
        s.corner_radius = 4.5;
        s.font_size = 32.0;
        s.font_path = Some(PathBuf::from("/opt/fonts/Sans.ttf"));
        s.max_history_bytes = Some(1 << 20);
        assert_eq!(EditorSettings::parse(&s.to_config_string()), s);
    }

    #[test]
    fn history_limit_and_font_keys() {
        let s = EditorSettings::parse("max_history_bytes=0\nfont_size=3\nfont_path=\n");
        assert_eq!(s.max_history_bytes, None);
        assert_eq!(s.font_size, EditorSettings::default().font_size);
        assert_eq!(s.font_path, None);

        let s = EditorSettings::parse("max_history_bytes=4096\nfont_size=48\nfont_path=fonts/Mono.ttf\n");
        assert_eq!(s.max_history_bytes, Some(4096));
        assert_eq!(s.font_size, 48.0);
        assert_eq!(s.font_path, Some(PathBuf::from("fonts/Mono.ttf")));
    }
}
