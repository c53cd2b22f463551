use image::Rgba;

use crate::canvas::TRANSPARENT;

// ============================================================================
// PALETTE
// ============================================================================

/// Swatches offered by the default palette, with the names scripts may use.
pub const PALETTE: [(&str, Rgba<u8>); 13] = [
    ("black", Rgba([0, 0, 0, 255])),
    ("blue", Rgba([0, 0, 255, 255])),
    ("cyan", Rgba([0, 255, 255, 255])),
    ("darkgray", Rgba([64, 64, 64, 255])),
    ("gray", Rgba([128, 128, 128, 255])),
    ("green", Rgba([0, 128, 0, 255])),
    ("lightgray", Rgba([211, 211, 211, 255])),
    ("magenta", Rgba([255, 0, 255, 255])),
    ("orange", Rgba([255, 165, 0, 255])),
    ("pink", Rgba([255, 192, 203, 255])),
    ("red", Rgba([255, 0, 0, 255])),
    ("white", Rgba([255, 255, 255, 255])),
    ("yellow", Rgba([255, 255, 0, 255])),
];

/// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` (the `#` is optional) or a palette
/// name.  Alpha is fully opaque unless given.
pub fn parse_color(text: &str) -> Option<Rgba<u8>> {
    let text = text.trim();
    if let Some((_, color)) = PALETTE.iter().find(|(name, _)| name.eq_ignore_ascii_case(text)) {
        return Some(*color);
    }
    if text.eq_ignore_ascii_case("transparent") {
        return Some(TRANSPARENT);
    }

    let hex = text.strip_prefix('#').unwrap_or(text);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let nib = |i: usize| byte(&hex[i..i + 1]).map(|v| v * 17);
            Some(Rgba([nib(0)?, nib(1)?, nib(2)?, 255]))
        }
        6 => Some(Rgba([byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?, 255])),
        8 => Some(Rgba([
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        ])),
        _ => None,
    }
}

/// `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
pub fn format_hex(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}

// ============================================================================
// PRIMARY / SECONDARY PAIR
// ============================================================================

/// Foreground and background swatches; scripts `swap` between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorPair {
    pub primary: Rgba<u8>,
    pub secondary: Rgba<u8>,
}

impl Default for ColorPair {
    fn default() -> Self {
        Self {
            primary: Rgba([0, 0, 0, 255]),
            secondary: Rgba([255, 255, 255, 255]),
        }
    }
}

impl ColorPair {
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.primary, &mut self.secondary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_color("#ff8000"), Some(Rgba([255, 128, 0, 255])));
        assert_eq!(parse_color("FF800080"), Some(Rgba([255, 128, 0, 128])));
        assert_eq!(parse_color("#f80"), Some(Rgba([255, 136, 0, 255])));
    }

    #[test]
    fn parses_palette_names() {
        assert_eq!(parse_color("Orange"), Some(Rgba([255, 165, 0, 255])));
        assert_eq!(parse_color("transparent"), Some(Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#gg0000"), None);
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn hex_round_trip_keeps_alpha() {
        let c = Rgba([1, 2, 3, 4]);
        assert_eq!(parse_color(&format_hex(c)), Some(c));
        assert_eq!(format_hex(Rgba([255, 0, 0, 255])), "#FF0000");
    }
}
