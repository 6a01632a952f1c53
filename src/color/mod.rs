//! Color specs found in XPM color lines
mod x11colors;

use log;

use crate::error::XpmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Rgba {
        Rgba { r, g, b, a: u8::MAX }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Relative luminance in [0, 1]
    pub fn luminance(&self) -> f32 {
        (0.2126 * f32::from(self.r) + 0.7152 * f32::from(self.g) + 0.0722 * f32::from(self.b))
            / f32::from(u8::MAX)
    }
}

fn parse_hex_digits(digits: &[u8]) -> Option<u8> {
    let mut value = 0u32;
    for digit in digits {
        value = (value << 4) | char::from(*digit).to_digit(16)?;
    }
    // scale n hex digits to 8 bits, rounding to nearest
    let max = (1u32 << (4 * digits.len())) - 1;
    Some(((value * 255 + max / 2) / max) as u8)
}

fn parse_hex_color(hex: &str) -> Option<Rgba> {
    let bytes = hex.as_bytes();
    if bytes.is_empty() || bytes.len() % 3 != 0 || bytes.len() > 12 {
        return None;
    }
    let n = bytes.len() / 3;
    Some(Rgba::opaque(
        parse_hex_digits(&bytes[..n])?,
        parse_hex_digits(&bytes[n..2 * n])?,
        parse_hex_digits(&bytes[2 * n..])?,
    ))
}

/// `grayN`/`greyN` for N in 0..=100
fn parse_gray_level(name: &str) -> Option<Rgba> {
    let level = name.strip_prefix("gray").or_else(|| name.strip_prefix("grey"))?;
    if level.is_empty() || !level.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let level = level.parse::<u32>().ok().filter(|l| *l <= 100)?;
    let gray = ((255 * level + 50) / 100) as u8;
    Some(Rgba::opaque(gray, gray, gray))
}

/// Parse the color part of a color line: `#` hex, `None`, or an X11 color name.
pub fn parse_color(spec: &str) -> Result<Rgba, XpmError> {
    log::debug!("parse_color('{spec}')");
    if let Some(hex) = spec.strip_prefix('#') {
        return parse_hex_color(hex)
            .ok_or_else(|| XpmError::ColorError(format!("invalid hex color '{spec}'")));
    }
    let name = spec.chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect::<String>();
    if name == "none" {
        return Ok(Rgba::TRANSPARENT);
    }
    if let Ok(i) = x11colors::COLORS.binary_search_by(|entry| entry.0.cmp(name.as_str())) {
        let (_, r, g, b) = x11colors::COLORS[i];
        return Ok(Rgba::opaque(r, g, b));
    }
    parse_gray_level(&name)
        .ok_or_else(|| XpmError::ColorError(format!("unknown color name '{spec}'")))
}

/// Nearest index in the 6x6x6 cube of a 256-color terminal.
pub fn to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let index = |c: u8| (((f32::from(c) - 55.0) / 40.0 + 0.5) as i32).max(0) as u8;
    16 + 36 * index(r) + 6 * index(g) + index(b)
}
