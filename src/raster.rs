//! Decoding a pixmap table into RGBA pixels
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use log;

use crate::color::{self, Rgba};
use crate::error::XpmError;
use crate::parser::PixmapTable;

#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    /// RGBA8, row major
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Raster {
    /// Resolve every pixel code through the color table. Colors that fail to parse
    /// fall back to black; an entry with no usable visual at all is an error.
    pub fn from_table(table: &PixmapTable) -> Result<Raster, XpmError> {
        let width = table.width() as usize;
        let height = table.height() as usize;
        log::info!("decoding {width}x{height} raster");

        let mut palette = HashMap::with_capacity(table.colors().len());
        for entry in table.colors() {
            let spec = entry.best_spec().ok_or_else(|| XpmError::ColorFailed(
                format!("color code '{}' has only a symbolic name", entry.code)))?;
            let rgba = match color::parse_color(spec) {
                Ok(rgba) => rgba,
                Err(e) => {
                    log::warn!("{e}, using black for code '{}'", entry.code);
                    Rgba::BLACK
                }
            };
            palette.insert(entry.code.as_str(), rgba);
        }

        let mut data = Vec::with_capacity(width * height * 4);
        for row in table.pixels() {
            for code in table.codes(row) {
                let rgba = palette.get(code).ok_or_else(|| XpmError::invalid(
                    format!("unknown color code '{code}'")))?;
                data.extend_from_slice(&[rgba.r, rgba.g, rgba.b, rgba.a]);
            }
        }
        Ok(Raster { data, width, height })
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some(Rgba { r: self.data[i], g: self.data[i + 1], b: self.data[i + 2], a: self.data[i + 3] })
    }

    /// Render with 256-color terminal background escapes, two columns per pixel.
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                match self.pixel(x, y) {
                    Some(p) if !p.is_transparent() => {
                        out.push_str(&format!("\x1b[48;5;{}m  ", color::to_ansi256(p.r, p.g, p.b)));
                    }
                    _ => out.push_str("\x1b[0m  "),
                }
            }
            out.push_str("\x1b[0m\n");
        }
        out
    }
}

impl Display for Raster {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        log::debug!("Display raster with size:({},{})", self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let char = match self.pixel(x, y) {
                    Some(p) if !p.is_transparent() => {
                        let gray = p.luminance();
                        if gray < 0.2 {
                            '█'
                        } else if gray < 0.4 {
                            '▓'
                        } else if gray < 0.6 {
                            '▒'
                        } else if gray < 0.8 {
                            '░'
                        } else {
                            '·'
                        }
                    }
                    _ => ' ',
                };
                write!(f, "{char}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
