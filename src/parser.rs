//! module for parsing XPM (X PixMap) images into a pixmap table
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use log;

use crate::error::XpmError;

// An XPM3 file is C source declaring one array of strings:
//
// /* XPM */
// static char *name[] = {
// /* <Values> */  "<width> <height> <ncolors> <cpp> [<x_hot> <y_hot>] [XPMEXT]",
// /* <Colors> */  "<code> {<key> <color>}+", ...
// /* <Pixels> */  "<width * cpp characters>", ...
// /* <Extensions> */ "XPMEXT <name>", "<line>", ..., "XPMENDEXT"
// };
pub const XPM_HEADER: &[u8] = b"/* XPM */";
pub const XPM_EXTENSION: &str = "XPMEXT";
pub const XPM_END_EXTENSIONS: &str = "XPMENDEXT";

/// Keys of a color line, one per visual.
pub mod keys {
    pub const MONO: &str = "m";
    pub const SYMBOLIC: &str = "s";
    pub const GRAY4: &str = "g4";
    pub const GRAY: &str = "g";
    pub const COLOR: &str = "c";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Values {
    pub width: u32,
    pub height: u32,
    pub ncolors: u32,
    pub cpp: u32,
    pub hotspot: Option<(u32, u32)>,
    /// Set when the table carries at least one extension block.
    pub extensions: bool,
}

/// Canonical values line: `"w h ncolors cpp[ x_hot y_hot][ XPMEXT]"`
impl Display for Values {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.width, self.height, self.ncolors, self.cpp)?;
        if let Some((x, y)) = self.hotspot {
            write!(f, " {x} {y}")?;
        }
        if self.extensions {
            write!(f, " {XPM_EXTENSION}")?;
        }
        Ok(())
    }
}

/// One line of the `<Colors>` section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorEntry {
    pub code: String,
    pub mono: Option<String>,
    pub symbolic: Option<String>,
    pub gray4: Option<String>,
    pub gray: Option<String>,
    pub color: Option<String>,
}

impl ColorEntry {
    /// The best spec for a color visual, falling back to the grayscale and mono ones.
    pub fn best_spec(&self) -> Option<&str> {
        self.color.as_deref()
            .or(self.gray.as_deref())
            .or(self.gray4.as_deref())
            .or(self.mono.as_deref())
    }

    fn set(&mut self, key: &str, spec: String) {
        let slot = match key {
            keys::MONO => &mut self.mono,
            keys::SYMBOLIC => &mut self.symbolic,
            keys::GRAY4 => &mut self.gray4,
            keys::GRAY => &mut self.gray,
            _ => &mut self.color,
        };
        *slot = Some(spec);
    }
}

/// Canonical color line: the code, then `\t<key> <spec>` in `s m g4 g c` order
impl Display for ColorEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)?;
        let specs = [
            (keys::SYMBOLIC, &self.symbolic),
            (keys::MONO, &self.mono),
            (keys::GRAY4, &self.gray4),
            (keys::GRAY, &self.gray),
            (keys::COLOR, &self.color),
        ];
        for (key, spec) in specs {
            if let Some(spec) = spec {
                write!(f, "\t{key} {spec}")?;
            }
        }
        Ok(())
    }
}

/// An `XPMEXT <name>` block and the strings that follow it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub lines: Vec<String>,
}

/// An XPM image as the ordered list of strings libXpm hands back: the values
/// line, the color lines, the pixel rows and, when present, the extensions
/// closed by `XPMENDEXT`.
#[derive(Clone, Debug)]
pub struct PixmapTable {
    rows: Vec<String>,
    values: Values,
    colors: Vec<ColorEntry>,
    extensions: Vec<Extension>,
}

impl PixmapTable {
    fn new(values: Values, colors: Vec<ColorEntry>, pixels: Vec<String>, extensions: Vec<Extension>) -> PixmapTable {
        let mut rows = Vec::with_capacity(1 + colors.len() + pixels.len());
        rows.push(values.to_string());
        rows.extend(colors.iter().map(ColorEntry::to_string));
        rows.extend(pixels);
        for extension in &extensions {
            if extension.name.is_empty() {
                rows.push(XPM_EXTENSION.to_string());
            } else {
                rows.push(format!("{XPM_EXTENSION} {}", extension.name));
            }
            rows.extend(extension.lines.iter().cloned());
        }
        if !extensions.is_empty() {
            rows.push(XPM_END_EXTENSIONS.to_string());
        }
        PixmapTable { rows, values, colors, extensions }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// A parsed table always holds at least its values line.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.rows.get(index).map(String::as_str)
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn width(&self) -> u32 {
        self.values.width
    }

    pub fn height(&self) -> u32 {
        self.values.height
    }

    pub fn colors(&self) -> &[ColorEntry] {
        &self.colors
    }

    pub fn pixels(&self) -> &[String] {
        let start = 1 + self.colors.len();
        &self.rows[start..start + self.values.height as usize]
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Split a pixel row of this table into its color codes.
    pub(crate) fn codes<'a>(&self, row: &'a str) -> impl Iterator<Item=&'a str> {
        let cpp = self.values.cpp as usize;
        (0..row.len() / cpp).map(move |i| &row[i * cpp..(i + 1) * cpp])
    }
}

#[derive(Debug, PartialEq)]
enum XpmParseState {
    Values,
    Colors(Values),
    Pixels(Values),
    Extensions(Values),
    Done(Values),
}

#[derive(Debug, PartialEq)]
enum ScanState {
    Code,
    String,
    BlockComment,
    LineComment,
}

/// Pulls the string literals out of the array initializer, skipping C comments.
struct StringScanner {
    state: ScanState,
    inside_array: bool,
    closed: bool,
}

impl StringScanner {
    fn new() -> StringScanner {
        log::debug!("Created new StringScanner");
        StringScanner {
            state: ScanState::Code,
            inside_array: false,
            closed: false,
        }
    }

    fn scan(&mut self, contents: &[u8]) -> Result<Vec<String>, XpmError> {
        let len = contents.len();
        log::debug!("scan strings from contents with size {len}");
        let mut strings = vec![];
        let mut current = Vec::new();
        let mut i = 0;
        while i < len && !self.closed {
            let byte = contents[i];
            let next = contents.get(i + 1).copied();
            match self.state {
                ScanState::Code => match (byte, next) {
                    (b'/', Some(b'*')) => {
                        self.state = ScanState::BlockComment;
                        i += 1;
                    }
                    (b'/', Some(b'/')) => self.state = ScanState::LineComment,
                    (b'{', _) if !self.inside_array => self.inside_array = true,
                    (b'}', _) if self.inside_array => self.closed = true,
                    (b'"', _) if self.inside_array => self.state = ScanState::String,
                    _ => {}
                },
                ScanState::BlockComment => {
                    if byte == b'*' && next == Some(b'/') {
                        self.state = ScanState::Code;
                        i += 1;
                    }
                }
                ScanState::LineComment => {
                    if byte == b'\n' {
                        self.state = ScanState::Code;
                    }
                }
                ScanState::String => match (byte, next) {
                    (b'\\', Some(b'"')) | (b'\\', Some(b'\\')) => {
                        current.push(contents[i + 1]);
                        i += 1;
                    }
                    (b'"', _) => {
                        strings.push(to_ascii_string(std::mem::take(&mut current))?);
                        self.state = ScanState::Code;
                    }
                    (b'\n', _) => return Err(XpmError::invalid("unterminated string literal")),
                    _ => current.push(byte),
                },
            }
            i += 1;
        }
        if !self.inside_array {
            return Err(XpmError::invalid("no array definition found"));
        }
        if !self.closed {
            return Err(XpmError::invalid("array is not closed"));
        }
        log::debug!("Found {} strings", strings.len());
        Ok(strings)
    }
}

fn to_ascii_string(bytes: Vec<u8>) -> Result<String, XpmError> {
    if !bytes.is_ascii() {
        return Err(XpmError::invalid("non-ASCII character in string"));
    }
    String::from_utf8(bytes).map_err(|_| XpmError::invalid("non-ASCII character in string"))
}

/// Parse an unsigned decimal; leading zeros are allowed, as libXpm allows them.
fn parse_u32(token: &str) -> Result<u32, XpmError> {
    log::debug!("parse_u32('{token}')");
    let bytes = token.as_bytes();
    if bytes.is_empty() {
        return Err(XpmError::invalid("empty number"));
    }
    let mut result = 0u32;
    for byte in bytes {
        if !byte.is_ascii_digit() {
            return Err(XpmError::invalid(format!("invalid number '{token}'")));
        }
        result = result.checked_mul(10)
            .and_then(|r| r.checked_add((*byte - b'0') as u32))
            .ok_or_else(|| XpmError::invalid(format!("number '{token}' is too large")))?;
    }
    log::debug!("result {result}");
    Ok(result)
}

fn parse_values(line: &str) -> Result<Values, XpmError> {
    let mut tokens = line.split_ascii_whitespace().collect::<Vec<&str>>();
    let extensions = tokens.last() == Some(&XPM_EXTENSION);
    if extensions {
        tokens.pop();
    }
    let numbers = tokens.into_iter().map(parse_u32).collect::<Result<Vec<u32>, XpmError>>()?;
    let (width, height, ncolors, cpp, hotspot) = match numbers[..] {
        [w, h, n, c] => (w, h, n, c, None),
        [w, h, n, c, x, y] => (w, h, n, c, Some((x, y))),
        _ => return Err(XpmError::invalid(format!("values line '{line}' must hold 4 or 6 numbers"))),
    };
    if width == 0 || height == 0 {
        return Err(XpmError::invalid("image has zero size"));
    }
    if ncolors == 0 {
        return Err(XpmError::invalid("image has no colors"));
    }
    if cpp == 0 {
        return Err(XpmError::invalid("zero characters per pixel"));
    }
    Ok(Values { width, height, ncolors, cpp, hotspot, extensions })
}

fn is_key(token: &str) -> bool {
    matches!(token, keys::MONO | keys::SYMBOLIC | keys::GRAY4 | keys::GRAY | keys::COLOR)
}

fn parse_color_line(line: &str, cpp: usize) -> Result<ColorEntry, XpmError> {
    if line.len() < cpp {
        return Err(XpmError::invalid(format!("color line '{line}' is shorter than its code")));
    }
    let mut entry = ColorEntry { code: line[..cpp].to_string(), ..ColorEntry::default() };
    let mut key: Option<&str> = None;
    let mut words: Vec<&str> = vec![];
    // color names may span several words, e.g. "c Antique White"
    for token in line[cpp..].split_ascii_whitespace().chain(std::iter::once(keys::COLOR)) {
        if is_key(token) && (key.is_none() || !words.is_empty()) {
            if let Some(key) = key {
                entry.set(key, words.join(" "));
                words.clear();
            }
            key = Some(token);
        } else if key.is_none() {
            return Err(XpmError::invalid(format!("color line '{line}' has no key before '{token}'")));
        } else {
            words.push(token);
        }
    }
    // the chained sentinel leaves a dangling key; anything else is a key without a color
    if !words.is_empty() {
        return Err(XpmError::invalid(format!("color line '{line}' has a key without a color")));
    }
    if entry.best_spec().is_none() && entry.symbolic.is_none() {
        return Err(XpmError::invalid(format!("color line '{line}' has no colors")));
    }
    Ok(entry)
}

/// `Some(name)` when the string opens an extension block.
fn extension_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(XPM_EXTENSION)?;
    if rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_whitespace()) {
        Some(rest.trim())
    } else {
        None
    }
}

pub fn read_file(path: impl AsRef<Path>) -> Result<PixmapTable, XpmError> {
    let path = path.as_ref();
    log::info!("reading {}", path.display());
    let contents = fs::read(path)?;
    parse(&contents)
}

pub fn parse(contents: &[u8]) -> Result<PixmapTable, XpmError> {
    log::info!("start parsing contents of size {}", contents.len());
    let first_line = contents.split(|b| *b == b'\n').next().unwrap_or_default();
    if !first_line.trim_ascii().starts_with(XPM_HEADER) {
        log::warn!("missing '/* XPM */' header comment");
    }
    let strings = StringScanner::new().scan(contents)?;

    let mut colors: Vec<ColorEntry> = vec![];
    let mut pixels: Vec<String> = vec![];
    let mut extensions: Vec<Extension> = vec![];
    let mut codes = HashSet::new();
    let mut parse_state = XpmParseState::Values;
    for line in strings {
        log::debug!("loop: line='{}'", &line[..usize::min(line.len(), 10)]);
        parse_state = match parse_state {
            XpmParseState::Values => {
                log::debug!("Parsing values");
                let values = parse_values(&line)?;
                log::debug!("values {values:?}");
                XpmParseState::Colors(values)
            }
            XpmParseState::Colors(values) => {
                log::debug!("Parsing color {}", colors.len());
                let entry = parse_color_line(&line, values.cpp as usize)?;
                if !codes.insert(entry.code.clone()) {
                    return Err(XpmError::invalid(format!("duplicate color code '{}'", entry.code)));
                }
                colors.push(entry);
                if colors.len() == values.ncolors as usize {
                    XpmParseState::Pixels(values)
                } else {
                    XpmParseState::Colors(values)
                }
            }
            XpmParseState::Pixels(values) => {
                let row = pixels.len();
                log::debug!("Parsing pixel row {row}");
                let cpp = values.cpp as usize;
                if line.len() != values.width as usize * cpp {
                    return Err(XpmError::invalid(format!(
                        "pixel row {row} has length {}, expected {}", line.len(), values.width as usize * cpp)));
                }
                for i in 0..values.width as usize {
                    let code = &line[i * cpp..(i + 1) * cpp];
                    if !codes.contains(code) {
                        return Err(XpmError::invalid(format!("unknown color code '{code}' in pixel row {row}")));
                    }
                }
                pixels.push(line);
                if pixels.len() == values.height as usize {
                    XpmParseState::Extensions(values)
                } else {
                    XpmParseState::Pixels(values)
                }
            }
            XpmParseState::Extensions(values) => {
                if !values.extensions {
                    log::warn!("ignoring trailing string after pixel rows");
                    XpmParseState::Extensions(values)
                } else if line == XPM_END_EXTENSIONS {
                    log::debug!("end of {} extensions", extensions.len());
                    XpmParseState::Done(values)
                } else if let Some(name) = extension_name(&line) {
                    log::debug!("Parsing extension '{name}'");
                    extensions.push(Extension { name: name.to_string(), lines: vec![] });
                    XpmParseState::Extensions(values)
                } else {
                    match extensions.last_mut() {
                        Some(extension) => extension.lines.push(line),
                        None => log::warn!("ignoring string before the first extension"),
                    }
                    XpmParseState::Extensions(values)
                }
            }
            XpmParseState::Done(values) => {
                log::warn!("ignoring string after {XPM_END_EXTENSIONS}");
                XpmParseState::Done(values)
            }
        }
    }

    match parse_state {
        XpmParseState::Values => Err(XpmError::invalid("missing values line")),
        XpmParseState::Colors(_) => Err(XpmError::invalid(format!("only {} color lines", colors.len()))),
        XpmParseState::Pixels(_) => Err(XpmError::invalid(format!("only {} pixel rows", pixels.len()))),
        XpmParseState::Extensions(mut values) | XpmParseState::Done(mut values) => {
            values.extensions = !extensions.is_empty();
            log::info!("parsed {}x{} image with {} colors", values.width, values.height, values.ncolors);
            Ok(PixmapTable::new(values, colors, pixels, extensions))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLUS: &[u8] = b"/* XPM */
static char * plus_xpm[] = {
/* columns rows colors chars-per-pixel */
\"3 3 2 1\",
\"  c None\",
\"# c #000000\",
/* pixels */
\" # \",
\"###\",
\" # \"
};
";

    #[test]
    fn parses_rows_in_order() {
        let table = parse(PLUS).unwrap();
        assert_eq!(table.len(), 6);
        assert_eq!(table.get(0), Some("3 3 2 1"));
        assert_eq!(table.get(2), Some("#\tc #000000"));
        assert_eq!(table.pixels(), &[" # ", "###", " # "]);
        assert_eq!(table.values(), &Values {
            width: 3,
            height: 3,
            ncolors: 2,
            cpp: 1,
            hotspot: None,
            extensions: false,
        });
    }

    #[test]
    fn rows_are_rebuilt_like_libxpm() {
        let table = parse(b"/* XPM */
static char *x[] = {
\"2  1\t1 1\",
\". c black m white\",
\"..\"
};").unwrap();
        assert_eq!(table.get(0), Some("2 1 1 1"));
        // keys come out in s m g4 g c order, each behind a tab
        assert_eq!(table.get(1), Some(".\tm white\tc black"));
        assert_eq!(table.get(2), Some(".."));
    }

    #[test]
    fn color_line_key_order() {
        let entry = parse_color_line("ab c Antique White g4 gray50 s bg", 2).unwrap();
        assert_eq!(entry.to_string(), "ab\ts bg\tg4 gray50\tc Antique White");
    }

    #[test]
    fn parses_color_entries() {
        let table = parse(PLUS).unwrap();
        let colors = table.colors();
        assert_eq!(colors[0].code, " ");
        assert_eq!(colors[0].color.as_deref(), Some("None"));
        assert_eq!(colors[1].code, "#");
        assert_eq!(colors[1].best_spec(), Some("#000000"));
    }

    #[test]
    fn multi_word_color_and_several_visuals() {
        let entry = parse_color_line("ab s bg m white c Antique White", 2).unwrap();
        assert_eq!(entry.code, "ab");
        assert_eq!(entry.symbolic.as_deref(), Some("bg"));
        assert_eq!(entry.mono.as_deref(), Some("white"));
        assert_eq!(entry.color.as_deref(), Some("Antique White"));
        assert_eq!(entry.gray, None);
    }

    #[test]
    fn color_line_errors() {
        assert!(parse_color_line("a", 2).is_err());
        assert!(parse_color_line("a  red", 1).is_err());
        assert!(parse_color_line("a c", 1).is_err());
        assert!(parse_color_line("a", 1).is_err());
    }

    #[test]
    fn hotspot_and_extensions_are_kept() {
        let table = parse(b"/* XPM */
static char *x[] = {
\"2 1 1 2 0 0 XPMEXT\",
\"aa c red\",
\"aaaa\",
\"XPMEXT ext data\",
\"line1\",
\"XPMENDEXT\"
};").unwrap();
        assert_eq!(table.values().hotspot, Some((0, 0)));
        assert!(table.values().extensions);
        assert_eq!(table.rows(), &[
            "2 1 1 2 0 0 XPMEXT",
            "aa\tc red",
            "aaaa",
            "XPMEXT ext data",
            "line1",
            "XPMENDEXT",
        ]);
        assert_eq!(table.pixels(), &["aaaa"]);
        assert_eq!(table.extensions(), &[Extension {
            name: "ext data".to_string(),
            lines: vec!["line1".to_string()],
        }]);
        assert_eq!(table.codes("aaaa").collect::<Vec<_>>(), vec!["aa", "aa"]);
    }

    #[test]
    fn trailing_strings_without_extension_flag_are_dropped() {
        let table = parse(b"static char *x[] = { \"1 1 1 1\", \"a c red\", \"a\", \"XPMEXT stray\" };").unwrap();
        assert_eq!(table.len(), 3);
        assert!(!table.values().extensions);
        assert!(table.extensions().is_empty());
    }

    #[test]
    fn comments_and_escapes() {
        let table = parse(b"/* XPM */
// a line comment with a { brace
static char *x[] = { /* \"not a string\" */
\"1 1 1 1\", \"\\\" c blue\",
\"\\\"\" };").unwrap();
        assert_eq!(table.rows(), &["1 1 1 1", "\"\tc blue", "\""]);
    }

    #[test]
    fn leading_zeros_are_accepted() {
        let table = parse(b"static char *x[] = { \"02 01 1 001\", \"a c red\", \"aa\" };").unwrap();
        assert_eq!((table.width(), table.height(), table.values().cpp), (2, 1, 1));
        assert_eq!(table.get(0), Some("2 1 1 1"));
    }

    #[test]
    fn rejects_bad_values_line() {
        for values in ["1 1 1", "1 1 1 1 1", "0 1 1 1", "1 1 0 1", "1 1 1 0", "00 1 1 1", "a 1 1 1", "+1 1 1 1"] {
            let source = format!("static char *x[] = {{ \"{values}\", \"a c red\", \"a\" }};");
            assert!(matches!(parse(source.as_bytes()), Err(XpmError::FileInvalid(_))), "{values}");
        }
    }

    #[test]
    fn rejects_numbers_that_overflow() {
        assert_eq!(parse_u32("4294967295").unwrap(), u32::MAX);
        assert!(matches!(parse_u32("4294967296"), Err(XpmError::FileInvalid(_))));
        let source = b"static char *x[] = { \"99999999999 1 1 1\", \"a c red\", \"a\" };";
        assert!(matches!(parse(source), Err(XpmError::FileInvalid(_))));
    }

    #[test]
    fn rejects_non_ascii_strings() {
        let source = "static char *x[] = { \"1 1 1 1\", \"\u{e9} c red\", \"\u{e9}\" };";
        match parse(source.as_bytes()) {
            Err(XpmError::FileInvalid(reason)) => assert!(reason.contains("non-ASCII")),
            other => panic!("expected FileInvalid, got {other:?}"),
        }
    }

    #[test]
    fn rejects_short_or_wrong_rows() {
        let missing_row = b"static char *x[] = { \"1 2 1 1\", \"a c red\", \"a\" };";
        assert!(matches!(parse(missing_row), Err(XpmError::FileInvalid(_))));
        let wrong_length = b"static char *x[] = { \"2 1 1 1\", \"a c red\", \"a\" };";
        assert!(matches!(parse(wrong_length), Err(XpmError::FileInvalid(_))));
        let unknown_code = b"static char *x[] = { \"1 1 1 1\", \"a c red\", \"b\" };";
        assert!(matches!(parse(unknown_code), Err(XpmError::FileInvalid(_))));
        let duplicate = b"static char *x[] = { \"1 1 2 1\", \"a c red\", \"a c blue\", \"a\" };";
        assert!(matches!(parse(duplicate), Err(XpmError::FileInvalid(_))));
    }

    #[test]
    fn rejects_non_array_input() {
        assert!(matches!(parse(b"not an image"), Err(XpmError::FileInvalid(_))));
        assert!(matches!(parse(b"static char *x[] = { \"1 1 1 1\","), Err(XpmError::FileInvalid(_))));
        assert!(matches!(parse(b"{ \"1 1 1 1\n\" }"), Err(XpmError::FileInvalid(_))));
    }

    #[test]
    fn missing_file_is_open_failure() {
        let err = read_file("/nonexistent/definitely/missing.xpm").unwrap_err();
        assert!(matches!(err, XpmError::OpenFailed(_)));
    }
}
