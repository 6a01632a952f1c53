//! Vim highlight and syntax commands that paint an XPM file's pixel codes in
//! their own colors.
//!
//! Every color gets a `Xpmcolor<i>` highlight group and a `syntax match` on its
//! code; the groups are collected in the `Xpmcolors` cluster.
use log;

use crate::color::{self, Rgba};
use crate::parser::PixmapTable;

const GROUP: &str = "Xpmcolor";
const CLUSTER: &str = "Xpmcolors";
// characters with a meaning inside a vim pattern
const PATTERN_SPECIALS: &[char] = &['\\', '\'', '"', '$', '.', '~', '^', '/', '[', ']', '*'];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Term {
    Gui,
    Cterm,
}

impl Term {
    fn prefix(&self) -> &'static str {
        match self {
            Term::Gui => "gui",
            Term::Cterm => "cterm",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VimHighlight {
    pub highlight: String,
    pub syntax_match: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VimSettings {
    pub highlights: Vec<VimHighlight>,
    /// `syntax cluster Xpmcolors contains=Xpmcolor0,...`
    pub cluster: String,
}

/// Transparent colors take the background of `Normal` where vim has one.
fn transparent_highlight(i: usize, term: Term) -> String {
    let t = term.prefix();
    format!("try | highlight link {GROUP}{i} Normal | highlight {GROUP}{i} {t}fg=bg | catch | \
             highlight {GROUP}{i} {t}fg=NONE {t}bg=NONE | endtry")
}

fn escape_pattern(code: &str) -> String {
    let mut escaped = String::with_capacity(code.len() * 2);
    for c in code.chars() {
        if PATTERN_SPECIALS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn resolve(spec: &str) -> Rgba {
    color::parse_color(spec).unwrap_or_else(|e| {
        log::warn!("{e}, highlighting as black");
        Rgba::BLACK
    })
}

pub fn settings(table: &PixmapTable, term: Term) -> VimSettings {
    log::debug!("vim settings for {} colors ({term:?})", table.colors().len());
    let t = term.prefix();
    let mut highlights = Vec::with_capacity(table.colors().len());
    for (i, entry) in table.colors().iter().enumerate() {
        let spec = entry.best_spec().unwrap_or("None");
        let highlight = match term {
            Term::Gui => {
                let name = spec.split_ascii_whitespace().collect::<String>().to_uppercase();
                if name == "NONE" {
                    transparent_highlight(i, term)
                } else {
                    format!("highlight {GROUP}{i} {t}fg={name} {t}bg={name}")
                }
            }
            Term::Cterm => {
                let rgba = resolve(spec);
                if rgba.is_transparent() {
                    transparent_highlight(i, term)
                } else {
                    let n = color::to_ansi256(rgba.r, rgba.g, rgba.b);
                    format!("highlight {GROUP}{i} {t}fg={n} {t}bg={n}")
                }
            }
        };
        let syntax_match = format!("syntax match {GROUP}{i} /{}/ contained", escape_pattern(&entry.code));
        highlights.push(VimHighlight { highlight, syntax_match });
    }
    let groups = (0..highlights.len()).map(|i| format!("{GROUP}{i}")).collect::<Vec<_>>();
    let cluster = format!("syntax cluster {CLUSTER} contains={}", groups.join(","));
    VimSettings { highlights, cluster }
}
