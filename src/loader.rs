//! Load an XPM file and echo its table rows
use std::io::{self, Write};
use std::path::Path;
use log;
use thiserror::Error;

use crate::error::XpmError;
use crate::parser::{self, PixmapTable};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{message}")]
    LoadFailed { message: String, status: i32 },
}

impl LoadError {
    pub fn status(&self) -> i32 {
        match self {
            LoadError::LoadFailed { status, .. } => *status,
        }
    }
}

impl From<XpmError> for LoadError {
    fn from(e: XpmError) -> LoadError {
        LoadError::LoadFailed { message: e.to_string(), status: e.status() }
    }
}

pub fn load(path: impl AsRef<Path>) -> Result<PixmapTable, LoadError> {
    let table = parser::read_file(path)?;
    log::debug!("loaded {} rows, image {}x{}", table.len(), table.width(), table.height());
    Ok(table)
}

/// Writes `AA=<row 0>=AA`, then `BB=~<row>=~` for every row of the table.
pub fn print_rows(table: &PixmapTable, out: &mut impl Write) -> io::Result<()> {
    if let Some(first) = table.get(0) {
        writeln!(out, "AA={first}=AA")?;
    }
    for row in table.rows() {
        writeln!(out, "BB=~{row}=~")?;
    }
    out.flush()
}
