//! Error conditions of the XPM reader, numbered like libXpm status codes
use std::io;
use thiserror::Error;

pub const XPM_COLOR_ERROR: i32 = 1;
pub const XPM_SUCCESS: i32 = 0;
pub const XPM_OPEN_FAILED: i32 = -1;
pub const XPM_FILE_INVALID: i32 = -2;
// allocation failure aborts in Rust, so no error carries this code
pub const XPM_NO_MEMORY: i32 = -3;
pub const XPM_COLOR_FAILED: i32 = -4;

#[derive(Debug, Error)]
pub enum XpmError {
    #[error("XpmOpenFailed: {0}")]
    OpenFailed(#[from] io::Error),

    #[error("XpmFileInvalid: {0}")]
    FileInvalid(String),

    #[error("XpmColorError: {0}")]
    ColorError(String),

    #[error("XpmColorFailed: {0}")]
    ColorFailed(String),
}

impl XpmError {
    pub(crate) fn invalid(reason: impl Into<String>) -> XpmError {
        XpmError::FileInvalid(reason.into())
    }

    /// Status code as libXpm would report it. Never `XPM_SUCCESS`.
    pub fn status(&self) -> i32 {
        match self {
            XpmError::OpenFailed(_) => XPM_OPEN_FAILED,
            XpmError::FileInvalid(_) => XPM_FILE_INVALID,
            XpmError::ColorError(_) => XPM_COLOR_ERROR,
            XpmError::ColorFailed(_) => XPM_COLOR_FAILED,
        }
    }
}

/// Human-readable form of a status code, after `XpmGetErrorString`.
pub fn status_string(status: i32) -> &'static str {
    match status {
        XPM_COLOR_ERROR => "XpmColorError",
        XPM_SUCCESS => "XpmSuccess",
        XPM_OPEN_FAILED => "XpmOpenFailed",
        XPM_FILE_INVALID => "XpmFileInvalid",
        XPM_NO_MEMORY => "XpmNoMemory",
        XPM_COLOR_FAILED => "XpmColorFailed",
        _ => "Invalid XpmError",
    }
}
