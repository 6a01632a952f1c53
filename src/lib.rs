pub mod color;
pub mod error;
pub mod loader;
pub mod parser;
pub mod raster;
pub mod vim;
#[cfg(feature = "display")]
pub mod display;

pub use error::XpmError;
pub use loader::{load, print_rows, LoadError};
pub use parser::PixmapTable;
