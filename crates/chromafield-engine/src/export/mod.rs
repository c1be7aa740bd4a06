//! Image file output.

mod writer;

pub use writer::{has_tiff_extension, write_tiff};
