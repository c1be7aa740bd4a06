//! Host-side pixel data.
//!
//! Backends fill a [`PixelBuffer`] in whatever row order they produce and
//! say which one it is; the job converts to the order the file should use.

mod layout;
mod pixels;

pub use layout::{decode_row, RowLayout, MAX_STAGING_BAND_BYTES};
pub use pixels::{PixelBuffer, RowOrder};
