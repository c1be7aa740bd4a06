//! chromafield engine crate.
//!
//! Renders a fixed interference gradient into an off-screen target of any
//! size the device allows, reads it back as 16-bit RGB, and writes a TIFF.

pub mod backend;
pub mod coords;
pub mod device;
pub mod error;
pub mod export;
pub mod job;
pub mod logging;
pub mod paint;
pub mod readback;
pub mod render;

pub use error::{RenderError, RenderResult, Stage};
pub use job::{run, JobConfig, JobReport};
