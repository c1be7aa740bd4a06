use std::path::PathBuf;

use crate::device::HeadlessInit;
use crate::readback::RowOrder;

/// Which backend renders the image.
#[derive(Debug, Clone)]
pub enum BackendKind {
    Gpu(HeadlessInit),
    /// CPU rasterizer; same pixels, no adapter needed.
    Software,
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::Gpu(HeadlessInit::default())
    }
}

/// Everything a run needs.
///
/// Defaults reproduce the classic invocation: a 40000x40000 image written to
/// `custom_gradient_image.tiff`, bottom row first.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
    pub row_order: RowOrder,
    pub backend: BackendKind,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            width: 40_000,
            height: 40_000,
            output: PathBuf::from("custom_gradient_image.tiff"),
            row_order: RowOrder::BottomUp,
            backend: BackendKind::default(),
        }
    }
}
