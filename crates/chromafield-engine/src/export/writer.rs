use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tiff::encoder::{colortype, TiffEncoder, TiffKind};
use tiff::TiffResult;

use crate::coords::Extent;
use crate::error::{ExportSource, RenderError, RenderResult};
use crate::readback::PixelBuffer;

/// Largest file a classic TIFF can address with 32-bit offsets.
const CLASSIC_TIFF_LIMIT: u64 = u32::MAX as u64;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Container {
    Classic,
    Big,
}

/// Classic TIFF while the file fits under `classic_limit` bytes, BigTIFF beyond.
fn container_for(extent: Extent, classic_limit: u64) -> Container {
    // Samples plus header, IFD and one strip offset/count pair per row.
    let estimate = extent.pixel_count() * 6 + 4096 + 16 * extent.height() as u64;
    if estimate > classic_limit {
        Container::Big
    } else {
        Container::Classic
    }
}

fn encode<W: Write + Seek, K: TiffKind>(
    mut encoder: TiffEncoder<W, K>,
    extent: Extent,
    samples: &[u16],
) -> TiffResult<()> {
    encoder.write_image::<colortype::RGB16>(extent.width(), extent.height(), samples)
}

/// `true` for `.tif` / `.tiff` (any case).
pub fn has_tiff_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
}

/// Encodes `pixels` as a 16-bit RGB TIFF at `path`, rows in buffer order.
///
/// The format is always TIFF regardless of the extension. Outputs past the
/// 4 GiB classic limit are written as BigTIFF. A failed write leaves whatever
/// the encoder had flushed; there is no retry.
pub fn write_tiff(pixels: PixelBuffer, path: &Path) -> RenderResult<()> {
    write_tiff_within(pixels, path, CLASSIC_TIFF_LIMIT)
}

fn write_tiff_within(pixels: PixelBuffer, path: &Path, classic_limit: u64) -> RenderResult<()> {
    let export_error = |source: ExportSource| RenderError::Export {
        path: path.to_path_buf(),
        source,
    };

    if !has_tiff_extension(path) {
        log::warn!("'{}' does not end in .tif/.tiff; writing TIFF anyway", path.display());
    }

    let extent = pixels.extent();
    if !pixels.is_complete() {
        return Err(export_error(ExportSource::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "pixel buffer is smaller than its extent",
        ))));
    }

    let container = container_for(extent, classic_limit);
    let file = File::create(path).map_err(|e| export_error(ExportSource::Io(e)))?;
    let mut writer = BufWriter::new(file);
    let samples = pixels.samples();
    let encoded = match container {
        Container::Classic => {
            TiffEncoder::new(&mut writer).and_then(|enc| encode(enc, extent, samples))
        }
        Container::Big => {
            TiffEncoder::new_big(&mut writer).and_then(|enc| encode(enc, extent, samples))
        }
    };
    encoded.map_err(|e| export_error(ExportSource::Tiff(e)))?;

    // Flush explicitly so a full disk surfaces here instead of in Drop.
    let file = writer
        .into_inner()
        .map_err(|e| export_error(ExportSource::Io(e.into_error())))?;
    file.sync_all().map_err(|e| export_error(ExportSource::Io(e)))?;

    log::debug!(
        "wrote {}x{} 16-bit RGB {:?} TIFF to '{}'",
        extent.width(),
        extent.height(),
        container,
        path.display()
    );
    Ok(())
}
