//! End-to-end runs through the public job API.

use std::path::Path;

use chromafield_engine::coords::Extent;
use chromafield_engine::device::HeadlessInit;
use chromafield_engine::job::{run, BackendKind, JobConfig};
use chromafield_engine::paint::gradient;
use chromafield_engine::readback::RowOrder;
use chromafield_engine::Stage;

fn software_config(width: u32, height: u32, output: &Path) -> JobConfig {
    JobConfig {
        width,
        height,
        output: output.to_path_buf(),
        row_order: RowOrder::BottomUp,
        backend: BackendKind::Software,
    }
}

fn read_rgb16(path: &Path) -> image::ImageBuffer<image::Rgb<u16>, Vec<u16>> {
    let img = image::open(path).unwrap();
    assert_eq!(img.color(), image::ColorType::Rgb16);
    img.into_rgb16()
}

#[test]
fn four_by_four_matches_reference_bottom_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.tiff");
    let report = run(&software_config(4, 4, &path)).unwrap();
    assert_eq!(report.output, path);

    let img = read_rgb16(&path);
    assert_eq!(img.dimensions(), (4, 4));

    let extent = Extent::new(4, 4).unwrap();
    for (x, y, px) in img.enumerate_pixels() {
        // File row 0 is the bottom edge of the rendered image.
        let expected = gradient::shade_unorm16(extent.pixel_center_uv(x, 3 - y));
        assert_eq!(px.0, expected, "file pixel ({x}, {y})");
    }
}

#[test]
fn top_down_flag_flips_file_rows() {
    let dir = tempfile::tempdir().unwrap();
    let bottom_up = dir.path().join("bu.tiff");
    let top_down = dir.path().join("td.tiff");
    run(&software_config(5, 3, &bottom_up)).unwrap();
    run(&JobConfig {
        row_order: RowOrder::TopDown,
        ..software_config(5, 3, &top_down)
    })
    .unwrap();

    let a = read_rgb16(&bottom_up);
    let b = read_rgb16(&top_down);
    for y in 0..3 {
        for x in 0..5 {
            assert_eq!(a.get_pixel(x, y), b.get_pixel(x, 2 - y));
        }
    }
}

#[test]
fn output_dimensions_match_request() {
    let dir = tempfile::tempdir().unwrap();
    for (w, h) in [(1, 1), (1, 7), (9, 2), (33, 17)] {
        let path = dir.path().join(format!("{w}x{h}.tiff"));
        run(&software_config(w, h, &path)).unwrap();
        assert_eq!(read_rgb16(&path).dimensions(), (w, h));
    }
}

#[test]
fn repeated_runs_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.tiff");
    let b = dir.path().join("b.tiff");
    run(&software_config(16, 8, &a)).unwrap();
    run(&software_config(16, 8, &b)).unwrap();
    assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
}

#[test]
fn zero_height_is_a_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.tiff");
    let err = run(&software_config(4, 0, &path)).unwrap_err();
    assert_eq!(err.stage(), Stage::Validation);
    assert!(!path.exists());
}

#[test]
fn write_into_missing_directory_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no").join("such").join("dir.tiff");
    let err = run(&software_config(2, 2, &path)).unwrap_err();
    assert_eq!(err.stage(), Stage::Export);
}

#[test]
fn gpu_render_matches_reference_within_tolerance_or_skips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gpu.tiff");
    let config = JobConfig {
        backend: BackendKind::Gpu(HeadlessInit::default()),
        ..software_config(64, 48, &path)
    };
    let report = match run(&config) {
        Ok(r) => r,
        Err(e) if e.stage() == Stage::Context => {
            println!("Skipping GPU end-to-end test: {e}");
            return;
        }
        Err(e) => panic!("GPU run failed: {e}"),
    };
    println!("rendered on {}", report.backend);

    let img = read_rgb16(&path);
    let extent = Extent::new(64, 48).unwrap();
    // GPU sin() loses precision for the large arguments of the ripple terms.
    let tolerance = 655;
    for (x, y, px) in img.enumerate_pixels() {
        let expected = gradient::shade_unorm16(extent.pixel_center_uv(x, 47 - y));
        for c in 0..3 {
            let diff = (px.0[c] as i32 - expected[c] as i32).abs();
            assert!(
                diff <= tolerance,
                "pixel ({x}, {y}) channel {c}: got {}, expected {}",
                px.0[c],
                expected[c]
            );
        }
    }
}
