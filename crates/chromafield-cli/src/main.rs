use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use chromafield_engine::device::{BackendChoice, HeadlessInit};
use chromafield_engine::job::{BackendKind, JobConfig};
use chromafield_engine::logging::{init_logging, LoggingConfig};
use chromafield_engine::readback::RowOrder;

/// Render a 16-bit RGB interference gradient off-screen and save it as TIFF.
#[derive(Debug, Parser)]
#[command(name = "chromafield", version)]
struct Args {
    /// Output width in pixels.
    #[arg(long, default_value_t = 40_000)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 40_000)]
    height: u32,

    /// Output file (always written as TIFF).
    #[arg(short, long, default_value = "custom_gradient_image.tiff")]
    output: PathBuf,

    /// Rendering backend.
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Prefer a low-power adapter.
    #[arg(long)]
    low_power: bool,

    /// Use the platform's software fallback adapter.
    #[arg(long)]
    fallback_adapter: bool,

    /// Write the top edge of the image as the first row.
    #[arg(long)]
    top_down: bool,

    /// env_logger filter, e.g. "debug" or "chromafield_engine=debug".
    #[arg(long)]
    log: Option<String>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum BackendArg {
    Auto,
    Vulkan,
    Metal,
    Dx12,
    Gl,
    Software,
}

impl Args {
    fn job_config(&self) -> JobConfig {
        let gpu = |backend| {
            BackendKind::Gpu(HeadlessInit {
                backend,
                power_preference: if self.low_power {
                    wgpu::PowerPreference::LowPower
                } else {
                    wgpu::PowerPreference::HighPerformance
                },
                force_fallback_adapter: self.fallback_adapter,
                ..HeadlessInit::default()
            })
        };

        let backend = match self.backend {
            BackendArg::Auto => gpu(BackendChoice::Auto),
            BackendArg::Vulkan => gpu(BackendChoice::Vulkan),
            BackendArg::Metal => gpu(BackendChoice::Metal),
            BackendArg::Dx12 => gpu(BackendChoice::Dx12),
            BackendArg::Gl => gpu(BackendChoice::Gl),
            BackendArg::Software => BackendKind::Software,
        };

        JobConfig {
            width: self.width,
            height: self.height,
            output: self.output.clone(),
            row_order: if self.top_down {
                RowOrder::TopDown
            } else {
                RowOrder::BottomUp
            },
            backend,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    let config = args.job_config();
    log::debug!("{config:?}");

    let report = chromafield_engine::run(&config).with_context(|| {
        format!(
            "could not create {}x{} gradient at '{}'",
            config.width,
            config.height,
            config.output.display()
        )
    })?;

    log::info!(
        "{} on {}: render {:.2?}, export {:.2?}",
        report.output.display(),
        report.backend,
        report.render_time,
        report.export_time
    );
    println!("{}", report.success_message());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_classic_invocation() {
        let args = Args::parse_from(["chromafield"]);
        let config = args.job_config();
        assert_eq!((config.width, config.height), (40_000, 40_000));
        assert_eq!(config.output, PathBuf::from("custom_gradient_image.tiff"));
        assert_eq!(config.row_order, RowOrder::BottomUp);
        assert!(matches!(config.backend, BackendKind::Gpu(_)));
    }

    #[test]
    fn software_backend_and_top_down() {
        let args = Args::parse_from([
            "chromafield",
            "--width",
            "4",
            "--height",
            "4",
            "-o",
            "test.tiff",
            "--backend",
            "software",
            "--top-down",
        ]);
        let config = args.job_config();
        assert_eq!((config.width, config.height), (4, 4));
        assert_eq!(config.row_order, RowOrder::TopDown);
        assert!(matches!(config.backend, BackendKind::Software));
    }

    #[test]
    fn gpu_switches_reach_headless_init() {
        let args = Args::parse_from([
            "chromafield",
            "--backend",
            "vulkan",
            "--low-power",
            "--fallback-adapter",
        ]);
        let BackendKind::Gpu(init) = args.job_config().backend else {
            panic!("expected a GPU backend");
        };
        assert_eq!(init.backend, BackendChoice::Vulkan);
        assert_eq!(init.power_preference, wgpu::PowerPreference::LowPower);
        assert!(init.force_fallback_adapter);
    }

    #[test]
    fn negative_width_is_rejected_by_the_parser() {
        assert!(Args::try_parse_from(["chromafield", "--width", "-4"]).is_err());
    }
}
