// SPDX-License-Identifier: GPL-3.0-only

//! Benchmark/demo driver for the pixel-format conversion pipeline.
//!
//! Builds a source frame in one format, a destination frame in another,
//! runs the conversion a number of times (discarding the first call so
//! pipeline construction doesn't skew the average), and writes the
//! resulting per-stage timings as CSV — either to stdout or to a file.
//!
//! With no `--src-format`/`--dst-format` given, it sweeps every format in
//! [`pixelconv::PixelFormat::ALL_FORMATS`] against itself at the requested
//! resolution.

use std::path::PathBuf;

use clap::Parser;
use pixelconv::color::{LumaChromaMatrix, VideoRange};
use pixelconv::gpu::Device;
use pixelconv::pixel_format::{ALL_FORMATS, PixelFormat};
use pixelconv::{VideoConverter, VideoFrame};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "pixelconv-bench")]
#[command(version, about = "Benchmark GPU pixel-format conversion throughput", long_about = None)]
struct Cli {
    /// Source pixel format. Omit to sweep every supported format.
    #[arg(long)]
    src_format: Option<PixelFormat>,

    /// Destination pixel format. Omit to sweep every supported format.
    #[arg(long)]
    dst_format: Option<PixelFormat>,

    /// Source frame width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Source frame height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Destination frame width in pixels. Defaults to `--width`.
    #[arg(long)]
    dst_width: Option<u32>,

    /// Destination frame height in pixels. Defaults to `--height`.
    #[arg(long)]
    dst_height: Option<u32>,

    /// Number of timed conversions to average per format pair (one
    /// additional warm-up call is run first and excluded from the average).
    #[arg(long, default_value_t = 10)]
    iterations: u32,

    /// Write CSV here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let dst_width = cli.dst_width.unwrap_or(cli.width);
    let dst_height = cli.dst_height.unwrap_or(cli.height);

    let device = Device::create("pixelconv-bench device").await?;
    info!(adapter = %device.info.name, "acquired GPU device");
    let mut converter = VideoConverter::new(device);

    let src_formats: Vec<PixelFormat> = match cli.src_format {
        Some(format) => vec![format],
        None => ALL_FORMATS.to_vec(),
    };
    let dst_formats: Vec<PixelFormat> = match cli.dst_format {
        Some(format) => vec![format],
        None => ALL_FORMATS.to_vec(),
    };

    let mut rows = Vec::new();
    for &src_format in &src_formats {
        let src = VideoFrame::new_zeroed(
            cli.width,
            cli.height,
            src_format,
            VideoRange::Legal,
            LumaChromaMatrix::Bt709,
        );
        for &dst_format in &dst_formats {
            let mut dst = VideoFrame::new_zeroed(
                dst_width,
                dst_height,
                dst_format,
                VideoRange::Legal,
                LumaChromaMatrix::Bt709,
            );

            info!(
                src = ?src_format,
                src_w = cli.width,
                src_h = cli.height,
                dst = ?dst_format,
                dst_w = dst_width,
                dst_h = dst_height,
                "benchmarking conversion"
            );

            // Warm-up call: builds and caches the pipeline for this pair so
            // the timed iterations below measure steady-state throughput.
            if let Err(err) = converter.convert_with_benchmark(&src, &mut dst).await {
                warn!(?err, src = ?src_format, dst = ?dst_format, "skipping pair, conversion failed");
                continue;
            }

            let mut samples = Vec::with_capacity(cli.iterations as usize);
            for _ in 0..cli.iterations {
                match converter.convert_with_benchmark(&src, &mut dst).await {
                    Ok(result) => samples.push(result),
                    Err(err) => {
                        warn!(?err, src = ?src_format, dst = ?dst_format, "conversion failed mid-run");
                        break;
                    }
                }
            }
            if samples.is_empty() {
                continue;
            }

            rows.push(pixelconv::benchmark::BenchmarkRow::from_samples(
                src_format,
                cli.width,
                cli.height,
                dst_format,
                dst_width,
                dst_height,
                &samples,
            ));
        }
    }

    let csv = pixelconv::benchmark::to_csv(&rows);
    match cli.output {
        Some(path) => {
            std::fs::write(&path, csv)?;
            info!(path = %path.display(), rows = rows.len(), "wrote benchmark CSV");
        }
        None => print!("{csv}"),
    }

    Ok(())
}
