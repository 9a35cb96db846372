// SPDX-License-Identifier: GPL-3.0-only

//! Per-stage conversion timing and the CSV report the benchmark binary
//! writes, matching a fixed column layout byte-for-byte so existing
//! spreadsheets/scripts built against it keep working.

use std::fmt::Write as _;

use crate::pixel_format::PixelFormat;

/// Timing for one [`crate::converter::VideoConverter::convert_with_benchmark`]
/// call, in microseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct BenchmarkResult {
    pub copy_to_device_visible_time_micros: u64,
    /// Always zero: uploads go straight into the storage buffer the kernel
    /// reads, collapsing the device-visible and device-local copies a
    /// two-buffer staging strategy would time separately. See DESIGN.md.
    pub transfer_device_visible_to_device_local_time_micros: u64,
    pub compute_conversion_time_micros: u64,
    pub copy_device_visible_to_host_local_time_micros: u64,
}

impl BenchmarkResult {
    pub fn total_time_micros(&self) -> u64 {
        self.copy_to_device_visible_time_micros
            + self.transfer_device_visible_to_device_local_time_micros
            + self.compute_conversion_time_micros
            + self.copy_device_visible_to_host_local_time_micros
    }

    fn average(samples: &[BenchmarkResult]) -> BenchmarkResult {
        let count = samples.len() as u64;
        if count == 0 {
            return BenchmarkResult::default();
        }
        let sum = samples.iter().fold(BenchmarkResult::default(), |acc, s| BenchmarkResult {
            copy_to_device_visible_time_micros: acc.copy_to_device_visible_time_micros
                + s.copy_to_device_visible_time_micros,
            transfer_device_visible_to_device_local_time_micros: acc
                .transfer_device_visible_to_device_local_time_micros
                + s.transfer_device_visible_to_device_local_time_micros,
            compute_conversion_time_micros: acc.compute_conversion_time_micros + s.compute_conversion_time_micros,
            copy_device_visible_to_host_local_time_micros: acc.copy_device_visible_to_host_local_time_micros
                + s.copy_device_visible_to_host_local_time_micros,
        });
        BenchmarkResult {
            copy_to_device_visible_time_micros: sum.copy_to_device_visible_time_micros / count,
            transfer_device_visible_to_device_local_time_micros: sum
                .transfer_device_visible_to_device_local_time_micros
                / count,
            compute_conversion_time_micros: sum.compute_conversion_time_micros / count,
            copy_device_visible_to_host_local_time_micros: sum.copy_device_visible_to_host_local_time_micros / count,
        }
    }
}

/// One CSV row: the format/resolution pair a batch of runs was measured for,
/// plus the averaged per-stage timings across that batch.
pub struct BenchmarkRow {
    pub input_format: PixelFormat,
    pub input_width: u32,
    pub input_height: u32,
    pub output_format: PixelFormat,
    pub output_width: u32,
    pub output_height: u32,
    pub result: BenchmarkResult,
}

impl BenchmarkRow {
    pub fn from_samples(
        input_format: PixelFormat,
        input_width: u32,
        input_height: u32,
        output_format: PixelFormat,
        output_width: u32,
        output_height: u32,
        samples: &[BenchmarkResult],
    ) -> Self {
        Self {
            input_format,
            input_width,
            input_height,
            output_format,
            output_width,
            output_height,
            result: BenchmarkResult::average(samples),
        }
    }
}

const CSV_HEADER: &str = "InputFormat,InputWidth,InputHeight,OutputFormat,OutputWidth,OutputHeight,\
CopyToDeviceVisibleTimeMicros,TransferDeviceVisibleToDeviceLocalTimeMicros,ComputeConversionTimeMicros,\
CopyDeviceVisibleToHostLocalTimeMicros,TotalTime";

/// Render `rows` as CSV text with a fixed column header, one row per
/// format/resolution pair.
pub fn to_csv(rows: &[BenchmarkRow]) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');
    for row in rows {
        let _ = writeln!(
            out,
            "{:?},{},{},{:?},{},{},{},{},{},{},{}",
            row.input_format,
            row.input_width,
            row.input_height,
            row.output_format,
            row.output_width,
            row.output_height,
            row.result.copy_to_device_visible_time_micros,
            row.result.transfer_device_visible_to_device_local_time_micros,
            row.result.compute_conversion_time_micros,
            row.result.copy_device_visible_to_host_local_time_micros,
            row.result.total_time_micros(),
        );
    }
    out
}
