// SPDX-License-Identifier: GPL-3.0-only

//! [`VideoConverter`]: the public entry point that validates frame
//! descriptors, caches a GPU pipeline keyed on frame layout, and drives one
//! end-to-end conversion.

use std::time::Instant;

use tracing::debug;

use crate::benchmark::BenchmarkResult;
use crate::errors::{ConvertError, ConvertResult};
use crate::frame::{FrameLayoutKey, VideoFrame};
use crate::gpu::Device;
use crate::pipeline::ConversionPipeline;
use crate::pixel_format;

/// Converts between [`VideoFrame`] pixel formats on one GPU device.
///
/// Every method takes `&mut self` and there is no internal locking, so a
/// `VideoConverter` cannot be driven by two calls at once — deliberately
/// `!Sync` by construction rather than by a marker. Share one [`Device`]
/// across threads (it's cheaply `Clone`) and give each thread its own
/// `VideoConverter` instead of sharing one behind a lock.
pub struct VideoConverter {
    device: Device,
    cached: Option<(FrameLayoutKey, FrameLayoutKey, ConversionPipeline)>,
}

impl VideoConverter {
    pub fn new(device: Device) -> Self {
        Self { device, cached: None }
    }

    /// Checked resolution first (so a zero-size frame never reaches the
    /// format check), then source and destination format membership.
    ///
    /// `PixelFormat` is a closed Rust enum, so the format-membership checks
    /// below are vacuously true for any value the type system will let a
    /// caller construct; they're kept anyway to mark the boundary where a
    /// runtime format-tag check belongs.
    fn validate(src: &VideoFrame, dst: &VideoFrame) -> ConvertResult<()> {
        // errors::ConvertError::InvalidOutputResolution is reserved for a
        // future upper-bound check; a zero dimension on either frame reports
        // InvalidInputResolution, per that variant's doc comment.
        if src.width == 0 || src.height == 0 || !src.buffer_large_enough() {
            return Err(ConvertError::InvalidInputResolution);
        }
        if dst.width == 0 || dst.height == 0 || !dst.buffer_large_enough() {
            return Err(ConvertError::InvalidInputResolution);
        }
        if !pixel_format::ALL_FORMATS.contains(&src.pixel_format) {
            return Err(ConvertError::InvalidInputFormat);
        }
        if !pixel_format::ALL_FORMATS.contains(&dst.pixel_format) {
            return Err(ConvertError::InvalidOutputFormat);
        }
        Ok(())
    }

    fn pipeline(&mut self, src: &VideoFrame, dst: &VideoFrame) -> &ConversionPipeline {
        let (src_key, dst_key) = (src.layout_key(), dst.layout_key());
        let stale = match &self.cached {
            Some((cached_src, cached_dst, _)) => *cached_src != src_key || *cached_dst != dst_key,
            None => true,
        };
        if stale {
            debug!(
                src_format = ?src.pixel_format,
                dst_format = ?dst.pixel_format,
                width = dst.width,
                height = dst.height,
                "rebuilding conversion pipeline for new frame layout"
            );
            let pipeline = ConversionPipeline::new(&self.device, src, dst);
            self.cached = Some((src_key, dst_key, pipeline));
        }
        &self.cached.as_ref().expect("just populated above").2
    }

    /// Convert `src` into `dst`. Source and destination may differ in
    /// resolution (scaled by nearest-neighbor source-coordinate mapping),
    /// pixel format, range, or colour matrix.
    pub async fn convert(&mut self, src: &VideoFrame, dst: &mut VideoFrame) -> ConvertResult<()> {
        self.convert_with_benchmark(src, dst).await.map(|_| ())
    }

    /// Same conversion as [`convert`](Self::convert), additionally returning
    /// per-stage timing suitable for the benchmark CSV report.
    pub async fn convert_with_benchmark(
        &mut self,
        src: &VideoFrame,
        dst: &mut VideoFrame,
    ) -> ConvertResult<BenchmarkResult> {
        Self::validate(src, dst)?;

        let pipeline = self.pipeline(src, dst);

        let copy_start = Instant::now();
        self.device.queue.write_buffer(pipeline.src_buffer(), 0, &src.buffer);
        let copy_to_device_visible_time_micros = copy_start.elapsed().as_micros() as u64;

        let compute_start = Instant::now();
        let mut encoder = self
            .device
            .wgpu_device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pixelconv convert encoder"),
            });
        pipeline.record(&mut encoder);
        self.device.queue.submit(std::iter::once(encoder.finish()));
        let _ = self.device.wgpu_device.poll(wgpu::PollType::wait_indefinitely());
        let compute_conversion_time_micros = compute_start.elapsed().as_micros() as u64;

        let readback_start = Instant::now();
        let data = read_staging_buffer(&self.device.wgpu_device, pipeline.dst_staging_buffer()).await?;
        let copy_len = data.len().min(dst.buffer.len());
        dst.buffer[..copy_len].copy_from_slice(&data[..copy_len]);
        let copy_device_visible_to_host_local_time_micros = readback_start.elapsed().as_micros() as u64;

        Ok(BenchmarkResult {
            copy_to_device_visible_time_micros,
            transfer_device_visible_to_device_local_time_micros: 0,
            compute_conversion_time_micros,
            copy_device_visible_to_host_local_time_micros,
        })
    }
}

async fn read_staging_buffer(device: &wgpu::Device, buffer: &wgpu::Buffer) -> ConvertResult<Vec<u8>> {
    let slice = buffer.slice(..);
    let (sender, receiver) = futures::channel::oneshot::channel();

    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });

    let _ = device.poll(wgpu::PollType::wait_indefinitely());

    receiver
        .await
        .map_err(|_| ConvertError::Unknown("staging buffer mapping channel closed".to_string()))?
        .map_err(|_| ConvertError::Unknown("failed to map staging buffer for readback".to_string()))?;

    let data = slice.get_mapped_range().to_vec();
    drop(slice);
    buffer.unmap();
    Ok(data)
}
