// SPDX-License-Identifier: GPL-3.0-only

//! Per-(source, destination) shader specialisation.
//!
//! Every per-conversion quantity — geometry, plane offsets, colour
//! matrices, range scale/offsets — is injected as a compile-time constant
//! so the kernel never branches on format at runtime. WGSL's `override`
//! declarations are wgpu's specialisation-constant mechanism: a value
//! resolved once, at [`wgpu::Device::create_compute_pipeline`] time, via
//! [`wgpu::PipelineCompilationOptions::constants`], rather than baked into
//! the shader's text. That avoids textual macro injection (no
//! locale/float-formatting concerns, and no template string to keep in
//! sync with the WGSL source's identifiers) so this module builds a
//! `HashMap<String, f64>` instead of rendering GLSL `#define`s.
//!
//! `override` constants are restricted to scalar numeric types, so matrices
//! and vectors are split into one named scalar per component
//! (`SRC_RGB_TO_YUV_M00` .. `M22`, `SRC_YUV_OFFSET_0` .. `_2`, etc.) and
//! reassembled inside the kernel.

use std::collections::HashMap;

use crate::color::{self, Matrix3};
use crate::frame::VideoFrame;
use crate::pixel_format::{self, ChromaSubsampling, Family};

/// The single WGSL compute shader every (src, dst) pair specialises.
pub const KERNEL_SOURCE: &str = include_str!("shaders/convert.wgsl");

/// Build the full `override` constant table for converting `src` into `dst`.
///
/// Every key here must have a matching `override` declaration in
/// [`KERNEL_SOURCE`] — [`crate::pipeline::ConversionPipeline::new`] passes
/// this map straight to `PipelineCompilationOptions::constants` and wgpu
/// rejects unknown or missing identifiers at pipeline-creation time.
pub fn constants(src: &VideoFrame, dst: &VideoFrame) -> HashMap<String, f64> {
    let mut map = HashMap::with_capacity(96);
    side_constants(&mut map, "SRC", src);
    side_constants(&mut map, "DST", dst);
    map
}

fn side_constants(map: &mut HashMap<String, f64>, prefix: &str, frame: &VideoFrame) {
    let info = pixel_format::format_info(frame.pixel_format);
    let (chroma_width, chroma_height) = (frame.chroma_width(), frame.chroma_height());

    map.insert(format!("{prefix}_WIDTH"), frame.width as f64);
    map.insert(format!("{prefix}_HEIGHT"), frame.height as f64);
    map.insert(format!("{prefix}_STRIDE"), frame.stride as f64);
    map.insert(format!("{prefix}_CHROMA_WIDTH"), chroma_width as f64);
    map.insert(format!("{prefix}_CHROMA_HEIGHT"), chroma_height as f64);
    map.insert(format!("{prefix}_CHROMA_STRIDE"), frame.chroma_stride as f64);

    map.insert(
        format!("{prefix}_FORMAT"),
        pixel_format::format_tag(frame.pixel_format) as f64,
    );
    map.insert(
        format!("{prefix}_CHROMA_SUBSAMPLING"),
        subsampling_tag(info.subsampling) as f64,
    );
    map.insert(format!("{prefix}_CHROMA_OFFSET"), frame.chroma_offset() as f64);
    map.insert(format!("{prefix}_U_OFFSET"), frame.cb_offset() as f64);
    map.insert(format!("{prefix}_V_OFFSET"), frame.cr_offset() as f64);

    map.insert(format!("{prefix}_BIT_DEPTH"), info.bit_depth as f64);
    map.insert(format!("{prefix}_BYTE_DEPTH"), info.byte_depth() as f64);
    map.insert(
        format!("{prefix}_RANGE"),
        if frame.range == color::VideoRange::Full || info.family == Family::Rgb {
            1.0
        } else {
            0.0
        },
    );
    map.insert(
        format!("{prefix}_YUV_MATRIX"),
        frame.luma_chroma_matrix as u32 as f64,
    );
    map.insert(
        format!("{prefix}_IS_RGB"),
        if info.family == Family::Rgb { 1.0 } else { 0.0 },
    );

    let encode = color::rgb_to_ycbcr_matrix(frame.luma_chroma_matrix);
    let decode = color::ycbcr_to_rgb_matrix(frame.luma_chroma_matrix);
    insert_matrix(map, &format!("{prefix}_RGB_TO_YUV"), &encode);
    insert_matrix(map, &format!("{prefix}_YUV_TO_RGB"), &decode);

    let scale = color::range_scale(frame.range, info.bit_depth);
    let offset = color::range_offset(frame.range, info.bit_depth);
    let offset_full = color::range_offset(color::VideoRange::Full, info.bit_depth);
    insert_vec3(map, &format!("{prefix}_YUV_SCALE"), scale);
    insert_vec3(map, &format!("{prefix}_YUV_OFFSET"), offset);
    insert_vec3(map, &format!("{prefix}_YUV_OFFSET_FULL"), offset_full);

    insert_layout_constants(map, prefix, frame);
}

/// Family/layout details the kernel needs to pick a decode/encode routine
/// that isn't already covered by the generic quantities above: component
/// byte-swizzle (RGB order, YCbCr interleaved order) and plane-order swap
/// flags (YV12 vs I420, NV21 vs NV12).
fn insert_layout_constants(map: &mut HashMap<String, f64>, prefix: &str, frame: &VideoFrame) {
    use crate::pixel_format::PixelFormat::*;

    let kind = kernel_family(frame.pixel_format);
    map.insert(format!("{prefix}_KERNEL_FAMILY"), kind as u32 as f64);

    let swizzle = match frame.pixel_format {
        Rgba8 => [0, 1, 2, 3],
        Bgra8 => [2, 1, 0, 3],
        Argb8 => [1, 2, 3, 0],
        Uyvy => [1, 0, 3, 2],  // Y0, U, Y1, V byte positions
        Yuyv => [0, 1, 2, 3],
        Yvyu => [0, 3, 2, 1],
        Vyuy => [1, 2, 3, 0],
        _ => [0, 1, 2, 3],
    };
    for (i, value) in swizzle.iter().enumerate() {
        map.insert(format!("{prefix}_SWIZZLE_{i}"), *value as f64);
    }

    let plane_swap = matches!(frame.pixel_format, Yv12 | Nv21);
    map.insert(
        format!("{prefix}_PLANE_SWAP"),
        if plane_swap { 1.0 } else { 0.0 },
    );
}

/// A small set of shader-side "how do I read/write this byte pattern"
/// families, grouping formats that only differ by a byte-order swizzle or a
/// plane-order swap baked into the constants above. This keeps the kernel's
/// branch count proportional to the number of *layouts* (about eight) rather
/// than the number of `PixelFormat` variants (twenty-five); every branch
/// condition compares an `override` constant against a literal, which wgpu's
/// shader compiler folds away for the unreachable arms of a given pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum KernelFamily {
    Rgba8Swizzled = 0,
    Rgb10a2 = 1,
    Ycc8Interleaved422 = 2,
    V210Packed = 3,
    YccPlanar = 4,
    YccBiplanar = 5,
    Y216Interleaved = 6,
}

fn kernel_family(format: pixel_format::PixelFormat) -> KernelFamily {
    use crate::pixel_format::PixelFormat::*;
    use KernelFamily::*;

    match format {
        Rgba8 | Bgra8 | Argb8 => Rgba8Swizzled,
        Rgb10a2 => Rgb10a2,
        Uyvy | Yuyv | Yvyu | Vyuy => Ycc8Interleaved422,
        V210 => V210Packed,
        Y216 => Y216Interleaved,
        I420 | Yv12 | I010 | I422 | I210 | I444 | I410 | I012 => YccPlanar,
        Nv12 | Nv21 | P010 | P210 | P410 | P216 | P416 => YccBiplanar,
    }
}

fn subsampling_tag(sub: ChromaSubsampling) -> u32 {
    match sub {
        ChromaSubsampling::None => 0,
        ChromaSubsampling::Yuv444 => 1,
        ChromaSubsampling::Yuv422 => 2,
        ChromaSubsampling::Yuv420 => 3,
    }
}

fn insert_matrix(map: &mut HashMap<String, f64>, prefix: &str, matrix: &Matrix3) {
    for (row_index, row) in matrix.rows.iter().enumerate() {
        for (col_index, value) in row.iter().enumerate() {
            map.insert(format!("{prefix}_M{row_index}{col_index}"), *value as f64);
        }
    }
}

fn insert_vec3(map: &mut HashMap<String, f64>, prefix: &str, v: [f32; 3]) {
    for (i, value) in v.iter().enumerate() {
        map.insert(format!("{prefix}_{i}"), *value as f64);
    }
}
