// SPDX-License-Identifier: GPL-3.0-only

//! `VideoFrame`: the descriptor a caller fills in to point the converter at
//! a source or destination buffer, plus the quantities derived from it.

use crate::color::{LumaChromaMatrix, VideoRange};
use crate::pixel_format::{self, PixelFormat};

/// Describes one frame's memory layout and geometry. The converter never
/// copies a `VideoFrame` into GPU memory on its own — `buffer` is expected to
/// already be host-readable (or host-writable, for the destination frame)
/// bytes the caller owns for the duration of the call.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Row stride, in bytes, of the luma/interleaved plane.
    pub stride: u32,
    /// Row stride, in bytes, of a single chroma component plane. Ignored for
    /// interleaved and pure-RGB formats.
    pub chroma_stride: u32,
    pub pixel_format: PixelFormat,
    pub range: VideoRange,
    pub luma_chroma_matrix: LumaChromaMatrix,
}

impl VideoFrame {
    /// Convenience constructor that fills `stride`/`chroma_stride` with the
    /// format's minimum packing, and allocates a zeroed buffer sized to
    /// match.
    pub fn new_zeroed(
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        range: VideoRange,
        luma_chroma_matrix: LumaChromaMatrix,
    ) -> Self {
        let stride = pixel_format::min_stride(pixel_format, width);
        let (chroma_width, chroma_height) = pixel_format::chroma_dimensions(pixel_format, width, height);
        let chroma_stride = chroma_width * pixel_format::format_info(pixel_format).byte_depth();
        let buffer_size = pixel_format::buffer_size(pixel_format, stride, height, chroma_stride, chroma_height);
        Self {
            buffer: vec![0u8; buffer_size as usize],
            width,
            height,
            stride,
            chroma_stride,
            pixel_format,
            range,
            luma_chroma_matrix,
        }
    }

    pub fn chroma_width(&self) -> u32 {
        pixel_format::chroma_dimensions(self.pixel_format, self.width, self.height).0
    }

    pub fn chroma_height(&self) -> u32 {
        pixel_format::chroma_dimensions(self.pixel_format, self.width, self.height).1
    }

    /// Byte offset of the combined/interleaved chroma plane, for biplanar
    /// formats. Zero for planar (use [`cb_offset`]/[`cr_offset`] directly)
    /// and interleaved formats.
    ///
    /// [`cb_offset`]: VideoFrame::cb_offset
    /// [`cr_offset`]: VideoFrame::cr_offset
    pub fn chroma_offset(&self) -> u64 {
        pixel_format::chroma_offset(
            self.pixel_format,
            self.stride,
            self.height,
            self.chroma_stride,
            self.chroma_height(),
        )
    }

    pub fn cb_offset(&self) -> u64 {
        pixel_format::cb_offset(
            self.pixel_format,
            self.stride,
            self.height,
            self.chroma_stride,
            self.chroma_height(),
        )
    }

    pub fn cr_offset(&self) -> u64 {
        pixel_format::cr_offset(
            self.pixel_format,
            self.stride,
            self.height,
            self.chroma_stride,
            self.chroma_height(),
        )
    }

    /// Total number of bytes this frame's layout requires. Does not inspect
    /// `self.buffer.len()` — use [`VideoFrame::buffer_large_enough`] to check
    /// the buffer actually holds that many bytes.
    pub fn required_buffer_size(&self) -> u64 {
        pixel_format::buffer_size(
            self.pixel_format,
            self.stride,
            self.height,
            self.chroma_stride,
            self.chroma_height(),
        )
    }

    pub fn buffer_large_enough(&self) -> bool {
        self.buffer.len() as u64 >= self.required_buffer_size()
    }

    /// Whether two frames share every property the cached GPU pipeline keys
    /// on. The converter tears down and rebuilds its cached pipeline and
    /// buffers whenever a new call's frames fail this check against the
    /// frames the cache was built for.
    pub fn layout_equals(&self, other: &VideoFrame) -> bool {
        self.layout_key() == other.layout_key()
    }

    /// The subset of this frame's fields the cached GPU pipeline keys on,
    /// without `buffer` — cheap to keep around as a cache key instead of
    /// cloning a full frame (and its potentially multi-megabyte pixel data)
    /// just to remember its layout.
    pub fn layout_key(&self) -> FrameLayoutKey {
        FrameLayoutKey {
            width: self.width,
            height: self.height,
            stride: self.stride,
            chroma_stride: self.chroma_stride,
            pixel_format: self.pixel_format,
            range: self.range,
            luma_chroma_matrix: self.luma_chroma_matrix,
        }
    }
}

/// [`VideoFrame::layout_key`]'s return type: every field [`VideoFrame::layout_equals`]
/// compares, with no `buffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayoutKey {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub chroma_stride: u32,
    pub pixel_format: PixelFormat,
    pub range: VideoRange,
    pub luma_chroma_matrix: LumaChromaMatrix,
}
