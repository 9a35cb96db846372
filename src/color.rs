// SPDX-License-Identifier: GPL-3.0-only

//! Colour-space maths: RGB↔YCbCr matrix construction and legal/full range
//! scaling.

/// Which set of luma/chroma coefficients a YCbCr frame was encoded with.
/// Numeric values match the ITU-T H.273 `MatrixCoefficients` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LumaChromaMatrix {
    Bt709 = 1,
    Bt2020Ncl = 9,
}

/// Legal (studio/"TV") range reserves the extremes of the sample range for
/// sync/footroom; full range uses the entire representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoRange {
    Legal,
    Full,
}

const KR_709: f32 = 0.2126;
const KB_709: f32 = 0.0722;
const KR_2020: f32 = 0.2627;
const KB_2020: f32 = 0.0593;

fn coefficients(matrix: LumaChromaMatrix) -> (f32, f32) {
    match matrix {
        LumaChromaMatrix::Bt709 => (KR_709, KB_709),
        LumaChromaMatrix::Bt2020Ncl => (KR_2020, KB_2020),
    }
}

/// Row-major 3x3 matrix, used for both the RGB->YCbCr encode matrix and its
/// inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    pub rows: [[f32; 3]; 3],
}

impl Matrix3 {
    pub fn multiply_vec(&self, v: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0; 3];
        for (row, value) in self.rows.iter().zip(out.iter_mut()) {
            *value = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
        }
        out
    }

    /// Inverse via the adjugate method. Every matrix this module constructs
    /// is non-singular (it encodes a linear colour-space change), so callers
    /// don't need to handle a failure case.
    pub fn inverse(&self) -> Matrix3 {
        let m = self.rows;
        let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
        let inv_det = 1.0 / det;

        let cofactor = |r0: usize, c0: usize, r1: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };

        Matrix3 {
            rows: [
                [
                    cofactor(1, 1, 2, 2) * inv_det,
                    -cofactor(0, 1, 2, 2) * inv_det,
                    cofactor(0, 1, 1, 2) * inv_det,
                ],
                [
                    -cofactor(1, 0, 2, 2) * inv_det,
                    cofactor(0, 0, 2, 2) * inv_det,
                    -cofactor(0, 0, 1, 2) * inv_det,
                ],
                [
                    cofactor(1, 0, 2, 1) * inv_det,
                    -cofactor(0, 0, 2, 1) * inv_det,
                    cofactor(0, 0, 1, 1) * inv_det,
                ],
            ],
        }
    }
}

/// The RGB->YCbCr encode matrix for the given coefficient set:
///
/// ```text
/// Y  = kr*R + (1-kr-kb)*G + kb*B
/// Cb = -kr/(2(1-kb))*R - (1-kr-kb)/(2(1-kb))*G + 0.5*B
/// Cr = 0.5*R - (1-kr-kb)/(2(1-kr))*G - kb/(2(1-kr))*B
/// ```
pub fn rgb_to_ycbcr_matrix(matrix: LumaChromaMatrix) -> Matrix3 {
    let (kr, kb) = coefficients(matrix);
    let kg = 1.0 - kr - kb;

    Matrix3 {
        rows: [
            [kr, kg, kb],
            [-kr / (2.0 * (1.0 - kb)), -kg / (2.0 * (1.0 - kb)), 0.5],
            [0.5, -kg / (2.0 * (1.0 - kr)), -kb / (2.0 * (1.0 - kr))],
        ],
    }
}

/// The YCbCr->RGB decode matrix, the inverse of [`rgb_to_ycbcr_matrix`].
pub fn ycbcr_to_rgb_matrix(matrix: LumaChromaMatrix) -> Matrix3 {
    rgb_to_ycbcr_matrix(matrix).inverse()
}

/// Per-channel scale applied after normalising a sample to `[0, 1]`, to map
/// the legal-range footroom/headroom down to `[0, 1]`, or the identity scale
/// for full range.
///
/// The legal-range bounds scale with bit depth as `16·2^(D-8)..235·2^(D-8)`
/// (luma) / `16·2^(D-8)..240·2^(D-8)` (chroma), but `max = 2^D - 1` is one
/// below the power of two those bounds scale by, so the resulting fraction is
/// *not* bit-depth-independent — dividing by a constant 255 (the 8-bit `max`)
/// at every depth would be off by a few parts per thousand at 10/12/16-bit.
pub fn range_scale(range: VideoRange, bit_depth: u32) -> [f32; 3] {
    match range {
        VideoRange::Full => [1.0, 1.0, 1.0],
        VideoRange::Legal => {
            let max_value = ((1u32 << bit_depth) - 1) as f32;
            let shift = (1u32 << (bit_depth - 8)) as f32;
            let luma = (235.0 - 16.0) * shift / max_value;
            let chroma = (240.0 - 16.0) * shift / max_value;
            [luma, chroma, chroma]
        }
    }
}

/// Per-channel offset (already normalised by the sample's max value) applied
/// before scaling, for luma then the two chroma channels.
pub fn range_offset(range: VideoRange, bit_depth: u32) -> [f32; 3] {
    let max_value = ((1u32 << bit_depth) - 1) as f32;
    let luma = match range {
        VideoRange::Legal => (1u32 << (bit_depth - 4)) as f32,
        VideoRange::Full => 0.0,
    };
    let chroma = (1u32 << (bit_depth - 1)) as f32;
    [luma / max_value, chroma / max_value, chroma / max_value]
}
