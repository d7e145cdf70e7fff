/*
 * // Copyright (c) Radzivon Bartoshyk 2/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::cms::Matrix3f;
use crate::err::CoderError;
use crate::gamma::{TransferFunction, GAMMA_TABLE_U16_SIZE, GAMMA_TABLE_U8_SIZE};
use crate::mappers::{SyncToneMap, ToneMapperMode};
use crate::mlaf::{m_clamp, mlaf};
use crate::plane::{PixelLayout, PixelPlane};
use num_traits::AsPrimitive;
use tracing::trace;

/// Interleaved RGBA
const CN: usize = 4;

struct ColorMatrixStage<T: Copy, const N: usize, const GAMMA_SIZE: usize> {
    linear_map: Box<[f32; N]>,
    gamma_map: Box<[T; GAMMA_SIZE]>,
    matrix: Matrix3f,
    tone_map: Option<Box<SyncToneMap>>,
}

impl<T: Copy + AsPrimitive<usize>, const N: usize, const GAMMA_SIZE: usize>
    ColorMatrixStage<T, N, GAMMA_SIZE>
{
    /// `working` must hold three floats per pixel of `lane`
    fn process_lane(&self, lane: &mut [T], working: &mut [f32]) {
        for (src, dst) in lane.chunks_exact(CN).zip(working.chunks_exact_mut(3)) {
            dst[0] = self.linear_map[src[0].as_()];
            dst[1] = self.linear_map[src[1].as_()];
            dst[2] = self.linear_map[src[2].as_()];
        }

        if let Some(tone_map) = &self.tone_map {
            tone_map.process_lane(working);
        }

        let c = self.matrix;
        let scale_value = (GAMMA_SIZE - 1) as f32;

        for (dst, src) in lane.chunks_exact_mut(CN).zip(working.chunks_exact(3)) {
            let r = mlaf(mlaf(src[0] * c.v[0][0], src[1], c.v[0][1]), src[2], c.v[0][2]);
            let g = mlaf(mlaf(src[0] * c.v[1][0], src[1], c.v[1][1]), src[2], c.v[1][2]);
            let b = mlaf(mlaf(src[0] * c.v[2][0], src[1], c.v[2][1]), src[2], c.v[2][2]);

            let r = mlaf(0.5f32, m_clamp(r, 0.0, 1.0), scale_value) as usize;
            let g = mlaf(0.5f32, m_clamp(g, 0.0, 1.0), scale_value) as usize;
            let b = mlaf(0.5f32, m_clamp(b, 0.0, 1.0), scale_value) as usize;

            dst[0] = self.gamma_map[r.min(GAMMA_SIZE - 1)];
            dst[1] = self.gamma_map[g.min(GAMMA_SIZE - 1)];
            dst[2] = self.gamma_map[b.min(GAMMA_SIZE - 1)];
        }
    }
}

/// Re-encodes plane content into the destination transfer function and sRGB gamut.
///
/// Works in place on `Rgba8` and `Rgba16` planes, alpha is never touched.
/// `luma_primaries` drive luminance based tone mapping when `mode` is active.
pub fn apply_color_matrix(
    plane: &mut PixelPlane,
    matrix: Matrix3f,
    forward: TransferFunction,
    destination: TransferFunction,
    mode: ToneMapperMode,
    luma_primaries: [f32; 3],
) -> Result<(), CoderError> {
    let width = plane.width();
    trace!(
        "Applying color matrix {:?} -> {:?}, tone mapper {:?}, {}x{}",
        forward,
        destination,
        mode,
        width,
        plane.height()
    );
    let mut working = vec![0f32; width * 3];
    match plane.layout() {
        PixelLayout::Rgba8 => {
            let stage = ColorMatrixStage::<u8, 256, GAMMA_TABLE_U8_SIZE> {
                linear_map: forward.generate_linear_table_u8(),
                gamma_map: destination.generate_gamma_table_u8(),
                matrix,
                tone_map: mode.tone_mapper::<3>(luma_primaries),
            };
            for row in plane.rows_mut() {
                stage.process_lane(row, &mut working);
            }
            Ok(())
        }
        PixelLayout::Rgba16 => {
            let bit_depth = plane.bit_depth() as usize;
            let stage = ColorMatrixStage::<u16, 65536, GAMMA_TABLE_U16_SIZE> {
                linear_map: forward.generate_linear_table_u16(bit_depth),
                gamma_map: destination.generate_gamma_table_u16(bit_depth),
                matrix,
                tone_map: mode.tone_mapper::<3>(luma_primaries),
            };
            let mut lane = vec![0u16; width * CN];
            for row in plane.rows_mut() {
                for (dst, src) in lane.iter_mut().zip(row.chunks_exact(2)) {
                    *dst = u16::from_le_bytes([src[0], src[1]]);
                }
                stage.process_lane(&mut lane, &mut working);
                for (dst, src) in row.chunks_exact_mut(2).zip(lane.iter()) {
                    dst.copy_from_slice(&src.to_le_bytes());
                }
            }
            Ok(())
        }
        _ => Err(CoderError::UnsupportedPixelFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{gamut_conversion_matrix, Chromaticity, SRGB_PRIMARIES};
    use crate::nclx::ColorPrimaries;

    const SRGB_LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

    fn gradient_plane() -> PixelPlane {
        let mut data = Vec::with_capacity(256 * 4);
        for i in 0..=255u8 {
            data.extend_from_slice(&[i, 255 - i, i / 2, 255 - i / 3]);
        }
        PixelPlane::new(data, 256, 1, 0, 8, PixelLayout::Rgba8, false).unwrap()
    }

    #[test]
    fn identity_keeps_srgb_content() {
        let mut plane = gradient_plane();
        let source = plane.clone();
        let matrix = gamut_conversion_matrix(SRGB_PRIMARIES, Chromaticity::D65).unwrap();
        apply_color_matrix(
            &mut plane,
            matrix,
            TransferFunction::Srgb,
            TransferFunction::Srgb,
            ToneMapperMode::Skip,
            SRGB_LUMA,
        )
        .unwrap();
        for (a, b) in plane.data().chunks_exact(4).zip(source.data().chunks_exact(4)) {
            for c in 0..3 {
                assert!((a[c] as i32 - b[c] as i32).abs() <= 1, "{:?} vs {:?}", a, b);
            }
            assert_eq!(a[3], b[3]);
        }
    }

    #[test]
    fn wide_gamut_green_is_clipped() {
        let (primaries, white_point) = ColorPrimaries::Bt2020.chromaticities();
        let matrix = gamut_conversion_matrix(primaries, white_point).unwrap();
        let mut plane =
            PixelPlane::new(vec![0, 255, 0, 77], 1, 1, 0, 8, PixelLayout::Rgba8, false).unwrap();
        apply_color_matrix(
            &mut plane,
            matrix,
            TransferFunction::Srgb,
            TransferFunction::Srgb,
            ToneMapperMode::Skip,
            SRGB_LUMA,
        )
        .unwrap();
        assert_eq!(plane.data(), &[0, 255, 0, 77]);
    }

    #[test]
    fn ten_bit_end_points_survive() {
        let mut data = Vec::new();
        for v in [0u16, 0, 0, 1023, 1023, 1023, 1023, 512] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut plane = PixelPlane::new(data, 2, 1, 0, 10, PixelLayout::Rgba16, false).unwrap();
        apply_color_matrix(
            &mut plane,
            Matrix3f::IDENTITY,
            TransferFunction::Itur709,
            TransferFunction::Srgb,
            ToneMapperMode::Skip,
            SRGB_LUMA,
        )
        .unwrap();
        let samples: Vec<u16> = plane
            .data()
            .chunks_exact(2)
            .map(|x| u16::from_le_bytes([x[0], x[1]]))
            .collect();
        assert_eq!(samples, vec![0, 0, 0, 1023, 1023, 1023, 1023, 512]);
    }

    #[test]
    fn tone_mapping_darkens_hdr_white() {
        let mut mapped =
            PixelPlane::new(vec![255, 255, 255, 255], 1, 1, 0, 8, PixelLayout::Rgba8, false)
                .unwrap();
        apply_color_matrix(
            &mut mapped,
            Matrix3f::IDENTITY,
            TransferFunction::Pq,
            TransferFunction::Srgb,
            ToneMapperMode::Pq,
            SRGB_LUMA,
        )
        .unwrap();
        assert_eq!(mapped.data()[0], 255);

        let mut mid =
            PixelPlane::new(vec![150, 150, 150, 255], 1, 1, 0, 8, PixelLayout::Rgba8, false)
                .unwrap();
        let mut clipped = mid.clone();
        apply_color_matrix(
            &mut mid,
            Matrix3f::IDENTITY,
            TransferFunction::Pq,
            TransferFunction::Srgb,
            ToneMapperMode::Pq,
            SRGB_LUMA,
        )
        .unwrap();
        apply_color_matrix(
            &mut clipped,
            Matrix3f::IDENTITY,
            TransferFunction::Pq,
            TransferFunction::Srgb,
            ToneMapperMode::Skip,
            SRGB_LUMA,
        )
        .unwrap();
        assert!(mid.data()[0] <= clipped.data()[0]);
        assert_eq!(mid.data()[3], 255);
    }

    #[test]
    fn packed_layouts_are_rejected() {
        let mut plane =
            PixelPlane::new(vec![0u8; 8], 1, 1, 0, 16, PixelLayout::RgbaF16, false).unwrap();
        assert_eq!(
            apply_color_matrix(
                &mut plane,
                Matrix3f::IDENTITY,
                TransferFunction::Srgb,
                TransferFunction::Srgb,
                ToneMapperMode::Skip,
                SRGB_LUMA,
            ),
            Err(CoderError::UnsupportedPixelFormat)
        );
    }
}
