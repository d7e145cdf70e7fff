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
use crate::err::CoderError;
use crate::plane::{PixelLayout, PixelPlane};
use moxcms::{ColorProfile, Layout, TransformOptions};
use tracing::debug;

/// Converts plane content described by embedded ICC profile into sRGB.
///
/// Any failure to parse the profile or to build the transform is reported as
/// [CoderError::ProfileConversionFailure].
pub(crate) fn transform_icc_to_srgb(plane: &mut PixelPlane, icc: &[u8]) -> Result<(), CoderError> {
    let source = ColorProfile::new_from_slice(icc).map_err(|err| {
        debug!("Embedded ICC profile is invalid: {:?}", err);
        CoderError::ProfileConversionFailure
    })?;
    let destination = ColorProfile::new_srgb();
    let width = plane.width();
    match plane.layout() {
        PixelLayout::Rgba8 => {
            let transform = source
                .create_transform_8bit(
                    Layout::Rgba,
                    &destination,
                    Layout::Rgba,
                    TransformOptions::default(),
                )
                .map_err(|_| CoderError::ProfileConversionFailure)?;
            let mut source_lane = vec![0u8; width * 4];
            for row in plane.rows_mut() {
                source_lane.copy_from_slice(row);
                transform
                    .transform(&source_lane, row)
                    .map_err(|_| CoderError::ProfileConversionFailure)?;
            }
            Ok(())
        }
        PixelLayout::Rgba16 => {
            let transform = source
                .create_transform_f32(
                    Layout::Rgba,
                    &destination,
                    Layout::Rgba,
                    TransformOptions::default(),
                )
                .map_err(|_| CoderError::ProfileConversionFailure)?;
            let max_colors = plane.max_value() as f32;
            let scale = 1. / max_colors;
            let mut source_lane = vec![0f32; width * 4];
            let mut working_lane = vec![0f32; width * 4];
            for row in plane.rows_mut() {
                for (dst, src) in source_lane.iter_mut().zip(row.chunks_exact(2)) {
                    *dst = u16::from_le_bytes([src[0], src[1]]) as f32 * scale;
                }
                transform
                    .transform(&source_lane, &mut working_lane)
                    .map_err(|_| CoderError::ProfileConversionFailure)?;
                for (dst, src) in row.chunks_exact_mut(2).zip(working_lane.iter()) {
                    let v = (src * max_colors).round().min(max_colors).max(0.) as u16;
                    dst.copy_from_slice(&v.to_le_bytes());
                }
            }
            Ok(())
        }
        _ => Err(CoderError::UnsupportedPixelFormat),
    }
}

/// Checks that bytes parse as an ICC profile
pub(crate) fn validate_icc(icc: &[u8]) -> Result<(), CoderError> {
    ColorProfile::new_from_slice(icc).map(|_| ()).map_err(|err| {
        debug!("ICC profile can't be attached: {:?}", err);
        CoderError::ProfileConversionFailure
    })
}
