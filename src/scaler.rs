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
use crate::plane::{try_alloc, PixelLayout, PixelPlane};
use image::imageops::FilterType;
use image::{ImageBuffer, Rgba};
use tracing::debug;

/// How requested decode dimensions are interpreted
#[derive(Debug, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScaleMode {
    /// Keep aspect ratio, fit inside requested bounds
    #[default]
    Fit,
    /// Exactly requested dimensions
    Resize,
}

/// Output dimensions for the request, `None` when the image stays as is.
///
/// Non positive requested dimensions disable scaling.
pub fn target_size(
    width: usize,
    height: usize,
    scaled_width: i32,
    scaled_height: i32,
    mode: ScaleMode,
) -> Option<(usize, usize)> {
    if scaled_width <= 0 || scaled_height <= 0 || width == 0 || height == 0 {
        return None;
    }
    let (dst_width, dst_height) = (scaled_width as usize, scaled_height as usize);
    if dst_width == width && dst_height == height {
        return None;
    }
    match mode {
        ScaleMode::Resize => Some((dst_width, dst_height)),
        ScaleMode::Fit => {
            let scale = f64::min(
                dst_width as f64 / width as f64,
                dst_height as f64 / height as f64,
            );
            let fitted = (
                ((width as f64 * scale).round() as usize).max(1),
                ((height as f64 * scale).round() as usize).max(1),
            );
            if fitted == (width, height) {
                None
            } else {
                Some(fitted)
            }
        }
    }
}

/// Checks that the resampler's working and output buffers fit in memory.
///
/// Vertical pass keeps source width at `f32` RGBA, horizontal pass writes the
/// output at `sample_size` bytes per channel.
fn reserve_resample(
    src_width: usize,
    width: usize,
    height: usize,
    sample_size: usize,
) -> Result<(), CoderError> {
    let output = width
        .checked_mul(height)
        .and_then(|x| x.checked_mul(4 * sample_size));
    let working = src_width
        .checked_mul(height)
        .and_then(|x| x.checked_mul(4 * size_of::<f32>()));
    for size in [output, working] {
        let size = size.ok_or(CoderError::OutOfMemory)?;
        let mut reservation: Vec<u8> = Vec::new();
        reservation
            .try_reserve_exact(size)
            .map_err(|_| CoderError::OutOfMemory)?;
    }
    Ok(())
}

/// Bilinear resampling of codec native planes
pub fn rescale(plane: &PixelPlane, width: usize, height: usize) -> Result<PixelPlane, CoderError> {
    if width == 0 || height == 0 {
        return Err(CoderError::ZeroBaseSize);
    }
    debug!(
        "Rescaling {}x{} into {}x{}",
        plane.width(),
        plane.height(),
        width,
        height
    );
    let sample_size = match plane.layout() {
        PixelLayout::Rgba8 => 1,
        PixelLayout::Rgba16 => 2,
        _ => return Err(CoderError::UnsupportedPixelFormat),
    };
    reserve_resample(plane.width(), width, height, sample_size)?;
    let dimension = |v: usize| u32::try_from(v).map_err(|_| CoderError::OutOfMemory);
    let (src_width, src_height) = (dimension(plane.width())?, dimension(plane.height())?);
    let (dst_width, dst_height) = (dimension(width)?, dimension(height)?);
    match plane.layout() {
        PixelLayout::Rgba8 => {
            let mut packed = try_alloc::<u8>(plane.row_bytes() * plane.height())?;
            for (dst, src) in packed.chunks_exact_mut(plane.row_bytes()).zip(plane.rows()) {
                dst.copy_from_slice(src);
            }
            let source = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(src_width, src_height, packed)
                .ok_or(CoderError::ZeroBaseSize)?;
            let resized =
                image::imageops::resize(&source, dst_width, dst_height, FilterType::Triangle);
            PixelPlane::new(
                resized.into_raw(),
                width,
                height,
                0,
                8,
                PixelLayout::Rgba8,
                plane.is_alpha_premultiplied(),
            )
        }
        PixelLayout::Rgba16 => {
            let mut packed = try_alloc::<u16>(plane.width() * 4 * plane.height())?;
            for (dst, src) in packed.chunks_exact_mut(plane.width() * 4).zip(plane.rows()) {
                for (dst, src) in dst.iter_mut().zip(src.chunks_exact(2)) {
                    *dst = u16::from_le_bytes([src[0], src[1]]);
                }
            }
            let source =
                ImageBuffer::<Rgba<u16>, Vec<u16>>::from_raw(src_width, src_height, packed)
                    .ok_or(CoderError::ZeroBaseSize)?;
            let resized =
                image::imageops::resize(&source, dst_width, dst_height, FilterType::Triangle);
            let mut data = try_alloc::<u8>(resized.as_raw().len() * 2)?;
            for (dst, src) in data.chunks_exact_mut(2).zip(resized.as_raw().iter()) {
                dst.copy_from_slice(&src.to_le_bytes());
            }
            PixelPlane::new(
                data,
                width,
                height,
                0,
                plane.bit_depth(),
                PixelLayout::Rgba16,
                plane.is_alpha_premultiplied(),
            )
        }
        _ => Err(CoderError::UnsupportedPixelFormat),
    }
}
