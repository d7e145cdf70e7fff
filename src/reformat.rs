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
use crate::codec::{CodecImage, CompressionFormat, InterleavedChroma};
use crate::err::CoderError;
use crate::plane::{PixelLayout, PixelPlane};
use crate::profile::ColorProfile;
use half::f16;
use tracing::{debug, warn};

/// Output pixel configuration requested by the caller
#[derive(Debug, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PreferredColorConfig {
    /// 8 bit RGBA, the only premultiplied output
    #[default]
    Rgba8888,
    Rgb565,
    /// Plane suitable for a display only buffer
    HardwareAccelerated,
    RgbaF16,
    Rgba1010102,
}

/// Surface formats the host is able to display
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostCapabilities {
    pub half_float_surfaces: bool,
    pub rgba1010102_surfaces: bool,
    pub hardware_buffers: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        HostCapabilities {
            half_float_surfaces: true,
            rgba1010102_surfaces: true,
            hardware_buffers: true,
        }
    }
}

impl HostCapabilities {
    /// Capabilities of an Android runtime at the given API level
    pub fn from_api_level(api_level: u32) -> HostCapabilities {
        HostCapabilities {
            half_float_surfaces: api_level >= 26,
            rgba1010102_surfaces: api_level >= 33,
            hardware_buffers: api_level >= 26,
        }
    }
}

#[inline]
fn read_u16(src: &[u8]) -> u16 {
    u16::from_le_bytes([src[0], src[1]])
}

#[inline]
fn read_u32(src: &[u8]) -> u32 {
    u32::from_le_bytes([src[0], src[1], src[2], src[3]])
}

#[inline]
fn quantize(v: f32, max: f32) -> u32 {
    (v * max).round().min(max).max(0.) as u32
}

/// Normalized RGBA of a single pixel
fn read_pixel(layout: PixelLayout, max_value: f32, src: &[u8]) -> [f32; 4] {
    match layout {
        PixelLayout::Rgba8 => [
            src[0] as f32 / 255.,
            src[1] as f32 / 255.,
            src[2] as f32 / 255.,
            src[3] as f32 / 255.,
        ],
        PixelLayout::Rgba16 => {
            let scale = 1. / max_value;
            [
                read_u16(&src[0..2]) as f32 * scale,
                read_u16(&src[2..4]) as f32 * scale,
                read_u16(&src[4..6]) as f32 * scale,
                read_u16(&src[6..8]) as f32 * scale,
            ]
        }
        PixelLayout::RgbaF16 => [
            f16::from_bits(read_u16(&src[0..2])).to_f32(),
            f16::from_bits(read_u16(&src[2..4])).to_f32(),
            f16::from_bits(read_u16(&src[4..6])).to_f32(),
            f16::from_bits(read_u16(&src[6..8])).to_f32(),
        ],
        PixelLayout::Rgba1010102 => {
            let word = read_u32(src);
            [
                (word & 0x3ff) as f32 / 1023.,
                ((word >> 10) & 0x3ff) as f32 / 1023.,
                ((word >> 20) & 0x3ff) as f32 / 1023.,
                (word >> 30) as f32 / 3.,
            ]
        }
        PixelLayout::Rgb565 => {
            let word = read_u16(src);
            [
                (word >> 11) as f32 / 31.,
                ((word >> 5) & 0x3f) as f32 / 63.,
                (word & 0x1f) as f32 / 31.,
                1.,
            ]
        }
    }
}

fn write_pixel(layout: PixelLayout, max_value: f32, rgba: [f32; 4], dst: &mut [u8]) {
    match layout {
        PixelLayout::Rgba8 => {
            for (dst, src) in dst.iter_mut().zip(rgba.iter()) {
                *dst = quantize(*src, 255.) as u8;
            }
        }
        PixelLayout::Rgba16 => {
            for (dst, src) in dst.chunks_exact_mut(2).zip(rgba.iter()) {
                dst.copy_from_slice(&(quantize(*src, max_value) as u16).to_le_bytes());
            }
        }
        PixelLayout::RgbaF16 => {
            for (dst, src) in dst.chunks_exact_mut(2).zip(rgba.iter()) {
                dst.copy_from_slice(&f16::from_f32(*src).to_le_bytes());
            }
        }
        PixelLayout::Rgba1010102 => {
            let word = quantize(rgba[0], 1023.)
                | (quantize(rgba[1], 1023.) << 10)
                | (quantize(rgba[2], 1023.) << 20)
                | (quantize(rgba[3], 3.) << 30);
            dst.copy_from_slice(&word.to_le_bytes());
        }
        PixelLayout::Rgb565 => {
            let word = (quantize(rgba[0], 31.) << 11)
                | (quantize(rgba[1], 63.) << 5)
                | quantize(rgba[2], 31.);
            dst.copy_from_slice(&(word as u16).to_le_bytes());
        }
    }
}

/// Re-lays the plane into `layout`, premultiplication state is carried over.
///
/// `bit_depth` only matters for [PixelLayout::Rgba16] targets.
pub fn convert_layout(
    plane: &PixelPlane,
    layout: PixelLayout,
    bit_depth: u8,
) -> Result<PixelPlane, CoderError> {
    let bit_depth = match layout {
        PixelLayout::Rgba8 | PixelLayout::Rgb565 => 8,
        PixelLayout::RgbaF16 => 16,
        PixelLayout::Rgba1010102 => 10,
        PixelLayout::Rgba16 => bit_depth,
    };
    let mut target = PixelPlane::alloc(
        plane.width(),
        plane.height(),
        bit_depth,
        layout,
        plane.is_alpha_premultiplied(),
    )?;
    if plane.layout() == layout && plane.bit_depth() == bit_depth {
        for (dst, src) in target.rows_mut().zip(plane.rows()) {
            dst.copy_from_slice(src);
        }
        return Ok(target);
    }
    let source_layout = plane.layout();
    let source_max = plane.max_value() as f32;
    let target_max = target.max_value() as f32;
    let source_bpp = source_layout.bytes_per_pixel();
    let target_bpp = layout.bytes_per_pixel();
    for (dst, src) in target.rows_mut().zip(plane.rows()) {
        for (dst, src) in dst
            .chunks_exact_mut(target_bpp)
            .zip(src.chunks_exact(source_bpp))
        {
            let rgba = read_pixel(source_layout, source_max, src);
            write_pixel(layout, target_max, rgba, dst);
        }
    }
    Ok(target)
}

pub fn to_rgba8(plane: &PixelPlane) -> Result<PixelPlane, CoderError> {
    convert_layout(plane, PixelLayout::Rgba8, 8)
}

pub fn to_rgba16(plane: &PixelPlane, bit_depth: u8) -> Result<PixelPlane, CoderError> {
    convert_layout(plane, PixelLayout::Rgba16, bit_depth)
}

pub fn to_rgba_f16(plane: &PixelPlane) -> Result<PixelPlane, CoderError> {
    convert_layout(plane, PixelLayout::RgbaF16, 16)
}

pub fn to_rgba1010102(plane: &PixelPlane) -> Result<PixelPlane, CoderError> {
    convert_layout(plane, PixelLayout::Rgba1010102, 10)
}

/// Drops alpha, color samples are taken as stored
pub fn to_rgb565(plane: &PixelPlane) -> Result<PixelPlane, CoderError> {
    convert_layout(plane, PixelLayout::Rgb565, 8)
}

#[inline]
fn premultiply_u8(v: u8, a: u8) -> u8 {
    ((v as u16 * a as u16 + 127) / 255) as u8
}

#[inline]
fn unpremultiply_u8(v: u8, a: u8) -> u8 {
    if a == 0 {
        0
    } else {
        ((v as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
    }
}

#[inline]
fn premultiply_int(v: u32, a: u32, alpha_max: u32) -> u32 {
    (v * a + alpha_max / 2) / alpha_max
}

#[inline]
fn unpremultiply_int(v: u32, a: u32, alpha_max: u32, color_max: u32) -> u32 {
    if a == 0 {
        0
    } else {
        ((v * alpha_max + a / 2) / a).min(color_max)
    }
}

/// Scales color samples by alpha, no-op for already premultiplied or opaque layouts
pub fn premultiply(plane: &mut PixelPlane) {
    if plane.is_alpha_premultiplied() || !plane.layout().has_alpha() {
        return;
    }
    let max = plane.max_value() as u32;
    match plane.layout() {
        PixelLayout::Rgba8 => plane.update_samples(true, |row| {
            for px in row.chunks_exact_mut(4) {
                let a = px[3];
                px[0] = premultiply_u8(px[0], a);
                px[1] = premultiply_u8(px[1], a);
                px[2] = premultiply_u8(px[2], a);
            }
        }),
        PixelLayout::Rgba16 => plane.update_samples(true, |row| {
            for px in row.chunks_exact_mut(8) {
                let a = read_u16(&px[6..8]) as u32;
                for c in px[0..6].chunks_exact_mut(2) {
                    let v = premultiply_int(read_u16(c) as u32, a, max) as u16;
                    c.copy_from_slice(&v.to_le_bytes());
                }
            }
        }),
        PixelLayout::RgbaF16 => plane.update_samples(true, |row| {
            for px in row.chunks_exact_mut(8) {
                let a = f16::from_bits(read_u16(&px[6..8])).to_f32();
                for c in px[0..6].chunks_exact_mut(2) {
                    let v = f16::from_bits(read_u16(c)).to_f32() * a;
                    c.copy_from_slice(&f16::from_f32(v).to_le_bytes());
                }
            }
        }),
        PixelLayout::Rgba1010102 => plane.update_samples(true, |row| {
            for px in row.chunks_exact_mut(4) {
                let word = read_u32(px);
                let a = word >> 30;
                let r = premultiply_int(word & 0x3ff, a, 3);
                let g = premultiply_int((word >> 10) & 0x3ff, a, 3);
                let b = premultiply_int((word >> 20) & 0x3ff, a, 3);
                px.copy_from_slice(&(r | (g << 10) | (b << 20) | (a << 30)).to_le_bytes());
            }
        }),
        PixelLayout::Rgb565 => {}
    }
}

/// Restores straight alpha, transparent pixels become black
pub fn unpremultiply(plane: &mut PixelPlane) {
    if !plane.is_alpha_premultiplied() {
        return;
    }
    let max = plane.max_value() as u32;
    match plane.layout() {
        PixelLayout::Rgba8 => plane.update_samples(false, |row| {
            for px in row.chunks_exact_mut(4) {
                let a = px[3];
                px[0] = unpremultiply_u8(px[0], a);
                px[1] = unpremultiply_u8(px[1], a);
                px[2] = unpremultiply_u8(px[2], a);
            }
        }),
        PixelLayout::Rgba16 => plane.update_samples(false, |row| {
            for px in row.chunks_exact_mut(8) {
                let a = read_u16(&px[6..8]) as u32;
                for c in px[0..6].chunks_exact_mut(2) {
                    let v = unpremultiply_int(read_u16(c) as u32, a, max, max) as u16;
                    c.copy_from_slice(&v.to_le_bytes());
                }
            }
        }),
        PixelLayout::RgbaF16 => plane.update_samples(false, |row| {
            for px in row.chunks_exact_mut(8) {
                let a = f16::from_bits(read_u16(&px[6..8])).to_f32();
                for c in px[0..6].chunks_exact_mut(2) {
                    let v = if a == 0. {
                        0.
                    } else {
                        f16::from_bits(read_u16(c)).to_f32() / a
                    };
                    c.copy_from_slice(&f16::from_f32(v).to_le_bytes());
                }
            }
        }),
        PixelLayout::Rgba1010102 => plane.update_samples(false, |row| {
            for px in row.chunks_exact_mut(4) {
                let word = read_u32(px);
                let a = word >> 30;
                let r = unpremultiply_int(word & 0x3ff, a, 3, 1023);
                let g = unpremultiply_int((word >> 10) & 0x3ff, a, 3, 1023);
                let b = unpremultiply_int((word >> 20) & 0x3ff, a, 3, 1023);
                px.copy_from_slice(&(r | (g << 10) | (b << 20) | (a << 30)).to_le_bytes());
            }
        }),
        PixelLayout::Rgb565 => {}
    }
}

/// Lays decoded plane out for the caller's preferred config.
///
/// Only [PreferredColorConfig::Rgba8888] output is premultiplied, every other
/// target carries straight alpha.
pub fn reformat_for_output(
    plane: PixelPlane,
    config: PreferredColorConfig,
    capabilities: &HostCapabilities,
) -> Result<PixelPlane, CoderError> {
    let high_bit_depth = plane.layout() != PixelLayout::Rgba8;
    let mut target = match config {
        PreferredColorConfig::Rgba8888 => {
            let mut target = to_rgba8(&plane)?;
            premultiply(&mut target);
            return Ok(target);
        }
        PreferredColorConfig::Rgb565 => to_rgb565(&plane)?,
        PreferredColorConfig::RgbaF16 => {
            if capabilities.half_float_surfaces {
                to_rgba_f16(&plane)?
            } else {
                warn!("Half float surfaces are not available, falling back to RGBA 8888");
                to_rgba8(&plane)?
            }
        }
        PreferredColorConfig::Rgba1010102 => {
            if capabilities.rgba1010102_surfaces {
                to_rgba1010102(&plane)?
            } else {
                warn!("RGBA 1010102 surfaces are not available, falling back to RGBA 8888");
                to_rgba8(&plane)?
            }
        }
        PreferredColorConfig::HardwareAccelerated => {
            let target = if high_bit_depth && capabilities.half_float_surfaces {
                to_rgba_f16(&plane)?
            } else {
                to_rgba8(&plane)?
            };
            if capabilities.hardware_buffers {
                target.with_hardware_backed(true)
            } else {
                warn!("Hardware buffers are not available, returning plain plane");
                target
            }
        }
    };
    unpremultiply(&mut target);
    debug!(
        "Reformatted {:?} plane into {:?} for {:?}",
        plane.layout(),
        target.layout(),
        config
    );
    Ok(target)
}

fn codec_image_from_plane(
    plane: PixelPlane,
    has_alpha: bool,
) -> Result<CodecImage, CoderError> {
    let chroma = match plane.layout() {
        PixelLayout::Rgba8 => InterleavedChroma::Rgba8,
        PixelLayout::Rgba16 => InterleavedChroma::Rrggbbaa16Le,
        _ => return Err(CoderError::UnsupportedPixelFormat),
    };
    Ok(CodecImage {
        width: plane.width(),
        height: plane.height(),
        bit_depth: plane.bit_depth(),
        chroma,
        has_alpha,
        stride: plane.stride(),
        premultiplied_alpha: plane.is_alpha_premultiplied(),
        profile: ColorProfile::None,
        data: plane.into_data(),
    })
}

/// Converts host plane into the interleaved layout a codec accepts.
///
/// AV1 keeps 10 bit precision for deep sources, HEVC receives 8 bit samples.
pub fn to_codec_image(
    plane: &PixelPlane,
    format: CompressionFormat,
) -> Result<CodecImage, CoderError> {
    if plane.is_hardware_backed() {
        return Err(CoderError::UnsupportedPixelFormat);
    }
    let deep = format == CompressionFormat::Av1;
    match plane.layout() {
        PixelLayout::Rgba8 => {
            let mut target = to_rgba8(plane)?;
            unpremultiply(&mut target);
            codec_image_from_plane(target, true)
        }
        PixelLayout::Rgb565 => {
            let target = to_rgba8(plane)?;
            codec_image_from_plane(target, false)
        }
        PixelLayout::Rgba1010102 => {
            let mut target = if deep {
                to_rgba16(plane, 10)?
            } else {
                to_rgba8(plane)?
            };
            premultiply(&mut target);
            codec_image_from_plane(target, true)
        }
        PixelLayout::RgbaF16 => {
            if deep {
                codec_image_from_plane(to_rgba16(plane, 10)?, true)
            } else {
                let mut target = to_rgba8(plane)?;
                premultiply(&mut target);
                codec_image_from_plane(target, true)
            }
        }
        PixelLayout::Rgba16 => {
            let target = if deep {
                to_rgba16(plane, 10)?
            } else {
                to_rgba8(plane)?
            };
            codec_image_from_plane(target, true)
        }
    }
}

/// Wraps decoded codec samples into a plane
pub(crate) fn plane_from_codec_image(image: CodecImage) -> Result<PixelPlane, CoderError> {
    let layout = match image.chroma {
        InterleavedChroma::Rgba8 => PixelLayout::Rgba8,
        InterleavedChroma::Rrggbbaa16Le => PixelLayout::Rgba16,
    };
    let bit_depth = if layout == PixelLayout::Rgba8 {
        8
    } else {
        image.bit_depth
    };
    PixelPlane::new(
        image.data,
        image.width,
        image.height,
        image.stride,
        bit_depth,
        layout,
        image.premultiplied_alpha && image.has_alpha,
    )
}
