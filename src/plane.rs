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
use crate::err::{CoderError, MismatchedSize};

/// Byte layout of a single pixel
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelLayout {
    /// 8 bit per channel interleaved RGBA
    Rgba8,
    /// IEEE half float per channel interleaved RGBA, little endian
    RgbaF16,
    /// 32 bit little endian word, 10 bit R, G, B from the low bits and 2 bit alpha on top
    Rgba1010102,
    /// 16 bit little endian storage per channel, values are in `bit_depth` range
    Rgba16,
    /// 16 bit little endian word, 5 bit red on top, 6 bit green, 5 bit blue, opaque
    Rgb565,
}

impl PixelLayout {
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelLayout::Rgba8 => 4,
            PixelLayout::RgbaF16 => 8,
            PixelLayout::Rgba1010102 => 4,
            PixelLayout::Rgba16 => 8,
            PixelLayout::Rgb565 => 2,
        }
    }

    #[inline]
    pub const fn has_alpha(&self) -> bool {
        !matches!(self, PixelLayout::Rgb565)
    }

    fn accepts_bit_depth(&self, bit_depth: u8) -> bool {
        match self {
            PixelLayout::Rgba8 | PixelLayout::Rgb565 => bit_depth == 8,
            PixelLayout::RgbaF16 => bit_depth == 16,
            PixelLayout::Rgba1010102 => bit_depth == 10,
            PixelLayout::Rgba16 => (8..=16).contains(&bit_depth),
        }
    }
}

/// Allocates zeroed buffer, reporting allocation failure instead of aborting
pub(crate) fn try_alloc<T: Copy + Default>(len: usize) -> Result<Vec<T>, CoderError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| CoderError::OutOfMemory)?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

/// Owned pixel storage travelling through the pipeline.
///
/// Premultiplication state is owned by the plane and changes only together
/// with the samples it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPlane {
    data: Vec<u8>,
    width: usize,
    height: usize,
    /// Bytes per row
    stride: usize,
    bit_depth: u8,
    layout: PixelLayout,
    alpha_premultiplied: bool,
    hardware_backed: bool,
}

impl PixelPlane {
    /// Wraps existing samples.
    ///
    /// Stride `0` means tightly packed rows.
    pub fn new(
        data: Vec<u8>,
        width: usize,
        height: usize,
        stride: usize,
        bit_depth: u8,
        layout: PixelLayout,
        alpha_premultiplied: bool,
    ) -> Result<PixelPlane, CoderError> {
        if !layout.accepts_bit_depth(bit_depth) {
            return Err(CoderError::UnsupportedBitDepth(bit_depth as i32));
        }
        let stride = if stride == 0 {
            width.saturating_mul(layout.bytes_per_pixel())
        } else {
            stride
        };
        let plane = PixelPlane {
            data,
            width,
            height,
            stride,
            bit_depth,
            layout,
            alpha_premultiplied: alpha_premultiplied && layout.has_alpha(),
            hardware_backed: false,
        };
        plane.check_layout()?;
        Ok(plane)
    }

    /// Allocates tightly packed zeroed plane
    pub fn alloc(
        width: usize,
        height: usize,
        bit_depth: u8,
        layout: PixelLayout,
        alpha_premultiplied: bool,
    ) -> Result<PixelPlane, CoderError> {
        let stride = width
            .checked_mul(layout.bytes_per_pixel())
            .ok_or(CoderError::OutOfMemory)?;
        let len = stride.checked_mul(height).ok_or(CoderError::OutOfMemory)?;
        let data = try_alloc::<u8>(len)?;
        PixelPlane::new(
            data,
            width,
            height,
            stride,
            bit_depth,
            layout,
            alpha_premultiplied,
        )
    }

    /// Marks plane as living in a buffer that only the display can read
    pub fn with_hardware_backed(mut self, hardware_backed: bool) -> PixelPlane {
        self.hardware_backed = hardware_backed;
        self
    }

    #[inline]
    pub fn check_layout(&self) -> Result<(), CoderError> {
        if self.width == 0 || self.height == 0 {
            return Err(CoderError::ZeroBaseSize);
        }
        let row_bytes = self.row_bytes();
        if self.stride < row_bytes {
            return Err(CoderError::MinimumStrideSizeMismatch(MismatchedSize {
                expected: row_bytes,
                received: self.stride,
            }));
        }
        let data_len = self.data.len();
        let required = self
            .stride
            .saturating_mul(self.height - 1)
            .saturating_add(row_bytes);
        if data_len < required {
            return Err(CoderError::MinimumSliceSizeMismatch(MismatchedSize {
                expected: self.stride.saturating_mul(self.height),
                received: data_len,
            }));
        }
        Ok(())
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    #[inline]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    #[inline]
    pub fn is_alpha_premultiplied(&self) -> bool {
        self.alpha_premultiplied
    }

    #[inline]
    pub fn is_hardware_backed(&self) -> bool {
        self.hardware_backed
    }

    /// Meaningful bytes in a row
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width.saturating_mul(self.layout.bytes_per_pixel())
    }

    /// Largest sample value for integer layouts
    #[inline]
    pub fn max_value(&self) -> u16 {
        ((1u32 << self.bit_depth as u32) - 1) as u16
    }

    /// Rows without stride padding
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let row_bytes = self.row_bytes();
        self.data
            .chunks(self.stride)
            .take(self.height)
            .map(move |row| &row[..row_bytes])
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let row_bytes = self.row_bytes();
        self.data
            .chunks_mut(self.stride)
            .take(self.height)
            .map(move |row| &mut row[..row_bytes])
    }

    /// Bytes of a single pixel
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let bpp = self.layout.bytes_per_pixel();
        let start = y * self.stride + x * bpp;
        &self.data[start..start + bpp]
    }

    /// Updates samples and premultiplication state in one step
    pub(crate) fn update_samples<F>(&mut self, alpha_premultiplied: bool, mut f: F)
    where
        F: FnMut(&mut [u8]),
    {
        for row in self.rows_mut() {
            f(row);
        }
        self.alpha_premultiplied = alpha_premultiplied && self.layout.has_alpha();
    }
}
