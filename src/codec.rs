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
//! Boundary to the library that owns bitstream coding.
//!
//! The pipeline never touches compressed data itself, it talks to a
//! [HeifCodec] that hands out image handles for decoding and encoders for a
//! compression format. Handles and encoders are owned values, dropping them
//! releases whatever the backend holds on every exit path.
use crate::err::CoderError;
use crate::nclx::NclxProfile;
use crate::profile::ColorProfile;

/// Bitstream format of the primary image
#[derive(Debug, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompressionFormat {
    #[default]
    Av1,
    Hevc,
}

/// Interleaved RGB chroma the codec decodes into or encodes from
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum InterleavedChroma {
    /// 8 bit per channel RGBA
    Rgba8,
    /// 16 bit little endian storage per channel RGBA, values are in image bit depth
    Rrggbbaa16Le,
}

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum ChromaSubsampling {
    Yuv420,
    Yuv444,
}

impl ChromaSubsampling {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChromaSubsampling::Yuv420 => "420",
            ChromaSubsampling::Yuv444 => "444",
        }
    }
}

/// Interleaved image exchanged with the codec
#[derive(Debug, Clone, PartialEq)]
pub struct CodecImage {
    pub width: usize,
    pub height: usize,
    pub bit_depth: u8,
    pub chroma: InterleavedChroma,
    pub has_alpha: bool,
    pub data: Vec<u8>,
    /// Bytes per row
    pub stride: usize,
    pub premultiplied_alpha: bool,
    /// Profile stored along with the image
    pub profile: ColorProfile,
}

/// Decodable primary image of a container
pub trait ImageHandle {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Bit depth of the luma/chroma planes as reported by the bitstream, may be negative
    fn chroma_bits_per_pixel(&self) -> i32;

    fn has_alpha_channel(&self) -> bool;

    fn is_premultiplied_alpha(&self) -> bool;

    fn icc_profile(&self) -> Option<Vec<u8>>;

    fn nclx_profile(&self) -> Option<NclxProfile>;

    /// Decodes the image into interleaved RGB(A)
    fn decode(&self, chroma: InterleavedChroma) -> Result<CodecImage, CoderError>;
}

pub trait HeifEncoder {
    fn set_lossy_quality(&mut self, quality: u8) -> Result<(), CoderError>;

    fn set_lossless(&mut self, lossless: bool) -> Result<(), CoderError>;

    fn set_chroma(&mut self, chroma: ChromaSubsampling) -> Result<(), CoderError>;

    /// Speed/effort knob, higher is faster
    fn set_speed(&mut self, speed: u8) -> Result<(), CoderError>;

    /// Encodes image as the primary item and writes the whole container
    fn encode(self: Box<Self>, image: &CodecImage) -> Result<Vec<u8>, CoderError>;
}

pub trait HeifCodec {
    /// Opens the primary image of the container
    fn primary_image<'a>(&self, data: &'a [u8])
        -> Result<Box<dyn ImageHandle + 'a>, CoderError>;

    fn encoder_for_format(
        &self,
        format: CompressionFormat,
    ) -> Result<Box<dyn HeifEncoder>, CoderError>;
}
