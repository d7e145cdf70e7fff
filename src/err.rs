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
use std::error::Error;
use std::fmt::Display;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
/// Shows size mismatching
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

/// Encoder knob that was refused by the codec
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum EncoderParameter {
    Quality,
    Lossless,
    Chroma,
    Speed,
}

impl Display for EncoderParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncoderParameter::Quality => f.write_str("quality"),
            EncoderParameter::Lossless => f.write_str("lossless"),
            EncoderParameter::Chroma => f.write_str("chroma"),
            EncoderParameter::Speed => f.write_str("speed"),
        }
    }
}

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub enum CoderError {
    /// Malformed or truncated container or bitstream
    UnreadableSource,
    NoPrimaryImage,
    /// Codec reported an invalid chroma bit depth
    UnsupportedBitDepth(i32),
    UnsupportedPixelFormat,
    ProfileConversionFailure,
    EncoderConfigurationFailure(EncoderParameter),
    OutOfMemory,
    /// Primaries do not span a valid XYZ basis
    InvalidGamut,
    ZeroBaseSize,
    MinimumSliceSizeMismatch(MismatchedSize),
    MinimumStrideSizeMismatch(MismatchedSize),
}

impl Display for CoderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoderError::UnreadableSource => f.write_str("Can't read heif file"),
            CoderError::NoPrimaryImage => {
                f.write_str("Acquiring a primary image from file has failed")
            }
            CoderError::UnsupportedBitDepth(depth) => {
                write!(f, "Unsupported chroma bit depth {}", depth)
            }
            CoderError::UnsupportedPixelFormat => f.write_str(
                "Only RGBA_8888, RGB_565, RGBA_F16, RGBA_1010102 and RGBA_16 non hardware planes are supported",
            ),
            CoderError::ProfileConversionFailure => {
                f.write_str("Color profile transform can't be created")
            }
            CoderError::EncoderConfigurationFailure(parameter) => {
                write!(f, "Can't set encoder {}", parameter)
            }
            CoderError::OutOfMemory => f.write_str("Not enough memory to process this image"),
            CoderError::InvalidGamut => f.write_str("Color primaries produce singular matrix"),
            CoderError::ZeroBaseSize => f.write_str("Image size must not be zero"),
            CoderError::MinimumSliceSizeMismatch(size) => f.write_fmt(format_args!(
                "Minimum image slice size mismatch: expected={}, received={}",
                size.expected, size.received
            )),
            CoderError::MinimumStrideSizeMismatch(size) => f.write_fmt(format_args!(
                "Minimum stride must have size at least {} but it is {}",
                size.expected, size.received
            )),
        }
    }
}

impl Error for CoderError {}
