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
#![allow(clippy::manual_clamp, clippy::excessive_precision)]
mod cms;
mod codec;
mod coder;
mod color_matrix;
mod container;
mod err;
mod gamma;
mod mappers;
mod mlaf;
mod nclx;
mod plane;
mod profile;
mod reformat;
mod scaler;
mod uncompressed;

pub use cms::{
    gamut_conversion_matrix, gamut_to_xyz, luma_coefficients, xyz_basis_to_srgb, Chromaticity,
    Matrix3f, Vector3f, SRGB_PRIMARIES,
};
pub use codec::{
    ChromaSubsampling, CodecImage, CompressionFormat, HeifCodec, HeifEncoder, ImageHandle,
    InterleavedChroma,
};
pub use coder::{ColorSpaceTag, DecodeOptions, EncodeOptions, HeifCoder, QualityMode};
pub use color_matrix::apply_color_matrix;
pub use container::{probe_mime_type, MimeType};
pub use err::{CoderError, EncoderParameter, MismatchedSize};
pub use gamma::TransferFunction;
pub use mappers::{ToneMapperMode, ToneMapperPreference};
pub use nclx::{ColorPrimaries, MatrixCoefficients, NclxProfile, TransferCharacteristics};
pub use plane::{PixelLayout, PixelPlane};
pub use profile::ColorProfile;
pub use reformat::{
    convert_layout, premultiply, reformat_for_output, to_codec_image, to_rgb565, to_rgba1010102,
    to_rgba16, to_rgba8, to_rgba_f16, unpremultiply, HostCapabilities, PreferredColorConfig,
};
pub use scaler::{rescale, target_size, ScaleMode};
pub use uncompressed::{UncompressedCodec, UncompressedEncoder};
