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
use crate::cms::{transform_icc_to_srgb, validate_icc};
use crate::codec::{ChromaSubsampling, CompressionFormat, HeifCodec, InterleavedChroma};
use crate::color_matrix::apply_color_matrix;
use crate::container::{probe_mime_type, MimeType};
use crate::err::CoderError;
use crate::gamma::TransferFunction;
use crate::mappers::{ToneMapperMode, ToneMapperPreference};
use crate::nclx::{ColorPrimaries, MatrixCoefficients, NclxProfile, TransferCharacteristics};
use crate::plane::PixelPlane;
use crate::profile::ColorProfile;
use crate::reformat::{
    plane_from_codec_image, reformat_for_output, to_codec_image, unpremultiply, HostCapabilities,
    PreferredColorConfig,
};
use crate::scaler::{rescale, target_size, ScaleMode};
use crate::uncompressed::UncompressedCodec;
use tracing::{debug, trace};

/// Decode request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodeOptions {
    /// Requested width, non positive keeps source width
    pub scaled_width: i32,
    /// Requested height, non positive keeps source height
    pub scaled_height: i32,
    pub color_config: PreferredColorConfig,
    pub scale_mode: ScaleMode,
    pub tone_mapper: ToneMapperPreference,
}

#[derive(Debug, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QualityMode {
    /// Quality driven, 4:2:0 chroma
    #[default]
    Lossy,
    /// Quality is ignored, 4:4:4 chroma
    Lossless,
}

/// Color space declared for encoded content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorSpaceTag {
    /// Nothing is attached, readers assume sRGB
    #[default]
    Unspecified,
    Srgb,
    LinearSrgb,
    DisplayP3,
    DciP3,
    Bt709,
    Bt2020,
    Bt2020Pq,
    Bt2020Hlg,
    /// Raw ICC profile bytes
    Icc(Vec<u8>),
}

impl ColorSpaceTag {
    /// Profile attached to the encoded image, ICC bytes are validated first
    pub fn to_profile(&self) -> Result<ColorProfile, CoderError> {
        let nclx = |primaries, transfer, matrix| {
            ColorProfile::Nclx(NclxProfile::new(primaries, transfer, matrix, true))
        };
        let profile = match self {
            ColorSpaceTag::Unspecified => ColorProfile::None,
            ColorSpaceTag::Srgb => nclx(
                ColorPrimaries::Bt709,
                TransferCharacteristics::Iec61966_2_1,
                MatrixCoefficients::Bt601,
            ),
            ColorSpaceTag::LinearSrgb => nclx(
                ColorPrimaries::Bt709,
                TransferCharacteristics::Linear,
                MatrixCoefficients::Bt601,
            ),
            ColorSpaceTag::DisplayP3 => nclx(
                ColorPrimaries::Smpte432,
                TransferCharacteristics::Iec61966_2_1,
                MatrixCoefficients::Bt601,
            ),
            ColorSpaceTag::DciP3 => nclx(
                ColorPrimaries::Smpte431,
                TransferCharacteristics::Smpte428,
                MatrixCoefficients::Bt601,
            ),
            ColorSpaceTag::Bt709 => nclx(
                ColorPrimaries::Bt709,
                TransferCharacteristics::Bt709,
                MatrixCoefficients::Bt709,
            ),
            ColorSpaceTag::Bt2020 => nclx(
                ColorPrimaries::Bt2020,
                TransferCharacteristics::Bt2020_10bit,
                MatrixCoefficients::Bt2020Ncl,
            ),
            ColorSpaceTag::Bt2020Pq => nclx(
                ColorPrimaries::Bt2020,
                TransferCharacteristics::Pq,
                MatrixCoefficients::Bt2020Ncl,
            ),
            ColorSpaceTag::Bt2020Hlg => nclx(
                ColorPrimaries::Bt2020,
                TransferCharacteristics::Hlg,
                MatrixCoefficients::Bt2020Ncl,
            ),
            ColorSpaceTag::Icc(icc) => {
                validate_icc(icc)?;
                ColorProfile::Icc(icc.clone())
            }
        };
        Ok(profile)
    }
}

/// Encode request.
///
/// Out of range `quality` or `speed` fails the encode with
/// [CoderError::EncoderConfigurationFailure] instead of being skipped and
/// leaving the codec default in place. `quality` is not consulted in
/// [QualityMode::Lossless].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodeOptions {
    pub format: CompressionFormat,
    /// Lossy quality in 1..=100
    pub quality: u8,
    pub quality_mode: QualityMode,
    /// Speed/effort in 1..=19, codec default when absent
    pub speed: Option<u8>,
    pub color_space: ColorSpaceTag,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            format: CompressionFormat::Av1,
            quality: 80,
            quality_mode: QualityMode::Lossy,
            speed: None,
            color_space: ColorSpaceTag::Unspecified,
        }
    }
}

/// Color managed HEIF/AVIF decoder and encoder.
///
/// Every call is independent, the coder keeps no state between calls and may
/// be shared between threads as long as its codec can.
#[derive(Debug, Clone, Default)]
pub struct HeifCoder<C: HeifCodec = UncompressedCodec> {
    codec: C,
    capabilities: HostCapabilities,
}

impl HeifCoder<UncompressedCodec> {
    /// Coder backed by the built-in uncompressed codec
    pub fn new() -> HeifCoder<UncompressedCodec> {
        HeifCoder::with_codec(UncompressedCodec::new())
    }
}

impl<C: HeifCodec> HeifCoder<C> {
    pub fn with_codec(codec: C) -> HeifCoder<C> {
        HeifCoder {
            codec,
            capabilities: HostCapabilities::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: HostCapabilities) -> HeifCoder<C> {
        self.capabilities = capabilities;
        self
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    /// Decodes the primary image into a color managed plane laid out as requested
    pub fn decode(&self, data: &[u8], options: &DecodeOptions) -> Result<PixelPlane, CoderError> {
        let handle = self.codec.primary_image(data)?;

        let bit_depth = handle.chroma_bits_per_pixel();
        if !(1..=16).contains(&bit_depth) {
            return Err(CoderError::UnsupportedBitDepth(bit_depth));
        }
        let high_bit_depth = bit_depth > 8 && self.capabilities.half_float_surfaces;
        let chroma = if high_bit_depth {
            InterleavedChroma::Rrggbbaa16Le
        } else {
            InterleavedChroma::Rgba8
        };
        debug!(
            "Decoding {}x{}, {} bits into {:?}",
            handle.width(),
            handle.height(),
            bit_depth,
            chroma
        );

        let profile = ColorProfile::resolve(handle.as_ref());
        let premultiplied = handle.has_alpha_channel() && handle.is_premultiplied_alpha();

        let mut image = handle.decode(chroma)?;
        drop(handle);
        image.premultiplied_alpha = premultiplied;
        let mut plane = plane_from_codec_image(image)?;

        if let Some((width, height)) = target_size(
            plane.width(),
            plane.height(),
            options.scaled_width,
            options.scaled_height,
            options.scale_mode,
        ) {
            plane = rescale(&plane, width, height)?;
        }

        if plane.is_alpha_premultiplied() && options.color_config != PreferredColorConfig::Rgba8888
        {
            unpremultiply(&mut plane);
        }

        match &profile {
            ColorProfile::Icc(icc) => transform_icc_to_srgb(&mut plane, icc)?,
            ColorProfile::Nclx(nclx) => {
                let matrix = nclx.to_srgb_matrix()?;
                let forward = TransferFunction::from_nclx(nclx.transfer_characteristics);
                let mode = ToneMapperMode::resolve(options.tone_mapper, forward);
                let luma = nclx.luma_coefficients()?;
                debug!(
                    "Applying NCLX transform, transfer {:?}, tone mapper {:?}",
                    forward, mode
                );
                apply_color_matrix(
                    &mut plane,
                    matrix,
                    forward,
                    TransferFunction::Srgb,
                    mode,
                    luma,
                )?;
            }
            ColorProfile::None => trace!("No color profile, passing samples through"),
        }

        reformat_for_output(plane, options.color_config, &self.capabilities)
    }

    /// Encodes the plane as the primary image of a new container
    pub fn encode(
        &self,
        plane: &PixelPlane,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, CoderError> {
        let mut encoder = self.codec.encoder_for_format(options.format)?;
        match options.quality_mode {
            QualityMode::Lossy => {
                encoder.set_lossy_quality(options.quality)?;
                encoder.set_chroma(ChromaSubsampling::Yuv420)?;
                if let Some(speed) = options.speed {
                    encoder.set_speed(speed)?;
                }
            }
            QualityMode::Lossless => {
                encoder.set_lossless(true)?;
                encoder.set_chroma(ChromaSubsampling::Yuv444)?;
            }
        }
        debug!(
            "Encoding {}x{} {:?} plane as {:?}, {:?}",
            plane.width(),
            plane.height(),
            plane.layout(),
            options.format,
            options.quality_mode
        );

        let mut image = to_codec_image(plane, options.format)?;
        image.profile = options.color_space.to_profile()?;
        encoder.encode(&image)
    }

    pub fn probe_mime_type(&self, data: &[u8]) -> MimeType {
        probe_mime_type(data)
    }

    /// Dimensions of the primary image without decoding samples
    pub fn get_dimensions(&self, data: &[u8]) -> Result<(usize, usize), CoderError> {
        let handle = self.codec.primary_image(data)?;
        Ok((handle.width(), handle.height()))
    }

    pub fn is_heif(&self, data: &[u8]) -> bool {
        probe_mime_type(data).is_heif()
    }

    pub fn is_avif(&self, data: &[u8]) -> bool {
        probe_mime_type(data).is_avif()
    }

    pub fn is_supported(&self, data: &[u8]) -> bool {
        let mime = probe_mime_type(data);
        mime.is_heif() || mime.is_avif()
    }
}
