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
use heifcoder::{
    to_rgba1010102, CodecImage, ColorPrimaries, ColorSpaceTag, CoderError, CompressionFormat,
    DecodeOptions, EncodeOptions, EncoderParameter, HeifCodec, HeifCoder, HeifEncoder,
    HostCapabilities, ImageHandle, InterleavedChroma, MatrixCoefficients, MimeType, NclxProfile,
    PixelLayout, PixelPlane, PreferredColorConfig, QualityMode, ScaleMode, ToneMapperPreference,
    TransferCharacteristics, UncompressedCodec,
};

fn solid_rgba8(width: usize, height: usize, pixel: [u8; 4]) -> PixelPlane {
    PixelPlane::new(
        pixel.repeat(width * height),
        width,
        height,
        0,
        8,
        PixelLayout::Rgba8,
        false,
    )
    .unwrap()
}

fn gradient_rgba8(width: usize, height: usize) -> PixelPlane {
    let mut data = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[
                (x * 255 / (width - 1).max(1)) as u8,
                (y * 255 / (height - 1).max(1)) as u8,
                ((x + y) * 13 % 256) as u8,
                255,
            ]);
        }
    }
    PixelPlane::new(data, width, height, 0, 8, PixelLayout::Rgba8, false).unwrap()
}

fn lossless(format: CompressionFormat, color_space: ColorSpaceTag) -> EncodeOptions {
    EncodeOptions {
        format,
        quality_mode: QualityMode::Lossless,
        color_space,
        ..Default::default()
    }
}

#[test]
fn lossless_solid_red_round_trip() {
    let coder = HeifCoder::new();
    let source = solid_rgba8(8, 8, [255, 0, 0, 255]);
    let encoded = coder
        .encode(
            &source,
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Unspecified),
        )
        .unwrap();
    let decoded = coder
        .decode(
            &encoded,
            &DecodeOptions {
                color_config: PreferredColorConfig::Rgba8888,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!((decoded.width(), decoded.height()), (8, 8));
    assert_eq!(decoded.layout(), PixelLayout::Rgba8);
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(decoded.pixel(x, y), &[255, 0, 0, 255]);
        }
    }
}

#[test]
fn srgb_tagged_content_is_preserved() {
    let coder = HeifCoder::new();
    let source = gradient_rgba8(16, 4);
    let encoded = coder
        .encode(&source, &lossless(CompressionFormat::Hevc, ColorSpaceTag::Srgb))
        .unwrap();
    let decoded = coder.decode(&encoded, &DecodeOptions::default()).unwrap();
    for (a, b) in decoded.data().iter().zip(source.data().iter()) {
        assert!((*a as i32 - *b as i32).abs() <= 1);
    }
}

#[test]
fn dimensions_of_single_pixel() {
    let coder = HeifCoder::new();
    let encoded = coder
        .encode(
            &solid_rgba8(1, 1, [1, 2, 3, 4]),
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Unspecified),
        )
        .unwrap();
    assert_eq!(coder.get_dimensions(&encoded), Ok((1, 1)));
}

#[test]
fn corrupt_header_is_unreadable() {
    let coder = HeifCoder::new();
    let mut encoded = coder
        .encode(
            &solid_rgba8(1, 1, [1, 2, 3, 4]),
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Unspecified),
        )
        .unwrap();
    let ftyp_size = u32::from_be_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]) as usize;
    encoded[ftyp_size..ftyp_size + 4].copy_from_slice(&u32::MAX.to_be_bytes());
    assert_eq!(
        coder.get_dimensions(&encoded),
        Err(CoderError::UnreadableSource)
    );
    assert_eq!(
        coder.get_dimensions(b"definitely not a container"),
        Err(CoderError::UnreadableSource)
    );
}

#[test]
fn mime_types_follow_format() {
    let coder = HeifCoder::new();
    let plane = solid_rgba8(2, 2, [0, 0, 0, 255]);
    let avif = coder
        .encode(&plane, &lossless(CompressionFormat::Av1, ColorSpaceTag::Unspecified))
        .unwrap();
    let heic = coder
        .encode(&plane, &lossless(CompressionFormat::Hevc, ColorSpaceTag::Unspecified))
        .unwrap();
    assert_eq!(coder.probe_mime_type(&avif), MimeType::Avif);
    assert_eq!(coder.probe_mime_type(&heic), MimeType::Heic);
    assert_eq!(coder.probe_mime_type(&[]), MimeType::Unknown);
    assert_eq!(coder.probe_mime_type(&[0x42; 100]), MimeType::Unknown);
    assert!(coder.is_avif(&avif));
    assert!(!coder.is_heif(&avif));
    assert!(coder.is_heif(&heic));
    assert!(coder.is_supported(&heic));
    assert!(!coder.is_supported(&[0x42; 100]));
}

#[test]
fn auto_tone_mapper_matches_skip_for_sdr_curves() {
    let coder = HeifCoder::new();
    let source = gradient_rgba8(32, 8);
    for tag in [
        ColorSpaceTag::Srgb,
        ColorSpaceTag::Bt709,
        ColorSpaceTag::DisplayP3,
        ColorSpaceTag::LinearSrgb,
        ColorSpaceTag::Bt2020,
    ] {
        let encoded = coder
            .encode(&source, &lossless(CompressionFormat::Av1, tag.clone()))
            .unwrap();
        let decode = |tone_mapper| {
            coder
                .decode(
                    &encoded,
                    &DecodeOptions {
                        tone_mapper,
                        ..Default::default()
                    },
                )
                .unwrap()
        };
        let auto = decode(ToneMapperPreference::Auto);
        assert_eq!(auto, decode(ToneMapperPreference::Skip), "{:?}", tag);
        assert_eq!(auto, decode(ToneMapperPreference::Pq), "{:?}", tag);
    }
}

#[test]
fn pq_content_is_tone_mapped() {
    let coder = HeifCoder::new();
    let source = solid_rgba8(2, 2, [200, 200, 200, 255]);
    let encoded = coder
        .encode(
            &source,
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Bt2020Pq),
        )
        .unwrap();
    let options = |tone_mapper| DecodeOptions {
        tone_mapper,
        ..Default::default()
    };
    let clipped = coder
        .decode(&encoded, &options(ToneMapperPreference::Skip))
        .unwrap();
    let mapped = coder
        .decode(&encoded, &options(ToneMapperPreference::Auto))
        .unwrap();
    assert_eq!(clipped.pixel(0, 0), &[255, 255, 255, 255]);
    assert!(mapped.pixel(0, 0)[0] < 255);
    assert_eq!(mapped.pixel(0, 0)[3], 255);
}

#[test]
fn rgba1010102_source_is_stored_premultiplied() {
    let coder = HeifCoder::new();
    let packed = to_rgba1010102(&solid_rgba8(2, 2, [255, 255, 255, 170])).unwrap();
    for format in [CompressionFormat::Av1, CompressionFormat::Hevc] {
        let encoded = coder
            .encode(&packed, &lossless(format, ColorSpaceTag::Unspecified))
            .unwrap();
        let handle = UncompressedCodec::new().primary_image(&encoded).unwrap();
        assert!(handle.is_premultiplied_alpha());

        let premultiplied = coder.decode(&encoded, &DecodeOptions::default()).unwrap();
        assert!(premultiplied.is_alpha_premultiplied());

        let straight = coder
            .decode(
                &encoded,
                &DecodeOptions {
                    color_config: PreferredColorConfig::RgbaF16,
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!straight.is_alpha_premultiplied());
    }
}

fn ten_bit_plane() -> PixelPlane {
    let mut data = Vec::new();
    for _ in 0..4 {
        for v in [1023u16, 512, 0, 1023] {
            data.extend_from_slice(&v.to_le_bytes());
        }
    }
    PixelPlane::new(data, 2, 2, 0, 10, PixelLayout::Rgba16, false).unwrap()
}

#[test]
fn deep_content_decodes_to_half_floats() {
    let coder = HeifCoder::new();
    let encoded = coder
        .encode(
            &ten_bit_plane(),
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Unspecified),
        )
        .unwrap();
    let handle = UncompressedCodec::new().primary_image(&encoded).unwrap();
    assert_eq!(handle.chroma_bits_per_pixel(), 10);

    let decoded = coder
        .decode(
            &encoded,
            &DecodeOptions {
                color_config: PreferredColorConfig::RgbaF16,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(decoded.layout(), PixelLayout::RgbaF16);

    let legacy = HeifCoder::new().with_capabilities(HostCapabilities::from_api_level(24));
    let decoded = legacy
        .decode(
            &encoded,
            &DecodeOptions {
                color_config: PreferredColorConfig::RgbaF16,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(decoded.layout(), PixelLayout::Rgba8);
    assert_eq!(decoded.pixel(0, 0), &[255, 128, 0, 255]);
}

#[test]
fn hevc_receives_eight_bit_samples() {
    let coder = HeifCoder::new();
    let encoded = coder
        .encode(
            &ten_bit_plane(),
            &lossless(CompressionFormat::Hevc, ColorSpaceTag::Unspecified),
        )
        .unwrap();
    let handle = UncompressedCodec::new().primary_image(&encoded).unwrap();
    assert_eq!(handle.chroma_bits_per_pixel(), 8);
}

#[test]
fn decode_scales_before_reformatting() {
    let coder = HeifCoder::new();
    let encoded = coder
        .encode(
            &gradient_rgba8(8, 4),
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Unspecified),
        )
        .unwrap();
    let fit = coder
        .decode(
            &encoded,
            &DecodeOptions {
                scaled_width: 4,
                scaled_height: 4,
                scale_mode: ScaleMode::Fit,
                color_config: PreferredColorConfig::Rgb565,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!((fit.width(), fit.height()), (4, 2));
    assert_eq!(fit.layout(), PixelLayout::Rgb565);

    let exact = coder
        .decode(
            &encoded,
            &DecodeOptions {
                scaled_width: 3,
                scaled_height: 5,
                scale_mode: ScaleMode::Resize,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!((exact.width(), exact.height()), (3, 5));
}

#[test]
fn hardware_planes_are_rejected_by_encoder() {
    let coder = HeifCoder::new();
    let encoded = coder
        .encode(
            &solid_rgba8(2, 2, [9, 9, 9, 255]),
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Unspecified),
        )
        .unwrap();
    let hardware = coder
        .decode(
            &encoded,
            &DecodeOptions {
                color_config: PreferredColorConfig::HardwareAccelerated,
                ..Default::default()
            },
        )
        .unwrap();
    assert!(hardware.is_hardware_backed());
    assert_eq!(
        coder.encode(&hardware, &EncodeOptions::default()),
        Err(CoderError::UnsupportedPixelFormat)
    );
}

#[test]
fn invalid_encoder_parameters_fail() {
    let coder = HeifCoder::new();
    let plane = solid_rgba8(1, 1, [0, 0, 0, 255]);
    let options = EncodeOptions {
        quality: 0,
        ..Default::default()
    };
    assert_eq!(
        coder.encode(&plane, &options),
        Err(CoderError::EncoderConfigurationFailure(
            EncoderParameter::Quality
        ))
    );
    let options = EncodeOptions {
        speed: Some(25),
        ..Default::default()
    };
    assert_eq!(
        coder.encode(&plane, &options),
        Err(CoderError::EncoderConfigurationFailure(
            EncoderParameter::Speed
        ))
    );
    let options = EncodeOptions {
        quality: 0,
        quality_mode: QualityMode::Lossless,
        ..Default::default()
    };
    assert!(coder.encode(&plane, &options).is_ok());
}

struct NegativeDepthHandle;

impl ImageHandle for NegativeDepthHandle {
    fn width(&self) -> usize {
        1
    }

    fn height(&self) -> usize {
        1
    }

    fn chroma_bits_per_pixel(&self) -> i32 {
        -1
    }

    fn has_alpha_channel(&self) -> bool {
        false
    }

    fn is_premultiplied_alpha(&self) -> bool {
        false
    }

    fn icc_profile(&self) -> Option<Vec<u8>> {
        None
    }

    fn nclx_profile(&self) -> Option<NclxProfile> {
        None
    }

    fn decode(&self, _: InterleavedChroma) -> Result<CodecImage, CoderError> {
        Err(CoderError::UnreadableSource)
    }
}

#[derive(Debug, Default)]
struct NegativeDepthCodec;

impl HeifCodec for NegativeDepthCodec {
    fn primary_image<'a>(
        &self,
        _: &'a [u8],
    ) -> Result<Box<dyn ImageHandle + 'a>, CoderError> {
        Ok(Box::new(NegativeDepthHandle))
    }

    fn encoder_for_format(
        &self,
        _: CompressionFormat,
    ) -> Result<Box<dyn HeifEncoder>, CoderError> {
        Err(CoderError::UnsupportedPixelFormat)
    }
}

#[test]
fn negative_bit_depth_is_rejected() {
    let coder = HeifCoder::with_codec(NegativeDepthCodec);
    assert_eq!(
        coder.decode(&[0u8; 4], &DecodeOptions::default()),
        Err(CoderError::UnsupportedBitDepth(-1))
    );
}

#[test]
fn oversized_item_dimensions_are_unreadable() {
    let coder = HeifCoder::new();
    let mut encoded = coder
        .encode(
            &solid_rgba8(1, 1, [1, 2, 3, 4]),
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Unspecified),
        )
        .unwrap();
    let ispe = encoded.windows(4).position(|x| x == b"ispe").unwrap();
    encoded[ispe + 8..ispe + 16].fill(0xff);
    assert_eq!(
        coder.get_dimensions(&encoded),
        Err(CoderError::UnreadableSource)
    );
    assert_eq!(
        coder.decode(&encoded, &DecodeOptions::default()),
        Err(CoderError::UnreadableSource)
    );
}

#[test]
fn oversized_scale_request_is_out_of_memory() {
    let coder = HeifCoder::new();
    let encoded = coder
        .encode(
            &solid_rgba8(1, 1, [1, 2, 3, 255]),
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Unspecified),
        )
        .unwrap();
    for scale_mode in [ScaleMode::Resize, ScaleMode::Fit] {
        let options = DecodeOptions {
            scaled_width: i32::MAX,
            scaled_height: i32::MAX,
            scale_mode,
            ..Default::default()
        };
        assert_eq!(
            coder.decode(&encoded, &options),
            Err(CoderError::OutOfMemory)
        );
    }
}

fn display_p3_icc() -> Vec<u8> {
    moxcms::ColorProfile::new_display_p3().encode().unwrap()
}

#[test]
fn icc_tagged_red_is_clipped_to_srgb_red() {
    let coder = HeifCoder::new();
    let encoded = coder
        .encode(
            &solid_rgba8(2, 2, [255, 0, 0, 255]),
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Icc(display_p3_icc())),
        )
        .unwrap();
    let decoded = coder.decode(&encoded, &DecodeOptions::default()).unwrap();
    let px = decoded.pixel(1, 1);
    assert_eq!(px[0], 255);
    assert!(px[1] <= 2, "{:?}", px);
    assert!(px[2] <= 2, "{:?}", px);
    assert_eq!(px[3], 255);
}

#[test]
fn icc_and_nclx_display_p3_agree() {
    let coder = HeifCoder::new();
    let source = solid_rgba8(2, 1, [200, 100, 50, 255]);
    let decode = |tag: ColorSpaceTag| {
        let encoded = coder
            .encode(&source, &lossless(CompressionFormat::Hevc, tag))
            .unwrap();
        coder.decode(&encoded, &DecodeOptions::default()).unwrap()
    };
    let icc = decode(ColorSpaceTag::Icc(display_p3_icc()));
    let nclx = decode(ColorSpaceTag::DisplayP3);
    assert_ne!(icc.pixel(0, 0), source.pixel(0, 0));
    for (a, b) in icc.data().iter().zip(nclx.data().iter()) {
        assert!((*a as i32 - *b as i32).abs() <= 3, "{} vs {}", a, b);
    }
}

fn f16_pixel(plane: &PixelPlane, x: usize, y: usize) -> [f32; 4] {
    let px = plane.pixel(x, y);
    let mut rgba = [0f32; 4];
    for (dst, src) in rgba.iter_mut().zip(px.chunks_exact(2)) {
        *dst = half::f16::from_le_bytes([src[0], src[1]]).to_f32();
    }
    rgba
}

#[test]
fn icc_applies_to_ten_bit_content() {
    let coder = HeifCoder::new();
    let options = DecodeOptions {
        color_config: PreferredColorConfig::RgbaF16,
        ..Default::default()
    };
    let decode = |tag: ColorSpaceTag| {
        let encoded = coder
            .encode(&ten_bit_plane(), &lossless(CompressionFormat::Av1, tag))
            .unwrap();
        assert_eq!(
            UncompressedCodec::new()
                .primary_image(&encoded)
                .unwrap()
                .chroma_bits_per_pixel(),
            10
        );
        coder.decode(&encoded, &options).unwrap()
    };
    let icc = decode(ColorSpaceTag::Icc(display_p3_icc()));
    let nclx = decode(ColorSpaceTag::DisplayP3);
    assert_eq!(icc.layout(), PixelLayout::RgbaF16);

    let icc_px = f16_pixel(&icc, 0, 0);
    let nclx_px = f16_pixel(&nclx, 0, 0);
    assert!((icc_px[0] - 1.).abs() < 0.01, "{:?}", icc_px);
    // P3 orange is less green in sRGB
    assert!(icc_px[1] < 0.49, "{:?}", icc_px);
    assert!((icc_px[3] - 1.).abs() < 0.01);
    for (a, b) in icc_px.iter().zip(nclx_px.iter()) {
        assert!((a - b).abs() < 0.01, "{:?} vs {:?}", icc_px, nclx_px);
    }
}

/// Container carrying both an ICC profile and an NCLX description
struct DualProfileHandle {
    icc: Vec<u8>,
}

impl ImageHandle for DualProfileHandle {
    fn width(&self) -> usize {
        1
    }

    fn height(&self) -> usize {
        1
    }

    fn chroma_bits_per_pixel(&self) -> i32 {
        8
    }

    fn has_alpha_channel(&self) -> bool {
        true
    }

    fn is_premultiplied_alpha(&self) -> bool {
        false
    }

    fn icc_profile(&self) -> Option<Vec<u8>> {
        Some(self.icc.clone())
    }

    fn nclx_profile(&self) -> Option<NclxProfile> {
        Some(NclxProfile::new(
            ColorPrimaries::Bt2020,
            TransferCharacteristics::Pq,
            MatrixCoefficients::Bt2020Ncl,
            true,
        ))
    }

    fn decode(&self, chroma: InterleavedChroma) -> Result<CodecImage, CoderError> {
        assert_eq!(chroma, InterleavedChroma::Rgba8);
        Ok(CodecImage {
            width: 1,
            height: 1,
            bit_depth: 8,
            chroma,
            has_alpha: true,
            data: vec![200, 100, 50, 255],
            stride: 4,
            premultiplied_alpha: false,
            profile: Default::default(),
        })
    }
}

struct DualProfileCodec;

impl HeifCodec for DualProfileCodec {
    fn primary_image<'a>(
        &self,
        _: &'a [u8],
    ) -> Result<Box<dyn ImageHandle + 'a>, CoderError> {
        Ok(Box::new(DualProfileHandle {
            icc: display_p3_icc(),
        }))
    }

    fn encoder_for_format(
        &self,
        _: CompressionFormat,
    ) -> Result<Box<dyn HeifEncoder>, CoderError> {
        Err(CoderError::UnsupportedPixelFormat)
    }
}

#[test]
fn icc_takes_priority_over_nclx() {
    let dual = HeifCoder::with_codec(DualProfileCodec)
        .decode(&[], &DecodeOptions::default())
        .unwrap();

    let coder = HeifCoder::new();
    let encoded = coder
        .encode(
            &solid_rgba8(1, 1, [200, 100, 50, 255]),
            &lossless(CompressionFormat::Av1, ColorSpaceTag::Icc(display_p3_icc())),
        )
        .unwrap();
    let icc_only = coder.decode(&encoded, &DecodeOptions::default()).unwrap();
    assert_eq!(dual.data(), icc_only.data());
}
