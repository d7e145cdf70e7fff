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
    ColorSpaceTag, CompressionFormat, DecodeOptions, EncodeOptions, HeifCoder, PixelLayout,
    PixelPlane, PreferredColorConfig, QualityMode, ScaleMode,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./assets/input.png".to_string());

    let img = image::open(&input).expect("Failed to open image");
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let plane = PixelPlane::new(
        rgba.into_raw(),
        width as usize,
        height as usize,
        0,
        8,
        PixelLayout::Rgba8,
        false,
    )
    .unwrap();

    let coder = HeifCoder::new();

    let instant = std::time::Instant::now();

    let encoded = coder
        .encode(
            &plane,
            &EncodeOptions {
                format: CompressionFormat::Av1,
                quality_mode: QualityMode::Lossless,
                color_space: ColorSpaceTag::Srgb,
                ..Default::default()
            },
        )
        .unwrap();

    println!(
        "Encoded {} bytes as {} in {:?}",
        encoded.len(),
        coder.probe_mime_type(&encoded),
        instant.elapsed()
    );

    std::fs::write("encoded.avif", &encoded).unwrap();

    let (w, h) = coder.get_dimensions(&encoded).unwrap();
    println!("Dimensions {}x{}", w, h);

    let instant = std::time::Instant::now();

    let decoded = coder
        .decode(
            &encoded,
            &DecodeOptions {
                scaled_width: (w / 2) as i32,
                scaled_height: (h / 2) as i32,
                color_config: PreferredColorConfig::Rgba1010102,
                scale_mode: ScaleMode::Fit,
                ..Default::default()
            },
        )
        .unwrap();

    println!("Decoding time {:?}", instant.elapsed());

    let straight = heifcoder::to_rgba8(&decoded).unwrap();

    image::save_buffer(
        "decoded.png",
        straight.data(),
        straight.width() as u32,
        straight.height() as u32,
        image::ExtendedColorType::Rgba8,
    )
    .unwrap();
}
