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
use crate::gamma::{TransferFunction, HLG_WHITE_NITS, PQ_MAX_NITS, SDR_REFERENCE_DISPLAY};
use crate::mlaf::mlaf;

/// Tone mapping requested by the caller.
///
/// Only honored for HLG and PQ content, every other transfer function is
/// decoded without highlight compression.
#[derive(Debug, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToneMapperPreference {
    Skip,
    /// Compress highlights with HLG peak brightness
    Hlg,
    /// Compress highlights with PQ peak brightness
    Pq,
    /// Pick the curve matching the source transfer function
    #[default]
    Auto,
}

/// Tone mapping actually performed for an image
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum ToneMapperMode {
    Skip,
    Hlg,
    Pq,
}

impl ToneMapperMode {
    /// Gates caller preference by the forward transfer function.
    pub fn resolve(preference: ToneMapperPreference, forward: TransferFunction) -> ToneMapperMode {
        if !forward.is_hdr() {
            return ToneMapperMode::Skip;
        }
        match preference {
            ToneMapperPreference::Skip => ToneMapperMode::Skip,
            ToneMapperPreference::Hlg => ToneMapperMode::Hlg,
            ToneMapperPreference::Pq => ToneMapperMode::Pq,
            ToneMapperPreference::Auto => {
                if forward == TransferFunction::Hlg {
                    ToneMapperMode::Hlg
                } else {
                    ToneMapperMode::Pq
                }
            }
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        *self != ToneMapperMode::Skip
    }

    fn content_max_brightness(&self) -> Option<f32> {
        match self {
            ToneMapperMode::Skip => None,
            ToneMapperMode::Hlg => Some(HLG_WHITE_NITS),
            ToneMapperMode::Pq => Some(PQ_MAX_NITS),
        }
    }

    /// Luminance mapper for `CN` channel lanes, `None` when skipped
    pub(crate) fn tone_mapper<const CN: usize>(
        &self,
        luma_primaries: [f32; 3],
    ) -> Option<Box<SyncToneMap>> {
        let content_max = self.content_max_brightness()?;
        Some(Box::new(Rec2408ToneMapper::<CN>::new(
            content_max,
            SDR_REFERENCE_DISPLAY,
            SDR_REFERENCE_DISPLAY,
            luma_primaries,
        )))
    }
}

pub(crate) trait ToneMap {
    fn process_lane(&self, in_place: &mut [f32]);
}

pub(crate) type SyncToneMap = dyn ToneMap + Send + Sync;

/// ITU-R BT.2408 luminance based highlight compression
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rec2408ToneMapper<const CN: usize> {
    w_a: f32,
    w_b: f32,
    primaries: [f32; 3],
}

impl<const CN: usize> Rec2408ToneMapper<CN> {
    pub(crate) fn new(
        content_max_brightness: f32,
        display_max_brightness: f32,
        white_point: f32,
        primaries: [f32; 3],
    ) -> Self {
        let ld = content_max_brightness / white_point;
        let w_a = (display_max_brightness / white_point) / (ld * ld);
        let w_b = 1.0f32 / (display_max_brightness / white_point);
        Self {
            w_a,
            w_b,
            primaries,
        }
    }

    #[inline(always)]
    fn tonemap(&self, luma: f32) -> f32 {
        mlaf(1f32, self.w_a, luma) / mlaf(1f32, self.w_b, luma)
    }
}

impl<const CN: usize> ToneMap for Rec2408ToneMapper<CN> {
    fn process_lane(&self, in_place: &mut [f32]) {
        for chunk in in_place.chunks_exact_mut(CN) {
            let luma = mlaf(
                mlaf(chunk[0] * self.primaries[0], chunk[1], self.primaries[1]),
                chunk[2],
                self.primaries[2],
            );
            if luma <= 0. {
                chunk[0] = 0.;
                chunk[1] = 0.;
                chunk[2] = 0.;
                continue;
            }
            let scale = self.tonemap(luma);
            chunk[0] = (chunk[0] * scale).min(1f32);
            chunk[1] = (chunk[1] * scale).min(1f32);
            chunk[2] = (chunk[2] * scale).min(1f32);
        }
    }
}
