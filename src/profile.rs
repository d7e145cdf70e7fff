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
use crate::codec::ImageHandle;
use crate::nclx::NclxProfile;
use tracing::debug;

/// Color description of a single image, resolved once per call
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorProfile {
    /// Embedded ICC profile bytes
    Icc(Vec<u8>),
    Nclx(NclxProfile),
    #[default]
    None,
}

impl ColorProfile {
    /// Picks the color description of the handle.
    ///
    /// Non empty ICC always wins over NCLX, NCLX is taken only when both
    /// primaries and transfer characteristics are specified.
    pub fn resolve(handle: &dyn ImageHandle) -> ColorProfile {
        if let Some(icc) = handle.icc_profile() {
            if !icc.is_empty() {
                debug!("Resolved ICC profile, {} bytes", icc.len());
                return ColorProfile::Icc(icc);
            }
        }
        match handle.nclx_profile() {
            Some(nclx) if nclx.is_specified() => {
                debug!(
                    "Resolved NCLX profile, primaries {:?}, transfer {:?}",
                    nclx.color_primaries, nclx.transfer_characteristics
                );
                ColorProfile::Nclx(nclx)
            }
            _ => {
                debug!("Image has no usable color profile");
                ColorProfile::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecImage, InterleavedChroma};
    use crate::err::CoderError;
    use crate::nclx::{ColorPrimaries, MatrixCoefficients, TransferCharacteristics};

    struct StubHandle {
        icc: Option<Vec<u8>>,
        nclx: Option<NclxProfile>,
    }

    impl ImageHandle for StubHandle {
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
            false
        }

        fn is_premultiplied_alpha(&self) -> bool {
            false
        }

        fn icc_profile(&self) -> Option<Vec<u8>> {
            self.icc.clone()
        }

        fn nclx_profile(&self) -> Option<NclxProfile> {
            self.nclx
        }

        fn decode(&self, _: InterleavedChroma) -> Result<CodecImage, CoderError> {
            Err(CoderError::UnreadableSource)
        }
    }

    fn bt2020_pq() -> NclxProfile {
        NclxProfile::new(
            ColorPrimaries::Bt2020,
            TransferCharacteristics::Pq,
            MatrixCoefficients::Bt2020Ncl,
            true,
        )
    }

    #[test]
    fn icc_has_priority() {
        let handle = StubHandle {
            icc: Some(vec![1, 2, 3]),
            nclx: Some(bt2020_pq()),
        };
        assert_eq!(
            ColorProfile::resolve(&handle), ColorProfile::Icc(vec![1, 2,
            3])
        );
    }

    #[test]
    fn empty_icc_falls_through_to_nclx() {
        let handle = StubHandle {
            icc: Some(vec![]),
            nclx: Some(bt2020_pq()),
        };
        assert_eq!(
            ColorProfile::resolve(&handle),
            ColorProfile::Nclx(bt2020_pq())
        );
    }

    #[test]
    fn unspecified_nclx_is_ignored() {
        let handle = StubHandle {
            icc: None,
            nclx: Some(NclxProfile::new(
                ColorPrimaries::Bt709,
                TransferCharacteristics::Unspecified,
                MatrixCoefficients::Bt709,
                true,
            )),
        };
        assert_eq!(ColorProfile::resolve(&handle), ColorProfile::None);
        let handle = StubHandle {
            icc: None,
            nclx: None,
        };
        assert_eq!(ColorProfile::resolve(&handle), ColorProfile::None);
    }
}
