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
use crate::cms::{gamut_to_xyz, xyz_basis_to_srgb, Chromaticity, Matrix3f, SRGB_PRIMARIES};
use crate::err::CoderError;

/// Color primaries code points, ITU-T H.273
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorPrimaries {
    Bt709,
    Unspecified,
    Bt470M,
    Bt470Bg,
    Bt601,
    Smpte240,
    GenericFilm,
    Bt2020,
    Xyz,
    /// DCI-P3
    Smpte431,
    /// Display P3
    Smpte432,
    Ebu3213,
    Reserved(u16),
}

impl From<u16> for ColorPrimaries {
    fn from(value: u16) -> Self {
        match value {
            1 => ColorPrimaries::Bt709,
            2 => ColorPrimaries::Unspecified,
            4 => ColorPrimaries::Bt470M,
            5 => ColorPrimaries::Bt470Bg,
            6 => ColorPrimaries::Bt601,
            7 => ColorPrimaries::Smpte240,
            8 => ColorPrimaries::GenericFilm,
            9 => ColorPrimaries::Bt2020,
            10 => ColorPrimaries::Xyz,
            11 => ColorPrimaries::Smpte431,
            12 => ColorPrimaries::Smpte432,
            22 => ColorPrimaries::Ebu3213,
            v => ColorPrimaries::Reserved(v),
        }
    }
}

impl ColorPrimaries {
    pub fn code(&self) -> u16 {
        match self {
            ColorPrimaries::Bt709 => 1,
            ColorPrimaries::Unspecified => 2,
            ColorPrimaries::Bt470M => 4,
            ColorPrimaries::Bt470Bg => 5,
            ColorPrimaries::Bt601 => 6,
            ColorPrimaries::Smpte240 => 7,
            ColorPrimaries::GenericFilm => 8,
            ColorPrimaries::Bt2020 => 9,
            ColorPrimaries::Xyz => 10,
            ColorPrimaries::Smpte431 => 11,
            ColorPrimaries::Smpte432 => 12,
            ColorPrimaries::Ebu3213 => 22,
            ColorPrimaries::Reserved(v) => *v,
        }
    }

    /// Chromaticities of red, green, blue and the white point.
    ///
    /// Unspecified and reserved codes resolve to sRGB primaries with D65.
    pub fn chromaticities(&self) -> ([Chromaticity; 3], Chromaticity) {
        const D65: Chromaticity = Chromaticity::D65;
        const C: Chromaticity = Chromaticity::new(0.310, 0.316);
        match self {
            ColorPrimaries::Bt709 | ColorPrimaries::Unspecified | ColorPrimaries::Reserved(_) => {
                (SRGB_PRIMARIES, D65)
            }
            ColorPrimaries::Bt470M => (
                [
                    Chromaticity::new(0.67, 0.33),
                    Chromaticity::new(0.21, 0.71),
                    Chromaticity::new(0.14, 0.08),
                ],
                C,
            ),
            ColorPrimaries::Bt470Bg => (
                [
                    Chromaticity::new(0.64, 0.33),
                    Chromaticity::new(0.29, 0.60),
                    Chromaticity::new(0.15, 0.06),
                ],
                D65,
            ),
            ColorPrimaries::Bt601 | ColorPrimaries::Smpte240 => (
                [
                    Chromaticity::new(0.630, 0.340),
                    Chromaticity::new(0.310, 0.595),
                    Chromaticity::new(0.155, 0.070),
                ],
                D65,
            ),
            ColorPrimaries::GenericFilm => (
                [
                    Chromaticity::new(0.681, 0.319),
                    Chromaticity::new(0.243, 0.692),
                    Chromaticity::new(0.145, 0.049),
                ],
                C,
            ),
            ColorPrimaries::Bt2020 => (
                [
                    Chromaticity::new(0.708, 0.292),
                    Chromaticity::new(0.170, 0.797),
                    Chromaticity::new(0.131, 0.046),
                ],
                D65,
            ),
            ColorPrimaries::Xyz => (
                [
                    Chromaticity::new(1.0, 0.0),
                    Chromaticity::new(0.0, 1.0),
                    Chromaticity::new(0.0, 0.0),
                ],
                Chromaticity::new(1. / 3., 1. / 3.),
            ),
            ColorPrimaries::Smpte431 => (
                [
                    Chromaticity::new(0.680, 0.320),
                    Chromaticity::new(0.265, 0.690),
                    Chromaticity::new(0.150, 0.060),
                ],
                Chromaticity::new(0.314, 0.351),
            ),
            ColorPrimaries::Smpte432 => (
                [
                    Chromaticity::new(0.680, 0.320),
                    Chromaticity::new(0.265, 0.690),
                    Chromaticity::new(0.150, 0.060),
                ],
                D65,
            ),
            ColorPrimaries::Ebu3213 => (
                [
                    Chromaticity::new(0.630, 0.340),
                    Chromaticity::new(0.295, 0.605),
                    Chromaticity::new(0.155, 0.077),
                ],
                D65,
            ),
        }
    }
}

/// Transfer characteristics code points, ITU-T H.273
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferCharacteristics {
    Bt709,
    Unspecified,
    Bt470M,
    Bt470Bg,
    Bt601,
    Smpte240,
    Linear,
    Log100,
    Log100Sqrt10,
    Iec61966_2_4,
    Bt1361,
    /// sRGB
    Iec61966_2_1,
    Bt2020_10bit,
    Bt2020_12bit,
    /// SMPTE ST 2084
    Pq,
    Smpte428,
    /// ARIB STD-B67
    Hlg,
    Reserved(u16),
}

impl From<u16> for TransferCharacteristics {
    fn from(value: u16) -> Self {
        match value {
            1 => TransferCharacteristics::Bt709,
            2 => TransferCharacteristics::Unspecified,
            4 => TransferCharacteristics::Bt470M,
            5 => TransferCharacteristics::Bt470Bg,
            6 => TransferCharacteristics::Bt601,
            7 => TransferCharacteristics::Smpte240,
            8 => TransferCharacteristics::Linear,
            9 => TransferCharacteristics::Log100,
            10 => TransferCharacteristics::Log100Sqrt10,
            11 => TransferCharacteristics::Iec61966_2_4,
            12 => TransferCharacteristics::Bt1361,
            13 => TransferCharacteristics::Iec61966_2_1,
            14 => TransferCharacteristics::Bt2020_10bit,
            15 => TransferCharacteristics::Bt2020_12bit,
            16 => TransferCharacteristics::Pq,
            17 => TransferCharacteristics::Smpte428,
            18 => TransferCharacteristics::Hlg,
            v => TransferCharacteristics::Reserved(v),
        }
    }
}

impl TransferCharacteristics {
    pub fn code(&self) -> u16 {
        match self {
            TransferCharacteristics::Bt709 => 1,
            TransferCharacteristics::Unspecified => 2,
            TransferCharacteristics::Bt470M => 4,
            TransferCharacteristics::Bt470Bg => 5,
            TransferCharacteristics::Bt601 => 6,
            TransferCharacteristics::Smpte240 => 7,
            TransferCharacteristics::Linear => 8,
            TransferCharacteristics::Log100 => 9,
            TransferCharacteristics::Log100Sqrt10 => 10,
            TransferCharacteristics::Iec61966_2_4 => 11,
            TransferCharacteristics::Bt1361 => 12,
            TransferCharacteristics::Iec61966_2_1 => 13,
            TransferCharacteristics::Bt2020_10bit => 14,
            TransferCharacteristics::Bt2020_12bit => 15,
            TransferCharacteristics::Pq => 16,
            TransferCharacteristics::Smpte428 => 17,
            TransferCharacteristics::Hlg => 18,
            TransferCharacteristics::Reserved(v) => *v,
        }
    }
}

/// Matrix coefficients code points, ITU-T H.273
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatrixCoefficients {
    Identity,
    Bt709,
    Unspecified,
    Fcc,
    Bt470Bg,
    Bt601,
    Smpte240,
    YCgCo,
    Bt2020Ncl,
    Bt2020Cl,
    Smpte2085,
    ChromaticityDerivedNcl,
    ChromaticityDerivedCl,
    ICtCp,
    Reserved(u16),
}

impl From<u16> for MatrixCoefficients {
    fn from(value: u16) -> Self {
        match value {
            0 => MatrixCoefficients::Identity,
            1 => MatrixCoefficients::Bt709,
            2 => MatrixCoefficients::Unspecified,
            4 => MatrixCoefficients::Fcc,
            5 => MatrixCoefficients::Bt470Bg,
            6 => MatrixCoefficients::Bt601,
            7 => MatrixCoefficients::Smpte240,
            8 => MatrixCoefficients::YCgCo,
            9 => MatrixCoefficients::Bt2020Ncl,
            10 => MatrixCoefficients::Bt2020Cl,
            11 => MatrixCoefficients::Smpte2085,
            12 => MatrixCoefficients::ChromaticityDerivedNcl,
            13 => MatrixCoefficients::ChromaticityDerivedCl,
            14 => MatrixCoefficients::ICtCp,
            v => MatrixCoefficients::Reserved(v),
        }
    }
}

impl MatrixCoefficients {
    pub fn code(&self) -> u16 {
        match self {
            MatrixCoefficients::Identity => 0,
            MatrixCoefficients::Bt709 => 1,
            MatrixCoefficients::Unspecified => 2,
            MatrixCoefficients::Fcc => 4,
            MatrixCoefficients::Bt470Bg => 5,
            MatrixCoefficients::Bt601 => 6,
            MatrixCoefficients::Smpte240 => 7,
            MatrixCoefficients::YCgCo => 8,
            MatrixCoefficients::Bt2020Ncl => 9,
            MatrixCoefficients::Bt2020Cl => 10,
            MatrixCoefficients::Smpte2085 => 11,
            MatrixCoefficients::ChromaticityDerivedNcl => 12,
            MatrixCoefficients::ChromaticityDerivedCl => 13,
            MatrixCoefficients::ICtCp => 14,
            MatrixCoefficients::Reserved(v) => *v,
        }
    }
}

/// Compact in-container color description.
///
/// Chromaticities are derived from `color_primaries` on construction,
/// they are what the gamut transform consumes.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NclxProfile {
    pub color_primaries: ColorPrimaries,
    pub transfer_characteristics: TransferCharacteristics,
    pub matrix_coefficients: MatrixCoefficients,
    pub full_range: bool,
    pub primaries: [Chromaticity; 3],
    pub white_point: Chromaticity,
}

impl NclxProfile {
    pub fn new(
        color_primaries: ColorPrimaries,
        transfer_characteristics: TransferCharacteristics,
        matrix_coefficients: MatrixCoefficients,
        full_range: bool,
    ) -> NclxProfile {
        let (primaries, white_point) = color_primaries.chromaticities();
        NclxProfile {
            color_primaries,
            transfer_characteristics,
            matrix_coefficients,
            full_range,
            primaries,
            white_point,
        }
    }

    /// Both primaries and transfer characteristics carry a real value
    pub fn is_specified(&self) -> bool {
        self.color_primaries != ColorPrimaries::Unspecified
            && self.transfer_characteristics != TransferCharacteristics::Unspecified
    }

    /// RGB -> XYZ basis of the primaries.
    ///
    /// XYZ primaries store CIE XYZ directly, their chromaticities have no
    /// finite basis so the identity is used.
    pub fn rgb_to_xyz(&self) -> Result<Matrix3f, CoderError> {
        match self.color_primaries {
            ColorPrimaries::Xyz => Ok(Matrix3f::IDENTITY),
            _ => gamut_to_xyz(self.primaries, self.white_point).ok_or(CoderError::InvalidGamut),
        }
    }

    /// Linear RGB of this profile into linear sRGB
    pub fn to_srgb_matrix(&self) -> Result<Matrix3f, CoderError> {
        xyz_basis_to_srgb(self.rgb_to_xyz()?)
    }

    /// Luma weights, the Y row of [NclxProfile::rgb_to_xyz]
    pub fn luma_coefficients(&self) -> Result<[f32; 3], CoderError> {
        Ok(self.rgb_to_xyz()?.v[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn codes_survive_conversion() {
        for code in 0u16..32 {
            assert_eq!(ColorPrimaries::from(code).code(), code);
            assert_eq!(TransferCharacteristics::from(code).code(), code);
            assert_eq!(MatrixCoefficients::from(code).code(), code);
        }
    }

    #[test]
    fn xyz_primaries_have_closed_form_basis() {
        let profile = NclxProfile::new(
            ColorPrimaries::Xyz,
            TransferCharacteristics::Linear,
            MatrixCoefficients::Identity,
            true,
        );
        assert_eq!(profile.rgb_to_xyz(), Ok(Matrix3f::IDENTITY));
        assert_eq!(profile.luma_coefficients(), Ok([0., 1., 0.]));
        let matrix = profile.to_srgb_matrix().unwrap();
        // D65 white in XYZ lands on sRGB white
        let white = matrix.mul_vector(crate::cms::Vector3f {
            v: [0.95047, 1., 1.08883],
        });
        for c in white.v {
            assert_abs_diff_eq!(c, 1., epsilon = 2e-3);
        }
    }

    #[test]
    fn regular_primaries_keep_derived_basis() {
        let profile = NclxProfile::new(
            ColorPrimaries::Bt709,
            TransferCharacteristics::Iec61966_2_1,
            MatrixCoefficients::Bt709,
            true,
        );
        let luma = profile.luma_coefficients().unwrap();
        assert_abs_diff_eq!(luma[0], 0.2126, epsilon = 1e-3);
        assert_abs_diff_eq!(luma[1], 0.7152, epsilon = 1e-3);
    }

    #[test]
    fn unspecified_profile_is_not_specified() {
        let profile = NclxProfile::new(
            ColorPrimaries::Bt2020,
            TransferCharacteristics::Unspecified,
            MatrixCoefficients::Bt2020Ncl,
            true,
        );
        assert!(!profile.is_specified());
        let profile = NclxProfile::new(
            ColorPrimaries::Bt2020,
            TransferCharacteristics::Pq,
            MatrixCoefficients::Bt2020Ncl,
            true,
        );
        assert!(profile.is_specified());
        assert_eq!(profile.primaries[0], Chromaticity::new(0.708, 0.292));
    }
}
