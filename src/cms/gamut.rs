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
use crate::cms::matrix::{Matrix3f, Vector3f};
use crate::err::CoderError;

#[derive(Clone, Debug, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromaticity {
    pub x: f32,
    pub y: f32,
}

impl Chromaticity {
    pub const fn new(x: f32, y: f32) -> Chromaticity {
        Chromaticity { x, y }
    }

    pub const D65: Chromaticity = Chromaticity {
        x: 0.3127,
        y: 0.3290,
    };
}

pub const SRGB_PRIMARIES: [Chromaticity; 3] = [
    Chromaticity {
        x: 0.640f32,
        y: 0.330f32,
    },
    Chromaticity {
        x: 0.300f32,
        y: 0.600f32,
    },
    Chromaticity {
        x: 0.150f32,
        y: 0.060f32,
    },
];

#[inline]
fn xy_to_xyz(xy: Chromaticity) -> Option<Vector3f> {
    if xy.y == 0. {
        return None;
    }
    Some(Vector3f {
        v: [xy.x / xy.y, 1f32, (1f32 - xy.x - xy.y) / xy.y],
    })
}

#[inline]
fn get_primaries_xyz(primaries_xy: [Chromaticity; 3]) -> Option<Matrix3f> {
    let r = xy_to_xyz(primaries_xy[0])?;
    let g = xy_to_xyz(primaries_xy[1])?;
    let b = xy_to_xyz(primaries_xy[2])?;
    Some(Matrix3f {
        v: [
            [r.v[0], g.v[0], b.v[0]],
            [r.v[1], g.v[1], b.v[1]],
            [r.v[2], g.v[2], b.v[2]],
        ],
    })
}

/// Builds RGB -> XYZ matrix for given primaries where white point has unit luminance
pub fn gamut_to_xyz(
    primaries_xy: [Chromaticity; 3],
    white_point: Chromaticity,
) -> Option<Matrix3f> {
    let xyz_matrix = get_primaries_xyz(primaries_xy)?;
    let wp = xy_to_xyz(white_point)?;
    let inverted_xyz = xyz_matrix.inverse()?;
    let s = inverted_xyz.mul_vector(wp);
    let mut v = xyz_matrix.mul_row_vector::<0>(s);
    v = v.mul_row_vector::<1>(s);
    v = v.mul_row_vector::<2>(s);
    Some(v)
}

/// Matrix converting linear RGB in the given gamut into linear sRGB with D65 white point.
///
/// Applied as `dst = M * src`.
pub fn gamut_conversion_matrix(
    primaries_xy: [Chromaticity; 3],
    white_point: Chromaticity,
) -> Result<Matrix3f, CoderError> {
    let source = gamut_to_xyz(primaries_xy, white_point).ok_or(CoderError::InvalidGamut)?;
    xyz_basis_to_srgb(source)
}

/// Matrix converting linear RGB of the given RGB -> XYZ basis into linear sRGB/D65
pub fn xyz_basis_to_srgb(rgb_to_xyz: Matrix3f) -> Result<Matrix3f, CoderError> {
    let destination = gamut_to_xyz(SRGB_PRIMARIES, Chromaticity::D65)
        .and_then(|x| x.inverse())
        .ok_or(CoderError::InvalidGamut)?;
    Ok(destination.mat_mul(rgb_to_xyz))
}

/// Luma weights of the gamut, the Y row of its RGB -> XYZ matrix
pub fn luma_coefficients(
    primaries_xy: [Chromaticity; 3],
    white_point: Chromaticity,
) -> Result<[f32; 3], CoderError> {
    let xyz = gamut_to_xyz(primaries_xy, white_point).ok_or(CoderError::InvalidGamut)?;
    Ok(xyz.v[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn srgb_to_srgb_is_identity() {
        let m = gamut_conversion_matrix(SRGB_PRIMARIES, Chromaticity::D65).unwrap();
        for (row, expected) in m.v.iter().zip(Matrix3f::IDENTITY.v.iter()) {
            for (a, b) in row.iter().zip(expected.iter()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn srgb_luma_matches_rec709_weights() {
        let luma = luma_coefficients(SRGB_PRIMARIES, Chromaticity::D65).unwrap();
        assert_abs_diff_eq!(luma[0], 0.2126, epsilon = 1e-3);
        assert_abs_diff_eq!(luma[1], 0.7152, epsilon = 1e-3);
        assert_abs_diff_eq!(luma[2], 0.0722, epsilon = 1e-3);
        assert_abs_diff_eq!(luma.iter().sum::<f32>(), 1., epsilon = 1e-5);
    }

    #[test]
    fn bt2020_white_stays_white() {
        let bt2020 = [
            Chromaticity::new(0.708, 0.292),
            Chromaticity::new(0.170, 0.797),
            Chromaticity::new(0.131, 0.046),
        ];
        let m = gamut_conversion_matrix(bt2020, Chromaticity::D65).unwrap();
        let white = m.mul_vector(Vector3f { v: [1., 1., 1.] });
        for c in white.v {
            assert_abs_diff_eq!(c, 1., epsilon = 1e-4);
        }
        // Pure BT.2020 red is outside of sRGB
        let red = m.mul_vector(Vector3f { v: [1., 0., 0.] });
        assert!(red.v[0] > 1.);
        assert!(red.v[1] < 0.);
    }

    #[test]
    fn degenerate_primaries_are_rejected() {
        let xyz = [
            Chromaticity::new(1.0, 0.0),
            Chromaticity::new(0.0, 1.0),
            Chromaticity::new(0.0, 0.0),
        ];
        assert_eq!(
            gamut_conversion_matrix(xyz, Chromaticity::new(1. / 3., 1. / 3.)),
            Err(CoderError::InvalidGamut)
        );
    }
}
