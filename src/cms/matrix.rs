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
use crate::mlaf::mlaf;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector3f {
    pub v: [f32; 3],
}

/// Row-major 3x3 matrix
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Matrix3f {
    pub v: [[f32; 3]; 3],
}

impl Matrix3f {
    pub const IDENTITY: Matrix3f = Matrix3f {
        v: [[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]],
    };

    #[inline]
    pub fn determinant(&self) -> f32 {
        let v = self.v;
        let a0 = v[0][0] * (v[1][1] * v[2][2] - v[1][2] * v[2][1]);
        let a1 = v[0][1] * (v[1][0] * v[2][2] - v[1][2] * v[2][0]);
        let a2 = v[0][2] * (v[1][0] * v[2][1] - v[1][1] * v[2][0]);
        a0 - a1 + a2
    }

    /// Inverts the matrix, `None` when it is singular or not finite
    pub fn inverse(&self) -> Option<Matrix3f> {
        let det = self.determinant();
        if det == 0. || !det.is_finite() {
            return None;
        }
        let v = self.v;
        let inv_det = 1. / det;
        let inverted = Matrix3f {
            v: [
                [
                    (v[1][1] * v[2][2] - v[1][2] * v[2][1]) * inv_det,
                    (v[0][2] * v[2][1] - v[0][1] * v[2][2]) * inv_det,
                    (v[0][1] * v[1][2] - v[0][2] * v[1][1]) * inv_det,
                ],
                [
                    (v[1][2] * v[2][0] - v[1][0] * v[2][2]) * inv_det,
                    (v[0][0] * v[2][2] - v[0][2] * v[2][0]) * inv_det,
                    (v[0][2] * v[1][0] - v[0][0] * v[1][2]) * inv_det,
                ],
                [
                    (v[1][0] * v[2][1] - v[1][1] * v[2][0]) * inv_det,
                    (v[0][1] * v[2][0] - v[0][0] * v[2][1]) * inv_det,
                    (v[0][0] * v[1][1] - v[0][1] * v[1][0]) * inv_det,
                ],
            ],
        };
        if inverted.v.iter().flatten().all(|x| x.is_finite()) {
            Some(inverted)
        } else {
            None
        }
    }

    #[inline]
    pub fn mul_vector(&self, other: Vector3f) -> Vector3f {
        let m = self.v;
        let o = other.v;
        Vector3f {
            v: [
                mlaf(mlaf(m[0][0] * o[0], m[0][1], o[1]), m[0][2], o[2]),
                mlaf(mlaf(m[1][0] * o[0], m[1][1], o[1]), m[1][2], o[2]),
                mlaf(mlaf(m[2][0] * o[0], m[2][1], o[1]), m[2][2], o[2]),
            ],
        }
    }

    /// Multiplies row `R` element-wise by a vector
    #[inline]
    pub fn mul_row_vector<const R: usize>(&self, other: Vector3f) -> Matrix3f {
        let mut z = *self;
        z.v[R][0] *= other.v[0];
        z.v[R][1] *= other.v[1];
        z.v[R][2] *= other.v[2];
        z
    }

    pub fn mat_mul(&self, other: Matrix3f) -> Matrix3f {
        let mut result = Matrix3f::default();
        for i in 0..3 {
            for j in 0..3 {
                result.v[i][j] = mlaf(
                    mlaf(self.v[i][0] * other.v[0][j], self.v[i][1], other.v[1][j]),
                    self.v[i][2],
                    other.v[2][j],
                );
            }
        }
        result
    }

    /// Element-wise comparison within `tolerance`
    pub fn test_equality(&self, other: Matrix3f, tolerance: f32) -> bool {
        self.v
            .iter()
            .flatten()
            .zip(other.v.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_of_singular_matrix_fails() {
        let singular = Matrix3f {
            v: [[1., 2., 3.], [2., 4., 6.], [0., 1., 0.]],
        };
        assert!(singular.inverse().is_none());
    }

    #[test]
    fn inverse_round_trips() {
        let m = Matrix3f {
            v: [[0.4124, 0.3576, 0.1805], [0.2126, 0.7152, 0.0722], [0.0193, 0.1192, 0.9505]],
        };
        let inv = m.inverse().unwrap();
        assert!(m.mat_mul(inv).test_equality(Matrix3f::IDENTITY, 1e-5));
    }
}
