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
#![allow(clippy::excessive_precision)]

use crate::mlaf::mlaf;
use crate::nclx::TransferCharacteristics;

/// Amount of entries of a gamma table used to re-encode 8 bit content
pub(crate) const GAMMA_TABLE_U8_SIZE: usize = 8192;
/// Amount of entries of a gamma table used to re-encode high bit depth content
pub(crate) const GAMMA_TABLE_U16_SIZE: usize = 65536;

#[inline(always)]
/// Linear transfer function for sRGB
pub(crate) fn srgb_to_linear(gamma: f32) -> f32 {
    if gamma < 0f32 {
        0f32
    } else if gamma < 12.92f32 * 0.0030412825601275209f32 {
        gamma * (1f32 / 12.92f32)
    } else if gamma < 1.0f32 {
        ((gamma + 0.0550107189475866f32) / 1.0550107189475866f32).powf(2.4f32)
    } else {
        1.0f32
    }
}

#[inline(always)]
/// Gamma transfer function for sRGB
pub(crate) fn srgb_from_linear(linear: f32) -> f32 {
    if linear < 0.0f32 {
        0.0f32
    } else if linear < 0.0030412825601275209f32 {
        linear * 12.92f32
    } else if linear < 1.0f32 {
        mlaf(
            -0.0550107189475866f32,
            1.0550107189475866f32,
            linear.powf(1.0f32 / 2.4f32),
        )
    } else {
        1.0f32
    }
}

#[inline(always)]
/// Linear transfer function for Rec.709
pub(crate) fn rec709_to_linear(gamma: f32) -> f32 {
    if gamma < 0.0f32 {
        0.0f32
    } else if gamma < 4.5f32 * 0.018053968510807f32 {
        gamma * (1f32 / 4.5f32)
    } else if gamma < 1.0f32 {
        ((gamma + 0.09929682680944f32) / 1.09929682680944f32).powf(1.0f32 / 0.45f32)
    } else {
        1.0f32
    }
}

#[inline(always)]
/// Gamma transfer function for Rec.709
pub(crate) fn rec709_from_linear(linear: f32) -> f32 {
    if linear < 0.0f32 {
        0.0f32
    } else if linear < 0.018053968510807f32 {
        linear * 4.5f32
    } else if linear < 1.0f32 {
        1.09929682680944f32 * linear.powf(0.45f32) - 0.09929682680944f32
    } else {
        1.0f32
    }
}

#[inline(always)]
/// Linear transfer function for SMPTE 240M
pub(crate) fn smpte240_to_linear(gamma: f32) -> f32 {
    if gamma < 0.0 {
        0.0
    } else if gamma < 4.0 * 0.022821585529445 {
        gamma / 4.0
    } else if gamma < 1.0 {
        f32::powf((gamma + 0.111572195921731) / 1.111572195921731, 1.0 / 0.45)
    } else {
        1.0
    }
}

#[inline(always)]
/// Gamma transfer function for SMPTE 240M
pub(crate) fn smpte240_from_linear(linear: f32) -> f32 {
    if linear < 0.0 {
        0.0
    } else if linear < 0.022821585529445 {
        linear * 4.0
    } else if linear < 1.0 {
        1.111572195921731 * f32::powf(linear, 0.45) - 0.111572195921731
    } else {
        1.0
    }
}

#[inline(always)]
/// Linear transfer function for Smpte 428
pub(crate) fn smpte428_to_linear(gamma: f32) -> f32 {
    const SCALE: f32 = 1. / 0.91655527974030934f32;
    gamma.max(0.).powf(2.6f32) * SCALE
}

#[inline(always)]
/// Gamma transfer function for Smpte 428
pub(crate) fn smpte428_from_linear(linear: f32) -> f32 {
    const POWER_VALUE: f32 = 1.0f32 / 2.6f32;
    (0.91655527974030934f32 * linear.max(0.)).powf(POWER_VALUE)
}

#[inline(always)]
/// Linear transfer function for logarithmic 100:1 range
pub(crate) fn log100_to_linear(gamma: f32) -> f32 {
    if gamma <= 0.0 {
        0.0
    } else {
        // 10 ^ (2 * (v - 1))
        f32::powf(10.0, 2.0 * (gamma.min(1.0) - 1.0))
    }
}

#[inline(always)]
/// Gamma transfer function for logarithmic 100:1 range
pub(crate) fn log100_from_linear(linear: f32) -> f32 {
    if linear <= 0.01 {
        0.0
    } else {
        1.0 + linear.min(1.0).log10() / 2.0
    }
}

#[inline(always)]
/// Linear transfer function for logarithmic 100*sqrt(10):1 range
pub(crate) fn log100_sqrt10_to_linear(gamma: f32) -> f32 {
    if gamma <= 0.0 {
        0.0
    } else {
        f32::powf(10.0, 2.5 * (gamma.min(1.0) - 1.0))
    }
}

#[inline(always)]
/// Gamma transfer function for logarithmic 100*sqrt(10):1 range
pub(crate) fn log100_sqrt10_from_linear(linear: f32) -> f32 {
    const MIN_LINEAR: f32 = 0.00316227766016838;
    if linear <= MIN_LINEAR {
        0.0
    } else {
        1.0 + linear.min(1.0).log10() / 2.5
    }
}

#[inline(always)]
/// Linear transfer function for IEC 61966-2-4, symmetric extension of Rec.709
pub(crate) fn iec61966_to_linear(gamma: f32) -> f32 {
    if gamma < -4.5 * 0.018053968510807 {
        -f32::powf((-gamma + 0.09929682680944) / 1.09929682680944, 1.0 / 0.45)
    } else if gamma < 4.5 * 0.018053968510807 {
        gamma / 4.5
    } else {
        f32::powf((gamma + 0.09929682680944) / 1.09929682680944, 1.0 / 0.45)
    }
}

#[inline(always)]
/// Gamma transfer function for IEC 61966-2-4, symmetric extension of Rec.709
pub(crate) fn iec61966_from_linear(linear: f32) -> f32 {
    if linear < -0.018053968510807 {
        -1.09929682680944 * f32::powf(-linear, 0.45) + 0.09929682680944
    } else if linear < 0.018053968510807 {
        linear * 4.5
    } else {
        1.09929682680944 * f32::powf(linear, 0.45) - 0.09929682680944
    }
}

#[inline(always)]
/// Gamma transfer function for Bt.1361
pub(crate) fn bt1361_from_linear(linear: f32) -> f32 {
    if linear < -0.25 {
        -0.25
    } else if linear < 0.0 {
        -0.27482420670236 * f32::powf(-4.0 * linear, 0.45) + 0.02482420670236
    } else if linear < 0.018053968510807 {
        linear * 4.5
    } else if linear < 1.0 {
        1.09929682680944 * f32::powf(linear, 0.45) - 0.09929682680944
    } else {
        1.0
    }
}

#[inline(always)]
/// Linear transfer function for Bt.1361
pub(crate) fn bt1361_to_linear(gamma: f32) -> f32 {
    if gamma < -0.25 {
        -0.25
    } else if gamma < 0.0 {
        f32::powf((gamma - 0.02482420670236) / -0.27482420670236, 1.0 / 0.45) / -4.0
    } else if gamma < 4.5 * 0.018053968510807 {
        gamma / 4.5
    } else if gamma < 1.0 {
        f32::powf((gamma + 0.09929682680944) / 1.09929682680944, 1.0 / 0.45)
    } else {
        1.0
    }
}

#[inline(always)]
pub(crate) fn pure_gamma_function(x: f32, gamma: f32) -> f32 {
    if x <= 0. {
        0.
    } else if x >= 1. {
        1.
    } else {
        x.powf(gamma)
    }
}

#[inline(always)]
/// Pure gamma transfer function for gamma 2.2
pub(crate) fn gamma2p2_from_linear(linear: f32) -> f32 {
    pure_gamma_function(linear, 1f32 / 2.2f32)
}

#[inline(always)]
/// Linear transfer function for gamma 2.2
pub(crate) fn gamma2p2_to_linear(gamma: f32) -> f32 {
    pure_gamma_function(gamma, 2.2f32)
}

#[inline(always)]
/// Pure gamma transfer function for gamma 2.8
pub(crate) fn gamma2p8_from_linear(linear: f32) -> f32 {
    pure_gamma_function(linear, 1f32 / 2.8f32)
}

#[inline(always)]
/// Linear transfer function for gamma 2.8
pub(crate) fn gamma2p8_to_linear(gamma: f32) -> f32 {
    pure_gamma_function(gamma, 2.8f32)
}

pub(crate) const PQ_MAX_NITS: f32 = 10000.;
pub(crate) const SDR_REFERENCE_DISPLAY: f32 = 203.;
pub(crate) const HLG_WHITE_NITS: f32 = 1000.;

#[inline(always)]
/// Linear transfer function for PQ, SDR reference white is 1.0
pub(crate) fn pq_to_linear(gamma: f32) -> f32 {
    if gamma > 0.0 {
        let pow_gamma = f32::powf(gamma.min(1.), 1.0 / 78.84375);
        let num = (pow_gamma - 0.8359375).max(0.);
        let den = (18.8515625 - 18.6875 * pow_gamma).max(f32::MIN_POSITIVE);
        let linear = f32::powf(num / den, 1.0 / 0.1593017578125);
        linear * PQ_MAX_NITS / SDR_REFERENCE_DISPLAY
    } else {
        0.0
    }
}

#[inline(always)]
/// Gamma transfer function for PQ
pub(crate) fn pq_from_linear(linear: f32) -> f32 {
    if linear > 0.0 {
        let linear = (linear * SDR_REFERENCE_DISPLAY / PQ_MAX_NITS).clamp(0., 1.);
        let pow_linear = f32::powf(linear, 0.1593017578125);
        let num = 0.1640625 * pow_linear - 0.1640625;
        let den = 1.0 + 18.6875 * pow_linear;
        f32::powf(1.0 + num / den, 78.84375)
    } else {
        0.0
    }
}

#[inline(always)]
/// Linear transfer function for HLG, SDR reference white is 1.0
pub(crate) fn hlg_to_linear(gamma: f32) -> f32 {
    if gamma < 0.0 {
        return 0.0;
    }
    let gamma = gamma.min(1.0);
    let linear = if gamma <= 0.5 {
        f32::powf((gamma * gamma) * (1.0 / 3.0), 1.2)
    } else {
        f32::powf(
            (f32::exp((gamma - 0.55991073) / 0.17883277) + 0.28466892) / 12.0,
            1.2,
        )
    };
    linear * HLG_WHITE_NITS / SDR_REFERENCE_DISPLAY
}

#[inline(always)]
/// Gamma transfer function for HLG
pub(crate) fn hlg_from_linear(linear: f32) -> f32 {
    let mut linear = (linear * (SDR_REFERENCE_DISPLAY / HLG_WHITE_NITS)).clamp(0., 1.);
    // Inverse OOTF followed by OETF see Table 5 and Note 5i in ITU-R BT.2100-2 page 7-8.
    linear = f32::powf(linear, 1.0 / 1.2);
    if linear <= (1.0 / 12.0) {
        f32::sqrt(3.0 * linear)
    } else {
        0.17883277 * f32::ln(12.0 * linear - 0.28466892) + 0.55991073
    }
}

#[inline(always)]
pub(crate) fn trc_linear(v: f32) -> f32 {
    v.min(1.).max(0.)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Declares transfer function for transfer components into a linear colorspace and its inverse
pub enum TransferFunction {
    /// sRGB Transfer function, IEC 61966-2-1
    Srgb,
    /// Linear transfer function
    Linear,
    /// Pure gamma 2.2 Transfer function, ITU-R 470M
    Gamma2p2,
    /// Pure gamma 2.8 Transfer function, ITU-R 470BG
    Gamma2p8,
    /// Hybrid Log-Gamma, ITU-R BT.2100
    Hlg,
    /// Perceptual quantizer, SMPTE ST 2084
    Pq,
    Smpte240,
    Smpte428,
    /// Logarithmic, 100:1 range
    Log100,
    /// Logarithmic, 100 * sqrt(10):1 range
    Log100Sqrt10,
    /// xvYCC, IEC 61966-2-4
    Iec61966,
    Bt1361,
    /// Rec.601, Rec.709 and Rec.2020 share this curve
    Itur709,
}

impl TransferFunction {
    /// Resolves transfer function for NCLX transfer characteristics.
    ///
    /// Unspecified and unknown characteristics resolve to sRGB.
    pub fn from_nclx(trc: TransferCharacteristics) -> TransferFunction {
        match trc {
            TransferCharacteristics::Iec61966_2_1 | TransferCharacteristics::Unspecified => {
                TransferFunction::Srgb
            }
            TransferCharacteristics::Linear => TransferFunction::Linear,
            TransferCharacteristics::Bt470M => TransferFunction::Gamma2p2,
            TransferCharacteristics::Bt470Bg => TransferFunction::Gamma2p8,
            TransferCharacteristics::Bt601
            | TransferCharacteristics::Bt709
            | TransferCharacteristics::Bt2020_10bit
            | TransferCharacteristics::Bt2020_12bit => TransferFunction::Itur709,
            TransferCharacteristics::Smpte240 => TransferFunction::Smpte240,
            TransferCharacteristics::Log100 => TransferFunction::Log100,
            TransferCharacteristics::Log100Sqrt10 => TransferFunction::Log100Sqrt10,
            TransferCharacteristics::Iec61966_2_4 => TransferFunction::Iec61966,
            TransferCharacteristics::Bt1361 => TransferFunction::Bt1361,
            TransferCharacteristics::Smpte428 => TransferFunction::Smpte428,
            TransferCharacteristics::Hlg => TransferFunction::Hlg,
            TransferCharacteristics::Pq => TransferFunction::Pq,
            TransferCharacteristics::Reserved(_) => TransferFunction::Srgb,
        }
    }

    /// Whether this curve carries HDR content that needs highlight compression
    #[inline]
    pub fn is_hdr(&self) -> bool {
        matches!(self, TransferFunction::Hlg | TransferFunction::Pq)
    }

    #[inline(always)]
    pub fn linearize(&self, v: f32) -> f32 {
        match self {
            TransferFunction::Srgb => srgb_to_linear(v),
            TransferFunction::Linear => trc_linear(v),
            TransferFunction::Gamma2p2 => gamma2p2_to_linear(v),
            TransferFunction::Gamma2p8 => gamma2p8_to_linear(v),
            TransferFunction::Hlg => hlg_to_linear(v),
            TransferFunction::Pq => pq_to_linear(v),
            TransferFunction::Smpte240 => smpte240_to_linear(v),
            TransferFunction::Smpte428 => smpte428_to_linear(v),
            TransferFunction::Log100 => log100_to_linear(v),
            TransferFunction::Log100Sqrt10 => log100_sqrt10_to_linear(v),
            TransferFunction::Iec61966 => iec61966_to_linear(v),
            TransferFunction::Bt1361 => bt1361_to_linear(v),
            TransferFunction::Itur709 => rec709_to_linear(v),
        }
    }

    #[inline(always)]
    pub fn gamma(&self, v: f32) -> f32 {
        match self {
            TransferFunction::Srgb => srgb_from_linear(v),
            TransferFunction::Linear => trc_linear(v),
            TransferFunction::Gamma2p2 => gamma2p2_from_linear(v),
            TransferFunction::Gamma2p8 => gamma2p8_from_linear(v),
            TransferFunction::Hlg => hlg_from_linear(v),
            TransferFunction::Pq => pq_from_linear(v),
            TransferFunction::Smpte240 => smpte240_from_linear(v),
            TransferFunction::Smpte428 => smpte428_from_linear(v),
            TransferFunction::Log100 => log100_from_linear(v),
            TransferFunction::Log100Sqrt10 => log100_sqrt10_from_linear(v),
            TransferFunction::Iec61966 => iec61966_from_linear(v),
            TransferFunction::Bt1361 => bt1361_from_linear(v),
            TransferFunction::Itur709 => rec709_from_linear(v),
        }
    }

    pub(crate) fn generate_gamma_table_u8(&self) -> Box<[u8; GAMMA_TABLE_U8_SIZE]> {
        let mut table = Box::new([0; GAMMA_TABLE_U8_SIZE]);
        let scale = 1f32 / (GAMMA_TABLE_U8_SIZE - 1) as f32;
        for (i, value) in table.iter_mut().enumerate() {
            *value = (self.gamma(i as f32 * scale) * 255.).round().min(255.).max(0.) as u8;
        }
        table
    }

    pub(crate) fn generate_gamma_table_u16(
        &self,
        bit_depth: usize,
    ) -> Box<[u16; GAMMA_TABLE_U16_SIZE]> {
        let mut table = Box::new([0; GAMMA_TABLE_U16_SIZE]);
        let max_colors: f32 = ((1u32 << bit_depth as u32) - 1) as f32;
        let scale = 1f32 / (GAMMA_TABLE_U16_SIZE - 1) as f32;
        for (i, value) in table.iter_mut().enumerate() {
            *value = (self.gamma(i as f32 * scale) * max_colors)
                .round()
                .min(max_colors)
                .max(0.) as u16;
        }
        table
    }

    pub(crate) fn generate_linear_table_u16(&self, bit_depth: usize) -> Box<[f32; 65536]> {
        let mut table = Box::new([0.; 65536]);
        let max_bp = (1usize << bit_depth as u32) - 1;
        let max_scale = 1f32 / max_bp as f32;
        for (i, value) in table.iter_mut().take(max_bp + 1).enumerate() {
            *value = self.linearize(i as f32 * max_scale);
        }
        // Values above the declared depth are treated as full scale
        let top = table[max_bp];
        for value in table.iter_mut().skip(max_bp + 1) {
            *value = top;
        }
        table
    }

    pub(crate) fn generate_linear_table_u8(&self) -> Box<[f32; 256]> {
        let mut table = Box::new([0.; 256]);
        for (i, value) in table.iter_mut().enumerate() {
            *value = self.linearize(i as f32 / 255.);
        }
        table
    }
}
