//! Segment lookup, polynomial evaluation and result reconstruction.

use rustc_apfloat::ieee::{Double, Single};
use rustc_apfloat::{Float, FloatConvert, Round};

use super::SfuOp;
use super::booth::{booth_c1, booth_c2};
use super::lut;
use super::reduce::split_exp2;

/// Binary point of the fixed-point accumulator.
pub const FRACTION_BITS: i32 = 40;

/// Rounds `value` to binary32 toward +inf (`up`) or -inf.
pub fn round_to_f32(value: f64, up: bool) -> u32 {
    let round = if up { Round::TowardPositive } else { Round::TowardNegative };
    let mut loses_info = false;
    let wide = Double::from_bits(u128::from(value.to_bits()));
    let narrow = FloatConvert::<Single>::convert_r(wide, round, &mut loses_info).value;
    narrow.to_bits() as u32
}

/// One table segment ready for evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// `[c0, c1, c2]` of the selected row.
    pub coeffs: [i64; 3],
    /// Offset into the segment, left aligned to 20 bits.
    pub u: u64,
    /// Extra alignment applied to `u` for wide segments.
    pub slide: u32,
    /// Exponent of the argument for tables spanning one octave of `x`.
    pub x_exp: i32,
    /// Exponent carried past the table (exp2 integer part, rcp scale).
    pub src_exp: i32,
    /// Binary weights of `c1` and `c2`.
    pub weights: (i32, i32),
    /// The result magnitude comes from a negative argument.
    pub negative: bool,
}

#[inline]
const fn biased_exp(bits: u32) -> i32 {
    ((bits >> 23) & 0xff) as i32
}

/// Selects the segment for a reduced `(op, arg)` pair.
pub fn select(op: SfuOp, arg: f32) -> Segment {
    let (src, src_exp) = match op {
        SfuOp::Exp2 => split_exp2(arg),
        SfuOp::Rcp => (arg.to_bits(), 127 - biased_exp(arg.to_bits())),
        SfuOp::Tanh | SfuOp::Sigmoid => (arg.to_bits(), 0),
    };
    let b3 = u64::from((src >> 16) & 0xff);
    let low16 = u64::from(src & 0xffff);
    let x_exp = biased_exp(src) - 127;
    // exp2 tables see only the positive mantissa.
    let negative = op != SfuOp::Exp2 && arg < 0.0;

    let (row, u, slide, x_exp, weights) = match op {
        SfuOp::Exp2 => {
            let idx = ((b3 >> 2) & 0x1f) as usize;
            (lut::EXP2[idx], (low16 + ((b3 & 3) << 16)) << 2, 2, 0, (-5, -10))
        }
        SfuOp::Rcp => (lut::RCP[(b3 & 0x7f) as usize], low16 << 4, 4, 0, (-7, -14)),
        SfuOp::Tanh => {
            let idx = ((b3 >> 4) & 7) as usize;
            let table = (-2 - x_exp).clamp(0, 8) as usize;
            (lut::TANH[table][idx], low16 + ((b3 & 0xf) << 16), 0, x_exp, (x_exp - 3, 2 * x_exp - 6))
        }
        SfuOp::Sigmoid => match x_exp {
            0 => {
                let idx = ((b3 >> 4) & 7) as usize;
                (lut::SIGMOID_1_2[idx], low16 + ((b3 & 0xf) << 16), 0, x_exp, (-3, -6))
            }
            1 | 2 => {
                let idx = ((b3 >> 3) & 0xf) as usize;
                let u = (low16 + ((b3 & 7) << 16)) << 1;
                if x_exp == 1 {
                    (lut::SIGMOID_2_4[idx], u, 1, x_exp, (-3, -6))
                } else {
                    (lut::SIGMOID_4_8[idx], u, 1, x_exp, (-2, -4))
                }
            }
            _ => {
                let idx = ((b3 >> 2) & 0x1f) as usize;
                (lut::SIGMOID_8_16[idx], (low16 + ((b3 & 3) << 16)) << 2, 2, x_exp, (-2, -4))
            }
        },
    };

    Segment { coeffs: row, u, slide, x_exp, src_exp, weights, negative }
}

/// Evaluates `c0 + c1·u + c2·u²` in fixed point with `FRACTION_BITS`
/// fraction bits.
pub fn polynomial(seg: &Segment) -> i64 {
    let [y0, y1, y2] = seg.coeffs;
    let (w1, w2) = seg.weights;
    let c0 = y0 << 11;
    let c1 = booth_c1(y1, seg.u, w1) >> (3 - seg.x_exp);
    let c2 = booth_c2(y2, seg.u, w2) >> (14 - 2 * seg.x_exp);
    c0 + (c1 >> seg.slide) + (c2 >> (2 * seg.slide))
}

/// Converts the accumulator to binary32.
///
/// The value is `acc · 2^-(FRACTION_BITS - src_exp)`, negated when
/// `negate` is set, and rounded toward +inf.
pub fn to_single(acc: i64, src_exp: i32, negate: bool) -> u32 {
    let magnitude = Double::from_i128(i128::from(acc)).value.scalbn(src_exp - FRACTION_BITS);
    let value = if negate { -magnitude } else { magnitude };
    let mut loses_info = false;
    let narrow = FloatConvert::<Single>::convert_r(value, Round::TowardPositive, &mut loses_info).value;
    narrow.to_bits() as u32
}
