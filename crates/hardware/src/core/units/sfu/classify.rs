//! Special-range classification.
//!
//! Every operation first sorts its input into either a special class with
//! a fixed result or the evaluated range. Thresholds are compared on the
//! exact binary32 value.

use super::SfuOp;
use crate::core::units::fpu::exception_flags::FpFlags;

pub(super) const POS_ZERO: u32 = 0x0000_0000;
pub(super) const NEG_ZERO: u32 = 0x8000_0000;
pub(super) const POS_INF: u32 = 0x7f80_0000;
pub(super) const NEG_INF: u32 = 0xff80_0000;
pub(super) const CANONICAL_NAN: u32 = 0x7fc0_0000;
pub(super) const NEG_LARGEST: u32 = 0xff7f_ffff;
pub(super) const ONE: u32 = 0x3f80_0000;
pub(super) const NEG_ONE: u32 = 0xbf80_0000;
pub(super) const HALF: u32 = 0x3f00_0000;

/// Outcome of classifying one input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Class {
    /// Fixed result; the polynomial is not evaluated.
    Special {
        /// Result bits.
        result: u32,
        /// Exception flags raised by the class.
        flags: FpFlags,
    },
    /// Evaluate the polynomial.
    Evaluate {
        /// log2 of the factor the argument is pre-scaled by before lookup.
        /// Only reciprocals of near-denormal inputs use a nonzero value.
        prescale: u32,
    },
}

const fn special(result: u32) -> Class {
    Class::Special { result, flags: FpFlags::NONE }
}

const fn raise(result: u32, flags: FpFlags) -> Class {
    Class::Special { result, flags }
}

const EVALUATE: Class = Class::Evaluate { prescale: 0 };

/// `2^e` as an `f64`, for threshold comparisons.
#[inline]
fn p2(e: i32) -> f64 {
    2f64.powi(e)
}

/// Classifies `bits` for `op`.
pub fn classify(op: SfuOp, bits: u32) -> Class {
    let exp = (bits >> 23) & 0xff;
    let mant = bits & 0x7f_ffff;
    if exp == 0xff && mant != 0 {
        let signaling = mant < (1 << 22);
        return if signaling { raise(CANONICAL_NAN, FpFlags::NV) } else { special(CANONICAL_NAN) };
    }

    let a = f64::from(f32::from_bits(bits));
    match op {
        SfuOp::Exp2 => {
            if bits == NEG_INF || a < -149.0 {
                special(POS_ZERO)
            } else if exp == 0 && mant != 0 {
                special(ONE)
            } else if a <= -p2(-23) {
                // Below -126 the result is denormal; the final conversion
                // produces it.
                EVALUATE
            } else if a < p2(-23) {
                special(ONE)
            } else if a < 128.0 {
                EVALUATE
            } else if bits == POS_INF {
                special(POS_INF)
            } else {
                raise(POS_INF, FpFlags::OF)
            }
        }
        SfuOp::Rcp => {
            if bits == NEG_INF {
                special(NEG_ZERO)
            } else if a <= -p2(-126) {
                EVALUATE
            } else if a < -p2(-128) {
                Class::Evaluate { prescale: 2 }
            } else if a < 0.0 {
                raise(NEG_LARGEST, FpFlags::OF)
            } else if bits == NEG_ZERO {
                raise(NEG_INF, FpFlags::DZ)
            } else if bits == POS_ZERO {
                raise(POS_INF, FpFlags::DZ)
            } else if a <= p2(-128) {
                raise(POS_INF, FpFlags::OF)
            } else if a < p2(-126) {
                Class::Evaluate { prescale: 2 }
            } else if bits == POS_INF {
                special(POS_ZERO)
            } else {
                EVALUATE
            }
        }
        SfuOp::Tanh => {
            if a <= -8.0 {
                special(NEG_ONE)
            } else if a <= -p2(-10) {
                EVALUATE
            } else if a < p2(-10) {
                special(bits)
            } else if a < 8.0 {
                EVALUATE
            } else {
                special(ONE)
            }
        }
        SfuOp::Sigmoid => {
            if bits == NEG_INF || f64::from(sigmoid_exp2_arg(bits)) < -149.0 {
                special(POS_ZERO)
            } else if a <= -p2(-9) {
                EVALUATE
            } else if a < p2(-9) {
                if bits == POS_ZERO || bits == NEG_ZERO { special(HALF) } else { special(sigmoid_midpoint(bits)) }
            } else if a < 16.0 {
                EVALUATE
            } else {
                special(ONE)
            }
        }
    }
}

/// `1.4375 * a` rounded up to binary32: the exponent `sigmoid` hands to
/// `exp2` for large negative inputs (`1.4375 ~ log2(e)`).
pub fn sigmoid_exp2_arg(bits: u32) -> f32 {
    let a = f64::from(f32::from_bits(bits));
    if a.is_finite() {
        f32::from_bits(super::reconstruct::round_to_f32(a * 23.0 / 16.0, true))
    } else {
        (a * 23.0 / 16.0) as f32
    }
}

/// Sigmoid of a tiny input straight from the mantissa.
///
/// Near zero `sigmoid(a) ~ 1/2 + a/4`; the hardware forms that sum by
/// shifting the significand into place.
pub fn sigmoid_midpoint(bits: u32) -> u32 {
    let exp = (bits >> 23) & 0xff;
    let significand = (bits & 0x7f_ffff) + (1 << 23);
    let negative = bits & NEG_ZERO != 0;
    let numerator = match (exp > 96, negative) {
        (true, false) => (significand >> (128 - exp)) + (1 << 23),
        (true, true) => (1 << 24) - 1 - (significand >> (127 - exp)),
        (false, false) => 1 << 23,
        (false, true) => (1 << 24) - 1,
    };
    let denominator: f32 = if negative { 33_554_432.0 } else { 16_777_216.0 };
    (numerator as f32 / denominator).to_bits()
}
