//! Format-generic soft-float primitives.
//!
//! Every function takes raw element bits plus a [`FloatFormat`] and returns
//! the raw result together with the soft-float status. NaN results are
//! canonicalized here so that callers never see a payload.

use rustc_apfloat::ieee::{BFloat, Double, Half, Single};
use rustc_apfloat::{Float, FloatConvert, Round, Status, StatusAnd};

use super::FloatFormat;
use super::nan_handling::{canonical_nan, canonicalize, is_nan, is_signaling_nan};

/// Binds `$F` to the soft-float type of `$fmt` and evaluates `$body`.
macro_rules! with_format {
    ($fmt:expr, $F:ident => $body:expr) => {
        match $fmt {
            FloatFormat::Half => {
                type $F = Half;
                $body
            }
            FloatFormat::BFloat16 => {
                type $F = BFloat;
                $body
            }
            FloatFormat::Single => {
                type $F = Single;
                $body
            }
            FloatFormat::Double => {
                type $F = Double;
                $body
            }
        }
    };
}

/// Two-operand arithmetic primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arith {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
}

/// Ordered comparison primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compare {
    /// Quiet equality: only signaling NaNs raise NV.
    Eq,
    /// Signaling less-than: any NaN raises NV.
    Lt,
    /// Signaling less-or-equal: any NaN raises NV.
    Le,
}

#[inline]
fn lift<F: Float>(bits: u64) -> F {
    F::from_bits(u128::from(bits))
}

#[inline]
fn settle<F: Float>(fmt: FloatFormat, r: StatusAnd<F>) -> StatusAnd<u64> {
    let StatusAnd { status, value } = r;
    status.and(canonicalize(fmt, value.to_bits() as u64))
}

fn nan_status(fmt: FloatFormat, a: u64, b: u64) -> Status {
    if is_signaling_nan(fmt, a) || is_signaling_nan(fmt, b) {
        Status::INVALID_OP
    } else {
        Status::OK
    }
}

/// Computes `a op b` rounded with `round`.
pub fn arith(fmt: FloatFormat, op: Arith, a: u64, b: u64, round: Round) -> StatusAnd<u64> {
    with_format!(fmt, F => {
        let (x, y) = (lift::<F>(a), lift::<F>(b));
        let r = match op {
            Arith::Add => x.add_r(y, round),
            Arith::Sub => x.sub_r(y, round),
            Arith::Mul => x.mul_r(y, round),
            Arith::Div => x.div_r(y, round),
        };
        settle(fmt, r)
    })
}

/// Computes `a * b + c` with a single rounding.
pub fn mul_add(fmt: FloatFormat, a: u64, b: u64, c: u64, round: Round) -> StatusAnd<u64> {
    with_format!(fmt, F => {
        let r = lift::<F>(a).mul_add_r(lift::<F>(b), lift::<F>(c), round);
        settle(fmt, r)
    })
}

/// IEEE 754-2019 `minimumNumber` as RISC-V `fmin` defines it.
///
/// A single NaN operand yields the other operand, two NaNs yield the
/// canonical NaN, `-0` orders below `+0`, and signaling NaNs raise NV.
pub fn min(fmt: FloatFormat, a: u64, b: u64) -> StatusAnd<u64> {
    min_max(fmt, a, b, false)
}

/// IEEE 754-2019 `maximumNumber` as RISC-V `fmax` defines it.
pub fn max(fmt: FloatFormat, a: u64, b: u64) -> StatusAnd<u64> {
    min_max(fmt, a, b, true)
}

fn min_max(fmt: FloatFormat, a: u64, b: u64, want_max: bool) -> StatusAnd<u64> {
    let status = nan_status(fmt, a, b);
    let value = match (is_nan(fmt, a), is_nan(fmt, b)) {
        (true, true) => canonical_nan(fmt),
        (true, false) => b,
        (false, true) => a,
        (false, false) => with_format!(fmt, F => {
            let (x, y) = (lift::<F>(a), lift::<F>(b));
            let r = if want_max { x.maximum(y) } else { x.minimum(y) };
            r.to_bits() as u64
        }),
    };
    status.and(value)
}

/// Evaluates an ordered comparison.
pub fn compare(fmt: FloatFormat, op: Compare, a: u64, b: u64) -> StatusAnd<bool> {
    let any_nan = is_nan(fmt, a) || is_nan(fmt, b);
    let status = match op {
        Compare::Eq => nan_status(fmt, a, b),
        Compare::Lt | Compare::Le if any_nan => Status::INVALID_OP,
        Compare::Lt | Compare::Le => Status::OK,
    };
    let holds = with_format!(fmt, F => {
        let (x, y) = (lift::<F>(a), lift::<F>(b));
        match op {
            Compare::Eq => x == y,
            Compare::Lt => x < y,
            Compare::Le => x <= y,
        }
    });
    status.and(holds)
}

/// Returns the RISC-V `fclass` mask of `a`.
///
/// Exactly one of the ten low bits is set.
pub const fn classify(fmt: FloatFormat, a: u64) -> u64 {
    let negative = a & fmt.sign_mask() != 0;
    let exp = (a >> fmt.frac_bits()) & fmt.exp_mask();
    let frac = a & fmt.frac_mask();
    let bit = if exp == fmt.exp_mask() {
        if frac == 0 {
            if negative { 0 } else { 7 }
        } else if is_signaling_nan(fmt, a) {
            8
        } else {
            9
        }
    } else if exp == 0 {
        match (frac == 0, negative) {
            (true, true) => 3,
            (true, false) => 4,
            (false, true) => 2,
            (false, false) => 5,
        }
    } else if negative {
        1
    } else {
        6
    };
    1 << bit
}

/// Correctly rounded square root.
///
/// Half and bfloat16 are evaluated in single precision and rounded once
/// more; single precision carries more than `2p + 2` bits for both, so the
/// second rounding cannot disturb the result.
pub fn sqrt(fmt: FloatFormat, a: u64, round: Round) -> StatusAnd<u64> {
    if is_nan(fmt, a) {
        return nan_status(fmt, a, 0).and(canonical_nan(fmt));
    }
    let negative = a & fmt.sign_mask() != 0;
    let magnitude = a & !fmt.sign_mask() & fmt.value_mask();
    if negative && magnitude != 0 {
        return Status::INVALID_OP.and(canonical_nan(fmt));
    }
    match fmt {
        FloatFormat::Single => {
            let (r, _iterations) = ieee_apsqrt::sqrt_accurate(a as u32, round);
            r.map(u64::from)
        }
        FloatFormat::Double => {
            let (r, _iterations) = ieee_apsqrt::sqrt_accurate(a, round);
            r
        }
        FloatFormat::Half | FloatFormat::BFloat16 => {
            let wide = convert(fmt, FloatFormat::Single, a, round).value;
            let (root, _iterations) = ieee_apsqrt::sqrt_accurate(wide as u32, round);
            let narrowed = convert(FloatFormat::Single, fmt, u64::from(root.value), round);
            (root.status | narrowed.status).and(narrowed.value)
        }
    }
}

/// Converts `a` to a `width`-bit integer.
///
/// NaN converts like `+inf`, so it saturates to the largest value and
/// raises NV, matching the RISC-V convention.
pub fn to_int(fmt: FloatFormat, a: u64, width: usize, signed: bool, round: Round) -> StatusAnd<u64> {
    with_format!(fmt, F => {
        let x = if is_nan(fmt, a) { F::INFINITY } else { lift::<F>(a) };
        let mut is_exact = false;
        if signed {
            x.to_i128_r(width, round, &mut is_exact).map(|v| v as u64)
        } else {
            x.to_u128_r(width, round, &mut is_exact).map(|v| v as u64)
        }
    })
}

/// Converts the low `width` bits of `value` to `fmt`.
pub fn from_int(fmt: FloatFormat, value: u64, width: usize, signed: bool, round: Round) -> StatusAnd<u64> {
    let shift = 64 - width as u32;
    with_format!(fmt, F => {
        let r = if signed {
            F::from_i128_r(i128::from(((value << shift) as i64) >> shift), round)
        } else {
            F::from_u128_r(u128::from((value << shift) >> shift), round)
        };
        settle(fmt, r)
    })
}

/// Converts `a` between float formats.
pub fn convert(from: FloatFormat, to: FloatFormat, a: u64, round: Round) -> StatusAnd<u64> {
    with_format!(from, F => with_format!(to, G => {
        let mut loses_info = false;
        let r: StatusAnd<G> = FloatConvert::<G>::convert_r(lift::<F>(a), round, &mut loses_info);
        settle(to, r)
    }))
}

/// Converts `a` between float formats with round-to-odd.
///
/// The value is truncated and, if anything was lost, the result LSB is
/// forced to 1. Overflow therefore lands on the largest finite value.
pub fn convert_round_odd(from: FloatFormat, to: FloatFormat, a: u64) -> StatusAnd<u64> {
    let r = convert(from, to, a, Round::TowardZero);
    if r.status.contains(Status::INEXACT) && !is_nan(to, r.value) {
        r.status.and(r.value | 1)
    } else {
        r
    }
}

/// Flips the sign bit.
#[inline]
pub const fn negate(fmt: FloatFormat, a: u64) -> u64 {
    a ^ fmt.sign_mask()
}

/// Returns true if the sign bit is set.
#[inline]
pub const fn is_negative(fmt: FloatFormat, a: u64) -> bool {
    a & fmt.sign_mask() != 0
}
