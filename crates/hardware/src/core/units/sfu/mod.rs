//! Special Function Unit (SFU).
//!
//! Approximates `exp2`, `1/x`, `sigmoid` and `tanh` on binary32 inputs the
//! way the hardware unit does:
//!
//! 1. [`classify`]: Special ranges short-circuit to fixed results and flags.
//! 2. [`reduce`]: Cross reductions move the argument onto a covered table.
//! 3. [`reconstruct`]: A piecewise quadratic is evaluated through the
//!    [`booth`] multiplier model and the fixed-point sum is rounded to
//!    binary32 toward +inf.
//!
//! Every function is pure; the coefficient tables are the only
//! shared state.

/// Radix-4 Booth multiplier emulation.
pub mod booth;

/// Per-operation special-range classification.
pub mod classify;

/// Coefficient tables.
mod lut;

/// Segment lookup, polynomial evaluation and reconstruction.
pub mod reconstruct;

/// Cross reductions and exp2 argument splitting.
pub mod reduce;

use std::fmt;

use self::classify::{Class, classify};
use self::reconstruct::{FRACTION_BITS, polynomial, select, to_single};
use self::reduce::reduce;
use crate::core::units::fpu::exception_flags::FpFlags;

/// Function evaluated by the SFU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SfuOp {
    /// `2^x`
    Exp2,
    /// `1 / x`
    Rcp,
    /// `1 / (1 + e^-x)`
    Sigmoid,
    /// `tanh(x)`
    Tanh,
}

impl SfuOp {
    /// Double-precision reference value used to estimate the error.
    pub fn reference(self, x: f64) -> f64 {
        match self {
            Self::Exp2 => x.exp2(),
            Self::Rcp => x.recip(),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
        }
    }
}

impl fmt::Display for SfuOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exp2 => "exp2",
            Self::Rcp => "rcp",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
        };
        f.write_str(name)
    }
}

/// Result of one SFU evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SfuOutput {
    /// binary32 result bits.
    pub result: u32,
    /// Error estimate in units of the result's last place.
    ///
    /// [`evaluate`] leaves it at zero; [`evaluate_with_reference`] fills it.
    pub error_estimate: f32,
    /// Exception flags in `fflags` order.
    pub flags: FpFlags,
    /// Fixed-point accumulator before conversion (zero for special ranges).
    pub booth_debug: i64,
}

impl SfuOutput {
    const fn special(result: u32, flags: FpFlags) -> Self {
        Self { result, error_estimate: 0.0, flags, booth_debug: 0 }
    }

    /// Result as a host float.
    pub fn value(&self) -> f32 {
        f32::from_bits(self.result)
    }
}

/// Evaluates `op` on the binary32 input `input`.
pub fn evaluate(op: SfuOp, input: u32) -> SfuOutput {
    let prescale = match classify(op, input) {
        Class::Special { result, flags } => return SfuOutput::special(result, flags),
        Class::Evaluate { prescale } => prescale,
    };

    let a = f32::from_bits(input);
    let reduced = reduce(op, a, prescale);
    let seg = select(reduced.op, reduced.arg);
    let mut acc = polynomial(&seg);

    let large = 1i64 << FRACTION_BITS;
    let abs = a.abs();
    let midpoint = op == SfuOp::Sigmoid && abs >= 2f32.powi(-9) && abs < 1.0;
    match op {
        SfuOp::Tanh if abs >= 0.5 => {
            acc = if a > 0.0 { (acc << 1) - large } else { large - (acc << 1) };
        }
        SfuOp::Sigmoid if midpoint => {
            acc = if a > 0.0 { acc + large } else { large - acc };
        }
        SfuOp::Sigmoid if a < 0.0 && a > -16.0 => acc = large - acc,
        SfuOp::Rcp => acc <<= prescale,
        _ => {}
    }

    // Sigmoid never negates: its negative direct range is `1 - sigmoid(|a|)`.
    let negate = seg.negative && op != SfuOp::Sigmoid;
    let mut result = to_single(acc, seg.src_exp, negate);
    if midpoint {
        // Halve by stepping the exponent; the sum lies in (0.5, 2).
        result -= 1 << 23;
    }

    SfuOutput { result, error_estimate: 0.0, flags: FpFlags::NONE, booth_debug: acc }
}

/// Evaluates `op` and measures the result against a double-precision
/// reference.
///
/// `error_estimate` is `|result - reference|` in units of the binary32 ULP
/// at the reference value. Special ranges compare the same way, so an exact
/// special result reports zero. NaN references report NaN.
pub fn evaluate_with_reference(op: SfuOp, input: u32) -> SfuOutput {
    let mut out = evaluate(op, input);
    let reference = op.reference(f64::from(f32::from_bits(input)));
    let got = f64::from(out.value());
    out.error_estimate = if reference.is_nan() || got.is_nan() {
        f32::NAN
    } else if reference.is_infinite() || got.is_infinite() {
        let same = reference.is_infinite() && got.is_infinite() && reference.is_sign_negative() == got.is_sign_negative();
        if same { 0.0 } else { f32::INFINITY }
    } else {
        let exp = if reference == 0.0 { -126 } else { reference.abs().log2().floor() as i32 };
        let ulp = 2f64.powi(exp.max(-126) - 23);
        ((got - reference).abs() / ulp) as f32
    };
    out
}

/// `2^x`.
pub fn sfu_exp2(input: u32) -> SfuOutput {
    evaluate(SfuOp::Exp2, input)
}

/// `1 / x`.
pub fn sfu_rcp(input: u32) -> SfuOutput {
    evaluate(SfuOp::Rcp, input)
}

/// `1 / (1 + e^-x)`.
pub fn sfu_sigmoid(input: u32) -> SfuOutput {
    evaluate(SfuOp::Sigmoid, input)
}

/// `tanh(x)`.
pub fn sfu_tanh(input: u32) -> SfuOutput {
    evaluate(SfuOp::Tanh, input)
}
