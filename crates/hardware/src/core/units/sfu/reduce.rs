//! Range reduction.
//!
//! The tables cover only a few octaves, so other inputs are rewritten in
//! terms of a neighbouring function first:
//!
//! | Input                  | Rewritten as              |
//! |------------------------|---------------------------|
//! | `tanh(x)`, 0.5 ≤ \|x\| < 8 | `2·sigmoid(2\|x\|) - 1`  |
//! | `sigmoid(x)`, 2^-9 ≤ \|x\| < 1 | `(1 + tanh(x/2)) / 2`  |
//! | `sigmoid(x)`, x ≤ -16  | `exp2(1.4375·x)`          |

use super::SfuOp;
use super::classify::sigmoid_exp2_arg;
use super::reconstruct::round_to_f32;

/// Operation and argument the table path evaluates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reduced {
    /// Function whose table is consulted.
    pub op: SfuOp,
    /// Argument of that function.
    pub arg: f32,
}

/// Applies the cross reductions to `a`.
///
/// `prescale` multiplies the argument by `2^prescale` before lookup, which
/// keeps tiny reciprocal inputs inside the normal range.
pub fn reduce(op: SfuOp, a: f32, prescale: u32) -> Reduced {
    let tiny = 2f32.powi(-9);
    let (op, arg) = match op {
        SfuOp::Tanh if a.abs() >= 0.5 => (SfuOp::Sigmoid, 2.0 * a.abs()),
        SfuOp::Sigmoid if a.abs() >= tiny && a.abs() < 1.0 => (SfuOp::Tanh, a.abs() / 2.0),
        SfuOp::Sigmoid if a <= -16.0 => (SfuOp::Exp2, sigmoid_exp2_arg(a.to_bits())),
        SfuOp::Rcp => (op, a * 2f32.powi(prescale as i32)),
        _ => (op, a),
    };
    Reduced { op, arg }
}

/// Splits an `exp2` argument into a mantissa in `[1, 2]` and an exponent.
///
/// `2^x = 2^(m - 1) · 2^e`. The remainder is rounded down for positive
/// arguments and up for negative ones so that the mantissa never leaves
/// the table interval.
pub fn split_exp2(x: f32) -> (u32, i32) {
    let x = f64::from(x);
    if x >= 0.0 {
        let whole = x.floor();
        (round_to_f32(x - whole + 1.0, false), whole as i32)
    } else {
        let whole = (-x).floor();
        let mantissa = round_to_f32(x + whole + 2.0, true);
        let exp = if whole + x == 0.0 { -(whole as i32) } else { -(whole as i32) - 1 };
        (mantissa, exp)
    }
}
