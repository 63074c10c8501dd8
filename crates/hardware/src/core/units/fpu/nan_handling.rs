//! NaN boxing, unboxing, and canonical NaN propagation for vector float ops.
//!
//! Scalar operands of `.vf` instructions arrive from the 64-bit `f` register
//! file and narrower formats are NaN-boxed there: every bit above the
//! element width must be 1.
//!
//! - **Boxing** ([`nan_box`]): Sets the upper bits to 1s when a narrow result
//!   moves into a 64-bit `f` register (`vfmv.f.s`).
//! - **Unboxing** ([`unbox`]): Checks that the upper bits are all 1s. If not,
//!   the value is treated as the canonical NaN (RISC-V unprivileged ISA §12.2).
//! - **Canonicalization** ([`canonicalize`]): Any NaN result from an
//!   arithmetic operation is replaced with the canonical quiet NaN of its
//!   format, discarding payload bits (RISC-V unprivileged ISA §11.3).

use super::FloatFormat;

/// Canonical quiet NaN for IEEE 754 half-precision.
pub const CANONICAL_NAN_F16: u64 = 0x7e00;

/// Canonical quiet NaN for bfloat16.
pub const CANONICAL_NAN_BF16: u64 = 0x7fc0;

/// Canonical quiet NaN for IEEE 754 single-precision (positive, quiet, zero payload).
pub const CANONICAL_NAN_F32: u64 = 0x7fc0_0000;

/// Canonical quiet NaN for IEEE 754 double-precision (positive, quiet, zero payload).
pub const CANONICAL_NAN_F64: u64 = 0x7ff8_0000_0000_0000;

/// Returns the canonical quiet NaN bit pattern of `fmt`.
pub const fn canonical_nan(fmt: FloatFormat) -> u64 {
    match fmt {
        FloatFormat::Half => CANONICAL_NAN_F16,
        FloatFormat::BFloat16 => CANONICAL_NAN_BF16,
        FloatFormat::Single => CANONICAL_NAN_F32,
        FloatFormat::Double => CANONICAL_NAN_F64,
    }
}

/// Returns true if `bits` encodes any NaN in `fmt`.
pub const fn is_nan(fmt: FloatFormat, bits: u64) -> bool {
    let exp = (bits >> fmt.frac_bits()) & fmt.exp_mask();
    let frac = bits & fmt.frac_mask();
    exp == fmt.exp_mask() && frac != 0
}

/// Returns true if `bits` encodes a signaling NaN in `fmt`.
pub const fn is_signaling_nan(fmt: FloatFormat, bits: u64) -> bool {
    let quiet_bit = 1u64 << (fmt.frac_bits() - 1);
    is_nan(fmt, bits) && (bits & quiet_bit) == 0
}

/// Canonicalizes a floating-point result of format `fmt`.
///
/// NaNs of any kind collapse onto the canonical quiet NaN; other values
/// pass through unchanged.
#[inline]
pub const fn canonicalize(fmt: FloatFormat, bits: u64) -> u64 {
    if is_nan(fmt, bits) {
        canonical_nan(fmt)
    } else {
        bits
    }
}

/// Boxes a `fmt` value into a 64-bit NaN-boxed representation.
#[inline]
pub const fn nan_box(fmt: FloatFormat, bits: u64) -> u64 {
    match fmt {
        FloatFormat::Double => bits,
        _ => bits | !fmt.value_mask(),
    }
}

/// Unboxes a 64-bit `f` register value to a `fmt` operand.
///
/// A value whose upper bits are not all ones is not a legal narrow operand
/// and reads as the canonical NaN (RISC-V unprivileged ISA §12.2).
#[inline]
pub const fn unbox(fmt: FloatFormat, val: u64) -> u64 {
    match fmt {
        FloatFormat::Double => val,
        _ => {
            let upper = !fmt.value_mask();
            if val & upper == upper {
                val & fmt.value_mask()
            } else {
                canonical_nan(fmt)
            }
        }
    }
}
