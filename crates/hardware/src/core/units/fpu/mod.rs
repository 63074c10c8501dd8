//! Floating-Point support for the vector engine.
//!
//! This module owns the pieces every vector float instruction shares: the
//! element formats, the dynamic rounding mode and accrued flags, and the
//! soft-float primitives that drive `rustc_apfloat`. Host floats are never
//! used for architectural results; rounding and flags come from the
//! soft-float library so that every host produces the same bits.
//!
//! Operations are organized into submodules:
//! - [`nan_handling`]: NaN boxing/unboxing and canonical NaN propagation.
//! - [`rounding_modes`]: Rounding mode encoding and its soft-float mapping.
//! - [`exception_flags`]: Accrued exception flags in `fflags` order.
//! - [`soft`]: Format-generic arithmetic, compare, convert and classify.

/// NaN boxing, unboxing, and canonical NaN propagation.
pub mod nan_handling;

/// Rounding mode definitions and support.
pub mod rounding_modes;

/// Floating-point exception flag types.
pub mod exception_flags;

/// Soft-float primitives over raw element bits.
pub mod soft;

use rustc_apfloat::Status;

use self::exception_flags::FpFlags;
use self::rounding_modes::RoundingMode;

/// Element formats the vector unit and reduction engine operate on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatFormat {
    /// IEEE binary16.
    Half,
    /// bfloat16 (8-bit exponent, 7-bit fraction).
    BFloat16,
    /// IEEE binary32.
    Single,
    /// IEEE binary64.
    Double,
}

impl FloatFormat {
    /// Storage width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Half | Self::BFloat16 => 16,
            Self::Single => 32,
            Self::Double => 64,
        }
    }

    /// Storage width in bytes.
    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Width of the biased exponent field.
    pub const fn exp_bits(self) -> u32 {
        match self {
            Self::Half => 5,
            Self::BFloat16 | Self::Single => 8,
            Self::Double => 11,
        }
    }

    /// Width of the stored fraction field.
    pub const fn frac_bits(self) -> u32 {
        match self {
            Self::Half => 10,
            Self::BFloat16 => 7,
            Self::Single => 23,
            Self::Double => 52,
        }
    }

    /// Exponent bias.
    pub const fn bias(self) -> i32 {
        (1 << (self.exp_bits() - 1)) - 1
    }

    /// All-ones exponent field, right aligned.
    pub const fn exp_mask(self) -> u64 {
        (1u64 << self.exp_bits()) - 1
    }

    /// Fraction field mask.
    pub const fn frac_mask(self) -> u64 {
        (1u64 << self.frac_bits()) - 1
    }

    /// Sign bit mask.
    pub const fn sign_mask(self) -> u64 {
        1u64 << (self.bits() - 1)
    }

    /// Mask covering every bit of the format.
    pub const fn value_mask(self) -> u64 {
        match self {
            Self::Double => u64::MAX,
            _ => (1u64 << self.bits()) - 1,
        }
    }

    /// Positive infinity bit pattern.
    pub const fn infinity(self) -> u64 {
        self.exp_mask() << self.frac_bits()
    }

    /// Largest finite positive bit pattern.
    pub const fn largest_finite(self) -> u64 {
        ((self.exp_mask() - 1) << self.frac_bits()) | self.frac_mask()
    }

    /// IEEE format used by vector float instructions at a given SEW.
    ///
    /// SEW=8 has no float format.
    pub const fn from_sew_bits(sew_bits: usize) -> Option<Self> {
        match sew_bits {
            16 => Some(Self::Half),
            32 => Some(Self::Single),
            64 => Some(Self::Double),
            _ => None,
        }
    }

    /// Format produced by a widening operation on this format.
    pub const fn widened(self) -> Option<Self> {
        match self {
            Self::Half | Self::BFloat16 => Some(Self::Single),
            Self::Single => Some(Self::Double),
            Self::Double => None,
        }
    }
}

/// Dynamic floating-point environment of one hart.
///
/// Holds `frm` (the rounding mode used by every vector float operation)
/// and `fflags` (accrued exceptions). Exceptions are never fatal; they are
/// OR-ed into `fflags` and execution continues.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FloatEnv {
    /// Dynamic rounding mode (`fcsr.frm`).
    pub frm: RoundingMode,
    /// Accrued exception flags (`fcsr.fflags`).
    pub fflags: FpFlags,
}

impl FloatEnv {
    /// Creates an environment with RNE rounding and no accrued flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accrues the flags carried by a soft-float status word.
    pub fn raise_status(&mut self, status: Status) {
        if status != Status::OK {
            self.fflags |= FpFlags::from_status(status);
        }
    }

    /// Accrues flags that are already in `fflags` order.
    pub fn raise(&mut self, flags: FpFlags) {
        self.fflags |= flags;
    }

    /// Reads `fcsr` (`frm << 5 | fflags`).
    pub const fn fcsr(&self) -> u32 {
        ((self.frm as u32) << 5) | self.fflags.bits() as u32
    }
}
