//! Accrued exception flags.
//!
//! [`FpFlags`] stores the five `fflags` bits in their CSR positions
//! (NV at bit 4 down to NX at bit 0). Vector kernels, the grouped
//! reduction and the SFU all report through this type, so any of their
//! results can be OR-ed straight into `fcsr`.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use rustc_apfloat::Status;

/// Set of `fflags` bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FpFlags(u8);

impl FpFlags {
    /// Empty set.
    pub const NONE: Self = Self(0);
    /// Invalid operation.
    pub const NV: Self = Self(0b1_0000);
    /// Division by zero.
    pub const DZ: Self = Self(0b0_1000);
    /// Overflow.
    pub const OF: Self = Self(0b0_0100);
    /// Underflow.
    pub const UF: Self = Self(0b0_0010);
    /// Inexact.
    pub const NX: Self = Self(0b0_0001);

    const NAMES: [(Self, &'static str); 5] =
        [(Self::NV, "NV"), (Self::DZ, "DZ"), (Self::OF, "OF"), (Self::UF, "UF"), (Self::NX, "NX")];

    /// Keeps the low five bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x1f)
    }

    /// CSR encoding.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true when nothing was raised.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every bit of `other` is raised.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Converts a soft-float status.
    ///
    /// `Status` orders its bits invalid-first from bit 0, the mirror image
    /// of `fflags`.
    pub const fn from_status(status: Status) -> Self {
        Self(status.bits().reverse_bits() >> 3)
    }
}

impl From<Status> for FpFlags {
    fn from(status: Status) -> Self {
        Self::from_status(status)
    }
}

impl BitOr for FpFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FpFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Formats as `NV|NX`, or `-` for the empty set.
impl fmt::Display for FpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}
