//! The `frm` rounding modes.
//!
//! Vector float instructions have no static rounding-mode field, so every
//! operation reads the dynamic `frm` held in
//! [`FloatEnv`](super::FloatEnv) and passes it down explicitly. The
//! grouped reduction matches on the mode itself to round its exact sum.

use rustc_apfloat::Round;

/// A legal `frm` value. The discriminant is the CSR encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum RoundingMode {
    /// Nearest, ties to even.
    #[default]
    Rne = 0,
    /// Toward zero.
    Rtz = 1,
    /// Toward negative infinity.
    Rdn = 2,
    /// Toward positive infinity.
    Rup = 3,
    /// Nearest, ties away from zero.
    Rmm = 4,
}

impl RoundingMode {
    /// Decodes the low three bits of `frm`.
    ///
    /// `None` for 5 and 6 (reserved) and 7 (the instruction-level "dynamic"
    /// marker, which is never a legal `frm` value).
    pub const fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits & 0x7 {
            0 => Self::Rne,
            1 => Self::Rtz,
            2 => Self::Rdn,
            3 => Self::Rup,
            4 => Self::Rmm,
            _ => return None,
        })
    }

    /// Returns true for the two round-to-nearest modes.
    pub const fn is_nearest(self) -> bool {
        matches!(self, Self::Rne | Self::Rmm)
    }

    /// Equivalent soft-float rounding direction.
    pub const fn to_round(self) -> Round {
        match self {
            Self::Rne => Round::NearestTiesToEven,
            Self::Rmm => Round::NearestTiesToAway,
            Self::Rtz => Round::TowardZero,
            Self::Rdn => Round::TowardNegative,
            Self::Rup => Round::TowardPositive,
        }
    }
}

impl From<RoundingMode> for Round {
    fn from(rm: RoundingMode) -> Self {
        rm.to_round()
    }
}
