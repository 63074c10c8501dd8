//! Fixed-point rounding unit.
//!
//! Every narrowing or scaling fixed-point instruction computes `v >> d` and
//! then adds a rounding increment chosen by `vxrm`:
//!
//! | vxrm | Mode | Increment                                        |
//! |------|------|--------------------------------------------------|
//! | 0b00 | RNU  | `v[d-1]`                                         |
//! | 0b01 | RNE  | `v[d-1] & (v[d-2:0] != 0 \| v[d])`               |
//! | 0b10 | RDN  | `0`                                              |
//! | 0b11 | ROD  | `!v[d] & (v[d-1:0] != 0)`                        |

/// Fixed-point rounding mode (`vxrm`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Vxrm {
    /// Round to nearest, ties up.
    #[default]
    Rnu = 0b00,
    /// Round to nearest, ties to even.
    Rne = 0b01,
    /// Round down (truncate).
    Rdn = 0b10,
    /// Round to odd (jam).
    Rod = 0b11,
}

impl Vxrm {
    /// Decodes the low two bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Rnu,
            0b01 => Self::Rne,
            0b10 => Self::Rdn,
            _ => Self::Rod,
        }
    }
}

/// Width of the values the rounding unit operates on.
pub const ROUND_WIDTH: u32 = 128;

#[inline]
const fn bit(v: u128, n: u32) -> u128 {
    if n >= ROUND_WIDTH { 0 } else { (v >> n) & 1 }
}

#[inline]
const fn low_bits(v: u128, n: u32) -> u128 {
    if n >= ROUND_WIDTH { v } else { v & ((1u128 << n) - 1) }
}

/// Returns the increment to add after shifting `v` right by `d`.
///
/// `v` is the two's complement bit pattern of the unshifted value. `d == 0`
/// and `d` past the value width round nothing.
pub const fn round_increment(v: u128, d: u32, vxrm: Vxrm) -> u128 {
    if d == 0 || d > ROUND_WIDTH {
        return 0;
    }
    let lsb = bit(v, d);
    let half = bit(v, d - 1);
    match vxrm {
        Vxrm::Rnu => half,
        Vxrm::Rne => {
            let residue = if d > 1 { low_bits(v, d - 1) != 0 } else { false };
            half & ((residue as u128) | lsb)
        }
        Vxrm::Rdn => 0,
        Vxrm::Rod => (lsb == 0 && low_bits(v, d) != 0) as u128,
    }
}

/// Arithmetic right shift with rounding.
#[inline]
pub const fn shift_round_signed(v: i128, d: u32, vxrm: Vxrm) -> i128 {
    let shifted = if d >= ROUND_WIDTH { if v < 0 { -1 } else { 0 } } else { v >> d };
    shifted + round_increment(v as u128, d, vxrm) as i128
}

/// Logical right shift with rounding.
#[inline]
pub const fn shift_round_unsigned(v: u128, d: u32, vxrm: Vxrm) -> u128 {
    let shifted = if d >= ROUND_WIDTH { 0 } else { v >> d };
    shifted + round_increment(v, d, vxrm)
}
