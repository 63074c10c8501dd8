//! Vector Configuration State.
//!
//! This module holds the per-hart vector CSRs and the `vsetvl` family. It
//! provides:
//! 1. **vtype Decoding:** SEW, LMUL, tail and mask policies, and `vill`.
//! 2. **vsetvl:** VLMAX computation and the AVL rules, including the
//!    `x0/x0` form that keeps `vl`.
//! 3. **Fixed-Point CSRs:** `vxrm`, the sticky `vxsat` and their `vcsr` view.

use crate::common::constants::{
    VTYPE_RESERVED_MASK, VTYPE_VILL_BIT, VTYPE_VLMUL_MASK, VTYPE_VMA_BIT, VTYPE_VSEW_SHIFT, VTYPE_VTA_BIT,
};
use crate::core::units::vector::rounding::Vxrm;

/// Decoded `vtype`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vtype {
    /// Element width in bits (8, 16, 32 or 64).
    pub sew: usize,
    /// Signed log2 of LMUL (-3..=3).
    pub lmul: i32,
    /// Tail agnostic.
    pub vta: bool,
    /// Mask agnostic.
    pub vma: bool,
    /// Illegal configuration.
    pub vill: bool,
}

impl Vtype {
    /// The `vill` configuration: every other field is meaningless.
    pub const ILLEGAL: Self = Self { sew: 8, lmul: 0, vta: false, vma: false, vill: true };

    /// Decodes a raw `vtype` value for a given ELEN.
    ///
    /// Reserved bits, a reserved `vlmul`, SEW above ELEN or a fractional
    /// LMUL that cannot hold one SEW element of ELEN all decode as
    /// [`Vtype::ILLEGAL`].
    pub fn decode(raw: u64, elen: usize) -> Self {
        if raw >> VTYPE_VILL_BIT != 0 || raw & VTYPE_RESERVED_MASK != 0 {
            return Self::ILLEGAL;
        }
        let vsew = (raw >> VTYPE_VSEW_SHIFT) & 0x7;
        if vsew > 3 {
            return Self::ILLEGAL;
        }
        let sew = 8usize << vsew;
        let lmul = match raw & VTYPE_VLMUL_MASK {
            0b100 => return Self::ILLEGAL,
            v @ 0..=3 => v as i32,
            v => v as i32 - 8,
        };
        if sew > elen || (lmul < 0 && sew > elen >> lmul.unsigned_abs()) {
            return Self::ILLEGAL;
        }
        Self {
            sew,
            lmul,
            vta: (raw >> VTYPE_VTA_BIT) & 1 != 0,
            vma: (raw >> VTYPE_VMA_BIT) & 1 != 0,
            vill: false,
        }
    }

    /// Re-encodes the configuration as a raw `vtype` value.
    pub const fn encode(&self) -> u64 {
        if self.vill {
            return 1 << VTYPE_VILL_BIT;
        }
        let vsew = self.sew.trailing_zeros() as u64 - 3;
        let vlmul = (self.lmul as u64) & VTYPE_VLMUL_MASK;
        vlmul | (vsew << VTYPE_VSEW_SHIFT) | ((self.vta as u64) << VTYPE_VTA_BIT) | ((self.vma as u64) << VTYPE_VMA_BIT)
    }

    /// `VLMAX = LMUL · VLEN / SEW`.
    pub const fn vlmax(&self, vlenb: usize) -> usize {
        if self.vill {
            return 0;
        }
        let elems = vlenb * 8 / self.sew;
        if self.lmul >= 0 { elems << self.lmul } else { elems >> self.lmul.unsigned_abs() }
    }
}

impl Default for Vtype {
    fn default() -> Self {
        Self::ILLEGAL
    }
}

/// Persistent vector state of one hart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VectorState {
    /// Active vector length.
    pub vl: usize,
    /// Current configuration.
    pub vtype: Vtype,
    /// First element the next instruction processes.
    pub vstart: usize,
    /// Fixed-point rounding mode.
    pub vxrm: Vxrm,
    /// Sticky fixed-point saturation flag.
    pub vxsat: bool,
    /// Grouped float reductions saturate infinities to the largest finite
    /// value instead of producing them.
    pub utn_sat: bool,
}

impl VectorState {
    /// Creates reset state: `vill` set, `vl = 0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes `vsetvl`/`vsetvli`/`vsetivli` and returns the new `vl`.
    ///
    /// * `avl` - Requested length (the value of `rs1` or the immediate).
    /// * `raw_vtype` - Requested `vtype`.
    /// * `rd_is_x0`, `rs1_is_x0` - Register operand forms. `rs1 = x0` with
    ///   `rd != x0` requests VLMAX; both `x0` keep the current `vl`.
    pub fn vsetvl(
        &mut self,
        avl: u64,
        raw_vtype: u64,
        rd_is_x0: bool,
        rs1_is_x0: bool,
        vlenb: usize,
        elen: usize,
    ) -> usize {
        let vtype = Vtype::decode(raw_vtype, elen);
        self.vstart = 0;
        if vtype.vill {
            tracing::debug!(raw_vtype, "vsetvl: illegal vtype");
            self.vtype = Vtype::ILLEGAL;
            self.vl = 0;
            return 0;
        }
        let vlmax = vtype.vlmax(vlenb);
        self.vl = match (rs1_is_x0, rd_is_x0) {
            (true, true) => self.vl.min(vlmax),
            (true, false) => vlmax,
            (false, _) => usize::try_from(avl).map_or(vlmax, |avl| avl.min(vlmax)),
        };
        self.vtype = vtype;
        self.vl
    }

    /// Reads `vcsr` (`vxrm << 1 | vxsat`).
    pub const fn vcsr(&self) -> u64 {
        ((self.vxrm as u64) << 1) | self.vxsat as u64
    }

    /// Writes `vcsr`.
    pub const fn set_vcsr(&mut self, val: u64) {
        self.vxrm = Vxrm::from_bits((val >> 1) as u8);
        self.vxsat = val & 1 != 0;
    }
}
