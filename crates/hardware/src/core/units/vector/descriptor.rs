//! Per-instruction vector descriptor.
//!
//! A [`VectorDescriptor`] snapshots everything one instruction needs from
//! the persistent [`VectorState`] plus its own `vm` bit, and validates
//! register groups before any element is touched.

use crate::common::constants::NUM_VREGS;
use crate::common::error::VectorError;
use crate::core::arch::vstate::VectorState;

use super::rounding::Vxrm;

/// Snapshot of the vector configuration for one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorDescriptor {
    /// Active vector length.
    pub vl: usize,
    /// First element to process.
    pub vstart: usize,
    /// Element width in bits.
    pub sew: usize,
    /// Signed log2 of LMUL.
    pub lmul: i32,
    /// Unmasked (`vm = 1`).
    pub vm: bool,
    /// Tail agnostic.
    pub vta: bool,
    /// Mask agnostic.
    pub vma: bool,
    /// Fixed-point rounding mode.
    pub vxrm: Vxrm,
    /// Register width in bytes.
    pub vlenb: usize,
}

impl VectorDescriptor {
    /// Builds the descriptor for an instruction with mask bit `vm`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] while `vill` is set.
    pub fn from_state(state: &VectorState, vm: bool, vlenb: usize) -> Result<Self, VectorError> {
        if state.vtype.vill {
            tracing::debug!("vector instruction rejected: vill set");
            return Err(VectorError::IllegalConfig("vill is set"));
        }
        Ok(Self {
            vl: state.vl,
            vstart: state.vstart,
            sew: state.vtype.sew,
            lmul: state.vtype.lmul,
            vm,
            vta: state.vtype.vta,
            vma: state.vtype.vma,
            vxrm: state.vxrm,
            vlenb,
        })
    }

    /// Element width in bytes.
    #[inline]
    pub const fn esz(&self) -> usize {
        self.sew / 8
    }

    /// `VLMAX` for the current SEW and LMUL.
    pub const fn vlmax(&self) -> usize {
        let elems = self.vlenb * 8 / self.sew;
        if self.lmul >= 0 { elems << self.lmul } else { elems >> self.lmul.unsigned_abs() }
    }

    /// Signed log2 EMUL of an operand with element width `eew` bits.
    #[inline]
    pub const fn emul_for(&self, eew: usize) -> i32 {
        self.lmul + eew.trailing_zeros() as i32 - self.sew.trailing_zeros() as i32
    }

    /// Number of registers (at least one) spanned by a group of EMUL `emul`.
    #[inline]
    pub const fn regs_for(emul: i32) -> usize {
        if emul > 0 { 1 << emul } else { 1 }
    }

    /// Number of element slots, tail included, in a group of EMUL `emul`
    /// with `esz`-byte elements.
    #[inline]
    pub const fn total_elems(&self, emul: i32, esz: usize) -> usize {
        let shift = if emul > 0 { emul as u32 } else { 0 };
        (self.vlenb << shift) / esz
    }

    /// Checks that a group of EMUL `emul` based at `reg` is aligned and fits.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for an EMUL outside `1/8..=8`
    /// or a misaligned base, and [`VectorError::RegisterOutOfRange`] if the
    /// group runs past `v31`.
    pub fn check_group(&self, reg: usize, emul: i32) -> Result<(), VectorError> {
        if !(-3..=3).contains(&emul) {
            return Err(VectorError::IllegalConfig("EMUL out of range"));
        }
        let count = Self::regs_for(emul);
        if reg % count != 0 {
            return Err(VectorError::IllegalConfig("misaligned register group"));
        }
        if reg + count > NUM_VREGS {
            return Err(VectorError::RegisterOutOfRange { base: reg, count });
        }
        Ok(())
    }

    /// Checks a destination of a masked instruction against `v0`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when a masked instruction
    /// writes a non-mask result into `v0`.
    pub const fn check_mask_overlap(&self, vd: usize) -> Result<(), VectorError> {
        if !self.vm && vd == 0 {
            return Err(VectorError::IllegalConfig("masked destination overlaps v0"));
        }
        Ok(())
    }

    /// Checks that a widened element of `2·SEW` is supported.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when `2·SEW` exceeds `elen` or
    /// the widened EMUL exceeds 8.
    pub fn check_widen(&self, elen: usize) -> Result<(), VectorError> {
        if self.sew * 2 > elen || self.lmul >= 3 {
            return Err(VectorError::IllegalConfig("widening past ELEN or LMUL 8"));
        }
        Ok(())
    }
}
