//! Mask register operations.
//!
//! Mask operands are single registers regardless of LMUL; bit `i` is
//! element `i`. Mask-logical instructions are always unmasked and write
//! bits `[vstart, vl)`.

use super::descriptor::VectorDescriptor;
use super::iter::Destination;
use super::VectorEngine;
use crate::common::error::VectorError;

/// Mask-logical operations (`vm<op>.mm`), `vs2 op vs1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaskLogic {
    /// `vmand`
    And,
    /// `vmnand`
    Nand,
    /// `vmandn` (`vs2 & !vs1`)
    Andn,
    /// `vmxor`
    Xor,
    /// `vmor`
    Or,
    /// `vmnor`
    Nor,
    /// `vmorn` (`vs2 | !vs1`)
    Orn,
    /// `vmxnor`
    Xnor,
}

/// Set-before/including/only-first operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetFirst {
    /// `vmsbf.m`: set bits before the first set bit.
    Before,
    /// `vmsif.m`: set bits up to and including the first set bit.
    Including,
    /// `vmsof.m`: set only the first set bit.
    Only,
}

/// Evaluates a mask-logical op on two bits.
pub const fn mask_logic(op: MaskLogic, a: bool, b: bool) -> bool {
    match op {
        MaskLogic::And => a & b,
        MaskLogic::Nand => !(a & b),
        MaskLogic::Andn => a & !b,
        MaskLogic::Xor => a ^ b,
        MaskLogic::Or => a | b,
        MaskLogic::Nor => !(a | b),
        MaskLogic::Orn => a | !b,
        MaskLogic::Xnor => !(a ^ b),
    }
}

impl VectorEngine<'_> {
    /// `vm<op>.mm vd, vs2, vs1`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] while `vill` is set.
    pub fn mask_logical(&mut self, op: MaskLogic, vd: usize, vs2: usize, vs1: usize) -> Result<(), VectorError> {
        let desc = self.descriptor(true)?;
        for reg in [vd, vs2, vs1] {
            desc.check_group(reg, 0)?;
        }
        self.execute(&desc, Destination::Mask { reg: vd }, |regs, i, _| {
            let bit = mask_logic(op, regs.mask_bit(vs2, i), regs.mask_bit(vs1, i));
            regs.set_mask_bit(vd, i, bit)
        })
    }

    /// `vcpop.m`: counts the active set bits of `vs2` below `vl`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] while `vill` is set or when
    /// `vstart` is nonzero.
    pub fn cpop(&mut self, vs2: usize, vm: bool) -> Result<u64, VectorError> {
        self.require_vstart_zero()?;
        let desc = self.descriptor(vm)?;
        desc.check_group(vs2, 0)?;
        let mut count = 0u64;
        self.execute(&desc, Destination::None, |regs, i, _| {
            count += u64::from(regs.mask_bit(vs2, i));
            Ok(())
        })?;
        Ok(count)
    }

    /// `vfirst.m`: index of the first active set bit, or -1.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::cpop`].
    pub fn first(&mut self, vs2: usize, vm: bool) -> Result<i64, VectorError> {
        self.require_vstart_zero()?;
        let desc = self.descriptor(vm)?;
        desc.check_group(vs2, 0)?;
        let mut first: Option<usize> = None;
        self.execute(&desc, Destination::None, |regs, i, _| {
            if first.is_none() && regs.mask_bit(vs2, i) {
                first = Some(i);
            }
            Ok(())
        })?;
        Ok(first.map_or(-1, |i| i as i64))
    }

    /// `vmsbf.m`, `vmsif.m` and `vmsof.m`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when `vd` overlaps `vs2`, when
    /// a masked form writes `v0`, or when `vstart` is nonzero.
    pub fn set_first(&mut self, op: SetFirst, vd: usize, vs2: usize, vm: bool) -> Result<(), VectorError> {
        self.require_vstart_zero()?;
        let desc = self.descriptor(vm)?;
        desc.check_group(vd, 0)?;
        desc.check_group(vs2, 0)?;
        desc.check_mask_overlap(vd)?;
        if vd == vs2 {
            return Err(VectorError::IllegalConfig("vms*f destination overlaps source"));
        }
        let mut seen = false;
        self.execute(&desc, Destination::Mask { reg: vd }, |regs, i, _| {
            let set = regs.mask_bit(vs2, i);
            let bit = match op {
                SetFirst::Before => !seen && !set,
                SetFirst::Including => !seen,
                SetFirst::Only => !seen && set,
            };
            seen |= set;
            regs.set_mask_bit(vd, i, bit)
        })
    }

    /// `viota.m`: each active element receives the count of active set bits
    /// of `vs2` below it.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when `vd` overlaps `vs2` or
    /// `v0` (masked), or when `vstart` is nonzero.
    pub fn iota(&mut self, vd: usize, vs2: usize, vm: bool) -> Result<(), VectorError> {
        self.require_vstart_zero()?;
        let desc = self.descriptor(vm)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, 0)?;
        desc.check_mask_overlap(vd)?;
        if (vd..vd + VectorDescriptor::regs_for(desc.lmul)).contains(&vs2) {
            return Err(VectorError::IllegalConfig("viota destination overlaps source"));
        }
        let esz = desc.esz();
        let mut count = 0u64;
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, _| {
            regs.write(vd, i, esz, count)?;
            count += u64::from(regs.mask_bit(vs2, i));
            Ok(())
        })
    }

    /// `vid.v`: writes each active element's index.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for misaligned groups or a
    /// masked write to `v0`.
    pub fn vid(&mut self, vd: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let esz = desc.esz();
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, _| regs.write(vd, i, esz, i as u64))
    }
}
