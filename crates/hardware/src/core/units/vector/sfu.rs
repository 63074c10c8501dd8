//! Element-wise SFU instructions (`vfexp2.v`, `vfrcp.v`, `vfsigmoid.v`,
//! `vftanh.v`).
//!
//! Each active element goes through the SFU model independently; the SFU
//! flags use the `fflags` layout and accrue directly.

use super::VectorEngine;
use super::iter::Destination;
use crate::common::error::VectorError;
use crate::core::units::sfu::{SfuOp, evaluate};

impl VectorEngine<'_> {
    /// Applies `op` to every active element of `vs2`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] unless SEW is 32, for
    /// misaligned groups or a masked write to `v0`.
    pub fn sfu(&mut self, op: SfuOp, vd: usize, vs2: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        if desc.sew != 32 {
            return Err(VectorError::IllegalConfig("SFU instructions require SEW=32"));
        }
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, fx| {
            let out = evaluate(op, regs.read(vs2, i, 4)? as u32);
            fx.flags |= out.flags;
            regs.write(vd, i, 4, u64::from(out.result))
        })
    }
}
