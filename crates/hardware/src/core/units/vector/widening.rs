//! Widening integer arithmetic.
//!
//! `.vv`/`.vx` forms read two SEW operands and write a 2·SEW result;
//! `.wv`/`.wx` forms read a 2·SEW `vs2` and a SEW `rhs`. Each operand is
//! extended by its own signedness before the operation, so mixed-sign
//! multiplies such as `vwmulsu` are exact.

use super::iter::Destination;
use super::{Operand, VectorEngine, sign_extend};
use crate::common::error::VectorError;

/// Widening binary operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WideOp {
    /// `vwaddu`
    Addu,
    /// `vwadd`
    Add,
    /// `vwsubu`
    Subu,
    /// `vwsub`
    Sub,
    /// `vwmulu`
    Mulu,
    /// `vwmul`
    Mul,
    /// `vwmulsu` (signed `vs2`, unsigned `rhs`)
    Mulsu,
}

impl WideOp {
    /// Signedness of the `vs2` and `rhs` operands.
    const fn signedness(self) -> (bool, bool) {
        match self {
            Self::Addu | Self::Subu | Self::Mulu => (false, false),
            Self::Add | Self::Sub | Self::Mul => (true, true),
            Self::Mulsu => (true, false),
        }
    }
}

/// Widening multiply-add forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WideMacc {
    /// `vwmaccu`: unsigned × unsigned
    Maccu,
    /// `vwmacc`: signed × signed
    Macc,
    /// `vwmaccsu`: signed `vs1` × unsigned `vs2`
    Maccsu,
    /// `vwmaccus`: unsigned `rs1` × signed `vs2` (`.vx` only)
    Maccus,
}

#[inline]
const fn extend(v: u64, esz: usize, signed: bool) -> i128 {
    if signed { sign_extend(v, esz) as i128 } else { v as i128 }
}

/// Evaluates a widening operation on already-extended operands.
///
/// The result is the low 2·SEW bits of the exact value.
pub const fn wide_op(op: WideOp, a: i128, b: i128) -> u64 {
    let r = match op {
        WideOp::Addu | WideOp::Add => a + b,
        WideOp::Subu | WideOp::Sub => a - b,
        WideOp::Mulu | WideOp::Mul | WideOp::Mulsu => a * b,
    };
    r as u64
}

impl VectorEngine<'_> {
    /// `vwadd(u)`, `vwsub(u)`, `vwmul(u)` and `vwmulsu` in `.vv`/`.vx` forms.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when 2·SEW exceeds ELEN, for
    /// misaligned groups or a masked write to `v0`.
    pub fn widen_binary(&mut self, op: WideOp, vd: usize, vs2: usize, rhs: Operand, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        desc.check_widen(self.config.elen)?;
        desc.check_group(vd, desc.lmul + 1)?;
        desc.check_group(vs2, desc.lmul)?;
        rhs.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let esz = desc.esz();
        let (sign_a, sign_b) = op.signedness();
        self.execute(&desc, Destination::wide(&desc, vd), |regs, i, _| {
            let a = extend(regs.read(vs2, i, esz)?, esz, sign_a);
            let b = extend(rhs.read(regs, i, esz)?, esz, sign_b);
            regs.write(vd, i, esz * 2, wide_op(op, a, b))
        })
    }

    /// `vwadd(u).w*` / `vwsub(u).w*`: `vs2` is already 2·SEW wide.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for a multiply `op`, and the
    /// errors of [`VectorEngine::widen_binary`].
    pub fn widen_wide(&mut self, op: WideOp, vd: usize, vs2: usize, rhs: Operand, vm: bool) -> Result<(), VectorError> {
        if matches!(op, WideOp::Mulu | WideOp::Mul | WideOp::Mulsu) {
            return Err(VectorError::IllegalConfig("no .w form for widening multiply"));
        }
        let desc = self.descriptor(vm)?;
        desc.check_widen(self.config.elen)?;
        desc.check_group(vd, desc.lmul + 1)?;
        desc.check_group(vs2, desc.lmul + 1)?;
        rhs.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let esz = desc.esz();
        let (signed, _) = op.signedness();
        self.execute(&desc, Destination::wide(&desc, vd), |regs, i, _| {
            let a = extend(regs.read(vs2, i, esz * 2)?, esz * 2, signed);
            let b = extend(rhs.read(regs, i, esz)?, esz, signed);
            regs.write(vd, i, esz * 2, wide_op(op, a, b))
        })
    }

    /// `vwmacc(u|su|us)`: `vd = vs1 * vs2 + vd` at 2·SEW.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for `vwmaccus.vv`, and the
    /// errors of [`VectorEngine::widen_binary`].
    pub fn widen_mul_add(&mut self, op: WideMacc, vd: usize, vs1: Operand, vs2: usize, vm: bool) -> Result<(), VectorError> {
        if op == WideMacc::Maccus && matches!(vs1, Operand::Vector(_)) {
            return Err(VectorError::IllegalConfig("vwmaccus has no .vv form"));
        }
        let desc = self.descriptor(vm)?;
        desc.check_widen(self.config.elen)?;
        desc.check_group(vd, desc.lmul + 1)?;
        desc.check_group(vs2, desc.lmul)?;
        vs1.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let esz = desc.esz();
        let (sign_1, sign_2) = match op {
            WideMacc::Maccu => (false, false),
            WideMacc::Macc => (true, true),
            WideMacc::Maccsu => (true, false),
            WideMacc::Maccus => (false, true),
        };
        self.execute(&desc, Destination::wide(&desc, vd), |regs, i, _| {
            let a = extend(vs1.read(regs, i, esz)?, esz, sign_1);
            let b = extend(regs.read(vs2, i, esz)?, esz, sign_2);
            let d = regs.read(vd, i, esz * 2)?;
            regs.write(vd, i, esz * 2, ((a * b) as u64).wrapping_add(d))
        })
    }
}
