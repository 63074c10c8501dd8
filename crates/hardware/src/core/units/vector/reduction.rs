//! Single-result reductions.
//!
//! `vd[0] = vs1[0] op vs2[0] op … op vs2[vl-1]` over the active elements.
//! The scalar operand and the result are single registers; the remaining
//! elements of `vd` are tail. With `vl = 0` the destination is not written.

use super::descriptor::VectorDescriptor;
use super::float::{float_format, widen_formats};
use super::integer::{IntOp, int_op};
use super::iter::{Destination, ElementIterator};
use super::{Effects, VectorEngine, sign_extend};
use crate::common::error::VectorError;
use crate::core::units::fpu::soft::{self, Arith};

/// Integer reduction operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntRed {
    /// `vredsum`
    Sum,
    /// `vredand`
    And,
    /// `vredor`
    Or,
    /// `vredxor`
    Xor,
    /// `vredminu`
    Minu,
    /// `vredmin`
    Min,
    /// `vredmaxu`
    Maxu,
    /// `vredmax`
    Max,
}

impl IntRed {
    const fn op(self) -> IntOp {
        match self {
            Self::Sum => IntOp::Add,
            Self::And => IntOp::And,
            Self::Or => IntOp::Or,
            Self::Xor => IntOp::Xor,
            Self::Minu => IntOp::Minu,
            Self::Min => IntOp::Min,
            Self::Maxu => IntOp::Maxu,
            Self::Max => IntOp::Max,
        }
    }
}

/// Float reduction operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatRed {
    /// `vfredosum`: strictly in element order.
    OrderedSum,
    /// `vfredusum`: any order; evaluated in element order here.
    UnorderedSum,
    /// `vfredmax`
    Max,
    /// `vfredmin`
    Min,
}

impl VectorEngine<'_> {
    /// Writes a reduction result to `vd[0]` and applies the tail policy to
    /// the rest of the register.
    fn write_scalar_result(&mut self, desc: &VectorDescriptor, vd: usize, esz: usize, value: u64) -> Result<(), VectorError> {
        if desc.vl == 0 {
            return Ok(());
        }
        self.regs.write(vd, 0, esz, value)?;
        let tail = VectorDescriptor { vl: 1, vstart: 0, ..*desc };
        ElementIterator::new(&tail, self.config).fill_tail(self.regs, Destination::Elements { reg: vd, esz, emul: 0 })
    }

    fn check_reduction(&self, desc: &VectorDescriptor, vd: usize, vs2: usize, vs1: usize) -> Result<(), VectorError> {
        self.require_vstart_zero()?;
        desc.check_group(vs2, desc.lmul)?;
        desc.check_group(vd, 0)?;
        desc.check_group(vs1, 0)
    }

    /// `vred<op>.vs vd, vs2, vs1`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for `vill`, a nonzero
    /// `vstart` or misaligned groups.
    pub fn int_reduce(&mut self, op: IntRed, vd: usize, vs2: usize, vs1: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        self.check_reduction(&desc, vd, vs2, vs1)?;
        let esz = desc.esz();
        let mut acc = self.regs.read(vs1, 0, esz)?;
        self.execute(&desc, Destination::None, |regs, i, _| {
            acc = int_op(op.op(), acc, regs.read(vs2, i, esz)?, esz);
            Ok(())
        })?;
        self.write_scalar_result(&desc, vd, esz, acc)
    }

    /// `vwredsum(u).vs`: sums SEW elements into a 2·SEW accumulator.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when 2·SEW exceeds ELEN, and
    /// the errors of [`VectorEngine::int_reduce`].
    pub fn int_widen_reduce(&mut self, signed: bool, vd: usize, vs2: usize, vs1: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        desc.check_widen(self.config.elen)?;
        self.check_reduction(&desc, vd, vs2, vs1)?;
        let esz = desc.esz();
        let mut acc = self.regs.read(vs1, 0, esz * 2)?;
        self.execute(&desc, Destination::None, |regs, i, _| {
            let v = regs.read(vs2, i, esz)?;
            let v = if signed { sign_extend(v, esz) as u64 } else { v };
            acc = int_op(IntOp::Add, acc, v, esz * 2);
            Ok(())
        })?;
        self.write_scalar_result(&desc, vd, esz * 2, acc)
    }

    /// `vfred<op>.vs vd, vs2, vs1`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for SEW=8 and the errors of
    /// [`VectorEngine::int_reduce`].
    pub fn float_reduce(&mut self, op: FloatRed, vd: usize, vs2: usize, vs1: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        let fmt = float_format(&desc)?;
        self.check_reduction(&desc, vd, vs2, vs1)?;
        let round = self.fenv.frm.to_round();
        let mut acc = self.regs.read(vs1, 0, fmt.bytes())?;
        self.execute(&desc, Destination::None, |regs, i, fx: &mut Effects| {
            let v = regs.read(vs2, i, fmt.bytes())?;
            let r = match op {
                FloatRed::OrderedSum | FloatRed::UnorderedSum => soft::arith(fmt, Arith::Add, acc, v, round),
                FloatRed::Max => soft::max(fmt, acc, v),
                FloatRed::Min => soft::min(fmt, acc, v),
            };
            fx.raise(r.status);
            acc = r.value;
            Ok(())
        })?;
        self.write_scalar_result(&desc, vd, fmt.bytes(), acc)
    }

    /// `vfwredosum.vs` / `vfwredusum.vs`: widens each element exactly and
    /// sums in the 2·SEW format.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when no widened format exists,
    /// and the errors of [`VectorEngine::float_reduce`].
    pub fn float_widen_reduce(&mut self, vd: usize, vs2: usize, vs1: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        let (fmt, wide) = widen_formats(&desc, self.config.elen)?;
        self.check_reduction(&desc, vd, vs2, vs1)?;
        let round = self.fenv.frm.to_round();
        let mut acc = self.regs.read(vs1, 0, wide.bytes())?;
        self.execute(&desc, Destination::None, |regs, i, fx| {
            let v = soft::convert(fmt, wide, regs.read(vs2, i, fmt.bytes())?, round);
            let r = soft::arith(wide, Arith::Add, acc, v.value, round);
            fx.raise(v.status | r.status);
            acc = r.value;
            Ok(())
        })?;
        self.write_scalar_result(&desc, vd, wide.bytes(), acc)
    }
}
