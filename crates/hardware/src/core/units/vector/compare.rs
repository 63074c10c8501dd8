//! Mask-producing compares.
//!
//! Results go to one mask bit per element. Tail bits follow the all-ones
//! policy whenever it is configured, independent of the instruction's
//! `vta`; masked-off bits become 1 only under `vma`.

use super::float::{float_format, read_float};
use super::iter::Destination;
use super::{Operand, VectorEngine, sign_extend};
use crate::common::error::VectorError;
use crate::core::units::fpu::soft::{self, Compare};

/// Integer compare predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntCmp {
    /// `vmseq`
    Eq,
    /// `vmsne`
    Ne,
    /// `vmsltu`
    Ltu,
    /// `vmslt`
    Lt,
    /// `vmsleu`
    Leu,
    /// `vmsle`
    Le,
    /// `vmsgtu` (`.vx`/`.vi` only)
    Gtu,
    /// `vmsgt` (`.vx`/`.vi` only)
    Gt,
}

/// Float compare predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatCmp {
    /// `vmfeq` (quiet)
    Eq,
    /// `vmfne` (quiet)
    Ne,
    /// `vmflt`
    Lt,
    /// `vmfle`
    Le,
    /// `vmfgt` (`.vf` only)
    Gt,
    /// `vmfge` (`.vf` only)
    Ge,
}

/// Evaluates an integer predicate on two `esz`-byte operands.
pub const fn int_compare(op: IntCmp, a: u64, b: u64, esz: usize) -> bool {
    let (sa, sb) = (sign_extend(a, esz), sign_extend(b, esz));
    match op {
        IntCmp::Eq => a == b,
        IntCmp::Ne => a != b,
        IntCmp::Ltu => a < b,
        IntCmp::Lt => sa < sb,
        IntCmp::Leu => a <= b,
        IntCmp::Le => sa <= sb,
        IntCmp::Gtu => a > b,
        IntCmp::Gt => sa > sb,
    }
}

impl VectorEngine<'_> {
    /// `vms<op>.vv`, `.vx` and `.vi` into mask register `vd`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for `vill`, misaligned groups,
    /// or a `.vv` form of `gt`/`gtu`.
    pub fn int_compare(&mut self, op: IntCmp, vd: usize, vs2: usize, rhs: Operand, vm: bool) -> Result<(), VectorError> {
        if matches!(op, IntCmp::Gt | IntCmp::Gtu) && matches!(rhs, Operand::Vector(_)) {
            return Err(VectorError::IllegalConfig("vmsgt has no .vv form"));
        }
        let desc = self.descriptor(vm)?;
        desc.check_group(vd, 0)?;
        desc.check_group(vs2, desc.lmul)?;
        rhs.check(&desc, desc.lmul)?;
        let esz = desc.esz();
        self.execute(&desc, Destination::Mask { reg: vd }, |regs, i, _| {
            let a = regs.read(vs2, i, esz)?;
            let b = rhs.read(regs, i, esz)?;
            regs.set_mask_bit(vd, i, int_compare(op, a, b, esz))
        })
    }

    /// `vmf<op>.vv` and `.vf` into mask register `vd`.
    ///
    /// `eq` and `ne` are quiet; the ordered predicates raise NV on any NaN.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for SEW=8, misaligned groups,
    /// or a `.vv` form of `gt`/`ge`.
    pub fn float_compare(&mut self, op: FloatCmp, vd: usize, vs2: usize, rhs: Operand, vm: bool) -> Result<(), VectorError> {
        if matches!(op, FloatCmp::Gt | FloatCmp::Ge) && matches!(rhs, Operand::Vector(_)) {
            return Err(VectorError::IllegalConfig("vmfgt has no .vv form"));
        }
        let desc = self.descriptor(vm)?;
        let fmt = float_format(&desc)?;
        desc.check_group(vd, 0)?;
        desc.check_group(vs2, desc.lmul)?;
        rhs.check(&desc, desc.lmul)?;
        self.execute(&desc, Destination::Mask { reg: vd }, |regs, i, fx| {
            let a = regs.read(vs2, i, fmt.bytes())?;
            let b = read_float(rhs, regs, i, fmt)?;
            let r = match op {
                FloatCmp::Eq => soft::compare(fmt, Compare::Eq, a, b),
                FloatCmp::Ne => soft::compare(fmt, Compare::Eq, a, b).map(|eq| !eq),
                FloatCmp::Lt => soft::compare(fmt, Compare::Lt, a, b),
                FloatCmp::Le => soft::compare(fmt, Compare::Le, a, b),
                FloatCmp::Gt => soft::compare(fmt, Compare::Lt, b, a),
                FloatCmp::Ge => soft::compare(fmt, Compare::Le, b, a),
            };
            fx.raise(r.status);
            regs.set_mask_bit(vd, i, r.value)
        })
    }
}
