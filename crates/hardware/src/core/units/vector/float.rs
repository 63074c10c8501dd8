//! Floating-point vector arithmetic.
//!
//! SEW selects the format (16: half, 32: single, 64: double). Scalar `.vf`
//! operands arrive NaN-boxed from the `f` register file and are unboxed
//! per element. Every primitive goes through [`crate::core::units::fpu::soft`]
//! with the dynamic `frm`; accrued flags are OR-ed into `fflags` when the
//! instruction completes.

use rustc_apfloat::{Round, Status, StatusAnd};

use super::descriptor::VectorDescriptor;
use super::iter::Destination;
use super::{Operand, VectorEngine};
use crate::common::error::VectorError;
use crate::core::arch::vreg::VectorRegisterFile;
use crate::core::units::fpu::FloatFormat;
use crate::core::units::fpu::nan_handling::unbox;
use crate::core::units::fpu::soft::{self, Arith};

/// Two-operand float operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatOp {
    /// `vfadd`
    Add,
    /// `vfsub`
    Sub,
    /// `vfrsub` (`rhs - vs2`)
    Rsub,
    /// `vfmul`
    Mul,
    /// `vfdiv`
    Div,
    /// `vfrdiv` (`rhs / vs2`)
    Rdiv,
    /// `vfmin`
    Min,
    /// `vfmax`
    Max,
    /// `vfsgnj`
    Sgnj,
    /// `vfsgnjn`
    Sgnjn,
    /// `vfsgnjx`
    Sgnjx,
}

/// Fused multiply-add forms.
///
/// The `acc` forms add to `vd`; the `add`/`sub` forms multiply by `vd`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FmaOp {
    /// `vd = +(vs1 * vs2) + vd`
    Macc,
    /// `vd = -(vs1 * vs2) - vd`
    Nmacc,
    /// `vd = +(vs1 * vs2) - vd`
    Msac,
    /// `vd = -(vs1 * vs2) + vd`
    Nmsac,
    /// `vd = +(vs1 * vd) + vs2`
    Madd,
    /// `vd = -(vs1 * vd) - vs2`
    Nmadd,
    /// `vd = +(vs1 * vd) - vs2`
    Msub,
    /// `vd = -(vs1 * vd) + vs2`
    Nmsub,
}

impl FmaOp {
    /// `(negate product, negate addend, multiplies vd)`.
    const fn shape(self) -> (bool, bool, bool) {
        match self {
            Self::Macc => (false, false, false),
            Self::Nmacc => (true, true, false),
            Self::Msac => (false, true, false),
            Self::Nmsac => (true, false, false),
            Self::Madd => (false, false, true),
            Self::Nmadd => (true, true, true),
            Self::Msub => (false, true, true),
            Self::Nmsub => (true, false, true),
        }
    }
}

/// Single-operand float operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatUnary {
    /// `vfsqrt.v`
    Sqrt,
    /// `vfclass.v`
    Class,
}

/// Widening float operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WideFloatOp {
    /// `vfwadd`
    Add,
    /// `vfwsub`
    Sub,
    /// `vfwmul`
    Mul,
}

/// Float format of the current SEW.
///
/// # Errors
///
/// Returns [`VectorError::IllegalConfig`] for SEW=8.
pub fn float_format(desc: &VectorDescriptor) -> Result<FloatFormat, VectorError> {
    FloatFormat::from_sew_bits(desc.sew).ok_or(VectorError::IllegalConfig("no float format at SEW=8"))
}

/// Reads a float operand; scalar operands are unboxed.
///
/// # Errors
///
/// Propagates register file range errors.
pub fn read_float(op: Operand, regs: &VectorRegisterFile, i: usize, fmt: FloatFormat) -> Result<u64, VectorError> {
    match op {
        Operand::Vector(reg) => regs.read(reg, i, fmt.bytes()),
        Operand::Scalar(f) => Ok(unbox(fmt, f)),
        Operand::Imm(imm) => Ok(imm as u64 & fmt.value_mask()),
    }
}

/// Evaluates a two-operand float op on `a = vs2[i]` and `b = rhs[i]`.
pub fn float_op(fmt: FloatFormat, op: FloatOp, a: u64, b: u64, round: Round) -> StatusAnd<u64> {
    let sign = fmt.sign_mask();
    let magnitude = a & !sign;
    match op {
        FloatOp::Add => soft::arith(fmt, Arith::Add, a, b, round),
        FloatOp::Sub => soft::arith(fmt, Arith::Sub, a, b, round),
        FloatOp::Rsub => soft::arith(fmt, Arith::Sub, b, a, round),
        FloatOp::Mul => soft::arith(fmt, Arith::Mul, a, b, round),
        FloatOp::Div => soft::arith(fmt, Arith::Div, a, b, round),
        FloatOp::Rdiv => soft::arith(fmt, Arith::Div, b, a, round),
        FloatOp::Min => soft::min(fmt, a, b),
        FloatOp::Max => soft::max(fmt, a, b),
        FloatOp::Sgnj => Status::OK.and(magnitude | (b & sign)),
        FloatOp::Sgnjn => Status::OK.and(magnitude | (!b & sign)),
        FloatOp::Sgnjx => Status::OK.and(a ^ (b & sign)),
    }
}

/// Evaluates `±(x * y) ± z` with one rounding.
pub fn fused(fmt: FloatFormat, x: u64, y: u64, z: u64, neg_product: bool, neg_addend: bool, round: Round) -> StatusAnd<u64> {
    let x = if neg_product { soft::negate(fmt, x) } else { x };
    let z = if neg_addend { soft::negate(fmt, z) } else { z };
    soft::mul_add(fmt, x, y, z, round)
}

impl VectorEngine<'_> {
    /// `vf<op>.vv` and `.vf`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for SEW=8, misaligned groups or
    /// a masked write to `v0`.
    pub fn float_binary(&mut self, op: FloatOp, vd: usize, vs2: usize, rhs: Operand, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        let fmt = float_format(&desc)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        rhs.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let round = self.fenv.frm.to_round();
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, fx| {
            let a = regs.read(vs2, i, fmt.bytes())?;
            let b = read_float(rhs, regs, i, fmt)?;
            let r = float_op(fmt, op, a, b, round);
            fx.raise(r.status);
            regs.write(vd, i, fmt.bytes(), r.value)
        })
    }

    /// The eight fused multiply-add forms, `.vv` and `.vf`.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::float_binary`].
    pub fn float_mul_add(&mut self, op: FmaOp, vd: usize, vs1: Operand, vs2: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        let fmt = float_format(&desc)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        vs1.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let round = self.fenv.frm.to_round();
        let (neg_product, neg_addend, times_vd) = op.shape();
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, fx| {
            let a = read_float(vs1, regs, i, fmt)?;
            let b = regs.read(vs2, i, fmt.bytes())?;
            let d = regs.read(vd, i, fmt.bytes())?;
            let (y, z) = if times_vd { (d, b) } else { (b, d) };
            let r = fused(fmt, a, y, z, neg_product, neg_addend, round);
            fx.raise(r.status);
            regs.write(vd, i, fmt.bytes(), r.value)
        })
    }

    /// `vfsqrt.v` and `vfclass.v`.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::float_binary`].
    pub fn float_unary(&mut self, op: FloatUnary, vd: usize, vs2: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        let fmt = float_format(&desc)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let round = self.fenv.frm.to_round();
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, fx| {
            let a = regs.read(vs2, i, fmt.bytes())?;
            let v = match op {
                FloatUnary::Sqrt => {
                    let r = soft::sqrt(fmt, a, round);
                    fx.raise(r.status);
                    r.value
                }
                FloatUnary::Class => soft::classify(fmt, a),
            };
            regs.write(vd, i, fmt.bytes(), v)
        })
    }

    /// `vfwadd`, `vfwsub` and `vfwmul` in `.vv`/`.vf` forms, plus the `.wv`
    /// and `.wf` forms of add and sub when `wide_vs2` is set.
    ///
    /// Narrow operands are widened exactly before the operation, so the
    /// result is rounded once in the wide format.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when the widened format does
    /// not exist, for a `.w` multiply, and the errors of
    /// [`VectorEngine::float_binary`].
    pub fn float_widen_binary(
        &mut self,
        op: WideFloatOp,
        vd: usize,
        vs2: usize,
        rhs: Operand,
        wide_vs2: bool,
        vm: bool,
    ) -> Result<(), VectorError> {
        if wide_vs2 && op == WideFloatOp::Mul {
            return Err(VectorError::IllegalConfig("no .w form for vfwmul"));
        }
        let desc = self.descriptor(vm)?;
        let (fmt, wide) = widen_formats(&desc, self.config.elen)?;
        desc.check_group(vd, desc.lmul + 1)?;
        desc.check_group(vs2, if wide_vs2 { desc.lmul + 1 } else { desc.lmul })?;
        rhs.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let round = self.fenv.frm.to_round();
        self.execute(&desc, Destination::wide(&desc, vd), |regs, i, fx| {
            let a = if wide_vs2 {
                regs.read(vs2, i, wide.bytes())?
            } else {
                let r = soft::convert(fmt, wide, regs.read(vs2, i, fmt.bytes())?, round);
                fx.raise(r.status);
                r.value
            };
            let b = soft::convert(fmt, wide, read_float(rhs, regs, i, fmt)?, round);
            fx.raise(b.status);
            let arith = match op {
                WideFloatOp::Add => Arith::Add,
                WideFloatOp::Sub => Arith::Sub,
                WideFloatOp::Mul => Arith::Mul,
            };
            let r = soft::arith(wide, arith, a, b.value, round);
            fx.raise(r.status);
            regs.write(vd, i, wide.bytes(), r.value)
        })
    }

    /// `vfwmacc`, `vfwnmacc`, `vfwmsac` and `vfwnmsac`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for the `madd`/`msub` forms,
    /// which have no widening variant, and the errors of
    /// [`VectorEngine::float_widen_binary`].
    pub fn float_widen_mul_add(&mut self, op: FmaOp, vd: usize, vs1: Operand, vs2: usize, vm: bool) -> Result<(), VectorError> {
        let (neg_product, neg_addend, times_vd) = op.shape();
        if times_vd {
            return Err(VectorError::IllegalConfig("no widening madd/msub"));
        }
        let desc = self.descriptor(vm)?;
        let (fmt, wide) = widen_formats(&desc, self.config.elen)?;
        desc.check_group(vd, desc.lmul + 1)?;
        desc.check_group(vs2, desc.lmul)?;
        vs1.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let round = self.fenv.frm.to_round();
        self.execute(&desc, Destination::wide(&desc, vd), |regs, i, fx| {
            let a = soft::convert(fmt, wide, read_float(vs1, regs, i, fmt)?, round);
            let b = soft::convert(fmt, wide, regs.read(vs2, i, fmt.bytes())?, round);
            fx.raise(a.status | b.status);
            let d = regs.read(vd, i, wide.bytes())?;
            let r = fused(wide, a.value, b.value, d, neg_product, neg_addend, round);
            fx.raise(r.status);
            regs.write(vd, i, wide.bytes(), r.value)
        })
    }
}

/// Narrow and wide formats of a widening float instruction.
///
/// # Errors
///
/// Returns [`VectorError::IllegalConfig`] when 2·SEW is not a float format
/// or exceeds ELEN.
pub fn widen_formats(desc: &VectorDescriptor, elen: usize) -> Result<(FloatFormat, FloatFormat), VectorError> {
    desc.check_widen(elen)?;
    let fmt = float_format(desc)?;
    let wide = fmt.widened().ok_or(VectorError::IllegalConfig("no widened float format"))?;
    Ok((fmt, wide))
}
