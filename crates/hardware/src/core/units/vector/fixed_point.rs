//! Fixed-point vector arithmetic.
//!
//! Every kernel here computes its exact result in 128-bit arithmetic,
//! rounds it through [`super::rounding`] and clamps it to the SEW range.
//! A clamp sets the sticky `vxsat` flag; an in-range result leaves it alone.

use super::iter::Destination;
use super::rounding::{Vxrm, shift_round_signed, shift_round_unsigned};
use super::{Effects, Operand, VectorEngine, sign_extend, width_mask};
use crate::common::error::VectorError;

/// Single-width fixed-point operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FixedOp {
    /// `vsaddu`
    Saddu,
    /// `vsadd`
    Sadd,
    /// `vssubu`
    Ssubu,
    /// `vssub`
    Ssub,
    /// `vaaddu`
    Aaddu,
    /// `vaadd`
    Aadd,
    /// `vasubu`
    Asubu,
    /// `vasub`
    Asub,
    /// `vsmul`
    Smul,
    /// `vssrl`
    Ssrl,
    /// `vssra`
    Ssra,
}

/// Clamps `v` to the signed range of `bits`, returning the value and
/// whether it saturated.
#[inline]
pub const fn clamp_signed(v: i128, bits: u32) -> (u64, bool) {
    let max = (1i128 << (bits - 1)) - 1;
    let min = -(1i128 << (bits - 1));
    if v > max {
        (max as u64, true)
    } else if v < min {
        (min as u64, true)
    } else {
        (v as u64, false)
    }
}

/// Clamps `v` to the unsigned range of `bits`.
#[inline]
pub const fn clamp_unsigned(v: i128, bits: u32) -> (u64, bool) {
    let max = if bits >= 64 { u64::MAX as i128 } else { (1i128 << bits) - 1 };
    if v > max {
        (max as u64, true)
    } else if v < 0 {
        (0, true)
    } else {
        (v as u64, false)
    }
}

/// Evaluates `op` on two `esz`-byte operands.
///
/// Returns the truncated result and whether it saturated.
pub fn fixed_op(op: FixedOp, a: u64, b: u64, esz: usize, vxrm: Vxrm) -> (u64, bool) {
    let bits = esz as u32 * 8;
    let (ua, ub) = (i128::from(a), i128::from(b));
    let (sa, sb) = (i128::from(sign_extend(a, esz)), i128::from(sign_extend(b, esz)));
    let shamt = (b & u64::from(bits - 1)) as u32;
    let (r, sat) = match op {
        FixedOp::Saddu => clamp_unsigned(ua + ub, bits),
        FixedOp::Sadd => clamp_signed(sa + sb, bits),
        FixedOp::Ssubu => clamp_unsigned(ua - ub, bits),
        FixedOp::Ssub => clamp_signed(sa - sb, bits),
        FixedOp::Aaddu => (shift_round_unsigned((ua + ub) as u128, 1, vxrm) as u64, false),
        FixedOp::Aadd => (shift_round_signed(sa + sb, 1, vxrm) as u64, false),
        FixedOp::Asubu => (shift_round_signed(ua - ub, 1, vxrm) as u64, false),
        FixedOp::Asub => (shift_round_signed(sa - sb, 1, vxrm) as u64, false),
        FixedOp::Smul => clamp_signed(shift_round_signed(sa * sb, bits - 1, vxrm), bits),
        FixedOp::Ssrl => (shift_round_unsigned(u128::from(a), shamt, vxrm) as u64, false),
        FixedOp::Ssra => (shift_round_signed(sa, shamt, vxrm) as u64, false),
    };
    (r & width_mask(esz), sat)
}

/// Narrows a `2·SEW` value with rounding and clamps it to SEW.
pub fn narrow_clip(wide: u64, shift: u64, esz: usize, signed: bool, vxrm: Vxrm) -> (u64, bool) {
    let bits = esz as u32 * 8;
    let shamt = (shift & u64::from(2 * bits - 1)) as u32;
    let (r, sat) = if signed {
        let v = i128::from(sign_extend(wide, esz * 2));
        clamp_signed(shift_round_signed(v, shamt, vxrm), bits)
    } else {
        let v = u128::from(wide & width_mask(esz * 2));
        clamp_unsigned(shift_round_unsigned(v, shamt, vxrm) as i128, bits)
    };
    (r & width_mask(esz), sat)
}

impl VectorEngine<'_> {
    /// Saturating, averaging, scaling-multiply and scaling-shift ops in
    /// `.vv`, `.vx` and `.vi` forms.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for `vill`, misaligned groups
    /// or a masked write to `v0`.
    pub fn fixed_binary(&mut self, op: FixedOp, vd: usize, vs2: usize, rhs: Operand, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        rhs.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let (esz, vxrm) = (desc.esz(), desc.vxrm);
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, fx: &mut Effects| {
            let a = regs.read(vs2, i, esz)?;
            let b = rhs.read(regs, i, esz)?;
            let (r, sat) = fixed_op(op, a, b, esz, vxrm);
            if sat {
                fx.saturate();
            }
            regs.write(vd, i, esz, r)
        })
    }

    /// `vnclipu.w*` / `vnclip.w*`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when 2·SEW exceeds ELEN, and
    /// the errors of [`VectorEngine::fixed_binary`].
    pub fn nclip(&mut self, signed: bool, vd: usize, vs2: usize, rhs: Operand, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        desc.check_widen(self.config.elen)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul + 1)?;
        rhs.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let (esz, vxrm) = (desc.esz(), desc.vxrm);
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, fx| {
            let wide = regs.read(vs2, i, esz * 2)?;
            let shift = rhs.read(regs, i, esz)?;
            let (r, sat) = narrow_clip(wide, shift, esz, signed, vxrm);
            if sat {
                fx.saturate();
            }
            regs.write(vd, i, esz, r)
        })
    }
}
