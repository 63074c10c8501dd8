//! Single-width integer vector arithmetic.
//!
//! Kernels operate on zero-extended SEW-bit values held in a `u64` and
//! return the result truncated to SEW. Division follows the scalar M
//! extension: dividing by zero yields all ones (quotient) or the dividend
//! (remainder), and signed overflow yields the dividend (quotient) or zero
//! (remainder).

use super::iter::Destination;
use super::{Operand, VectorEngine, sign_extend, width_mask};
use crate::common::error::VectorError;

/// Single-width binary integer operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntOp {
    /// `vadd`
    Add,
    /// `vsub`
    Sub,
    /// `vrsub` (`rhs - vs2`)
    Rsub,
    /// `vand`
    And,
    /// `vor`
    Or,
    /// `vxor`
    Xor,
    /// `vsll`
    Sll,
    /// `vsrl`
    Srl,
    /// `vsra`
    Sra,
    /// `vminu`
    Minu,
    /// `vmin`
    Min,
    /// `vmaxu`
    Maxu,
    /// `vmax`
    Max,
    /// `vmul`
    Mul,
    /// `vmulh`
    Mulh,
    /// `vmulhu`
    Mulhu,
    /// `vmulhsu` (signed `vs2`, unsigned `rhs`)
    Mulhsu,
    /// `vdivu`
    Divu,
    /// `vdiv`
    Div,
    /// `vremu`
    Remu,
    /// `vrem`
    Rem,
}

/// Integer multiply-add forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MulAddOp {
    /// `vd = vs1 * vs2 + vd`
    Macc,
    /// `vd = -(vs1 * vs2) + vd`
    Nmsac,
    /// `vd = vs1 * vd + vs2`
    Madd,
    /// `vd = -(vs1 * vd) + vs2`
    Nmsub,
}

/// Add-with-carry and subtract-with-borrow forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CarryOp {
    /// `vadc` / `vmadc`
    Add,
    /// `vsbc` / `vmsbc`
    Sub,
}

/// Evaluates `op` on two SEW-bit operands of `esz` bytes.
pub fn int_op(op: IntOp, a: u64, b: u64, esz: usize) -> u64 {
    let bits = esz as u32 * 8;
    let mask = width_mask(esz);
    let (sa, sb) = (sign_extend(a, esz), sign_extend(b, esz));
    let shamt = (b & u64::from(bits - 1)) as u32;
    let r = match op {
        IntOp::Add => a.wrapping_add(b),
        IntOp::Sub => a.wrapping_sub(b),
        IntOp::Rsub => b.wrapping_sub(a),
        IntOp::And => a & b,
        IntOp::Or => a | b,
        IntOp::Xor => a ^ b,
        IntOp::Sll => a << shamt,
        IntOp::Srl => a >> shamt,
        IntOp::Sra => (sa >> shamt) as u64,
        IntOp::Minu => a.min(b),
        IntOp::Min => sa.min(sb) as u64,
        IntOp::Maxu => a.max(b),
        IntOp::Max => sa.max(sb) as u64,
        IntOp::Mul => a.wrapping_mul(b),
        // Products of two SEW values fit in i128 for every SEW up to 64.
        IntOp::Mulh => ((i128::from(sa) * i128::from(sb)) >> bits) as u64,
        IntOp::Mulhu => ((u128::from(a) * u128::from(b)) >> bits) as u64,
        IntOp::Mulhsu => ((i128::from(sa) * i128::from(b)) >> bits) as u64,
        IntOp::Divu => {
            if b == 0 {
                u64::MAX
            } else {
                a / b
            }
        }
        IntOp::Remu => {
            if b == 0 {
                a
            } else {
                a % b
            }
        }
        IntOp::Div => {
            if sb == 0 {
                u64::MAX
            } else if sb == -1 && sa == sign_extend(1 << (bits - 1), esz) {
                a
            } else {
                (sa / sb) as u64
            }
        }
        IntOp::Rem => {
            if sb == 0 {
                a
            } else if sb == -1 {
                0
            } else {
                (sa % sb) as u64
            }
        }
    };
    r & mask
}

impl VectorEngine<'_> {
    /// `v<op>.vv`, `.vx` and `.vi`: `vd[i] = vs2[i] op rhs[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for `vill`, misaligned groups
    /// or a masked write to `v0`.
    pub fn int_binary(&mut self, op: IntOp, vd: usize, vs2: usize, rhs: Operand, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        rhs.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let esz = desc.esz();
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, _| {
            let a = regs.read(vs2, i, esz)?;
            let b = rhs.read(regs, i, esz)?;
            regs.write(vd, i, esz, int_op(op, a, b, esz))
        })
    }

    /// `vmacc`, `vnmsac`, `vmadd` and `vnmsub` in `.vv` and `.vx` forms.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::int_binary`].
    pub fn int_mul_add(&mut self, op: MulAddOp, vd: usize, vs1: Operand, vs2: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        vs1.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let esz = desc.esz();
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, _| {
            let a = vs1.read(regs, i, esz)?;
            let b = regs.read(vs2, i, esz)?;
            let d = regs.read(vd, i, esz)?;
            let r = match op {
                MulAddOp::Macc => a.wrapping_mul(b).wrapping_add(d),
                MulAddOp::Nmsac => d.wrapping_sub(a.wrapping_mul(b)),
                MulAddOp::Madd => a.wrapping_mul(d).wrapping_add(b),
                MulAddOp::Nmsub => b.wrapping_sub(a.wrapping_mul(d)),
            };
            regs.write(vd, i, esz, r)
        })
    }

    /// `vmerge` (`vm = false`) or `vmv.v` (`vm = true`).
    ///
    /// Merge selects `src[i]` where `v0[i]` is set and `vs2[i]` elsewhere;
    /// every element of the body is written.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::int_binary`].
    pub fn merge(&mut self, vd: usize, vs2: usize, src: Operand, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(true)?;
        desc.check_group(vd, desc.lmul)?;
        src.check(&desc, desc.lmul)?;
        if !vm {
            desc.check_group(vs2, desc.lmul)?;
            if vd == 0 {
                return Err(VectorError::IllegalConfig("vmerge destination overlaps v0"));
            }
        }
        let esz = desc.esz();
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, _| {
            let v = if vm || regs.mask_bit(0, i) { src.read(regs, i, esz)? } else { regs.read(vs2, i, esz)? };
            regs.write(vd, i, esz, v)
        })
    }

    /// `vmv.v.v`, `vmv.v.x` and `vmv.v.i`.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::int_binary`].
    pub fn mv(&mut self, vd: usize, src: Operand) -> Result<(), VectorError> {
        self.merge(vd, 0, src, true)
    }

    /// `vadc` / `vsbc`: `vd[i] = vs2[i] ± rhs[i] ± v0[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when `vd` is `v0`.
    pub fn add_carry(&mut self, op: CarryOp, vd: usize, vs2: usize, rhs: Operand) -> Result<(), VectorError> {
        let desc = self.descriptor(true)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        rhs.check(&desc, desc.lmul)?;
        if vd == 0 {
            return Err(VectorError::IllegalConfig("vadc/vsbc destination overlaps v0"));
        }
        let esz = desc.esz();
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, _| {
            let a = regs.read(vs2, i, esz)?;
            let b = rhs.read(regs, i, esz)?;
            let c = u64::from(regs.mask_bit(0, i));
            let r = match op {
                CarryOp::Add => a.wrapping_add(b).wrapping_add(c),
                CarryOp::Sub => a.wrapping_sub(b).wrapping_sub(c),
            };
            regs.write(vd, i, esz, r & width_mask(esz))
        })
    }

    /// `vmadc` / `vmsbc`: writes the carry (or borrow) out of each element
    /// into mask register `vd`. With `use_carry` the carry-in comes from `v0`.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::int_binary`].
    pub fn carry_out(&mut self, op: CarryOp, vd: usize, vs2: usize, rhs: Operand, use_carry: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(true)?;
        desc.check_group(vd, 0)?;
        desc.check_group(vs2, desc.lmul)?;
        rhs.check(&desc, desc.lmul)?;
        let esz = desc.esz();
        self.execute(&desc, Destination::Mask { reg: vd }, |regs, i, _| {
            let a = u128::from(regs.read(vs2, i, esz)?);
            let b = u128::from(rhs.read(regs, i, esz)?);
            let c = u128::from(use_carry && regs.mask_bit(0, i));
            let out = match op {
                CarryOp::Add => (a + b + c) >> (esz * 8) != 0,
                CarryOp::Sub => a < b + c,
            };
            regs.set_mask_bit(vd, i, out)
        })
    }

    /// `vzext.vf{2,4,8}` / `vsext.vf{2,4,8}`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when the source element would
    /// be narrower than 8 bits or its EMUL below 1/8.
    pub fn extend(&mut self, vd: usize, vs2: usize, factor: usize, signed: bool, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        if !matches!(factor, 2 | 4 | 8) || desc.sew / factor < 8 {
            return Err(VectorError::IllegalConfig("extension source narrower than 8 bits"));
        }
        let src_esz = desc.esz() / factor;
        let src_emul = desc.emul_for(desc.sew / factor);
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, src_emul)?;
        desc.check_mask_overlap(vd)?;
        let esz = desc.esz();
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, _| {
            let v = if signed { regs.read_signed(vs2, i, src_esz)? as u64 } else { regs.read(vs2, i, src_esz)? };
            regs.write(vd, i, esz, v)
        })
    }

    /// `vnsrl.w*` / `vnsra.w*`: narrows a 2·SEW source by a shift.
    ///
    /// The shift amount uses the low `log2(2·SEW)` bits of `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when 2·SEW exceeds ELEN.
    pub fn narrow_shift(&mut self, arithmetic: bool, vd: usize, vs2: usize, rhs: Operand, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        desc.check_widen(self.config.elen)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul + 1)?;
        rhs.check(&desc, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        let esz = desc.esz();
        let wide = esz * 2;
        self.execute(&desc, Destination::sew(&desc, vd), |regs, i, _| {
            let shamt = (rhs.read(regs, i, esz)? & (wide as u64 * 8 - 1)) as u32;
            let v = if arithmetic {
                (regs.read_signed(vs2, i, wide)? >> shamt) as u64
            } else {
                regs.read(vs2, i, wide)? >> shamt
            };
            regs.write(vd, i, esz, v)
        })
    }
}
