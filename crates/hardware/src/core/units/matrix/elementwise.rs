//! Element-wise tile operations.
//!
//! Rows below `sizem` and columns below `sizek / esz` are active. Active
//! elements take `op(ms2[i][k], ms1[i][k])` (or `ms1[row][k]` for the
//! `.mv.i` forms); inactive elements of the destination are zeroed.
//! Right shifts round with `mxrm` exactly like the vector fixed-point
//! shifts.

use super::{MatrixEngine, MatrixOperand, MatrixWidth};
use crate::common::error::MatrixError;
use crate::core::units::vector::rounding::{Vxrm, round_increment};

/// Element-wise operator. The first operand is the `ms2` element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatrixOp {
    /// `madd`
    Add,
    /// `msub`: `ms2 - ms1`.
    Sub,
    /// `mmul`: low half of the product.
    Mul,
    /// `mmulh`: high half of the signed product.
    Mulh,
    /// `msra`: arithmetic right shift with rounding.
    Sra,
    /// `msrl`: logical right shift with rounding.
    Srl,
    /// `msll`
    Sll,
    /// `mmax`
    Max,
    /// `mmin`
    Min,
    /// `mumax`
    Maxu,
    /// `mumin`
    Minu,
}

const fn mask(width: MatrixWidth) -> u64 {
    match width {
        MatrixWidth::Word => 0xffff_ffff,
        MatrixWidth::Double => u64::MAX,
    }
}

/// Computes one element. `a` and `b` are sign-extended.
pub fn apply(op: MatrixOp, width: MatrixWidth, a: i64, b: i64, mxrm: Vxrm) -> i64 {
    let shamt = (b as u32) & width.shift_mask();
    let round = || round_increment(a as i128 as u128, shamt, mxrm) as i64;
    match op {
        MatrixOp::Add => a.wrapping_add(b),
        MatrixOp::Sub => a.wrapping_sub(b),
        MatrixOp::Mul | MatrixOp::Mulh => {
            let product = i128::from(a) * i128::from(b);
            let hi_shift = if width == MatrixWidth::Word { 32 } else { 64 };
            if op == MatrixOp::Mulh { (product >> hi_shift) as i64 } else { product as i64 }
        }
        MatrixOp::Sra => (a >> shamt).wrapping_add(round()),
        MatrixOp::Srl => (((a as u64 & mask(width)) >> shamt) as i64).wrapping_add(round()),
        MatrixOp::Sll => a.wrapping_shl(shamt),
        MatrixOp::Max => a.max(b),
        MatrixOp::Min => a.min(b),
        MatrixOp::Maxu => (a as u64 & mask(width)).max(b as u64 & mask(width)) as i64,
        MatrixOp::Minu => (a as u64 & mask(width)).min(b as u64 & mask(width)) as i64,
    }
}

/// Narrowing right shift by `shamt`, rounded with `mxrm` and clipped to a
/// quarter of the source width. Returns the clipped value and whether it
/// saturated.
pub fn narrow_clip(width: MatrixWidth, signed: bool, value: i64, shamt: u32, mxrm: Vxrm) -> (i64, bool) {
    let bits = width.esz() * 2;
    if signed {
        let shifted = (value >> shamt).wrapping_add(round_increment(value as i128 as u128, shamt, mxrm) as i64);
        let max = (1i64 << (bits - 1)) - 1;
        let min = -max - 1;
        (shifted.clamp(min, max), shifted > max || shifted < min)
    } else {
        let raw = value as u64 & mask(width);
        let shifted = (raw >> shamt) + round_increment(u128::from(raw), shamt, mxrm) as u64;
        let max = (1u64 << bits) - 1;
        (shifted.min(max) as i64, shifted > max)
    }
}

impl MatrixEngine<'_> {
    /// Reads the first source element of row `i`, column `k`.
    fn source1(&self, ms1: MatrixOperand, i: usize, k: usize, esz: usize) -> Result<i64, MatrixError> {
        match ms1 {
            MatrixOperand::Matrix(reg) => self.regs.read_signed(reg, i, k, esz),
            MatrixOperand::Row { reg, row } => self.regs.read_signed(reg, row, k, esz),
        }
    }

    /// `md[i][k] = op(ms2[i][k], ms1[·][k])` over the whole register.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::IllegalConfig`] for an illegal `msize` or a
    /// broadcast row past `mrows`, and [`MatrixError::RegisterOutOfRange`]
    /// for a register past `m7`.
    pub fn elementwise(
        &mut self,
        op: MatrixOp,
        width: MatrixWidth,
        md: usize,
        ms1: MatrixOperand,
        ms2: usize,
    ) -> Result<(), MatrixError> {
        self.check_shape()?;
        Self::check_regs(&[md, self.check_operand(ms1)?, ms2])?;
        let esz = width.esz();
        let cols = self.regs.rlenb() / esz;
        let active_cols = self.state.sizek / esz;
        let mxrm = self.state.mxrm;

        let mut out = Vec::with_capacity(self.regs.mrows() * cols);
        for i in 0..self.regs.mrows() {
            for k in 0..cols {
                if i < self.state.sizem && k < active_cols {
                    let a = self.regs.read_signed(ms2, i, k, esz)?;
                    let b = self.source1(ms1, i, k, esz)?;
                    out.push(apply(op, width, a, b, mxrm));
                } else {
                    out.push(0);
                }
            }
        }
        for (n, &v) in out.iter().enumerate() {
            self.regs.write(md, n / cols, n % cols, esz, v as u64)?;
        }
        Ok(())
    }

    /// `mn4clip[h|l][u]`: shifts every active `ms2` element right by the
    /// matching `ms1` element, clips it to a quarter width and writes it to
    /// the low (`high == false`) or second quarter of the destination row.
    ///
    /// The `.mm` form leaves inactive destination elements alone; the
    /// `.mv.i` form zeroes them. Any clipped element sets `mxsat`.
    ///
    /// # Errors
    ///
    /// See [`MatrixEngine::elementwise`].
    pub fn narrow_clip(
        &mut self,
        width: MatrixWidth,
        signed: bool,
        high: bool,
        md: usize,
        ms1: MatrixOperand,
        ms2: usize,
    ) -> Result<(), MatrixError> {
        self.check_shape()?;
        Self::check_regs(&[md, self.check_operand(ms1)?, ms2])?;
        let esz = width.esz();
        let narrow = esz / 4;
        let cols = self.regs.rlenb() / esz;
        let offset = if high { cols } else { 0 };
        let zero_inactive = matches!(ms1, MatrixOperand::Row { .. });
        let mxrm = self.state.mxrm;

        let mut out = Vec::new();
        let mut saturated = false;
        for i in 0..self.regs.mrows() {
            for k in 0..cols {
                if i < self.state.sizem && k < self.state.sizek / esz {
                    let shamt = (self.source1(ms1, i, k, esz)? as u32) & width.shift_mask();
                    let value = self.regs.read_signed(ms2, i, k, esz)?;
                    let (clipped, sat) = narrow_clip(width, signed, value, shamt, mxrm);
                    saturated |= sat;
                    out.push((i, k + offset, clipped));
                } else if zero_inactive {
                    out.push((i, k + offset, 0));
                }
            }
        }
        for (i, k, v) in out {
            self.regs.write(md, i, k, narrow, v as u64)?;
        }
        self.state.mxsat |= saturated;
        Ok(())
    }

    /// `mmov.mv.x`: copies row `row` of `ms1` into every row of `md`.
    ///
    /// # Errors
    ///
    /// See [`MatrixEngine::elementwise`]; the tile shape is not consulted.
    pub fn broadcast_row(&mut self, md: usize, ms1: usize, row: usize) -> Result<(), MatrixError> {
        Self::check_regs(&[md, self.check_operand(MatrixOperand::Row { reg: ms1, row })?])?;
        let data = self.regs.row(ms1, row)?.to_vec();
        for i in 0..self.regs.mrows() {
            self.regs.set_row(md, i, &data)?;
        }
        Ok(())
    }

    /// `m[su]cvt[hl].b.p`: widens the low (`high == false`) or high half of
    /// each row's packed 4-bit elements to bytes, sign- or zero-extended.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::RegisterOutOfRange`] for a register past `m7`.
    pub fn unpack_nibbles(&mut self, md: usize, ms1: usize, high: bool, signed: bool) -> Result<(), MatrixError> {
        Self::check_regs(&[md, ms1])?;
        let cols = self.regs.rlenb();
        let offset = if high { cols } else { 0 };
        let mut out = Vec::with_capacity(self.regs.mrows() * cols);
        for i in 0..self.regs.mrows() {
            for k in 0..cols {
                let nibble = self.regs.read_nibble(ms1, i, k + offset)?;
                out.push(if signed { ((nibble << 4) as i8 >> 4) as u8 } else { nibble });
            }
        }
        for (n, &v) in out.iter().enumerate() {
            self.regs.write(md, n / cols, n % cols, 1, u64::from(v))?;
        }
        Ok(())
    }
}
