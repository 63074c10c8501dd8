//! Multiply-accumulate products.
//!
//! `mmaqa` computes `md[i][j] += Σ_k ms1[i][k] · ms2[j][k]` for every row
//! pair: both sources are read row-major, so `ms2` holds the transposed
//! right-hand tile. Accumulators inside the `sizem × sizen` tile are
//! updated; the rest of the destination is zeroed. Sums wrap.
//!
//! | Form        | Sources             | Accumulator                   |
//! |-------------|---------------------|-------------------------------|
//! | `mmaqa.b`   | bytes               | 32-bit, `md`                  |
//! | `pmmaqa.b`  | nibble pairs        | 32-bit, `md`                  |
//! | `mmaqa.h`   | halfwords           | 64-bit, register pair `md`    |
//! | `mmacc.s.bp`| bytes × nibbles     | 32-bit, `md`                  |

use super::MatrixEngine;
use crate::common::error::MatrixError;

/// Signedness of the `(ms1, ms2)` operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signedness {
    /// Both signed (`mmaqa`).
    Ss,
    /// Both unsigned (`mmaqau`).
    Uu,
    /// Unsigned `ms1`, signed `ms2` (`mmaqaus`).
    Us,
    /// Signed `ms1`, unsigned `ms2` (`mmaqasu`).
    Su,
}

impl Signedness {
    const fn lhs_signed(self) -> bool {
        matches!(self, Self::Ss | Self::Su)
    }

    const fn rhs_signed(self) -> bool {
        matches!(self, Self::Ss | Self::Us)
    }
}

/// Extends the low `bits` of `v`.
const fn extend(v: u64, bits: u32, signed: bool) -> i64 {
    let shift = 64 - bits;
    if signed { ((v << shift) as i64) >> shift } else { ((v << shift) >> shift) as i64 }
}

impl MatrixEngine<'_> {
    fn check_product(&self, regs: &[usize]) -> Result<(), MatrixError> {
        self.check_shape()?;
        Self::check_regs(regs)
    }

    /// Adds `sums[i][j]` into the 32-bit accumulators of `md` inside the
    /// tile and zeroes the rest.
    fn accumulate_words(&mut self, md: usize, sums: &[i32]) -> Result<(), MatrixError> {
        let rows = self.regs.mrows();
        for i in 0..rows {
            for j in 0..rows {
                let value = if i < self.state.sizem && j < self.state.sizen {
                    (self.regs.read_signed(md, i, j, 4)? as i32).wrapping_add(sums[i * rows + j])
                } else {
                    0
                };
                self.regs.write(md, i, j, 4, u64::from(value as u32))?;
            }
        }
        Ok(())
    }

    /// `mmaqa[u|us|su].b`: byte products into 32-bit accumulators.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::IllegalConfig`] for an illegal `msize` and
    /// [`MatrixError::RegisterOutOfRange`] for a register past `m7`.
    pub fn mmaqa_b(&mut self, sign: Signedness, md: usize, ms1: usize, ms2: usize) -> Result<(), MatrixError> {
        self.check_product(&[md, ms1, ms2])?;
        let rows = self.regs.mrows();
        let mut sums = vec![0i32; rows * rows];
        for i in 0..rows {
            for j in 0..rows {
                let mut acc = 0i32;
                for k in 0..self.state.sizek {
                    let a = extend(self.regs.read(ms1, i, k, 1)?, 8, sign.lhs_signed());
                    let b = extend(self.regs.read(ms2, j, k, 1)?, 8, sign.rhs_signed());
                    acc = acc.wrapping_add((a * b) as i32);
                }
                sums[i * rows + j] = acc;
            }
        }
        self.accumulate_words(md, &sums)
    }

    /// `pmmaqa[u|us|su].b`: each byte holds two 4-bit elements; low and
    /// high nibbles are multiplied pairwise.
    ///
    /// # Errors
    ///
    /// See [`MatrixEngine::mmaqa_b`].
    pub fn pmmaqa_b(&mut self, sign: Signedness, md: usize, ms1: usize, ms2: usize) -> Result<(), MatrixError> {
        self.check_product(&[md, ms1, ms2])?;
        let rows = self.regs.mrows();
        let mut sums = vec![0i32; rows * rows];
        for i in 0..rows {
            for j in 0..rows {
                let mut acc = 0i32;
                for k in 0..self.state.sizek {
                    let a = self.regs.read(ms1, i, k, 1)?;
                    let b = self.regs.read(ms2, j, k, 1)?;
                    for shift in [0, 4] {
                        let x = extend(a >> shift, 4, sign.lhs_signed());
                        let y = extend(b >> shift, 4, sign.rhs_signed());
                        acc = acc.wrapping_add((x * y) as i32);
                    }
                }
                sums[i * rows + j] = acc;
            }
        }
        self.accumulate_words(md, &sums)
    }

    /// `mmaqa[u|us|su].h`: halfword products into 64-bit accumulators.
    ///
    /// A row of 64-bit accumulators holds only `mrows / 2` columns, so
    /// columns `j >= mrows / 2` go to register `md + 1`.
    ///
    /// # Errors
    ///
    /// See [`MatrixEngine::mmaqa_b`]; `md + 1` must also be a register.
    pub fn mmaqa_h(&mut self, sign: Signedness, md: usize, ms1: usize, ms2: usize) -> Result<(), MatrixError> {
        self.check_product(&[md, md + 1, ms1, ms2])?;
        let rows = self.regs.mrows();
        let half = rows / 2;
        let mut sums = vec![0i64; rows * rows];
        for i in 0..rows {
            for j in 0..rows {
                let mut acc = 0i64;
                for k in 0..self.state.sizek / 2 {
                    let a = extend(self.regs.read(ms1, i, k, 2)?, 16, sign.lhs_signed());
                    let b = extend(self.regs.read(ms2, j, k, 2)?, 16, sign.rhs_signed());
                    acc = acc.wrapping_add(a * b);
                }
                sums[i * rows + j] = acc;
            }
        }
        for i in 0..rows {
            for j in 0..rows {
                let (reg, col) = if j >= half { (md + 1, j - half) } else { (md, j) };
                let value = if i < self.state.sizem && j < self.state.sizen {
                    self.regs.read_signed(reg, i, col, 8)?.wrapping_add(sums[i * rows + j])
                } else {
                    0
                };
                self.regs.write(reg, i, col, 8, value as u64)?;
            }
        }
        Ok(())
    }

    /// `mmacc[u|us|su].s.bp`: bytes of `ms1` times packed 4-bit elements of
    /// `ms2`. Each `ms2` row holds `2 · rlenb` nibbles; `half` selects the
    /// first (0) or second (1) `rlenb` of them.
    ///
    /// # Errors
    ///
    /// See [`MatrixEngine::mmaqa_b`]; `half` above 1 is an
    /// [`MatrixError::IllegalConfig`].
    pub fn mmacc_bp(
        &mut self,
        sign: Signedness,
        md: usize,
        ms1: usize,
        ms2: usize,
        half: usize,
    ) -> Result<(), MatrixError> {
        self.check_product(&[md, ms1, ms2])?;
        if half > 1 {
            return Err(MatrixError::IllegalConfig("nibble half must be 0 or 1"));
        }
        let rows = self.regs.mrows();
        let start = self.regs.rlenb() * half;
        let mut sums = vec![0i32; rows * rows];
        for i in 0..rows {
            for j in 0..rows {
                let mut acc = 0i32;
                for k in 0..self.state.sizek {
                    let a = extend(self.regs.read(ms1, i, k, 1)?, 8, sign.lhs_signed());
                    let b = extend(u64::from(self.regs.read_nibble(ms2, j, start + k)?), 4, sign.rhs_signed());
                    acc = acc.wrapping_add((a * b) as i32);
                }
                sums[i * rows + j] = acc;
            }
        }
        self.accumulate_words(md, &sums)
    }
}
